mod data;
mod error;
mod graph;
mod max_flow;
mod network;
mod server;
mod solver;

use clap::{Parser, Subcommand};
use data::ErrorResponse;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

/// Assigns doctors to shifts with a maximum flow and explains infeasible calendars.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one instance read from FILE, or from stdin when FILE is omitted.
    Solve {
        file: Option<PathBuf>,
        /// Print the result on a single line.
        #[arg(long)]
        compact: bool,
    },
    /// Serve the solver over HTTP.
    Serve {
        #[arg(long, env = "SHIFT_SOLVER_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Solve { file, compact } => run_solve(file, compact),
        Command::Serve { addr } => match server::run_server(addr).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => print_error(e),
        },
    }
}

fn run_solve(file: Option<PathBuf>, compact: bool) -> ExitCode {
    let input = match file {
        Some(path) => solver::read_input_from_path(path),
        None => solver::read_input(std::io::stdin().lock()),
    };

    let input = match input {
        Ok(input) => input,
        Err(e) => return print_error(e),
    };

    let result = solver::solve(&input);
    let json = if compact {
        serde_json::to_string(&result)
    } else {
        serde_json::to_string_pretty(&result)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => print_error(e),
    }
}

fn print_error(error: impl std::fmt::Display) -> ExitCode {
    let body = ErrorResponse::new(error);
    match serde_json::to_string(&body) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{{\"error\": \"{}\"}}", body.error.escape_default()),
    }
    ExitCode::FAILURE
}
