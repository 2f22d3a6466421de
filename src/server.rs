use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use std::net::SocketAddr;

use crate::data::{AssignmentResult, ErrorResponse, SchedulingInput};
use crate::solver;

async fn solve_handler(
    payload: Result<Json<SchedulingInput>, JsonRejection>,
) -> Result<Json<AssignmentResult>, (StatusCode, Json<ErrorResponse>)> {
    match payload {
        Ok(Json(input)) => Ok(Json(solver::solve(&input))),
        Err(rejection) => {
            warn!("Rejected solve request: {}", rejection.body_text());
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(rejection.body_text()))))
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/health", get(health_handler))
}

pub async fn run_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
