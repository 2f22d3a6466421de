use crate::data::{AssignmentResult, SchedulingInput};
use crate::error::InputError;
use crate::max_flow::{max_flow, reachable_from_source};
use crate::network::NetworkBuilder;
use log::{debug, info, warn};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

/// Parses a scheduling input document.
pub fn parse_input(json: &str) -> Result<SchedulingInput, InputError> {
    if json.trim().is_empty() {
        return Err(InputError::Empty);
    }
    Ok(serde_json::from_str(json)?)
}

pub fn read_input<R: Read>(mut reader: R) -> Result<SchedulingInput, InputError> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    parse_input(&buffer)
}

pub fn read_input_from_path<P: AsRef<Path>>(path: P) -> Result<SchedulingInput, InputError> {
    let content = fs::read_to_string(path)?;
    parse_input(&content)
}

pub fn configure_builder(input: &SchedulingInput) -> NetworkBuilder {
    let mut builder = NetworkBuilder::new();
    builder
        .set_doctors(input.doctors.clone())
        .set_days(input.days.clone())
        .set_periods(input.periods.clone())
        .set_availability(input.availability.clone())
        .set_max_shifts_per_period(input.max_shifts_per_period)
        .set_max_shifts_total(input.max_shifts_total)
        .set_doctors_per_day(input.doctors_per_day.clone())
        .set_capacities(input.capacities.clone());
    builder
}

/// Assigns doctors to days with a maximum flow; explains the shortfall with
/// the minimum cut when not every day can be staffed.
pub fn solve(input: &SchedulingInput) -> AssignmentResult {
    let start_time = Instant::now();

    let mut builder = configure_builder(input);
    let graph = builder.build();
    let layout = builder.layout();
    debug!(
        "source = {}, sink = {}, {} nodes",
        layout.source(),
        layout.sink(),
        layout.num_nodes()
    );

    info!("Running max flow...");
    let flow = max_flow(&graph, builder.source(), builder.sink());
    let mut result = builder.extract_result(&flow.flow);

    if !result.feasible {
        let reachable = reachable_from_source(&graph, &flow.flow, builder.source());
        let bottlenecks = builder.analyze_min_cut(&reachable);
        warn!(
            "Infeasible: {} of {} shifts covered, {} bottlenecks",
            result.days_covered,
            result.days_required,
            bottlenecks.len()
        );
        result.bottlenecks = Some(bottlenecks);
    }

    info!(
        "Solved in {:.2?}: flow {}, feasible = {}",
        start_time.elapsed(),
        flow.total_flow,
        result.feasible
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BottleneckKind;
    use std::io::Cursor;

    const INFEASIBLE: &str = r#"{
        "medicos": ["M1"],
        "dias": ["D1", "D2"],
        "periodos": [{ "id": "P1", "dias": ["D1", "D2"] }],
        "disponibilidad": { "M1": ["D1"] }
    }"#;

    #[test]
    fn test_solve_feasible() {
        let input = parse_input(
            r#"{
                "doctors": ["M1", "M2"],
                "days": ["D1", "D2", "D3"],
                "periods": [{ "id": "P1", "days": ["D1", "D2", "D3"] }],
                "availability": { "M1": ["D1", "D2", "D3"], "M2": ["D2", "D3"] },
                "maxShiftsPerPeriod": 2,
                "doctorsPerDay": 1
            }"#,
        )
        .unwrap();
        let result = solve(&input);
        assert!(result.feasible);
        assert_eq!(result.days_covered, 3);
        assert_eq!(result.assignments.len(), 3);
        assert!(result.bottlenecks.is_none());
    }

    #[test]
    fn test_solve_infeasible_reports_bottlenecks() {
        let result = solve(&parse_input(INFEASIBLE).unwrap());
        assert!(!result.feasible);
        assert_eq!((result.days_covered, result.days_required), (1, 2));
        let bottlenecks = result.bottlenecks.unwrap();
        assert!(
            bottlenecks
                .iter()
                .any(|b| b.kind == BottleneckKind::Day && b.id == "D2")
        );
    }

    #[test]
    fn test_capacities_cap_personal_total() {
        let input = parse_input(
            r#"{
                "doctors": ["M1", "M2"],
                "days": ["D1", "D2"],
                "periods": [{ "id": "P1", "days": ["D1"] }, { "id": "P2", "days": ["D2"] }],
                "availability": { "M1": ["D1", "D2"], "M2": [] },
                "capacities": { "M1": 1 }
            }"#,
        )
        .unwrap();
        let result = solve(&input);
        assert_eq!(result.days_covered, 1);
        let bottlenecks = result.bottlenecks.unwrap();
        assert!(
            bottlenecks
                .iter()
                .any(|b| b.kind == BottleneckKind::Doctor && b.id == "M1")
        );
    }

    #[test]
    fn test_doctors_per_day_uniform_and_map() {
        let uniform = parse_input(r#"{ "days": ["D1", "D2"], "doctorsPerDay": 2 }"#).unwrap();
        assert_eq!(solve(&uniform).days_required, 4);

        let per_day =
            parse_input(r#"{ "days": ["D1", "D2"], "doctorsPerDay": { "D1": 3 } }"#).unwrap();
        assert_eq!(solve(&per_day).days_required, 4);
    }

    #[test]
    fn test_read_input() {
        let input = read_input(Cursor::new(INFEASIBLE)).unwrap();
        assert_eq!(input.doctors, vec!["M1"]);
        assert!(matches!(read_input(Cursor::new("  \n")), Err(InputError::Empty)));
        assert!(matches!(read_input(Cursor::new("[1, 2")), Err(InputError::Json(_))));
    }

    #[test]
    fn test_read_input_from_path() {
        let path = std::env::temp_dir().join(format!("shift_solver_{}.json", std::process::id()));
        fs::write(&path, INFEASIBLE).unwrap();
        let input = read_input_from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(input.days, vec!["D1", "D2"]);

        assert!(matches!(
            read_input_from_path(&path),
            Err(InputError::Io(_))
        ));
    }
}
