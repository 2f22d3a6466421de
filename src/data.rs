use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Type aliases for clarity
pub type DoctorId = String;
pub type DayId = String;
pub type PeriodId = String;

pub const DEFAULT_MAX_SHIFTS_PER_PERIOD: u32 = 1;
/// Stands in for "no limit" on the total number of shifts per doctor.
pub const DEFAULT_MAX_SHIFTS_TOTAL: u32 = 999;
pub const DEFAULT_DOCTORS_PER_DAY: u32 = 1;

/// A named window of days. A doctor takes at most a fixed number of shifts in it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Period {
    pub id: PeriodId,
    #[serde(default, alias = "dias")]
    pub days: Vec<DayId>,
}

/// How many doctors each day needs: one count for every day, or a count per day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DoctorsPerDay {
    Uniform(u32),
    /// Days missing from the map need [`DEFAULT_DOCTORS_PER_DAY`].
    PerDay(HashMap<DayId, u32>),
}

impl DoctorsPerDay {
    pub fn required(&self, day: &str) -> u32 {
        match self {
            Self::Uniform(count) => *count,
            Self::PerDay(counts) => counts.get(day).copied().unwrap_or(DEFAULT_DOCTORS_PER_DAY),
        }
    }
}

impl Default for DoctorsPerDay {
    fn default() -> Self {
        Self::Uniform(DEFAULT_DOCTORS_PER_DAY)
    }
}

/// The complete input for the shift assignment problem.
///
/// Keys are camelCase; the Spanish keys used by the upstream API are accepted
/// as aliases.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    #[serde(default, alias = "medicos")]
    pub doctors: Vec<DoctorId>,
    #[serde(default, alias = "dias")]
    pub days: Vec<DayId>,
    #[serde(default, alias = "periodos")]
    pub periods: Vec<Period>,
    #[serde(default, alias = "disponibilidad")]
    pub availability: HashMap<DoctorId, Vec<DayId>>,
    #[serde(default = "default_max_shifts_per_period", alias = "maxGuardiasPorPeriodo")]
    pub max_shifts_per_period: u32,
    #[serde(default = "default_max_shifts_total", alias = "maxGuardiasTotales")]
    pub max_shifts_total: u32,
    #[serde(default, alias = "medicosPorDia")]
    pub doctors_per_day: DoctorsPerDay,
    /// Per-doctor total shift limits, overriding `max_shifts_total`.
    #[serde(default, alias = "capacidades")]
    pub capacities: HashMap<DoctorId, u32>,
}

fn default_max_shifts_per_period() -> u32 {
    DEFAULT_MAX_SHIFTS_PER_PERIOD
}

fn default_max_shifts_total() -> u32 {
    DEFAULT_MAX_SHIFTS_TOTAL
}

/// One doctor on duty on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Assignment {
    pub doctor: DoctorId,
    pub day: DayId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BottleneckKind {
    Day,
    Doctor,
    DoctorInPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BottleneckReason {
    Saturated,
    Uncovered,
}

/// A constraint that keeps the schedule from covering every day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Bottleneck {
    pub kind: BottleneckKind,
    /// Day id, doctor id, or `doctor@period` for [`BottleneckKind::DoctorInPeriod`].
    pub id: String,
    pub reason: BottleneckReason,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BottleneckKind::Day => {
                write!(f, "[Day] {} could not be staffed with enough doctors", self.id)
            }
            BottleneckKind::Doctor => write!(
                f,
                "[Doctor] {} reached the maximum number of total shifts",
                self.id
            ),
            BottleneckKind::DoctorInPeriod => write!(
                f,
                "[DoctorInPeriod] {} reached the shift limit for the period",
                self.id
            ),
        }
    }
}

/// The final output of the solver. Always serialized with the English keys,
/// whatever key set the input used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub feasible: bool,
    pub days_covered: i64,
    pub days_required: i64,
    pub assignments: Vec<Assignment>,
    /// Only present when the instance is infeasible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottlenecks: Option<Vec<Bottleneck>>,
}

/// Body returned in place of a result when the input cannot be read.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
