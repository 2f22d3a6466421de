use crate::data::{
    Assignment, AssignmentResult, Bottleneck, BottleneckKind, BottleneckReason, DayId, DoctorId,
    DoctorsPerDay, Period, PeriodId, DEFAULT_MAX_SHIFTS_PER_PERIOD, DEFAULT_MAX_SHIFTS_TOTAL,
};
use crate::graph::{Capacity, CapacityGraph, NodeIndex};
use crate::max_flow::FlowMatrix;
use itertools::{iproduct, Itertools};
use log::{debug, info, trace, warn};
use std::collections::{HashMap, HashSet};

/// Node numbering of the layered network:
///
/// ```text
/// source | doctors | doctor x period (doctor-major) | days | sink
/// ```
///
/// Indices are a pure function of the three layer sizes, so construction and
/// extraction always agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeLayout {
    num_doctors: usize,
    num_periods: usize,
    num_days: usize,
}

impl NodeLayout {
    pub fn new(num_doctors: usize, num_periods: usize, num_days: usize) -> Self {
        Self {
            num_doctors,
            num_periods,
            num_days,
        }
    }

    pub fn source(&self) -> NodeIndex {
        0
    }

    pub fn doctor(&self, doctor: usize) -> NodeIndex {
        1 + doctor
    }

    pub fn doctor_period(&self, doctor: usize, period: usize) -> NodeIndex {
        1 + self.num_doctors + doctor * self.num_periods + period
    }

    pub fn day(&self, day: usize) -> NodeIndex {
        1 + self.num_doctors + self.num_doctors * self.num_periods + day
    }

    pub fn sink(&self) -> NodeIndex {
        self.day(self.num_days)
    }

    pub fn num_nodes(&self) -> usize {
        self.sink() + 1
    }
}

/// Ids and requirements the last graph was built from, in node order.
/// Extraction reads these, never the live configuration.
#[derive(Debug, Clone, Default)]
struct BuiltNetwork {
    layout: NodeLayout,
    doctors: Vec<DoctorId>,
    periods: Vec<PeriodId>,
    days: Vec<DayId>,
    required: Vec<Capacity>,
}

/// Translates the shift assignment problem into a flow network and reads
/// assignments and bottlenecks back out of a flow over that network.
///
/// Configuration is order-independent. Inconsistent configuration (a day in
/// no period, availability for an unknown doctor, ...) never fails: the
/// affected edges are simply not created.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    doctors: Vec<DoctorId>,
    days: Vec<DayId>,
    periods: Vec<Period>,
    availability: HashMap<DoctorId, HashSet<DayId>>,
    max_shifts_per_period: u32,
    max_shifts_total: u32,
    doctors_per_day: DoctorsPerDay,
    capacities: HashMap<DoctorId, u32>,
    built: BuiltNetwork,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            doctors: Vec::new(),
            days: Vec::new(),
            periods: Vec::new(),
            availability: HashMap::new(),
            max_shifts_per_period: DEFAULT_MAX_SHIFTS_PER_PERIOD,
            max_shifts_total: DEFAULT_MAX_SHIFTS_TOTAL,
            doctors_per_day: DoctorsPerDay::default(),
            capacities: HashMap::new(),
            built: BuiltNetwork::default(),
        }
    }

    /// Repeated ids collapse onto the first occurrence, so a doctor owns one node.
    pub fn set_doctors(&mut self, doctors: Vec<DoctorId>) -> &mut Self {
        for doctor in doctors.iter().duplicates() {
            warn!("Doctor {doctor} is listed more than once; merged");
        }
        self.doctors = doctors.into_iter().unique().collect();
        self
    }

    pub fn set_days(&mut self, days: Vec<DayId>) -> &mut Self {
        self.days = days;
        self
    }

    pub fn set_periods(&mut self, periods: Vec<Period>) -> &mut Self {
        self.periods = periods;
        self
    }

    pub fn set_availability<I, D>(&mut self, availability: I) -> &mut Self
    where
        I: IntoIterator<Item = (DoctorId, D)>,
        D: IntoIterator<Item = DayId>,
    {
        self.availability = availability
            .into_iter()
            .map(|(doctor, days)| (doctor, days.into_iter().collect()))
            .collect();
        self
    }

    pub fn set_max_shifts_per_period(&mut self, max: u32) -> &mut Self {
        self.max_shifts_per_period = max;
        self
    }

    pub fn set_max_shifts_total(&mut self, max: u32) -> &mut Self {
        self.max_shifts_total = max;
        self
    }

    pub fn set_doctors_per_day(&mut self, doctors_per_day: DoctorsPerDay) -> &mut Self {
        self.doctors_per_day = doctors_per_day;
        self
    }

    /// Same requirement for every configured day.
    pub fn set_doctors_required_all_days(&mut self, count: u32) -> &mut Self {
        self.doctors_per_day = DoctorsPerDay::Uniform(count);
        self
    }

    /// Per-doctor total shift limits; these win over `max_shifts_total`.
    pub fn set_capacities(&mut self, capacities: HashMap<DoctorId, u32>) -> &mut Self {
        self.capacities = capacities;
        self
    }

    pub fn layout(&self) -> NodeLayout {
        self.built.layout
    }

    pub fn source(&self) -> NodeIndex {
        self.built.layout.source()
    }

    pub fn sink(&self) -> NodeIndex {
        self.built.layout.sink()
    }

    /// Assembles the capacity network for the current configuration.
    pub fn build(&mut self) -> CapacityGraph {
        let layout = NodeLayout::new(self.doctors.len(), self.periods.len(), self.days.len());
        self.built = BuiltNetwork {
            layout,
            doctors: self.doctors.clone(),
            periods: self.periods.iter().map(|p| p.id.clone()).collect(),
            days: self.days.clone(),
            required: self
                .days
                .iter()
                .map(|day| Capacity::from(self.doctors_per_day.required(day)))
                .collect(),
        };
        self.warn_inert_configuration();

        let mut graph = CapacityGraph::new(layout.num_nodes());
        info!(
            "Building flow network: {} doctors, {} periods, {} days ({} nodes)",
            self.doctors.len(),
            self.periods.len(),
            self.days.len(),
            layout.num_nodes()
        );

        // source -> doctor: the doctor's total limit, never more than the days they can work
        for (d, doctor) in self.doctors.iter().enumerate() {
            let available = self.availability.get(doctor).map_or(0, HashSet::len);
            let cap = Capacity::from(self.total_limit(doctor)).min(available as Capacity);
            graph.set_edge(layout.source(), layout.doctor(d), cap);
        }

        // doctor -> (doctor, period): per-period limit, for every period
        let per_period = Capacity::from(self.max_shifts_per_period);
        for (d, p) in iproduct!(0..self.doctors.len(), 0..self.periods.len()) {
            graph.set_edge(layout.doctor(d), layout.doctor_period(d, p), per_period);
        }

        // (doctor, period) -> day: unit edge when the doctor is available that day
        let day_periods = self.day_periods();
        for (d, doctor) in self.doctors.iter().enumerate() {
            for (k, day) in self.days.iter().enumerate() {
                match day_periods[k] {
                    Some(p) if self.is_available(doctor, day) => {
                        graph.set_edge(layout.doctor_period(d, p), layout.day(k), 1);
                    }
                    _ => {}
                }
            }
        }

        // day -> sink: doctors required that day
        for (k, &required) in self.built.required.iter().enumerate() {
            graph.set_edge(layout.day(k), layout.sink(), required);
        }

        trace!("{graph}");
        graph
    }

    /// Reads assignments out of a flow over the network from the last [`build`](Self::build).
    ///
    /// Never sets `bottlenecks`; see [`analyze_min_cut`](Self::analyze_min_cut).
    pub fn extract_result(&self, flow: &FlowMatrix) -> AssignmentResult {
        let built = &self.built;
        let layout = built.layout;
        let days_required: Capacity = built.required.iter().sum();

        let mut assignments = Vec::new();
        for ((d, doctor), p, (k, day)) in iproduct!(
            built.doctors.iter().enumerate(),
            0..built.periods.len(),
            built.days.iter().enumerate()
        ) {
            let units = flow_between(flow, layout.doctor_period(d, p), layout.day(k));
            for _ in 0..units {
                assignments.push(Assignment {
                    doctor: doctor.clone(),
                    day: day.clone(),
                });
            }
        }

        let days_covered = assignments.len() as Capacity;
        info!("Covered {days_covered} of {days_required} required shifts");
        AssignmentResult {
            feasible: days_covered == days_required,
            days_covered,
            days_required,
            assignments,
            bottlenecks: None,
        }
    }

    /// Explains an infeasible flow from the source side of its minimum cut.
    ///
    /// The checks are independent and may all fire for the same instance.
    pub fn analyze_min_cut(&self, reachable: &[NodeIndex]) -> Vec<Bottleneck> {
        let built = &self.built;
        let layout = built.layout;
        let mut reached = vec![false; layout.num_nodes()];
        for &node in reachable {
            if let Some(slot) = reached.get_mut(node) {
                *slot = true;
            }
        }
        let is_reachable = |node: NodeIndex| reached.get(node).copied().unwrap_or(false);

        let mut bottlenecks = Vec::new();

        // no residual path reaches the day: it never got all the doctors it needs
        for (k, day) in built.days.iter().enumerate() {
            if !is_reachable(layout.day(k)) {
                bottlenecks.push(Bottleneck {
                    kind: BottleneckKind::Day,
                    id: day.clone(),
                    reason: BottleneckReason::Uncovered,
                });
            }
        }

        // source -> doctor is saturated
        for (d, doctor) in built.doctors.iter().enumerate() {
            if !is_reachable(layout.doctor(d)) {
                bottlenecks.push(Bottleneck {
                    kind: BottleneckKind::Doctor,
                    id: doctor.clone(),
                    reason: BottleneckReason::Saturated,
                });
            }
        }

        // doctor -> (doctor, period) is saturated while the doctor still had shifts left
        for ((d, doctor), (p, period)) in iproduct!(
            built.doctors.iter().enumerate(),
            built.periods.iter().enumerate()
        ) {
            if is_reachable(layout.doctor(d)) && !is_reachable(layout.doctor_period(d, p)) {
                bottlenecks.push(Bottleneck {
                    kind: BottleneckKind::DoctorInPeriod,
                    id: format!("{doctor}@{period}"),
                    reason: BottleneckReason::Saturated,
                });
            }
        }

        for bottleneck in &bottlenecks {
            debug!("bottleneck: {bottleneck}");
        }
        bottlenecks
    }

    fn total_limit(&self, doctor: &str) -> u32 {
        self.capacities
            .get(doctor)
            .copied()
            .unwrap_or(self.max_shifts_total)
    }

    fn is_available(&self, doctor: &str, day: &str) -> bool {
        self.availability
            .get(doctor)
            .is_some_and(|days| days.contains(day))
    }

    /// Period ordinal of every configured day. A day listed by several
    /// periods belongs to the first one.
    fn day_periods(&self) -> Vec<Option<usize>> {
        self.days
            .iter()
            .map(|day| self.periods.iter().position(|p| p.days.contains(day)))
            .collect()
    }

    fn warn_inert_configuration(&self) {
        let doctors: HashSet<&str> = self.doctors.iter().map(String::as_str).collect();
        let days: HashSet<&str> = self.days.iter().map(String::as_str).collect();

        for doctor in self.availability.keys().filter(|d| !doctors.contains(d.as_str())) {
            warn!("Availability given for unknown doctor {doctor}; ignored");
        }
        for doctor in self.capacities.keys().filter(|d| !doctors.contains(d.as_str())) {
            warn!("Capacity given for unknown doctor {doctor}; ignored");
        }
        for period in &self.periods {
            for day in period.days.iter().filter(|d| !days.contains(d.as_str())) {
                warn!("Period {} lists unknown day {day}; ignored", period.id);
            }
        }
        for day in self
            .periods
            .iter()
            .flat_map(|p| p.days.iter().unique())
            .duplicates()
        {
            warn!("Day {day} belongs to several periods; only the first one is used");
        }
        for day in &self.days {
            if !self.periods.iter().any(|p| p.days.contains(day)) {
                warn!("Day {day} is not in any period and cannot be staffed");
            }
        }
    }
}

fn flow_between(flow: &FlowMatrix, u: NodeIndex, v: NodeIndex) -> Capacity {
    flow.get(u).and_then(|row| row.get(v)).copied().unwrap_or(0)
}
