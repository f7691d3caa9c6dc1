//! Output types (spec §6): the literal `Results` shape, serialized with
//! `serde` at the CLI boundary. Field names follow the spec exactly,
//! including the few camelCase survivors in `initial_resources`.

use std::collections::HashMap;

use serde::Serialize;

use crate::ordermap::OrderedMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MissionCounts {
    pub requested: u32,
    pub started: u32,
    pub completed: u32,
    pub rejected: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RejectionCounts {
    pub aircraft: u32,
    pub pilot: u32,
    pub so: u32,
    pub intel: u32,
    pub payload: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DutyCounts {
    pub requested: u32,
    pub filled: u32,
    pub unfilled: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolStats {
    pub allocations: u32,
    pub denials: u32,
    pub busy_time: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrewStats {
    pub allocations: u32,
    pub denials: u32,
    pub busy: u32,
    pub idle: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrewCountsOut {
    pub pilot: u32,
    pub so: u32,
    pub intel: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailabilityFactors {
    pub pilot: f64,
    pub so: f64,
    pub intel: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitUtilization {
    pub aircraft: f64,
    pub aircraft_efficiency: f64,
    pub aircraft_stats: PoolStats,
    pub pilot: f64,
    pub pilot_efficiency: f64,
    pub pilot_stats: CrewStats,
    pub so: f64,
    pub so_efficiency: f64,
    pub so_stats: CrewStats,
    pub intel: f64,
    pub intel_efficiency: f64,
    pub intel_stats: CrewStats,
    pub availability_factors: AvailabilityFactors,
    pub initial_crew: CrewCountsOut,
    pub effective_crew: CrewCountsOut,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitialResourcesOut {
    pub units: Vec<String>,
    #[serde(rename = "aircraftByUnit")]
    pub aircraft_by_unit: HashMap<String, u32>,
    #[serde(rename = "staffingByUnit")]
    pub staffing_by_unit: HashMap<String, CrewCountsOut>,
    #[serde(rename = "payloadByUnit")]
    pub payload_by_unit: HashMap<String, HashMap<String, u32>>,
    pub overrides_applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityPoint {
    pub time: f64,
    pub day: u32,
    pub total: u32,
    pub available: u32,
    pub unavailable: AvailabilityBuckets,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailabilityBuckets {
    pub work_schedule: u32,
    pub leave: u32,
    pub odo: u32,
    pub sdo: u32,
    pub sdnco: u32,
    pub range: u32,
    pub medical: u32,
    pub training: u32,
    pub standdown: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Results {
    pub horizon_hours: f64,
    pub missions: MissionCounts,
    pub rejections: RejectionCounts,
    pub duties: DutyCounts,
    pub utilization: OrderedMap<UnitUtilization>,
    pub by_type: OrderedMap<MissionCounts>,
    pub timeline: Vec<crate::timeline::TimelineEvent>,
    pub initial_resources: InitialResourcesOut,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_timeline: Option<AvailabilityTimeline>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailabilityTimeline {
    pub pilot: HashMap<String, Vec<AvailabilityPoint>>,
    pub so: HashMap<String, Vec<AvailabilityPoint>>,
    pub intel: HashMap<String, Vec<AvailabilityPoint>>,
}
