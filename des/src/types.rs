//! Scenario, state snapshot and overrides — the three structured inputs
//! (spec §6, Inputs 1-3). Only fields named in the spec are recognized;
//! everything else present in a caller's JSON is ignored by `serde`'s
//! default (non-`deny_unknown_fields`) behavior.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::distribution::Distribution;

pub type UnitId = String;

// ---------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequiredAircrew {
    pub pilot: Option<u32>,
    pub so: Option<u32>,
    pub intel: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrewDistributionPolicy {
    Concentrate,
    Distribute,
}

impl Default for CrewDistributionPolicy {
    fn default() -> Self {
        CrewDistributionPolicy::Distribute
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CrewRotation {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub pilot_shifts: Vec<f64>,
    #[serde(default)]
    pub so_shifts: Vec<f64>,
    #[serde(default)]
    pub intel_shifts: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlightTime {
    pub dist: Distribution,
    #[serde(default)]
    pub transit_in_hours: f64,
    #[serde(default)]
    pub transit_out_hours: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MissionType {
    pub name: String,
    pub flight_time: FlightTime,
    #[serde(default)]
    pub required_aircrew: Option<RequiredAircrew>,
    #[serde(default)]
    pub required_payload_types: Vec<String>,
    #[serde(default)]
    pub crew_rotation: Option<CrewRotation>,
    #[serde(default)]
    pub crew_distribution: CrewDistributionPolicy,
}

impl MissionType {
    pub fn need_pilot(&self) -> u32 {
        self.required_aircrew.as_ref().and_then(|a| a.pilot).unwrap_or(0)
    }
    pub fn need_so(&self) -> u32 {
        self.required_aircrew.as_ref().and_then(|a| a.so).unwrap_or(0)
    }
    pub fn need_intel(&self) -> u32 {
        self.required_aircrew.as_ref().and_then(|a| a.intel).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandKind {
    Deterministic,
    Poisson,
}

impl Default for DemandKind {
    fn default() -> Self {
        DemandKind::Poisson
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DemandSpec {
    pub mission_type: String,
    #[serde(rename = "type", default)]
    pub demand_type: DemandKind,
    pub rate_per_hour: Option<f64>,
    #[serde(alias = "interval_hours")]
    pub every_hours: Option<f64>,
    #[serde(default)]
    pub start_at_hours: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ShiftSplitSpec {
    #[serde(default)]
    pub enabled: bool,
    /// fraction (0..1) of the queue assigned to shift 1; remainder is shift 2.
    #[serde(default = "default_shift_percent")]
    pub percent: f64,
    #[serde(default)]
    pub stagger_days_off: f64,
}

fn default_shift_percent() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkScheduleSpec {
    #[serde(default)]
    pub days_on: u32,
    #[serde(default)]
    pub days_off: u32,
    #[serde(default)]
    pub start_hour: f64,
    #[serde(default)]
    pub shift_split: Option<ShiftSplitSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PersonnelAvailabilitySpec {
    #[serde(default)]
    pub annual_leave_days: f64,
    #[serde(default)]
    pub quarterly_standdown_days: f64,
    #[serde(default)]
    pub monthly_medical_days: f64,
    #[serde(default)]
    pub monthly_training_days: f64,
    #[serde(default)]
    pub annual_range_days: f64,
    /// Overrides the derived multiplicative factor when present (spec §9.1).
    #[serde(default)]
    pub availability_factor: Option<f64>,
    #[serde(default)]
    pub daily_crew_rest_hours: f64,
    #[serde(default)]
    pub work_schedule: Option<WorkScheduleSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DutyTypeSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_shifts_per_day")]
    pub shifts_per_day: u32,
    #[serde(default)]
    pub hours_per_shift: f64,
    #[serde(default)]
    pub start_hour: f64,
    #[serde(default)]
    pub requires_pilot: u8,
    #[serde(default)]
    pub requires_so: u8,
    #[serde(default)]
    pub requires_intel: u8,
    #[serde(default)]
    pub duty_recovery_hours: f64,
    #[serde(default = "default_true")]
    pub respect_work_schedule: bool,
}

fn default_shifts_per_day() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LookaheadSpec {
    #[serde(default = "default_lookahead_hours")]
    pub hours: f64,
    #[serde(default)]
    pub disabled: bool,
}

fn default_lookahead_hours() -> f64 {
    72.0
}

impl Default for LookaheadSpec {
    fn default() -> Self {
        LookaheadSpec { hours: default_lookahead_hours(), disabled: false }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DutyRequirements {
    #[serde(default)]
    pub lookahead: LookaheadSpec,
    #[serde(flatten)]
    pub duty_types: HashMap<String, DutyTypeSpec>,
}

pub const ODO_DUTY_TYPE: &str = "odo";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessTimes {
    pub preflight: Option<Distribution>,
    pub postflight: Option<Distribution>,
    pub turnaround: Option<Distribution>,
    #[serde(default)]
    pub mount_times: HashMap<String, Distribution>,
    #[serde(default = "default_true")]
    pub hold_crew_during_process_times: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnitPolicy {
    #[serde(default)]
    pub mission_split: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Scenario {
    pub name: Option<String>,
    pub horizon_hours: f64,
    #[serde(default)]
    pub mission_types: Vec<MissionType>,
    #[serde(default)]
    pub demand: Vec<DemandSpec>,
    #[serde(default)]
    pub duty_requirements: DutyRequirements,
    #[serde(default)]
    pub process_times: ProcessTimes,
    #[serde(default)]
    pub personnel_availability: HashMap<String, PersonnelAvailabilitySpec>,
    #[serde(default)]
    pub unit_policy: UnitPolicy,
}

// ---------------------------------------------------------------------
// State snapshot (spec §6, Input 2)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StateTable {
    pub rows: Vec<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct State {
    pub tables: HashMap<String, StateTable>,
}

// ---------------------------------------------------------------------
// Overrides (spec §6, Input 3)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnitOverrides {
    pub aircraft: Option<f64>,
    pub pilot: Option<f64>,
    pub so: Option<f64>,
    pub intel: Option<f64>,
    #[serde(default)]
    pub payload_by_type: Option<HashMap<String, f64>>,
    pub payload_per_type: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Overrides {
    #[serde(default)]
    pub units: HashMap<String, UnitOverrides>,
}
