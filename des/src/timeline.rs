//! Timeline entries — a tagged sum emitted as a stream, re-traversed once by
//! the finalizer (spec §9 design note), not a heterogeneous map.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSegment {
    pub name: &'static str,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrewMemberRef {
    pub id: u32,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignedCrew {
    pub pilots: Vec<CrewMemberRef>,
    pub sos: Vec<CrewMemberRef>,
    pub intel: Vec<CrewMemberRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Payload,
    Aircraft,
    Pilot,
    So,
    Intel,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Payload => "payload",
            RejectionReason::Aircraft => "aircraft",
            RejectionReason::Pilot => "pilot",
            RejectionReason::So => "so",
            RejectionReason::Intel => "intel",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TimelineEvent {
    #[serde(rename = "mission")]
    Mission {
        unit: String,
        mission_type: String,
        mission_number: u32,
        demand_time: f64,
        finish_time: f64,
        crew_hold_start: f64,
        crew_hold_end: f64,
        segments: Vec<TimelineSegment>,
        crew: AssignedCrew,
    },
    #[serde(rename = "rejection")]
    Rejection {
        time: f64,
        unit: String,
        mission_type: String,
        reason: &'static str,
    },
    #[serde(rename = "duty")]
    Duty {
        unit: String,
        duty_type: String,
        duty_id: String,
        start: f64,
        end: f64,
        can_use_pilot: bool,
        can_use_so: bool,
        can_use_intel: bool,
        crew: AssignedCrew,
        #[serde(skip_serializing_if = "Option::is_none")]
        mission_aligned: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        original_window: Option<(f64, f64)>,
    },
    #[serde(rename = "duty_recovery")]
    DutyRecovery {
        unit: String,
        crew_type: String,
        crew_id: u32,
        start: f64,
        end: f64,
        reason: String,
    },
}
