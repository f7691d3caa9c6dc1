//! Personnel processor (spec §4.4): per-specialty availability factor and
//! work-schedule/rest parameters.
//!
//! The exact multiplicative composition of the availability factor is left
//! open by the spec (§9.1); this resolves it as documented in
//! SPEC_FULL.md/DESIGN.md: a product of `(1 - fraction)` terms across leave,
//! standdown, medical, training and range, unless the scenario supplies
//! `availability_factor` directly.

use std::collections::HashMap;

use crate::crew::{ShiftSplitConfig, WorkSchedule};
use crate::types::PersonnelAvailabilitySpec;

#[derive(Debug, Clone)]
pub struct PersonnelProfile {
    pub factor: f64,
    pub daily_crew_rest_hours: f64,
    pub work_schedule: Option<WorkSchedule>,
    /// Fractional attrition by cause, used to apportion the headcount gap
    /// `total - effective` across the availability-timeline buckets.
    pub leave_frac: f64,
    pub standdown_frac: f64,
    pub medical_frac: f64,
    pub training_frac: f64,
    pub range_frac: f64,
}

fn derive_factor(spec: &PersonnelAvailabilitySpec) -> (f64, [f64; 5]) {
    if let Some(direct) = spec.availability_factor {
        return (direct.clamp(f64::MIN_POSITIVE, 1.0), [0.0; 5]);
    }
    let leave = spec.annual_leave_days / 365.0;
    let standdown = spec.quarterly_standdown_days * 4.0 / 365.0;
    let medical = spec.monthly_medical_days * 12.0 / 365.0;
    let training = spec.monthly_training_days * 12.0 / 365.0;
    let range = spec.annual_range_days / 365.0;
    let fractions = [leave, standdown, medical, training, range];
    let factor = fractions.iter().fold(1.0, |acc, f| acc * (1.0 - f.clamp(0.0, 1.0)));
    (factor.clamp(f64::MIN_POSITIVE, 1.0), fractions)
}

pub fn process(spec: &PersonnelAvailabilitySpec) -> PersonnelProfile {
    let (factor, fractions) = derive_factor(spec);
    let work_schedule = spec.work_schedule.as_ref().map(|ws| WorkSchedule {
        days_on: ws.days_on,
        days_off: ws.days_off,
        start_hour: ws.start_hour,
        shift_split: ws.shift_split.as_ref().filter(|s| s.enabled).map(|s| ShiftSplitConfig {
            percent: s.percent,
            stagger_days_off: s.stagger_days_off,
        }),
    });
    PersonnelProfile {
        factor,
        daily_crew_rest_hours: spec.daily_crew_rest_hours,
        work_schedule,
        leave_frac: fractions[0],
        standdown_frac: fractions[1],
        medical_frac: fractions[2],
        training_frac: fractions[3],
        range_frac: fractions[4],
    }
}

pub fn effective_count(total: u32, factor: f64) -> u32 {
    ((total as f64) * factor).floor() as u32
}

/// Process every MOS present in the scenario's `personnel_availability` map.
pub fn process_all(
    personnel_availability: &HashMap<String, PersonnelAvailabilitySpec>,
) -> HashMap<String, PersonnelProfile> {
    personnel_availability.iter().map(|(mos, spec)| (mos.clone(), process(spec))).collect()
}
