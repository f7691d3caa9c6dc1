//! Demand generator (spec §4.5): expands scenario demand specs into mission
//! events and duty-requirement specs into recurring duty events, filters
//! ODO shifts to those aligned with mission activity, and sorts the result.

use crate::distribution::{self, Distribution};
use crate::rng::RandomSource;
use crate::types::{DemandKind, Scenario, ODO_DUTY_TYPE};

#[derive(Debug, Clone)]
pub struct MissionDemandEvent {
    pub time: f64,
    pub mission_type: String,
    pub assigned_unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DutyDemandEvent {
    pub time: f64,
    pub duty_type: String,
    pub duration: f64,
    pub requires_pilot: bool,
    pub requires_so: bool,
    pub requires_intel: bool,
    pub duty_recovery_hours: f64,
    pub respect_work_schedule: bool,
    pub start_hour: f64,
    pub shifts_per_day: u32,
    /// Exact occurrence index (the generator's loop counter `k`), used for
    /// duty-id derivation without floating-point modulo (spec §9.4).
    pub occurrence_index: u64,
    pub is_odo: bool,
}

#[derive(Debug, Clone)]
pub enum Event {
    Mission(MissionDemandEvent),
    Duty(DutyDemandEvent),
}

impl Event {
    pub fn time(&self) -> f64 {
        match self {
            Event::Mission(m) => m.time,
            Event::Duty(d) => d.time,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Event::Mission(_) => 0,
            Event::Duty(_) => 1,
        }
    }
}

fn mission_mean_span(scenario: &Scenario, mission_type: &str) -> f64 {
    let Some(mt) = scenario.mission_types.iter().find(|m| m.name == mission_type) else {
        return 0.0;
    };
    let pre = distribution::mean_opt(scenario.process_times.preflight.as_ref());
    let post = distribution::mean_opt(scenario.process_times.postflight.as_ref());
    let mount: f64 = mt
        .required_payload_types
        .iter()
        .filter_map(|p| scenario.process_times.mount_times.get(p))
        .map(distribution::mean)
        .sum();
    let flight = distribution::mean(&mt.flight_time.dist);
    pre + mount + mt.flight_time.transit_in_hours + flight + mt.flight_time.transit_out_hours + post
}

fn merge_spans(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if spans.is_empty() {
        return spans;
    }
    spans.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let mut merged = vec![spans[0]];
    for &(s, e) in &spans[1..] {
        let last = merged.last_mut().unwrap();
        if s <= last.1 {
            last.1 = last.1.max(e);
        } else {
            merged.push((s, e));
        }
    }
    merged
}

fn intersects_any(window: (f64, f64), spans: &[(f64, f64)]) -> bool {
    spans.iter().any(|&(s, e)| window.0 < e && s < window.1)
}

fn generate_mission_events(scenario: &Scenario, rng: &mut dyn RandomSource) -> Vec<MissionDemandEvent> {
    let horizon = scenario.horizon_hours;
    let mut events = Vec::new();

    for d in &scenario.demand {
        match d.demand_type {
            DemandKind::Deterministic => {
                let every = d.every_hours.unwrap_or(1.0);
                if every <= 0.0 {
                    continue;
                }
                let mut t = d.start_at_hours;
                while t < horizon {
                    events.push(MissionDemandEvent {
                        time: t,
                        mission_type: d.mission_type.clone(),
                        assigned_unit: None,
                    });
                    t += every;
                }
            }
            DemandKind::Poisson => {
                let rate = d.rate_per_hour.unwrap_or(0.0);
                if rate <= 0.0 {
                    continue;
                }
                let mut t = 0.0;
                loop {
                    let dt = distribution::sample(
                        &Distribution::Exponential { rate_per_hour: Some(rate) },
                        rng,
                    );
                    t += dt;
                    if t > horizon {
                        break;
                    }
                    events.push(MissionDemandEvent {
                        time: t,
                        mission_type: d.mission_type.clone(),
                        assigned_unit: None,
                    });
                }
            }
        }
    }

    events
}

fn generate_duty_events(scenario: &Scenario, mission_events: &[MissionDemandEvent]) -> Vec<DutyDemandEvent> {
    let horizon = scenario.horizon_hours;

    let mission_spans: Vec<(f64, f64)> = merge_spans(
        mission_events.iter().map(|m| (m.time, m.time + mission_mean_span(scenario, &m.mission_type))).collect(),
    );

    let mut events = Vec::new();
    for (duty_type, spec) in &scenario.duty_requirements.duty_types {
        if !spec.enabled || spec.shifts_per_day == 0 {
            continue;
        }
        let is_odo = duty_type.eq_ignore_ascii_case(ODO_DUTY_TYPE);
        let period = 24.0 / spec.shifts_per_day as f64;
        let mut k: u64 = 0;
        loop {
            let t = spec.start_hour + k as f64 * period;
            if t >= horizon {
                break;
            }
            if is_odo && !intersects_any((t, t + spec.hours_per_shift), &mission_spans) {
                k += 1;
                continue;
            }
            events.push(DutyDemandEvent {
                time: t,
                duty_type: duty_type.clone(),
                duration: spec.hours_per_shift,
                requires_pilot: spec.requires_pilot == 1,
                requires_so: spec.requires_so == 1,
                requires_intel: spec.requires_intel == 1,
                duty_recovery_hours: spec.duty_recovery_hours,
                respect_work_schedule: spec.respect_work_schedule,
                start_hour: spec.start_hour,
                shifts_per_day: spec.shifts_per_day,
                occurrence_index: k,
                is_odo,
            });
            k += 1;
        }
    }
    events
}

/// Generate and sort the full event list: mission demands from
/// `scenario.demand`, duty demands from `scenario.duty_requirements`
/// (ODO-filtered to windows overlapping mission activity), ordered by time
/// with mission demands preceding duty demands at equal timestamps.
pub fn generate(scenario: &Scenario, rng: &mut dyn RandomSource) -> Vec<Event> {
    let mission_events = generate_mission_events(scenario, rng);
    let duty_events = generate_duty_events(scenario, &mission_events);

    let mut events: Vec<Event> = mission_events.into_iter().map(Event::Mission).chain(duty_events.into_iter().map(Event::Duty)).collect();
    events.sort_by(|a, b| {
        a.time().partial_cmp(&b.time()).unwrap().then(a.kind_rank().cmp(&b.kind_rank()))
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRandomSource;
    use crate::types::{DemandSpec, DutyTypeSpec};
    use std::collections::HashMap;

    fn base_scenario(horizon: f64) -> Scenario {
        Scenario {
            name: None,
            horizon_hours: horizon,
            mission_types: Vec::new(),
            demand: Vec::new(),
            duty_requirements: Default::default(),
            process_times: Default::default(),
            personnel_availability: HashMap::new(),
            unit_policy: Default::default(),
        }
    }

    #[test]
    fn deterministic_every_h_horizon_h_yields_one_event() {
        let mut scenario = base_scenario(24.0);
        scenario.demand.push(DemandSpec {
            mission_type: "ISR".to_string(),
            demand_type: DemandKind::Deterministic,
            rate_per_hour: None,
            every_hours: Some(24.0),
            start_at_hours: 0.0,
        });
        let mut rng = SeededRandomSource::new(1);
        let events = generate(&scenario, &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time(), 0.0);
    }

    #[test]
    fn zero_horizon_yields_no_events() {
        let mut scenario = base_scenario(0.0);
        scenario.demand.push(DemandSpec {
            mission_type: "ISR".to_string(),
            demand_type: DemandKind::Deterministic,
            rate_per_hour: None,
            every_hours: Some(1.0),
            start_at_hours: 0.0,
        });
        let mut rng = SeededRandomSource::new(1);
        assert!(generate(&scenario, &mut rng).is_empty());
    }

    #[test]
    fn missions_precede_duties_at_equal_time() {
        let mut scenario = base_scenario(24.0);
        scenario.demand.push(DemandSpec {
            mission_type: "ISR".to_string(),
            demand_type: DemandKind::Deterministic,
            rate_per_hour: None,
            every_hours: Some(24.0),
            start_at_hours: 0.0,
        });
        scenario.duty_requirements.duty_types.insert(
            "sdo".to_string(),
            DutyTypeSpec {
                enabled: true,
                shifts_per_day: 1,
                hours_per_shift: 24.0,
                start_hour: 0.0,
                requires_pilot: 1,
                requires_so: 0,
                requires_intel: 0,
                duty_recovery_hours: 0.0,
                respect_work_schedule: true,
            },
        );
        let mut rng = SeededRandomSource::new(1);
        let events = generate(&scenario, &mut rng);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Mission(_)));
        assert!(matches!(events[1], Event::Duty(_)));
    }

    #[test]
    fn odo_skipped_with_no_overlapping_missions() {
        let mut scenario = base_scenario(48.0);
        scenario.duty_requirements.duty_types.insert(
            "odo".to_string(),
            DutyTypeSpec {
                enabled: true,
                shifts_per_day: 3,
                hours_per_shift: 8.0,
                start_hour: 0.0,
                requires_pilot: 1,
                requires_so: 0,
                requires_intel: 0,
                duty_recovery_hours: 0.0,
                respect_work_schedule: true,
            },
        );
        let mut rng = SeededRandomSource::new(1);
        let events = generate(&scenario, &mut rng);
        assert!(events.is_empty());
    }
}
