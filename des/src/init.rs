//! Resource initializer (spec §4.6): builds per-unit equipment pools and
//! crew queues, sizes the duty-rotation sub-pool from the first 30-day
//! demand window, and pre-assigns a unit to every mission demand.

use std::collections::{HashMap, HashSet};

use crate::crew::CrewQueue;
use crate::demand::Event;
use crate::ordermap::OrderedMap;
use crate::personnel::{self, PersonnelProfile};
use crate::pool::EquipmentPool;
use crate::state_loader::InitialResources;
use crate::types::{Scenario, ODO_DUTY_TYPE};

const DUTY_ROTATION_WINDOW_HOURS: f64 = 30.0 * 24.0;
const DUTY_ROTATION_SLACK: f64 = 1.2;

pub struct UnitPools {
    pub aircraft: EquipmentPool,
    pub payloads: OrderedMap<EquipmentPool>,
    pub pilot: CrewQueue,
    pub so: CrewQueue,
    pub intel: CrewQueue,
}

/// Greedily realizes the largest-remainder integer allocation for `weights`
/// over `n` draws, picking at each step the unit with the largest count
/// still owed — the "remaining/slots_left" interleaving of spec §4.6.
/// Falls back to plain round-robin when no split is configured.
pub fn assign_units_interleaved(unit_list: &[String], weights: Option<&HashMap<String, f64>>, n: usize) -> Vec<String> {
    if n == 0 || unit_list.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f64> = match weights {
        Some(w) if !w.is_empty() => unit_list.iter().map(|u| w.get(u).copied().unwrap_or(0.0).max(0.0)).collect(),
        _ => Vec::new(),
    };
    let total: f64 = raw.iter().sum();
    if raw.is_empty() || total <= 0.0 {
        return (0..n).map(|i| unit_list[i % unit_list.len()].clone()).collect();
    }

    let exact: Vec<f64> = raw.iter().map(|w| w / total * n as f64).collect();
    let mut targets: Vec<i64> = exact.iter().map(|e| e.floor() as i64).collect();
    let mut left = n as i64 - targets.iter().sum::<i64>();

    let mut by_remainder: Vec<usize> = (0..unit_list.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - targets[a] as f64;
        let rb = exact[b] - targets[b] as f64;
        rb.partial_cmp(&ra).unwrap()
    });
    for &idx in &by_remainder {
        if left <= 0 {
            break;
        }
        targets[idx] += 1;
        left -= 1;
    }

    let mut remaining: Vec<i64> = targets;
    let mut sequence = Vec::with_capacity(n);
    for _ in 0..n {
        let mut best_idx = 0usize;
        let mut best_val = -1i64;
        for (idx, &rem) in remaining.iter().enumerate() {
            if rem > best_val {
                best_val = rem;
                best_idx = idx;
            }
        }
        sequence.push(unit_list[best_idx].clone());
        remaining[best_idx] -= 1;
    }
    sequence
}

/// Assign `assigned_unit` on every mission demand event in place, per
/// `scenario.unit_policy.mission_split` (or round-robin when absent).
pub fn preassign_missions(events: &mut [Event], unit_list: &[String], mission_split: Option<&HashMap<String, f64>>) {
    let mission_count = events.iter().filter(|e| matches!(e, Event::Mission(_))).count();
    let sequence = assign_units_interleaved(unit_list, mission_split, mission_count);
    let mut it = sequence.into_iter();
    for event in events.iter_mut() {
        if let Event::Mission(m) = event {
            m.assigned_unit = it.next();
        }
    }
}

/// Sizes the rotation sub-pool from ODO demand only: SDO/SDNCO (and any other
/// non-ODO duty type) are continuous duties, not rotating ones, and draw
/// against the full crew queue instead (spec §4.6/§4.7.3).
fn duty_rotation_size(events: &[Event], role: impl Fn(&crate::demand::DutyDemandEvent) -> bool, effective_crew: u32) -> u32 {
    let demanded: u32 = events
        .iter()
        .filter_map(|e| match e {
            Event::Duty(d) if d.time < DUTY_ROTATION_WINDOW_HOURS && d.duty_type.eq_ignore_ascii_case(ODO_DUTY_TYPE) && role(d) => {
                Some(1u32)
            }
            _ => None,
        })
        .sum();
    let sized = (demanded as f64 * DUTY_ROTATION_SLACK).ceil() as u32;
    sized.min(effective_crew)
}

fn rotation_ids(n: u32) -> HashSet<u32> {
    (1..=n).collect()
}

/// Build every unit's pools and crew queues, and pre-assign missions to
/// units. `profiles` is keyed by specialty name (`pilot`, `so`, `intel`).
pub fn build(
    scenario: &Scenario,
    initial: &InitialResources,
    profiles: &HashMap<String, PersonnelProfile>,
    events: &mut Vec<Event>,
) -> OrderedMap<UnitPools> {
    let unit_list: Vec<String> = initial.units.clone();
    preassign_missions(events, &unit_list, scenario.unit_policy.mission_split.as_ref());

    let default_profile = PersonnelProfile {
        factor: 1.0,
        daily_crew_rest_hours: 0.0,
        work_schedule: None,
        leave_frac: 0.0,
        standdown_frac: 0.0,
        medical_frac: 0.0,
        training_frac: 0.0,
        range_frac: 0.0,
    };
    let pilot_profile = profiles.get("pilot").unwrap_or(&default_profile);
    let so_profile = profiles.get("so").unwrap_or(&default_profile);
    let intel_profile = profiles.get("intel").unwrap_or(&default_profile);

    let mut pools: OrderedMap<UnitPools> = OrderedMap::new();
    for unit in &unit_list {
        let ac_total = initial.aircraft_by_unit.get(unit).copied().unwrap_or(0);
        let crew = initial.crew_by_unit.get(unit).cloned().unwrap_or_default();

        let pilot_effective = personnel::effective_count(crew.pilot, pilot_profile.factor);
        let so_effective = personnel::effective_count(crew.so, so_profile.factor);
        let intel_effective = personnel::effective_count(crew.intel, intel_profile.factor);

        let mut pilot_queue = CrewQueue::new(
            unit.clone(),
            "pilot",
            pilot_effective,
            pilot_profile.daily_crew_rest_hours,
            pilot_profile.work_schedule.clone(),
        );
        let mut so_queue = CrewQueue::new(
            unit.clone(),
            "so",
            so_effective,
            so_profile.daily_crew_rest_hours,
            so_profile.work_schedule.clone(),
        );
        let mut intel_queue = CrewQueue::new(
            unit.clone(),
            "intel",
            intel_effective,
            intel_profile.daily_crew_rest_hours,
            intel_profile.work_schedule.clone(),
        );

        let pilot_rotation = duty_rotation_size(events, |d| d.requires_pilot, pilot_effective);
        let so_rotation = duty_rotation_size(events, |d| d.requires_so, so_effective);
        let intel_rotation = duty_rotation_size(events, |d| d.requires_intel, intel_effective);
        pilot_queue.set_rotation_pool(rotation_ids(pilot_rotation));
        so_queue.set_rotation_pool(rotation_ids(so_rotation));
        intel_queue.set_rotation_pool(rotation_ids(intel_rotation));

        let mut payloads = OrderedMap::new();
        if let Some(unit_payloads) = initial.payload_by_unit.get(unit) {
            let mut types: Vec<&String> = unit_payloads.keys().collect();
            types.sort();
            for ptype in types {
                let count = unit_payloads[ptype];
                payloads.insert(ptype.clone(), EquipmentPool::new(format!("payload:{unit}:{ptype}"), count));
            }
        }

        pools.insert(
            unit.clone(),
            UnitPools {
                aircraft: EquipmentPool::new(format!("aircraft:{unit}"), ac_total),
                payloads,
                pilot: pilot_queue,
                so: so_queue,
                intel: intel_queue,
            },
        );
    }
    pools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_without_split() {
        let units = vec!["A".to_string(), "B".to_string()];
        let seq = assign_units_interleaved(&units, None, 4);
        assert_eq!(seq, vec!["A", "B", "A", "B"]);
    }

    #[test]
    fn split_hits_target_counts_and_interleaves() {
        let units = vec!["A".to_string(), "B".to_string()];
        let mut weights = HashMap::new();
        weights.insert("A".to_string(), 0.75);
        weights.insert("B".to_string(), 0.25);
        let seq = assign_units_interleaved(&units, Some(&weights), 100);
        let a_count = seq.iter().filter(|u| *u == "A").count();
        let b_count = seq.iter().filter(|u| *u == "B").count();
        assert_eq!(a_count, 75);
        assert_eq!(b_count, 25);

        let mut run = 0;
        let mut max_run = 0;
        for u in &seq {
            if u == "A" {
                run += 1;
                max_run = max_run.max(run);
            } else {
                run = 0;
            }
        }
        assert!(max_run <= 5, "longest A run was {max_run}, expected <= 5");
    }

    #[test]
    fn zero_weight_units_excluded_by_round_robin_fallback() {
        let units = vec!["A".to_string()];
        let seq = assign_units_interleaved(&units, None, 3);
        assert_eq!(seq, vec!["A", "A", "A"]);
    }
}
