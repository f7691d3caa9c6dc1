//! Result finalizer (spec §4.8): per-resource utilization/efficiency, crew
//! busy/idle snapshots, and the per-(unit, specialty) availability timeline.

use std::collections::HashMap;

use crate::distribution;
use crate::init::UnitPools;
use crate::ordermap::OrderedMap;
use crate::personnel::{self, PersonnelProfile};
use crate::results::{
    AvailabilityBuckets, AvailabilityPoint, AvailabilityTimeline, CrewCountsOut, CrewStats, PoolStats, UnitUtilization,
};
use crate::state_loader::InitialResources;
use crate::types::Scenario;

/// Average total mission duration across every configured mission type,
/// used as the shared `mean_duration` baseline for every pool/queue's
/// efficiency figure (spec §4.8 leaves the exact baseline unspecified for
/// pools whose allocations vary in length; resolved here, see DESIGN.md).
fn mean_total_mission_duration(scenario: &Scenario) -> f64 {
    if scenario.mission_types.is_empty() {
        return 0.0;
    }
    let total: f64 = scenario
        .mission_types
        .iter()
        .map(|mt| {
            let pre = distribution::mean_opt(scenario.process_times.preflight.as_ref());
            let post = distribution::mean_opt(scenario.process_times.postflight.as_ref());
            let turn = distribution::mean_opt(scenario.process_times.turnaround.as_ref());
            let mount: f64 = mt.required_payload_types.iter().filter_map(|p| scenario.process_times.mount_times.get(p)).map(distribution::mean).sum();
            let flight = distribution::mean(&mt.flight_time.dist);
            pre + mount + mt.flight_time.transit_in_hours + flight + mt.flight_time.transit_out_hours + post + turn
        })
        .sum();
    total / scenario.mission_types.len() as f64
}

fn crew_stats(total: u32, busy: u32, allocations: u32, denials: u32) -> CrewStats {
    CrewStats { allocations, denials, busy, idle: total.saturating_sub(busy) }
}

/// Split an integer `gap` across five weighted buckets using the
/// largest-remainder method; falls back to an even split when every weight
/// is zero.
fn apportion(gap: u32, weights: [f64; 5]) -> [u32; 5] {
    if gap == 0 {
        return [0; 5];
    }
    let total_weight: f64 = weights.iter().sum();
    let w = if total_weight > 0.0 { weights } else { [1.0; 5] };
    let total_weight: f64 = w.iter().sum();
    let exact: Vec<f64> = w.iter().map(|v| v / total_weight * gap as f64).collect();
    let mut out = [0u32; 5];
    for i in 0..5 {
        out[i] = exact[i].floor() as u32;
    }
    let mut left = gap as i64 - out.iter().map(|&v| v as i64).sum::<i64>();
    let mut order: Vec<usize> = (0..5).collect();
    order.sort_by(|&a, &b| (exact[b] - out[b] as f64).partial_cmp(&(exact[a] - out[a] as f64)).unwrap());
    for &i in &order {
        if left <= 0 {
            break;
        }
        out[i] += 1;
        left -= 1;
    }
    out
}

fn duty_bucket(duty_type: &str) -> &'static str {
    match duty_type.to_ascii_lowercase().as_str() {
        "odo" => "odo",
        "sdo" => "sdo",
        _ => "sdnco",
    }
}

pub fn build_utilization(
    scenario: &Scenario,
    initial: &InitialResources,
    profiles: &HashMap<String, PersonnelProfile>,
    pools: &OrderedMap<UnitPools>,
) -> OrderedMap<UnitUtilization> {
    let mean_duration = mean_total_mission_duration(scenario);
    let horizon = scenario.horizon_hours;
    let mut out = OrderedMap::new();

    for (unit, unit_pools) in pools.iter() {
        let crew = initial.crew_by_unit.get(unit).cloned().unwrap_or_default();
        let pilot_factor = profiles.get("pilot").map(|p| p.factor).unwrap_or(1.0);
        let so_factor = profiles.get("so").map(|p| p.factor).unwrap_or(1.0);
        let intel_factor = profiles.get("intel").map(|p| p.factor).unwrap_or(1.0);

        let (pilot_busy, _) = unit_pools.pilot.busy_idle_at(horizon);
        let (so_busy, _) = unit_pools.so.busy_idle_at(horizon);
        let (intel_busy, _) = unit_pools.intel.busy_idle_at(horizon);

        out.insert(
            unit,
            UnitUtilization {
                aircraft: unit_pools.aircraft.utilization(horizon),
                aircraft_efficiency: unit_pools.aircraft.efficiency(mean_duration),
                aircraft_stats: PoolStats {
                    allocations: unit_pools.aircraft.allocations(),
                    denials: unit_pools.aircraft.denials(),
                    busy_time: unit_pools.aircraft.busy_time(),
                },
                pilot: unit_pools.pilot.utilization(horizon),
                pilot_efficiency: unit_pools.pilot.efficiency(mean_duration),
                pilot_stats: crew_stats(unit_pools.pilot.total(), pilot_busy, unit_pools.pilot.allocations(), unit_pools.pilot.denials()),
                so: unit_pools.so.utilization(horizon),
                so_efficiency: unit_pools.so.efficiency(mean_duration),
                so_stats: crew_stats(unit_pools.so.total(), so_busy, unit_pools.so.allocations(), unit_pools.so.denials()),
                intel: unit_pools.intel.utilization(horizon),
                intel_efficiency: unit_pools.intel.efficiency(mean_duration),
                intel_stats: crew_stats(unit_pools.intel.total(), intel_busy, unit_pools.intel.allocations(), unit_pools.intel.denials()),
                availability_factors: crate::results::AvailabilityFactors { pilot: pilot_factor, so: so_factor, intel: intel_factor },
                initial_crew: CrewCountsOut { pilot: crew.pilot, so: crew.so, intel: crew.intel },
                effective_crew: CrewCountsOut {
                    pilot: personnel::effective_count(crew.pilot, pilot_factor),
                    so: personnel::effective_count(crew.so, so_factor),
                    intel: personnel::effective_count(crew.intel, intel_factor),
                },
            },
        );
    }
    out
}

fn specialty_queue<'a>(pools: &'a UnitPools, specialty: &str) -> &'a crate::crew::CrewQueue {
    match specialty {
        "pilot" => &pools.pilot,
        "so" => &pools.so,
        _ => &pools.intel,
    }
}

fn build_specialty_timeline(
    scenario: &Scenario,
    initial: &InitialResources,
    profile: &PersonnelProfile,
    specialty: &str,
    pools: &OrderedMap<UnitPools>,
) -> HashMap<String, Vec<AvailabilityPoint>> {
    let horizon = scenario.horizon_hours;
    let mut out = HashMap::new();
    let weights = [profile.leave_frac, profile.standdown_frac, profile.medical_frac, profile.training_frac, profile.range_frac];

    for (unit, unit_pools) in pools.iter() {
        let total = match specialty {
            "pilot" => initial.crew_by_unit.get(unit).map(|c| c.pilot).unwrap_or(0),
            "so" => initial.crew_by_unit.get(unit).map(|c| c.so).unwrap_or(0),
            _ => initial.crew_by_unit.get(unit).map(|c| c.intel).unwrap_or(0),
        };
        let queue = specialty_queue(unit_pools, specialty);
        let effective = queue.total();
        let gap = total.saturating_sub(effective);
        let [leave, standdown, medical, training, range] = apportion(gap, weights);

        let mut points = Vec::new();
        let mut hour = 0u32;
        while (hour as f64) < horizon {
            let t = hour as f64;
            let snapshot = queue.classify_at(t);
            let mut buckets = AvailabilityBuckets {
                work_schedule: snapshot.work_schedule,
                leave,
                standdown,
                medical,
                training,
                range,
                ..Default::default()
            };
            for (duty_type, count) in &snapshot.on_duty {
                match duty_bucket(duty_type) {
                    "odo" => buckets.odo += *count,
                    "sdo" => buckets.sdo += *count,
                    _ => buckets.sdnco += *count,
                }
            }
            points.push(AvailabilityPoint {
                time: t,
                day: hour / 24 + 1,
                total,
                available: snapshot.available,
                unavailable: buckets,
            });
            hour += 1;
        }
        out.insert(unit.to_string(), points);
    }
    out
}

pub fn build_availability_timeline(
    scenario: &Scenario,
    initial: &InitialResources,
    profiles: &HashMap<String, PersonnelProfile>,
    pools: &OrderedMap<UnitPools>,
) -> Option<AvailabilityTimeline> {
    if scenario.personnel_availability.is_empty() {
        return None;
    }
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

    let pilot = if scenario.personnel_availability.contains_key("pilot") {
        build_specialty_timeline(scenario, initial, profiles.get("pilot").unwrap_or(&default_profile), "pilot", pools)
    } else {
        HashMap::new()
    };
    let so = if scenario.personnel_availability.contains_key("so") {
        build_specialty_timeline(scenario, initial, profiles.get("so").unwrap_or(&default_profile), "so", pools)
    } else {
        HashMap::new()
    };
    let intel = if scenario.personnel_availability.contains_key("intel") {
        build_specialty_timeline(scenario, initial, profiles.get("intel").unwrap_or(&default_profile), "intel", pools)
    } else {
        HashMap::new()
    };

    Some(AvailabilityTimeline { pilot, so, intel })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apportion_sums_to_gap() {
        let weights = [0.4, 0.3, 0.1, 0.1, 0.1];
        let out = apportion(7, weights);
        assert_eq!(out.iter().sum::<u32>(), 7);
    }

    #[test]
    fn apportion_zero_gap_is_all_zero() {
        assert_eq!(apportion(0, [1.0; 5]), [0; 5]);
    }

    #[test]
    fn apportion_falls_back_to_even_split_when_weights_zero() {
        let out = apportion(5, [0.0; 5]);
        assert_eq!(out.iter().sum::<u32>(), 5);
    }

    #[test]
    fn duty_bucket_maps_known_names_case_insensitively() {
        assert_eq!(duty_bucket("ODO"), "odo");
        assert_eq!(duty_bucket("Sdo"), "sdo");
        assert_eq!(duty_bucket("sdnco"), "sdnco");
        assert_eq!(duty_bucket("custom"), "sdnco");
    }
}
