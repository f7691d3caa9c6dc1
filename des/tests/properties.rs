//! Property tests for the universal invariants in spec §8, generated over a
//! single-unit scenario with randomized resource counts and timing.

mod common;

use common::{no_overrides, single_unit_state};
use proptest::prelude::*;
use serde_json::json;
use squadron_des::{SeededRandomSource, TimelineEvent};

fn run_with(aircraft: u32, pilot: u32, so: u32, horizon: f64, every_hours: f64, flight_hours: f64, seed: u64) -> squadron_des::Results {
    let scenario: squadron_des::Scenario = serde_json::from_value(json!({
        "horizon_hours": horizon,
        "mission_types": [{
            "name": "ISR",
            "flight_time": {"dist": {"type": "deterministic", "value_hours": flight_hours}},
            "required_aircrew": {"pilot": 1, "so": 1},
        }],
        "demand": [{"mission_type": "ISR", "type": "deterministic", "every_hours": every_hours, "start_at_hours": 0.0}],
    }))
    .unwrap();
    let state = single_unit_state(aircraft, pilot, so, 0);
    let mut rng = SeededRandomSource::new(seed);
    squadron_des::run(&scenario, &state, &no_overrides(), &mut rng).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn requested_equals_started_plus_rejected(
        aircraft in 0u32..4,
        pilot in 0u32..4,
        so in 0u32..4,
        horizon in 1.0f64..120.0,
        every_hours in 0.5f64..12.0,
        flight_hours in 0.1f64..6.0,
    ) {
        let results = run_with(aircraft, pilot, so, horizon, every_hours, flight_hours, 7);
        prop_assert_eq!(results.missions.requested, results.missions.started + results.missions.rejected);
    }

    #[test]
    fn rejection_causes_partition_the_rejected_count(
        aircraft in 0u32..4,
        pilot in 0u32..4,
        so in 0u32..4,
        horizon in 1.0f64..120.0,
        every_hours in 0.5f64..12.0,
        flight_hours in 0.1f64..6.0,
    ) {
        let results = run_with(aircraft, pilot, so, horizon, every_hours, flight_hours, 7);
        let r = &results.rejections;
        let sum = r.aircraft + r.pilot + r.so + r.intel + r.payload;
        prop_assert_eq!(sum, results.missions.rejected);
    }

    #[test]
    fn mission_segments_chain_from_demand_to_finish(
        aircraft in 1u32..4,
        pilot in 1u32..4,
        so in 1u32..4,
        horizon in 5.0f64..120.0,
        every_hours in 1.0f64..12.0,
        flight_hours in 0.1f64..6.0,
    ) {
        let results = run_with(aircraft, pilot, so, horizon, every_hours, flight_hours, 11);
        for event in &results.timeline {
            if let TimelineEvent::Mission { demand_time, finish_time, segments, .. } = event {
                prop_assert_eq!(segments.len(), 7);
                prop_assert_eq!(segments[0].start, *demand_time);
                prop_assert_eq!(segments.last().unwrap().end, *finish_time);
                for w in segments.windows(2) {
                    prop_assert_eq!(w[0].end, w[1].start);
                }
            }
        }
    }

    #[test]
    fn pool_utilization_stays_within_unit_interval(
        aircraft in 0u32..4,
        pilot in 0u32..4,
        so in 0u32..4,
        horizon in 1.0f64..120.0,
        every_hours in 0.5f64..12.0,
        flight_hours in 0.1f64..6.0,
    ) {
        let results = run_with(aircraft, pilot, so, horizon, every_hours, flight_hours, 13);
        let util = results.utilization.get("U").expect("unit U must have a utilization entry");
        prop_assert!((0.0..=1.0).contains(&util.aircraft));
        prop_assert!((0.0..=1.0).contains(&util.pilot));
        prop_assert!((0.0..=1.0).contains(&util.so));
    }

    #[test]
    fn fixed_seed_reruns_are_byte_identical(
        aircraft in 0u32..4,
        pilot in 0u32..4,
        so in 0u32..4,
        horizon in 1.0f64..120.0,
        every_hours in 0.5f64..12.0,
        flight_hours in 0.1f64..6.0,
    ) {
        let a = run_with(aircraft, pilot, so, horizon, every_hours, flight_hours, 99);
        let b = run_with(aircraft, pilot, so, horizon, every_hours, flight_hours, 99);
        prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
