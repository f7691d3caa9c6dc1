//! Squadron discrete-event scheduler core: a pure function from
//! `(scenario, state snapshot, overrides, random source)` to a `Results`
//! object, per the module layout below.

mod crew;
mod demand;
mod dispatch;
mod distribution;
mod error;
mod finalize;
mod init;
mod ordermap;
mod overrides;
mod personnel;
mod pool;
mod results;
mod rng;
mod state_loader;
mod timeline;
mod types;

pub use distribution::Distribution;
pub use error::{SimError, SimResult};
pub use results::{
    AvailabilityBuckets, AvailabilityFactors, AvailabilityPoint, AvailabilityTimeline, CrewCountsOut, CrewStats, DutyCounts,
    InitialResourcesOut, MissionCounts, PoolStats, RejectionCounts, Results, UnitUtilization,
};
pub use rng::{RandomSource, SeededRandomSource, ThreadRandomSource};
pub use state_loader::{CrewCounts, InitialResources};
pub use timeline::{AssignedCrew, CrewMemberRef, RejectionReason, TimelineEvent, TimelineSegment};
pub use types::{
    DemandKind, DemandSpec, DutyRequirements, DutyTypeSpec, MissionType, Overrides, PersonnelAvailabilitySpec, ProcessTimes,
    Scenario, State, StateTable, UnitId, UnitOverrides, UnitPolicy,
};

/// Fatal pre-flight checks on the scenario (spec §7): a negative or
/// non-finite horizon, or a demand referencing a mission type that was
/// never declared.
fn validate_scenario(scenario: &Scenario) -> SimResult<()> {
    if !scenario.horizon_hours.is_finite() || scenario.horizon_hours < 0.0 {
        return Err(SimError::InvalidScenario("horizon_hours must be a non-negative finite number".to_string()));
    }
    for demand in &scenario.demand {
        if !scenario.mission_types.iter().any(|mt| mt.name == demand.mission_type) {
            return Err(SimError::InvalidScenario(format!("demand references unknown mission_type '{}'", demand.mission_type)));
        }
    }
    Ok(())
}

fn count_completed(timeline: &[TimelineEvent], horizon_hours: f64) -> u32 {
    timeline
        .iter()
        .filter(|e| matches!(e, TimelineEvent::Mission { finish_time, .. } if *finish_time <= horizon_hours))
        .count() as u32
}

fn complete_by_type(
    mut by_type: ordermap::OrderedMap<MissionCounts>,
    timeline: &[TimelineEvent],
    horizon_hours: f64,
) -> ordermap::OrderedMap<MissionCounts> {
    for event in timeline {
        if let TimelineEvent::Mission { mission_type, finish_time, .. } = event {
            if *finish_time <= horizon_hours {
                by_type.entry_or_insert_with(mission_type, MissionCounts::default).completed += 1;
            }
        }
    }
    by_type
}

fn to_initial_resources_out(initial: &InitialResources) -> InitialResourcesOut {
    InitialResourcesOut {
        units: initial.units.clone(),
        aircraft_by_unit: initial.aircraft_by_unit.clone(),
        staffing_by_unit: initial
            .crew_by_unit
            .iter()
            .map(|(unit, c)| (unit.clone(), CrewCountsOut { pilot: c.pilot, so: c.so, intel: c.intel }))
            .collect(),
        payload_by_unit: initial.payload_by_unit.clone(),
        overrides_applied: initial.overrides_applied,
    }
}

/// Run one deterministic pass of the scheduler. The same `scenario`,
/// `state`, `overrides`, and random-source stream always yield the same
/// `Results` (spec §5).
pub fn run(scenario: &Scenario, state: &State, overrides: &Overrides, rng: &mut dyn RandomSource) -> SimResult<Results> {
    validate_scenario(scenario)?;

    let mut initial = state_loader::load(state)?;
    overrides::apply(&mut initial, overrides, &scenario.mission_types);

    let profiles = personnel::process_all(&scenario.personnel_availability);
    let mut events = demand::generate(scenario, rng);
    let mut pools = init::build(scenario, &initial, &profiles, &mut events);

    let outcome = dispatch::run(scenario, &events, &mut pools, rng);

    let completed = count_completed(&outcome.timeline, scenario.horizon_hours);
    let by_type = complete_by_type(outcome.by_type, &outcome.timeline, scenario.horizon_hours);
    let utilization = finalize::build_utilization(scenario, &initial, &profiles, &pools);
    let availability_timeline = finalize::build_availability_timeline(scenario, &initial, &profiles, &pools);

    Ok(Results {
        horizon_hours: scenario.horizon_hours,
        missions: MissionCounts { completed, ..outcome.missions },
        rejections: outcome.rejections,
        duties: outcome.duties,
        utilization,
        by_type,
        timeline: outcome.timeline,
        initial_resources: to_initial_resources_out(&initial),
        availability_timeline,
    })
}
