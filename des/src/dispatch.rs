//! Dispatcher (spec §4.7): a single pass over the sorted event list that
//! admits or rejects each mission demand and fills or skips each duty
//! demand, recording a timeline as it goes.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::crew::{CrewQueue, ShiftRequest};
use crate::demand::{DutyDemandEvent, Event, MissionDemandEvent};
use crate::distribution::{self, Distribution};
use crate::init::UnitPools;
use crate::ordermap::OrderedMap;
use crate::results::{DutyCounts, MissionCounts, RejectionCounts};
use crate::rng::RandomSource;
use crate::timeline::{AssignedCrew, CrewMemberRef, RejectionReason, TimelineEvent, TimelineSegment};
use crate::types::{CrewDistributionPolicy, MissionType, Scenario};

pub struct DispatchOutcome {
    pub missions: MissionCounts,
    pub rejections: RejectionCounts,
    pub duties: DutyCounts,
    pub by_type: OrderedMap<MissionCounts>,
    pub timeline: Vec<TimelineEvent>,
}

struct AcceptedMission {
    unit: String,
    start: f64,
    end: f64,
}

fn unit_weight(unit: &str, mission_split: Option<&HashMap<String, f64>>) -> f64 {
    match mission_split {
        Some(weights) => weights.get(unit).copied().unwrap_or(0.0),
        None => 1.0,
    }
}

/// Sample a mission's mount+process span (no turnaround), matching the
/// `accepted_missions` bookkeeping window of spec §4.7.1 step 6.
fn sample_mission_span(scenario: &Scenario, mt: &MissionType, rng: &mut dyn RandomSource) -> f64 {
    let pre = distribution::sample_opt(scenario.process_times.preflight.as_ref(), rng);
    let mount: f64 = mt
        .required_payload_types
        .iter()
        .map(|p| distribution::sample_opt(scenario.process_times.mount_times.get(p), rng))
        .sum();
    let flight = distribution::sample(&mt.flight_time.dist, rng);
    let post = distribution::sample_opt(scenario.process_times.postflight.as_ref(), rng);
    pre + mount + mt.flight_time.transit_in_hours + flight + mt.flight_time.transit_out_hours + post
}

fn payload_available(pools: &mut UnitPools, ptype: &str, t: f64) -> u32 {
    pools.payloads.get_mut(ptype).map(|p| p.available_at(t)).unwrap_or(0)
}

fn lookahead_reservations(events: &[Event], after: usize, horizon_end: f64) -> (u32, u32, u32) {
    let (mut pilot, mut so, mut intel) = (0u32, 0u32, 0u32);
    for event in &events[after..] {
        let Event::Duty(d) = event else { continue };
        if d.time >= horizon_end {
            continue;
        }
        if d.is_odo {
            continue;
        }
        if d.requires_pilot {
            pilot += 1;
        }
        if d.requires_so {
            so += 1;
        }
        if d.requires_intel {
            intel += 1;
        }
    }
    (pilot, so, intel)
}

fn effective_required(count: u32, shifts: &Option<Vec<f64>>) -> u32 {
    match shifts {
        Some(s) if !s.is_empty() => s.len() as u32,
        _ => count,
    }
}

fn role_queue<'a>(pools: &'a mut UnitPools, role: &str) -> &'a mut CrewQueue {
    match role {
        "pilot" => &mut pools.pilot,
        "so" => &mut pools.so,
        _ => &mut pools.intel,
    }
}

fn assign_crew(crew: &mut AssignedCrew, role: &str, refs: Vec<CrewMemberRef>) {
    match role {
        "pilot" => crew.pilots.extend(refs),
        "so" => crew.sos.extend(refs),
        _ => crew.intel.extend(refs),
    }
}

#[allow(clippy::too_many_arguments)]
fn dispatch_mission(
    scenario: &Scenario,
    m: &MissionDemandEvent,
    events: &[Event],
    idx: usize,
    pools: &mut OrderedMap<UnitPools>,
    accepted: &mut Vec<AcceptedMission>,
    rng: &mut dyn RandomSource,
    out: &mut DispatchOutcome,
) {
    out.missions.requested += 1;
    let by_type = out.by_type.entry_or_insert_with(&m.mission_type, MissionCounts::default);
    by_type.requested += 1;

    let Some(mt) = scenario.mission_types.iter().find(|mt| mt.name == m.mission_type) else {
        return;
    };
    let Some(unit) = m.assigned_unit.clone() else {
        record_rejection(out, m.time, "UNASSIGNED".to_string(), m.mission_type.clone(), RejectionReason::Aircraft);
        return;
    };
    let Some(unit_pools) = pools.get_mut(&unit) else {
        record_rejection(out, m.time, unit, m.mission_type.clone(), RejectionReason::Aircraft);
        return;
    };

    let t = m.time;
    let pre = distribution::sample_opt(scenario.process_times.preflight.as_ref(), rng);
    let mount: f64 = mt
        .required_payload_types
        .iter()
        .map(|p| distribution::sample_opt(scenario.process_times.mount_times.get(p), rng))
        .sum();
    let flight = distribution::sample(&mt.flight_time.dist, rng);
    let post = distribution::sample_opt(scenario.process_times.postflight.as_ref(), rng);
    let turn = distribution::sample_opt(scenario.process_times.turnaround.as_ref(), rng);
    let transit_in = mt.flight_time.transit_in_hours;
    let transit_out = mt.flight_time.transit_out_hours;
    let total_duration = pre + mount + transit_in + flight + transit_out + post + turn;

    let (hold_start, hold_end) = if scenario.process_times.hold_crew_during_process_times {
        (t, t + total_duration)
    } else {
        (t + pre + mount, t + pre + mount + transit_in + flight + transit_out)
    };
    let hold_duration = (hold_end - hold_start).max(0.0);

    let lookahead = &scenario.duty_requirements.lookahead;
    let (pilot_reserved, so_reserved, intel_reserved) = if lookahead.disabled {
        (0, 0, 0)
    } else {
        lookahead_reservations(events, idx + 1, t + lookahead.hours)
    };

    let need_pilot = mt.need_pilot();
    let need_so = mt.need_so();
    let need_intel = mt.need_intel();
    let rotation = mt.crew_rotation.as_ref().filter(|c| c.enabled);
    let pilot_shifts = rotation.map(|r| r.pilot_shifts.clone());
    let so_shifts = rotation.map(|r| r.so_shifts.clone());
    let intel_shifts = rotation.map(|r| r.intel_shifts.clone());
    let eff_pilot = effective_required(need_pilot, &pilot_shifts);
    let eff_so = effective_required(need_so, &so_shifts);
    let eff_intel = effective_required(need_intel, &intel_shifts);

    let mut failure: Option<RejectionReason> = None;
    'checks: for ptype in &mt.required_payload_types {
        if payload_available(unit_pools, ptype, t) < 1 {
            failure = Some(RejectionReason::Payload);
            break 'checks;
        }
    }
    if failure.is_none() && unit_pools.aircraft.available_at(t) < 1 {
        failure = Some(RejectionReason::Aircraft);
    }
    if failure.is_none()
        && eff_pilot > 0
        && unit_pools.pilot.available_over(hold_start, hold_end, false).saturating_sub(pilot_reserved) < eff_pilot
    {
        failure = Some(RejectionReason::Pilot);
    }
    if failure.is_none()
        && eff_so > 0
        && unit_pools.so.available_over(hold_start, hold_end, false).saturating_sub(so_reserved) < eff_so
    {
        failure = Some(RejectionReason::So);
    }
    if failure.is_none()
        && eff_intel > 0
        && unit_pools.intel.available_over(hold_start, hold_end, false).saturating_sub(intel_reserved) < eff_intel
    {
        failure = Some(RejectionReason::Intel);
    }

    if let Some(reason) = failure {
        trace!(unit, mission_type = %m.mission_type, reason = reason.as_str(), "mission rejected");
        record_rejection(out, t, unit, m.mission_type.clone(), reason);
        return;
    }

    for ptype in &mt.required_payload_types {
        if let Some(p) = unit_pools.payloads.get_mut(ptype) {
            let _ = p.try_acquire(t, total_duration, 1);
        }
    }
    let _ = unit_pools.aircraft.try_acquire(t, total_duration, 1);

    let mut crew = AssignedCrew::default();
    for (role, need, shifts) in [("pilot", eff_pilot, pilot_shifts), ("so", eff_so, so_shifts), ("intel", eff_intel, intel_shifts)] {
        if need == 0 {
            continue;
        }
        let shift_list: Vec<f64> = shifts.filter(|s| !s.is_empty()).unwrap_or_else(|| vec![hold_duration; need as usize]);
        let sequential = rotation.map(|r| r.sequential).unwrap_or(false);
        let queue = role_queue(unit_pools, role);
        let req = ShiftRequest {
            start: hold_start,
            shifts: &shift_list,
            is_duty: false,
            duty_type: None,
            sequential,
            ignore_schedule: false,
            recovery_hours: 0.0,
            distribution: mt.crew_distribution,
            rotation_only: false,
        };
        if let Some(assignments) = queue.try_acquire_shifts(&req) {
            let refs = assignments.into_iter().map(|a| CrewMemberRef { id: a.id, start: a.start, end: a.end }).collect();
            assign_crew(&mut crew, role, refs);
        } else {
            debug!(unit, role, "crew commit failed after admission passed (invariant violation)");
        }
    }

    out.missions.started += 1;
    let by_type = out.by_type.entry_or_insert_with(&m.mission_type, MissionCounts::default);
    by_type.started += 1;
    let mission_number = by_type.started;

    let mut cursor = t;
    let mut push_segment = |segments: &mut Vec<TimelineSegment>, name: &'static str, dur: f64| {
        let start = cursor;
        cursor += dur;
        segments.push(TimelineSegment { name, start, end: cursor });
    };
    let mut segments = Vec::with_capacity(7);
    push_segment(&mut segments, "preflight", pre);
    push_segment(&mut segments, "mount", mount);
    push_segment(&mut segments, "transit_in", transit_in);
    push_segment(&mut segments, "flight", flight);
    push_segment(&mut segments, "transit_out", transit_out);
    push_segment(&mut segments, "postflight", post);
    push_segment(&mut segments, "turnaround", turn);
    let finish_time = cursor;

    accepted.push(AcceptedMission { unit: unit.clone(), start: t, end: t + pre + mount + transit_in + flight + transit_out + post });

    out.timeline.push(TimelineEvent::Mission {
        unit,
        mission_type: m.mission_type.clone(),
        mission_number,
        demand_time: t,
        finish_time,
        crew_hold_start: hold_start,
        crew_hold_end: hold_end,
        segments,
        crew,
    });
}

fn record_rejection(out: &mut DispatchOutcome, time: f64, unit: String, mission_type: String, reason: RejectionReason) {
    out.missions.rejected += 1;
    let by_type = out.by_type.entry_or_insert_with(&mission_type, MissionCounts::default);
    by_type.rejected += 1;
    match reason {
        RejectionReason::Payload => out.rejections.payload += 1,
        RejectionReason::Aircraft => out.rejections.aircraft += 1,
        RejectionReason::Pilot => out.rejections.pilot += 1,
        RejectionReason::So => out.rejections.so += 1,
        RejectionReason::Intel => out.rejections.intel += 1,
    }
    out.timeline.push(TimelineEvent::Rejection { time, unit, mission_type, reason: reason.as_str() });
}

fn duty_id(occurrence_index: u64, shifts_per_day: u32) -> String {
    let shifts_per_day = shifts_per_day.max(1) as u64;
    let day = occurrence_index / shifts_per_day + 1;
    let shift = occurrence_index % shifts_per_day + 1;
    if shifts_per_day == 1 {
        day.to_string()
    } else {
        format!("{day}-{shift}")
    }
}

fn merge_intersecting(t: f64, window_end: f64, spans: &[(f64, f64)]) -> Option<(f64, f64)> {
    let hits: Vec<(f64, f64)> = spans.iter().copied().filter(|&(s, e)| s < window_end && t < e).collect();
    if hits.is_empty() {
        return None;
    }
    let min_start = hits.iter().map(|&(s, _)| s).fold(f64::INFINITY, f64::min);
    let max_end = hits.iter().map(|&(_, e)| e).fold(f64::NEG_INFINITY, f64::max);
    Some((t.max(min_start), window_end.min(max_end)))
}

#[allow(clippy::too_many_arguments)]
fn dispatch_duty(
    scenario: &Scenario,
    d: &DutyDemandEvent,
    events: &[Event],
    idx: usize,
    pools: &mut OrderedMap<UnitPools>,
    accepted: &[AcceptedMission],
    cycle_index: &mut HashMap<(String, String), usize>,
    rng: &mut dyn RandomSource,
    out: &mut DispatchOutcome,
) {
    let eligible_units: Vec<String> = pools
        .keys()
        .filter(|u| unit_weight(u, scenario.unit_policy.mission_split.as_ref()) > 0.0)
        .map(|u| u.to_string())
        .collect();

    let id = duty_id(d.occurrence_index, d.shifts_per_day);
    let window_end = d.time + d.duration;

    for unit in eligible_units {
        let (start, end, mission_aligned, original_window) = if d.is_odo {
            let mut spans: Vec<(f64, f64)> = accepted.iter().filter(|a| a.unit == unit).map(|a| (a.start, a.end)).collect();
            for event in &events[idx + 1..] {
                let Event::Mission(m) = event else { continue };
                if m.time >= window_end {
                    break;
                }
                if m.assigned_unit.as_deref() != Some(unit.as_str()) {
                    continue;
                }
                let Some(mt) = scenario.mission_types.iter().find(|mt| mt.name == m.mission_type) else { continue };
                let span = sample_mission_span(scenario, mt, rng);
                spans.push((m.time, m.time + span));
            }
            match merge_intersecting(d.time, window_end, &spans) {
                Some((s, e)) => (s, e, Some(true), Some((d.time, window_end))),
                None => continue,
            }
        } else {
            (d.time, window_end, None, None)
        };
        let duration = (end - start).max(0.0);

        out.duties.requested += 1;

        let mut eligible: Vec<&'static str> = Vec::new();
        if d.requires_pilot {
            eligible.push("pilot");
        }
        if d.requires_so {
            eligible.push("so");
        }
        if d.requires_intel {
            eligible.push("intel");
        }
        if eligible.is_empty() {
            out.duties.unfilled += 1;
            continue;
        }

        let Some(unit_pools) = pools.get_mut(&unit) else { continue };
        let key = (unit.clone(), d.duty_type.clone());
        let base = *cycle_index.get(&key).unwrap_or(&0);

        let mut filled = false;
        for offset in 0..eligible.len() {
            let role = eligible[(base + offset) % eligible.len()];
            let queue = role_queue(unit_pools, role);
            let available = if d.is_odo {
                queue.available_in_rotation_at(start, !d.respect_work_schedule)
            } else {
                queue.available_at(start, !d.respect_work_schedule)
            };
            if available < 1 {
                continue;
            }
            let req = ShiftRequest {
                start,
                shifts: &[duration],
                is_duty: true,
                duty_type: Some(&d.duty_type),
                sequential: false,
                ignore_schedule: !d.respect_work_schedule,
                recovery_hours: d.duty_recovery_hours,
                distribution: CrewDistributionPolicy::Distribute,
                rotation_only: d.is_odo,
            };
            if let Some(assignments) = queue.try_acquire_shifts(&req) {
                out.duties.filled += 1;
                cycle_index.insert(key.clone(), (base + offset + 1) % eligible.len());
                let mut crew = AssignedCrew::default();
                for a in &assignments {
                    if d.duty_recovery_hours > 0.0 {
                        out.timeline.push(TimelineEvent::DutyRecovery {
                            unit: unit.clone(),
                            crew_type: role.to_string(),
                            crew_id: a.id,
                            start: a.end,
                            end: a.end + d.duty_recovery_hours,
                            reason: format!("{} recovery", d.duty_type),
                        });
                    }
                }
                assign_crew(&mut crew, role, assignments.into_iter().map(|a| CrewMemberRef { id: a.id, start: a.start, end: a.end }).collect());
                out.timeline.push(TimelineEvent::Duty {
                    unit: unit.clone(),
                    duty_type: d.duty_type.clone(),
                    duty_id: id.clone(),
                    start,
                    end,
                    can_use_pilot: d.requires_pilot,
                    can_use_so: d.requires_so,
                    can_use_intel: d.requires_intel,
                    crew,
                    mission_aligned,
                    original_window,
                });
                filled = true;
                break;
            }
        }
        if !filled {
            out.duties.unfilled += 1;
        }
    }
}

/// Walk the sorted event list, aborting once `event.time() > horizon_hours`.
pub fn run(scenario: &Scenario, events: &[Event], pools: &mut OrderedMap<UnitPools>, rng: &mut dyn RandomSource) -> DispatchOutcome {
    let mut out = DispatchOutcome {
        missions: MissionCounts::default(),
        rejections: RejectionCounts::default(),
        duties: DutyCounts::default(),
        by_type: OrderedMap::new(),
        timeline: Vec::new(),
    };
    let mut accepted: Vec<AcceptedMission> = Vec::new();
    let mut cycle_index: HashMap<(String, String), usize> = HashMap::new();

    for idx in 0..events.len() {
        if events[idx].time() > scenario.horizon_hours {
            break;
        }
        match &events[idx] {
            Event::Mission(m) => dispatch_mission(scenario, m, events, idx, pools, &mut accepted, rng, &mut out),
            Event::Duty(d) => dispatch_duty(scenario, d, events, idx, pools, &accepted, &mut cycle_index, rng, &mut out),
        }
    }
    out
}
