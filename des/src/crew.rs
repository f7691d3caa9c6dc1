//! Crew queue: one per `(unit, specialty)`. Tracks per-member busy, crew-
//! rest, work-schedule day-off, duty, and duty-recovery intervals, plus an
//! optional shift-split partition and duty-rotation sub-pool (spec §3,
//! §4.7.3).

use std::collections::HashSet;

use crate::types::CrewDistributionPolicy;

#[derive(Debug, Clone, Copy)]
struct Interval {
    start: f64,
    end: f64,
}

impl Interval {
    fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    fn overlaps(&self, s: f64, e: f64) -> bool {
        self.start < e && s < self.end
    }
}

#[derive(Debug, Clone)]
pub struct ShiftSplitConfig {
    /// Fraction of the queue (by headcount) assigned to shift 1.
    pub percent: f64,
    pub stagger_days_off: f64,
}

#[derive(Debug, Clone)]
pub struct WorkSchedule {
    pub days_on: u32,
    pub days_off: u32,
    pub start_hour: f64,
    pub shift_split: Option<ShiftSplitConfig>,
}

impl WorkSchedule {
    fn cycle_len(&self) -> f64 {
        (self.days_on + self.days_off).max(1) as f64
    }

    /// Is the member in shift group `shift_group` (1 or 2) off at time `t`?
    fn is_day_off(&self, t: f64, shift_group: u8) -> bool {
        if self.days_on == 0 && self.days_off == 0 {
            return false;
        }
        let mut adjusted = t - self.start_hour;
        if shift_group == 2 {
            if let Some(split) = &self.shift_split {
                adjusted -= split.stagger_days_off * 24.0;
            }
        }
        let day_index = (adjusted / 24.0).floor();
        let phase = day_index.rem_euclid(self.cycle_len());
        phase >= self.days_on as f64
    }
}

#[derive(Debug, Clone)]
struct CrewMember {
    id: u32,
    shift_group: u8,
    busy: Vec<Interval>,
    crew_rest: Vec<Interval>,
    duty: Vec<(String, Interval)>,
    duty_recovery: Vec<Interval>,
    last_used_end: f64,
}

impl CrewMember {
    fn is_free_at(&self, t: f64) -> bool {
        !self.busy.iter().any(|i| i.contains(t))
            && !self.crew_rest.iter().any(|i| i.contains(t))
            && !self.duty.iter().any(|(_, i)| i.contains(t))
            && !self.duty_recovery.iter().any(|i| i.contains(t))
    }

    fn is_free_over(&self, s: f64, e: f64) -> bool {
        !self.busy.iter().any(|i| i.overlaps(s, e))
            && !self.crew_rest.iter().any(|i| i.overlaps(s, e))
            && !self.duty.iter().any(|(_, i)| i.overlaps(s, e))
            && !self.duty_recovery.iter().any(|i| i.overlaps(s, e))
    }

    /// Which of the named unavailability buckets (spec §4.8) does `t` fall
    /// into, if any, ignoring schedule/day-off (handled by the caller)?
    fn active_duty_type_at(&self, t: f64) -> Option<&str> {
        self.duty
            .iter()
            .find(|(_, i)| i.contains(t))
            .map(|(kind, _)| kind.as_str())
    }
}

pub struct ShiftRequest<'a> {
    pub start: f64,
    pub shifts: &'a [f64],
    pub is_duty: bool,
    pub duty_type: Option<&'a str>,
    pub sequential: bool,
    pub ignore_schedule: bool,
    pub recovery_hours: f64,
    pub distribution: CrewDistributionPolicy,
    pub rotation_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CrewAssignment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
}

pub struct CrewQueue {
    unit: String,
    specialty: String,
    members: Vec<CrewMember>,
    daily_crew_rest_hours: f64,
    work_schedule: Option<WorkSchedule>,
    rotation_pool: Option<HashSet<u32>>,
    allocations: u32,
    denials: u32,
    busy_time: f64,
}

impl CrewQueue {
    pub fn new(
        unit: impl Into<String>,
        specialty: impl Into<String>,
        effective_count: u32,
        daily_crew_rest_hours: f64,
        work_schedule: Option<WorkSchedule>,
    ) -> Self {
        let shift1_count = work_schedule
            .as_ref()
            .and_then(|ws| ws.shift_split.as_ref())
            .filter(|s| s.percent >= 0.0)
            .map(|s| (effective_count as f64 * s.percent).round() as u32)
            .unwrap_or(effective_count);

        let members = (0..effective_count)
            .map(|i| CrewMember {
                id: i + 1,
                shift_group: if i < shift1_count { 1 } else { 2 },
                busy: Vec::new(),
                crew_rest: Vec::new(),
                duty: Vec::new(),
                duty_recovery: Vec::new(),
                last_used_end: f64::NEG_INFINITY,
            })
            .collect();

        CrewQueue {
            unit: unit.into(),
            specialty: specialty.into(),
            members,
            daily_crew_rest_hours,
            work_schedule,
            rotation_pool: None,
            allocations: 0,
            denials: 0,
            busy_time: 0.0,
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn total(&self) -> u32 {
        self.members.len() as u32
    }

    pub fn set_rotation_pool(&mut self, ids: HashSet<u32>) {
        self.rotation_pool = Some(ids);
    }

    fn eligible(&self, idx: usize, t: f64, ignore_schedule: bool, rotation_only: bool) -> bool {
        let m = &self.members[idx];
        if rotation_only {
            match &self.rotation_pool {
                Some(pool) if pool.contains(&m.id) => {}
                _ => return false,
            }
        }
        if !m.is_free_at(t) {
            return false;
        }
        if !ignore_schedule {
            if let Some(ws) = &self.work_schedule {
                if ws.is_day_off(t, m.shift_group) {
                    return false;
                }
            }
        }
        true
    }

    /// `availableAt(t)`: members not busy/resting/on-duty/recovering, and
    /// (unless `ignore_schedule`) not on a scheduled day off.
    pub fn available_at(&self, t: f64, ignore_schedule: bool) -> u32 {
        (0..self.members.len())
            .filter(|&i| self.eligible(i, t, ignore_schedule, false))
            .count() as u32
    }

    /// Same as `available_at`, restricted to the duty-rotation sub-pool.
    pub fn available_in_rotation_at(&self, t: f64, ignore_schedule: bool) -> u32 {
        (0..self.members.len())
            .filter(|&i| self.eligible(i, t, ignore_schedule, true))
            .count() as u32
    }

    /// Members free for the entire `[s, e)` window, not just the instant
    /// `s` — the admission check an acquisition over that window must pass,
    /// so a later `try_acquire_shifts` covering the same window cannot fail.
    pub fn available_over(&self, s: f64, e: f64, ignore_schedule: bool) -> u32 {
        (0..self.members.len())
            .filter(|&i| self.eligible(i, s, ignore_schedule, false) && self.members[i].is_free_over(s, e))
            .count() as u32
    }

    /// Select `shifts.len()` distinct members and record their intervals.
    /// Returns `None` if not enough eligible members exist for every shift
    /// position — nothing is mutated in that case.
    pub fn try_acquire_shifts(&mut self, req: &ShiftRequest) -> Option<Vec<CrewAssignment>> {
        if req.shifts.is_empty() {
            return Some(Vec::new());
        }

        let mut windows = Vec::with_capacity(req.shifts.len());
        let mut cursor = req.start;
        for &dur in req.shifts {
            let (s, e) = if req.sequential {
                (cursor, cursor + dur)
            } else {
                (req.start, req.start + dur)
            };
            windows.push((s, e));
            cursor = e;
        }

        let mut chosen: Vec<usize> = Vec::with_capacity(windows.len());
        for &(s, e) in &windows {
            let mut candidates: Vec<usize> = (0..self.members.len())
                .filter(|idx| !chosen.contains(idx))
                .filter(|&idx| {
                    self.eligible(idx, s, req.ignore_schedule, req.rotation_only)
                        && self.members[idx].is_free_over(s, e)
                })
                .collect();
            if candidates.is_empty() {
                return None;
            }
            candidates.sort_by(|&a, &b| {
                let la = self.members[a].last_used_end;
                let lb = self.members[b].last_used_end;
                match req.distribution {
                    CrewDistributionPolicy::Distribute => la.partial_cmp(&lb).unwrap(),
                    CrewDistributionPolicy::Concentrate => lb.partial_cmp(&la).unwrap(),
                }
            });
            chosen.push(candidates[0]);
        }

        let mut assignments = Vec::with_capacity(windows.len());
        for (&idx, &(s, e)) in chosen.iter().zip(windows.iter()) {
            {
                let m = &mut self.members[idx];
                if req.is_duty {
                    let kind = req.duty_type.unwrap_or("duty").to_string();
                    m.duty.push((kind, Interval { start: s, end: e }));
                    if req.recovery_hours > 0.0 {
                        m.duty_recovery.push(Interval { start: e, end: e + req.recovery_hours });
                    }
                } else {
                    m.busy.push(Interval { start: s, end: e });
                }
                m.crew_rest.push(Interval { start: e, end: e + self.daily_crew_rest_hours });
                m.last_used_end = e;
            }
            self.allocations += 1;
            self.busy_time += e - s;
            assignments.push(CrewAssignment { id: self.members[idx].id, start: s, end: e });
        }
        Some(assignments)
    }

    pub fn record_denial(&mut self) {
        self.denials += 1;
    }

    pub fn allocations(&self) -> u32 {
        self.allocations
    }

    pub fn denials(&self) -> u32 {
        self.denials
    }

    pub fn utilization(&self, horizon_hours: f64) -> f64 {
        if self.members.is_empty() || horizon_hours <= 0.0 {
            return 0.0;
        }
        (self.busy_time / (self.members.len() as f64 * horizon_hours)).min(1.0)
    }

    pub fn efficiency(&self, mean_duration: f64) -> f64 {
        let denom = self.allocations as f64 * mean_duration;
        if denom <= 0.0 {
            0.0
        } else {
            (self.busy_time / denom).min(1.0)
        }
    }

    /// `(busy, idle)` snapshot at time `t`, ignoring scheduled days off —
    /// "for crew, busy/idle" (spec §4.8).
    pub fn busy_idle_at(&self, t: f64) -> (u32, u32) {
        let idle = self.available_at(t, true);
        (self.total() - idle, idle)
    }

    /// Classify each member's status at `t` for the availability timeline
    /// (spec §4.8): counts of members on a scheduled day off, on each named
    /// duty type, or free.
    pub fn classify_at(&self, t: f64) -> CrewSnapshot {
        let mut snapshot = CrewSnapshot::default();
        for m in &self.members {
            if let Some(duty_type) = m.active_duty_type_at(t) {
                *snapshot.on_duty.entry(duty_type.to_string()).or_insert(0) += 1;
                continue;
            }
            if m.busy.iter().any(|i| i.contains(t)) || m.duty_recovery.iter().any(|i| i.contains(t))
                || m.crew_rest.iter().any(|i| i.contains(t))
            {
                snapshot.otherwise_unavailable += 1;
                continue;
            }
            if let Some(ws) = &self.work_schedule {
                if ws.is_day_off(t, m.shift_group) {
                    snapshot.work_schedule += 1;
                    continue;
                }
            }
            snapshot.available += 1;
        }
        snapshot
    }
}

#[derive(Debug, Default)]
pub struct CrewSnapshot {
    pub available: u32,
    pub work_schedule: u32,
    pub on_duty: std::collections::HashMap<String, u32>,
    pub otherwise_unavailable: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrewDistributionPolicy;

    #[test]
    fn acquire_marks_member_busy_and_resting() {
        let mut q = CrewQueue::new("U1", "pilot", 2, 4.0, None);
        let req = ShiftRequest {
            start: 0.0,
            shifts: &[2.0],
            is_duty: false,
            duty_type: None,
            sequential: false,
            ignore_schedule: false,
            recovery_hours: 0.0,
            distribution: CrewDistributionPolicy::Distribute,
            rotation_only: false,
        };
        let got = q.try_acquire_shifts(&req).unwrap();
        assert_eq!(got.len(), 1);
        // During [0,2) only 1 left; during rest [2,6) still only 1 left.
        assert_eq!(q.available_at(1.0, true), 1);
        assert_eq!(q.available_at(3.0, true), 1);
        assert_eq!(q.available_at(6.0, true), 2);
    }

    #[test]
    fn sequential_shifts_use_distinct_members() {
        let mut q = CrewQueue::new("U1", "pilot", 2, 0.0, None);
        let req = ShiftRequest {
            start: 0.0,
            shifts: &[4.0, 4.0],
            is_duty: false,
            duty_type: None,
            sequential: true,
            ignore_schedule: false,
            recovery_hours: 0.0,
            distribution: CrewDistributionPolicy::Distribute,
            rotation_only: false,
        };
        let got = q.try_acquire_shifts(&req).unwrap();
        assert_eq!(got.len(), 2);
        assert_ne!(got[0].id, got[1].id);
        assert_eq!(got[0].start, 0.0);
        assert_eq!(got[0].end, 4.0);
        assert_eq!(got[1].start, 4.0);
        assert_eq!(got[1].end, 8.0);
    }

    #[test]
    fn insufficient_members_returns_none_without_mutation() {
        let mut q = CrewQueue::new("U1", "so", 1, 0.0, None);
        let req = ShiftRequest {
            start: 0.0,
            shifts: &[2.0, 2.0],
            is_duty: false,
            duty_type: None,
            sequential: true,
            ignore_schedule: false,
            recovery_hours: 0.0,
            distribution: CrewDistributionPolicy::Distribute,
            rotation_only: false,
        };
        assert!(q.try_acquire_shifts(&req).is_none());
        assert_eq!(q.available_at(0.0, true), 1);
    }

    #[test]
    fn day_off_blocks_unless_ignored() {
        let ws = WorkSchedule { days_on: 1, days_off: 1, start_hour: 0.0, shift_split: None };
        let q = CrewQueue::new("U1", "pilot", 1, 0.0, Some(ws));
        // day 0 (hours 0-24): on; day 1 (hours 24-48): off.
        assert_eq!(q.available_at(1.0, false), 1);
        assert_eq!(q.available_at(25.0, false), 0);
        assert_eq!(q.available_at(25.0, true), 1);
    }

    #[test]
    fn rotation_only_excludes_non_members() {
        let mut q = CrewQueue::new("U1", "pilot", 3, 0.0, None);
        let mut pool = HashSet::new();
        pool.insert(1);
        q.set_rotation_pool(pool);
        let req = ShiftRequest {
            start: 0.0,
            shifts: &[1.0, 1.0],
            is_duty: true,
            duty_type: Some("odo"),
            sequential: false,
            ignore_schedule: false,
            recovery_hours: 0.0,
            distribution: CrewDistributionPolicy::Distribute,
            rotation_only: true,
        };
        // Only member #1 is in the rotation pool; a 2-person request fails.
        assert!(q.try_acquire_shifts(&req).is_none());
    }
}
