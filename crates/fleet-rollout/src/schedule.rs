//! Phase scheduling — start times, the current phase, and countdowns.
//!
//! All functions take the clock reading from the caller. Nothing here reads
//! the system clock, so a display loop owns its own polling cadence.

use chrono::{DateTime, Duration, Utc};
use fleet_core::{Deployment, DeploymentStatus, Phase};
use serde::{Deserialize, Serialize};

use crate::batch::{effective_batch_size, phase_device_count};
use crate::progress::phases_info;

/// Start time of `phases[index]`.
///
/// The first phase starts with the deployment. A later phase the backend
/// already scheduled keeps its reported `start_ts`; otherwise the delays of
/// every preceding phase are added onto `deployment_start`. The result is
/// recomputed on every call because an author may still move the base
/// start time.
pub fn phase_start_time(
    phases: &[Phase],
    index: usize,
    deployment_start: DateTime<Utc>,
) -> DateTime<Utc> {
    if index == 0 {
        return deployment_start;
    }
    if let Some(start) = phases.get(index).and_then(|phase| phase.start_ts) {
        return start;
    }
    phases
        .iter()
        .take(index)
        .fold(deployment_start, |start, phase| {
            start
                .checked_add_signed(phase.delay_duration())
                .unwrap_or(start)
        })
}

/// Index of the latest phase whose `start_ts` is at or before `now`.
///
/// Falls back to the first phase when none has started yet; `None` only for
/// an empty list.
pub fn current_phase_index(phases: &[Phase], now: DateTime<Utc>) -> Option<usize> {
    if phases.is_empty() {
        return None;
    }
    for (index, phase) in phases.iter().enumerate().rev() {
        if phase.start_ts.is_some_and(|start| start <= now) {
            return Some(index);
        }
    }
    Some(0)
}

pub fn current_phase(phases: &[Phase], now: DateTime<Utc>) -> Option<&Phase> {
    current_phase_index(phases, now).map(|index| &phases[index])
}

/// Resolved start times for a whole phase list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    starts: Vec<DateTime<Utc>>,
}

impl Schedule {
    pub fn resolve(phases: &[Phase], deployment_start: DateTime<Utc>) -> Self {
        let starts = (0..phases.len())
            .map(|index| phase_start_time(phases, index, deployment_start))
            .collect();
        Self { starts }
    }

    pub fn start(&self, index: usize) -> Option<DateTime<Utc>> {
        self.starts.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Same reverse scan as [`current_phase_index`], over resolved starts.
    pub fn current_index(&self, now: DateTime<Utc>) -> Option<usize> {
        if self.starts.is_empty() {
            return None;
        }
        for (index, start) in self.starts.iter().enumerate().rev() {
            if *start <= now {
                return Some(index);
            }
        }
        Some(0)
    }

    /// Start of the phase after the current one, or `now` if it is the last.
    pub fn next_phase_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.current_index(now)
            .and_then(|index| self.start(index + 1))
            .unwrap_or(now)
    }

    pub fn time_until_next_phase(&self, now: DateTime<Utc>) -> Duration {
        (self.next_phase_start(now) - now).max(Duration::zero())
    }
}

/// Countdown text in the form `DD days HH h mm m ss s`.
pub fn format_countdown(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{days:02} days {hours:02} h {minutes:02} m {seconds:02} s")
}

// ── Schedule report ────────────────────────────────────────────────

/// Where a phase stands relative to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PhaseTiming {
    /// Starts in the future.
    Upcoming { starts_in_secs: i64 },
    /// The phase devices are currently being updated in.
    Current,
    /// Started and no longer current.
    Complete,
    /// Deployment is still scheduled.
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub index: usize,
    pub start: DateTime<Utc>,
    pub batch_size: i64,
    pub device_count: i64,
    pub timing: PhaseTiming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub start: DateTime<Utc>,
    /// Zero-based; `None` until the current phase has actually begun.
    pub current_phase: Option<usize>,
    pub finished: Option<DateTime<Utc>>,
    pub phases: Vec<PhaseReport>,
}

/// Per-phase schedule of a deployment as of `now`.
pub fn schedule_report(deployment: &Deployment, now: DateTime<Utc>) -> ScheduleReport {
    let info = phases_info(deployment);
    let phases = &info.phases;
    let start = phases
        .first()
        .and_then(|phase| phase.start_ts)
        .unwrap_or(deployment.created);
    let schedule = Schedule::resolve(phases, start);
    let current = schedule.current_index(now);
    let last = phases.len().saturating_sub(1);

    let reports = phases
        .iter()
        .enumerate()
        .map(|(index, phase)| {
            let phase_start = phase
                .start_ts
                .or_else(|| schedule.start(index))
                .unwrap_or(start);
            let batch_size = effective_batch_size(phases, index);
            let device_count =
                phase_device_count(info.total_device_count, None, batch_size, index == last);
            let timing = if now < phase_start {
                PhaseTiming::Upcoming {
                    starts_in_secs: (phase_start - now).num_seconds(),
                }
            } else if deployment.status == DeploymentStatus::Inprogress && current == Some(index) {
                PhaseTiming::Current
            } else if deployment.status != DeploymentStatus::Scheduled {
                PhaseTiming::Complete
            } else {
                PhaseTiming::Scheduled
            };
            PhaseReport {
                index,
                start: phase_start,
                batch_size,
                device_count,
                timing,
            }
        })
        .collect();

    let current_phase = current.filter(|index| {
        schedule
            .start(*index)
            .is_some_and(|phase_start| now >= phase_start)
    });

    ScheduleReport {
        start,
        current_phase,
        finished: deployment.finished,
        phases: reports,
    }
}
