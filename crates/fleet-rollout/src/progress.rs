//! Deployment progress — picks the right estimator for a deployment and
//! bundles its output with the schedule state.

use chrono::{DateTime, Utc};
use fleet_core::stats::{DisplayState, display_state, group_stats};
use fleet_core::{Deployment, Phase};
use serde::Serialize;
use tracing::debug;

use crate::estimator::{DisplayablePhase, RolloutInput, displayable_rollout_phases};
use crate::schedule::{Schedule, format_countdown};
use crate::substate::{Continuation, SubstatePhase, continuation, displayable_substate_phases};

/// Totals and phase list feeding the rollout estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct PhasesInfo {
    pub phases: Vec<Phase>,
    pub total_device_count: u64,
    pub total_success_count: u64,
    pub total_failure_count: u64,
    pub current_progress_count: u64,
}

impl PhasesInfo {
    pub fn rollout_input(&self, current_phase: Option<usize>) -> RolloutInput<'_> {
        RolloutInput {
            phases: &self.phases,
            total_device_count: self.total_device_count,
            total_success_count: self.total_success_count,
            total_failure_count: self.total_failure_count,
            current_progress_count: self.current_progress_count,
            current_phase,
        }
    }
}

/// Gather estimator input from a deployment.
///
/// A deployment without phases is treated as one 100% phase that started
/// when the deployment was created.
pub fn phases_info(deployment: &Deployment) -> PhasesInfo {
    let grouped = group_stats(deployment, deployment.phases.len() < 2);
    let phases = if deployment.phases.is_empty() {
        vec![Phase {
            id: Some(deployment.id.clone()),
            batch_size: Some(100),
            start_ts: Some(deployment.created),
            device_count: Some(grouped.successes),
            ..Default::default()
        }]
    } else {
        deployment.phases.clone()
    };
    PhasesInfo {
        phases,
        total_device_count: deployment.total_device_count(),
        total_success_count: grouped.successes,
        total_failure_count: grouped.failures,
        current_progress_count: grouped.inprogress,
    }
}

/// Phased rollout progress as of one clock reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseProgress {
    pub current_phase: Option<usize>,
    pub phase_count: usize,
    pub next_phase_start: DateTime<Utc>,
    pub time_until_next_phase: String,
    pub total_failure_count: u64,
    pub phases: Vec<DisplayablePhase>,
}

impl PhaseProgress {
    pub fn compute(deployment: &Deployment, now: DateTime<Utc>) -> Self {
        let info = phases_info(deployment);
        let start = info
            .phases
            .first()
            .and_then(|phase| phase.start_ts)
            .unwrap_or(deployment.created);
        let schedule = Schedule::resolve(&info.phases, start);
        let current_phase = schedule.current_index(now);

        Self {
            current_phase,
            phase_count: info.phases.len(),
            next_phase_start: schedule.next_phase_start(now),
            time_until_next_phase: format_countdown(schedule.time_until_next_phase(now)),
            total_failure_count: info.total_failure_count,
            phases: displayable_rollout_phases(&info.rollout_input(current_phase)),
        }
    }

    /// `true` while a later phase has yet to start.
    pub fn has_next_phase(&self) -> bool {
        self.current_phase
            .is_some_and(|index| index + 1 < self.phase_count)
    }
}

/// Installation-step progress of a single-phase deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstateProgress {
    pub state: DisplayState,
    pub device_count: u64,
    pub total_device_count: u64,
    pub total_failure_count: u64,
    pub paused_count: u64,
    pub steps: Vec<SubstatePhase>,
    pub continuation: Continuation,
}

impl SubstateProgress {
    pub fn compute(deployment: &Deployment) -> Self {
        let grouped = group_stats(deployment, false);
        let total_device_count = deployment.total_device_count();
        Self {
            state: display_state(deployment),
            device_count: deployment.device_count,
            total_device_count,
            total_failure_count: grouped.failures,
            paused_count: grouped.paused,
            steps: displayable_substate_phases(deployment, total_device_count),
            continuation: continuation(deployment),
        }
    }
}

/// Progress view of a deployment, by deployment shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DeploymentProgress {
    Rollout(PhaseProgress),
    Substate(SubstateProgress),
}

impl DeploymentProgress {
    /// Multi-phase deployments, and any deployment without update control,
    /// get the per-phase view; the rest get the installation-step view.
    pub fn compute(deployment: &Deployment, now: DateTime<Utc>) -> Self {
        if deployment.phases.len() > 1 || deployment.update_control_map.is_none() {
            debug!(deployment = %deployment.id, phases = deployment.phases.len(), "rollout view");
            DeploymentProgress::Rollout(PhaseProgress::compute(deployment, now))
        } else {
            debug!(deployment = %deployment.id, "substate view");
            DeploymentProgress::Substate(SubstateProgress::compute(deployment))
        }
    }
}
