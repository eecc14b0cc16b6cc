//! Installation-substate progress for single-phase deployments.
//!
//! A deployment without batching phases but with an update-control map is
//! shown as a fixed sequence of installation steps (download, install,
//! reboot, commit). Devices can be held at a pause point before install,
//! reboot and commit; an operator then continues past it.

use fleet_core::buckets;
use fleet_core::stats::{DisplayState, display_state};
use fleet_core::{ControlAction, Deployment, DeploymentStats, UpdateControlMap};
use serde::Serialize;
use tracing::debug;

/// One step of the installation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstallationSubstate {
    pub title: &'static str,
    /// Buckets whose devices are past this step.
    pub success_indicators: &'static [&'static str],
    pub failure_indicators: &'static [&'static str],
    /// Bucket of devices halted right after this step.
    pub pause_indicator: Option<&'static str>,
    /// Update-control key that arms the pause after this step.
    pub pause_configuration_indicator: Option<&'static str>,
}

/// The installation sequence, in order.
pub static INSTALLATION_SUBSTATES: [InstallationSubstate; 4] = [
    InstallationSubstate {
        title: "download",
        success_indicators: &[
            buckets::PAUSE_BEFORE_INSTALLING,
            buckets::INSTALLING,
            buckets::PAUSE_BEFORE_REBOOTING,
            buckets::REBOOTING,
            buckets::PAUSE_BEFORE_COMMITTING,
            buckets::SUCCESS,
        ],
        failure_indicators: &[buckets::FAILURE],
        pause_indicator: Some(buckets::PAUSE_BEFORE_INSTALLING),
        pause_configuration_indicator: Some("ArtifactInstall_Enter"),
    },
    InstallationSubstate {
        title: "install",
        success_indicators: &[
            buckets::PAUSE_BEFORE_REBOOTING,
            buckets::REBOOTING,
            buckets::PAUSE_BEFORE_COMMITTING,
            buckets::SUCCESS,
        ],
        failure_indicators: &[buckets::FAILURE],
        pause_indicator: Some(buckets::PAUSE_BEFORE_REBOOTING),
        pause_configuration_indicator: Some("ArtifactReboot_Enter"),
    },
    InstallationSubstate {
        title: "reboot",
        success_indicators: &[buckets::PAUSE_BEFORE_COMMITTING, buckets::SUCCESS],
        failure_indicators: &[buckets::FAILURE],
        pause_indicator: Some(buckets::PAUSE_BEFORE_COMMITTING),
        pause_configuration_indicator: Some("ArtifactCommit_Enter"),
    },
    InstallationSubstate {
        title: "commit",
        success_indicators: &[buckets::SUCCESS],
        failure_indicators: &[buckets::FAILURE],
        pause_indicator: None,
        pause_configuration_indicator: None,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubstateStatus {
    Finished,
    Failed,
    Paused,
    Inprogress,
    /// A pause is configured after this step but not reached yet.
    PendingPause,
}

/// Renderer-facing breakdown of one installation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstatePhase {
    pub substate: &'static InstallationSubstate,
    pub successes: u64,
    pub failures: u64,
    pub offset: f64,
    pub width: f64,
    pub success_width: f64,
    pub failure_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubstateStatus>,
}

/// Last step completed by devices currently halted at a pause point,
/// scanning from the last pause point to the first.
pub fn active_pause(stats: &DeploymentStats) -> Option<usize> {
    for (index, substate) in INSTALLATION_SUBSTATES.iter().enumerate().rev() {
        if substate
            .pause_indicator
            .is_some_and(|bucket| stats.get(bucket) > 0)
        {
            return Some(index);
        }
    }
    None
}

fn substate_status(
    successes: u64,
    failures: u64,
    total: u64,
    paused: bool,
    pause_configured: bool,
) -> Option<SubstateStatus> {
    if successes == total {
        Some(SubstateStatus::Finished)
    } else if failures == total {
        Some(SubstateStatus::Failed)
    } else if paused {
        Some(SubstateStatus::Paused)
    } else if successes > 0 || failures > 0 {
        Some(SubstateStatus::Inprogress)
    } else if pause_configured {
        Some(SubstateStatus::PendingPause)
    } else {
        None
    }
}

/// Per-step segments of a single-phase deployment.
///
/// Steps up to the active pause point (all of them when nothing is
/// halted) also count devices that skipped installation entirely and carry
/// the previous step's failures forward. Counts are clamped to
/// `total_device_count`.
pub fn displayable_substate_phases(
    deployment: &Deployment,
    total_device_count: u64,
) -> Vec<SubstatePhase> {
    let stats = deployment.stats();
    let states = deployment.control_states();
    let boundary = active_pause(stats);
    let short_circuit = stats.sum(buckets::SHORT_CIRCUIT);
    let step_width = 100.0 / INSTALLATION_SUBSTATES.len() as f64;
    let total = total_device_count;

    let mut displayable: Vec<SubstatePhase> = Vec::with_capacity(INSTALLATION_SUBSTATES.len());
    for (index, substate) in INSTALLATION_SUBSTATES.iter().enumerate() {
        let mut successes = stats.sum(substate.success_indicators);
        let mut failures = stats.sum(substate.failure_indicators);

        let previous = displayable.last();
        let previous_settled =
            previous.is_some_and(|step| step.successes.saturating_add(step.failures) == total);
        if boundary.is_none_or(|pause| index <= pause) || previous_settled {
            if let Some(step) = previous.filter(|step| step.failures > 0) {
                failures = step.failures;
            }
            successes = successes.saturating_add(short_circuit);
        }
        successes = successes.min(total);
        failures = failures.min(total - successes);

        let paused = substate
            .pause_indicator
            .is_some_and(|bucket| stats.get(bucket) > 0);
        let pause_configured = substate
            .pause_configuration_indicator
            .and_then(|key| states.get(key))
            .is_some_and(|state| state.action == ControlAction::Pause);

        displayable.push(SubstatePhase {
            substate,
            successes,
            failures,
            offset: step_width * index as f64,
            width: step_width,
            success_width: share(successes, total),
            failure_width: share(failures, total),
            status: substate_status(successes, failures, total, paused, pause_configured),
        });
    }
    displayable
}

fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

// ── Pause / continue control ───────────────────────────────────────

/// Whether an operator may continue a paused deployment.
///
/// Continuing is a two-step affair: a pause must have been armed in the
/// update-control map before the devices reached it, and only then can the
/// operator fire the continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Continuation {
    /// No devices are halted.
    NotPaused,
    /// Devices are halted after `step` but no directive exists for the
    /// following step yet.
    AwaitingDevices { step: usize },
    /// A continue was already sent and devices have not picked it up.
    Requested { step: usize, key: &'static str },
    /// An armed pause is due; continue (or abort) is possible.
    Armed { step: usize, key: &'static str },
}

impl Continuation {
    pub fn can_continue(&self) -> bool {
        matches!(self, Continuation::Armed { .. })
    }

    /// Update-control patch that releases the halted step.
    pub fn continue_request(&self) -> Option<UpdateControlMap> {
        match self {
            Continuation::Armed { step, key } => {
                debug!(step, key, "continue requested");
                Some(UpdateControlMap::single(key, ControlAction::Continue))
            }
            _ => None,
        }
    }
}

pub fn continuation(deployment: &Deployment) -> Continuation {
    let Some(step) = active_pause(deployment.stats()) else {
        return Continuation::NotPaused;
    };
    if display_state(deployment) != DisplayState::Paused {
        return Continuation::NotPaused;
    }
    let Some(key) = INSTALLATION_SUBSTATES[step].pause_configuration_indicator else {
        return Continuation::AwaitingDevices { step };
    };
    match deployment.control_states().get(key) {
        Some(state) if state.action == ControlAction::Pause => Continuation::Armed { step, key },
        Some(_) => Continuation::Requested { step, key },
        None => Continuation::AwaitingDevices { step },
    }
}
