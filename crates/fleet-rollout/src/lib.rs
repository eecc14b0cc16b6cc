//! Fleet rollout progress estimation.
//!
//! The deployments backend reports device-status counts for a deployment
//! as a whole. This crate turns those totals into per-phase (or, for
//! single-phase deployments with pause points, per-installation-step)
//! breakdowns a progress bar can draw. Every estimate is a pure function of
//! the snapshot and clock reading it is given.
//!
//! # Components
//!
//! - **`batch`** — remainder and per-phase device-count arithmetic
//! - **`schedule`** — phase start times, current phase, countdowns, schedule report
//! - **`estimator`** — success-first distribution of totals over phases
//! - **`substate`** — installation-step segments and pause/continue control
//! - **`validate`** — authoring-time phase list validation
//! - **`editor`** — authoring-time phase list editing
//! - **`progress`** — picks the view for a deployment and bundles its output

pub mod batch;
pub mod editor;
pub mod error;
pub mod estimator;
pub mod progress;
pub mod schedule;
pub mod substate;
pub mod validate;

pub use batch::{effective_batch_size, phase_device_count, remainder_percent};
pub use editor::PhaseEditor;
pub use error::{PhaseError, PhaseResult};
pub use estimator::{DisplayablePhase, RolloutInput, displayable_rollout_phases};
pub use progress::{DeploymentProgress, PhaseProgress, PhasesInfo, SubstateProgress, phases_info};
pub use schedule::{
    PhaseReport, PhaseTiming, Schedule, ScheduleReport, current_phase, current_phase_index,
    format_countdown, phase_start_time, schedule_report,
};
pub use substate::{
    Continuation, INSTALLATION_SUBSTATES, InstallationSubstate, SubstatePhase, SubstateStatus,
    active_pause, continuation, displayable_substate_phases,
};
pub use validate::{check_phases, validate_phases};
