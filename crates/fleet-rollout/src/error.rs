//! Rollout authoring error types.

use thiserror::Error;

/// Result type alias for phase authoring operations.
pub type PhaseResult<T> = Result<T, PhaseError>;

/// Why a phase list cannot be submitted or edited.
///
/// Progress estimation never produces these; only authoring does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("phase {} resolves to {devices} devices, at least 1 is required", .index + 1)]
    EmptyPhase { index: usize, devices: i64 },

    #[error("phase {} brings the total batch size to {total}%, over 100%", .index + 1)]
    Oversubscribed { index: usize, total: i64 },

    #[error("phase index {index} out of range for {len} phases")]
    OutOfRange { index: usize, len: usize },
}
