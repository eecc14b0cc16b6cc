//! Authoring-time validation of a phase list.

use fleet_core::Phase;
use tracing::debug;

use crate::batch::{phase_device_count, remainder_percent};
use crate::error::{PhaseError, PhaseResult};

/// Check a proposed phase list against the deployment's device count.
///
/// Every phase must resolve to at least one device and the running total
/// of batch sizes must stay within 100%. An empty list stands for a single
/// implicit 100% phase and always passes. A final phase left with exactly
/// 0% (no devices remain to allocate) is accepted.
pub fn check_phases(phases: &[Phase], device_count: u64) -> PhaseResult<()> {
    if phases.is_empty() {
        return Ok(());
    }
    let remainder = remainder_percent(phases);
    let last = phases.len() - 1;
    let mut total_size: i64 = 0;

    for (index, phase) in phases.iter().enumerate() {
        let batch_size = phase.batch_size.unwrap_or(0);
        total_size += i64::from(batch_size);

        let devices = phase_device_count(device_count, phase.batch_size, remainder, false);
        let empty_remainder = index == last && batch_size == 0 && remainder == 0;
        if devices < 1 && !empty_remainder {
            debug!(phase = index, devices, remainder, "phase resolves to no devices");
            return Err(PhaseError::EmptyPhase { index, devices });
        }
        if total_size > 100 {
            debug!(phase = index, total_size, "phases exceed 100%");
            return Err(PhaseError::Oversubscribed {
                index,
                total: total_size,
            });
        }
    }
    Ok(())
}

/// `true` when [`check_phases`] accepts the list.
pub fn validate_phases(phases: Option<&[Phase]>, device_count: u64) -> bool {
    phases.is_none_or(|phases| check_phases(phases, device_count).is_ok())
}
