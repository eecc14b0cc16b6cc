//! Phase list editing while a deployment is being authored.
//!
//! The last phase never stores a batch size while editing: it receives the
//! remainder. Every operation keeps that shape.

use chrono::{DateTime, Utc};
use fleet_core::config::AuthoringConfig;
use fleet_core::{BatchSize, DelayUnit, Phase};
use tracing::debug;

use crate::batch::{phase_device_count, remainder_percent, to_signed};
use crate::error::{PhaseError, PhaseResult};
use crate::schedule::phase_start_time;
use crate::validate::check_phases;

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseEditor {
    phases: Vec<Phase>,
    defaults: AuthoringConfig,
}

impl PhaseEditor {
    pub fn new(defaults: AuthoringConfig) -> Self {
        Self {
            phases: Vec::new(),
            defaults,
        }
    }

    pub fn with_phases(phases: Vec<Phase>, defaults: AuthoringConfig) -> Self {
        Self { phases, defaults }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn remainder(&self) -> i64 {
        remainder_percent(&self.phases)
    }

    /// Set a phase's batch size (clamped to 1-100).
    ///
    /// When that leaves nothing for the final phase, the final phase is
    /// dropped and the new last phase gives up its batch size to take the
    /// remainder instead.
    pub fn update_batch_size(&mut self, index: usize, value: BatchSize) -> PhaseResult<()> {
        self.phase_mut(index)?.batch_size = Some(value.clamp(1, 100));
        if self.remainder() < 1 && self.phases.len() > 1 {
            self.phases.pop();
            if let Some(last) = self.phases.last_mut() {
                last.batch_size = None;
            }
            debug!(phases = self.phases.len(), "dropped phase left without devices");
        }
        Ok(())
    }

    /// Append a phase.
    ///
    /// The current last phase gets an explicit batch size (the configured
    /// default, or half the remainder once the remainder is that small) and
    /// a delay, and a fresh remainder phase is appended after it.
    pub fn add_phase(&mut self) {
        if self.phases.is_empty() {
            self.phases.push(Phase::default());
        }
        let remainder = self.remainder();
        let default_size = i64::from(self.defaults.default_batch_size);
        let batch_size = if remainder > default_size {
            default_size
        } else {
            remainder / 2
        };
        let defaults = &self.defaults;
        if let Some(last) = self.phases.last_mut() {
            last.batch_size = Some(u32::try_from(batch_size.max(0)).unwrap_or(0));
            last.delay = last.delay.or(Some(defaults.default_delay));
            last.delay_unit = last.delay_unit.or(Some(defaults.default_delay_unit));
        }
        self.phases.push(Phase::default());
        debug!(phases = self.phases.len(), batch_size, "added phase");
    }

    pub fn remove_phase(&mut self, index: usize) -> PhaseResult<()> {
        self.check_index(index)?;
        self.phases.remove(index);
        let remaining = self.phases.len();
        if let Some(last) = self.phases.last_mut() {
            last.batch_size = None;
            if remaining == 1 {
                last.delay = None;
            }
        }
        debug!(index, phases = remaining, "removed phase");
        Ok(())
    }

    /// Set the delay before the following phase (at least 1).
    pub fn update_delay(&mut self, index: usize, value: u32) -> PhaseResult<()> {
        self.phase_mut(index)?.delay = Some(value.max(1));
        Ok(())
    }

    pub fn set_delay_unit(&mut self, index: usize, unit: DelayUnit) -> PhaseResult<()> {
        self.phase_mut(index)?.delay_unit = Some(unit);
        Ok(())
    }

    /// Another phase fits only while the remainder still covers more than
    /// one device.
    pub fn can_add_phase(&self, device_count: u64) -> bool {
        self.remainder().saturating_mul(to_signed(device_count)) > 100
    }

    /// Devices each phase would receive, for previewing the split.
    pub fn device_counts(&self, device_count: u64) -> Vec<i64> {
        let remainder = self.remainder();
        let last = self.phases.len().saturating_sub(1);
        self.phases
            .iter()
            .enumerate()
            .map(|(index, phase)| {
                phase_device_count(device_count, phase.batch_size, remainder, index == last)
            })
            .collect()
    }

    /// Start times of every phase for a deployment starting at `start`.
    pub fn start_times(&self, start: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        (0..self.phases.len())
            .map(|index| phase_start_time(&self.phases, index, start))
            .collect()
    }

    pub fn check(&self, device_count: u64) -> PhaseResult<()> {
        check_phases(&self.phases, device_count)
    }

    pub fn is_valid(&self, device_count: u64) -> bool {
        self.check(device_count).is_ok()
    }

    fn check_index(&self, index: usize) -> PhaseResult<()> {
        if index < self.phases.len() {
            Ok(())
        } else {
            Err(PhaseError::OutOfRange {
                index,
                len: self.phases.len(),
            })
        }
    }

    fn phase_mut(&mut self, index: usize) -> PhaseResult<&mut Phase> {
        let len = self.phases.len();
        self.phases
            .get_mut(index)
            .ok_or(PhaseError::OutOfRange { index, len })
    }
}
