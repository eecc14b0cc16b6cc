//! Deployment records as reported by the deployments backend.
//!
//! Everything here is a read-only snapshot. The rollout engine borrows
//! these types and never mutates them; the only owner that edits phases is
//! the authoring editor, before a deployment exists.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a deployment.
pub type DeploymentId = String;

/// Percentage of the target device set (nominally 1-100).
pub type BatchSize = u32;

// ── Deployment ─────────────────────────────────────────────────────

/// A deployment snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deployment {
    pub id: DeploymentId,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_control_map: Option<UpdateControlMap>,
    /// Devices resolved into the deployment so far.
    #[serde(default)]
    pub device_count: u64,
    /// Upper bound of devices the deployment may target.
    #[serde(default)]
    pub max_devices: u64,
    #[serde(default)]
    pub status: DeploymentStatus,
}

impl Deployment {
    /// Minimal deployment with no phases and empty statistics.
    pub fn new(id: &str, created: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            created,
            finished: None,
            phases: Vec::new(),
            statistics: Statistics::default(),
            update_control_map: None,
            device_count: 0,
            max_devices: 0,
            status: DeploymentStatus::default(),
        }
    }

    /// Denominator for every estimate.
    ///
    /// `device_count` under-reports while the device set is still being
    /// resolved, so the larger of the two counters wins.
    pub fn total_device_count(&self) -> u64 {
        self.device_count.max(self.max_devices)
    }

    pub fn stats(&self) -> &DeploymentStats {
        &self.statistics.status
    }

    /// Operator pause/continue directives, empty when none were configured.
    pub fn control_states(&self) -> &BTreeMap<String, ControlState> {
        static EMPTY: BTreeMap<String, ControlState> = BTreeMap::new();
        self.update_control_map
            .as_ref()
            .map(|map| &map.states)
            .unwrap_or(&EMPTY)
    }
}

/// Lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Scheduled,
    #[default]
    Pending,
    Inprogress,
    Finished,
}

// ── Phases ─────────────────────────────────────────────────────────

/// One batch of a phased rollout.
///
/// The final phase usually carries no `batch_size`; it receives whatever
/// percentage the earlier phases leave over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<BatchSize>,
    /// Authoritative start time, present once the backend scheduled the phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<DateTime<Utc>>,
    /// Delay before the following phase starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(default, alias = "delayUnit", skip_serializing_if = "Option::is_none")]
    pub delay_unit: Option<DelayUnit>,
    /// Devices the backend already assigned to this phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_count: Option<u64>,
}

impl Phase {
    /// A phase holding `batch_size` percent of the devices.
    pub fn with_batch_size(batch_size: BatchSize) -> Self {
        Self {
            batch_size: Some(batch_size),
            ..Default::default()
        }
    }

    /// Delay before the next phase, zero when unset.
    pub fn delay_duration(&self) -> Duration {
        match self.delay {
            Some(delay) => self.delay_unit.unwrap_or_default().duration(delay),
            None => Duration::zero(),
        }
    }
}

/// Unit of a phase delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    Minutes,
    #[default]
    Hours,
    Days,
}

impl DelayUnit {
    pub fn duration(self, amount: u32) -> Duration {
        let amount = i64::from(amount);
        match self {
            DelayUnit::Minutes => Duration::minutes(amount),
            DelayUnit::Hours => Duration::hours(amount),
            DelayUnit::Days => Duration::days(amount),
        }
    }
}

impl std::str::FromStr for DelayUnit {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minutes" => Ok(DelayUnit::Minutes),
            "hours" => Ok(DelayUnit::Hours),
            "days" => Ok(DelayUnit::Days),
            other => Err(crate::CoreError::InvalidDelayUnit(other.to_string())),
        }
    }
}

// ── Statistics ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    #[serde(default)]
    pub status: DeploymentStats,
}

/// Aggregate device counts per status bucket.
///
/// Buckets the backend did not report read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DeploymentStats(BTreeMap<String, u64>);

impl DeploymentStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str) -> u64 {
        self.0.get(bucket).copied().unwrap_or(0)
    }

    /// Sum of the named buckets, saturating at `u64::MAX`.
    pub fn sum(&self, buckets: &[&str]) -> u64 {
        buckets
            .iter()
            .map(|bucket| self.get(bucket))
            .fold(0, u64::saturating_add)
    }
}

impl<'a> FromIterator<(&'a str, u64)> for DeploymentStats {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect(),
        )
    }
}

// ── Update control ─────────────────────────────────────────────────

/// Operator pause/continue directives keyed by pause-configuration key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateControlMap {
    #[serde(default)]
    pub states: BTreeMap<String, ControlState>,
}

impl UpdateControlMap {
    /// A map holding a single directive.
    pub fn single(key: &str, action: ControlAction) -> Self {
        let mut states = BTreeMap::new();
        states.insert(key.to_string(), ControlState { action });
        Self { states }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlState {
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Pause,
    Continue,
}
