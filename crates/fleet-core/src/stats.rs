//! Grouping of per-bucket device counts into the totals the progress views use.

use serde::{Deserialize, Serialize};

use crate::buckets;
use crate::types::{Deployment, DeploymentStatus};

/// Device counts grouped by progress category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedStats {
    pub inprogress: u64,
    pub paused: u64,
    pub pending: u64,
    pub successes: u64,
    pub failures: u64,
    /// Only reported when grouping with skipped devices split out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,
}

/// Group a deployment's bucket counts.
///
/// With `with_skipped`, devices that never ran the update (aborted,
/// decommissioned, already installed, no artifact) are reported as
/// `skipped` instead of being folded into successes and failures.
pub fn group_stats(deployment: &Deployment, with_skipped: bool) -> GroupedStats {
    let stats = deployment.stats();
    // Devices not yet resolved into the deployment are pending too.
    let unresolved = if deployment.max_devices > 0 {
        deployment.max_devices.saturating_sub(deployment.device_count)
    } else {
        0
    };

    let (successes, failures, skipped) = if with_skipped {
        (
            stats.get(buckets::SUCCESS),
            stats.get(buckets::FAILURE),
            Some(stats.sum(buckets::SKIPPED)),
        )
    } else {
        (stats.sum(buckets::SUCCESSES), stats.sum(buckets::FAILURES), None)
    };

    GroupedStats {
        inprogress: stats.sum(buckets::IN_PROGRESS),
        paused: stats.sum(buckets::PAUSES),
        pending: unresolved.saturating_add(stats.sum(buckets::WAITING)),
        successes,
        failures,
        skipped,
    }
}

/// Deployment state as presented to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    /// Pending with no device activity yet.
    Queued,
    Scheduled,
    Pending,
    Inprogress,
    /// At least one device is halted at a pause point.
    Paused,
    Finished,
}

impl DisplayState {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayState::Queued => "queued",
            DisplayState::Scheduled => "scheduled",
            DisplayState::Pending => "pending",
            DisplayState::Inprogress => "in progress",
            DisplayState::Paused => "paused",
            DisplayState::Finished => "finished",
        }
    }
}

pub fn display_state(deployment: &Deployment) -> DisplayState {
    let grouped = group_stats(deployment, false);
    if deployment.status == DeploymentStatus::Pending && grouped.inprogress == 0 {
        return DisplayState::Queued;
    }
    if grouped.paused > 0 {
        return DisplayState::Paused;
    }
    match deployment.status {
        DeploymentStatus::Scheduled => DisplayState::Scheduled,
        DeploymentStatus::Pending => DisplayState::Pending,
        DeploymentStatus::Inprogress => DisplayState::Inprogress,
        DeploymentStatus::Finished => DisplayState::Finished,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeploymentStats;
    use chrono::{TimeZone, Utc};

    fn deployment_with(stats: &[(&str, u64)]) -> Deployment {
        let mut deployment = Deployment::new("d1", Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        deployment.statistics.status = stats.iter().copied().collect::<DeploymentStats>();
        deployment
    }

    fn mixed() -> Deployment {
        deployment_with(&[
            (buckets::ABORTED, 2),
            (buckets::ALREADY_INSTALLED, 1),
            (buckets::DECOMMISSIONED, 1),
            (buckets::DOWNLOADING, 3),
            (buckets::FAILURE, 1),
            (buckets::INSTALLING, 1),
            (buckets::NOARTIFACT, 1),
            (buckets::PENDING, 2),
            (buckets::REBOOTING, 1),
            (buckets::SUCCESS, 1),
        ])
    }

    #[test]
    fn grouping_saturates_huge_counts() {
        let mut deployment = deployment_with(&[(buckets::PENDING, u64::MAX), (buckets::SUCCESS, u64::MAX)]);
        deployment.device_count = 1;
        deployment.max_devices = 10;
        let grouped = group_stats(&deployment, false);
        assert_eq!(grouped.pending, u64::MAX);
        assert_eq!(grouped.successes, u64::MAX);
    }

    #[test]
    fn groups_bucket_counts() {
        let grouped = group_stats(&mixed(), false);
        assert_eq!(
            grouped,
            GroupedStats {
                inprogress: 5,
                paused: 0,
                pending: 2,
                successes: 3,
                failures: 4,
                skipped: None,
            }
        );
    }

    #[test]
    fn unresolved_devices_count_as_pending() {
        let mut deployment = mixed();
        deployment.max_devices = 100;
        deployment.device_count = 10;
        assert_eq!(group_stats(&deployment, false).pending, 92);
    }

    #[test]
    fn splits_out_skipped() {
        let grouped = group_stats(&mixed(), true);
        assert_eq!(grouped.successes, 1);
        assert_eq!(grouped.failures, 1);
        assert_eq!(grouped.skipped, Some(5));
    }

    #[test]
    fn display_state_queued_then_paused() {
        let deployment = deployment_with(&[(buckets::PENDING, 4)]);
        assert_eq!(display_state(&deployment), DisplayState::Queued);

        let mut deployment = deployment_with(&[
            (buckets::INSTALLING, 1),
            (buckets::PAUSE_BEFORE_REBOOTING, 2),
        ]);
        deployment.status = DeploymentStatus::Inprogress;
        assert_eq!(display_state(&deployment), DisplayState::Paused);
    }

    #[test]
    fn display_state_follows_status() {
        let mut deployment = deployment_with(&[(buckets::SUCCESS, 3)]);
        deployment.status = DeploymentStatus::Finished;
        assert_eq!(display_state(&deployment), DisplayState::Finished);
        assert_eq!(display_state(&deployment).label(), "finished");
    }
}
