//! Per-phase rollout estimation.
//!
//! The backend reports success, failure and in-progress counts for the
//! deployment as a whole, never per phase. To draw a per-phase breakdown
//! the totals are handed out phase by phase, in order, successes first,
//! then failures, then devices in progress. Each phase takes at most what
//! it can hold and at most what is left of each total.

use fleet_core::Phase;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::batch::{effective_batch_size, remainder_percent, to_signed};

/// Aggregate counters and the phase list to distribute them over.
#[derive(Debug, Clone, Copy)]
pub struct RolloutInput<'a> {
    pub phases: &'a [Phase],
    pub total_device_count: u64,
    pub total_success_count: u64,
    pub total_failure_count: u64,
    pub current_progress_count: u64,
    /// Index of the phase devices are currently being updated in.
    pub current_phase: Option<usize>,
}

/// Renderer-facing breakdown of one phase.
///
/// `offset` and `width` are percentages of the whole bar. The inner widths
/// are percentages of this phase's own width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayablePhase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub batch_size: i64,
    pub offset: f64,
    pub width: f64,
    pub success_width: f64,
    pub failure_width: f64,
    /// Absent for phases the rollout has already moved past.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_width: Option<f64>,
    pub successes: i64,
    pub failures: i64,
    pub in_progress: i64,
}

/// Running totals handed out so far.
#[derive(Debug, Default)]
struct Tally {
    successes: i64,
    failures: i64,
    progress: i64,
    batch: i64,
}

/// Distribute aggregate counts over the phases.
///
/// Never fails: inconsistent counts are clamped and every division by an
/// empty phase yields 0.
pub fn displayable_rollout_phases(input: &RolloutInput<'_>) -> Vec<DisplayablePhase> {
    let phases = input.phases;
    let total_devices = to_signed(input.total_device_count);
    let total_successes = to_signed(input.total_success_count);
    let total_failures = to_signed(input.total_failure_count);
    let total_progress = to_signed(input.current_progress_count);
    let last = phases.len().saturating_sub(1);

    let mut tally = Tally::default();
    let mut displayable = Vec::with_capacity(phases.len());

    for (index, phase) in phases.iter().enumerate() {
        let batch_size = effective_batch_size(phases, index);
        // Ongoing phases may not report a device count yet.
        let mut expected = match total_devices.saturating_mul(batch_size).div_euclid(100) {
            0 => batch_size,
            count => count,
        };
        let capacity = phase.device_count.map_or(expected, to_signed);

        let successes = capacity.min(total_successes - tally.successes).max(0);
        let mut leftover = expected - successes;
        let failures = leftover.min(total_failures - tally.failures).max(0);
        leftover -= failures;
        let progress = leftover.min(total_progress - tally.progress).max(0);

        let observed = successes + failures + progress;
        if observed > expected {
            debug!(
                phase = index,
                expected,
                observed,
                "phase holds more devices than its batch size suggests"
            );
        }
        expected = expected.max(observed).max(0);

        let progress_width = if input.current_phase == Some(index) || leftover > 0 {
            tally.progress += progress;
            Some(share(progress, expected))
        } else {
            None
        };

        let width = if index == last {
            remainder_percent(phases)
        } else {
            batch_size
        };

        trace!(
            phase = index,
            successes,
            failures,
            progress,
            offset = tally.batch,
            width,
            "estimated phase"
        );

        displayable.push(DisplayablePhase {
            id: phase.id.clone(),
            batch_size,
            offset: tally.batch as f64,
            width: width as f64,
            success_width: share(successes, expected),
            failure_width: share(failures, expected),
            progress_width,
            successes,
            failures,
            in_progress: progress,
        });

        tally.batch += batch_size;
        tally.successes += successes;
        tally.failures += failures;
    }

    displayable
}

/// `part` as a percentage of `whole`, 0 for an empty whole.
fn share(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn phase(id: &str, batch_size: Option<u32>, device_count: Option<u64>) -> Phase {
        Phase {
            id: Some(id.to_string()),
            batch_size,
            device_count,
            ..Default::default()
        }
    }

    fn three_phases() -> Vec<Phase> {
        vec![
            phase("p1", Some(20), Some(20)),
            phase("p2", Some(30), Some(30)),
            phase("p3", None, Some(50)),
        ]
    }

    fn input(phases: &[Phase], current_phase: Option<usize>) -> RolloutInput<'_> {
        RolloutInput {
            phases,
            total_device_count: 100,
            total_success_count: 30,
            total_failure_count: 5,
            current_progress_count: 8,
            current_phase,
        }
    }

    #[test]
    fn successes_fill_phases_in_order() {
        let phases = three_phases();
        let result = displayable_rollout_phases(&input(&phases, Some(2)));

        assert_eq!(result[0].successes, 20);
        assert_eq!(result[0].success_width, 100.0);
        assert_eq!(result[0].failures, 0);
        // Phase 1 is full and not current: no lingering progress sliver.
        assert_eq!(result[0].progress_width, None);

        assert_eq!(result[1].successes, 10);
        assert_eq!(result[1].failures, 5);
        assert_eq!(result[1].in_progress, 8);
        assert!((result[1].success_width - 100.0 / 3.0).abs() < 1e-9);
        assert!((result[1].failure_width - 50.0 / 3.0).abs() < 1e-9);
        assert!(result[1].progress_width.is_some());

        assert_eq!(result[2].successes, 0);
        assert_eq!(result[2].failures, 0);
        assert_eq!(result[2].progress_width, Some(0.0));
    }

    #[test]
    fn offsets_and_last_width() {
        let phases = three_phases();
        let result = displayable_rollout_phases(&input(&phases, Some(0)));
        let layout: Vec<(f64, f64)> = result.iter().map(|p| (p.offset, p.width)).collect();
        assert_eq!(layout, vec![(0.0, 20.0), (20.0, 30.0), (50.0, 50.0)]);
    }

    #[test]
    fn last_width_absorbs_explicit_batch_size() {
        // Backend reports a batch size on every phase; the last still takes
        // whatever the others leave.
        let phases = vec![
            phase("p1", Some(33), None),
            phase("p2", Some(33), None),
            phase("p3", Some(33), None),
        ];
        let result = displayable_rollout_phases(&input(&phases, None));
        assert_eq!(result[2].width, 34.0);
        let total: f64 = result.iter().map(|p| p.width).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn small_phase_expands_to_observed_counts() {
        // 10 devices at 5% expects 0, falls back to the raw batch size (5),
        // then grows to hold the 7 successes the phase reports.
        let phases = vec![phase("p1", Some(5), Some(7)), phase("p2", None, None)];
        let result = displayable_rollout_phases(&RolloutInput {
            phases: &phases,
            total_device_count: 10,
            total_success_count: 7,
            total_failure_count: 0,
            current_progress_count: 0,
            current_phase: Some(0),
        });
        assert_eq!(result[0].successes, 7);
        assert_eq!(result[0].success_width, 100.0);
    }

    #[test]
    fn zero_devices_never_divides_by_zero() {
        let phases = vec![phase("p1", Some(50), Some(0)), phase("p2", None, Some(0))];
        let result = displayable_rollout_phases(&RolloutInput {
            phases: &phases,
            total_device_count: 0,
            total_success_count: 0,
            total_failure_count: 0,
            current_progress_count: 0,
            current_phase: None,
        });
        for phase in &result {
            assert_eq!(phase.success_width, 0.0);
            assert_eq!(phase.failure_width, 0.0);
            assert!(phase.progress_width.is_none_or(|w| w == 0.0));
        }
    }

    #[test]
    fn missing_device_count_uses_expected_size() {
        let phases = vec![phase("p1", Some(50), None), phase("p2", None, None)];
        let result = displayable_rollout_phases(&RolloutInput {
            phases: &phases,
            total_device_count: 10,
            total_success_count: 8,
            total_failure_count: 0,
            current_progress_count: 0,
            current_phase: Some(1),
        });
        assert_eq!(result[0].successes, 5);
        assert_eq!(result[1].successes, 3);
    }

    #[test]
    fn empty_phase_list() {
        let result = displayable_rollout_phases(&input(&[], None));
        assert!(result.is_empty());
    }

    fn arb_phases() -> impl Strategy<Value = Vec<Phase>> {
        prop::collection::vec((1u32..=60, prop::option::of(0u64..200)), 1..6).prop_map(|entries| {
            let last = entries.len() - 1;
            entries
                .into_iter()
                .enumerate()
                .map(|(index, (size, device_count))| Phase {
                    batch_size: (index != last).then_some(size),
                    device_count,
                    ..Default::default()
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_widths_sum_to_100(
            phases in arb_phases(),
            devices in 0u64..500,
            successes in 0u64..600,
            failures in 0u64..600,
            progress in 0u64..600,
            current in prop::option::of(0usize..6),
        ) {
            let result = displayable_rollout_phases(&RolloutInput {
                phases: &phases,
                total_device_count: devices,
                total_success_count: successes,
                total_failure_count: failures,
                current_progress_count: progress,
                current_phase: current,
            });
            let total: f64 = result.iter().map(|p| p.width).sum();
            prop_assert!((total - 100.0).abs() < 1e-9);
        }

        #[test]
        fn prop_widths_never_negative(
            phases in arb_phases(),
            devices in 0u64..500,
            successes in 0u64..600,
            failures in 0u64..600,
            progress in 0u64..600,
            current in prop::option::of(0usize..6),
        ) {
            let result = displayable_rollout_phases(&RolloutInput {
                phases: &phases,
                total_device_count: devices,
                total_success_count: successes,
                total_failure_count: failures,
                current_progress_count: progress,
                current_phase: current,
            });
            for phase in &result {
                prop_assert!(phase.success_width >= 0.0);
                prop_assert!(phase.failure_width >= 0.0);
                prop_assert!(phase.progress_width.unwrap_or(0.0) >= 0.0);
                let filled = phase.success_width
                    + phase.failure_width
                    + phase.progress_width.unwrap_or(0.0);
                prop_assert!(filled <= 100.0 + 1e-9);
            }
        }

        #[test]
        fn prop_counted_successes_monotonic(
            phases in arb_phases(),
            devices in 0u64..500,
            successes in 0u64..600,
            failures in 0u64..600,
        ) {
            let result = displayable_rollout_phases(&RolloutInput {
                phases: &phases,
                total_device_count: devices,
                total_success_count: successes,
                total_failure_count: failures,
                current_progress_count: 0,
                current_phase: None,
            });
            let mut counted = 0;
            for phase in &result {
                let next = counted + phase.successes;
                prop_assert!(next >= counted);
                counted = next;
            }
            prop_assert!(counted <= successes as i64);
        }

        #[test]
        fn prop_idempotent(
            phases in arb_phases(),
            devices in 0u64..500,
            successes in 0u64..600,
            failures in 0u64..600,
            progress in 0u64..600,
        ) {
            let input = RolloutInput {
                phases: &phases,
                total_device_count: devices,
                total_success_count: successes,
                total_failure_count: failures,
                current_progress_count: progress,
                current_phase: Some(0),
            };
            prop_assert_eq!(displayable_rollout_phases(&input), displayable_rollout_phases(&input));
        }
    }
}
