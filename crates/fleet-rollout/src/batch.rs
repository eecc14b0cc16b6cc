//! Batch arithmetic — remainders and per-phase device counts.
//!
//! Percentages are kept in `i64` because a remainder goes negative as soon
//! as the explicit batch sizes add up to more than 100%. Callers decide what
//! a non-positive remainder means; nothing here rejects it.

use fleet_core::Phase;

/// Percentage left for the final phase.
///
/// This is `100` minus the batch sizes of every phase except the last. The
/// last phase's own `batch_size` is never read, even when set.
pub fn remainder_percent(phases: &[Phase]) -> i64 {
    let Some((_, leading)) = phases.split_last() else {
        return 100;
    };
    leading
        .iter()
        .fold(100, |remainder, phase| remainder - phase.batch_size.map_or(0, i64::from))
}

/// Batch size of `phases[index]`, falling back to the remainder for the last
/// phase when it has none of its own.
pub fn effective_batch_size(phases: &[Phase], index: usize) -> i64 {
    match phases.get(index).and_then(|phase| phase.batch_size) {
        Some(size) if size > 0 => i64::from(size),
        _ if index + 1 == phases.len() => remainder_percent(phases),
        _ => 0,
    }
}

/// Devices a phase holds out of `total_devices`.
///
/// Rounds down for every phase but the last, which rounds up so devices
/// lost to flooring in earlier phases still land somewhere.
pub fn phase_device_count(
    total_devices: u64,
    batch_size: Option<u32>,
    remainder: i64,
    is_last_phase: bool,
) -> i64 {
    let percent = batch_size
        .filter(|size| *size > 0)
        .map_or(remainder, i64::from);
    let product = to_signed(total_devices).saturating_mul(percent);
    if is_last_phase {
        -(-product).div_euclid(100)
    } else {
        product.div_euclid(100)
    }
}

pub(crate) fn to_signed(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(sizes: &[Option<u32>]) -> Vec<Phase> {
        sizes
            .iter()
            .map(|size| Phase {
                batch_size: *size,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn remainder_ignores_last_phase() {
        assert_eq!(remainder_percent(&phases(&[Some(10), Some(10), Some(10)])), 80);
        assert_eq!(remainder_percent(&phases(&[Some(10), Some(90)])), 90);
        assert_eq!(remainder_percent(&phases(&[Some(10), Some(95)])), 90);
        assert_eq!(remainder_percent(&phases(&[Some(20), None])), 80);
    }

    #[test]
    fn remainder_can_go_negative() {
        assert_eq!(remainder_percent(&phases(&[Some(50), Some(55), Some(95)])), -5);
    }

    #[test]
    fn remainder_of_empty_and_single() {
        assert_eq!(remainder_percent(&[]), 100);
        assert_eq!(remainder_percent(&phases(&[Some(40)])), 100);
    }

    #[test]
    fn effective_size_uses_remainder_for_last() {
        let list = phases(&[Some(20), Some(30), None]);
        assert_eq!(effective_batch_size(&list, 0), 20);
        assert_eq!(effective_batch_size(&list, 2), 50);
        assert_eq!(effective_batch_size(&list, 7), 0);
    }

    #[test]
    fn device_count_rounding() {
        assert_eq!(phase_device_count(120, Some(10), 20, false), 12);
        assert_eq!(phase_device_count(120, Some(10), 20, true), 12);
        assert_eq!(phase_device_count(120, None, 20, true), 24);
        assert_eq!(phase_device_count(120, None, 20, false), 24);
        assert_eq!(phase_device_count(1, None, 20, false), 0);
        assert_eq!(phase_device_count(10, Some(15), 0, false), 1);
        assert_eq!(phase_device_count(10, Some(15), 0, true), 2);
    }

    #[test]
    fn device_count_with_negative_remainder() {
        assert_eq!(phase_device_count(100, None, -5, true), -5);
        assert_eq!(phase_device_count(10, None, -5, false), -1);
    }
}
