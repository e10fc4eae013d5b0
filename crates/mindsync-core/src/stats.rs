//! Latency percentile statistics.
//!
//! The verifier samples CDN round-trip times and gates on the 99th
//! percentile. The computation is sort-then-index: deterministic regardless
//! of input order, and clamped so small sample sets cannot index out of
//! bounds. An empty sample set yields `None` -- callers decide what no data
//! means.

/// Percentile over a sample set, `p` in `0.0..=1.0`.
///
/// Sorts ascending and picks index `floor(p * len)`, clamped to the last
/// valid index. Returns `None` for an empty set.
#[must_use]
pub fn percentile(samples: &[u64], p: f64) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(sorted[index])
}

/// 99th percentile over a sample set.
#[must_use]
pub fn p99(samples: &[u64]) -> Option<u64> {
    percentile(samples, 0.99)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn empty_set_yields_none() {
        assert_eq!(p99(&[]), None);
    }

    #[test]
    fn single_sample_is_its_own_p99() {
        assert_eq!(p99(&[230]), Some(230));
    }

    #[test]
    fn order_independent() {
        let ordered: Vec<u64> = (1..=100).collect();
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.swap(3, 61);
        shuffled.swap(17, 40);
        assert_eq!(p99(&ordered), p99(&shuffled));
    }

    #[test]
    fn fifty_samples_pick_the_outlier() {
        // 49 fast samples and one 10s outlier: floor(50 * 0.99) = 49, the
        // last index, so the outlier decides the statistic.
        let mut samples = vec![120; 49];
        samples.push(10_000);
        assert_eq!(p99(&samples), Some(10_000));
    }

    #[rstest]
    #[case(&[10, 20, 30, 40], 0.5, 30)]
    #[case(&[10, 20, 30, 40], 0.0, 10)]
    #[case(&[10, 20, 30, 40], 1.0, 40)]
    #[case(&[5], 0.99, 5)]
    fn clamps_at_boundaries(#[case] samples: &[u64], #[case] p: f64, #[case] expected: u64) {
        assert_eq!(percentile(samples, p), Some(expected));
    }
}
