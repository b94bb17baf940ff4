//! Property-based tests for the estimation helpers.
//!
//! These check the invariants the progress line relies on for arbitrary
//! sample sets rather than hand-picked ones.

use proptest::prelude::*;
use std::time::Duration;
use tickline::algorithms::{filter_outliers, trend_buckets, windowed_average, MAX_TREND_BUCKETS};
use tickline::eta::blended_eta;
use tickline::update::percentage;

/// Generates per-item durations in milliseconds.
fn arb_samples() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..100_000.0, 1..200)
}

/// True when `needle` appears in `haystack` in the same relative order.
fn is_subsequence(needle: &[f64], haystack: &[f64]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|value| rest.any(|candidate| candidate == value))
}

proptest! {
    /// The filter never empties a non-empty set and only removes samples.
    #[test]
    fn prop_filter_keeps_order_and_some_samples(samples in arb_samples()) {
        let filtered = filter_outliers(&samples);
        prop_assert!(!filtered.is_empty());
        prop_assert!(filtered.len() <= samples.len());
        prop_assert!(is_subsequence(&filtered, &samples), "survivors must keep input order");
    }

    /// A constant series has no outliers.
    #[test]
    fn prop_filter_keeps_constant_series(value in 0.0f64..10_000.0, len in 1usize..50) {
        let samples = vec![value; len];
        prop_assert_eq!(filter_outliers(&samples), samples);
    }

    /// The windowed average is defined from two inliers on and stays within their range.
    #[test]
    fn prop_average_within_inlier_range(samples in arb_samples(), window in 1usize..150) {
        let filtered = filter_outliers(&samples);
        let average = windowed_average(&samples, window);

        if filtered.len() < 2 {
            prop_assert!(average.is_none());
        } else {
            let average = average.expect("two inliers give an average");
            let min = filtered.iter().copied().fold(f64::INFINITY, f64::min);
            let max = filtered.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(average >= min - 1e-6 && average <= max + 1e-6);
        }
    }

    /// Trend output never exceeds the bucket limit and covers every history entry.
    #[test]
    fn prop_trend_bucket_count(history in prop::collection::vec(0.0f64..5_000.0, 0..500)) {
        let buckets: Vec<u64> = trend_buckets(&history).collect();
        prop_assert!(buckets.len() <= MAX_TREND_BUCKETS);

        let bucket_size = history.len().div_ceil(MAX_TREND_BUCKETS).max(1);
        prop_assert_eq!(buckets.len(), history.len().div_ceil(bucket_size));
    }

    /// Percentage is clamped to 0..=100 and never decreases as work completes.
    #[test]
    fn prop_percentage_monotonic(total in 1u64..1_000_000, a in 0u64..2_000_000, b in 0u64..2_000_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_pct = percentage(low, total).expect("positive total");
        let high_pct = percentage(high, total).expect("positive total");

        prop_assert!((0.0..=100.0).contains(&low_pct));
        prop_assert!((0.0..=100.0).contains(&high_pct));
        prop_assert!(low_pct <= high_pct);
    }

    /// Nothing remaining always means a zero estimate.
    #[test]
    fn prop_eta_zero_when_done(total in 1u64..10_000, extra in 0u64..100, elapsed_ms in 0u64..1_000_000) {
        let eta = blended_eta(Duration::from_millis(elapsed_ms), None, total + extra, total);
        prop_assert_eq!(eta, Some(Duration::ZERO));
    }
}
