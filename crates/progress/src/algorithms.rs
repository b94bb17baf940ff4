#![deny(clippy::pedantic, unsafe_code)]
#![allow(
    clippy::cast_precision_loss,        // Sample counts are far below 2^52
    clippy::cast_possible_truncation,   // Bucket means are rounded on purpose
    clippy::cast_sign_loss              // Durations are never negative
)]

//! Statistical helpers for duration samples
//!
//! Everything here is a pure function over millisecond samples so the
//! estimators can be recomputed from scratch whenever the store changes.

/// Maximum number of trend buckets shown next to the progress line
pub const MAX_TREND_BUCKETS: usize = 10;

/// Multiplier applied to the interquartile range when fencing outliers
const IQR_FENCE: f64 = 1.5;

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Drop samples outside the Tukey fences of the interquartile range
///
/// Quartiles are positional (`sorted[n/4]` and `sorted[3n/4]`), not
/// interpolated. Survivors keep their original order so callers can take a
/// trailing window of the most recent inliers. The first quartile itself is
/// always inside the fences, so a non-empty input never yields an empty
/// output.
pub fn filter_outliers(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[(3 * n / 4).min(n - 1)];
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE * iqr;
    let upper = q3 + IQR_FENCE * iqr;

    samples
        .iter()
        .copied()
        .filter(|value| (lower..=upper).contains(value))
        .collect()
}

/// Current average duration per item
///
/// Filters outliers, then averages the trailing
/// `min(window, filtered_len - 1)` inliers. Returns `None` until at least two
/// inliers exist.
pub fn windowed_average(samples: &[f64], window: usize) -> Option<f64> {
    let filtered = filter_outliers(samples);
    let take = window.min(filtered.len().saturating_sub(1));
    mean(&filtered[filtered.len() - take..])
}

/// Downsample historical averages into at most [`MAX_TREND_BUCKETS`] values
///
/// Each bucket is the rounded mean of a contiguous run of
/// `ceil(len / MAX_TREND_BUCKETS)` entries. The iterator borrows the history
/// and is recomputed on every call.
pub fn trend_buckets(history: &[f64]) -> impl Iterator<Item = u64> + '_ {
    let bucket_size = history.len().div_ceil(MAX_TREND_BUCKETS).max(1);
    history
        .chunks(bucket_size)
        .filter_map(|run| mean(run).map(|avg| avg.round().max(0.0) as u64))
}
