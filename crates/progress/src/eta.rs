#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::cast_precision_loss)] // Unit counts are far below 2^52

//! Remaining-time estimation
//!
//! Two independent estimators are blended:
//! - elapsed-ratio: extrapolates the whole run from the observed completion
//!   rate; stable but slow to react
//! - duration-based: recent average per item times the remaining units;
//!   reacts quickly but is noisier
//!
//! If either estimator is undefined the blend is undefined and the caller
//! skips rendering instead of substituting zero.

use std::time::Duration;

/// Elapsed-ratio estimate: `elapsed * (total / completed - 1)`
pub fn elapsed_ratio_eta(elapsed: Duration, completed: u64, total: u64) -> Option<Duration> {
    if completed == 0 || total == 0 {
        return None;
    }
    let factor = (total as f64 / completed as f64 - 1.0).max(0.0);
    duration_from_secs(elapsed.as_secs_f64() * factor)
}

/// Duration-based estimate: `average * max(total - completed, 0)`
pub fn duration_based_eta(average_ms: Option<f64>, completed: u64, total: u64) -> Option<Duration> {
    let average_ms = average_ms?;
    let remaining = total.saturating_sub(completed);
    duration_from_secs(average_ms * remaining as f64 / 1000.0)
}

/// Arithmetic mean of both estimators
///
/// Once nothing remains the estimate is exactly zero, even before an
/// average exists, so the terminal render always carries a value.
pub fn blended_eta(
    elapsed: Duration,
    average_ms: Option<f64>,
    completed: u64,
    total: u64,
) -> Option<Duration> {
    if total > 0 && completed >= total {
        return Some(Duration::ZERO);
    }

    let by_ratio = elapsed_ratio_eta(elapsed, completed, total)?;
    let by_duration = duration_based_eta(average_ms, completed, total)?;
    Some((by_ratio + by_duration) / 2)
}

fn duration_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}
