#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::cast_precision_loss)] // Unit counts are far below 2^52

//! Per-item duration samples recorded by ticks

use std::time::Duration;
use tokio::time::Instant;

/// Append-only record of completed work for one run
#[derive(Debug, Clone)]
pub(crate) struct SampleStore {
    /// When the run started
    start: Instant,
    /// When the most recent tick was accepted
    last_tick: Instant,
    /// Units completed so far, never clamped to the total
    completed: u64,
    /// One per-item duration in milliseconds per accepted tick
    samples: Vec<f64>,
}

impl SampleStore {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            last_tick: start,
            completed: 0,
            samples: Vec::new(),
        }
    }

    /// Record `amount` finished units and return the per-item sample in ms
    ///
    /// With an explicit duration the sample is `explicit / amount`; otherwise
    /// the gap since the previous tick (or since start) is spread across the
    /// batch. `amount` must be non-zero; the logger filters zero-sized ticks.
    pub fn record(&mut self, amount: u64, explicit: Option<Duration>, now: Instant) -> f64 {
        debug_assert!(amount > 0, "zero-sized ticks are filtered by the logger");

        let batch = explicit.unwrap_or_else(|| now.saturating_duration_since(self.last_tick));
        let per_item_ms = batch.as_nanos() as f64 / 1_000_000.0 / amount as f64;

        self.samples.push(per_item_ms);
        self.completed = self.completed.saturating_add(amount);
        self.last_tick = now;

        per_item_ms
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }
}
