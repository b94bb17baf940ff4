//! Progress logger and its lifecycle
//!
//! The logger owns one run: a sample store, the derived averages and the
//! render pipeline. Ticks from the caller and the heartbeat / trailing
//! throttle timers all funnel into the same "recompute and maybe render"
//! step behind one state mutex. That step only queues lines; they are
//! written to the sink after the state lock is released, so a sink may
//! inspect the logger. Timer tasks only hold a `Weak` handle and never
//! touch tick accounting.

use crate::algorithms::{trend_buckets, windowed_average};
use crate::config::ProgressOptions;
use crate::eta::blended_eta;
use crate::pipeline::{Gate, Line, Output, RenderPipeline};
use crate::samples::SampleStore;
use crate::update::{percentage, RenderPayload};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Accepting ticks
    Running,
    /// Final render and summary in progress
    Completing,
    /// Inert; ticks and disposal are no-ops
    Disposed,
}

/// Point-in-time view of a running logger
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
    /// Per-item durations in ms, one per accepted tick
    pub samples: Vec<f64>,
    /// Current outlier-filtered windowed average in ms
    pub average_ms: Option<f64>,
    /// Number of recorded historical averages
    pub history_len: usize,
    pub percentage: Option<f64>,
    pub elapsed: Duration,
    pub eta: Option<Duration>,
}

/// Console progress reporter for a known amount of work
///
/// Dropping the logger disposes it without a summary line.
pub struct ProgressLogger {
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    output: Mutex<Output>,
}

impl Shared {
    /// Write queued lines; the state lock must not be held
    fn deliver(&self, lines: Vec<Line>) {
        if lines.is_empty() {
            return;
        }
        if let Ok(mut output) = self.output.lock() {
            output.deliver(lines);
        }
    }
}

struct Inner {
    total: u64,
    average_sample_size: usize,
    lifecycle: Lifecycle,
}

enum Lifecycle {
    Running(Box<Run>),
    Completing,
    Disposed,
}

/// State that only exists while running; dropping it releases everything
struct Run {
    store: SampleStore,
    history: Vec<f64>,
    average_ms: Option<f64>,
    pipeline: RenderPipeline,
    heartbeat: Option<JoinHandle<()>>,
    trailing: Option<JoinHandle<()>>,
}

impl Drop for Run {
    fn drop(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
        if let Some(handle) = self.trailing.take() {
            handle.abort();
        }
    }
}

impl Run {
    fn payload(&self, total: u64, now: Instant) -> Option<RenderPayload> {
        let completed = self.store.completed();
        let percentage = percentage(completed, total)?;
        let eta = blended_eta(self.store.elapsed(now), self.average_ms, completed, total)?;
        Some(RenderPayload::new(
            completed,
            total,
            percentage,
            eta,
            trend_buckets(&self.history).collect(),
        ))
    }

    fn snapshot(&self, total: u64, now: Instant) -> ProgressSnapshot {
        let completed = self.store.completed();
        let elapsed = self.store.elapsed(now);
        ProgressSnapshot {
            completed,
            total,
            samples: self.store.samples().to_vec(),
            average_ms: self.average_ms,
            history_len: self.history.len(),
            percentage: percentage(completed, total),
            elapsed,
            eta: blended_eta(elapsed, self.average_ms, completed, total),
        }
    }
}

impl Inner {
    fn state(&self) -> LifecycleState {
        match self.lifecycle {
            Lifecycle::Running(_) => LifecycleState::Running,
            Lifecycle::Completing => LifecycleState::Completing,
            Lifecycle::Disposed => LifecycleState::Disposed,
        }
    }

    fn record(
        &mut self,
        amount: u64,
        explicit: Option<Duration>,
        now: Instant,
        shared: &Arc<Shared>,
    ) -> Vec<Line> {
        let Lifecycle::Running(run) = &mut self.lifecycle else {
            tracing::trace!("tick after disposal ignored");
            return Vec::new();
        };
        if amount == 0 {
            tracing::debug!("zero-sized tick ignored");
            return Vec::new();
        }

        run.store.record(amount, explicit, now);
        run.average_ms = windowed_average(run.store.samples(), self.average_sample_size);
        if let Some(average) = run.average_ms {
            run.history.push(average);
        }

        if self.total > 0 && run.store.completed() >= self.total {
            self.complete(now)
        } else {
            self.trigger(now, shared, "tick")
        }
    }

    /// Shared by ticks and the heartbeat
    fn trigger(
        &mut self,
        now: Instant,
        shared: &Arc<Shared>,
        source: &'static str,
    ) -> Vec<Line> {
        let total = self.total;
        let Lifecycle::Running(run) = &mut self.lifecycle else {
            return Vec::new();
        };

        match run.pipeline.throttle.admit(now) {
            Gate::Open => {
                let payload = run.payload(total, now);
                let outcome = run.pipeline.offer(payload, now);
                tracing::trace!(source, ?outcome, "render triggered");
            }
            Gate::Deferred(None) => {}
            Gate::Deferred(Some(deadline)) => match Handle::try_current() {
                Ok(handle) => {
                    let weak = Arc::downgrade(shared);
                    run.trailing = Some(handle.spawn(trailing_flush(weak, deadline)));
                }
                Err(_) => run.pipeline.throttle.cancel_trailing(),
            },
        }
        run.pipeline.take_lines()
    }

    fn flush_trailing(&mut self, now: Instant) -> Vec<Line> {
        let total = self.total;
        let Lifecycle::Running(run) = &mut self.lifecycle else {
            return Vec::new();
        };
        run.trailing = None;
        if run.pipeline.throttle.take_trailing() {
            let payload = run.payload(total, now);
            let outcome = run.pipeline.offer(payload, now);
            tracing::trace!(source = "trailing", ?outcome, "render triggered");
        }
        run.pipeline.take_lines()
    }

    /// Running -> Completing -> Disposed, exactly once
    fn complete(&mut self, now: Instant) -> Vec<Line> {
        let mut run = match std::mem::replace(&mut self.lifecycle, Lifecycle::Completing) {
            Lifecycle::Running(run) => run,
            other => {
                self.lifecycle = other;
                return Vec::new();
            }
        };

        let elapsed = run.store.elapsed(now);
        if let Some(payload) = run.payload(self.total, now) {
            run.pipeline.force(payload, now);
        }
        run.pipeline.summary(elapsed);
        tracing::debug!(
            message = run.pipeline.message(),
            completed = run.store.completed(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "progress finished"
        );

        let lines = run.pipeline.take_lines();
        drop(run);
        self.lifecycle = Lifecycle::Disposed;
        lines
    }

    fn dispose(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed) {
            Lifecycle::Running(run) => {
                tracing::debug!(
                    message = run.pipeline.message(),
                    completed = run.store.completed(),
                    total = self.total,
                    "progress disposed before completion"
                );
            }
            Lifecycle::Completing | Lifecycle::Disposed => {}
        }
    }
}

impl ProgressLogger {
    /// Start a run; the clock starts now
    ///
    /// The heartbeat needs a tokio runtime. Without one the logger still
    /// works, it just only re-renders on ticks.
    #[must_use]
    pub fn new(mut options: ProgressOptions) -> Self {
        let now = Instant::now();
        let output = Output::new(options.take_sink());
        let pipeline = RenderPipeline::new(
            options.theme.clone(),
            options.message.clone(),
            options.bytes,
            options.throttle,
        );

        tracing::debug!(
            message = %options.message,
            total = options.total,
            bytes = options.bytes,
            throttle_ms = u64::try_from(options.throttle.as_millis()).unwrap_or(u64::MAX),
            "progress started"
        );

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                total: options.total,
                average_sample_size: options.average_sample_size,
                lifecycle: Lifecycle::Running(Box::new(Run {
                    store: SampleStore::new(now),
                    history: Vec::new(),
                    average_ms: None,
                    pipeline,
                    heartbeat: None,
                    trailing: None,
                })),
            }),
            output: Mutex::new(output),
        });

        if let Some(period) = options.heartbeat {
            match Handle::try_current() {
                Ok(handle) => {
                    let task = handle.spawn(heartbeat(Arc::downgrade(&shared), period));
                    if let Ok(mut inner) = shared.inner.lock() {
                        if let Lifecycle::Running(run) = &mut inner.lifecycle {
                            run.heartbeat = Some(task);
                        }
                    };
                }
                Err(_) => tracing::debug!("no tokio runtime, heartbeat disabled"),
            }
        }

        Self { shared }
    }

    /// Record `amount` completed units, timed by the gap since the last tick
    pub fn tick(&self, amount: u64) {
        self.record(amount, None);
    }

    /// Record `amount` completed units that took `duration` in total
    pub fn tick_with_duration(&self, amount: u64, duration: Duration) {
        self.record(amount, Some(duration));
    }

    fn record(&self, amount: u64, explicit: Option<Duration>) {
        let lines = {
            let Ok(mut inner) = self.shared.inner.lock() else {
                return;
            };
            inner.record(amount, explicit, Instant::now(), &self.shared)
        };
        self.shared.deliver(lines);
    }

    /// Stop rendering and release the run; safe to call repeatedly
    pub fn dispose(&self) {
        if let Ok(mut inner) = self.shared.inner.lock() {
            inner.dispose();
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.shared
            .inner
            .lock()
            .map_or(LifecycleState::Disposed, |inner| inner.state())
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state() == LifecycleState::Disposed
    }

    /// Current counters and estimates, or `None` once disposed
    #[must_use]
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        let inner = self.shared.inner.lock().ok()?;
        match &inner.lifecycle {
            Lifecycle::Running(run) => Some(run.snapshot(inner.total, Instant::now())),
            Lifecycle::Completing | Lifecycle::Disposed => None,
        }
    }
}

impl Drop for ProgressLogger {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ProgressLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressLogger")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

async fn heartbeat(shared: Weak<Shared>, period: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        let lines = {
            let Ok(mut inner) = shared.inner.lock() else {
                break;
            };
            if inner.state() != LifecycleState::Running {
                break;
            }
            inner.trigger(Instant::now(), &shared, "heartbeat")
        };
        shared.deliver(lines);
    }
}

async fn trailing_flush(shared: Weak<Shared>, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let lines = match shared.inner.lock() {
        Ok(mut inner) => inner.flush_trailing(Instant::now()),
        Err(_) => return,
    };
    shared.deliver(lines);
}
