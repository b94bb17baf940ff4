//! Throttled, deduplicated delivery of render payloads to a sink

use crate::sink::RenderSink;
use crate::theme::Theme;
use crate::update::{summary_line, RenderPayload};
use std::time::Duration;
use tickline_errors::{RenderError, UserFacingError};
use tokio::time::Instant;

/// Result of asking the throttle whether a trigger may render now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    /// Render immediately (leading edge, or throttling disabled)
    Open,
    /// Inside the interval; `Some(deadline)` asks the caller to schedule the
    /// trailing render, `None` means one is already scheduled
    Deferred(Option<Instant>),
}

/// Leading + trailing edge rate limiter
#[derive(Debug, Clone)]
pub(crate) struct Throttle {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: bool,
    trailing_deadline: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: false,
            trailing_deadline: None,
        }
    }

    pub fn admit(&mut self, now: Instant) -> Gate {
        if self.interval.is_zero() {
            return Gate::Open;
        }
        match self.last_emit {
            Some(last) if now < last + self.interval => {
                self.pending = true;
                if self.trailing_deadline.is_some() {
                    Gate::Deferred(None)
                } else {
                    let deadline = last + self.interval;
                    self.trailing_deadline = Some(deadline);
                    Gate::Deferred(Some(deadline))
                }
            }
            _ => Gate::Open,
        }
    }

    /// A line was written at `now`
    pub fn emitted(&mut self, now: Instant) {
        self.last_emit = Some(now);
        self.pending = false;
    }

    /// The trailing timer fired; returns whether a deferred trigger is waiting
    pub fn take_trailing(&mut self) -> bool {
        self.trailing_deadline = None;
        std::mem::take(&mut self.pending)
    }

    /// No timer could be scheduled; the next open trigger picks up the state
    pub fn cancel_trailing(&mut self) {
        self.trailing_deadline = None;
    }
}

/// What happened to one trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Rendered,
    /// No estimate yet, nothing to show
    Suppressed,
    /// Same payload as the last rendered one
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Progress,
    Summary,
}

/// A formatted line waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    seq: u64,
    kind: LineKind,
    text: String,
}

/// Render decisions: dedupe, throttle bookkeeping, formatting
///
/// Runs under the logger's state lock and only queues lines; [`Output`]
/// writes them once that lock is released.
pub(crate) struct RenderPipeline {
    theme: Theme,
    message: String,
    bytes: bool,
    pub(crate) throttle: Throttle,
    last_emitted: Option<RenderPayload>,
    next_seq: u64,
    queued: Vec<Line>,
}

impl RenderPipeline {
    pub fn new(theme: Theme, message: String, bytes: bool, throttle: Duration) -> Self {
        Self {
            theme,
            message,
            bytes,
            throttle: Throttle::new(throttle),
            last_emitted: None,
            next_seq: 0,
            queued: Vec::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Queue `payload` unless it is missing or identical to the last line
    pub fn offer(&mut self, payload: Option<RenderPayload>, now: Instant) -> Outcome {
        let Some(payload) = payload else {
            return Outcome::Suppressed;
        };
        if self.last_emitted.as_ref() == Some(&payload) {
            return Outcome::Duplicate;
        }
        self.emit(payload, now);
        Outcome::Rendered
    }

    /// Queue the terminal state regardless of throttle and dedupe
    pub fn force(&mut self, payload: RenderPayload, now: Instant) {
        self.emit(payload, now);
    }

    /// Queue the completion summary
    pub fn summary(&mut self, elapsed: Duration) {
        let text = summary_line(&self.message, elapsed, &self.theme);
        self.queue(LineKind::Summary, text);
    }

    /// Lines queued since the last call, oldest first
    pub fn take_lines(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.queued)
    }

    fn emit(&mut self, payload: RenderPayload, now: Instant) {
        let text = payload.render_line(&self.message, self.bytes, &self.theme);
        self.queue(LineKind::Progress, text);
        self.throttle.emitted(now);
        self.last_emitted = Some(payload);
    }

    fn queue(&mut self, kind: LineKind, text: String) {
        self.queued.push(Line {
            seq: self.next_seq,
            kind,
            text,
        });
        self.next_seq += 1;
    }
}

/// Sink side of the render path
///
/// Lines from concurrent triggers can arrive out of order; a progress line
/// older than one already written is stale and dropped.
pub(crate) struct Output {
    sink: Box<dyn RenderSink>,
    last_seq: Option<u64>,
    sink_failed: bool,
}

impl Output {
    pub fn new(sink: Box<dyn RenderSink>) -> Self {
        Self {
            sink,
            last_seq: None,
            sink_failed: false,
        }
    }

    /// Write `lines` in order; returns how many reached the sink
    pub fn deliver(&mut self, lines: Vec<Line>) -> usize {
        let mut written = 0;
        for line in lines {
            let stale = self.last_seq.is_some_and(|last| line.seq < last);
            if stale && line.kind == LineKind::Progress {
                tracing::trace!(seq = line.seq, "stale progress line dropped");
                continue;
            }

            let result = match line.kind {
                LineKind::Progress => self.sink.render(&line.text),
                LineKind::Summary => self.sink.finish(&line.text),
            };
            self.last_seq = Some(self.last_seq.map_or(line.seq, |last| last.max(line.seq)));
            self.report(result);
            written += 1;
        }
        written
    }

    fn report(&mut self, result: std::io::Result<()>) {
        let Err(err) = result else {
            return;
        };
        let err = RenderError::from(err);
        if self.sink_failed {
            tracing::trace!(error = %err, "progress sink still failing");
        } else {
            tracing::warn!(
                error = %err,
                code = err.user_code(),
                retryable = err.is_retryable(),
                "progress sink write failed"
            );
            self.sink_failed = true;
        }
    }
}
