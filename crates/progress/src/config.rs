//! Construction options for a progress logger

use crate::sink::{FnSink, RenderSink, TermSink};
use crate::theme::Theme;
use std::time::Duration;
use tickline_config::Config;

/// Default trailing window for the average duration
pub const DEFAULT_AVERAGE_SAMPLE_SIZE: usize = 100;

/// Default interval of the re-render heartbeat
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(1);

/// Options fixed for the lifetime of one [`ProgressLogger`](crate::ProgressLogger)
pub struct ProgressOptions {
    pub(crate) total: u64,
    pub(crate) message: String,
    pub(crate) bytes: bool,
    pub(crate) average_sample_size: usize,
    pub(crate) prevent_overwrite: bool,
    pub(crate) throttle: Duration,
    pub(crate) heartbeat: Option<Duration>,
    pub(crate) theme: Theme,
    pub(crate) sink: Option<Box<dyn RenderSink>>,
}

impl ProgressOptions {
    /// Options for `total` units of work labelled `message`
    #[must_use]
    pub fn new(total: u64, message: impl Into<String>) -> Self {
        Self {
            total,
            message: message.into(),
            bytes: false,
            average_sample_size: DEFAULT_AVERAGE_SAMPLE_SIZE,
            prevent_overwrite: false,
            throttle: Duration::ZERO,
            heartbeat: Some(DEFAULT_HEARTBEAT),
            theme: Theme::default(),
            sink: None,
        }
    }

    /// Options seeded from loaded configuration
    #[must_use]
    pub fn from_config(config: &Config, total: u64, message: impl Into<String>) -> Self {
        Self::new(total, message)
            .with_average_sample_size(config.estimation.average_sample_size)
            .prevent_overwrite(config.display.prevent_overwrite)
            .with_throttle(config.throttle())
            .with_heartbeat(config.heartbeat())
            .with_theme(Theme::for_choice(config.display.color))
    }

    /// Render counts as byte sizes
    #[must_use]
    pub fn with_bytes(mut self, bytes: bool) -> Self {
        self.bytes = bytes;
        self
    }

    /// Trailing window of filtered samples used for the average; at least 1
    #[must_use]
    pub fn with_average_sample_size(mut self, size: usize) -> Self {
        self.average_sample_size = size.max(1);
        self
    }

    /// Print every render on a new line instead of redrawing in place
    #[must_use]
    pub fn prevent_overwrite(mut self, prevent: bool) -> Self {
        self.prevent_overwrite = prevent;
        self
    }

    /// Minimum spacing between renders; zero disables throttling
    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Periodic re-render so the estimate advances between ticks
    #[must_use]
    pub fn with_heartbeat(mut self, heartbeat: Option<Duration>) -> Self {
        self.heartbeat = heartbeat.filter(|period| !period.is_zero());
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Send output to a custom sink
    #[must_use]
    pub fn with_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Send output to a closure, one call per line
    ///
    /// The closure runs after the logger's state lock is released, so it may
    /// call `state()` or `snapshot()`. It must not tick the logger it is
    /// attached to, since output is written one batch at a time.
    #[must_use]
    pub fn with_log_function<F>(self, log: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.with_sink(FnSink(log))
    }

    pub(crate) fn take_sink(&mut self) -> Box<dyn RenderSink> {
        self.sink.take().unwrap_or_else(|| {
            if self.prevent_overwrite {
                Box::new(TermSink::lines())
            } else {
                Box::new(TermSink::stdout())
            }
        })
    }
}

impl std::fmt::Debug for ProgressOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressOptions")
            .field("total", &self.total)
            .field("message", &self.message)
            .field("bytes", &self.bytes)
            .field("average_sample_size", &self.average_sample_size)
            .field("prevent_overwrite", &self.prevent_overwrite)
            .field("throttle", &self.throttle)
            .field("heartbeat", &self.heartbeat)
            .field("custom_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}
