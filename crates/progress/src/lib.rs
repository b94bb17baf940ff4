#![deny(clippy::pedantic, unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,         // Builder and accessor methods are self-evident
    clippy::missing_panics_doc
)]

//! Single-line console progress reporting for batches of known size
//!
//! A [`ProgressLogger`] is told how many units of work exist, receives a
//! tick whenever some of them finish, and keeps one status line up to date:
//!
//! ```text
//! Resizing images: 250 of 1000 | ████████████░░░░… | 25.00% | Est remaining: 0h 1m 12s | ▃▄▄▅▄
//! ```
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tickline::{ProgressLogger, ProgressOptions};
//! use std::time::Duration;
//!
//! # async fn run(items: Vec<u32>) {
//! let logger = ProgressLogger::new(
//!     ProgressOptions::new(items.len() as u64, "Resizing images")
//!         .with_throttle(Duration::from_millis(100)),
//! );
//!
//! for _item in items {
//!     // ... process the item ...
//!     logger.tick(1);
//! }
//! // Reaching the total prints "Finished Resizing images in …" and disposes
//! // the logger. On early exit call `logger.dispose()` or just drop it.
//! # }
//! ```
//!
//! ## Estimation
//!
//! Every tick contributes one per-item duration sample, either measured by
//! the caller (`tick_with_duration`) or inferred from the spacing between
//! ticks. Samples outside 1.5 × IQR are discarded, the trailing window of
//! the rest is averaged, and that average times the remaining units is
//! blended 50/50 with an extrapolation of elapsed wall-clock time. Until both
//! estimates exist nothing is rendered.
//!
//! ## Rendering
//!
//! Ticks and a one-second heartbeat trigger renders. An optional throttle
//! limits renders to one per interval while always keeping the first and
//! last state of a burst, and unchanged lines are never written twice.

pub mod algorithms;
pub mod config;
pub mod eta;
pub mod format;
mod logger;
mod pipeline;
mod samples;
pub mod sink;
pub mod theme;
pub mod update;

pub use config::ProgressOptions;
pub use format::{format_bytes, format_duration, sparkline, DurationFormat};
pub use logger::{LifecycleState, ProgressLogger, ProgressSnapshot};
pub use sink::{FnSink, RenderSink, TermSink};
pub use theme::Theme;
pub use update::RenderPayload;

pub use tickline_config::{ColorChoice, Config};
