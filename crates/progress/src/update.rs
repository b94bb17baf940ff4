//! Render payloads and line formatting

use crate::format::{format_bytes, format_duration, sparkline, DurationFormat};
use crate::theme::{Element, Theme};
use std::time::Duration;

/// Number of cells in the progress bar
pub const BAR_WIDTH: usize = 50;

const FILLED_CELL: &str = "█";
const EMPTY_CELL: &str = "░";

/// Everything one progress line shows
///
/// Two payloads compare equal exactly when they would print the same line,
/// which is what render deduplication relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPayload {
    /// Units completed, unclamped
    pub completed: u64,
    /// Total units of work
    pub total: u64,
    /// Completion in `[0, 100]`, rounded to two decimals
    pub percentage: f64,
    /// Blended remaining-time estimate, truncated to whole seconds
    pub eta: Duration,
    /// Downsampled historical averages in ms
    pub trend: Vec<u64>,
}

/// Completion percentage clamped to `[0, 100]` and rounded to two decimals
///
/// `None` when `total` is zero: such a logger never renders.
#[allow(clippy::cast_precision_loss)]
pub fn percentage(completed: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let raw = completed as f64 / total as f64 * 100.0;
    Some(((raw * 100.0).round() / 100.0).clamp(0.0, 100.0))
}

impl RenderPayload {
    pub fn new(completed: u64, total: u64, percentage: f64, eta: Duration, trend: Vec<u64>) -> Self {
        Self {
            completed,
            total,
            percentage,
            eta: Duration::from_secs(eta.as_secs()),
            trend,
        }
    }

    /// Cells are numbered from 1, so cell `i` is filled while `percentage / 2 >= i`
    /// and the first cell fills at 2%
    #[allow(clippy::cast_precision_loss)]
    pub fn filled_cells(&self) -> usize {
        (1..=BAR_WIDTH)
            .take_while(|&cell| self.percentage / 2.0 >= cell as f64)
            .count()
    }

    /// The trend indicator is only worth showing once some average is positive
    pub fn has_trend(&self) -> bool {
        self.trend.iter().any(|&bucket| bucket > 0)
    }

    /// Format the full progress line
    pub fn render_line(&self, message: &str, bytes: bool, theme: &Theme) -> String {
        let count = |units: u64| {
            if bytes {
                format_bytes(units)
            } else {
                units.to_string()
            }
        };

        let filled = self.filled_cells();
        let bar = format!(
            "{}{}",
            theme.paint(Element::BarFilled, &FILLED_CELL.repeat(filled)),
            theme.paint(Element::BarEmpty, &EMPTY_CELL.repeat(BAR_WIDTH - filled)),
        );

        let mut line = format!(
            "{}: {} of {} | {} | {}% | Est remaining: {}",
            theme.paint(Element::Label, message),
            count(self.completed),
            count(self.total),
            bar,
            theme.paint(Element::Percentage, &format!("{:.2}", self.percentage)),
            theme.paint(
                Element::Eta,
                &format_duration(self.eta, DurationFormat::ETA)
            ),
        );

        if self.has_trend() {
            line.push_str(" | ");
            line.push_str(&theme.paint(Element::Trend, &sparkline(&self.trend)));
        }

        line
    }
}

/// Format the completion summary line
pub fn summary_line(message: &str, elapsed: Duration, theme: &Theme) -> String {
    theme.paint(
        Element::Summary,
        &format!(
            "Finished {message} in {}",
            format_duration(elapsed, DurationFormat::SUMMARY)
        ),
    )
}
