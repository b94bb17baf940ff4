//! Human-readable durations, byte sizes and sparklines

use std::fmt::Write as _;
use std::time::Duration;

/// Options for [`format_duration`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationFormat {
    /// Print every unit between the largest non-zero one and seconds,
    /// including zero-valued units in between, and never fall back to ms
    pub force_all_units: bool,
    /// Decimal places shown on the seconds unit
    pub seconds_decimal_places: usize,
}

impl DurationFormat {
    /// Format used for the remaining-time estimate: `1h 0m 5s`
    pub const ETA: Self = Self {
        force_all_units: true,
        seconds_decimal_places: 0,
    };

    /// Format used for the completion summary: `1m 2.5s`, `850ms`
    pub const SUMMARY: Self = Self {
        force_all_units: false,
        seconds_decimal_places: 1,
    };
}

/// Format a duration as `d h m s` units
///
/// The duration is rounded to the shown precision before it is split, so
/// seconds never read `60`.
pub fn format_duration(duration: Duration, options: DurationFormat) -> String {
    if !options.force_all_units && duration < Duration::from_secs(1) {
        return format!("{}ms", duration.as_millis());
    }

    let places = options.seconds_decimal_places.min(9);
    let scale = 10u128.pow(u32::try_from(places).unwrap_or(9));
    let ticks = (duration.as_nanos() * scale + 500_000_000) / 1_000_000_000;
    let total_secs = u64::try_from(ticks / scale).unwrap_or(u64::MAX);
    let fraction = ticks % scale;

    let units = [
        (total_secs / 86_400, 'd'),
        ((total_secs % 86_400) / 3600, 'h'),
        ((total_secs % 3600) / 60, 'm'),
    ];

    let mut out = String::new();
    let mut started = false;
    for (value, suffix) in units {
        started |= value > 0;
        if started && (value > 0 || options.force_all_units) {
            let _ = write!(out, "{value}{suffix} ");
        }
    }

    let seconds = total_secs % 60;
    if places == 0 {
        let _ = write!(out, "{seconds}s");
    } else {
        let _ = write!(out, "{seconds}.{fraction:0places$}s");
    }
    out
}

/// Format a byte count with 1024-based units
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{size:.0} {}", UNITS[unit_index])
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}

/// Render values as block characters scaled between their min and max
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn sparkline(values: &[u64]) -> String {
    const TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return String::new();
    };
    let span = (max - min) as f64;

    values
        .iter()
        .map(|&value| {
            if max == min {
                TICKS[TICKS.len() / 2]
            } else {
                let level = ((value - min) as f64 / span * (TICKS.len() - 1) as f64).round();
                TICKS[level as usize]
            }
        })
        .collect()
}
