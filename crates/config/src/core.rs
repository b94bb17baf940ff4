//! Display and estimation settings

use serde::{Deserialize, Serialize};

/// When to colorize the progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

/// How the progress line is drawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub color: ColorChoice,
    /// Print every render on its own line instead of redrawing in place
    #[serde(default)]
    pub prevent_overwrite: bool,
    /// Minimum spacing between renders; 0 disables throttling
    #[serde(default)]
    pub throttle_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            prevent_overwrite: false,
            throttle_ms: 0,
        }
    }
}

/// Tuning for the duration estimators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationConfig {
    /// Trailing window of filtered samples used for the average
    #[serde(default = "default_average_sample_size")]
    pub average_sample_size: usize,
    /// Periodic re-render interval; 0 disables the heartbeat
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            average_sample_size: default_average_sample_size(),
            heartbeat_ms: default_heartbeat_ms(),
        }
    }
}

fn default_average_sample_size() -> usize {
    100
}

fn default_heartbeat_ms() -> u64 {
    1000
}
