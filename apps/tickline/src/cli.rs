//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;
use tickline_config::ColorChoice;

/// tickline - simulate a batch job and watch its progress line
#[derive(Parser, Debug)]
#[command(name = "tickline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate a batch job and report its progress on one line")]
#[command(long_about = None)]
pub struct Cli {
    /// Number of work items in the batch
    #[arg(long, default_value_t = 200)]
    pub total: u64,

    /// Label shown in front of the progress line
    #[arg(long, default_value = "Processing items")]
    pub message: String,

    /// Simulated time per item in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 20)]
    pub delay_ms: u64,

    /// Make every Nth item ten times slower
    #[arg(long, value_name = "N")]
    pub slow_every: Option<u64>,

    /// Treat each item as a chunk of this many bytes
    #[arg(long, value_name = "BYTES")]
    pub bytes: Option<u64>,

    /// Minimum spacing between renders in milliseconds
    #[arg(long, value_name = "MS")]
    pub throttle_ms: Option<u64>,

    /// Print every update on a new line
    #[arg(long)]
    pub prevent_overwrite: bool,

    /// Color output control
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,

    /// Measure each item and report its duration instead of relying on tick spacing
    #[arg(long)]
    pub explicit_timing: bool,
}

impl Cli {
    /// Simulated duration of the `index`th item (1-based)
    pub fn item_delay(&self, index: u64) -> std::time::Duration {
        let base = std::time::Duration::from_millis(self.delay_ms);
        match self.slow_every {
            Some(n) if n > 0 && index % n == 0 => base * 10,
            _ => base,
        }
    }

    /// Units reported per item: one, or the chunk size in byte mode
    pub fn units_per_item(&self) -> u64 {
        self.bytes.unwrap_or(1).max(1)
    }
}
