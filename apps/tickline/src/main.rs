//! tickline - demo driver for the progress logger
//!
//! Simulates a batch of work items with configurable per-item delays and
//! reports it through a [`ProgressLogger`].

mod cli;
mod error;

use crate::cli::Cli;
use crate::error::CliError;
use clap::Parser;
use std::process;
use tickline::{ProgressLogger, ProgressOptions};
use tickline_config::Config;
use tokio::time::Instant;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting tickline v{}", env!("CARGO_PKG_VERSION"));

    // Precedence: file (or defaults), then environment, then flags
    let mut config = Config::load_or_default(cli.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli);
    config.validate()?;

    let units = cli.units_per_item();
    let total = cli.total.saturating_mul(units);
    let logger = ProgressLogger::new(
        ProgressOptions::from_config(&config, total, cli.message.clone())
            .with_bytes(cli.bytes.is_some()),
    );
    debug!(?config, total, "progress logger created");

    tokio::select! {
        () = simulate(&cli, &logger, units) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            logger.dispose();
            eprintln!();
            info!("Interrupted, progress disposed");
        }
    }

    Ok(())
}

/// Apply CLI flags on top of file and environment settings
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.color {
        config.display.color = color;
    }
    if let Some(throttle_ms) = cli.throttle_ms {
        config.display.throttle_ms = throttle_ms;
    }
    if cli.prevent_overwrite {
        config.display.prevent_overwrite = true;
    }
}

/// Sleep through each simulated item and tick the logger
async fn simulate(cli: &Cli, logger: &ProgressLogger, units: u64) {
    for index in 1..=cli.total {
        let started = Instant::now();
        tokio::time::sleep(cli.item_delay(index)).await;

        if cli.explicit_timing {
            logger.tick_with_duration(units, started.elapsed());
        } else {
            logger.tick(units);
        }
    }
}

fn init_tracing(debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let default_filter = if debug_enabled {
        "info,tickline=debug,tickline_config=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
