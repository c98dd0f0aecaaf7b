// Copyright (c) 2026 Xstro Labs. MIT License.
// See LICENSE for details.

//! # XSTRO Node
//!
//! Entry point for the `xstro-node` binary. Parses CLI arguments,
//! initializes logging, and either deploys a vault or replays a scenario
//! against one.
//!
//! The binary supports three subcommands:
//!
//! - `deploy`   — deploy a vault from a config and print its address
//! - `simulate` — replay a scenario and print a JSON report
//! - `version`  — print build version information

mod cli;
mod logging;
mod metrics;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;

use xstro_contracts::{VaultClient, VaultConfig};
use xstro_protocol::config::{DEFAULT_LOG_FILTER, NATIVE_DECIMALS, NATIVE_SYMBOL};
use xstro_protocol::{ManualClock, SystemClock};

use cli::{Commands, XstroNodeCli};
use metrics::VaultMetrics;

fn main() -> Result<()> {
    let cli = XstroNodeCli::parse();

    match cli.command {
        Commands::Deploy(args) => {
            logging::init_logging(DEFAULT_LOG_FILTER, cli.log_format)?;
            deploy(args)
        }
        Commands::Simulate(args) => {
            logging::init_logging(DEFAULT_LOG_FILTER, cli.log_format)?;
            simulate(args)
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Deploys a vault on a fresh chain and prints where it landed.
fn deploy(args: cli::DeployArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            VaultConfig::from_json(&text)
                .with_context(|| format!("invalid config file: {}", path.display()))?
        }
        None => VaultConfig::default(),
    };

    let vault = if args.wall_clock {
        VaultClient::from_config(&config, SystemClock)
    } else {
        VaultClient::from_config(&config, ManualClock::new(config.start_time))
    }
    .context("vault deployment failed")?;
    tracing::info!(address = %vault.address(), owner = %vault.owner(), "vault ready");

    println!("XstroVault deployed to: {}", vault.address());
    let snapshot = serde_json::to_string_pretty(&vault.snapshot())
        .context("failed to serialize vault state")?;
    println!("{snapshot}");
    Ok(())
}

/// Replays a scenario file and prints the JSON report, optionally followed
/// by the run's metrics.
fn simulate(args: cli::SimulateArgs) -> Result<()> {
    let scenario = scenario::load(&args.scenario)?;
    let metrics = if args.metrics {
        Some(VaultMetrics::new().context("failed to create metrics registry")?)
    } else {
        None
    };

    let report = scenario::run(&scenario, metrics.as_ref())?;
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");

    if let Some(metrics) = &metrics {
        let text = metrics.encode().context("failed to encode metrics")?;
        print!("{text}");
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("xstro-node {}", env!("CARGO_PKG_VERSION"));
    println!("native     {NATIVE_SYMBOL} ({NATIVE_DECIMALS} decimals)");
    println!("rustc      {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
