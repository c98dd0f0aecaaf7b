//! # CLI Interface
//!
//! Defines the command-line argument structure for `xstro-node` using
//! `clap` derive. Supports three subcommands: `deploy`, `simulate` and
//! `version`.

use clap::{Parser, Subcommand};
use crate::logging::LogFormat;
use std::path::PathBuf;

/// XSTRO staking vault operator tool.
///
/// Deploys a vault onto a fresh in-memory chain, or replays a scripted
/// scenario against one and reports what happened.
#[derive(Parser, Debug)]
#[command(
    name = "xstro-node",
    about = "XSTRO staking vault operator tool",
    version,
    propagate_version = true
)]
pub struct XstroNodeCli {
    /// Log output format.
    #[arg(long, global = true, env = "XSTRO_LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the XSTRO binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a vault and print its address and initial state.
    Deploy(DeployArgs),
    /// Run a scenario file against a freshly deployed vault.
    Simulate(SimulateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `deploy` subcommand.
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Path to the vault configuration file (JSON).
    ///
    /// When omitted, the vault is deployed by `owner` with no genesis
    /// balances and the default policy.
    #[arg(long, short = 'c', env = "XSTRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run the chain on the system clock instead of the config's
    /// `start_time`.
    #[arg(long)]
    pub wall_clock: bool,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario file (JSON).
    #[arg(long, short = 's')]
    pub scenario: PathBuf,

    /// Append Prometheus metrics for the run after the report.
    #[arg(long)]
    pub metrics: bool,
}
