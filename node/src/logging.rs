//! # Structured Logging
//!
//! `tracing` subscriber setup for the `xstro-node` binary. Output goes to
//! stderr; stdout carries only command output (addresses, JSON reports,
//! metrics), so `simulate | jq` keeps working with logging on.
//!
//! `RUST_LOG` overrides the default filter when set.

use std::fmt;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format, selected with `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        })
    }
}

/// Builds the filter: `RUST_LOG` if set, otherwise `default_filter`.
pub fn env_filter(default_filter: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter {default_filter:?}")),
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(default_filter: &str, format: LogFormat) -> Result<()> {
    let filter = env_filter(default_filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    }
    .context("failed to install the log subscriber")?;

    tracing::debug!(%format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xstro_protocol::config::DEFAULT_LOG_FILTER;

    #[test]
    fn format_names_round_trip_through_clap() {
        assert_eq!(LogFormat::from_str("JSON", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("pretty", false), Ok(LogFormat::Pretty));
        assert!(LogFormat::from_str("yaml", true).is_err());
        assert_eq!(LogFormat::default().to_string(), "pretty");
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
