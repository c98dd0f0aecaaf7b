//! # Protocol Configuration & Constants
//!
//! Every magic number the host runtime and the vault rely on lives here.
//! Anything tunable per deployment belongs in a deployment config instead
//! (see `xstro_contracts::config::VaultConfig`).

// ---------------------------------------------------------------------------
// Native Asset
// ---------------------------------------------------------------------------

/// Ticker of the native asset, used for display only.
pub const NATIVE_SYMBOL: &str = "XST";

/// Decimal places of the native asset. Amounts are always handled as `u128`
/// base units; this value is only consulted when converting to or from
/// human-readable strings.
pub const NATIVE_DECIMALS: u32 = 18;

/// Number of base units in one whole native token (`10^NATIVE_DECIMALS`).
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Maximum nesting of call frames. A receive hook that keeps re-entering
/// the contract is cut off here instead of recursing without bound.
pub const MAX_CALL_DEPTH: usize = 64;

/// Unix timestamp the simulated chain starts at when no clock is supplied.
/// 2024-01-01T00:00:00Z.
pub const GENESIS_TIMESTAMP: u64 = 1_704_067_200;

// ---------------------------------------------------------------------------
// Vault Defaults
// ---------------------------------------------------------------------------

/// Default minimum stake age before a withdrawal is allowed, in seconds.
pub const DEFAULT_MIN_WITHDRAWAL_INTERVAL: u64 = 0;

/// Withdrawals are closed until the owner opens them.
pub const DEFAULT_WITHDRAWAL_ALLOWED: bool = false;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Default `tracing` filter directive when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "xstro_node=info,xstro_contracts=info,xstro_protocol=warn";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_per_token_matches_decimals() {
        assert_eq!(UNITS_PER_TOKEN, 10u128.pow(NATIVE_DECIMALS));
    }

    #[test]
    fn vault_defaults_match_construction_rules() {
        assert_eq!(DEFAULT_MIN_WITHDRAWAL_INTERVAL, 0);
        assert!(!DEFAULT_WITHDRAWAL_ALLOWED);
    }

    #[test]
    fn call_depth_allows_some_nesting() {
        assert!(MAX_CALL_DEPTH > 1);
    }
}
