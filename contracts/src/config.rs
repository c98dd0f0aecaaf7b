//! Deployment configuration for a staking vault.
//!
//! A [`VaultConfig`] describes a fresh in-memory chain: who deploys the
//! vault (and therefore owns it), which accounts are funded at genesis, and
//! the policy to apply right after deployment.
//!
//! ```json
//! {
//!   "deployer": "owner",
//!   "start_time": 1704067200,
//!   "withdrawal_allowed": false,
//!   "min_withdrawal_interval": 0,
//!   "genesis": [
//!     { "account": "owner", "amount": "10" },
//!     { "account": "alice", "amount": "5.5" }
//!   ]
//! }
//! ```
//!
//! Accounts are written either as `0x`-prefixed hex addresses or as labels,
//! which map to [`Address::from_label`]. Amounts are decimal token strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xstro_protocol::config::{
    DEFAULT_MIN_WITHDRAWAL_INTERVAL, DEFAULT_WITHDRAWAL_ALLOWED, GENESIS_TIMESTAMP,
};
use xstro_protocol::ledger::{parse_units, UnitsError};
use xstro_protocol::{Address, LedgerError, NativeLedger};

use crate::error::VaultError;

/// Errors raised while turning a config into a running vault.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON could not be parsed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A genesis amount was not a valid decimal token amount.
    #[error("invalid amount for {account}: {source}")]
    Amount {
        /// The account the amount belongs to.
        account: String,
        /// Underlying parse error.
        #[source]
        source: UnitsError,
    },

    /// Genesis allocations overflowed a balance.
    #[error("genesis ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Applying the initial policy failed.
    #[error("initial policy rejected: {0}")]
    Vault(#[from] VaultError),

    /// The chain clock would start at the epoch. A stake's deposit time of
    /// zero means "no stake", so time zero is reserved.
    #[error("start_time must be after the unix epoch")]
    ZeroStartTime,
}

/// One funded account at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    /// Label or hex address.
    pub account: String,
    /// Decimal token amount, e.g. `"1.234567"`.
    pub amount: String,
}

/// Everything needed to stand up a vault on a fresh chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Deploying account, which becomes the owner.
    pub deployer: String,
    /// Unix time the chain clock starts at.
    #[serde(default = "default_start_time")]
    pub start_time: u64,
    /// Open withdrawals right after deployment.
    #[serde(default = "default_withdrawal_allowed")]
    pub withdrawal_allowed: bool,
    /// Minimum stake age in seconds applied after deployment.
    #[serde(default = "default_min_withdrawal_interval")]
    pub min_withdrawal_interval: u64,
    /// Funded accounts.
    #[serde(default)]
    pub genesis: Vec<GenesisAllocation>,
}

fn default_start_time() -> u64 {
    GENESIS_TIMESTAMP
}

fn default_withdrawal_allowed() -> bool {
    DEFAULT_WITHDRAWAL_ALLOWED
}

fn default_min_withdrawal_interval() -> u64 {
    DEFAULT_MIN_WITHDRAWAL_INTERVAL
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            deployer: "owner".to_string(),
            start_time: default_start_time(),
            withdrawal_allowed: default_withdrawal_allowed(),
            min_withdrawal_interval: default_min_withdrawal_interval(),
            genesis: Vec::new(),
        }
    }
}

impl VaultConfig {
    /// Parses and validates a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_time == 0 {
            return Err(ConfigError::ZeroStartTime);
        }
        Ok(())
    }

    /// The deployer's address.
    pub fn deployer_address(&self) -> Address {
        resolve_account(&self.deployer)
    }

    /// Builds the genesis ledger from [`genesis`](Self::genesis).
    pub fn genesis_ledger(&self) -> Result<NativeLedger, ConfigError> {
        let mut allocations = Vec::with_capacity(self.genesis.len());
        for entry in &self.genesis {
            let amount = parse_units(&entry.amount).map_err(|source| ConfigError::Amount {
                account: entry.account.clone(),
                source,
            })?;
            allocations.push((resolve_account(&entry.account), amount));
        }
        Ok(NativeLedger::with_genesis(allocations)?)
    }
}

/// Resolves a label or hex address to an [`Address`].
///
/// Anything that parses as a 20-byte hex address is taken literally;
/// everything else is treated as a label.
pub fn resolve_account(account: &str) -> Address {
    account
        .parse::<Address>()
        .unwrap_or_else(|_| Address::from_label(account))
}
