//! # XSTRO Staking Vault Contract
//!
//! A vault that holds the native asset for depositors and keeps their
//! principal apart from any value that arrives some other way:
//!
//! - **Stake Ledger** ([`stake_ledger`]) — who staked how much, and when.
//! - **Vault Policy** ([`policy`]) — the owner and the withdrawal switches.
//! - **Vault Engine** ([`vault`]) — deposit, withdrawal, yield query and
//!   sweep, policy changes.
//! - **Client** ([`client`]) — typed calls against a vault on an in-memory
//!   chain, plus deployment from a [`config::VaultConfig`].
//!
//! ## Design Principles
//!
//! 1. Every counter uses checked arithmetic. Overflow is an error, not a wrap.
//! 2. Record presence is explicit: a depositor either has a record or has
//!    none. Zero is never a sentinel.
//! 3. Checks, then effects, then interactions. Value leaves the vault last.
//! 4. A failed call leaves no trace; the host restores state on any error.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod policy;
pub mod stake_ledger;
pub mod vault;

pub use client::{StakerView, VaultClient, VaultSnapshot};
pub use config::{ConfigError, GenesisAllocation, VaultConfig};
pub use error::VaultError;
pub use events::VaultEvent;
pub use policy::VaultPolicy;
pub use stake_ledger::{StakeLedger, StakeRecord};
pub use vault::StakingVault;
