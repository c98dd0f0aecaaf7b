//! # Vault Client
//!
//! A typed front door to a vault deployed on an in-memory [`Runtime`].
//! Each method is one top-level call: the caller is given explicitly, the
//! runtime supplies the clock and value admission, and any error leaves the
//! chain untouched.

use serde::{Deserialize, Serialize};
use xstro_protocol::ledger::format_units;
use xstro_protocol::runtime::Receipt;
use xstro_protocol::{Address, Clock, EventRecord, Host, NativeLedger, Runtime};

use crate::config::{ConfigError, VaultConfig};
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::vault::StakingVault;

/// Point-in-time view of a vault, for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    /// Vault contract address.
    pub address: Address,
    /// Owner address.
    pub owner: Address,
    /// Whether withdrawals are open.
    pub withdrawal_allowed: bool,
    /// Minimum stake age in seconds.
    pub min_withdrawal_interval: u64,
    /// Vault balance as a decimal token string.
    pub balance: String,
    /// Total principal as a decimal token string.
    pub total_staking: String,
    /// Yield as a decimal token string.
    pub total_yield: String,
    /// Live stakes, sorted by account.
    pub stakers: Vec<StakerView>,
}

/// One live stake in a [`VaultSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerView {
    /// Depositor.
    pub account: Address,
    /// Principal as a decimal token string.
    pub amount: String,
    /// Unix time of the last deposit.
    pub deposited_at: u64,
}

/// A staking vault and the chain it runs on.
pub struct VaultClient {
    runtime: Runtime<StakingVault>,
}

impl VaultClient {
    /// Deploys a vault owned by `owner` on a chain with the given ledger.
    pub fn deploy<K: Clock + 'static>(ledger: NativeLedger, clock: K, owner: Address) -> Self {
        let runtime = Runtime::deploy(ledger, clock, owner, |ctx| StakingVault::new(ctx.caller));
        Self { runtime }
    }

    /// Deploys from a [`VaultConfig`] and applies its initial policy as
    /// owner calls, so the policy events appear in the log.
    ///
    /// The config is validated first; see [`VaultConfig::validate`].
    pub fn from_config<K: Clock + 'static>(
        config: &VaultConfig,
        clock: K,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let ledger = config.genesis_ledger()?;
        let owner = config.deployer_address();
        let mut client = Self::deploy(ledger, clock, owner);

        if config.withdrawal_allowed {
            client.set_withdrawal_allowed(owner, true)?;
        }
        if config.min_withdrawal_interval != 0 {
            client.set_min_withdrawal_interval(owner, config.min_withdrawal_interval)?;
        }
        Ok(client)
    }

    /// Vault contract address.
    pub fn address(&self) -> Address {
        self.runtime.address()
    }

    /// Stakes `amount` from `caller`. Returns the caller's cumulative stake.
    pub fn deposit(&mut self, caller: Address, amount: u128) -> Result<u128, VaultError> {
        self.runtime.call(caller, amount, StakingVault::deposit)
    }

    /// Withdraws `caller`'s principal. Returns the amount paid.
    pub fn withdrawal(&mut self, caller: Address) -> Result<u128, VaultError> {
        self.runtime.call(caller, 0, StakingVault::withdrawal)
    }

    /// Sweeps all yield to `caller`, who must be the owner.
    pub fn withdrawal_yield(&mut self, caller: Address) -> Result<u128, VaultError> {
        self.runtime.call(caller, 0, StakingVault::withdrawal_yield)
    }

    /// Opens or closes withdrawals.
    pub fn set_withdrawal_allowed(
        &mut self,
        caller: Address,
        allowed: bool,
    ) -> Result<(), VaultError> {
        self.runtime.call(caller, 0, |vault: &mut StakingVault, host, ctx| {
            vault.set_withdrawal_allowed(host, ctx, allowed)
        })
    }

    /// Sets the minimum stake age in seconds.
    pub fn set_min_withdrawal_interval(
        &mut self,
        caller: Address,
        seconds: u64,
    ) -> Result<(), VaultError> {
        self.runtime.call(caller, 0, |vault: &mut StakingVault, host, ctx| {
            vault.set_min_withdrawal_interval(host, ctx, seconds)
        })
    }

    /// Sends value to the vault outside the deposit path. The vault's
    /// accounting is untouched, so the whole amount becomes yield.
    pub fn inject_yield(&mut self, from: Address, amount: u128) -> Result<(), VaultError> {
        let vault = self.address();
        Ok(self.runtime.send(from, vault, amount)?)
    }

    /// Plain value transfer between two accounts.
    pub fn send(&mut self, from: Address, to: Address, amount: u128) -> Result<(), VaultError> {
        Ok(self.runtime.send(from, to, amount)?)
    }

    /// `(balance, yield)`.
    pub fn total_yield(&self) -> (u128, u128) {
        self.runtime.query(|vault, host| vault.total_yield(host))
    }

    /// `(amount, deposited_at)` for `account`.
    pub fn user_stake(&self, account: &Address) -> (u128, u64) {
        self.runtime.contract().user_stake(account)
    }

    /// Sum of all live principal.
    pub fn total_staking(&self) -> u128 {
        self.runtime.contract().total_staking()
    }

    /// Whether withdrawals are open.
    pub fn is_withdrawal_allowed(&self) -> bool {
        self.runtime.contract().is_withdrawal_allowed()
    }

    /// Minimum stake age in seconds.
    pub fn min_withdrawal_interval(&self) -> u64 {
        self.runtime.contract().min_withdrawal_interval()
    }

    /// The owner address.
    pub fn owner(&self) -> Address {
        self.runtime.contract().owner()
    }

    /// Native balance of any account.
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.runtime.host().balance_of(account)
    }

    /// Committed vault events, oldest first.
    pub fn events(&self) -> Vec<VaultEvent> {
        self.runtime
            .host()
            .events()
            .iter()
            .map(|record| record.event.clone())
            .collect()
    }

    /// Committed vault events with emission metadata.
    pub fn event_records(&self) -> &[EventRecord<VaultEvent>] {
        self.runtime.host().events()
    }

    /// Installs code to run whenever `account` receives value. The hook is
    /// given the vault and the host and may call back into the vault.
    pub fn set_receive_hook<H>(&mut self, account: Address, hook: H)
    where
        H: FnMut(&mut Host<StakingVault>, &mut StakingVault, &Receipt) -> Result<(), String> + 'static,
    {
        self.runtime.host_mut().set_hook(account, hook);
    }

    /// Removes the receive hook for `account`.
    pub fn clear_receive_hook(&mut self, account: &Address) {
        self.runtime.host_mut().clear_hook(account);
    }

    /// Current vault state with amounts formatted for people.
    pub fn snapshot(&self) -> VaultSnapshot {
        let vault = self.runtime.contract();
        let (balance, total_yield) = self.total_yield();
        VaultSnapshot {
            address: self.address(),
            owner: vault.owner(),
            withdrawal_allowed: vault.is_withdrawal_allowed(),
            min_withdrawal_interval: vault.min_withdrawal_interval(),
            balance: format_units(balance),
            total_staking: format_units(vault.total_staking()),
            total_yield: format_units(total_yield),
            stakers: vault
                .stakes()
                .records()
                .into_iter()
                .map(|(account, record)| StakerView {
                    account,
                    amount: format_units(record.amount),
                    deposited_at: record.deposited_at,
                })
                .collect(),
        }
    }

    /// The underlying runtime.
    pub fn runtime(&self) -> &Runtime<StakingVault> {
        &self.runtime
    }
}
