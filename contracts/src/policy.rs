//! # Vault Policy
//!
//! The owner role and the two switches only the owner may flip. The owner
//! is fixed at construction; there is no transfer of ownership.

use serde::{Deserialize, Serialize};
use xstro_protocol::config::{DEFAULT_MIN_WITHDRAWAL_INTERVAL, DEFAULT_WITHDRAWAL_ALLOWED};
use xstro_protocol::Address;

use crate::error::VaultError;
use crate::events::VaultEvent;

/// Owner identity plus operator-tunable withdrawal rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPolicy {
    owner: Address,
    withdrawal_allowed: bool,
    min_withdrawal_interval: u64,
}

impl VaultPolicy {
    /// Policy for a freshly deployed vault: withdrawals closed, no minimum
    /// interval.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            withdrawal_allowed: DEFAULT_WITHDRAWAL_ALLOWED,
            min_withdrawal_interval: DEFAULT_MIN_WITHDRAWAL_INTERVAL,
        }
    }

    /// The owner address.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Whether withdrawals are open.
    pub fn is_withdrawal_allowed(&self) -> bool {
        self.withdrawal_allowed
    }

    /// Minimum stake age in seconds before a withdrawal is accepted.
    pub fn min_withdrawal_interval(&self) -> u64 {
        self.min_withdrawal_interval
    }

    /// Fails with [`VaultError::Unauthorized`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), VaultError> {
        if *caller != self.owner {
            return Err(VaultError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Opens or closes withdrawals and returns the event to emit.
    ///
    /// The event reflects the requested value, not the transition: setting
    /// `true` twice yields `WithdrawalEnabled` twice.
    pub fn set_withdrawal_allowed(
        &mut self,
        caller: &Address,
        allowed: bool,
    ) -> Result<VaultEvent, VaultError> {
        self.ensure_owner(caller)?;
        self.withdrawal_allowed = allowed;
        Ok(if allowed {
            VaultEvent::WithdrawalEnabled
        } else {
            VaultEvent::WithdrawalDisabled
        })
    }

    /// Sets the minimum stake age and returns the event to emit.
    pub fn set_min_withdrawal_interval(
        &mut self,
        caller: &Address,
        seconds: u64,
    ) -> Result<VaultEvent, VaultError> {
        self.ensure_owner(caller)?;
        self.min_withdrawal_interval = seconds;
        Ok(VaultEvent::MinWithdrawalIntervalChanged { seconds })
    }

    /// Unix time at which a stake deposited at `deposited_at` becomes
    /// withdrawable.
    pub fn withdrawable_at(&self, deposited_at: u64) -> u64 {
        deposited_at.saturating_add(self.min_withdrawal_interval)
    }
}
