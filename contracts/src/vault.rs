//! # Staking Vault Engine
//!
//! Depositors stake the native asset and can later take back exactly their
//! principal. Anything the vault holds beyond the sum of all principal is
//! yield, and only the owner can sweep it.
//!
//! ## Accounting
//!
//! ```text
//! balance        — the vault's native balance, read from the host ledger
//! total_staking  — running sum of every live stake, kept here
//! yield          — balance - total_staking, never negative
//! ```
//!
//! `total_staking` is maintained incrementally on every deposit and
//! withdrawal and is never recomputed from the stake ledger.
//!
//! ## Call Ordering
//!
//! Money-moving operations follow checks, then effects, then interactions:
//! every precondition is validated, the stake ledger and counters are
//! updated, and only then is value sent out. The recipient may call back in
//! during the transfer; by then its stake is gone and the yield is spent, so
//! a nested `withdrawal` fails with `NoStake` and a nested sweep with
//! `NoYield`. If the transfer fails, the host reverts the whole call.

use serde::{Deserialize, Serialize};
use xstro_protocol::{Address, CallContext, Contract, Host};

use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::policy::VaultPolicy;
use crate::stake_ledger::StakeLedger;

/// State of one deployed staking vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingVault {
    policy: VaultPolicy,
    stakes: StakeLedger,
    total_staking: u128,
}

impl Contract for StakingVault {
    type Event = VaultEvent;
}

impl StakingVault {
    /// A new vault owned by `owner`, with withdrawals closed and no stakes.
    pub fn new(owner: Address) -> Self {
        Self {
            policy: VaultPolicy::new(owner),
            stakes: StakeLedger::new(),
            total_staking: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Depositor operations
    // -----------------------------------------------------------------------

    /// Stakes the value attached to the call. Returns the caller's
    /// cumulative stake.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidAmount`] when no value is attached.
    /// [`VaultError::AmountOverflow`] if a counter would overflow.
    pub fn deposit(
        &mut self,
        host: &mut Host<Self>,
        ctx: &CallContext,
    ) -> Result<u128, VaultError> {
        let amount = ctx.value;
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }

        let new_total_staking = self
            .total_staking
            .checked_add(amount)
            .ok_or(VaultError::AmountOverflow)?;
        let account_total = self
            .stakes
            .record_deposit(&ctx.caller, amount, ctx.timestamp)?;
        self.total_staking = new_total_staking;

        host.emit(VaultEvent::Deposited {
            account: ctx.caller,
            amount,
            total: account_total,
        });
        tracing::info!(
            account = %ctx.caller,
            amount,
            account_total,
            total_staking = self.total_staking,
            "deposit accepted"
        );

        debug_assert!(host.balance() >= self.total_staking);
        Ok(account_total)
    }

    /// Pays the caller's full principal back and clears their stake.
    /// Returns the principal paid.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// [`VaultError::WithdrawalDisabled`], [`VaultError::NoStake`],
    /// [`VaultError::WithdrawalTooEarly`]. A failed payout surfaces as
    /// [`VaultError::TransferFailed`] and reverts the call.
    pub fn withdrawal(
        &mut self,
        host: &mut Host<Self>,
        ctx: &CallContext,
    ) -> Result<u128, VaultError> {
        let caller = ctx.caller;

        // Checks.
        if !self.policy.is_withdrawal_allowed() {
            return Err(VaultError::WithdrawalDisabled);
        }
        let record = *self
            .stakes
            .record(&caller)
            .ok_or(VaultError::NoStake { caller })?;
        let available_at = self.policy.withdrawable_at(record.deposited_at);
        if ctx.timestamp < available_at {
            return Err(VaultError::WithdrawalTooEarly {
                available_at,
                now: ctx.timestamp,
            });
        }

        // Effects.
        let principal = record.amount;
        let remaining_staking = self
            .total_staking
            .checked_sub(principal)
            .ok_or(VaultError::AmountOverflow)?;
        self.stakes.clear(&caller);
        self.total_staking = remaining_staking;

        // The yield figure is fixed here so a reentrant call cannot move it.
        let remaining_yield = host
            .balance()
            .saturating_sub(principal)
            .saturating_sub(self.total_staking);

        // Interactions.
        host.transfer(self, caller, principal)?;

        host.emit(VaultEvent::Withdrawn {
            account: caller,
            principal,
            remaining_yield,
        });
        tracing::info!(
            account = %caller,
            principal,
            remaining_yield,
            total_staking = self.total_staking,
            "principal withdrawn"
        );

        debug_assert!(host.balance() >= self.total_staking);
        Ok(principal)
    }

    // -----------------------------------------------------------------------
    // Owner operations
    // -----------------------------------------------------------------------

    /// Sends all yield to the owner. Returns the amount swept.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] for non-owners, [`VaultError::NoYield`]
    /// when the balance does not exceed total staking, and
    /// [`VaultError::TransferFailed`] if the payout is refused.
    pub fn withdrawal_yield(
        &mut self,
        host: &mut Host<Self>,
        ctx: &CallContext,
    ) -> Result<u128, VaultError> {
        self.policy.ensure_owner(&ctx.caller)?;

        let (_, amount) = self.total_yield(host);
        if amount == 0 {
            return Err(VaultError::NoYield);
        }

        host.transfer(self, ctx.caller, amount)?;

        host.emit(VaultEvent::YieldWithdrawn {
            account: ctx.caller,
            amount,
        });
        tracing::info!(owner = %ctx.caller, amount, "yield swept");

        debug_assert!(host.balance() >= self.total_staking);
        Ok(amount)
    }

    /// Opens (`true`) or closes (`false`) withdrawals. Owner only.
    pub fn set_withdrawal_allowed(
        &mut self,
        host: &mut Host<Self>,
        ctx: &CallContext,
        allowed: bool,
    ) -> Result<(), VaultError> {
        let event = self.policy.set_withdrawal_allowed(&ctx.caller, allowed)?;
        host.emit(event);
        tracing::info!(allowed, "withdrawal toggle set");
        Ok(())
    }

    /// Sets the minimum stake age in seconds. Owner only.
    pub fn set_min_withdrawal_interval(
        &mut self,
        host: &mut Host<Self>,
        ctx: &CallContext,
        seconds: u64,
    ) -> Result<(), VaultError> {
        let event = self.policy.set_min_withdrawal_interval(&ctx.caller, seconds)?;
        host.emit(event);
        tracing::info!(seconds, "minimum withdrawal interval set");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// `(balance, yield)` where `yield = balance - total_staking`.
    pub fn total_yield(&self, host: &Host<Self>) -> (u128, u128) {
        let balance = host.balance();
        (balance, balance.saturating_sub(self.total_staking))
    }

    /// `(amount, deposited_at)` for `account`, `(0, 0)` if not staked.
    pub fn user_stake(&self, account: &Address) -> (u128, u64) {
        self.stakes.get(account)
    }

    /// Sum of all live principal.
    pub fn total_staking(&self) -> u128 {
        self.total_staking
    }

    /// Whether withdrawals are open.
    pub fn is_withdrawal_allowed(&self) -> bool {
        self.policy.is_withdrawal_allowed()
    }

    /// Minimum stake age in seconds.
    pub fn min_withdrawal_interval(&self) -> u64 {
        self.policy.min_withdrawal_interval()
    }

    /// The owner address.
    pub fn owner(&self) -> Address {
        self.policy.owner()
    }

    /// Read access to the policy.
    pub fn policy(&self) -> &VaultPolicy {
        &self.policy
    }

    /// Read access to the stake ledger.
    pub fn stakes(&self) -> &StakeLedger {
        &self.stakes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use xstro_protocol::{ManualClock, NativeLedger, Runtime};

    const UNIT: u128 = 1_000_000_000_000_000_000;

    fn owner() -> Address {
        Address::from_label("owner")
    }

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn runtime() -> Runtime<StakingVault> {
        let ledger =
            NativeLedger::with_genesis([(owner(), 100 * UNIT), (alice(), 100 * UNIT)]).unwrap();
        Runtime::deploy(ledger, ManualClock::new(1_000), owner(), |ctx| {
            StakingVault::new(ctx.caller)
        })
    }

    #[test]
    fn deployer_becomes_owner() {
        let rt = runtime();
        assert_eq!(rt.contract().owner(), owner());
        assert!(!rt.contract().is_withdrawal_allowed());
        assert_eq!(rt.contract().total_staking(), 0);
    }

    #[test]
    fn deposit_records_stake() {
        let mut rt = runtime();
        let total = rt.call(alice(), 5 * UNIT, StakingVault::deposit).unwrap();
        assert_eq!(total, 5 * UNIT);
        assert_eq!(rt.contract().user_stake(&alice()), (5 * UNIT, 1_000));
        assert_eq!(rt.contract().total_staking(), 5 * UNIT);
        assert_eq!(rt.host().balance(), 5 * UNIT);
    }

    #[test]
    fn zero_deposit_rejected() {
        let mut rt = runtime();
        let result = rt.call(alice(), 0, StakingVault::deposit);
        assert_eq!(result, Err(VaultError::InvalidAmount));
        assert!(rt.contract().stakes().is_empty());
        assert!(rt.host().events().is_empty());
    }

    #[test]
    fn withdrawal_checks_run_in_order() {
        let mut rt = runtime();
        // Disabled beats NoStake.
        assert_eq!(
            rt.call(alice(), 0, StakingVault::withdrawal),
            Err(VaultError::WithdrawalDisabled)
        );
        rt.call(owner(), 0, |v: &mut StakingVault, h, c| {
            v.set_withdrawal_allowed(h, c, true)
        })
        .unwrap();
        assert_eq!(
            rt.call(alice(), 0, StakingVault::withdrawal),
            Err(VaultError::NoStake { caller: alice() })
        );
    }

    #[test]
    fn withdrawal_pays_principal_only() {
        let mut rt = runtime();
        rt.call(alice(), 2 * UNIT, StakingVault::deposit).unwrap();
        rt.send(owner(), rt.address(), UNIT).unwrap();
        rt.call(owner(), 0, |v: &mut StakingVault, h, c| {
            v.set_withdrawal_allowed(h, c, true)
        })
        .unwrap();

        let paid = rt.call(alice(), 0, StakingVault::withdrawal).unwrap();
        assert_eq!(paid, 2 * UNIT);
        assert_eq!(rt.host().balance(), UNIT);
        assert_eq!(rt.contract().total_staking(), 0);
        assert_eq!(rt.host().balance_of(&alice()), 100 * UNIT);

        let last = rt.host().events().last().unwrap();
        assert_eq!(
            last.event,
            VaultEvent::Withdrawn {
                account: alice(),
                principal: 2 * UNIT,
                remaining_yield: UNIT,
            }
        );
    }

    #[test]
    fn yield_sweep_requires_owner_and_yield() {
        let mut rt = runtime();
        rt.call(alice(), UNIT, StakingVault::deposit).unwrap();
        assert_eq!(
            rt.call(alice(), 0, StakingVault::withdrawal_yield),
            Err(VaultError::Unauthorized { caller: alice() })
        );
        assert_eq!(
            rt.call(owner(), 0, StakingVault::withdrawal_yield),
            Err(VaultError::NoYield)
        );

        rt.send(alice(), rt.address(), UNIT / 2).unwrap();
        let swept = rt.call(owner(), 0, StakingVault::withdrawal_yield).unwrap();
        assert_eq!(swept, UNIT / 2);
        assert_eq!(rt.query(|v, h| v.total_yield(h)), (UNIT, 0));
    }
}
