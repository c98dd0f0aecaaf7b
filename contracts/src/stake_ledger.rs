//! # Stake Ledger
//!
//! Per-depositor principal and deposit time. A depositor is either absent
//! (`Empty`) or has a record with a non-zero amount (`Staked`); there is no
//! zero-amount record, so "never deposited" and "withdrew everything" look
//! the same from outside and neither is confused with a live stake.
//!
//! ```text
//!            deposit                 deposit (top-up)
//!   Empty ────────────► Staked ◄────────────────────┐
//!     ▲                   │ └───────────────────────┘
//!     └───── withdrawal ──┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use xstro_protocol::Address;

use crate::error::VaultError;

/// A live stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Principal in base units. Always > 0.
    pub amount: u128,
    /// Unix time of the most recent deposit or top-up. Non-zero as long as
    /// the chain clock is past the epoch, which [`VaultConfig`] enforces.
    ///
    /// [`VaultConfig`]: crate::config::VaultConfig
    pub deposited_at: u64,
}

/// Stake records keyed by depositor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StakeLedger {
    records: HashMap<Address, StakeRecord>,
}

impl StakeLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to `account`'s stake, creating it if absent, and sets
    /// `deposited_at` to `now`. Returns the cumulative stake.
    ///
    /// Callers validate `amount > 0` first.
    ///
    /// # Errors
    ///
    /// [`VaultError::AmountOverflow`] if the stake would exceed `u128::MAX`.
    /// Nothing is modified in that case.
    pub fn record_deposit(
        &mut self,
        account: &Address,
        amount: u128,
        now: u64,
    ) -> Result<u128, VaultError> {
        let current = self.records.get(account).map(|r| r.amount).unwrap_or(0);
        let total = current
            .checked_add(amount)
            .ok_or(VaultError::AmountOverflow)?;
        self.records.insert(
            *account,
            StakeRecord {
                amount: total,
                deposited_at: now,
            },
        );
        Ok(total)
    }

    /// Removes `account`'s record, returning it.
    pub fn clear(&mut self, account: &Address) -> Option<StakeRecord> {
        self.records.remove(account)
    }

    /// The live record for `account`, if any.
    pub fn record(&self, account: &Address) -> Option<&StakeRecord> {
        self.records.get(account)
    }

    /// `(amount, deposited_at)`, or `(0, 0)` when there is no stake.
    pub fn get(&self, account: &Address) -> (u128, u64) {
        self.records
            .get(account)
            .map(|r| (r.amount, r.deposited_at))
            .unwrap_or((0, 0))
    }

    /// Number of accounts with a live stake.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when nobody is staked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full-scan sum of all principal. The vault keeps its own running
    /// total; this exists to check that total against.
    pub fn principal_sum(&self) -> u128 {
        self.records
            .values()
            .fold(0u128, |acc, r| acc.saturating_add(r.amount))
    }

    /// All live records sorted by account.
    pub fn records(&self) -> Vec<(Address, StakeRecord)> {
        let mut out: Vec<(Address, StakeRecord)> =
            self.records.iter().map(|(a, r)| (*a, *r)).collect();
        out.sort_by_key(|(a, _)| *a);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    #[test]
    fn absent_account_reads_as_zero() {
        let ledger = StakeLedger::new();
        assert_eq!(ledger.get(&alice()), (0, 0));
        assert!(ledger.record(&alice()).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn first_deposit_creates_record() {
        let mut ledger = StakeLedger::new();
        let total = ledger.record_deposit(&alice(), 500, 1_000).unwrap();
        assert_eq!(total, 500);
        assert_eq!(ledger.get(&alice()), (500, 1_000));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn top_up_accumulates_and_refreshes_timestamp() {
        let mut ledger = StakeLedger::new();
        ledger.record_deposit(&alice(), 500, 1_000).unwrap();
        let total = ledger.record_deposit(&alice(), 250, 2_000).unwrap();
        assert_eq!(total, 750);
        assert_eq!(ledger.get(&alice()), (750, 2_000));
    }

    #[test]
    fn overflow_leaves_record_untouched() {
        let mut ledger = StakeLedger::new();
        ledger.record_deposit(&alice(), u128::MAX, 1).unwrap();
        let result = ledger.record_deposit(&alice(), 1, 2);
        assert_eq!(result, Err(VaultError::AmountOverflow));
        assert_eq!(ledger.get(&alice()), (u128::MAX, 1));
    }

    #[test]
    fn clear_removes_record() {
        let mut ledger = StakeLedger::new();
        ledger.record_deposit(&alice(), 500, 1_000).unwrap();
        let removed = ledger.clear(&alice()).unwrap();
        assert_eq!(removed.amount, 500);
        assert_eq!(ledger.get(&alice()), (0, 0));
        assert!(ledger.clear(&alice()).is_none());
    }

    #[test]
    fn principal_sum_covers_all_records() {
        let mut ledger = StakeLedger::new();
        ledger.record_deposit(&alice(), 500, 1).unwrap();
        ledger
            .record_deposit(&Address::from_label("bob"), 300, 2)
            .unwrap();
        assert_eq!(ledger.principal_sum(), 800);
        assert_eq!(ledger.records().len(), 2);
    }
}
