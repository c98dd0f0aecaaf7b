//! # Native Balance Ledger
//!
//! The [`NativeLedger`] is the single source of truth for who holds how much
//! of the native asset, contracts included. A contract never stores its own
//! balance: it asks the ledger.
//!
//! Credits and debits are checked. You can never spend more than you have,
//! and no balance can wrap past `u128::MAX`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Attempted to debit more than the available balance.
    #[error("insufficient balance for {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: Address,
        /// The current balance.
        available: u128,
        /// The amount that was requested.
        requested: u128,
    },

    /// Arithmetic overflow during a credit.
    #[error("balance overflow for {account}: current {current}, credit {credit}")]
    Overflow {
        /// The account being credited.
        account: Address,
        /// The balance before the failed credit.
        current: u128,
        /// The amount that caused the overflow.
        credit: u128,
    },
}

// ---------------------------------------------------------------------------
// NativeLedger
// ---------------------------------------------------------------------------

/// Per-address native balances.
///
/// `Clone` is deliberate: the host runtime snapshots the ledger at the start
/// of every call frame and restores the snapshot if the frame fails.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NativeLedger {
    balances: HashMap<Address, u128>,
}

impl NativeLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger seeded with genesis balances.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the same account appears more
    /// than once and the sum overflows.
    pub fn with_genesis<I>(allocations: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (Address, u128)>,
    {
        let mut ledger = Self::new();
        for (account, amount) in allocations {
            ledger.credit(&account, amount)?;
        }
        Ok(ledger)
    }

    /// Returns the balance of `account`, zero if it has never been credited.
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Adds `amount` to `account`, returning the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the balance would exceed `u128::MAX`.
    pub fn credit(&mut self, account: &Address, amount: u128) -> Result<u128, LedgerError> {
        let balance = self.balances.entry(*account).or_insert(0);
        let new_balance = balance.checked_add(amount).ok_or(LedgerError::Overflow {
            account: *account,
            current: *balance,
            credit: amount,
        })?;
        *balance = new_balance;
        Ok(new_balance)
    }

    /// Subtracts `amount` from `account`, returning the new balance.
    ///
    /// Accounts that reach zero are dropped from the map so that
    /// [`account_count`](Self::account_count) reflects funded accounts only.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if the debit exceeds the
    /// current balance.
    pub fn debit(&mut self, account: &Address, amount: u128) -> Result<u128, LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *account,
                available,
                requested: amount,
            });
        }

        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, remaining);
        }
        Ok(remaining)
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// The debit is checked before anything is mutated, and a failed credit
    /// restores the debit, so a failed transfer leaves both balances as they
    /// were. A zero-amount transfer always succeeds.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 || from == to {
            // Still enforce that a self-transfer is funded.
            if self.balance_of(from) < amount {
                return Err(LedgerError::InsufficientBalance {
                    account: *from,
                    available: self.balance_of(from),
                    requested: amount,
                });
            }
            return Ok(());
        }

        self.debit(from, amount)?;
        if let Err(e) = self.credit(to, amount) {
            // Restoring a balance we just debited cannot overflow.
            let _ = self.credit(from, amount);
            return Err(e);
        }
        Ok(())
    }

    /// Sum of every balance. Used by tests and reports to check that value
    /// is neither created nor destroyed by contract calls.
    pub fn total_supply(&self) -> u128 {
        self.balances.values().fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// Number of accounts holding a non-zero balance.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// Returns all non-zero balances as `(address, amount)` pairs, sorted by
    /// address so output is stable across runs.
    pub fn all_balances(&self) -> Vec<(Address, u128)> {
        let mut out: Vec<(Address, u128)> = self.balances.iter().map(|(a, b)| (*a, *b)).collect();
        out.sort_by_key(|(a, _)| *a);
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
