//! Errors returned by the staking vault.
//!
//! Every variant aborts the call it came from. The host restores the
//! contract state, ledger and event log, so a rejected call is invisible
//! apart from its error.

use thiserror::Error;
use xstro_protocol::{Address, HostError};

/// Errors that can occur during vault operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    /// The caller does not hold the owner role.
    #[error("unauthorized: {caller} is not the vault owner")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// A deposit carried no value.
    #[error("invalid amount: deposit value must be > 0")]
    InvalidAmount,

    /// The owner has not opened withdrawals.
    #[error("withdrawal is disabled")]
    WithdrawalDisabled,

    /// The caller has no principal staked.
    #[error("no stake: {caller} has nothing to withdraw")]
    NoStake {
        /// The caller without a stake.
        caller: Address,
    },

    /// The stake has not aged past the minimum withdrawal interval.
    #[error("withdrawal too early: allowed from {available_at}, now {now}")]
    WithdrawalTooEarly {
        /// Unix time at which the withdrawal becomes possible.
        available_at: u64,
        /// Unix time of the rejected call.
        now: u64,
    },

    /// There is no yield above the staked principal to sweep.
    #[error("no yield: vault balance does not exceed total staking")]
    NoYield,

    /// Staking counters would overflow.
    #[error("amount overflow: operation would exceed u128::MAX")]
    AmountOverflow,

    /// The host could not move the value (insufficient funds, recipient
    /// rejected it, call depth exhausted).
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] HostError),
}

impl VaultError {
    /// Stable short name of the error, used in scenario reports.
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::Unauthorized { .. } => "Unauthorized",
            VaultError::InvalidAmount => "InvalidAmount",
            VaultError::WithdrawalDisabled => "WithdrawalDisabled",
            VaultError::NoStake { .. } => "NoStake",
            VaultError::WithdrawalTooEarly { .. } => "WithdrawalTooEarly",
            VaultError::NoYield => "NoYield",
            VaultError::AmountOverflow => "AmountOverflow",
            VaultError::TransferFailed(_) => "TransferFailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_errors_convert_to_transfer_failed() {
        let err: VaultError = HostError::CallDepthExceeded { limit: 1 }.into();
        assert_eq!(err.kind(), "TransferFailed");
        assert!(err.to_string().contains("call depth"));
    }

    #[test]
    fn messages_name_the_caller() {
        let caller = Address::from_label("mallory");
        let err = VaultError::Unauthorized { caller };
        assert!(err.to_string().contains(&caller.to_hex()));
    }
}
