//! Error types for the host runtime.

use thiserror::Error;

use crate::address::Address;
use crate::ledger::LedgerError;

/// Failures raised by the host rather than by contract logic.
///
/// Contract error types implement `From<HostError>` so that a failed value
/// admission or outgoing transfer propagates with `?`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The native ledger refused the movement (insufficient funds, overflow).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Nested calls went deeper than [`crate::config::MAX_CALL_DEPTH`].
    #[error("call depth limit of {limit} exceeded")]
    CallDepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// The recipient's receive hook refused the incoming value.
    #[error("recipient {to} rejected {amount}: {reason}")]
    RecipientRejected {
        /// The recipient account.
        to: Address,
        /// The amount that was being delivered.
        amount: u128,
        /// Reason given by the hook.
        reason: String,
    },

    /// The contract's own account tried to originate a call or send value.
    /// Value leaves a contract only through its own code.
    #[error("contract account {contract} cannot originate calls or transfers")]
    ContractOrigin {
        /// The hosted contract's address.
        contract: Address,
    },

    /// A receive hook tried to call the contract as someone else.
    #[error("hook of {account} cannot call as {caller}")]
    ForgedCaller {
        /// The caller the hook asked for.
        caller: Address,
        /// The account whose hook is running.
        account: Address,
    },
}
