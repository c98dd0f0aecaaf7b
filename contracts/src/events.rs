//! Events emitted by the staking vault.
//!
//! Events are write-only from the vault's point of view: they are appended
//! to the host log and never read back to make a decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use xstro_protocol::Address;

/// Observable notifications, one per successful state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum VaultEvent {
    /// A deposit was accepted.
    Deposited {
        /// Depositor.
        account: Address,
        /// Value attached to this deposit.
        amount: u128,
        /// The depositor's cumulative stake after this deposit.
        total: u128,
    },
    /// A depositor withdrew their principal.
    Withdrawn {
        /// Depositor.
        account: Address,
        /// Principal paid out.
        principal: u128,
        /// Yield left in the vault, measured after the ledger update and
        /// before the payout left the vault's balance.
        remaining_yield: u128,
    },
    /// The owner opened withdrawals.
    WithdrawalEnabled,
    /// The owner closed withdrawals.
    WithdrawalDisabled,
    /// The owner changed the minimum stake age.
    MinWithdrawalIntervalChanged {
        /// New interval in seconds.
        seconds: u64,
    },
    /// The owner swept the accumulated yield.
    YieldWithdrawn {
        /// Recipient (the owner).
        account: Address,
        /// Amount swept.
        amount: u128,
    },
}

impl fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultEvent::Deposited {
                account,
                amount,
                total,
            } => write!(f, "Deposited({}, {}, {})", account, amount, total),
            VaultEvent::Withdrawn {
                account,
                principal,
                remaining_yield,
            } => write!(f, "Withdrawn({}, {}, {})", account, principal, remaining_yield),
            VaultEvent::WithdrawalEnabled => write!(f, "WithdrawalEnabled()"),
            VaultEvent::WithdrawalDisabled => write!(f, "WithdrawalDisabled()"),
            VaultEvent::MinWithdrawalIntervalChanged { seconds } => {
                write!(f, "MinWithdrawalIntervalChanged({})", seconds)
            }
            VaultEvent::YieldWithdrawn { account, amount } => {
                write!(f, "YieldWithdrawn({}, {})", account, amount)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_signature_style() {
        assert_eq!(VaultEvent::WithdrawalEnabled.to_string(), "WithdrawalEnabled()");
        assert_eq!(
            VaultEvent::MinWithdrawalIntervalChanged { seconds: 1234 }.to_string(),
            "MinWithdrawalIntervalChanged(1234)"
        );
    }

    #[test]
    fn serializes_with_event_tag() {
        let json = serde_json::to_value(VaultEvent::MinWithdrawalIntervalChanged { seconds: 5 })
            .unwrap();
        assert_eq!(json["event"], "MinWithdrawalIntervalChanged");
        assert_eq!(json["seconds"], 5);
    }
}
