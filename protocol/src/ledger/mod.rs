//! # Ledger Module — Native Asset Accounting
//!
//! ```text
//! balance.rs  — Per-address native balances with checked credit/debit
//! units.rs    — Decimal string <-> base unit conversion
//! ```
//!
//! All amounts are `u128` in base units. No floating point touches a
//! balance; `units::to_display_f64` exists for metrics and nothing else.

pub mod balance;
pub mod units;

pub use balance::{LedgerError, NativeLedger};
pub use units::{format_units, parse_units, UnitsError};
