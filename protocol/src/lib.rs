// Copyright (c) 2026 Xstro Labs. MIT License.
// See LICENSE for details.

//! # XSTRO Protocol — Host Runtime Library
//!
//! The pieces of a chain that a contract needs and nothing more: who is
//! calling, how much they attached, what time it is, who holds which
//! balance, and a way to send value that might call back.
//!
//! ## Architecture
//!
//! - **address** — 20-byte account identifiers.
//! - **ledger** — Native balances and decimal unit conversion.
//! - **runtime** — Call frames with checkpoint/rollback, receive hooks,
//!   clocks.
//! - **config** — Protocol constants.
//!
//! ## Execution Model
//!
//! Calls are serialized. A call either commits entirely or leaves no trace.
//! The only way control leaves a contract mid-call is an outgoing transfer,
//! and the recipient may use that moment to call back in.

pub mod address;
pub mod config;
pub mod ledger;
pub mod runtime;

pub use address::{Address, AddressError};
pub use ledger::{LedgerError, NativeLedger};
pub use runtime::{
    CallContext, Clock, Contract, EventRecord, Host, HostError, ManualClock, Runtime, SystemClock,
};
