//! # Runtime Module — The Execution Environment Contracts Run In
//!
//! ```text
//! clock.rs  — Time sources (system and manual)
//! host.rs   — Call frames, checkpoints, transfers and receive hooks
//! error.rs  — Host-level failures
//! ```

pub mod clock;
pub mod error;
pub mod host;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::HostError;
pub use host::{CallContext, Contract, EventRecord, Host, Receipt, ReceiveHook, Runtime};
