//! Time sources for the host runtime.
//!
//! Contracts read time through the host, never from the OS directly, so a
//! simulation or test can pin and advance the clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::config::GENESIS_TIMESTAMP;

/// A source of unix timestamps in seconds.
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn now(&self) -> u64;
}

/// Wall-clock time via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-epoch system clocks clamp to zero.
        Utc::now().timestamp().max(0) as u64
    }
}

/// A settable clock shared between the runtime and whoever drives it.
///
/// Cloning yields another handle to the same instant, so a test can keep a
/// handle after moving one into the runtime and advance time from outside.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the clock forward by `secs`, saturating at `u64::MAX`.
    pub fn advance(&self, secs: u64) -> u64 {
        let mut current = self.now.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(secs);
            match self
                .now
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }

    /// Sets the clock to an absolute timestamp.
    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(GENESIS_TIMESTAMP)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();
        handle.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(handle.now(), 10);
    }

    #[test]
    fn manual_clock_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
    }

    #[test]
    fn default_manual_clock_starts_at_genesis() {
        assert_eq!(ManualClock::default().now(), GENESIS_TIMESTAMP);
    }

    #[test]
    fn system_clock_is_after_genesis() {
        assert!(SystemClock.now() > GENESIS_TIMESTAMP);
    }
}
