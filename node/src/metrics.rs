//! # Prometheus Metrics
//!
//! Counters for vault calls and gauges for the vault's holdings, collected
//! while a scenario runs and rendered in the Prometheus text exposition
//! format at the end.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] with
//! the `xstro` prefix so they do not collide with any default global
//! registry consumers.

use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};
use xstro_contracts::VaultClient;
use xstro_protocol::ledger::units::to_display_f64;

/// Which vault entry point a call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Deposit,
    Withdrawal,
    YieldSweep,
    Admin,
}

/// Holds all Prometheus metric handles for a vault.
#[derive(Clone)]
pub struct VaultMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Every vault call, successful or not.
    pub calls_total: IntCounter,
    /// Vault calls that reverted.
    pub calls_failed_total: IntCounter,
    /// Committed deposits.
    pub deposits_total: IntCounter,
    /// Committed principal withdrawals.
    pub withdrawals_total: IntCounter,
    /// Committed yield sweeps.
    pub yield_sweeps_total: IntCounter,
    /// Live principal, in tokens.
    pub total_staking: Gauge,
    /// Vault balance, in tokens.
    pub balance: Gauge,
}

impl VaultMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("xstro".into()), None)?;

        let calls_total = IntCounter::new("vault_calls_total", "Total number of vault calls")?;
        registry.register(Box::new(calls_total.clone()))?;

        let calls_failed_total = IntCounter::new(
            "vault_calls_failed_total",
            "Total number of vault calls that reverted",
        )?;
        registry.register(Box::new(calls_failed_total.clone()))?;

        let deposits_total =
            IntCounter::new("vault_deposits_total", "Total number of committed deposits")?;
        registry.register(Box::new(deposits_total.clone()))?;

        let withdrawals_total = IntCounter::new(
            "vault_withdrawals_total",
            "Total number of committed principal withdrawals",
        )?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let yield_sweeps_total = IntCounter::new(
            "vault_yield_sweeps_total",
            "Total number of committed yield sweeps",
        )?;
        registry.register(Box::new(yield_sweeps_total.clone()))?;

        let total_staking = Gauge::new(
            "vault_total_staking",
            "Principal currently staked in the vault, in tokens",
        )?;
        registry.register(Box::new(total_staking.clone()))?;

        let balance = Gauge::new("vault_balance", "Native balance held by the vault, in tokens")?;
        registry.register(Box::new(balance.clone()))?;

        Ok(Self {
            registry,
            calls_total,
            calls_failed_total,
            deposits_total,
            withdrawals_total,
            yield_sweeps_total,
            total_staking,
            balance,
        })
    }

    /// Counts one vault call and its outcome.
    pub fn record_call(&self, kind: CallKind, ok: bool) {
        self.calls_total.inc();
        if !ok {
            self.calls_failed_total.inc();
            return;
        }
        match kind {
            CallKind::Deposit => self.deposits_total.inc(),
            CallKind::Withdrawal => self.withdrawals_total.inc(),
            CallKind::YieldSweep => self.yield_sweeps_total.inc(),
            CallKind::Admin => {}
        }
    }

    /// Refreshes the gauges from the vault's current state.
    pub fn observe(&self, vault: &VaultClient) {
        let (balance, _) = vault.total_yield();
        self.balance.set(to_display_f64(balance));
        self.total_staking.set(to_display_f64(vault.total_staking()));
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xstro_protocol::config::UNITS_PER_TOKEN;
    use xstro_protocol::{Address, ManualClock, NativeLedger};

    #[test]
    fn failed_calls_do_not_count_as_kind() {
        let metrics = VaultMetrics::new().unwrap();
        metrics.record_call(CallKind::Deposit, true);
        metrics.record_call(CallKind::Deposit, false);
        metrics.record_call(CallKind::Admin, true);

        assert_eq!(metrics.calls_total.get(), 3);
        assert_eq!(metrics.calls_failed_total.get(), 1);
        assert_eq!(metrics.deposits_total.get(), 1);
        assert_eq!(metrics.withdrawals_total.get(), 0);
    }

    #[test]
    fn gauges_follow_vault_in_tokens() {
        let alice = Address::from_label("alice");
        let ledger = NativeLedger::with_genesis([(alice, 10 * UNITS_PER_TOKEN)]).unwrap();
        let mut vault = VaultClient::deploy(ledger, ManualClock::default(), alice);
        vault.deposit(alice, 3 * UNITS_PER_TOKEN).unwrap();
        vault.inject_yield(alice, UNITS_PER_TOKEN / 2).unwrap();

        let metrics = VaultMetrics::new().unwrap();
        metrics.observe(&vault);
        assert_eq!(metrics.total_staking.get(), 3.0);
        assert_eq!(metrics.balance.get(), 3.5);
    }

    #[test]
    fn encoding_uses_prefix() {
        let metrics = VaultMetrics::new().unwrap();
        metrics.record_call(CallKind::YieldSweep, true);
        let text = metrics.encode().unwrap();
        assert!(text.contains("xstro_vault_yield_sweeps_total 1"));
        assert!(text.contains("xstro_vault_balance"));
    }
}
