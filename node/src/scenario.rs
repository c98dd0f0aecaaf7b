//! # Scenarios
//!
//! A scenario is a vault config plus a list of steps, replayed in order
//! against a fresh chain with a manual clock. Failed steps are recorded in
//! the report and do not stop the run; only malformed input does.
//!
//! ```json
//! {
//!   "config": { "deployer": "owner", "genesis": [{ "account": "alice", "amount": "5" }] },
//!   "steps": [
//!     { "op": "deposit", "account": "alice", "amount": "1.234567" },
//!     { "op": "inject", "from": "owner", "amount": "0.99" },
//!     { "op": "set_withdrawal_allowed", "account": "owner", "allowed": true },
//!     { "op": "advance_time", "seconds": 60 },
//!     { "op": "withdrawal", "account": "alice" },
//!     { "op": "withdrawal_yield", "account": "owner" }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use xstro_contracts::config::resolve_account;
use xstro_contracts::{VaultClient, VaultConfig, VaultError, VaultEvent, VaultSnapshot};
use xstro_protocol::ledger::{format_units, parse_units};
use xstro_protocol::{Clock, EventRecord, ManualClock};

use crate::metrics::{CallKind, VaultMetrics};

/// A deployment and the steps to replay against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Deployment config. Defaults to an unfunded vault owned by `owner`.
    #[serde(default)]
    pub config: VaultConfig,
    /// Steps, executed in order.
    pub steps: Vec<Step>,
}

/// One scripted action. Accounts are labels or hex addresses; amounts are
/// decimal token strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Deposit { account: String, amount: String },
    Withdrawal { account: String },
    Inject { from: String, amount: String },
    WithdrawalYield { account: String },
    SetWithdrawalAllowed { account: String, allowed: bool },
    SetMinWithdrawalInterval { account: String, seconds: u64 },
    AdvanceTime { seconds: u64 },
}

/// What happened at one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Zero-based step index.
    pub index: usize,
    /// The step as written.
    pub step: Step,
    /// Clock reading when the step ran.
    pub timestamp: u64,
    /// Formatted amount returned by the call, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Error kind when the call reverted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    /// Human-readable error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepOutcome {
    /// Whether the step committed.
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Full result of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Per-step outcomes, in order.
    pub steps: Vec<StepOutcome>,
    /// Committed vault events.
    pub events: Vec<EventRecord<VaultEvent>>,
    /// Vault state after the last step.
    pub vault: VaultSnapshot,
}

/// Reads and parses a scenario file.
pub fn load(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scenario file: {}", path.display()))
}

/// Deploys the scenario's vault and replays every step.
pub fn run(scenario: &Scenario, metrics: Option<&VaultMetrics>) -> Result<ScenarioReport> {
    let clock = ManualClock::new(scenario.config.start_time);
    let mut vault = VaultClient::from_config(&scenario.config, clock.clone())
        .context("failed to deploy vault from scenario config")?;
    tracing::info!(address = %vault.address(), steps = scenario.steps.len(), "scenario started");

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let timestamp = clock.now();
        let result = apply(&mut vault, &clock, step)
            .with_context(|| format!("step {index} is malformed"))?;

        let call = match result {
            Applied::Call(kind, call) => {
                if let Some(metrics) = metrics {
                    metrics.record_call(kind, call.is_ok());
                }
                Some(call)
            }
            Applied::Transfer(call) => Some(call),
            Applied::Local => None,
        };
        if let Some(metrics) = metrics {
            metrics.observe(&vault);
        }

        let outcome = match call {
            None => committed(index, step, timestamp, None),
            Some(Ok(amount)) => committed(index, step, timestamp, amount),
            Some(Err(e)) => {
                tracing::warn!(index, error = %e, "step reverted");
                StepOutcome {
                    index,
                    step: step.clone(),
                    timestamp,
                    result: None,
                    error: Some(e.kind()),
                    message: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let failed = outcomes.iter().filter(|o| !o.ok()).count();
    tracing::info!(steps = outcomes.len(), failed, "scenario finished");

    Ok(ScenarioReport {
        steps: outcomes,
        events: vault.event_records().to_vec(),
        vault: vault.snapshot(),
    })
}

enum Applied {
    /// A vault call with its formatted return value.
    Call(CallKind, Result<Option<String>, VaultError>),
    /// A plain value transfer; no vault code runs.
    Transfer(Result<Option<String>, VaultError>),
    /// A clock or other off-chain step.
    Local,
}

fn apply(vault: &mut VaultClient, clock: &ManualClock, step: &Step) -> Result<Applied> {
    let formatted = |r: Result<u128, VaultError>| r.map(|v| Some(format_units(v)));
    let unit = |r: Result<(), VaultError>| -> Result<Option<String>, VaultError> {
        r.map(|()| None)
    };

    Ok(match step {
        Step::Deposit { account, amount } => {
            let amount = amount_of(amount)?;
            Applied::Call(
                CallKind::Deposit,
                formatted(vault.deposit(resolve_account(account), amount)),
            )
        }
        Step::Withdrawal { account } => Applied::Call(
            CallKind::Withdrawal,
            formatted(vault.withdrawal(resolve_account(account))),
        ),
        Step::Inject { from, amount } => {
            let amount = amount_of(amount)?;
            Applied::Transfer(unit(vault.inject_yield(resolve_account(from), amount)))
        }
        Step::WithdrawalYield { account } => Applied::Call(
            CallKind::YieldSweep,
            formatted(vault.withdrawal_yield(resolve_account(account))),
        ),
        Step::SetWithdrawalAllowed { account, allowed } => Applied::Call(
            CallKind::Admin,
            unit(vault.set_withdrawal_allowed(resolve_account(account), *allowed)),
        ),
        Step::SetMinWithdrawalInterval { account, seconds } => Applied::Call(
            CallKind::Admin,
            unit(vault.set_min_withdrawal_interval(resolve_account(account), *seconds)),
        ),
        Step::AdvanceTime { seconds } => {
            let now = clock.advance(*seconds);
            tracing::debug!(now, "clock advanced");
            Applied::Local
        }
    })
}

fn amount_of(text: &str) -> Result<u128> {
    parse_units(text).with_context(|| format!("invalid amount {text:?}"))
}

fn committed(index: usize, step: &Step, timestamp: u64, result: Option<String>) -> StepOutcome {
    StepOutcome {
        index,
        step: step.clone(),
        timestamp,
        result,
        error: None,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "config": {
            "deployer": "owner",
            "start_time": 1000,
            "genesis": [
                { "account": "owner", "amount": "10" },
                { "account": "alice", "amount": "5" }
            ]
        },
        "steps": [
            { "op": "deposit", "account": "alice", "amount": "1.234567" },
            { "op": "inject", "from": "owner", "amount": "0.99" },
            { "op": "withdrawal", "account": "alice" },
            { "op": "set_withdrawal_allowed", "account": "owner", "allowed": true },
            { "op": "advance_time", "seconds": 60 },
            { "op": "withdrawal", "account": "alice" },
            { "op": "withdrawal_yield", "account": "alice" },
            { "op": "withdrawal_yield", "account": "owner" }
        ]
    }"#;

    fn sample() -> Scenario {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn replays_the_reference_scenario() {
        let report = run(&sample(), None).unwrap();
        let results: Vec<_> = report
            .steps
            .iter()
            .map(|s| (s.result.as_deref(), s.error))
            .collect();

        assert_eq!(
            results,
            vec![
                (Some("1.234567"), None),
                (None, None),
                (None, Some("WithdrawalDisabled")),
                (None, None),
                (None, None),
                (Some("1.234567"), None),
                (None, Some("Unauthorized")),
                (Some("0.99"), None),
            ]
        );
        assert_eq!(report.steps[5].timestamp, 1060);
        assert_eq!(report.vault.balance, "0");
        assert_eq!(report.vault.total_staking, "0");
        assert!(report.vault.stakers.is_empty());
        assert_eq!(report.events.len(), 4);
    }

    #[test]
    fn metrics_count_calls_and_failures() {
        let metrics = VaultMetrics::new().unwrap();
        run(&sample(), Some(&metrics)).unwrap();

        // The injection is a plain transfer, not a vault call.
        assert_eq!(metrics.calls_total.get(), 6);
        assert_eq!(metrics.calls_failed_total.get(), 2);
        assert_eq!(metrics.deposits_total.get(), 1);
        assert_eq!(metrics.withdrawals_total.get(), 1);
        assert_eq!(metrics.yield_sweeps_total.get(), 1);
        assert_eq!(metrics.balance.get(), 0.0);
    }

    #[test]
    fn failed_injection_is_not_a_failed_call() {
        let scenario = Scenario {
            config: VaultConfig::default(),
            steps: vec![Step::Inject {
                from: "nobody".into(),
                amount: "1".into(),
            }],
        };
        let metrics = VaultMetrics::new().unwrap();
        let report = run(&scenario, Some(&metrics)).unwrap();

        assert_eq!(report.steps[0].error, Some("TransferFailed"));
        assert_eq!(metrics.calls_total.get(), 0);
        assert_eq!(metrics.calls_failed_total.get(), 0);
    }

    #[test]
    fn bad_amount_aborts_the_run() {
        let scenario = Scenario {
            config: VaultConfig::default(),
            steps: vec![Step::Deposit {
                account: "alice".into(),
                amount: "1.2.3".into(),
            }],
        };
        let err = run(&scenario, None).unwrap_err();
        assert!(err.to_string().contains("step 0"));
    }

    #[test]
    fn report_serializes_large_amounts() {
        let report = run(&sample(), None).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"event\":\"Deposited\""));
        assert!(json.contains("1234567000000000000"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let scenario = load(file.path()).unwrap();
        assert_eq!(scenario, sample());
        assert_eq!(scenario.steps.len(), 8);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
