//! Reentrancy tests for the staking vault.
//!
//! A receive hook stands in for a malicious (or merely careless) contract at
//! the recipient address. The hook is handed the live vault and host when
//! value arrives, so it can call straight back into the vault before the
//! outer call has finished.

use std::cell::RefCell;
use std::rc::Rc;

use xstro_contracts::{StakingVault, VaultClient, VaultError, VaultEvent};
use xstro_protocol::ledger::parse_units;
use xstro_protocol::{Address, HostError, ManualClock, NativeLedger};

fn owner() -> Address {
    Address::from_label("owner")
}

fn attacker() -> Address {
    Address::from_label("attacker")
}

fn honest() -> Address {
    Address::from_label("honest")
}

fn xst(amount: &str) -> u128 {
    parse_units(amount).expect("valid amount")
}

fn setup() -> VaultClient {
    let ledger = NativeLedger::with_genesis([
        (owner(), xst("100")),
        (attacker(), xst("100")),
        (honest(), xst("100")),
    ])
    .expect("genesis");
    let mut client = VaultClient::deploy(ledger, ManualClock::new(1_000), owner());
    client.set_withdrawal_allowed(owner(), true).unwrap();
    client
}

type Outcomes = Rc<RefCell<Vec<Result<u128, VaultError>>>>;

#[test]
fn reentrant_withdrawal_finds_no_stake() {
    let mut vault = setup();
    vault.deposit(honest(), xst("10")).unwrap();
    vault.deposit(attacker(), xst("1")).unwrap();
    let supply = vault.runtime().host().ledger().total_supply();

    let outcomes: Outcomes = Rc::default();
    let seen = Rc::clone(&outcomes);
    vault.set_receive_hook(attacker(), move |host, contract, receipt| {
        assert_eq!(receipt.amount, xst("1"));
        let result = host.invoke(contract, receipt.to, 0, StakingVault::withdrawal);
        seen.borrow_mut().push(result);
        Ok(())
    });

    let before = vault.balance_of(&attacker());
    let paid = vault.withdrawal(attacker()).unwrap();

    assert_eq!(paid, xst("1"));
    assert_eq!(
        *outcomes.borrow(),
        vec![Err(VaultError::NoStake { caller: attacker() })]
    );
    assert_eq!(vault.balance_of(&attacker()) - before, xst("1"));
    assert_eq!(vault.total_staking(), xst("10"));
    assert_eq!(vault.balance_of(&vault.address()), xst("10"));
    assert_eq!(vault.runtime().host().ledger().total_supply(), supply);

    // The failed nested frame left no trace in the log.
    let withdrawals: Vec<_> = vault
        .events()
        .into_iter()
        .filter(|e| matches!(e, VaultEvent::Withdrawn { .. }))
        .collect();
    assert_eq!(withdrawals.len(), 1);
}

#[test]
fn reentrant_yield_sweep_finds_nothing_left() {
    let mut vault = setup();
    vault.deposit(honest(), xst("5")).unwrap();
    vault.inject_yield(honest(), xst("2")).unwrap();

    let outcomes: Outcomes = Rc::default();
    let seen = Rc::clone(&outcomes);
    vault.set_receive_hook(owner(), move |host, contract, receipt| {
        let result = host.invoke(contract, receipt.to, 0, StakingVault::withdrawal_yield);
        seen.borrow_mut().push(result);
        Ok(())
    });

    let swept = vault.withdrawal_yield(owner()).unwrap();
    assert_eq!(swept, xst("2"));
    assert_eq!(*outcomes.borrow(), vec![Err(VaultError::NoYield)]);
    assert_eq!(vault.total_yield(), (xst("5"), 0));
    assert_eq!(vault.total_staking(), xst("5"));
}

#[test]
fn rejecting_recipient_reverts_the_whole_withdrawal() {
    let mut vault = setup();
    vault.deposit(attacker(), xst("3")).unwrap();
    let events_before = vault.events().len();
    let vault_balance = vault.balance_of(&vault.address());

    vault.set_receive_hook(attacker(), |_host, _contract, _receipt| {
        Err("payments refused".to_string())
    });

    let result = vault.withdrawal(attacker());
    assert_eq!(
        result,
        Err(VaultError::TransferFailed(HostError::RecipientRejected {
            to: attacker(),
            amount: xst("3"),
            reason: "payments refused".into(),
        }))
    );

    // Record, running total, balances and the log are as before the call.
    assert_eq!(vault.user_stake(&attacker()), (xst("3"), 1_000));
    assert_eq!(vault.total_staking(), xst("3"));
    assert_eq!(vault.balance_of(&vault.address()), vault_balance);
    assert_eq!(vault.events().len(), events_before);

    // Once the recipient accepts value again the stake is still there.
    vault.clear_receive_hook(&attacker());
    assert_eq!(vault.withdrawal(attacker()), Ok(xst("3")));
}

#[test]
fn rejecting_owner_keeps_yield_in_vault() {
    let mut vault = setup();
    vault.inject_yield(honest(), xst("1")).unwrap();
    vault.set_receive_hook(owner(), |_host, _contract, _receipt| Err("no".to_string()));

    assert!(matches!(
        vault.withdrawal_yield(owner()),
        Err(VaultError::TransferFailed(HostError::RecipientRejected { .. }))
    ));
    assert_eq!(vault.total_yield(), (xst("1"), xst("1")));
}

#[test]
fn reentrant_deposit_becomes_a_fresh_stake() {
    let mut vault = setup();
    vault.deposit(attacker(), xst("4")).unwrap();

    let outcomes: Outcomes = Rc::default();
    let seen = Rc::clone(&outcomes);
    vault.set_receive_hook(attacker(), move |host, contract, receipt| {
        let result = host.invoke(contract, receipt.to, receipt.amount, StakingVault::deposit);
        seen.borrow_mut().push(result);
        Ok(())
    });

    assert_eq!(vault.withdrawal(attacker()), Ok(xst("4")));
    assert_eq!(*outcomes.borrow(), vec![Ok(xst("4"))]);

    // The principal went out and straight back in as a new stake.
    assert_eq!(vault.user_stake(&attacker()).0, xst("4"));
    assert_eq!(vault.total_staking(), xst("4"));
    assert_eq!(vault.balance_of(&vault.address()), xst("4"));
    assert_eq!(vault.total_yield().1, 0);
}

#[test]
fn hook_sees_vault_state_after_effects() {
    let mut vault = setup();
    vault.deposit(honest(), xst("2")).unwrap();
    vault.deposit(attacker(), xst("1")).unwrap();

    let observed = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&observed);
    vault.set_receive_hook(attacker(), move |host, contract: &mut StakingVault, _receipt| {
        *seen.borrow_mut() = Some((
            contract.user_stake(&attacker()),
            contract.total_staking(),
            contract.total_yield(host),
        ));
        Ok(())
    });

    vault.withdrawal(attacker()).unwrap();
    assert_eq!(
        *observed.borrow(),
        Some(((0, 0), xst("2"), (xst("2"), 0)))
    );
}

#[test]
fn plain_send_to_hooked_account_runs_hook() {
    let mut vault = setup();
    let calls = Rc::new(RefCell::new(0u32));
    let seen = Rc::clone(&calls);
    vault.set_receive_hook(attacker(), move |_host, _contract, _receipt| {
        *seen.borrow_mut() += 1;
        Ok(())
    });

    vault.send(honest(), attacker(), xst("1")).unwrap();
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(vault.balance_of(&attacker()), xst("101"));
}
