//! # Host Runtime — Call Frames, Checkpoints and Receive Hooks
//!
//! The [`Runtime`] plays the part of the chain for a single deployed
//! contract. It owns the native ledger, the clock, the event log and the
//! contract's state, and it enforces the two execution guarantees contracts
//! are written against:
//!
//! 1. **Serialized, all-or-nothing calls.** Every call runs inside a frame.
//!    The frame checkpoints the contract state, the ledger and the event log
//!    length on entry and restores all three if the call returns `Err`.
//! 2. **Interactions can re-enter.** [`Host::transfer`] delivers value and
//!    then runs the recipient's [`ReceiveHook`], which is handed `&mut`
//!    access to the same contract and host and may open nested frames via
//!    [`Host::invoke`]. This is how a reentrancy attempt is expressed.
//!
//! ```text
//! Runtime::call ──► Host::invoke ──► admit value ──► op(contract, host, ctx)
//!                        │                                │
//!                        │                      host.transfer(contract, to, amt)
//!                        │                                │
//!                        │                       ReceiveHook::on_receive
//!                        │                                │
//!                        │                       Host::invoke (nested frame)
//!                        ▼
//!                Err? restore checkpoint
//! ```
//!
//! Hook state is not part of a checkpoint: hooks model foreign code that
//! the contract under test cannot see into.
//!
//! Foreign code acts only as itself. A hook may call in or send value as
//! the account it is installed on, and nobody but the contract's own code
//! moves value out of the contract account.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::MAX_CALL_DEPTH;
use crate::ledger::NativeLedger;

use super::clock::Clock;
use super::error::HostError;

// ---------------------------------------------------------------------------
// Contract & Hook Traits
// ---------------------------------------------------------------------------

/// State of a contract that can be hosted by a [`Runtime`].
///
/// `Clone` is what makes checkpoints possible: a frame snapshots the whole
/// contract on entry.
pub trait Contract: Clone {
    /// The contract's event type.
    type Event: Clone + fmt::Debug;
}

/// Value delivered to a recipient by [`Host::transfer`] or [`Host::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Sending account.
    pub from: Address,
    /// Receiving account.
    pub to: Address,
    /// Amount delivered, in base units.
    pub amount: u128,
}

/// Code that runs when an account receives native value.
///
/// Returning `Err(reason)` rejects the delivery and fails the sending call.
/// Implemented for closures of the matching shape.
pub trait ReceiveHook<C: Contract> {
    /// Called after the ledger has credited the recipient.
    fn on_receive(&mut self, host: &mut Host<C>, contract: &mut C, receipt: &Receipt)
        -> Result<(), String>;
}

impl<C, F> ReceiveHook<C> for F
where
    C: Contract,
    F: FnMut(&mut Host<C>, &mut C, &Receipt) -> Result<(), String>,
{
    fn on_receive(
        &mut self,
        host: &mut Host<C>,
        contract: &mut C,
        receipt: &Receipt,
    ) -> Result<(), String> {
        self(host, contract, receipt)
    }
}

// ---------------------------------------------------------------------------
// Call Context & Events
// ---------------------------------------------------------------------------

/// What the host tells a contract about the call it is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller. Cannot be chosen by the contract.
    pub caller: Address,
    /// Native value attached to the call, already credited to the contract.
    pub value: u128,
    /// Unix time of the call, in seconds.
    pub timestamp: u64,
    /// Frame depth, 1 for a top-level call.
    pub depth: usize,
}

/// An event as recorded in the host's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord<E> {
    /// Emitting contract.
    pub contract: Address,
    /// Unix time of emission.
    pub timestamp: u64,
    /// The contract-defined payload.
    pub event: E,
}

struct Checkpoint<C> {
    contract: C,
    ledger: NativeLedger,
    events_len: usize,
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Everything a running contract can reach besides its own state.
pub struct Host<C: Contract> {
    address: Address,
    ledger: NativeLedger,
    clock: Box<dyn Clock>,
    events: Vec<EventRecord<C::Event>>,
    hooks: HashMap<Address, Box<dyn ReceiveHook<C>>>,
    depth: usize,
    running: Running,
}

/// Whose code is on top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Running {
    /// Nothing; the runtime itself is driving.
    Host,
    /// The hosted contract.
    Contract,
    /// The receive hook of this account.
    Hook(Address),
}

impl<C: Contract> Host<C> {
    fn new(address: Address, ledger: NativeLedger, clock: Box<dyn Clock>) -> Self {
        Self {
            address,
            ledger,
            clock,
            events: Vec::new(),
            hooks: HashMap::new(),
            depth: 0,
            running: Running::Host,
        }
    }

    /// Address of the hosted contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current unix time in seconds.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Native balance of the hosted contract.
    pub fn balance(&self) -> u128 {
        self.ledger.balance_of(&self.address)
    }

    /// Native balance of any account.
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    /// Read access to the full ledger.
    pub fn ledger(&self) -> &NativeLedger {
        &self.ledger
    }

    /// Events committed so far, oldest first.
    pub fn events(&self) -> &[EventRecord<C::Event>] {
        &self.events
    }

    /// Depth of the frame currently executing, 0 between calls.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Appends an event to the log. Dropped again if the frame reverts.
    pub fn emit(&mut self, event: C::Event) {
        tracing::debug!(contract = %self.address, ?event, "event emitted");
        self.events.push(EventRecord {
            contract: self.address,
            timestamp: self.clock.now(),
            event,
        });
    }

    /// Installs `hook` to run whenever `account` receives native value.
    /// Replaces any previous hook for that account.
    pub fn set_hook<H>(&mut self, account: Address, hook: H)
    where
        H: ReceiveHook<C> + 'static,
    {
        self.hooks.insert(account, Box::new(hook));
    }

    /// Removes the hook for `account`, if any.
    pub fn clear_hook(&mut self, account: &Address) {
        self.hooks.remove(account);
    }

    /// Runs `op` as a call from `caller` carrying `value`.
    ///
    /// The value is moved from `caller` to the contract before `op` runs.
    /// If admission or `op` fails, the contract state, ledger and event log
    /// are restored to what they were on entry and the error is returned.
    ///
    /// # Errors
    ///
    /// [`HostError::CallDepthExceeded`] when nested too deeply,
    /// [`HostError::ContractOrigin`] for a self-call carrying value,
    /// [`HostError::ForgedCaller`] when a hook calls as someone else, a
    /// ledger error if `caller` cannot fund `value`, or whatever `op`
    /// returns.
    pub fn invoke<R, E, F>(
        &mut self,
        contract: &mut C,
        caller: Address,
        value: u128,
        op: F,
    ) -> Result<R, E>
    where
        E: From<HostError> + fmt::Display,
        F: FnOnce(&mut C, &mut Host<C>, &CallContext) -> Result<R, E>,
    {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(HostError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            }
            .into());
        }

        // Self-calls may run but never carry value: the ledger would treat it
        // as a no-op while the contract saw it as received.
        if caller == self.address && value > 0 {
            return Err(HostError::ContractOrigin {
                contract: self.address,
            }
            .into());
        }

        // Foreign code calls in under its own identity only.
        if let Running::Hook(account) = self.running {
            if caller != account {
                return Err(HostError::ForgedCaller { caller, account }.into());
            }
        }

        let checkpoint = self.checkpoint(contract);
        self.depth += 1;
        let outer = std::mem::replace(&mut self.running, Running::Contract);
        let ctx = CallContext {
            caller,
            value,
            timestamp: self.clock.now(),
            depth: self.depth,
        };
        tracing::debug!(%caller, value, depth = ctx.depth, "call frame entered");

        let address = self.address;
        let result = match self.ledger.transfer(&caller, &address, value) {
            Ok(()) => op(contract, self, &ctx),
            Err(e) => Err(HostError::from(e).into()),
        };

        self.running = outer;
        self.depth -= 1;
        if let Err(e) = &result {
            tracing::warn!(%caller, depth = ctx.depth, error = %e, "call reverted");
            self.restore(contract, checkpoint);
        }
        result
    }

    /// Sends `amount` from the hosted contract to `to`, then runs the
    /// recipient's hook.
    ///
    /// This is the only point where foreign code runs during a call. On
    /// `Err` the caller must fail its frame: the ledger movement is undone
    /// by the frame's checkpoint, not here.
    ///
    /// # Errors
    ///
    /// [`HostError::ContractOrigin`] unless contract code is executing; a
    /// receive hook cannot spend the contract's balance.
    pub fn transfer(&mut self, contract: &mut C, to: Address, amount: u128) -> Result<(), HostError> {
        if self.running != Running::Contract {
            return Err(HostError::ContractOrigin {
                contract: self.address,
            });
        }
        let from = self.address;
        self.deliver(contract, from, to, amount)
    }

    /// Moves `amount` between two accounts other than the contract's own and
    /// runs the recipient's hook.
    ///
    /// # Errors
    ///
    /// [`HostError::ContractOrigin`] when `from` is the contract address:
    /// only [`Host::transfer`], called from contract code, spends from it.
    /// [`HostError::ForgedCaller`] when a hook spends from another account.
    pub fn send(
        &mut self,
        contract: &mut C,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), HostError> {
        if from == self.address {
            return Err(HostError::ContractOrigin {
                contract: self.address,
            });
        }
        if let Running::Hook(account) = self.running {
            if from != account {
                return Err(HostError::ForgedCaller {
                    caller: from,
                    account,
                });
            }
        }
        self.deliver(contract, from, to, amount)
    }

    /// A hook is not re-entered while it is already running; a nested
    /// delivery to the same account is a plain ledger credit.
    fn deliver(
        &mut self,
        contract: &mut C,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), HostError> {
        self.ledger.transfer(&from, &to, amount)?;
        tracing::debug!(%from, %to, amount, "native transfer");

        let Some(mut hook) = self.hooks.remove(&to) else {
            return Ok(());
        };
        let receipt = Receipt { from, to, amount };
        let outer = std::mem::replace(&mut self.running, Running::Hook(to));
        let outcome = hook.on_receive(self, contract, &receipt);
        self.running = outer;
        // A hook may have installed a replacement for itself; keep the newer one.
        self.hooks.entry(to).or_insert(hook);

        outcome.map_err(|reason| HostError::RecipientRejected { to, amount, reason })
    }

    fn checkpoint(&self, contract: &C) -> Checkpoint<C> {
        Checkpoint {
            contract: contract.clone(),
            ledger: self.ledger.clone(),
            events_len: self.events.len(),
        }
    }

    fn restore(&mut self, contract: &mut C, checkpoint: Checkpoint<C>) {
        *contract = checkpoint.contract;
        self.ledger = checkpoint.ledger;
        self.events.truncate(checkpoint.events_len);
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// A single deployed contract together with the chain it lives on.
pub struct Runtime<C: Contract> {
    host: Host<C>,
    contract: C,
}

impl<C: Contract> Runtime<C> {
    /// Deploys a contract built by `ctor` on a chain with the given ledger
    /// and clock. The constructor sees `deployer` as its caller.
    pub fn deploy<K, F>(ledger: NativeLedger, clock: K, deployer: Address, ctor: F) -> Self
    where
        K: Clock + 'static,
        F: FnOnce(&CallContext) -> C,
    {
        let address = Address::contract(&deployer, 0);
        let host = Host::new(address, ledger, Box::new(clock));
        let ctx = CallContext {
            caller: deployer,
            value: 0,
            timestamp: host.now(),
            depth: 0,
        };
        let contract = ctor(&ctx);
        tracing::info!(%address, %deployer, "contract deployed");
        Self { host, contract }
    }

    /// Address of the deployed contract.
    pub fn address(&self) -> Address {
        self.host.address
    }

    /// Executes a top-level call. See [`Host::invoke`].
    ///
    /// The contract's own address is never a valid top-level caller.
    pub fn call<R, E, F>(&mut self, caller: Address, value: u128, op: F) -> Result<R, E>
    where
        E: From<HostError> + fmt::Display,
        F: FnOnce(&mut C, &mut Host<C>, &CallContext) -> Result<R, E>,
    {
        if caller == self.host.address {
            tracing::warn!(%caller, "top-level call from contract account refused");
            return Err(HostError::ContractOrigin { contract: caller }.into());
        }
        self.host.invoke(&mut self.contract, caller, value, op)
    }

    /// Runs a read-only view against the contract and host.
    pub fn query<R, F>(&self, view: F) -> R
    where
        F: FnOnce(&C, &Host<C>) -> R,
    {
        view(&self.contract, &self.host)
    }

    /// Executes a plain value transfer as its own transaction. Sending to
    /// the contract address credits it without running any contract code.
    ///
    /// # Errors
    ///
    /// [`HostError::ContractOrigin`] when `from` is the contract, ledger
    /// failures or a rejecting hook; in every case nothing changes.
    pub fn send(&mut self, from: Address, to: Address, amount: u128) -> Result<(), HostError> {
        let checkpoint = self.host.checkpoint(&self.contract);
        let result = self.host.send(&mut self.contract, from, to, amount);
        if let Err(e) = &result {
            tracing::warn!(%from, %to, amount, error = %e, "transfer reverted");
            self.host.restore(&mut self.contract, checkpoint);
        }
        result
    }

    /// The hosted contract's state.
    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// The host side of the chain.
    pub fn host(&self) -> &Host<C> {
        &self.host
    }

    /// Mutable host access, for installing hooks.
    pub fn host_mut(&mut self) -> &mut Host<C> {
        &mut self.host
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
