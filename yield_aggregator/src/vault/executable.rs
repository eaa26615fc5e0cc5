//! The executable vault that runs deposits, withdrawals and rebalances.
//!
//! Every operation is one atomic unit: the chain is snapshotted on entry and reverted
//! to that snapshot if any step fails. The ledger is derived on the side and committed
//! together with the event only after every venue call has gone through.

use std::{cmp::Ordering, rc::Rc};

use alloy_primitives::U256;

use crate::{
    events::{AllocationEvent, AllocationKind},
    journal::{JournalCollection, LogType},
    state::VAULT_STATE,
    utils::{chain::Chain, error::*},
    venue::{
        aave::AaveAdapter, asset::Erc20Asset, compound::CompoundAdapter, RateSample, Venue,
        YieldSource,
    },
};

use super::{ledger::BalanceLedger, lock::Lock, settings::VaultSettings, stable::StableVault};

/// Picks the venue a deposit goes to. Aave wins ties.
pub fn preferred_venue(aave: &RateSample, compound: &RateSample) -> Venue {
    if aave.annualized_rate >= compound.annualized_rate {
        Venue::Aave
    } else {
        Venue::Compound
    }
}

/// Returns `(from, to)` if funds should move: `to` must yield strictly more
/// and hold strictly less than `from`.
pub fn rebalance_route(
    aave: &RateSample,
    compound: &RateSample,
    ledger: &BalanceLedger,
) -> Option<(Venue, Venue)> {
    let to = match aave.annualized_rate.cmp(&compound.annualized_rate) {
        Ordering::Greater => Venue::Aave,
        Ordering::Less => Venue::Compound,
        Ordering::Equal => return None,
    };
    let from = to.other();

    (ledger.position(to) < ledger.position(from)).then_some((from, to))
}

/// Outcome of an operation, committed only if every step succeeded
struct Settlement {
    ledger: BalanceLedger,
    event: AllocationEvent,
}

pub struct ExecutableVault {
    /// Immutable settings and configurations
    pub settings: VaultSettings,
    /// Positions held at each venue
    pub ledger: BalanceLedger,
    /// Determines if an operation is currently running.
    pub lock: Lock,
    /// Tracks if the lock acquisition was successful for the drop trait implementation
    acquired_lock: bool,
    chain: Rc<dyn Chain>,
    aave: AaveAdapter,
    compound: CompoundAdapter,
}

impl ExecutableVault {
    pub fn new(stable: &StableVault, chain: Rc<dyn Chain>) -> ExecutableVault {
        ExecutableVault {
            aave: AaveAdapter::new(&stable.settings),
            compound: CompoundAdapter::new(&stable.settings),
            settings: stable.settings.clone(),
            ledger: stable.ledger,
            lock: stable.lock.clone().into(),
            acquired_lock: false,
            chain,
        }
    }

    /// Replaces the vault in the state
    fn apply_change(&self) {
        VAULT_STATE.with(|state| *state.borrow_mut() = Some(self.into()));
    }

    /// Locks the vault and persists the lock before any external call is made.
    fn lock(&mut self) -> VaultResult<()> {
        let now = self.chain.timestamp();
        self.lock.try_lock(now).map(|_| {
            self.acquired_lock = true;
            self.apply_change();
        })
    }

    /// Unlocks the vault if this instance holds the lock.
    pub fn unlock(&mut self) {
        if self.acquired_lock {
            self.lock.try_unlock(true);
            self.acquired_lock = false;
            self.apply_change();
        }
    }

    fn source(&self, venue: Venue) -> &dyn YieldSource {
        match venue {
            Venue::Aave => &self.aave,
            Venue::Compound => &self.compound,
        }
    }

    fn asset(&self) -> Erc20Asset {
        Erc20Asset::new(self.settings.asset, self.settings.vault)
    }

    /// Deposits `amount` from the owner into the higher-yielding venue.
    pub fn deposit(
        &mut self,
        journal: &mut JournalCollection,
        amount: U256,
    ) -> VaultResult<AllocationEvent> {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount);
        }
        self.lock()?;
        let result = self.atomically(journal, |vault, journal| vault.run_deposit(journal, amount));
        self.unlock();
        result
    }

    /// Pays the vault's entire holdings out to the owner.
    pub fn withdraw(&mut self, journal: &mut JournalCollection) -> VaultResult<AllocationEvent> {
        self.lock()?;
        let result = self.atomically(journal, |vault, journal| vault.run_withdraw(journal));
        self.unlock();
        result
    }

    /// Moves the holdings to the higher-yielding venue if that venue holds less.
    pub fn rebalance(&mut self, journal: &mut JournalCollection) -> VaultResult<AllocationEvent> {
        self.lock()?;
        let result = self.atomically(journal, |vault, journal| vault.run_rebalance(journal));
        self.unlock();
        result
    }

    /// Runs `operation` as one atomic unit and commits its settlement.
    /// On failure every chain effect since entry is discarded and nothing is committed.
    fn atomically<F>(
        &mut self,
        journal: &mut JournalCollection,
        operation: F,
    ) -> VaultResult<AllocationEvent>
    where
        F: FnOnce(&Self, &mut JournalCollection) -> VaultResult<Settlement>,
    {
        let snapshot = self.chain.snapshot();

        match operation(&*self, journal) {
            Ok(settlement) => {
                // A failed release leaves the commit in place.
                if let Err(release_err) = self.chain.release(snapshot) {
                    journal.append_note(
                        Err(release_err.into()),
                        LogType::Info,
                        "Releasing the operation's snapshot failed.",
                    );
                }
                self.ledger = settlement.ledger;
                self.apply_change();
                journal.append_note(
                    Ok(()),
                    LogType::Allocation,
                    format!(
                        "{} {}. Positions: Aave {}, Compound {}.",
                        settlement.event.kind.name(),
                        settlement.event.amount,
                        self.ledger.aave,
                        self.ledger.compound
                    ),
                );
                settlement.event.clone().record();
                Ok(settlement.event)
            }
            Err(err) => {
                match self.chain.revert_to(snapshot) {
                    Ok(()) => journal.append_note(
                        Err(err.clone()),
                        LogType::Info,
                        "The operation failed. All of its effects were rolled back.",
                    ),
                    Err(revert_err) => journal.append_note(
                        Err(revert_err.into()),
                        LogType::Info,
                        "Rolling back the failed operation failed.",
                    ),
                };
                Err(err)
            }
        }
    }

    fn sample_yields(
        &self,
        journal: &mut JournalCollection,
    ) -> VaultResult<(RateSample, RateSample)> {
        let chain = self.chain.as_ref();
        let aave = self.aave.current_annualized_yield(chain)?;
        let compound = self.compound.current_annualized_yield(chain)?;

        journal.append_note(
            Ok(()),
            LogType::Info,
            format!(
                "Sampled yields: Aave {}%, Compound {}%.",
                aave.percent()?,
                compound.percent()?
            ),
        );
        Ok((aave, compound))
    }

    /// The ledger reconciled with the balances the venues report now
    fn live_ledger(&self, journal: &mut JournalCollection) -> VaultResult<BalanceLedger> {
        let chain = self.chain.as_ref();
        let ledger = self
            .ledger
            .reconciled(Venue::Aave, self.aave.current_balance(chain)?)
            .reconciled(Venue::Compound, self.compound.current_balance(chain)?);

        journal.append_note(
            Ok(()),
            LogType::Info,
            format!(
                "Live balances: Aave {}, Compound {}.",
                ledger.aave, ledger.compound
            ),
        );
        Ok(ledger)
    }

    fn run_deposit(
        &self,
        journal: &mut JournalCollection,
        amount: U256,
    ) -> VaultResult<Settlement> {
        let chain = self.chain.as_ref();
        let (aave_rate, compound_rate) = self.sample_yields(journal)?;
        let target = preferred_venue(&aave_rate, &compound_rate);
        let live = self.live_ledger(journal)?;

        self.asset().pull(chain, self.settings.owner, amount)?;
        self.source(target).deposit(chain, amount)?;
        let mut ledger = live.credited(target, amount)?;

        // Funds left behind by an earlier allocation follow the deposit.
        let other = target.other();
        let stranded = live.position(other);
        if !stranded.is_zero() {
            let received = self.source(other).withdraw(chain, stranded)?;
            self.source(target).deposit(chain, received)?;
            ledger = ledger.moved(other, target, received)?;
            journal.append_note(
                Ok(()),
                LogType::Info,
                format!(
                    "Consolidated {} from {:?} into {:?}.",
                    received, other, target
                ),
            );
        }

        Ok(Settlement {
            ledger,
            event: AllocationEvent::new(
                AllocationKind::deposited_to(target),
                amount,
                chain.timestamp(),
            ),
        })
    }

    fn run_withdraw(&self, journal: &mut JournalCollection) -> VaultResult<Settlement> {
        let chain = self.chain.as_ref();
        let live = self.live_ledger(journal)?;
        if live.total()?.is_zero() {
            return Err(VaultError::NothingToWithdraw);
        }

        let mut received = U256::ZERO;
        for venue in [Venue::Aave, Venue::Compound] {
            let position = live.position(venue);
            if position.is_zero() {
                continue;
            }
            let amount = self.source(venue).withdraw(chain, position)?;
            received = received
                .checked_add(amount)
                .ok_or_else(|| arithmetic_err("Withdrawn amount overflowed."))?;
        }

        self.asset().transfer(chain, self.settings.owner, received)?;

        Ok(Settlement {
            ledger: live.zeroed(),
            event: AllocationEvent::new(AllocationKind::Withdrawn, received, chain.timestamp()),
        })
    }

    fn run_rebalance(&self, journal: &mut JournalCollection) -> VaultResult<Settlement> {
        let chain = self.chain.as_ref();
        let (aave_rate, compound_rate) = self.sample_yields(journal)?;
        let live = self.live_ledger(journal)?;

        let (from, to) = rebalance_route(&aave_rate, &compound_rate, &live)
            .ok_or(VaultError::NoRebalanceRequired)?;

        let received = self.source(from).withdraw(chain, live.position(from))?;
        self.source(to).deposit(chain, received)?;

        Ok(Settlement {
            ledger: live.moved(from, to, received)?,
            event: AllocationEvent::new(
                AllocationKind::moved_from(from),
                received,
                chain.timestamp(),
            ),
        })
    }
}

impl Drop for ExecutableVault {
    /// Unlocks the vault when the instance goes out of scope
    fn drop(&mut self) {
        self.unlock();
    }
}
