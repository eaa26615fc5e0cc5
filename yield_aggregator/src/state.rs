use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    constants::MAX_JOURNAL_ENTRIES,
    events::AllocationEvent,
    journal::StableJournalCollection,
    utils::{
        chain::Chain,
        error::{VaultError, VaultResult},
    },
    vault::stable::StableVault,
};

thread_local! {
    /// The vault. `None` until initialization.
    pub static VAULT_STATE: RefCell<Option<StableVault>> = RefCell::new(None);
    /// Chain the venues and the asset live on
    pub static CHAIN: RefCell<Option<Rc<dyn Chain>>> = RefCell::new(None);
    /// Append-only allocation events
    pub static EVENT_LOG: RefCell<Vec<AllocationEvent>> = RefCell::new(Vec::new());
    /// Operational journal, oldest first
    pub static JOURNAL: RefCell<VecDeque<StableJournalCollection>> = RefCell::new(VecDeque::new());
}

/// Returns a copy of the vault's state
pub fn stable_vault() -> VaultResult<StableVault> {
    VAULT_STATE.with(|state| state.borrow().clone().ok_or(VaultError::NotInitialized))
}

/// Returns the chain the vault was initialized with
pub fn chain() -> VaultResult<Rc<dyn Chain>> {
    CHAIN.with(|chain| chain.borrow().clone().ok_or(VaultError::NotInitialized))
}

pub fn set_chain(chain: Rc<dyn Chain>) {
    CHAIN.with(|binding| *binding.borrow_mut() = Some(chain));
}

/// Commits a journal collection, dropping the oldest ones beyond `MAX_JOURNAL_ENTRIES`
pub fn insert_journal_collection(collection: StableJournalCollection) {
    JOURNAL.with(|journal| {
        let mut binding = journal.borrow_mut();
        binding.push_back(collection);
        while binding.len() > MAX_JOURNAL_ENTRIES {
            binding.pop_front();
        }
    });
}

pub fn journal_collections() -> Vec<StableJournalCollection> {
    JOURNAL.with(|journal| journal.borrow().iter().cloned().collect())
}

/// Resets every piece of state of the current thread
#[cfg(test)]
pub fn clear() {
    VAULT_STATE.with(|state| *state.borrow_mut() = None);
    CHAIN.with(|chain| *chain.borrow_mut() = None);
    EVENT_LOG.with(|log| log.borrow_mut().clear());
    JOURNAL.with(|journal| journal.borrow_mut().clear());
}
