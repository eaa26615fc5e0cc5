//! Stable vault implementation that is only used in the state

use crate::{
    state::VAULT_STATE,
    utils::error::{VaultError, VaultResult},
};

use super::{
    executable::ExecutableVault, ledger::BalanceLedger, lock::StableLock, settings::VaultSettings,
};

/// Stable vault struct
#[derive(Clone, Debug, Default)]
pub struct StableVault {
    /// Immutable settings and configurations
    pub settings: VaultSettings,
    /// Positions held at each venue
    pub ledger: BalanceLedger,
    /// Determines if an operation is currently running.
    pub lock: StableLock,
}

impl StableVault {
    /// Builder-style setter functions for the struct

    /// Set the vault settings
    pub fn settings(&mut self, settings: VaultSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Mint the vault by adding it to the state.
    /// A vault is minted exactly once.
    pub fn mint(&self) -> VaultResult<()> {
        VAULT_STATE.with(|state| {
            let mut binding = state.borrow_mut();
            if binding.is_some() {
                return Err(VaultError::AlreadyInitialized);
            }
            *binding = Some(self.clone());
            Ok(())
        })
    }
}

impl From<&ExecutableVault> for StableVault {
    fn from(value: &ExecutableVault) -> Self {
        StableVault {
            settings: value.settings.clone(),
            ledger: value.ledger,
            lock: value.lock.clone().into(),
        }
    }
}
