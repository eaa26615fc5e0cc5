//! Single-owner access gate

use alloy_primitives::Address;

use crate::{
    utils::error::{VaultError, VaultResult},
    vault::settings::VaultSettings,
};

/// Rejects every caller but the owner
pub fn only_owner(caller: Address, settings: &VaultSettings) -> VaultResult<()> {
    if caller == settings.owner {
        Ok(())
    } else {
        Err(VaultError::AccessDenied)
    }
}
