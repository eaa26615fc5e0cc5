//! Vault Locking System
//!
//! Marks an operation as in progress. The lock is persisted before the first external
//! call, so any call that re-enters the vault while an operation runs finds it locked
//! and is rejected without touching state. There is no timeout: every operation
//! releases the lock on its way out, including on errors.
//!
//! ```plain
//! Lock State Machine:
//!
//!    ┌──────────┐   try_lock    ┌─────────┐
//!    │ Unlocked ├──────────────►│ Locked  │
//!    └──────────┘               └────┬────┘
//!         ▲       try_unlock(true)   │
//!         └──────────────────────────┘
//!
//! try_lock on Locked       => Err(Locked)
//! try_unlock(false)        => no change
//! ```

use candid::CandidType;
use serde::Deserialize;

use crate::utils::error::{VaultError, VaultResult};

/// Runtime lock
#[derive(Clone, Debug, Default)]
pub struct Lock {
    /// Current lock state
    pub is_locked: bool,
    /// Block timestamp at which the running operation took the lock
    pub locked_at: Option<u64>,
}

impl Lock {
    /// Attempts to acquire the lock.
    ///
    /// # Returns
    /// * `Ok(())` - Lock successfully acquired
    /// * `Err(VaultError::Locked)` - Another operation holds the lock
    pub fn try_lock(&mut self, now: u64) -> VaultResult<()> {
        if self.is_locked {
            return Err(VaultError::Locked);
        }
        self.is_locked = true;
        self.locked_at = Some(now);
        Ok(())
    }

    /// Releases the lock if the caller acquired it.
    pub fn try_unlock(&mut self, acquired_lock: bool) -> &mut Self {
        if acquired_lock {
            self.is_locked = false;
            self.locked_at = None;
        }
        self
    }
}

/// Persistent lock state
///
/// Note: Does not implement locking logic.
#[derive(Clone, Debug, Default, CandidType, Deserialize)]
pub struct StableLock {
    /// Status of the lock. `true` represents locked and `false` unlocked
    pub is_locked: bool,
    /// Block timestamp of the acquisition
    pub locked_at: Option<u64>,
}

impl From<StableLock> for Lock {
    fn from(value: StableLock) -> Self {
        Self {
            is_locked: value.is_locked,
            locked_at: value.locked_at,
        }
    }
}

impl From<Lock> for StableLock {
    fn from(value: Lock) -> Self {
        Self {
            is_locked: value.is_locked,
            locked_at: value.locked_at,
        }
    }
}
