//! The execution environment that hosts the lending venues and the managed asset.
//!
//! Every call made by the vault goes through [`Chain`]. Calls are ABI-encoded and
//! executed synchronously. A chain must support snapshots so that an operation
//! whose later leg fails can be discarded in full. A committed operation releases
//! its snapshot.

use alloy_primitives::Address;
use candid::CandidType;
use serde::Deserialize;

/// Chain call result
pub type ChainResult<T> = Result<T, ChainError>;

/// Identifier of a chain snapshot
pub type SnapshotId = u64;

/// Chain errors
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum ChainError {
    /// The callee reverted. Carries the revert reason.
    Reverted(String),
    /// The environment could not execute the call at all
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait Chain {
    /// Executes a state-changing call on behalf of `from` and returns the raw return data.
    fn transact(&self, from: Address, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>>;

    /// Executes a read-only call and returns the raw return data.
    fn call(&self, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>>;

    /// Records the current state and returns a handle to it.
    fn snapshot(&self) -> SnapshotId;

    /// Restores the state recorded by `snapshot`, dropping everything after it.
    fn revert_to(&self, id: SnapshotId) -> ChainResult<()>;

    /// Discards the snapshot `id` and every later one, keeping the current state.
    fn release(&self, id: SnapshotId) -> ChainResult<()>;

    /// Current block timestamp in seconds
    fn timestamp(&self) -> u64;
}
