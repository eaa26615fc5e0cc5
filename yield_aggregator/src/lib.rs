//! A single-owner vault that keeps its whole WETH balance in whichever of two lending
//! venues (Aave v3, Compound v3) currently pays the higher supply yield.

pub mod api;
mod access;
mod constants;
mod events;
mod journal;
mod state;
mod types;
mod utils;
mod vault;
mod venue;

#[cfg(test)]
pub(crate) mod testing;

pub use events::{AllocationEvent, AllocationKind};
pub use journal::{JournalEntry, LogType, Operation, StableJournalCollection};
pub use types::{
    AllocationEventQuery, AssetPriceQuery, InitArgs, PositionsQuery, RewardOwedQuery, YieldQuery,
};
pub use utils::{
    chain::{Chain, ChainError, ChainResult, SnapshotId},
    error::{VaultError, VaultResult},
};
pub use vault::settings::VaultSettingsQuery;
pub use venue::Venue;
