//! Allocation event log
//!
//! One event per successful deposit, withdrawal or rebalance. Events are only appended
//! after the operation has committed and are never modified. Each one renders as the
//! EVM log the corresponding Solidity event would produce.

use alloy_primitives::{LogData, U256};
use alloy_sol_types::SolEvent;
use candid::CandidType;
use serde::{Deserialize, Serialize};

use crate::{
    state::EVENT_LOG,
    types::{
        AllocationEventQuery, FundsDepositedToAave, FundsDepositedToCompound,
        FundsMovedFromAaveToCompound, FundsMovedFromCompoundToAave, FundsWithdrawn,
    },
    utils::error::{VaultError, VaultResult},
    venue::Venue,
};

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AllocationKind {
    DepositedToAave,
    DepositedToCompound,
    Withdrawn,
    MovedFromAaveToCompound,
    MovedFromCompoundToAave,
}

fn event_name(signature: &'static str) -> &'static str {
    signature.split('(').next().unwrap_or(signature)
}

impl AllocationKind {
    pub fn deposited_to(venue: Venue) -> Self {
        match venue {
            Venue::Aave => AllocationKind::DepositedToAave,
            Venue::Compound => AllocationKind::DepositedToCompound,
        }
    }

    /// A move out of `venue` into the other one
    pub fn moved_from(venue: Venue) -> Self {
        match venue {
            Venue::Aave => AllocationKind::MovedFromAaveToCompound,
            Venue::Compound => AllocationKind::MovedFromCompoundToAave,
        }
    }

    /// Name of the Solidity event, e.g. `FundsWithdrawn`
    pub fn name(&self) -> &'static str {
        match self {
            AllocationKind::DepositedToAave => event_name(FundsDepositedToAave::SIGNATURE),
            AllocationKind::DepositedToCompound => event_name(FundsDepositedToCompound::SIGNATURE),
            AllocationKind::Withdrawn => event_name(FundsWithdrawn::SIGNATURE),
            AllocationKind::MovedFromAaveToCompound => {
                event_name(FundsMovedFromAaveToCompound::SIGNATURE)
            }
            AllocationKind::MovedFromCompoundToAave => {
                event_name(FundsMovedFromCompoundToAave::SIGNATURE)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AllocationEvent {
    pub kind: AllocationKind,
    pub amount: U256,
    /// Block timestamp of the operation
    pub timestamp: u64,
}

impl AllocationEvent {
    pub fn new(kind: AllocationKind, amount: U256, timestamp: u64) -> Self {
        Self {
            kind,
            amount,
            timestamp,
        }
    }

    /// The EVM log of this event: `topic0` is the signature hash, the data the ABI-encoded amount
    pub fn log_data(&self) -> LogData {
        let amount = self.amount;
        match self.kind {
            AllocationKind::DepositedToAave => FundsDepositedToAave { amount }.encode_log_data(),
            AllocationKind::DepositedToCompound => {
                FundsDepositedToCompound { amount }.encode_log_data()
            }
            AllocationKind::Withdrawn => FundsWithdrawn { amount }.encode_log_data(),
            AllocationKind::MovedFromAaveToCompound => {
                FundsMovedFromAaveToCompound { amount }.encode_log_data()
            }
            AllocationKind::MovedFromCompoundToAave => {
                FundsMovedFromCompoundToAave { amount }.encode_log_data()
            }
        }
    }

    /// Appends the event to the log
    pub fn record(self) {
        EVENT_LOG.with(|log| log.borrow_mut().push(self));
    }
}

impl From<&AllocationEvent> for AllocationEventQuery {
    fn from(value: &AllocationEvent) -> Self {
        Self {
            name: value.kind.name().to_string(),
            amount: value.amount.to_string(),
            timestamp: value.timestamp,
        }
    }
}

/// All recorded events, oldest first
pub fn recorded_events() -> Vec<AllocationEvent> {
    EVENT_LOG.with(|log| log.borrow().clone())
}

/// Renders events as a JSON array for off-chain consumers
pub fn events_to_json(events: &[AllocationEventQuery]) -> VaultResult<String> {
    serde_json::to_string(events).map_err(|err| VaultError::Custom(err.to_string()))
}
