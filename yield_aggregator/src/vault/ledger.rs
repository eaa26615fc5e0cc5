//! Per-venue bookkeeping of the vault's holdings
//!
//! The ledger is a plain value. The engine derives a new ledger while an operation runs
//! and swaps it in only once every venue call has succeeded.

use alloy_primitives::U256;

use crate::{
    types::PositionsQuery,
    utils::{
        common::u256_to_nat,
        error::{arithmetic_err, VaultError, VaultResult},
    },
    venue::Venue,
};

/// Principal plus accrued interest held at each venue
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BalanceLedger {
    pub aave: U256,
    pub compound: U256,
}

impl BalanceLedger {
    pub fn position(&self, venue: Venue) -> U256 {
        match venue {
            Venue::Aave => self.aave,
            Venue::Compound => self.compound,
        }
    }

    fn position_mut(&mut self, venue: Venue) -> &mut U256 {
        match venue {
            Venue::Aave => &mut self.aave,
            Venue::Compound => &mut self.compound,
        }
    }

    pub fn total(&self) -> VaultResult<U256> {
        self.aave
            .checked_add(self.compound)
            .ok_or_else(|| arithmetic_err("Total vault value overflowed."))
    }

    /// The ledger after `amount` was supplied to `venue`
    pub fn credited(mut self, venue: Venue, amount: U256) -> VaultResult<Self> {
        let position = self.position_mut(venue);
        *position = position
            .checked_add(amount)
            .ok_or_else(|| arithmetic_err("Position overflowed."))?;
        Ok(self)
    }

    /// The ledger with `venue` set to the balance the venue reports
    pub fn reconciled(mut self, venue: Venue, live: U256) -> Self {
        *self.position_mut(venue) = live;
        self
    }

    /// The ledger after the whole position of `from` was moved and `amount` arrived at `to`
    pub fn moved(self, from: Venue, to: Venue, amount: U256) -> VaultResult<Self> {
        self.reconciled(from, U256::ZERO).credited(to, amount)
    }

    pub fn zeroed(self) -> Self {
        Self::default()
    }

    /// The venue currently holding the vault's funds.
    /// If both hold a balance, the larger one is reported.
    pub fn holder(&self) -> Option<Venue> {
        match (self.aave.is_zero(), self.compound.is_zero()) {
            (true, true) => None,
            (false, true) => Some(Venue::Aave),
            (true, false) => Some(Venue::Compound),
            (false, false) if self.aave >= self.compound => Some(Venue::Aave),
            (false, false) => Some(Venue::Compound),
        }
    }
}

impl TryFrom<&BalanceLedger> for PositionsQuery {
    type Error = VaultError;

    fn try_from(value: &BalanceLedger) -> Result<Self, Self::Error> {
        Ok(Self {
            aave: u256_to_nat(&value.aave),
            compound: u256_to_nat(&value.compound),
            total: u256_to_nat(&value.total()?),
        })
    }
}
