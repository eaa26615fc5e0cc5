//! Lending venues the vault allocates into.
//!
//! Both venues sit behind [`YieldSource`]. Each adapter owns the conversion of its
//! venue's native units, so the allocation logic only ever sees asset amounts and
//! ray-scaled annual rates.

pub(crate) mod aave;
pub(crate) mod asset;
pub(crate) mod compound;

use alloy_primitives::U256;
use candid::CandidType;
use serde::{Deserialize, Serialize};

use crate::{
    types::YieldQuery,
    utils::{
        chain::Chain,
        common::{ray_to_percent, u256_to_nat},
        error::{VaultError, VaultResult},
    },
};

/// A lending venue. `Aave` is the first-listed venue and wins ties.
#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Venue {
    Aave,
    Compound,
}

impl Venue {
    /// The venue on the other side of a move
    pub fn other(self) -> Venue {
        match self {
            Venue::Aave => Venue::Compound,
            Venue::Compound => Venue::Aave,
        }
    }
}

/// Whether a venue's balance reads are current on their own
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BalanceFreshness {
    /// The balance view accrues interest up to the current block
    Live,
    /// The balance view reads stored state; `sync` must run first
    RequiresSync,
}

/// A venue's instantaneous yield, normalized at read time. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct RateSample {
    pub venue: Venue,
    /// Annual rate scaled by 1e27 (1e27 = 100%)
    pub annualized_rate: U256,
    /// Block timestamp of the read
    pub sampled_at: u64,
}

impl RateSample {
    /// The rate in percent, truncated to four decimals
    pub fn percent(&self) -> VaultResult<String> {
        ray_to_percent(self.annualized_rate)
    }
}

impl TryFrom<RateSample> for YieldQuery {
    type Error = VaultError;

    fn try_from(value: RateSample) -> VaultResult<Self> {
        Ok(Self {
            venue: value.venue,
            annualized_rate_ray: u256_to_nat(&value.annualized_rate),
            percent: value.percent()?,
        })
    }
}

/// Uniform capability over a lending venue
pub trait YieldSource {
    fn venue(&self) -> Venue;

    fn balance_freshness(&self) -> BalanceFreshness;

    /// Touches the venue so the next balance read includes interest accrued up to now.
    fn sync(&self, chain: &dyn Chain) -> VaultResult<()>;

    /// Moves `amount` of the asset from the vault into the venue.
    fn deposit(&self, chain: &dyn Chain, amount: U256) -> VaultResult<()>;

    /// Moves `amount` of the asset from the venue back to the vault.
    /// Returns the amount the vault actually received.
    fn withdraw(&self, chain: &dyn Chain, amount: U256) -> VaultResult<U256>;

    /// Reads the vault's balance at the venue without synchronizing first.
    fn read_balance(&self, chain: &dyn Chain) -> VaultResult<U256>;

    fn current_annualized_yield(&self, chain: &dyn Chain) -> VaultResult<RateSample>;

    /// The vault's principal plus accrued interest, synchronizing first when the venue needs it.
    fn current_balance(&self, chain: &dyn Chain) -> VaultResult<U256> {
        if self.balance_freshness() == BalanceFreshness::RequiresSync {
            self.sync(chain)?;
        }
        self.read_balance(chain)
    }
}
