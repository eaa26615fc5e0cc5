//! Compound v3 (Comet) adapter
//!
//! `balanceOf` is computed from the market's stored supply index, so interest accrued
//! since the last state-touching call is missing from it. The adapter calls
//! `accrueAccount(vault)` before every balance read that has to be current.
//!
//! Comet quotes supply rates per second, scaled by 1e18. The annual ray-scaled rate is
//! `rate * SECONDS_PER_YEAR * 1e9`: an exact integer product, so no rounding enters the
//! comparison against Aave.

use alloy_primitives::{Address, U256};

use crate::{
    constants::{wad_to_ray_factor, SECONDS_PER_YEAR},
    types::{IComet, ICometRewards, IPriceFeed},
    utils::{
        chain::Chain,
        error::{arithmetic_err, VaultResult},
        transaction_builder::TransactionBuilder,
    },
    vault::settings::VaultSettings,
};

use super::{asset::Erc20Asset, BalanceFreshness, RateSample, Venue, YieldSource};

#[derive(Clone, Debug, Default)]
pub struct CompoundAdapter {
    vault: Address,
    asset: Address,
    comet: Address,
    rewards: Address,
    price_feed: Address,
}

/// Rewards accrued by the vault in the Comet rewards contract
#[derive(Clone, Debug, PartialEq)]
pub struct RewardOwed {
    pub token: Address,
    pub owed: U256,
}

/// Latest answer of the asset price feed
#[derive(Clone, Debug, PartialEq)]
pub struct AssetPrice {
    pub answer: alloy_primitives::I256,
    pub decimals: u8,
    pub updated_at: U256,
}

/// Converts Comet's per-second, wad-scaled rate into the ray-scaled annual rate
pub fn annualize_per_second_rate(rate_per_second: u64) -> VaultResult<U256> {
    U256::from(rate_per_second)
        .checked_mul(U256::from(SECONDS_PER_YEAR))
        .and_then(|rate| rate.checked_mul(wad_to_ray_factor()))
        .ok_or_else(|| arithmetic_err("Annualized Comet rate overflowed."))
}

impl CompoundAdapter {
    pub fn new(settings: &VaultSettings) -> Self {
        Self {
            vault: settings.vault,
            asset: settings.asset,
            comet: settings.comet,
            rewards: settings.comet_rewards,
            price_feed: settings.asset_price_feed,
        }
    }

    fn asset(&self) -> Erc20Asset {
        Erc20Asset::new(self.asset, self.vault)
    }

    /// Rewards owed to the vault. State-touching: Comet accrues the account first.
    pub fn reward_owed(&self, chain: &dyn Chain) -> VaultResult<RewardOwed> {
        let owed = TransactionBuilder::default()
            .from(self.vault)
            .to(self.rewards)
            .call_data(&ICometRewards::getRewardOwedCall {
                comet: self.comet,
                account: self.vault,
            })
            .send_decoded::<ICometRewards::getRewardOwedCall>(chain)?;

        Ok(RewardOwed {
            token: owed.token,
            owed: owed.owed,
        })
    }

    /// Latest price of the managed asset
    pub fn asset_price(&self, chain: &dyn Chain) -> VaultResult<AssetPrice> {
        let decimals = TransactionBuilder::default()
            .to(self.price_feed)
            .call_data(&IPriceFeed::decimalsCall {})
            .query::<IPriceFeed::decimalsCall>(chain)?
            ._0;
        let round = TransactionBuilder::default()
            .to(self.price_feed)
            .call_data(&IPriceFeed::latestRoundDataCall {})
            .query::<IPriceFeed::latestRoundDataCall>(chain)?;

        Ok(AssetPrice {
            answer: round.answer,
            decimals,
            updated_at: round.updatedAt,
        })
    }
}

impl YieldSource for CompoundAdapter {
    fn venue(&self) -> Venue {
        Venue::Compound
    }

    fn balance_freshness(&self) -> BalanceFreshness {
        BalanceFreshness::RequiresSync
    }

    fn sync(&self, chain: &dyn Chain) -> VaultResult<()> {
        TransactionBuilder::default()
            .from(self.vault)
            .to(self.comet)
            .call_data(&IComet::accrueAccountCall {
                account: self.vault,
            })
            .send(chain)?;
        Ok(())
    }

    fn deposit(&self, chain: &dyn Chain, amount: U256) -> VaultResult<()> {
        self.asset().approve(chain, self.comet, amount)?;
        TransactionBuilder::default()
            .from(self.vault)
            .to(self.comet)
            .call_data(&IComet::supplyCall {
                asset: self.asset,
                amount,
            })
            .send(chain)?;
        Ok(())
    }

    fn withdraw(&self, chain: &dyn Chain, amount: U256) -> VaultResult<U256> {
        self.asset().received_during(chain, || {
            TransactionBuilder::default()
                .from(self.vault)
                .to(self.comet)
                .call_data(&IComet::withdrawCall {
                    asset: self.asset,
                    amount,
                })
                .send(chain)
                .map(|_| ())
        })
    }

    fn read_balance(&self, chain: &dyn Chain) -> VaultResult<U256> {
        TransactionBuilder::default()
            .to(self.comet)
            .call_data(&IComet::balanceOfCall {
                account: self.vault,
            })
            .query::<IComet::balanceOfCall>(chain)
            .map(|data| data._0)
    }

    fn current_annualized_yield(&self, chain: &dyn Chain) -> VaultResult<RateSample> {
        let utilization = TransactionBuilder::default()
            .to(self.comet)
            .call_data(&IComet::getUtilizationCall {})
            .query::<IComet::getUtilizationCall>(chain)?
            ._0;
        let rate_per_second = TransactionBuilder::default()
            .to(self.comet)
            .call_data(&IComet::getSupplyRateCall { utilization })
            .query::<IComet::getSupplyRateCall>(chain)?
            ._0;

        Ok(RateSample {
            venue: self.venue(),
            annualized_rate: annualize_per_second_rate(rate_per_second)?,
            sampled_at: chain.timestamp(),
        })
    }
}
