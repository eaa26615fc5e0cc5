//! Aave v3 adapter (first-listed venue)
//!
//! Balances are read from the aToken, whose `balanceOf` scales the stored balance by
//! the liquidity index at the current block. No synchronization is needed.
//! The data provider reports `liquidityRate` as a ray-scaled APR, which already is the
//! vault's common basis, so the rate is used without conversion.

use alloy_primitives::{Address, U256};

use crate::{
    constants::AAVE_REFERRAL_CODE,
    types::{IAToken, IPool, IPoolAddressesProvider, IPoolDataProvider},
    utils::{chain::Chain, error::VaultResult, transaction_builder::TransactionBuilder},
    vault::settings::VaultSettings,
};

use super::{asset::Erc20Asset, BalanceFreshness, RateSample, Venue, YieldSource};

#[derive(Clone, Debug, Default)]
pub struct AaveAdapter {
    vault: Address,
    asset: Address,
    pool: Address,
    a_token: Address,
    data_provider: Address,
}

/// Pool and aToken addresses resolved at construction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AaveDeployment {
    pub pool: Address,
    pub a_token: Address,
}

impl AaveAdapter {
    pub fn new(settings: &VaultSettings) -> Self {
        Self {
            vault: settings.vault,
            asset: settings.asset,
            pool: settings.aave_pool,
            a_token: settings.aave_a_token,
            data_provider: settings.aave_data_provider,
        }
    }

    /// Looks up the pool behind the addresses provider and the aToken of `asset`.
    pub fn resolve(
        chain: &dyn Chain,
        addresses_provider: Address,
        data_provider: Address,
        asset: Address,
    ) -> VaultResult<AaveDeployment> {
        let pool = TransactionBuilder::default()
            .to(addresses_provider)
            .call_data(&IPoolAddressesProvider::getPoolCall {})
            .query::<IPoolAddressesProvider::getPoolCall>(chain)?
            ._0;

        let a_token = TransactionBuilder::default()
            .to(data_provider)
            .call_data(&IPoolDataProvider::getReserveTokensAddressesCall { asset })
            .query::<IPoolDataProvider::getReserveTokensAddressesCall>(chain)?
            .aTokenAddress;

        Ok(AaveDeployment { pool, a_token })
    }

    fn asset(&self) -> Erc20Asset {
        Erc20Asset::new(self.asset, self.vault)
    }
}

impl YieldSource for AaveAdapter {
    fn venue(&self) -> Venue {
        Venue::Aave
    }

    fn balance_freshness(&self) -> BalanceFreshness {
        BalanceFreshness::Live
    }

    fn sync(&self, _chain: &dyn Chain) -> VaultResult<()> {
        Ok(())
    }

    fn deposit(&self, chain: &dyn Chain, amount: U256) -> VaultResult<()> {
        self.asset().approve(chain, self.pool, amount)?;
        TransactionBuilder::default()
            .from(self.vault)
            .to(self.pool)
            .call_data(&IPool::supplyCall {
                asset: self.asset,
                amount,
                onBehalfOf: self.vault,
                referralCode: AAVE_REFERRAL_CODE,
            })
            .send(chain)?;
        Ok(())
    }

    fn withdraw(&self, chain: &dyn Chain, amount: U256) -> VaultResult<U256> {
        self.asset().received_during(chain, || {
            TransactionBuilder::default()
                .from(self.vault)
                .to(self.pool)
                .call_data(&IPool::withdrawCall {
                    asset: self.asset,
                    amount,
                    to: self.vault,
                })
                .send_decoded::<IPool::withdrawCall>(chain)
                .map(|_| ())
        })
    }

    fn read_balance(&self, chain: &dyn Chain) -> VaultResult<U256> {
        TransactionBuilder::default()
            .to(self.a_token)
            .call_data(&IAToken::balanceOfCall {
                account: self.vault,
            })
            .query::<IAToken::balanceOfCall>(chain)
            .map(|data| data._0)
    }

    fn current_annualized_yield(&self, chain: &dyn Chain) -> VaultResult<RateSample> {
        let reserve = TransactionBuilder::default()
            .to(self.data_provider)
            .call_data(&IPoolDataProvider::getReserveDataCall { asset: self.asset })
            .query::<IPoolDataProvider::getReserveDataCall>(chain)?;

        Ok(RateSample {
            venue: self.venue(),
            annualized_rate: reserve.liquidityRate,
            sampled_at: chain.timestamp(),
        })
    }
}
