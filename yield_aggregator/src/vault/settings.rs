//! Vault settings, fixed at construction

use alloy_primitives::Address;
use candid::CandidType;

use crate::{
    types::InitArgs,
    utils::{common::string_to_address, error::VaultError},
};

/// Immutable settings
/// These settings are set once during initialization and never change afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VaultSettings {
    /// The only account allowed to call the mutating entry points
    pub owner: Address,
    /// The vault's own account
    pub vault: Address,
    /// The managed asset
    pub asset: Address,
    /// Aave pool addresses provider
    pub aave_pool_addresses_provider: Address,
    /// Aave protocol data provider
    pub aave_data_provider: Address,
    /// Aave pool, resolved through the addresses provider
    pub aave_pool: Address,
    /// aToken of the managed asset, resolved through the data provider
    pub aave_a_token: Address,
    /// Comet market
    pub comet: Address,
    /// Comet rewards contract
    pub comet_rewards: Address,
    /// Price feed of the managed asset
    pub asset_price_feed: Address,
}

impl VaultSettings {
    /// Sets the owner of the vault.
    pub fn owner(&mut self, owner: Address) -> &mut Self {
        self.owner = owner;
        self
    }

    /// Sets the vault's own account.
    pub fn vault(&mut self, vault: Address) -> &mut Self {
        self.vault = vault;
        self
    }

    /// Sets the managed asset.
    pub fn asset(&mut self, asset: Address) -> &mut Self {
        self.asset = asset;
        self
    }

    /// Sets the Aave pool addresses provider.
    pub fn aave_pool_addresses_provider(&mut self, provider: Address) -> &mut Self {
        self.aave_pool_addresses_provider = provider;
        self
    }

    /// Sets the Aave protocol data provider.
    pub fn aave_data_provider(&mut self, data_provider: Address) -> &mut Self {
        self.aave_data_provider = data_provider;
        self
    }

    /// Sets the resolved Aave pool.
    pub fn aave_pool(&mut self, pool: Address) -> &mut Self {
        self.aave_pool = pool;
        self
    }

    /// Sets the resolved aToken.
    pub fn aave_a_token(&mut self, a_token: Address) -> &mut Self {
        self.aave_a_token = a_token;
        self
    }

    /// Sets the Comet market.
    pub fn comet(&mut self, comet: Address) -> &mut Self {
        self.comet = comet;
        self
    }

    /// Sets the Comet rewards contract.
    pub fn comet_rewards(&mut self, comet_rewards: Address) -> &mut Self {
        self.comet_rewards = comet_rewards;
        self
    }

    /// Sets the price feed of the managed asset.
    pub fn asset_price_feed(&mut self, asset_price_feed: Address) -> &mut Self {
        self.asset_price_feed = asset_price_feed;
        self
    }
}

/// Parses the construction arguments. The Aave pool and aToken are left unset,
/// they are resolved on chain during initialization.
impl TryFrom<InitArgs> for VaultSettings {
    type Error = VaultError;

    fn try_from(value: InitArgs) -> Result<Self, Self::Error> {
        let mut settings = VaultSettings::default();
        settings
            .owner(string_to_address(value.owner)?)
            .vault(string_to_address(value.vault)?)
            .asset(string_to_address(value.asset)?)
            .aave_pool_addresses_provider(string_to_address(value.aave_pool_addresses_provider)?)
            .aave_data_provider(string_to_address(value.aave_data_provider)?)
            .comet(string_to_address(value.comet)?)
            .comet_rewards(string_to_address(value.comet_rewards)?)
            .asset_price_feed(string_to_address(value.asset_price_feed)?);
        Ok(settings)
    }
}

/// Settings as returned by the query endpoints
#[derive(Clone, Debug, Default, CandidType, PartialEq)]
pub struct VaultSettingsQuery {
    pub owner: String,
    pub vault: String,
    pub asset: String,
    pub aave_pool_addresses_provider: String,
    pub aave_data_provider: String,
    pub aave_pool: String,
    pub aave_a_token: String,
    pub comet: String,
    pub comet_rewards: String,
    pub asset_price_feed: String,
}

impl From<&VaultSettings> for VaultSettingsQuery {
    fn from(value: &VaultSettings) -> Self {
        Self {
            owner: value.owner.to_string(),
            vault: value.vault.to_string(),
            asset: value.asset.to_string(),
            aave_pool_addresses_provider: value.aave_pool_addresses_provider.to_string(),
            aave_data_provider: value.aave_data_provider.to_string(),
            aave_pool: value.aave_pool.to_string(),
            aave_a_token: value.aave_a_token.to_string(),
            comet: value.comet.to_string(),
            comet_rewards: value.comet_rewards.to_string(),
            asset_price_feed: value.asset_price_feed.to_string(),
        }
    }
}
