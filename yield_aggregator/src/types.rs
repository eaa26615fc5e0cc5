use alloy_sol_types::sol;
use candid::{CandidType, Nat};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        AAVE_POOL_ADDRESSES_PROVIDER, AAVE_PROTOCOL_DATA_PROVIDER, CHAIN_ID, COMET,
        COMET_REWARDS, WETH, WETH_PRICE_FEED,
    },
    venue::Venue,
};

/// Construction arguments. Every address is fixed for the lifetime of the vault.
#[derive(CandidType, Clone, Debug, Deserialize)]
pub struct InitArgs {
    /// The only account allowed to deposit, withdraw and rebalance
    pub owner: String,
    /// The vault's own account on the chain
    pub vault: String,
    /// The managed asset (WETH)
    pub asset: String,
    pub aave_pool_addresses_provider: String,
    pub aave_data_provider: String,
    pub comet: String,
    pub comet_rewards: String,
    pub asset_price_feed: String,
}

impl InitArgs {
    /// Builds the arguments from the network preset compiled into the crate
    pub fn from_network_preset(owner: String, vault: String) -> Self {
        Self {
            owner,
            vault,
            asset: WETH.to_string(),
            aave_pool_addresses_provider: AAVE_POOL_ADDRESSES_PROVIDER.to_string(),
            aave_data_provider: AAVE_PROTOCOL_DATA_PROVIDER.to_string(),
            comet: COMET.to_string(),
            comet_rewards: COMET_REWARDS.to_string(),
            asset_price_feed: WETH_PRICE_FEED.to_string(),
        }
    }

    /// Chain ID of the compiled network preset
    pub fn preset_chain_id() -> u64 {
        CHAIN_ID
    }
}

/// A venue's yield, as returned by the query endpoints
#[derive(CandidType, Clone, Debug, PartialEq)]
pub struct YieldQuery {
    pub venue: Venue,
    /// Annual rate scaled by 1e27
    pub annualized_rate_ray: Nat,
    /// Annual rate in percent, truncated to four decimals
    pub percent: String,
}

/// Ledger positions, as returned by the query endpoints
#[derive(CandidType, Clone, Debug, PartialEq)]
pub struct PositionsQuery {
    pub aave: Nat,
    pub compound: Nat,
    pub total: Nat,
}

/// Allocation event, as returned by the query endpoints
#[derive(CandidType, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationEventQuery {
    /// Event name, e.g. `FundsDepositedToAave`
    pub name: String,
    pub amount: String,
    pub timestamp: u64,
}

/// Compound rewards accrued to the vault
#[derive(CandidType, Clone, Debug, PartialEq)]
pub struct RewardOwedQuery {
    pub token: String,
    pub owed: Nat,
}

/// Latest asset price reported by the price feed
#[derive(CandidType, Clone, Debug, PartialEq)]
pub struct AssetPriceQuery {
    pub answer: String,
    pub decimals: u8,
    pub updated_at: Nat,
}

sol!(
    // Wrapped Ether (WETH9)
    #[derive(Debug)]
    interface IWETH {
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
);

sol!(
    // Aave v3
    interface IPoolAddressesProvider {
        function getPool() external view returns (address);
    }
);

sol!(
    interface IPoolDataProvider {
        function getReserveData(address asset) external view returns (
            uint256 unbacked,
            uint256 accruedToTreasuryScaled,
            uint256 totalAToken,
            uint256 totalStableDebt,
            uint256 totalVariableDebt,
            uint256 liquidityRate,
            uint256 variableBorrowRate,
            uint256 stableBorrowRate,
            uint256 averageStableBorrowRate,
            uint256 liquidityIndex,
            uint256 variableBorrowIndex,
            uint40 lastUpdateTimestamp
        );
        function getReserveTokensAddresses(address asset) external view returns (
            address aTokenAddress,
            address stableDebtTokenAddress,
            address variableDebtTokenAddress
        );
    }
);

sol!(
    interface IPool {
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function withdraw(address asset, uint256 amount, address to) external returns (uint256);
    }
);

sol!(
    interface IAToken {
        function balanceOf(address account) external view returns (uint256);
    }
);

sol!(
    // Compound v3
    interface IComet {
        function supply(address asset, uint256 amount) external;
        function withdraw(address asset, uint256 amount) external;
        function balanceOf(address account) external view returns (uint256);
        function accrueAccount(address account) external;
        function getUtilization() external view returns (uint256);
        function getSupplyRate(uint256 utilization) external view returns (uint64);
    }
);

sol!(
    interface ICometRewards {
        function getRewardOwed(address comet, address account) external returns (address token, uint256 owed);
    }
);

sol!(
    // Chainlink aggregator
    interface IPriceFeed {
        function decimals() external view returns (uint8);
        function latestRoundData() external view returns (
            uint80 roundId,
            int256 answer,
            uint256 startedAt,
            uint256 updatedAt,
            uint80 answeredInRound
        );
    }
);

sol!(
    // Allocation events
    event FundsDepositedToAave(uint256 amount);
    event FundsDepositedToCompound(uint256 amount);
    event FundsWithdrawn(uint256 amount);
    event FundsMovedFromAaveToCompound(uint256 amount);
    event FundsMovedFromCompoundToAave(uint256 amount);
);
