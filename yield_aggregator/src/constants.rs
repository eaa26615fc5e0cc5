//! Yield Aggregator's Constants
//!
//! Network presets are selected with the `mainnet` (default) and `fork` features.
//! The fork preset targets a local node forked from mainnet, so the venue
//! addresses are the mainnet ones.

use alloy_primitives::U256;

/// Scale of Comet's per-second rates
pub const WAD: u128 = 1_000_000_000_000_000_000; // e18

/// Scale of Aave's rates and of the vault's normalized annual yield
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000; // e27
pub fn ray() -> U256 {
    U256::from(RAY)
}

/// Factor that lifts a wad-scaled value to ray scale without rounding
pub fn wad_to_ray_factor() -> U256 {
    U256::from(RAY / WAD)
}

/// Seconds in a 365 day year, as used by Comet's rate model
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Aave referral code passed on supply
pub const AAVE_REFERRAL_CODE: u16 = 0;

/// Fractional digits of the displayed APY percentage
pub const PERCENT_DISPLAY_DECIMALS: u32 = 4;

/// Number of journal entries kept in memory. The oldest ones are dropped first.
pub const MAX_JOURNAL_ENTRIES: usize = 1_000;

/// Chain ID
#[cfg(not(feature = "fork"))]
pub const CHAIN_ID: u64 = 1; // Ethereum mainnet
#[cfg(feature = "fork")]
pub const CHAIN_ID: u64 = 31337; // Local mainnet fork

/// Wrapped Ether
pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

/// Compound v3 WETH market (Comet)
pub const COMET: &str = "0xc3d688B66703497DAA19211EEdff47f25384cdc3";

/// Compound v3 rewards contract
pub const COMET_REWARDS: &str = "0x1B0e765F6224C21223AeA2af16c1C46E38885a40";

/// Chainlink price feed used for the managed asset
pub const WETH_PRICE_FEED: &str = "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419";

/// Aave v3 protocol data provider
pub const AAVE_PROTOCOL_DATA_PROVIDER: &str = "0x7B4EB56E7CD4b454BA8ff71E4518426369a138a3";

/// Aave v3 pool addresses provider
pub const AAVE_POOL_ADDRESSES_PROVIDER: &str = "0x2f39d218133AFaB8F2B819B1066c7E434Ad94E9e";
