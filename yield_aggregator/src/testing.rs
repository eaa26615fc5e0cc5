//! In-memory chain used by the tests.
//!
//! Simulates WETH, an Aave v3 reserve (pool, data provider, aToken), a Comet market,
//! the Comet rewards contract and a Chainlink feed. Aave balances accrue in real time,
//! Comet balances only move when the market index is accrued, like the adapters expect.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

use alloy_primitives::{Address, I256, U256};
use alloy_sol_types::{SolCall, SolInterface};

use crate::{
    api,
    constants::{ray, SECONDS_PER_YEAR, WAD},
    types::*,
    utils::chain::{Chain, ChainError, ChainResult, SnapshotId},
};

/// Callback invoked before every state-changing call reaches its target
pub(crate) type Hook = Rc<dyn Fn(Address, &[u8])>;

/// Comet's rate scale
pub(crate) fn wad() -> U256 {
    U256::from(WAD)
}

/// 1 ether
pub(crate) fn ether(amount: u64) -> U256 {
    U256::from(amount) * wad()
}

/// Annual rate in basis points, scaled to a ray
pub(crate) fn ray_bps(bps: u64) -> U256 {
    ray() * U256::from(bps) / U256::from(10_000)
}

/// Contract addresses of the simulated deployment
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deployment {
    pub weth: Address,
    pub aave_addresses_provider: Address,
    pub aave_data_provider: Address,
    pub aave_pool: Address,
    pub a_token: Address,
    pub comet: Address,
    pub comet_rewards: Address,
    pub comp: Address,
    pub price_feed: Address,
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            weth: Address::repeat_byte(0xe0),
            aave_addresses_provider: Address::repeat_byte(0xa0),
            aave_data_provider: Address::repeat_byte(0xa1),
            aave_pool: Address::repeat_byte(0xa2),
            a_token: Address::repeat_byte(0xa3),
            comet: Address::repeat_byte(0xc0),
            comet_rewards: Address::repeat_byte(0xc1),
            comp: Address::repeat_byte(0xc2),
            price_feed: Address::repeat_byte(0xf0),
        }
    }
}

#[derive(Clone)]
struct World {
    timestamp: u64,
    weth: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    aave_rate: U256,
    aave_index: U256,
    aave_updated_at: u64,
    aave_scaled: HashMap<Address, U256>,
    comet_rate: u64,
    comet_utilization: U256,
    comet_index: U256,
    comet_accrued_at: u64,
    comet_principal: HashMap<Address, U256>,
    rewards_owed: HashMap<Address, U256>,
    price: I256,
    illiquid: Vec<Address>,
    failures: HashMap<(Address, [u8; 4]), String>,
}

fn revert<T>(reason: &str) -> ChainResult<T> {
    Err(ChainError::Reverted(reason.to_string()))
}

fn bad_calldata(err: alloy_sol_types::Error) -> ChainError {
    ChainError::Reverted(format!("bad calldata: {}", err))
}

fn ceil_div(a: U256, b: U256) -> U256 {
    (a + b - U256::from(1)) / b
}

impl World {
    fn new() -> Self {
        Self {
            timestamp: 1_700_000_000,
            weth: HashMap::new(),
            allowances: HashMap::new(),
            aave_rate: U256::ZERO,
            aave_index: ray(),
            aave_updated_at: 1_700_000_000,
            aave_scaled: HashMap::new(),
            comet_rate: 0,
            comet_utilization: wad() * U256::from(80) / U256::from(100),
            comet_index: wad(),
            comet_accrued_at: 1_700_000_000,
            comet_principal: HashMap::new(),
            rewards_owed: HashMap::new(),
            price: I256::from_raw(U256::from(200_000_000_000_u64)),
            illiquid: Vec::new(),
            failures: HashMap::new(),
        }
    }

    fn weth_of(&self, account: Address) -> U256 {
        self.weth.get(&account).copied().unwrap_or_default()
    }

    fn move_weth(&mut self, from: Address, to: Address, amount: U256) -> ChainResult<()> {
        let balance = self.weth_of(from);
        if balance < amount {
            return revert("WETH: insufficient balance");
        }
        self.weth.insert(from, balance - amount);
        *self.weth.entry(to).or_default() += amount;
        Ok(())
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) -> ChainResult<()> {
        let allowance = self
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return revert("WETH: insufficient allowance");
        }
        self.allowances.insert((owner, spender), allowance - amount);
        Ok(())
    }

    /// Venue pays `amount` out. Interest is minted to the venue when its reserves fall short.
    fn pay_out(&mut self, venue: Address, to: Address, amount: U256) -> ChainResult<()> {
        if self.illiquid.contains(&venue) {
            return revert("insufficient liquidity");
        }
        let reserves = self.weth_of(venue);
        if reserves < amount {
            self.weth.insert(venue, amount);
        }
        self.move_weth(venue, to, amount)
    }

    fn aave_current_index(&self) -> U256 {
        let elapsed = U256::from(self.timestamp - self.aave_updated_at);
        self.aave_index
            + self.aave_index * self.aave_rate * elapsed / (ray() * U256::from(SECONDS_PER_YEAR))
    }

    fn accrue_aave(&mut self) {
        self.aave_index = self.aave_current_index();
        self.aave_updated_at = self.timestamp;
    }

    fn aave_balance(&self, account: Address) -> U256 {
        let scaled = self.aave_scaled.get(&account).copied().unwrap_or_default();
        scaled * self.aave_current_index() / ray()
    }

    fn accrue_comet(&mut self) {
        let elapsed = U256::from(self.timestamp - self.comet_accrued_at);
        self.comet_index += self.comet_index * U256::from(self.comet_rate) * elapsed / wad();
        self.comet_accrued_at = self.timestamp;
    }

    /// Balance at the stored index
    fn comet_balance(&self, account: Address) -> U256 {
        let principal = self
            .comet_principal
            .get(&account)
            .copied()
            .unwrap_or_default();
        principal * self.comet_index / wad()
    }
}

pub(crate) struct FakeChain {
    pub deployment: Deployment,
    world: RefCell<World>,
    snapshots: RefCell<Vec<World>>,
    hook: RefCell<Option<Hook>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            deployment: Deployment::default(),
            world: RefCell::new(World::new()),
            snapshots: RefCell::new(Vec::new()),
            hook: RefCell::new(None),
        }
    }

    /// Sets Aave's liquidity rate (ray-scaled APR). Interest up to now accrues at the old rate.
    pub fn set_aave_rate(&self, rate: U256) {
        let mut world = self.world.borrow_mut();
        world.accrue_aave();
        world.aave_rate = rate;
    }

    /// Sets Comet's per-second supply rate (wad-scaled). Interest up to now accrues at the old rate.
    pub fn set_compound_rate(&self, rate_per_second: u64) {
        let mut world = self.world.borrow_mut();
        world.accrue_comet();
        world.comet_rate = rate_per_second;
    }

    pub fn advance_time(&self, seconds: u64) {
        self.world.borrow_mut().timestamp += seconds;
    }

    pub fn mint_weth(&self, account: Address, amount: U256) {
        *self.world.borrow_mut().weth.entry(account).or_default() += amount;
    }

    pub fn weth_balance(&self, account: Address) -> U256 {
        self.world.borrow().weth_of(account)
    }

    /// Live Aave balance of `account`
    pub fn aave_balance(&self, account: Address) -> U256 {
        self.world.borrow().aave_balance(account)
    }

    /// Comet balance of `account` at the stored index
    pub fn comet_stored_balance(&self, account: Address) -> U256 {
        self.world.borrow().comet_balance(account)
    }

    /// Makes every call of `selector` on `contract` revert with `reason`
    pub fn fail_calls(&self, contract: Address, selector: [u8; 4], reason: &str) {
        self.world
            .borrow_mut()
            .failures
            .insert((contract, selector), reason.to_string());
    }

    pub fn clear_failures(&self) {
        self.world.borrow_mut().failures.clear();
    }

    /// The venue refuses to pay anything out
    pub fn set_illiquid(&self, venue: Address) {
        self.world.borrow_mut().illiquid.push(venue);
    }

    pub fn set_reward_owed(&self, account: Address, owed: U256) {
        self.world.borrow_mut().rewards_owed.insert(account, owed);
    }

    pub fn set_hook(&self, hook: Hook) {
        *self.hook.borrow_mut() = Some(hook);
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.borrow().len()
    }

    fn execute(
        &self,
        world: &mut World,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> ChainResult<Vec<u8>> {
        if data.len() >= 4 {
            let selector = [data[0], data[1], data[2], data[3]];
            if let Some(reason) = world.failures.get(&(to, selector)) {
                return revert(reason);
            }
        }

        let d = self.deployment;
        if to == d.weth {
            self.execute_weth(world, from, data)
        } else if to == d.aave_addresses_provider {
            IPoolAddressesProvider::getPoolCall::abi_decode(data, true).map_err(bad_calldata)?;
            Ok(IPoolAddressesProvider::getPoolCall::abi_encode_returns(&(d.aave_pool,)))
        } else if to == d.aave_data_provider {
            self.execute_aave_data_provider(world, data)
        } else if to == d.aave_pool {
            self.execute_aave_pool(world, from, data)
        } else if to == d.a_token {
            let call = IAToken::balanceOfCall::abi_decode(data, true).map_err(bad_calldata)?;
            Ok(IAToken::balanceOfCall::abi_encode_returns(&(
                world.aave_balance(call.account),
            )))
        } else if to == d.comet {
            self.execute_comet(world, from, data)
        } else if to == d.comet_rewards {
            let call =
                ICometRewards::getRewardOwedCall::abi_decode(data, true).map_err(bad_calldata)?;
            let owed = world
                .rewards_owed
                .get(&call.account)
                .copied()
                .unwrap_or_default();
            Ok(ICometRewards::getRewardOwedCall::abi_encode_returns(&(d.comp, owed)))
        } else if to == d.price_feed {
            self.execute_price_feed(world, data)
        } else {
            revert("call to non-contract")
        }
    }

    fn execute_weth(&self, world: &mut World, from: Address, data: &[u8]) -> ChainResult<Vec<u8>> {
        match IWETH::IWETHCalls::abi_decode(data, true).map_err(bad_calldata)? {
            IWETH::IWETHCalls::approve(call) => {
                world.allowances.insert((from, call.spender), call.amount);
                Ok(IWETH::approveCall::abi_encode_returns(&(true,)))
            }
            IWETH::IWETHCalls::transfer(call) => {
                world.move_weth(from, call.to, call.amount)?;
                Ok(IWETH::transferCall::abi_encode_returns(&(true,)))
            }
            IWETH::IWETHCalls::transferFrom(call) => {
                world.spend_allowance(call.from, from, call.amount)?;
                world.move_weth(call.from, call.to, call.amount)?;
                Ok(IWETH::transferFromCall::abi_encode_returns(&(true,)))
            }
            IWETH::IWETHCalls::balanceOf(call) => Ok(IWETH::balanceOfCall::abi_encode_returns(&(
                world.weth_of(call.account),
            ))),
        }
    }

    fn execute_aave_data_provider(&self, world: &mut World, data: &[u8]) -> ChainResult<Vec<u8>> {
        match IPoolDataProvider::IPoolDataProviderCalls::abi_decode(data, true)
            .map_err(bad_calldata)?
        {
            IPoolDataProvider::IPoolDataProviderCalls::getReserveData(call) => {
                if call.asset != self.deployment.weth {
                    return revert("reserve not listed");
                }
                let total_a_token = world
                    .aave_scaled
                    .values()
                    .fold(U256::ZERO, |acc, scaled| acc + *scaled)
                    * world.aave_current_index()
                    / ray();
                Ok(IPoolDataProvider::getReserveDataCall::abi_encode_returns(&(
                    U256::ZERO,
                    U256::ZERO,
                    total_a_token,
                    U256::ZERO,
                    U256::ZERO,
                    world.aave_rate,
                    U256::ZERO,
                    U256::ZERO,
                    U256::ZERO,
                    world.aave_current_index(),
                    ray(),
                    world.aave_updated_at,
                )))
            }
            IPoolDataProvider::IPoolDataProviderCalls::getReserveTokensAddresses(call) => {
                if call.asset != self.deployment.weth {
                    return revert("reserve not listed");
                }
                Ok(
                    IPoolDataProvider::getReserveTokensAddressesCall::abi_encode_returns(&(
                        self.deployment.a_token,
                        Address::ZERO,
                        Address::ZERO,
                    )),
                )
            }
        }
    }

    fn execute_aave_pool(&self, world: &mut World, from: Address, data: &[u8]) -> ChainResult<Vec<u8>> {
        let pool = self.deployment.aave_pool;
        match IPool::IPoolCalls::abi_decode(data, true).map_err(bad_calldata)? {
            IPool::IPoolCalls::supply(call) => {
                if call.asset != self.deployment.weth {
                    return revert("reserve not listed");
                }
                world.accrue_aave();
                world.spend_allowance(from, pool, call.amount)?;
                world.move_weth(from, pool, call.amount)?;
                let scaled = call.amount * ray() / world.aave_index;
                *world.aave_scaled.entry(call.onBehalfOf).or_default() += scaled;
                Ok(Vec::new())
            }
            IPool::IPoolCalls::withdraw(call) => {
                world.accrue_aave();
                let balance = world.aave_balance(from);
                let amount = if call.amount == U256::MAX {
                    balance
                } else {
                    call.amount
                };
                if amount > balance {
                    return revert("NOT_ENOUGH_AVAILABLE_USER_BALANCE");
                }
                let burned = ceil_div(amount * ray(), world.aave_index);
                let scaled = world.aave_scaled.entry(from).or_default();
                *scaled = scaled.saturating_sub(burned);
                world.pay_out(pool, call.to, amount)?;
                Ok(IPool::withdrawCall::abi_encode_returns(&(amount,)))
            }
        }
    }

    fn execute_comet(&self, world: &mut World, from: Address, data: &[u8]) -> ChainResult<Vec<u8>> {
        let comet = self.deployment.comet;
        match IComet::ICometCalls::abi_decode(data, true).map_err(bad_calldata)? {
            IComet::ICometCalls::supply(call) => {
                if call.asset != self.deployment.weth {
                    return revert("bad asset");
                }
                world.accrue_comet();
                world.spend_allowance(from, comet, call.amount)?;
                world.move_weth(from, comet, call.amount)?;
                let principal = call.amount * wad() / world.comet_index;
                *world.comet_principal.entry(from).or_default() += principal;
                Ok(Vec::new())
            }
            IComet::ICometCalls::withdraw(call) => {
                world.accrue_comet();
                if call.amount > world.comet_balance(from) {
                    return revert("insufficient balance");
                }
                let burned = ceil_div(call.amount * wad(), world.comet_index);
                let principal = world.comet_principal.entry(from).or_default();
                *principal = principal.saturating_sub(burned);
                world.pay_out(comet, from, call.amount)?;
                Ok(Vec::new())
            }
            IComet::ICometCalls::balanceOf(call) => Ok(IComet::balanceOfCall::abi_encode_returns(
                &(world.comet_balance(call.account),),
            )),
            IComet::ICometCalls::accrueAccount(_) => {
                world.accrue_comet();
                Ok(Vec::new())
            }
            IComet::ICometCalls::getUtilization(_) => Ok(
                IComet::getUtilizationCall::abi_encode_returns(&(world.comet_utilization,)),
            ),
            IComet::ICometCalls::getSupplyRate(call) => {
                if call.utilization != world.comet_utilization {
                    return revert("unexpected utilization");
                }
                Ok(IComet::getSupplyRateCall::abi_encode_returns(&(world.comet_rate,)))
            }
        }
    }

    fn execute_price_feed(&self, world: &mut World, data: &[u8]) -> ChainResult<Vec<u8>> {
        match IPriceFeed::IPriceFeedCalls::abi_decode(data, true).map_err(bad_calldata)? {
            IPriceFeed::IPriceFeedCalls::decimals(_) => {
                Ok(IPriceFeed::decimalsCall::abi_encode_returns(&(8u8,)))
            }
            IPriceFeed::IPriceFeedCalls::latestRoundData(_) => {
                let now = U256::from(world.timestamp);
                Ok(IPriceFeed::latestRoundDataCall::abi_encode_returns(&(
                    1u128,
                    world.price,
                    now,
                    now,
                    1u128,
                )))
            }
        }
    }
}

impl Chain for FakeChain {
    fn transact(&self, from: Address, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        let hook = self.hook.borrow().clone();
        if let Some(hook) = hook {
            hook(to, &data);
        }

        // A reverted call leaves no trace
        let mut next = self.world.borrow().clone();
        let output = self.execute(&mut next, from, to, &data)?;
        *self.world.borrow_mut() = next;
        Ok(output)
    }

    fn call(&self, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        let mut scratch = self.world.borrow().clone();
        self.execute(&mut scratch, Address::ZERO, to, &data)
    }

    fn snapshot(&self) -> SnapshotId {
        let mut snapshots = self.snapshots.borrow_mut();
        snapshots.push(self.world.borrow().clone());
        (snapshots.len() - 1) as SnapshotId
    }

    fn revert_to(&self, id: SnapshotId) -> ChainResult<()> {
        let mut snapshots = self.snapshots.borrow_mut();
        let index = id as usize;
        if index >= snapshots.len() {
            return Err(ChainError::Unavailable(format!("unknown snapshot {}", id)));
        }
        *self.world.borrow_mut() = snapshots[index].clone();
        snapshots.truncate(index);
        Ok(())
    }

    fn release(&self, id: SnapshotId) -> ChainResult<()> {
        let mut snapshots = self.snapshots.borrow_mut();
        let index = id as usize;
        if index >= snapshots.len() {
            return Err(ChainError::Unavailable(format!("unknown snapshot {}", id)));
        }
        snapshots.truncate(index);
        Ok(())
    }

    fn timestamp(&self) -> u64 {
        self.world.borrow().timestamp
    }
}

/// An initialized vault on top of a [`FakeChain`]
pub(crate) struct Fixture {
    pub chain: Rc<FakeChain>,
    pub owner: Address,
    pub vault: Address,
}

impl Fixture {
    /// Deploys the vault, funds the owner with 50 WETH and approves the vault to pull it.
    pub fn new() -> Self {
        crate::state::clear();

        let chain = Rc::new(FakeChain::new());
        let owner = Address::repeat_byte(0x0a);
        let vault = Address::repeat_byte(0x0b);
        let d = chain.deployment;

        let args = InitArgs {
            owner: owner.to_string(),
            vault: vault.to_string(),
            asset: d.weth.to_string(),
            aave_pool_addresses_provider: d.aave_addresses_provider.to_string(),
            aave_data_provider: d.aave_data_provider.to_string(),
            comet: d.comet.to_string(),
            comet_rewards: d.comet_rewards.to_string(),
            asset_price_feed: d.price_feed.to_string(),
        };
        let dyn_chain: Rc<dyn Chain> = chain.clone();
        api::init(args, dyn_chain).expect("vault initializes");

        chain.mint_weth(owner, ether(50));
        chain
            .transact(
                owner,
                d.weth,
                IWETH::approveCall {
                    spender: vault,
                    amount: ether(50),
                }
                .abi_encode(),
            )
            .expect("owner approves the vault");

        Self {
            chain,
            owner,
            vault,
        }
    }

    /// Comet per-second rate whose annualized value equals `rate_ray` exactly.
    /// `rate_ray` must be a multiple of `SECONDS_PER_YEAR * 1e9`.
    pub fn comet_rate_matching(rate_ray: U256) -> u64 {
        let per_second = rate_ray
            / (U256::from(SECONDS_PER_YEAR) * crate::constants::wad_to_ray_factor());
        per_second.to::<u64>()
    }
}
