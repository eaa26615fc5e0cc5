//! Entry points of the vault
//!
//! Mutating calls take the caller's address and are restricted to the owner.
//! Queries are unrestricted.

use std::rc::Rc;

use alloy_primitives::{Address, LogData};
use candid::Nat;

use crate::{
    events::{events_to_json, recorded_events},
    journal::{JournalCollection, LogType, Operation, StableJournalCollection},
    state,
    types::*,
    utils::{
        chain::Chain,
        common::u256_to_nat,
        error::{arithmetic_err, VaultError, VaultResult},
    },
    vault::{
        run,
        settings::{VaultSettings, VaultSettingsQuery},
        stable::StableVault,
    },
    venue::{aave::AaveAdapter, compound::CompoundAdapter, YieldSource},
};

// INITIALIZATION

/// Initializes the vault on `chain`. Resolves the Aave pool and aToken once;
/// every address is immutable afterwards.
pub fn init(args: InitArgs, chain: Rc<dyn Chain>) -> VaultResult<()> {
    let mut journal = JournalCollection::open(Some(Operation::Init));

    let result = initialize(args, chain, &mut journal);

    journal.append_note(
        result.clone(),
        LogType::ExecutionResult,
        "Initialization is finished.",
    );
    result
}

fn initialize(
    args: InitArgs,
    chain: Rc<dyn Chain>,
    journal: &mut JournalCollection,
) -> VaultResult<()> {
    if state::stable_vault().is_ok() {
        return Err(VaultError::AlreadyInitialized);
    }

    let mut settings = VaultSettings::try_from(args)?;
    let deployment = AaveAdapter::resolve(
        chain.as_ref(),
        settings.aave_pool_addresses_provider,
        settings.aave_data_provider,
        settings.asset,
    )?;
    settings
        .aave_pool(deployment.pool)
        .aave_a_token(deployment.a_token);

    journal.append_note(
        Ok(()),
        LogType::Info,
        format!(
            "Resolved the Aave pool {} and aToken {}.",
            deployment.pool, deployment.a_token
        ),
    );

    StableVault::default().settings(settings).mint()?;
    state::set_chain(chain);
    Ok(())
}

// MUTATING CALLS

/// Deposits `amount` of the asset from the owner. The owner must have approved the vault.
pub fn deposit(caller: Address, amount: Nat) -> VaultResult<()> {
    run::deposit(caller, amount).map(|_| ())
}

/// Pays the vault's entire holdings out to the owner.
pub fn withdraw(caller: Address) -> VaultResult<()> {
    run::withdraw(caller).map(|_| ())
}

/// Moves the holdings to the higher-yielding venue if that venue holds less.
pub fn rebalance(caller: Address) -> VaultResult<()> {
    run::rebalance(caller).map(|_| ())
}

/// Direct native-currency transfers are never accepted.
pub fn receive(caller: Address, value: Nat) -> VaultResult<()> {
    let result = Err(VaultError::UnsupportedTransfer);
    JournalCollection::open(Some(Operation::Receive)).append_note(
        result.clone(),
        LogType::ExecutionResult,
        format!("Rejected a native transfer of {} from {}.", value, caller),
    );
    result
}

// QUERIES

fn with_venues<T, F>(query: F) -> VaultResult<T>
where
    F: FnOnce(&VaultSettings, &dyn Chain) -> VaultResult<T>,
{
    let stable_vault = state::stable_vault()?;
    let chain = state::chain()?;
    query(&stable_vault.settings, chain.as_ref())
}

/// Aave's current supply yield
pub fn aave_apy() -> VaultResult<YieldQuery> {
    with_venues(|settings, chain| {
        AaveAdapter::new(settings)
            .current_annualized_yield(chain)
            .and_then(YieldQuery::try_from)
    })
}

/// Compound's current supply yield
pub fn compound_apy() -> VaultResult<YieldQuery> {
    with_venues(|settings, chain| {
        CompoundAdapter::new(settings)
            .current_annualized_yield(chain)
            .and_then(YieldQuery::try_from)
    })
}

/// The vault's live Aave balance
pub fn aave_balance() -> VaultResult<Nat> {
    with_venues(|settings, chain| {
        AaveAdapter::new(settings)
            .current_balance(chain)
            .map(|balance| u256_to_nat(&balance))
    })
}

/// The vault's Compound balance. Accrues the account first.
pub fn compound_balance() -> VaultResult<Nat> {
    with_venues(|settings, chain| {
        CompoundAdapter::new(settings)
            .current_balance(chain)
            .map(|balance| u256_to_nat(&balance))
    })
}

/// Live value held across both venues
pub fn total_value() -> VaultResult<Nat> {
    with_venues(|settings, chain| {
        let aave = AaveAdapter::new(settings).current_balance(chain)?;
        let compound = CompoundAdapter::new(settings).current_balance(chain)?;
        aave.checked_add(compound)
            .map(|total| u256_to_nat(&total))
            .ok_or_else(|| arithmetic_err("Total vault value overflowed."))
    })
}

/// Positions as recorded by the ledger
pub fn positions() -> VaultResult<PositionsQuery> {
    PositionsQuery::try_from(&state::stable_vault()?.ledger)
}

pub fn owner() -> VaultResult<String> {
    state::stable_vault().map(|stable_vault| stable_vault.settings.owner.to_string())
}

pub fn settings() -> VaultResult<VaultSettingsQuery> {
    state::stable_vault().map(|stable_vault| VaultSettingsQuery::from(&stable_vault.settings))
}

/// Allocation events, oldest first
pub fn events() -> Vec<AllocationEventQuery> {
    recorded_events().iter().map(AllocationEventQuery::from).collect()
}

/// Allocation events as EVM logs
pub fn event_logs() -> Vec<LogData> {
    recorded_events().iter().map(|event| event.log_data()).collect()
}

/// Allocation events as a JSON array
pub fn events_json() -> VaultResult<String> {
    events_to_json(&events())
}

pub fn journal() -> Vec<StableJournalCollection> {
    state::journal_collections()
}

/// Rewards accrued by the vault in Compound
pub fn compound_rewards_owed() -> VaultResult<RewardOwedQuery> {
    with_venues(|settings, chain| {
        let owed = CompoundAdapter::new(settings).reward_owed(chain)?;
        Ok(RewardOwedQuery {
            token: owed.token.to_string(),
            owed: u256_to_nat(&owed.owed),
        })
    })
}

/// Latest price of the managed asset
pub fn asset_price() -> VaultResult<AssetPriceQuery> {
    with_venues(|settings, chain| {
        let price = CompoundAdapter::new(settings).asset_price(chain)?;
        Ok(AssetPriceQuery {
            answer: price.answer.to_string(),
            decimals: price.decimals,
            updated_at: u256_to_nat(&price.updated_at),
        })
    })
}
