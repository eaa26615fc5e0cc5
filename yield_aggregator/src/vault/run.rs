use alloy_primitives::Address;
use candid::Nat;

use crate::{
    access::only_owner,
    events::AllocationEvent,
    journal::{JournalCollection, LogType, Operation},
    state,
    utils::{common::nat_to_u256, error::VaultResult},
};

use super::executable::ExecutableVault;

/// Authorizes the caller and creates an executable instance of the vault
fn executable_vault(caller: Address) -> VaultResult<ExecutableVault> {
    let stable_vault = state::stable_vault()?;
    // The owner check runs before anything else, including the lock.
    only_owner(caller, &stable_vault.settings)?;
    Ok(ExecutableVault::new(&stable_vault, state::chain()?))
}

fn run_operation<F>(caller: Address, operation: Operation, action: F) -> VaultResult<AllocationEvent>
where
    F: FnOnce(&mut ExecutableVault, &mut JournalCollection) -> VaultResult<AllocationEvent>,
{
    let mut journal = JournalCollection::open(Some(operation));
    journal.append_note(Ok(()), LogType::Info, format!("Called by {}.", caller));

    let result = executable_vault(caller).and_then(|mut vault| action(&mut vault, &mut journal));

    journal.append_note(
        result.clone().map(|_| ()),
        LogType::ExecutionResult,
        format!("{:?} is finished.", operation),
    );
    result

    // The executable vault went out of scope inside `and_then`. Its Drop released the lock
    // if an early return skipped the explicit unlock.
}

/// The amount is only decoded once the caller is known to be the owner.
pub fn deposit(caller: Address, amount: Nat) -> VaultResult<AllocationEvent> {
    run_operation(caller, Operation::Deposit, |vault, journal| {
        vault.deposit(journal, nat_to_u256(&amount)?)
    })
}

pub fn withdraw(caller: Address) -> VaultResult<AllocationEvent> {
    run_operation(caller, Operation::Withdraw, |vault, journal| {
        vault.withdraw(journal)
    })
}

pub fn rebalance(caller: Address) -> VaultResult<AllocationEvent> {
    run_operation(caller, Operation::Rebalance, |vault, journal| {
        vault.rebalance(journal)
    })
}
