//! The managed asset, consumed through the standard approve/transfer capability

use alloy_primitives::{Address, U256};

use crate::{
    types::IWETH,
    utils::{
        chain::Chain,
        error::{VaultError, VaultResult},
        transaction_builder::TransactionBuilder,
    },
};

/// WETH as seen from one holder account
#[derive(Clone, Copy, Debug, Default)]
pub struct Erc20Asset {
    pub token: Address,
    /// The account the state-changing calls are sent from
    pub holder: Address,
}

fn ensure_success(ok: bool, action: &str) -> VaultResult<()> {
    if ok {
        Ok(())
    } else {
        Err(VaultError::ExternalProtocolFailure(format!(
            "asset {} returned false",
            action
        )))
    }
}

impl Erc20Asset {
    pub fn new(token: Address, holder: Address) -> Self {
        Self { token, holder }
    }

    pub fn balance_of(&self, chain: &dyn Chain, account: Address) -> VaultResult<U256> {
        TransactionBuilder::default()
            .to(self.token)
            .call_data(&IWETH::balanceOfCall { account })
            .query::<IWETH::balanceOfCall>(chain)
            .map(|data| data._0)
    }

    pub fn approve(&self, chain: &dyn Chain, spender: Address, amount: U256) -> VaultResult<()> {
        let approved = TransactionBuilder::default()
            .from(self.holder)
            .to(self.token)
            .call_data(&IWETH::approveCall { spender, amount })
            .send_decoded::<IWETH::approveCall>(chain)?;
        ensure_success(approved._0, "approve")
    }

    pub fn transfer(&self, chain: &dyn Chain, to: Address, amount: U256) -> VaultResult<()> {
        let transferred = TransactionBuilder::default()
            .from(self.holder)
            .to(self.token)
            .call_data(&IWETH::transferCall { to, amount })
            .send_decoded::<IWETH::transferCall>(chain)?;
        ensure_success(transferred._0, "transfer")
    }

    /// Pulls `amount` from `from` into the holder, using the allowance `from` granted the holder.
    pub fn pull(&self, chain: &dyn Chain, from: Address, amount: U256) -> VaultResult<()> {
        let transferred = TransactionBuilder::default()
            .from(self.holder)
            .to(self.token)
            .call_data(&IWETH::transferFromCall {
                from,
                to: self.holder,
                amount,
            })
            .send_decoded::<IWETH::transferFromCall>(chain)?;
        ensure_success(transferred._0, "transferFrom")
    }

    /// Runs `action` and returns how much the holder's balance grew during it
    pub fn received_during<F>(&self, chain: &dyn Chain, action: F) -> VaultResult<U256>
    where
        F: FnOnce() -> VaultResult<()>,
    {
        let before = self.balance_of(chain, self.holder)?;
        action()?;
        let after = self.balance_of(chain, self.holder)?;
        after.checked_sub(before).ok_or_else(|| {
            VaultError::ExternalProtocolFailure(
                "asset balance decreased while receiving funds".to_string(),
            )
        })
    }
}
