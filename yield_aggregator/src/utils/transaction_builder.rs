//! Transaction builder (and sender) that submits ABI-encoded calls to the chain

use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use super::{
    chain::Chain,
    common::{decode_abi_response, selector_hex},
    error::{decoding_err, VaultError, VaultResult},
};

/// Decodes the return data of `C`. Failures name the selector of the call.
fn decode<C: SolCall>(selector: &str, response: &[u8]) -> VaultResult<C::Return> {
    decode_abi_response::<C::Return, C>(response).map_err(|err| match err {
        VaultError::DecodingError(reason) => decoding_err(format!("{}: {}", selector, reason)),
        err => err,
    })
}

/// Transaction builder struct
#[derive(Default)]
pub struct TransactionBuilder {
    to: Address,
    from: Address,
    data: Vec<u8>,
}

impl TransactionBuilder {
    /// Sets the `to` field
    pub fn to(mut self, to: Address) -> Self {
        self.to = to;
        self
    }

    /// Sets the `from` field
    pub fn from(mut self, from: Address) -> Self {
        self.from = from;
        self
    }

    /// Sets the `data` field
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Sets the `data` field from a typed call
    pub fn call_data<C: SolCall>(self, call: &C) -> Self {
        self.data(call.abi_encode())
    }

    /// Submits the transaction and returns the raw return data
    pub fn send(self, chain: &dyn Chain) -> VaultResult<Vec<u8>> {
        chain
            .transact(self.from, self.to, self.data)
            .map_err(VaultError::from)
    }

    /// Submits the transaction and decodes the return data of `C`
    pub fn send_decoded<C: SolCall>(self, chain: &dyn Chain) -> VaultResult<C::Return> {
        let selector = selector_hex(&self.data);
        let response = self.send(chain)?;
        decode::<C>(&selector, &response)
    }

    /// Performs a read-only call and decodes the return data of `C`
    pub fn query<C: SolCall>(self, chain: &dyn Chain) -> VaultResult<C::Return> {
        let selector = selector_hex(&self.data);
        let response = chain.call(self.to, self.data).map_err(VaultError::from)?;
        decode::<C>(&selector, &response)
    }
}
