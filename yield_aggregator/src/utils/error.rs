use candid::CandidType;
use serde::Deserialize;

use super::chain::ChainError;

/// Yield Aggregator Result
pub type VaultResult<T> = Result<T, VaultError>;

/// Yield Aggregator Errors
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum VaultError {
    /// The caller is not the owner of the vault
    AccessDenied,
    /// The higher-yielding venue already holds the larger balance.
    /// This is an expected outcome and not a fault.
    NoRebalanceRequired,
    /// A venue or asset call reverted. Carries the reason verbatim.
    ExternalProtocolFailure(String),
    /// Withdrawal was requested while the vault holds no value
    NothingToWithdraw,
    /// The vault received native currency outside of the managed asset flow
    UnsupportedTransfer,
    /// Zero or otherwise unusable amount
    InvalidAmount,
    /// Another operation is in progress
    Locked,
    /// The vault has not been initialized yet
    NotInitialized,
    /// The vault has already been initialized
    AlreadyInitialized,
    /// Decoding issue
    DecodingError(String),
    /// Arithmetic error
    Arithmetic(String),
    /// Unknown/Custom error
    Custom(String),
}

impl From<ChainError> for VaultError {
    fn from(value: ChainError) -> Self {
        match value {
            ChainError::Reverted(reason) => VaultError::ExternalProtocolFailure(reason),
            ChainError::Unavailable(reason) => {
                VaultError::ExternalProtocolFailure(format!("chain unavailable: {}", reason))
            }
        }
    }
}

pub fn arithmetic_err<S: AsRef<str>>(s: S) -> VaultError {
    VaultError::Arithmetic(s.as_ref().to_string())
}

pub fn decoding_err<S: AsRef<str>>(s: S) -> VaultError {
    VaultError::DecodingError(s.as_ref().to_string())
}
