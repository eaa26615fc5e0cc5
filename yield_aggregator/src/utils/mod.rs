//! Utility and helper functions needed for:
//! - Submitting calls to the chain and decoding their responses
//! - Error handling
//! - Type casting and formatting

pub(crate) mod chain;
pub(crate) mod common;
pub(crate) mod error;
pub(crate) mod transaction_builder;
