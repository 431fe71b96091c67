//! Common error types for Paygate

use thiserror::Error;

/// Common error type used across Paygate crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Address is empty
    #[error("address is empty")]
    EmptyAddress,

    /// Address is not `0x` followed by 40 hex digits
    #[error("malformed address '{0}': expected 0x followed by 40 hex digits")]
    MalformedAddress(String),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;
