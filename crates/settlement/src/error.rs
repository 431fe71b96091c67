//! Settlement error types

use thiserror::Error;

/// Failure reported by an external collaborator (transactor, settler)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Collaborator could not be reached
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// Collaborator answered with a failure
    #[error("upstream rejected request: {0}")]
    Rejected(String),

    #[error("{0}")]
    Other(String),
}

/// Result type for collaborator calls
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Errors that can occur while orchestrating settlements
#[derive(Error, Debug)]
pub enum SettlementError {
    /// Request body could not be decoded
    #[error("{context}: {reason}")]
    InvalidRequest {
        context: &'static str,
        reason: String,
    },

    /// Query parameter failed to parse
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Address failed validation
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] common::Error),

    /// A collaborator call failed
    #[error("{context}: {source}")]
    Dependency {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },

    /// History store failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SettlementError {
    pub fn invalid_request(context: &'static str, reason: impl ToString) -> Self {
        Self::InvalidRequest {
            context,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_parameter(name: &'static str, reason: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.to_string(),
        }
    }

    /// Wrap a collaborator failure with the operation it interrupted
    pub fn dependency(context: &'static str, source: UpstreamError) -> Self {
        Self::Dependency { context, source }
    }

    /// Whether the caller, not the gateway, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::InvalidParameter { .. } | Self::InvalidAddress(_)
        )
    }
}

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, SettlementError>;
