//! Settlement orchestration for Paygate
//!
//! This crate sits between the HTTP gateway and the payment collaborators.
//!
//! # Features
//!
//! - Fee aggregation across the transactor and the promise settler
//! - Synchronous and fire-and-forget promise settlement
//! - Beneficiary settlement, identity registration and top-up
//! - Filtered, paginated settlement history
//!
//! # Feature Flags
//!
//! - `postgres` - Enable PostgreSQL history storage
//! - `api` - Enable HTTP API
//! - `client` - Enable HTTP clients for external services

pub mod clients;
pub mod dispatcher;
pub mod error;
pub mod fees;
pub mod history;
pub mod manager;
pub mod observer;
pub mod store;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use error::{Result, SettlementError, UpstreamError, UpstreamResult};
pub use history::{HistorySettings, Page, PageInfo, SettlementHistoryParams};
pub use manager::{ManagerSettings, SettlementManager};
pub use observer::{RecordingObserver, SettlementObserver, TracingObserver};
pub use types::{
    FeeQuote, IdentityRegistrationRequest, SettlementHistoryEntry, SettlementHistoryQuery,
    SettlementMode, SettlementOutcome, SettlementRequest,
};

// Store exports
pub use store::memory::InMemorySettlementHistoryStore;
pub use store::traits::SettlementHistoryStore;

#[cfg(feature = "postgres")]
pub use store::postgres::PostgresSettlementHistoryStore;

// Client exports
pub use clients::settler::{MockPromiseSettler, PromiseSettler};
pub use clients::transactor::{MockTransactor, Transactor};

#[cfg(feature = "client")]
pub use clients::settler::http::HttpPromiseSettler;

#[cfg(feature = "client")]
pub use clients::transactor::http::HttpTransactor;
