//! HTTP API for settlement operations

pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use crate::manager::SettlementManager;

pub use routes::create_router;

/// Shared state for settlement handlers
#[derive(Clone)]
pub struct SettlementApiState {
    pub manager: Arc<SettlementManager>,
}
