//! SettlementHistoryStore trait definition

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{SettlementHistoryEntry, SettlementHistoryQuery};

/// Read-only access to recorded settlements
///
/// Implementations return every entry matching the query, ordered newest
/// first with ties broken by descending `tx_hash`. The order must be total so
/// repeated queries page consistently; paging happens above the store.
#[async_trait]
pub trait SettlementHistoryStore: Send + Sync {
    async fn query(&self, query: &SettlementHistoryQuery) -> Result<Vec<SettlementHistoryEntry>>;
}
