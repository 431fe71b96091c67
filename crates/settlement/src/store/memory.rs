//! In-memory settlement history store

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{Result, SettlementError};
use crate::store::traits::SettlementHistoryStore;
use crate::types::{SettlementHistoryEntry, SettlementHistoryQuery};

/// In-memory history store for testing and development
pub struct InMemorySettlementHistoryStore {
    entries: RwLock<Vec<SettlementHistoryEntry>>,
    queries: AtomicUsize,
}

impl InMemorySettlementHistoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn with_entries(entries: Vec<SettlementHistoryEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, entry: SettlementHistoryEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| SettlementError::StorageError("history lock poisoned".into()))?
            .push(entry);
        Ok(())
    }

    /// Number of queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Default for InMemorySettlementHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementHistoryStore for InMemorySettlementHistoryStore {
    async fn query(&self, query: &SettlementHistoryQuery) -> Result<Vec<SettlementHistoryEntry>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let entries = self
            .entries
            .read()
            .map_err(|_| SettlementError::StorageError("history lock poisoned".into()))?;

        let mut result: Vec<SettlementHistoryEntry> = entries
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();

        // Newest first, then by descending tx hash, matching the postgres store
        result.sort_by(|a, b| {
            b.settled_at
                .cmp(&a.settled_at)
                .then_with(|| b.tx_hash.cmp(&a.tx_hash))
        });

        Ok(result)
    }
}
