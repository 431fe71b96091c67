//! PostgreSQL settlement history store

use async_trait::async_trait;
use common::types::{Address, Identity};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use std::sync::Arc;

use crate::error::{Result, SettlementError};
use crate::store::traits::SettlementHistoryStore;
use crate::types::{SettlementHistoryEntry, SettlementHistoryQuery};

const TABLE: &str = "settlement_history";

/// PostgreSQL history store
pub struct PostgresSettlementHistoryStore {
    pool: Arc<PgPool>,
}

impl PostgresSettlementHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the history table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                tx_hash TEXT PRIMARY KEY,
                provider_id TEXT NOT NULL,
                accountant_id TEXT NOT NULL,
                channel_address TEXT NOT NULL,
                beneficiary TEXT NOT NULL,
                amount BIGINT NOT NULL,
                fees BIGINT NOT NULL,
                settled_at TIMESTAMPTZ NOT NULL,
                is_withdrawal BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
            TABLE
        ))
        .execute(&*self.pool)
        .await
        .map_err(|e| SettlementError::StorageError(e.to_string()))?;

        Ok(())
    }

    fn row_to_entry(&self, row: &PgRow) -> Result<SettlementHistoryEntry> {
        let text = |column: &str| -> Result<String> {
            row.try_get::<String, _>(column)
                .map_err(|e| SettlementError::StorageError(e.to_string()))
        };
        let address = |column: &str| -> Result<Address> {
            Address::parse(&text(column)?).map_err(|e| {
                SettlementError::StorageError(format!("column {}: {}", column, e))
            })
        };
        let amount = |column: &str| -> Result<u64> {
            let value: i64 = row
                .try_get(column)
                .map_err(|e| SettlementError::StorageError(e.to_string()))?;
            u64::try_from(value).map_err(|_| {
                SettlementError::StorageError(format!("column {}: negative value {}", column, value))
            })
        };

        Ok(SettlementHistoryEntry {
            tx_hash: text("tx_hash")?,
            provider_id: Identity::from_address(address("provider_id")?),
            accountant_id: address("accountant_id")?,
            channel_address: address("channel_address")?,
            beneficiary: address("beneficiary")?,
            amount: amount("amount")?,
            fees: amount("fees")?,
            settled_at: row
                .try_get("settled_at")
                .map_err(|e| SettlementError::StorageError(e.to_string()))?,
            is_withdrawal: row
                .try_get("is_withdrawal")
                .map_err(|e| SettlementError::StorageError(e.to_string()))?,
        })
    }
}

#[async_trait]
impl SettlementHistoryStore for PostgresSettlementHistoryStore {
    async fn query(&self, query: &SettlementHistoryQuery) -> Result<Vec<SettlementHistoryEntry>> {
        let sql = format!(
            r#"
            SELECT tx_hash, provider_id, accountant_id, channel_address, beneficiary,
                   amount, fees, settled_at, is_withdrawal
            FROM {}
            WHERE settled_at >= $1
              AND settled_at <= $2
              AND ($3::TEXT IS NULL OR provider_id = $3)
              AND ($4::TEXT IS NULL OR accountant_id = $4)
            ORDER BY settled_at DESC, tx_hash DESC
            "#,
            TABLE
        );

        let rows = sqlx::query(&sql)
            .bind(query.from)
            .bind(query.to)
            .bind(query.provider_id.as_ref().map(|id| id.address.as_str().to_string()))
            .bind(query.accountant_id.as_ref().map(|a| a.as_str().to_string()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| SettlementError::StorageError(e.to_string()))?;

        rows.iter().map(|row| self.row_to_entry(row)).collect()
    }
}
