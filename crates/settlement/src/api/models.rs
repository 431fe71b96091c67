//! API models for settlement HTTP endpoints

use serde::{Deserialize, Serialize};

use crate::history::{Page, PageInfo};
use crate::types::SettlementHistoryEntry;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// One settlement in a history response
#[derive(Debug, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub tx_hash: String,
    pub provider_id: String,
    pub accountant_id: String,
    pub channel_address: String,
    pub beneficiary: String,
    pub amount: u64,
    pub fees: u64,
    pub settled_at: chrono::DateTime<chrono::Utc>,
    pub is_withdrawal: bool,
}

impl From<SettlementHistoryEntry> for SettlementResponse {
    fn from(entry: SettlementHistoryEntry) -> Self {
        Self {
            tx_hash: entry.tx_hash,
            provider_id: entry.provider_id.to_string(),
            accountant_id: entry.accountant_id.to_string(),
            channel_address: entry.channel_address.to_string(),
            beneficiary: entry.beneficiary.to_string(),
            amount: entry.amount,
            fees: entry.fees,
            settled_at: entry.settled_at,
            is_withdrawal: entry.is_withdrawal,
        }
    }
}

/// Settlement history page
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSettlementsResponse {
    pub items: Vec<SettlementResponse>,
    pub paging: PageInfo,
}

impl From<Page<SettlementHistoryEntry>> for ListSettlementsResponse {
    fn from(page: Page<SettlementHistoryEntry>) -> Self {
        Self {
            items: page.items.into_iter().map(SettlementResponse::from).collect(),
            paging: page.paging,
        }
    }
}
