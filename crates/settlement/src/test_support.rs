//! Shared fixtures for unit tests

use chrono::{DateTime, Duration, Utc};
use common::types::{Address, Identity};

use crate::types::SettlementHistoryEntry;

pub const PROVIDER: &str = "0x1bb6f6e3e29a1c2e1a2c3e5fa4d0e3a5b8c9d0e1";
pub const OTHER_PROVIDER: &str = "0x9c2f0d2b7c4e6a8b1d3f5a7c9e1b3d5f7a9c1e3b";
pub const ACCOUNTANT: &str = "0x42a537d649d6853c0a866470f2d084da0f73b5e4";

pub fn provider() -> Identity {
    Identity::parse(PROVIDER).unwrap()
}

pub fn accountant() -> Address {
    Address::parse(ACCOUNTANT).unwrap()
}

/// Entry for `provider_id`, tagged with `seq` in its hash and amount
pub fn entry_at(seq: usize, settled_at: DateTime<Utc>, provider_id: &str) -> SettlementHistoryEntry {
    SettlementHistoryEntry {
        tx_hash: format!("0x{:064x}", seq),
        provider_id: Identity::parse(provider_id).unwrap(),
        accountant_id: accountant(),
        channel_address: Address::parse("0x00000000000000000000000000000000000000aa").unwrap(),
        beneficiary: Address::parse(provider_id).unwrap(),
        amount: 1_000 + seq as u64,
        fees: 10,
        settled_at,
        is_withdrawal: false,
    }
}

/// `count` entries for PROVIDER, one minute apart, newest first
pub fn recent_entries(count: usize, now: DateTime<Utc>) -> Vec<SettlementHistoryEntry> {
    (0..count)
        .map(|i| entry_at(i, now - Duration::minutes(i as i64 + 1), PROVIDER))
        .collect()
}
