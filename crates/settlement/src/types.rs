//! Settlement domain types

use chrono::{DateTime, Utc};
use common::types::{Address, Identity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};

/// Decode a JSON request body, tagging failures with `context`
pub fn decode_body<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| SettlementError::invalid_request(context, e))
}

/// Composite fee answer assembled from three independent sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Identity registration fee, smallest currency unit
    pub registration: u64,
    /// Promise settlement fee, smallest currency unit
    pub settlement: u64,
    /// Accountant fee in basis points
    pub accountant: u16,
}

/// Request to settle promises between a provider and an accountant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub provider_id: Identity,
    pub accountant_id: Address,
}

/// Body of a set-beneficiary call; the provider comes from the path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryRequest {
    pub beneficiary: Address,
    pub accountant_id: Address,
}

/// Settle-with-beneficiary request as handed to the settler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeneficiarySettlementRequest {
    pub provider_id: Identity,
    pub beneficiary: Address,
    pub accountant_id: Address,
}

impl BeneficiarySettlementRequest {
    pub fn new(provider_id: Identity, body: BeneficiaryRequest) -> Self {
        Self {
            provider_id,
            beneficiary: body.beneficiary,
            accountant_id: body.accountant_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUpRequest {
    pub identity: Identity,
}

/// Optional registration parameters; every field may be omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRegistrationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stake: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_token: Option<String>,
}

/// One past settlement as recorded by the history store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementHistoryEntry {
    pub tx_hash: String,
    pub provider_id: Identity,
    pub accountant_id: Address,
    pub channel_address: Address,
    pub beneficiary: Address,
    pub amount: u64,
    pub fees: u64,
    pub settled_at: DateTime<Utc>,
    #[serde(default)]
    pub is_withdrawal: bool,
}

/// Filter applied by the history store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementHistoryQuery {
    /// Inclusive lower bound
    pub from: DateTime<Utc>,
    /// Inclusive upper bound
    pub to: DateTime<Utc>,
    pub provider_id: Option<Identity>,
    pub accountant_id: Option<Address>,
}

impl SettlementHistoryQuery {
    pub fn matches(&self, entry: &SettlementHistoryEntry) -> bool {
        entry.settled_at >= self.from
            && entry.settled_at <= self.to
            && self
                .provider_id
                .as_ref()
                .map_or(true, |id| *id == entry.provider_id)
            && self
                .accountant_id
                .as_ref()
                .map_or(true, |id| *id == entry.accountant_id)
    }
}

/// How the caller wants a settlement executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementMode {
    /// Block until the settler finishes
    Sync,
    /// Acknowledge immediately, settle in the background
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Completed,
    Accepted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ACCOUNTANT, PROVIDER};
    use chrono::Duration;

    fn entry(at: DateTime<Utc>) -> SettlementHistoryEntry {
        SettlementHistoryEntry {
            tx_hash: "0xabc".to_string(),
            provider_id: Identity::parse(PROVIDER).unwrap(),
            accountant_id: Address::parse(ACCOUNTANT).unwrap(),
            channel_address: Address::parse(ACCOUNTANT).unwrap(),
            beneficiary: Address::parse(PROVIDER).unwrap(),
            amount: 10,
            fees: 1,
            settled_at: at,
            is_withdrawal: false,
        }
    }

    #[test]
    fn test_query_bounds_are_inclusive() {
        let now = Utc::now();
        let query = SettlementHistoryQuery {
            from: now - Duration::days(1),
            to: now,
            provider_id: None,
            accountant_id: None,
        };
        assert!(query.matches(&entry(now)));
        assert!(query.matches(&entry(now - Duration::days(1))));
        assert!(!query.matches(&entry(now + Duration::seconds(1))));
    }

    #[test]
    fn test_query_identity_filters() {
        let now = Utc::now();
        let mut query = SettlementHistoryQuery {
            from: now - Duration::days(1),
            to: now,
            provider_id: Some(Identity::parse(ACCOUNTANT).unwrap()),
            accountant_id: None,
        };
        assert!(!query.matches(&entry(now)));

        query.provider_id = Some(Identity::parse(PROVIDER).unwrap());
        query.accountant_id = Some(Address::parse(ACCOUNTANT).unwrap());
        assert!(query.matches(&entry(now)));
    }

    #[test]
    fn test_settlement_request_rejects_bad_address() {
        let ok = format!(
            r#"{{"provider_id":"{}","accountant_id":"{}"}}"#,
            PROVIDER, ACCOUNTANT
        );
        assert!(serde_json::from_str::<SettlementRequest>(&ok).is_ok());

        let bad = format!(r#"{{"provider_id":"0x12","accountant_id":"{}"}}"#, ACCOUNTANT);
        assert!(serde_json::from_str::<SettlementRequest>(&bad).is_err());
    }

    #[test]
    fn test_decode_body_tags_context() {
        let err = decode_body::<TopUpRequest>(b"{not json", "failed to parse top up request")
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().starts_with("failed to parse top up request: "));
    }

    #[test]
    fn test_registration_request_all_optional() {
        let req: IdentityRegistrationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, IdentityRegistrationRequest::default());
    }
}
