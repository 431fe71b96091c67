//! Promise settler client - trait and implementations

use async_trait::async_trait;
use common::types::{Address, Identity};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{UpstreamError, UpstreamResult};
use crate::types::BeneficiarySettlementRequest;

/// Client trait for the promise settler - protocol agnostic
#[async_trait]
pub trait PromiseSettler: Send + Sync {
    /// Settle all outstanding promises between provider and accountant
    async fn force_settle(&self, provider: &Identity, accountant: &Address) -> UpstreamResult<()>;

    /// Settle and redirect the proceeds to a new beneficiary
    async fn settle_with_beneficiary(
        &self,
        request: &BeneficiarySettlementRequest,
    ) -> UpstreamResult<()>;

    /// Accountant fee in basis points
    async fn accountant_fee(&self) -> UpstreamResult<u16>;
}

// ==================== Mock Implementation ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlerOp {
    ForceSettle = 0,
    SettleWithBeneficiary = 1,
    AccountantFee = 2,
}

/// Mock promise settler for testing
pub struct MockPromiseSettler {
    accountant_fee: u16,
    failures: Vec<(SettlerOp, UpstreamError)>,
    delay: Option<Duration>,
    calls: [AtomicUsize; 3],
    completed: [AtomicUsize; 3],
}

impl MockPromiseSettler {
    pub fn new() -> Self {
        Self {
            accountant_fee: 0,
            failures: Vec::new(),
            delay: None,
            calls: Default::default(),
            completed: Default::default(),
        }
    }

    pub fn with_accountant_fee(mut self, fee: u16) -> Self {
        self.accountant_fee = fee;
        self
    }

    /// Make one operation fail with the given error
    pub fn with_failure(mut self, op: SettlerOp, error: UpstreamError) -> Self {
        self.failures.push((op, error));
        self
    }

    /// Delay every call, simulating a slow settlement engine
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times an operation was started
    pub fn calls(&self, op: SettlerOp) -> usize {
        self.calls[op as usize].load(Ordering::SeqCst)
    }

    /// Number of times an operation ran to completion, successful or not
    pub fn completed(&self, op: SettlerOp) -> usize {
        self.completed[op as usize].load(Ordering::SeqCst)
    }

    async fn invoke(&self, op: SettlerOp) -> UpstreamResult<()> {
        self.calls[op as usize].fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed[op as usize].fetch_add(1, Ordering::SeqCst);
        match self.failures.iter().find(|(failing, _)| *failing == op) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockPromiseSettler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromiseSettler for MockPromiseSettler {
    async fn force_settle(&self, _provider: &Identity, _accountant: &Address) -> UpstreamResult<()> {
        self.invoke(SettlerOp::ForceSettle).await
    }

    async fn settle_with_beneficiary(
        &self,
        _request: &BeneficiarySettlementRequest,
    ) -> UpstreamResult<()> {
        self.invoke(SettlerOp::SettleWithBeneficiary).await
    }

    async fn accountant_fee(&self) -> UpstreamResult<u16> {
        self.invoke(SettlerOp::AccountantFee).await?;
        Ok(self.accountant_fee)
    }
}

// ==================== HTTP Implementation ====================

#[cfg(feature = "client")]
pub mod http {
    use async_trait::async_trait;
    use common::types::{Address, Identity};
    use reqwest::Client;
    use std::time::Duration;
    use tracing::debug;

    use super::PromiseSettler;
    use crate::clients::http::{build_client, ensure_success, unavailable, FeeResponse};
    use crate::error::UpstreamResult;
    use crate::types::BeneficiarySettlementRequest;

    /// HTTP-based promise settler client
    pub struct HttpPromiseSettler {
        client: Client,
        base_url: String,
    }

    impl HttpPromiseSettler {
        pub fn new(base_url: &str, timeout: Duration) -> UpstreamResult<Self> {
            Ok(Self {
                client: build_client(timeout)?,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }
    }

    #[async_trait]
    impl PromiseSettler for HttpPromiseSettler {
        async fn force_settle(
            &self,
            provider: &Identity,
            accountant: &Address,
        ) -> UpstreamResult<()> {
            let url = format!("{}/settle", self.base_url);
            debug!(%provider, %accountant, "Requesting settlement");

            let response = self
                .client
                .post(&url)
                .json(&serde_json::json!({
                    "provider_id": provider,
                    "accountant_id": accountant,
                }))
                .send()
                .await
                .map_err(unavailable)?;

            ensure_success(response).await.map(|_| ())
        }

        async fn settle_with_beneficiary(
            &self,
            request: &BeneficiarySettlementRequest,
        ) -> UpstreamResult<()> {
            let url = format!("{}/settle/beneficiary", self.base_url);

            let response = self
                .client
                .post(&url)
                .json(&serde_json::json!({
                    "provider_id": request.provider_id,
                    "beneficiary": request.beneficiary,
                    "accountant_id": request.accountant_id,
                }))
                .send()
                .await
                .map_err(unavailable)?;

            ensure_success(response).await.map(|_| ())
        }

        async fn accountant_fee(&self) -> UpstreamResult<u16> {
            let url = format!("{}/fee/accountant", self.base_url);

            let response = self.client.get(&url).send().await.map_err(unavailable)?;
            let response = ensure_success(response).await?;

            response
                .json::<FeeResponse<u16>>()
                .await
                .map(|body| body.fee)
                .map_err(unavailable)
        }
    }
}
