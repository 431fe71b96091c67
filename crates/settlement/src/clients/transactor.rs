//! Transactor client - trait and implementations

use async_trait::async_trait;
use common::types::Identity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{UpstreamError, UpstreamResult};
use crate::types::IdentityRegistrationRequest;

/// Client trait for the transactor - protocol agnostic
///
/// The transactor quotes registration and settlement fees and submits
/// registration and top-up transactions on behalf of identities.
#[async_trait]
pub trait Transactor: Send + Sync {
    async fn registration_fee(&self) -> UpstreamResult<u64>;

    async fn settlement_fee(&self) -> UpstreamResult<u64>;

    async fn top_up(&self, identity: &Identity) -> UpstreamResult<()>;

    async fn register_identity(
        &self,
        identity: &Identity,
        request: &IdentityRegistrationRequest,
    ) -> UpstreamResult<()>;
}

// ==================== Mock Implementation ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactorOp {
    RegistrationFee = 0,
    SettlementFee = 1,
    TopUp = 2,
    RegisterIdentity = 3,
}

/// Mock transactor for testing
pub struct MockTransactor {
    registration_fee: u64,
    settlement_fee: u64,
    failures: Vec<(TransactorOp, UpstreamError)>,
    delay: Option<Duration>,
    calls: [AtomicUsize; 4],
}

impl MockTransactor {
    pub fn new() -> Self {
        Self {
            registration_fee: 0,
            settlement_fee: 0,
            failures: Vec::new(),
            delay: None,
            calls: Default::default(),
        }
    }

    /// Configure the quoted fees
    pub fn with_fees(mut self, registration: u64, settlement: u64) -> Self {
        self.registration_fee = registration;
        self.settlement_fee = settlement;
        self
    }

    /// Make one operation fail with the given error
    pub fn with_failure(mut self, op: TransactorOp, error: UpstreamError) -> Self {
        self.failures.push((op, error));
        self
    }

    /// Delay every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times an operation was invoked
    pub fn calls(&self, op: TransactorOp) -> usize {
        self.calls[op as usize].load(Ordering::SeqCst)
    }

    async fn invoke(&self, op: TransactorOp) -> UpstreamResult<()> {
        self.calls[op as usize].fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.iter().find(|(failing, _)| *failing == op) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockTransactor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transactor for MockTransactor {
    async fn registration_fee(&self) -> UpstreamResult<u64> {
        self.invoke(TransactorOp::RegistrationFee).await?;
        Ok(self.registration_fee)
    }

    async fn settlement_fee(&self) -> UpstreamResult<u64> {
        self.invoke(TransactorOp::SettlementFee).await?;
        Ok(self.settlement_fee)
    }

    async fn top_up(&self, _identity: &Identity) -> UpstreamResult<()> {
        self.invoke(TransactorOp::TopUp).await
    }

    async fn register_identity(
        &self,
        _identity: &Identity,
        _request: &IdentityRegistrationRequest,
    ) -> UpstreamResult<()> {
        self.invoke(TransactorOp::RegisterIdentity).await
    }
}

// ==================== HTTP Implementation ====================

#[cfg(feature = "client")]
pub mod http {
    use async_trait::async_trait;
    use common::types::Identity;
    use reqwest::Client;
    use std::time::Duration;
    use tracing::debug;

    use super::Transactor;
    use crate::clients::http::{build_client, ensure_success, unavailable, FeeResponse};
    use crate::error::UpstreamResult;
    use crate::types::IdentityRegistrationRequest;

    /// HTTP-based transactor client
    pub struct HttpTransactor {
        client: Client,
        base_url: String,
    }

    impl HttpTransactor {
        pub fn new(base_url: &str, timeout: Duration) -> UpstreamResult<Self> {
            Ok(Self {
                client: build_client(timeout)?,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        async fn fetch_fee(&self, path: &str) -> UpstreamResult<u64> {
            let url = format!("{}{}", self.base_url, path);
            debug!(%url, "Fetching transactor fee");

            let response = self.client.get(&url).send().await.map_err(unavailable)?;
            let response = ensure_success(response).await?;

            response
                .json::<FeeResponse<u64>>()
                .await
                .map(|body| body.fee)
                .map_err(unavailable)
        }
    }

    #[async_trait]
    impl Transactor for HttpTransactor {
        async fn registration_fee(&self) -> UpstreamResult<u64> {
            self.fetch_fee("/fee/register").await
        }

        async fn settlement_fee(&self) -> UpstreamResult<u64> {
            self.fetch_fee("/fee/settle").await
        }

        async fn top_up(&self, identity: &Identity) -> UpstreamResult<()> {
            let url = format!("{}/topup", self.base_url);

            let response = self
                .client
                .post(&url)
                .json(&serde_json::json!({ "identity": identity }))
                .send()
                .await
                .map_err(unavailable)?;

            ensure_success(response).await.map(|_| ())
        }

        async fn register_identity(
            &self,
            identity: &Identity,
            request: &IdentityRegistrationRequest,
        ) -> UpstreamResult<()> {
            let url = format!("{}/identity/register", self.base_url);

            let response = self
                .client
                .post(&url)
                .json(&serde_json::json!({
                    "identity": identity,
                    "stake": request.stake,
                    "beneficiary": request.beneficiary,
                    "fee": request.fee,
                    "referral_token": request.referral_token,
                }))
                .send()
                .await
                .map_err(unavailable)?;

            ensure_success(response).await.map(|_| ())
        }
    }
}
