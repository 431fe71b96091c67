//! Settlement Manager - entry point for every gateway operation

use chrono::Utc;
use common::types::Identity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::clients::settler::PromiseSettler;
use crate::clients::transactor::Transactor;
use crate::dispatcher::SettlementDispatcher;
use crate::error::{Result, SettlementError};
use crate::fees::FeeAggregator;
use crate::history::{paginate, HistorySettings, Page, SettlementHistoryParams};
use crate::observer::SettlementObserver;
use crate::store::traits::SettlementHistoryStore;
use crate::types::{
    decode_body, FeeQuote, IdentityRegistrationRequest, SettlementHistoryEntry, SettlementMode,
    SettlementOutcome, TopUpRequest,
};

pub const DECODE_TOP_UP_CONTEXT: &str = "failed to parse top up request";
pub const TOP_UP_CONTEXT: &str = "failed top up request";
pub const DECODE_REGISTRATION_CONTEXT: &str = "failed to parse identity registration request";
pub const REGISTRATION_CONTEXT: &str = "failed identity registration request";

/// Tunables for the manager
#[derive(Debug, Clone, Copy)]
pub struct ManagerSettings {
    pub history: HistorySettings,
    pub async_max_in_flight: usize,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            history: HistorySettings::default(),
            async_max_in_flight: 64,
        }
    }
}

/// Settlement Manager - owns the collaborators and exposes one method per operation
pub struct SettlementManager {
    transactor: Arc<dyn Transactor>,
    fees: FeeAggregator,
    dispatcher: SettlementDispatcher,
    history_store: Arc<dyn SettlementHistoryStore>,
    history_settings: HistorySettings,
}

impl SettlementManager {
    pub fn new(
        transactor: Arc<dyn Transactor>,
        settler: Arc<dyn PromiseSettler>,
        history_store: Arc<dyn SettlementHistoryStore>,
        observer: Arc<dyn SettlementObserver>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            fees: FeeAggregator::new(Arc::clone(&transactor), Arc::clone(&settler)),
            dispatcher: SettlementDispatcher::new(settler, observer, settings.async_max_in_flight),
            transactor,
            history_store,
            history_settings: settings.history,
        }
    }

    /// Registration, settlement and accountant fees in one quote
    pub async fn get_fees(&self) -> Result<FeeQuote> {
        self.fees.get_fees().await
    }

    /// Register an identity; an empty body registers with defaults
    pub async fn register_identity(&self, identity: &str, body: &[u8]) -> Result<()> {
        let identity = Identity::parse(identity)?;
        let request: IdentityRegistrationRequest = if body.iter().all(u8::is_ascii_whitespace) {
            IdentityRegistrationRequest::default()
        } else {
            decode_body(body, DECODE_REGISTRATION_CONTEXT)?
        };

        info!(%identity, "Registering identity");

        self.transactor
            .register_identity(&identity, &request)
            .await
            .map_err(|e| SettlementError::dependency(REGISTRATION_CONTEXT, e))
    }

    /// Settle a provider's promises towards a new beneficiary
    pub async fn set_beneficiary(&self, identity: &str, body: &[u8]) -> Result<()> {
        let identity = Identity::parse(identity)?;
        self.dispatcher.settle_with_beneficiary(identity, body).await
    }

    pub async fn top_up(&self, body: &[u8]) -> Result<()> {
        let request: TopUpRequest = decode_body(body, DECODE_TOP_UP_CONTEXT)?;

        info!(identity = %request.identity, "Topping up identity");

        self.transactor
            .top_up(&request.identity)
            .await
            .map_err(|e| SettlementError::dependency(TOP_UP_CONTEXT, e))
    }

    pub async fn settle(&self, body: &[u8], mode: SettlementMode) -> Result<SettlementOutcome> {
        self.dispatcher.settle(body, mode).await
    }

    /// One page of settlement history, newest first
    pub async fn list_settlements(
        &self,
        params: &SettlementHistoryParams,
    ) -> Result<Page<SettlementHistoryEntry>> {
        let request = params.parse(Utc::now(), &self.history_settings)?;

        let entries = self.history_store.query(&request.query).await?;
        debug!(
            matched = entries.len(),
            page = request.page,
            page_size = request.page_size,
            "Settlement history queried"
        );

        Ok(paginate(entries, request.page, request.page_size))
    }

    /// Background settlements still running
    pub fn in_flight_settlements(&self) -> usize {
        self.dispatcher.in_flight()
    }

    /// Wait up to `grace` for background settlements; `false` if some remain
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.dispatcher.shutdown(grace).await
    }

    #[cfg(test)]
    pub(crate) async fn wait_idle(&self) {
        self.dispatcher.wait_idle().await;
    }
}
