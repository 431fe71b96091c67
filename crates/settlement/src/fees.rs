//! Fee aggregation across the transactor and the promise settler

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::clients::settler::PromiseSettler;
use crate::clients::transactor::Transactor;
use crate::error::{Result, SettlementError};
use crate::types::FeeQuote;

/// Composes one [`FeeQuote`] from three independent fee sources
///
/// Sources are queried in order (registration, settlement, accountant) and
/// the first failure aborts the rest.
pub struct FeeAggregator {
    transactor: Arc<dyn Transactor>,
    settler: Arc<dyn PromiseSettler>,
}

impl FeeAggregator {
    pub fn new(transactor: Arc<dyn Transactor>, settler: Arc<dyn PromiseSettler>) -> Self {
        Self { transactor, settler }
    }

    #[instrument(skip(self))]
    pub async fn get_fees(&self) -> Result<FeeQuote> {
        let registration = self
            .transactor
            .registration_fee()
            .await
            .map_err(|e| SettlementError::dependency("failed to get registration fees", e))?;

        let settlement = self
            .transactor
            .settlement_fee()
            .await
            .map_err(|e| SettlementError::dependency("failed to get settlement fees", e))?;

        let accountant = self
            .settler
            .accountant_fee()
            .await
            .map_err(|e| SettlementError::dependency("failed to get accountant fee", e))?;

        debug!(registration, settlement, accountant, "Fees aggregated");

        Ok(FeeQuote {
            registration,
            settlement,
            accountant,
        })
    }
}
