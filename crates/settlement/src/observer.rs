//! Observers of background settlements
//!
//! Asynchronous settlements never report back to their caller. Their
//! outcome is delivered to a [`SettlementObserver`] instead.

use std::sync::Mutex;
use tracing::{error, info};

use crate::error::SettlementError;
use crate::types::SettlementRequest;

pub const ASYNC_ACCEPTED_TOTAL: &str = "settlement_async_accepted_total";
pub const ASYNC_COMPLETED_TOTAL: &str = "settlement_async_completed_total";
pub const ASYNC_FAILED_TOTAL: &str = "settlement_async_failed_total";

/// Sink for the outcome of background settlements
pub trait SettlementObserver: Send + Sync {
    fn on_accepted(&self, _request: &SettlementRequest) {}

    fn on_completed(&self, request: &SettlementRequest);

    fn on_failed(&self, request: &SettlementRequest, error: &SettlementError);
}

/// Production observer: structured logs plus Prometheus counters
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SettlementObserver for TracingObserver {
    fn on_accepted(&self, request: &SettlementRequest) {
        metrics::counter!(ASYNC_ACCEPTED_TOTAL).increment(1);
        info!(
            provider = %request.provider_id,
            accountant = %request.accountant_id,
            "Async settlement accepted"
        );
    }

    fn on_completed(&self, request: &SettlementRequest) {
        metrics::counter!(ASYNC_COMPLETED_TOTAL).increment(1);
        info!(
            provider = %request.provider_id,
            accountant = %request.accountant_id,
            "Async settlement completed"
        );
    }

    fn on_failed(&self, request: &SettlementRequest, error: &SettlementError) {
        metrics::counter!(ASYNC_FAILED_TOTAL).increment(1);
        error!(
            provider = %request.provider_id,
            accountant = %request.accountant_id,
            %error,
            "could not settle provider promises"
        );
    }
}

/// Observed outcome of one background settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedOutcome {
    Completed(SettlementRequest),
    Failed(SettlementRequest, String),
}

/// Observer that keeps every outcome in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    accepted: Mutex<Vec<SettlementRequest>>,
    outcomes: Mutex<Vec<ObservedOutcome>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> Vec<SettlementRequest> {
        self.accepted
            .lock()
            .map(|accepted| accepted.clone())
            .unwrap_or_default()
    }

    pub fn outcomes(&self) -> Vec<ObservedOutcome> {
        self.outcomes
            .lock()
            .map(|outcomes| outcomes.clone())
            .unwrap_or_default()
    }

    fn record(&self, outcome: ObservedOutcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome);
        }
    }
}

impl SettlementObserver for RecordingObserver {
    fn on_accepted(&self, request: &SettlementRequest) {
        if let Ok(mut accepted) = self.accepted.lock() {
            accepted.push(request.clone());
        }
    }

    fn on_completed(&self, request: &SettlementRequest) {
        self.record(ObservedOutcome::Completed(request.clone()));
    }

    fn on_failed(&self, request: &SettlementRequest, error: &SettlementError) {
        self.record(ObservedOutcome::Failed(request.clone(), error.to_string()));
    }
}
