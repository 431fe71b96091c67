//! Settlement dispatcher
//!
//! Runs a settlement either in the caller's task (sync) or on a tracked
//! background task (async). Background outcomes go to the injected observer.

use common::types::Identity;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::clients::settler::PromiseSettler;
use crate::error::{Result, SettlementError};
use crate::observer::SettlementObserver;
use crate::types::{
    decode_body, BeneficiaryRequest, BeneficiarySettlementRequest, SettlementMode,
    SettlementOutcome, SettlementRequest,
};

pub const DECODE_SETTLE_CONTEXT: &str = "failed to unmarshal settle request";
pub const SETTLE_CONTEXT: &str = "settling failed";
pub const DECODE_BENEFICIARY_CONTEXT: &str = "failed to parse set beneficiary request";
pub const BENEFICIARY_CONTEXT: &str = "failed set beneficiary request";

pub struct SettlementDispatcher {
    settler: Arc<dyn PromiseSettler>,
    observer: Arc<dyn SettlementObserver>,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
}

impl SettlementDispatcher {
    /// `max_in_flight` bounds how many background settlements talk to the
    /// settler at once; acceptance itself never waits for a slot.
    pub fn new(
        settler: Arc<dyn PromiseSettler>,
        observer: Arc<dyn SettlementObserver>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            settler,
            observer,
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Decode a settle request body
    pub fn decode(body: &[u8]) -> Result<SettlementRequest> {
        decode_body(body, DECODE_SETTLE_CONTEXT)
    }

    /// Decode and dispatch a settle request body
    pub async fn settle(&self, body: &[u8], mode: SettlementMode) -> Result<SettlementOutcome> {
        let request = Self::decode(body)?;
        self.dispatch(request, mode).await
    }

    #[instrument(skip(self, request), fields(provider = %request.provider_id, accountant = %request.accountant_id))]
    pub async fn dispatch(
        &self,
        request: SettlementRequest,
        mode: SettlementMode,
    ) -> Result<SettlementOutcome> {
        match mode {
            SettlementMode::Sync => {
                self.settler
                    .force_settle(&request.provider_id, &request.accountant_id)
                    .await
                    .map_err(|e| SettlementError::dependency(SETTLE_CONTEXT, e))?;

                info!("Settlement completed");
                Ok(SettlementOutcome::Completed)
            }
            SettlementMode::Async => {
                self.spawn_settlement(request);
                Ok(SettlementOutcome::Accepted)
            }
        }
    }

    fn spawn_settlement(&self, request: SettlementRequest) {
        self.observer.on_accepted(&request);

        let settler = Arc::clone(&self.settler);
        let observer = Arc::clone(&self.observer);
        let permits = Arc::clone(&self.permits);

        self.tracker.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let error = SettlementError::Internal("settlement slots closed".into());
                    observer.on_failed(&request, &error);
                    return;
                }
            };

            debug!(provider = %request.provider_id, "Background settlement started");

            match settler
                .force_settle(&request.provider_id, &request.accountant_id)
                .await
            {
                Ok(()) => observer.on_completed(&request),
                Err(e) => {
                    let error = SettlementError::dependency(SETTLE_CONTEXT, e);
                    observer.on_failed(&request, &error);
                }
            }
        });
    }

    /// Settle a provider's promises, redirecting proceeds to a new beneficiary
    #[instrument(skip(self, provider, body), fields(provider = %provider))]
    pub async fn settle_with_beneficiary(&self, provider: Identity, body: &[u8]) -> Result<()> {
        let body: BeneficiaryRequest = decode_body(body, DECODE_BENEFICIARY_CONTEXT)?;
        let request = BeneficiarySettlementRequest::new(provider, body);

        self.settler
            .settle_with_beneficiary(&request)
            .await
            .map_err(|e| SettlementError::dependency(BENEFICIARY_CONTEXT, e))?;

        info!(beneficiary = %request.beneficiary, "Beneficiary settlement completed");
        Ok(())
    }

    /// Background settlements currently tracked
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every background settlement spawned so far has finished
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Stop tracking new work and wait up to `grace` for in-flight settlements
    ///
    /// Returns `false` if some settlements were still running at the deadline.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "Waiting for background settlements to finish");
        }

        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    remaining = self.tracker.len(),
                    "Shutdown grace period elapsed with settlements still running"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::settler::{MockPromiseSettler, SettlerOp};
    use crate::error::UpstreamError;
    use crate::observer::{ObservedOutcome, RecordingObserver};
    use crate::test_support::{accountant, provider, ACCOUNTANT, PROVIDER};
    use assert_matches::assert_matches;

    fn settle_body() -> Vec<u8> {
        format!(
            r#"{{"provider_id":"{}","accountant_id":"{}"}}"#,
            PROVIDER, ACCOUNTANT
        )
        .into_bytes()
    }

    fn dispatcher(
        settler: Arc<MockPromiseSettler>,
        observer: Arc<RecordingObserver>,
        max_in_flight: usize,
    ) -> SettlementDispatcher {
        SettlementDispatcher::new(settler, observer, max_in_flight)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_waits_for_settlement() {
        let settler = Arc::new(MockPromiseSettler::new().with_delay(Duration::from_secs(5)));
        let observer = Arc::new(RecordingObserver::new());
        let dispatcher = dispatcher(settler.clone(), observer.clone(), 4);

        let outcome = dispatcher
            .settle(&settle_body(), SettlementMode::Sync)
            .await
            .unwrap();

        assert_eq!(outcome, SettlementOutcome::Completed);
        assert_eq!(settler.completed(SettlerOp::ForceSettle), 1);
        assert!(observer.accepted().is_empty());
    }

    #[tokio::test]
    async fn test_sync_failure_keeps_cause() {
        let cause = UpstreamError::Rejected("channel is closed".into());
        let settler = Arc::new(
            MockPromiseSettler::new().with_failure(SettlerOp::ForceSettle, cause.clone()),
        );
        let dispatcher = dispatcher(settler, Arc::new(RecordingObserver::new()), 4);

        let err = dispatcher
            .settle(&settle_body(), SettlementMode::Sync)
            .await
            .unwrap_err();

        assert_matches!(
            err,
            SettlementError::Dependency { context: SETTLE_CONTEXT, ref source } if *source == cause
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_accepts_before_failing_settlement_runs() {
        let settler = Arc::new(
            MockPromiseSettler::new()
                .with_delay(Duration::from_secs(30))
                .with_failure(SettlerOp::ForceSettle, UpstreamError::Unavailable("down".into())),
        );
        let observer = Arc::new(RecordingObserver::new());
        let dispatcher = dispatcher(settler.clone(), observer.clone(), 4);

        let outcome = dispatcher
            .settle(&settle_body(), SettlementMode::Async)
            .await
            .unwrap();

        assert_eq!(outcome, SettlementOutcome::Accepted);
        assert_eq!(settler.completed(SettlerOp::ForceSettle), 0);
        assert!(observer.outcomes().is_empty());
        assert_eq!(observer.accepted().len(), 1);

        dispatcher.wait_idle().await;

        let request = SettlementRequest {
            provider_id: provider(),
            accountant_id: accountant(),
        };
        assert_eq!(
            observer.outcomes(),
            vec![ObservedOutcome::Failed(
                request,
                "settling failed: upstream unavailable: down".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_acceptance_never_waits_for_a_slot() {
        let settler = Arc::new(MockPromiseSettler::new().with_delay(Duration::from_secs(10)));
        let observer = Arc::new(RecordingObserver::new());
        let dispatcher = dispatcher(settler.clone(), observer.clone(), 1);

        for _ in 0..3 {
            let outcome = dispatcher
                .settle(&settle_body(), SettlementMode::Async)
                .await
                .unwrap();
            assert_eq!(outcome, SettlementOutcome::Accepted);
        }
        assert_eq!(dispatcher.in_flight(), 3);

        dispatcher.wait_idle().await;

        assert_eq!(settler.completed(SettlerOp::ForceSettle), 3);
        assert_eq!(observer.outcomes().len(), 3);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error_in_both_modes() {
        let settler = Arc::new(MockPromiseSettler::new());
        let dispatcher = dispatcher(settler.clone(), Arc::new(RecordingObserver::new()), 4);

        for mode in [SettlementMode::Sync, SettlementMode::Async] {
            let err = dispatcher.settle(b"{\"provider_id\":", mode).await.unwrap_err();
            assert_matches!(
                err,
                SettlementError::InvalidRequest {
                    context: DECODE_SETTLE_CONTEXT,
                    ..
                }
            );

            let bad_address = format!(
                r#"{{"provider_id":"0xnothex","accountant_id":"{}"}}"#,
                ACCOUNTANT
            );
            let err = dispatcher.settle(bad_address.as_bytes(), mode).await.unwrap_err();
            assert!(err.is_client_error());
        }

        assert_eq!(settler.calls(SettlerOp::ForceSettle), 0);
    }

    #[tokio::test]
    async fn test_settle_with_beneficiary() {
        let settler = Arc::new(MockPromiseSettler::new());
        let dispatcher = dispatcher(settler.clone(), Arc::new(RecordingObserver::new()), 4);

        let body = format!(
            r#"{{"beneficiary":"{}","accountant_id":"{}"}}"#,
            PROVIDER, ACCOUNTANT
        );
        dispatcher
            .settle_with_beneficiary(provider(), body.as_bytes())
            .await
            .unwrap();
        assert_eq!(settler.completed(SettlerOp::SettleWithBeneficiary), 1);

        let err = dispatcher
            .settle_with_beneficiary(provider(), b"{}")
            .await
            .unwrap_err();
        assert_matches!(
            err,
            SettlementError::InvalidRequest {
                context: DECODE_BENEFICIARY_CONTEXT,
                ..
            }
        );
    }

    #[tokio::test]
    async fn test_beneficiary_failure_is_dependency_error() {
        let settler = Arc::new(MockPromiseSettler::new().with_failure(
            SettlerOp::SettleWithBeneficiary,
            UpstreamError::Rejected("beneficiary locked".into()),
        ));
        let dispatcher = dispatcher(settler, Arc::new(RecordingObserver::new()), 4);

        let body = format!(
            r#"{{"beneficiary":"{}","accountant_id":"{}"}}"#,
            PROVIDER, ACCOUNTANT
        );
        let err = dispatcher
            .settle_with_beneficiary(provider(), body.as_bytes())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            SettlementError::Dependency {
                context: BENEFICIARY_CONTEXT,
                ..
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_respects_grace_period() {
        let settler = Arc::new(MockPromiseSettler::new().with_delay(Duration::from_secs(60)));
        let dispatcher = dispatcher(settler, Arc::new(RecordingObserver::new()), 4);

        dispatcher
            .settle(&settle_body(), SettlementMode::Async)
            .await
            .unwrap();

        assert!(!dispatcher.shutdown(Duration::from_secs(1)).await);
        assert!(dispatcher.shutdown(Duration::from_secs(120)).await);
    }
}
