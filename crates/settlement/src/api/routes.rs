//! API routes for settlement operations

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::*;
use crate::api::SettlementApiState;
use crate::manager::SettlementManager;

/// Create the settlement router
pub fn create_router(manager: Arc<SettlementManager>) -> Router {
    let state = SettlementApiState { manager };

    Router::new()
        .route("/health", get(health_handler))
        .route("/transactor/fees", get(transactor_fees))
        .route("/identities/:id/register", post(register_identity))
        .route("/identities/:id/beneficiary", post(set_beneficiary))
        .route("/transactor/topup", post(top_up))
        .route("/transactor/settle/sync", post(settle_sync))
        .route("/transactor/settle/async", post(settle_async))
        .route("/transactor/settle/history", get(settlement_history))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ErrorResponse, ListSettlementsResponse};
    use crate::clients::settler::{MockPromiseSettler, SettlerOp};
    use crate::clients::transactor::{MockTransactor, TransactorOp};
    use crate::error::UpstreamError;
    use crate::manager::ManagerSettings;
    use crate::observer::RecordingObserver;
    use crate::store::memory::InMemorySettlementHistoryStore;
    use crate::test_support::{recent_entries, ACCOUNTANT, PROVIDER};
    use crate::types::FeeQuote;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        manager: Arc<SettlementManager>,
        transactor: Arc<MockTransactor>,
        settler: Arc<MockPromiseSettler>,
    }

    fn app(transactor: MockTransactor, settler: MockPromiseSettler) -> TestApp {
        let transactor = Arc::new(transactor);
        let settler = Arc::new(settler);
        let store = InMemorySettlementHistoryStore::with_entries(recent_entries(120, Utc::now()));

        let manager = Arc::new(SettlementManager::new(
            transactor.clone(),
            settler.clone(),
            Arc::new(store),
            Arc::new(RecordingObserver::new()),
            ManagerSettings::default(),
        ));

        TestApp {
            router: create_router(manager.clone()),
            manager,
            transactor,
            settler,
        }
    }

    async fn send(router: &Router, method: &str, uri: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    fn settle_body() -> String {
        format!(
            r#"{{"provider_id":"{}","accountant_id":"{}"}}"#,
            PROVIDER, ACCOUNTANT
        )
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());
        let (status, body) = send(&app.router, "GET", "/health", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("healthy"));
    }

    #[tokio::test]
    async fn test_fees() {
        let app = app(
            MockTransactor::new().with_fees(100, 50),
            MockPromiseSettler::new().with_accountant_fee(250),
        );
        let (status, body) = send(&app.router, "GET", "/transactor/fees", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);

        let quote: FeeQuote = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            quote,
            FeeQuote {
                registration: 100,
                settlement: 50,
                accountant: 250
            }
        );
    }

    #[tokio::test]
    async fn test_fee_failure_is_500() {
        let app = app(
            MockTransactor::new().with_failure(
                TransactorOp::SettlementFee,
                UpstreamError::Unavailable("timeout".into()),
            ),
            MockPromiseSettler::new(),
        );
        let (status, body) = send(&app.router, "GET", "/transactor/fees", Body::empty()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(!error.success);
        assert_eq!(error.error.code, "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_settle_sync_status_codes() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());

        let (status, _) = send(&app.router, "POST", "/transactor/settle/sync", settle_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.settler.completed(SettlerOp::ForceSettle), 1);

        let (status, body) = send(&app.router, "POST", "/transactor/settle/sync", "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error.code, "BAD_REQUEST");
        assert!(error.error.message.starts_with("failed to unmarshal settle request"));
    }

    #[tokio::test]
    async fn test_settle_sync_failure_is_500() {
        let app = app(
            MockTransactor::new(),
            MockPromiseSettler::new().with_failure(
                SettlerOp::ForceSettle,
                UpstreamError::Rejected("nothing to settle".into()),
            ),
        );
        let (status, body) = send(&app.router, "POST", "/transactor/settle/sync", settle_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.message.starts_with("settling failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_async_accepts_failing_settlement() {
        let app = app(
            MockTransactor::new(),
            MockPromiseSettler::new()
                .with_delay(Duration::from_secs(5))
                .with_failure(SettlerOp::ForceSettle, UpstreamError::Rejected("no".into())),
        );

        let (status, _) = send(&app.router, "POST", "/transactor/settle/async", settle_body()).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        assert!(app.manager.shutdown(Duration::from_secs(10)).await);
        assert_eq!(app.settler.completed(SettlerOp::ForceSettle), 1);
    }

    #[tokio::test]
    async fn test_identity_routes() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());

        let (status, _) = send(
            &app.router,
            "POST",
            &format!("/identities/{}/register", PROVIDER),
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(app.transactor.calls(TransactorOp::RegisterIdentity), 1);

        let beneficiary = format!(
            r#"{{"beneficiary":"{}","accountant_id":"{}"}}"#,
            PROVIDER, ACCOUNTANT
        );
        let (status, _) = send(
            &app.router,
            "POST",
            &format!("/identities/{}/beneficiary", PROVIDER),
            beneficiary,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, _) = send(&app.router, "POST", "/identities/0x12/register", Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_top_up() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());
        let body = format!(r#"{{"identity":"{}"}}"#, PROVIDER);

        let (status, _) = send(&app.router, "POST", "/transactor/topup", body).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, _) = send(&app.router, "POST", "/transactor/topup", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.transactor.calls(TransactorOp::TopUp), 1);
    }

    #[tokio::test]
    async fn test_history_paging() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());

        let (status, body) = send(
            &app.router,
            "GET",
            "/transactor/settle/history?page=3&page_size=50",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let page: ListSettlementsResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.paging.total_items, 120);
        assert_eq!(page.paging.total_pages, 3);
        assert_eq!(page.paging.previous_page, Some(2));
        assert_eq!(page.paging.next_page, None);
    }

    #[tokio::test]
    async fn test_history_bad_timestamp() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());
        let (status, body) = send(
            &app.router,
            "GET",
            "/transactor/settle/history?at_from=yesterday",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.message.contains("at_from"));
    }

    #[tokio::test]
    async fn test_history_malformed_query_uses_error_envelope() {
        let app = app(MockTransactor::new(), MockPromiseSettler::new());
        let (status, body) = send(
            &app.router,
            "GET",
            "/transactor/settle/history?page=1&page=2",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(!error.success);
        assert_eq!(error.error.code, "BAD_REQUEST");
        assert!(error
            .error
            .message
            .starts_with("failed to parse settlement history query"));
    }
}
