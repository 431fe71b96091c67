//! API handlers for settlement HTTP endpoints

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, warn};

use crate::api::models::*;
use crate::api::SettlementApiState;
use crate::error::SettlementError;
use crate::history::SettlementHistoryParams;
use crate::types::{FeeQuote, SettlementMode};

pub const DECODE_HISTORY_QUERY_CONTEXT: &str = "failed to parse settlement history query";

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

/// Map a settlement error onto a status code and error body
pub fn error_response(err: SettlementError) -> ApiError {
    let (status, code) = match &err {
        e if e.is_client_error() => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        SettlementError::Dependency { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
        SettlementError::StorageError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    if status.is_server_error() {
        error!(error = %err, code, "Request failed");
    } else {
        warn!(error = %err, code, "Request rejected");
    }

    (status, Json(ErrorResponse::new(code, err.to_string())))
}

/// Health check handler
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "paygate".to_string(),
    })
}

/// Registration, settlement and accountant fees
pub async fn transactor_fees(
    State(state): State<SettlementApiState>,
) -> ApiResult<Json<FeeQuote>> {
    state
        .manager
        .get_fees()
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn register_identity(
    State(state): State<SettlementApiState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    state
        .manager
        .register_identity(&id, &body)
        .await
        .map(|_| StatusCode::ACCEPTED)
        .map_err(error_response)
}

pub async fn set_beneficiary(
    State(state): State<SettlementApiState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    state
        .manager
        .set_beneficiary(&id, &body)
        .await
        .map(|_| StatusCode::ACCEPTED)
        .map_err(error_response)
}

pub async fn top_up(State(state): State<SettlementApiState>, body: Bytes) -> ApiResult<StatusCode> {
    state
        .manager
        .top_up(&body)
        .await
        .map(|_| StatusCode::ACCEPTED)
        .map_err(error_response)
}

/// Settle and wait for the result
pub async fn settle_sync(
    State(state): State<SettlementApiState>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    state
        .manager
        .settle(&body, SettlementMode::Sync)
        .await
        .map(|_| StatusCode::OK)
        .map_err(error_response)
}

/// Accept a settlement and run it in the background
pub async fn settle_async(
    State(state): State<SettlementApiState>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    state
        .manager
        .settle(&body, SettlementMode::Async)
        .await
        .map(|_| StatusCode::ACCEPTED)
        .map_err(error_response)
}

pub async fn settlement_history(
    State(state): State<SettlementApiState>,
    query: Result<Query<SettlementHistoryParams>, QueryRejection>,
) -> ApiResult<Json<ListSettlementsResponse>> {
    let Query(params) = query.map_err(|rejection| {
        error_response(SettlementError::invalid_request(
            DECODE_HISTORY_QUERY_CONTEXT,
            rejection.body_text(),
        ))
    })?;

    state
        .manager
        .list_settlements(&params)
        .await
        .map(|page| Json(ListSettlementsResponse::from(page)))
        .map_err(error_response)
}
