use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::receiving::{
        CompleteSession, CompletionResult, PoReceivingStatus, ReceiveItem, ReceiveResult,
        SessionDetail, SessionListFilter, SessionStarted, SessionSummary, StartReceiving,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::info;

pub fn receiving_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(start_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/receive", post(receive_item))
        .route("/sessions/:id/complete", post(complete_session))
        .route("/po/:po_id/status", get(po_status))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/receiving/sessions",
    params(SessionListFilter),
    responses(
        (status = 200, description = "Receiving sessions, newest first", body = [SessionSummary])
    ),
    tag = "receiving"
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<SessionListFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state
        .services
        .receiving
        .list(filter)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(sessions))
}

/// Open a receiving session against a purchase order or a bare supplier delivery
#[utoipa::path(
    post,
    path = "/api/best-buy/receiving/sessions",
    request_body = StartReceiving,
    responses(
        (status = 201, description = "Session started", body = SessionStarted),
        (status = 400, description = "Missing reference or closed order", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn start_session(
    State(state): State<AppState>,
    Json(payload): Json<StartReceiving>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let started = state
        .services
        .receiving
        .start(payload)
        .await
        .map_err(map_service_error)?;

    info!(session_id = started.session.id, "Receiving session started");
    Ok(created_response(started))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/receiving/sessions/{id}",
    params(("id" = i32, Path, description = "Receiving session ID")),
    responses(
        (status = 200, description = "Session with expected and received items", body = SessionDetail),
        (status = 404, description = "Session not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .receiving
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Record one scanned item on the dock
#[utoipa::path(
    post,
    path = "/api/best-buy/receiving/sessions/{id}/receive",
    params(("id" = i32, Path, description = "Receiving session ID")),
    request_body = ReceiveItem,
    responses(
        (status = 201, description = "Item recorded", body = ReceiveResult),
        (status = 400, description = "Invalid quantities or session completed", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn receive_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReceiveItem>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let result = state
        .services
        .receiving
        .receive(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(result))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/receiving/sessions/{id}/complete",
    params(("id" = i32, Path, description = "Receiving session ID")),
    request_body = CompleteSession,
    responses(
        (status = 200, description = "Session completed", body = CompletionResult),
        (status = 400, description = "Session already completed", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Option<Json<CompleteSession>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let completed = state
        .services
        .receiving
        .complete(id, payload)
        .await
        .map_err(map_service_error)?;

    info!(session_id = id, po_status = ?completed.po_status, "Receiving session completed");
    Ok(success_response(completed))
}

/// Per-line receiving progress for a purchase order
#[utoipa::path(
    get,
    path = "/api/best-buy/receiving/po/{po_id}/status",
    params(("po_id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Receiving progress", body = PoReceivingStatus),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "receiving"
)]
pub async fn po_status(
    State(state): State<AppState>,
    Path(po_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .services
        .receiving
        .po_status(po_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(status))
}
