use super::common::{created_response, map_service_error, status_response, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::cart::{AddToCart, CartAddResult, CartContents, CartConversion, CartSummary},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateOrdersRequest {
    pub created_by: Option<String>,
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/summary", get(cart_summary))
        .route("/create-pos", post(create_orders))
        .route("/:id", delete(remove_from_cart))
}

/// Cart contents grouped by supplier
#[utoipa::path(
    get,
    path = "/api/best-buy/cart",
    responses(
        (status = 200, description = "Cart contents", body = CartContents)
    ),
    tag = "cart"
)]
pub async fn get_cart(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let contents = state.services.cart.list().await.map_err(map_service_error)?;
    Ok(success_response(contents))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/cart",
    request_body = AddToCart,
    responses(
        (status = 201, description = "Item added or merged", body = CartAddResult),
        (status = 400, description = "No price for this supplier", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCart>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let result = state.services.cart.add(payload).await.map_err(map_service_error)?;

    info!(cart_item_id = result.id, "Cart item saved");
    Ok(created_response(result))
}

#[utoipa::path(
    delete,
    path = "/api/best-buy/cart",
    responses(
        (status = 200, description = "Cart cleared", body = super::common::StatusMessage)
    ),
    tag = "cart"
)]
pub async fn clear_cart(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let removed = state.services.cart.clear().await.map_err(map_service_error)?;
    info!(removed, "Cart cleared");
    Ok(status_response("cleared"))
}

#[utoipa::path(
    delete,
    path = "/api/best-buy/cart/{id}",
    params(("id" = i32, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Item removed", body = super::common::StatusMessage),
        (status = 404, description = "Cart item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.cart.remove(id).await.map_err(map_service_error)?;
    Ok(status_response("deleted"))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/cart/summary",
    responses(
        (status = 200, description = "Cart totals", body = CartSummary)
    ),
    tag = "cart"
)]
pub async fn cart_summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summary = state.services.cart.summary().await.map_err(map_service_error)?;
    Ok(success_response(summary))
}

/// Turn the cart into one draft purchase order per supplier
#[utoipa::path(
    post,
    path = "/api/best-buy/cart/create-pos",
    request_body = CreateOrdersRequest,
    responses(
        (status = 201, description = "Draft orders created", body = CartConversion),
        (status = 400, description = "Cart is empty", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn create_orders(
    State(state): State<AppState>,
    payload: Option<Json<CreateOrdersRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let conversion = state
        .services
        .cart
        .create_orders(payload.created_by)
        .await
        .map_err(map_service_error)?;

    info!(pos_created = conversion.pos_created, "Cart converted to purchase orders");
    Ok(created_response(conversion))
}
