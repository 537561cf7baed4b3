use super::common::{created_response, map_service_error, status_response, success_response, validate_input};
use crate::{
    entities::purchase_order,
    errors::ApiError,
    handlers::AppState,
    services::purchase_orders::{
        LineItemChange, NewLineItem, NewPurchaseOrder, OrderListFilter, PurchaseOrderDetail,
        PurchaseOrderSummary, PurchaseOrderUpdate, SendOrderInput,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use tracing::info;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/:id/items", post(add_item))
        .route("/:id/items/:item_id", delete(remove_item))
        .route("/:id/send", post(send_order))
        .route("/:id/close", post(close_order))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/orders",
    params(OrderListFilter),
    responses(
        (status = 200, description = "Purchase orders, newest first", body = [PurchaseOrderSummary])
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderListFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .purchase_orders
        .list(filter)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

/// Create a draft purchase order, optionally with initial lines
#[utoipa::path(
    post,
    path = "/api/best-buy/orders",
    request_body = NewPurchaseOrder,
    responses(
        (status = 201, description = "Draft order created", body = PurchaseOrderDetail),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<NewPurchaseOrder>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    for item in &payload.items {
        validate_input(item)?;
    }

    let order = state
        .services
        .purchase_orders
        .create(payload)
        .await
        .map_err(map_service_error)?;

    info!(po_number = %order.order.po_number, "Purchase order created");
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/orders/{id}",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Order with lines", body = PurchaseOrderDetail),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

#[utoipa::path(
    patch,
    path = "/api/best-buy/orders/{id}",
    params(("id" = i32, Path, description = "Purchase order ID")),
    request_body = PurchaseOrderUpdate,
    responses(
        (status = 200, description = "Order updated", body = purchase_order::Model),
        (status = 400, description = "Order is closed", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PurchaseOrderUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .purchase_orders
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

#[utoipa::path(
    delete,
    path = "/api/best-buy/orders/{id}",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Draft order deleted", body = super::common::StatusMessage),
        (status = 400, description = "Only drafts can be deleted", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .purchase_orders
        .delete(id)
        .await
        .map_err(map_service_error)?;

    info!(po_id = id, "Purchase order deleted");
    Ok(status_response("deleted"))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/orders/{id}/items",
    params(("id" = i32, Path, description = "Purchase order ID")),
    request_body = NewLineItem,
    responses(
        (status = 201, description = "Line added or merged", body = LineItemChange),
        (status = 400, description = "Order does not accept items or no price known", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<NewLineItem>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let change = state
        .services
        .purchase_orders
        .add_item(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(change))
}

#[utoipa::path(
    delete,
    path = "/api/best-buy/orders/{id}/items/{item_id}",
    params(
        ("id" = i32, Path, description = "Purchase order ID"),
        ("item_id" = i32, Path, description = "Line item ID")
    ),
    responses(
        (status = 200, description = "Line removed", body = LineItemChange),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let change = state
        .services
        .purchase_orders
        .remove_item(id, item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(change))
}

/// Mark a draft order as sent to the supplier
#[utoipa::path(
    post,
    path = "/api/best-buy/orders/{id}/send",
    params(("id" = i32, Path, description = "Purchase order ID")),
    request_body = SendOrderInput,
    responses(
        (status = 200, description = "Order sent", body = purchase_order::Model),
        (status = 400, description = "Order is not a non-empty draft", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn send_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Option<Json<SendOrderInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let order = state
        .services
        .purchase_orders
        .send(id, payload)
        .await
        .map_err(map_service_error)?;

    info!(po_number = %order.po_number, "Purchase order sent");
    Ok(success_response(order))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/orders/{id}/close",
    params(("id" = i32, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Order closed", body = purchase_order::Model),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn close_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .close(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}
