use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    entities::{supplier, supplier_price, supplier_shipping, upc_alias},
    errors::ApiError,
    handlers::AppState,
    services::{
        prices::{BulkPriceResult, ManualPriceEntry},
        suppliers::{NewShippingProfile, NewSupplier, NewUpcAlias, SupplierUpdate},
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

fn default_active_only() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierListParams {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceListParams {
    pub department: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct BulkPriceRequest {
    #[validate(length(min = 1, max = 5000))]
    pub prices: Vec<ManualPriceEntry>,
}

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier)
                .put(update_supplier)
                .delete(deactivate_supplier),
        )
        .route("/:id/prices", get(list_prices).post(add_price))
        .route("/:id/prices/bulk", post(bulk_add_prices))
        .route("/:id/shipping", post(add_shipping_profile))
        .route("/:id/aliases", post(add_upc_alias))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/suppliers",
    params(SupplierListParams),
    responses(
        (status = 200, description = "Suppliers ordered by name", body = [supplier::Model])
    ),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(params): Query<SupplierListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .services
        .suppliers
        .list_suppliers(params.active_only)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(suppliers))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/suppliers",
    request_body = NewSupplier,
    responses(
        (status = 201, description = "Supplier created", body = supplier::Model),
        (status = 400, description = "Invalid request or duplicate code", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<NewSupplier>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let supplier = state
        .services
        .suppliers
        .create_supplier(payload)
        .await
        .map_err(map_service_error)?;

    info!(supplier_id = supplier.id, code = %supplier.code, "Supplier created");
    Ok(created_response(supplier))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier", body = supplier::Model),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .services
        .suppliers
        .get_supplier(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(supplier))
}

#[utoipa::path(
    put,
    path = "/api/best-buy/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier ID")),
    request_body = SupplierUpdate,
    responses(
        (status = 200, description = "Supplier updated", body = supplier::Model),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SupplierUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let supplier = state
        .services
        .suppliers
        .update_supplier(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(supplier))
}

/// Suppliers are never hard-deleted; prices and orders keep pointing at them
#[utoipa::path(
    delete,
    path = "/api/best-buy/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier deactivated", body = supplier::Model),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .services
        .suppliers
        .deactivate_supplier(id)
        .await
        .map_err(map_service_error)?;

    info!(supplier_id = id, "Supplier deactivated");
    Ok(success_response(supplier))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/suppliers/{id}/prices",
    params(
        ("id" = i32, Path, description = "Supplier ID"),
        PriceListParams
    ),
    responses(
        (status = 200, description = "Price history, newest first", body = [supplier_price::Model]),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "prices"
)]
pub async fn list_prices(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PriceListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let prices = state
        .services
        .prices
        .get_supplier_prices(id, params.department, params.limit)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(prices))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/suppliers/{id}/prices",
    params(("id" = i32, Path, description = "Supplier ID")),
    request_body = ManualPriceEntry,
    responses(
        (status = 201, description = "Price recorded", body = supplier_price::Model),
        (status = 400, description = "Invalid price", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "prices"
)]
pub async fn add_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ManualPriceEntry>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let price = state
        .services
        .prices
        .add_supplier_price(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(price))
}

/// Upload a price list; invalid rows are reported without failing the rest
#[utoipa::path(
    post,
    path = "/api/best-buy/suppliers/{id}/prices/bulk",
    params(("id" = i32, Path, description = "Supplier ID")),
    request_body = BulkPriceRequest,
    responses(
        (status = 200, description = "Per-row outcome", body = BulkPriceResult),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "prices"
)]
pub async fn bulk_add_prices(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<BulkPriceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let result = state
        .services
        .prices
        .bulk_add_prices(id, payload.prices)
        .await
        .map_err(map_service_error)?;

    info!(
        supplier_id = id,
        created = result.created,
        failed = result.failed,
        "Bulk price upload processed"
    );
    Ok(success_response(result))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/suppliers/{id}/shipping",
    params(("id" = i32, Path, description = "Supplier ID")),
    request_body = NewShippingProfile,
    responses(
        (status = 201, description = "Shipping profile added", body = supplier_shipping::Model),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn add_shipping_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<NewShippingProfile>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let profile = state
        .services
        .suppliers
        .add_shipping_profile(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(profile))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/suppliers/{id}/aliases",
    params(("id" = i32, Path, description = "Supplier ID")),
    request_body = NewUpcAlias,
    responses(
        (status = 201, description = "Alias added", body = upc_alias::Model),
        (status = 409, description = "Alias already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn add_upc_alias(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<NewUpcAlias>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let alias = state
        .services
        .suppliers
        .add_upc_alias(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_list_defaults_to_active_only() {
        let params: SupplierListParams = serde_json::from_str("{}").unwrap();
        assert!(params.active_only);
    }
}
