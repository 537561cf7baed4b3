use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    entities::product,
    errors::ApiError,
    handlers::AppState,
    services::catalog::{NewProduct, ProductFilter, ProductStats, ProductUpdate},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/departments", get(list_departments))
        .route("/vendors", get(list_vendors))
        .route("/stats", get(product_stats))
        .route("/upc/:upc", get(get_product_by_upc))
        .route("/:id", get(get_product).patch(update_product))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Products ordered by name", body = [product::Model])
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_products(filter)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

#[utoipa::path(
    post,
    path = "/api/best-buy/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = product::Model),
        (status = 409, description = "UPC already in catalog", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .create_product(payload)
        .await
        .map_err(map_service_error)?;

    info!(product_id = product.id, upc = %product.upc, "Product created");
    Ok(created_response(product))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/products/departments",
    responses(
        (status = 200, description = "Distinct departments", body = [String])
    ),
    tag = "products"
)]
pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let departments = state
        .services
        .products
        .list_departments()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(departments))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/products/vendors",
    responses(
        (status = 200, description = "Distinct current vendors", body = [String])
    ),
    tag = "products"
)]
pub async fn list_vendors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let vendors = state
        .services
        .products
        .list_vendors()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendors))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/products/stats",
    responses(
        (status = 200, description = "Catalog counts", body = ProductStats)
    ),
    tag = "products"
)]
pub async fn product_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .services
        .products
        .product_stats()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stats))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/products/upc/{upc}",
    params(("upc" = String, Path, description = "Catalog UPC")),
    responses(
        (status = 200, description = "Product", body = product::Model),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product_by_upc(
    State(state): State<AppState>,
    Path(upc): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product_by_upc(upc.trim())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

#[utoipa::path(
    get,
    path = "/api/best-buy/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = product::Model),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

#[utoipa::path(
    patch,
    path = "/api/best-buy/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Product updated", body = product::Model),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .update_product(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}
