use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::comparison::{
        BatchComparison, ComparisonOptions, ComparisonResult, SaveComparisonInput, SavedComparison,
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

const MAX_BATCH_UPCS: usize = 100;

/// Per-request overrides of the configured comparison defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScanParams {
    /// Ignore prices older than this many hours (at most ten years)
    #[validate(range(min = 0, max = 87600))]
    pub max_age_hours: Option<i64>,
    pub include_out_of_stock: Option<bool>,
    /// Maximum number of offers returned
    pub limit: Option<usize>,
}

impl ScanParams {
    fn apply(&self, defaults: ComparisonOptions) -> ComparisonOptions {
        ComparisonOptions {
            max_age_hours: self.max_age_hours.unwrap_or(defaults.max_age_hours),
            include_out_of_stock: self
                .include_out_of_stock
                .unwrap_or(defaults.include_out_of_stock),
            limit: self.limit.unwrap_or(defaults.limit).max(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct BatchScanRequest {
    #[validate(length(min = 1, max = 100))]
    pub upcs: Vec<String>,
}

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/batch", post(batch_scan))
        .route("/save", post(save_comparison))
        .route("/product/:id", get(scan_product))
        .route("/:upc", get(scan_upc))
}

/// Compare every supplier's current price for a scanned UPC
#[utoipa::path(
    get,
    path = "/api/best-buy/scan/{upc}",
    params(
        ("upc" = String, Path, description = "Scanned barcode"),
        ScanParams
    ),
    responses(
        (status = 200, description = "Ranked supplier prices", body = ComparisonResult),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn scan_upc(
    State(state): State<AppState>,
    Path(upc): Path<String>,
    Query(params): Query<ScanParams>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&params)?;
    let comparison = &state.services.comparison;
    let options = params.apply(comparison.default_options());

    let result = comparison
        .compare(upc.trim(), options)
        .await
        .map_err(map_service_error)?;

    info!(upc = %result.upc, offers = result.prices.len(), "UPC scanned");
    Ok(success_response(result))
}

/// Compare several UPCs at once
#[utoipa::path(
    post,
    path = "/api/best-buy/scan/batch",
    request_body = BatchScanRequest,
    responses(
        (status = 200, description = "Comparisons with summary", body = BatchComparison),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn batch_scan(
    State(state): State<AppState>,
    Json(payload): Json<BatchScanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    if payload.upcs.len() > MAX_BATCH_UPCS {
        return Err(ApiError::BadRequest(format!(
            "At most {} UPCs per batch",
            MAX_BATCH_UPCS
        )));
    }

    let upcs: Vec<String> = payload.upcs.iter().map(|u| u.trim().to_string()).collect();
    let batch = state
        .services
        .comparison
        .batch_compare(&upcs)
        .await
        .map_err(map_service_error)?;

    info!(
        items = batch.summary.items_compared,
        with_prices = batch.summary.items_with_prices,
        "Batch scan finished"
    );
    Ok(success_response(batch))
}

/// Record a comparison and the supplier the buyer picked
#[utoipa::path(
    post,
    path = "/api/best-buy/scan/save",
    request_body = SaveComparisonInput,
    responses(
        (status = 201, description = "Comparison saved", body = SavedComparison),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn save_comparison(
    State(state): State<AppState>,
    Json(payload): Json<SaveComparisonInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let saved = state
        .services
        .comparison
        .save_comparison(payload)
        .await
        .map_err(map_service_error)?;

    info!(comparison_id = saved.id, "Comparison saved");
    Ok(created_response(saved))
}

/// Compare prices for a catalog product by id
#[utoipa::path(
    get,
    path = "/api/best-buy/scan/product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ScanParams
    ),
    responses(
        (status = 200, description = "Ranked supplier prices", body = ComparisonResult),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn scan_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<ScanParams>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&params)?;
    let comparison = &state.services.comparison;
    let options = params.apply(comparison.default_options());

    let result = comparison
        .compare_by_product_id(id, options)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_params_override_defaults() {
        let params = ScanParams {
            max_age_hours: Some(24),
            include_out_of_stock: None,
            limit: Some(0),
        };
        let options = params.apply(ComparisonOptions::default());
        assert_eq!(options.max_age_hours, 24);
        assert!(!options.include_out_of_stock);
        assert_eq!(options.limit, 1);
    }

    #[test]
    fn price_window_is_bounded() {
        let within = ScanParams {
            max_age_hours: Some(87_600),
            ..Default::default()
        };
        assert!(validate_input(&within).is_ok());

        for hours in [-1, 87_601, 10_000_000_000] {
            let params = ScanParams {
                max_age_hours: Some(hours),
                ..Default::default()
            };
            assert!(validate_input(&params).is_err());
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let request = BatchScanRequest { upcs: Vec::new() };
        assert!(validate_input(&request).is_err());
    }
}
