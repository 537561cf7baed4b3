use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Best Buy Scanner API",
        version = "0.1.0",
        description = r#"
# Best Buy Scanner

Supplier price comparison and purchasing for a grocery store.

- **Scan**: compare every supplier's current price for a barcode, ranked by landed cost
- **Cart**: collect picks across suppliers and turn them into draft purchase orders
- **Orders**: draft, send and close purchase orders
- **Receiving**: check deliveries against orders and record discrepancies
- **Suppliers**: supplier records, price lists, shipping profiles and UPC aliases

Errors use a single format:

```json
{
  "error": "Bad Request",
  "message": "Invalid state: Cannot send empty order",
  "request_id": "8c5e...",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development")
    ),
    tags(
        (name = "scan", description = "Price comparison"),
        (name = "cart", description = "Purchasing cart"),
        (name = "orders", description = "Purchase orders"),
        (name = "receiving", description = "Delivery receiving"),
        (name = "suppliers", description = "Supplier management"),
        (name = "prices", description = "Supplier price lists"),
        (name = "products", description = "Product catalog")
    ),
    paths(
        crate::handlers::scan::scan_upc,
        crate::handlers::scan::batch_scan,
        crate::handlers::scan::save_comparison,
        crate::handlers::scan::scan_product,

        crate::handlers::cart::get_cart,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::clear_cart,
        crate::handlers::cart::remove_from_cart,
        crate::handlers::cart::cart_summary,
        crate::handlers::cart::create_orders,

        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::add_item,
        crate::handlers::orders::remove_item,
        crate::handlers::orders::send_order,
        crate::handlers::orders::close_order,

        crate::handlers::receiving::list_sessions,
        crate::handlers::receiving::start_session,
        crate::handlers::receiving::get_session,
        crate::handlers::receiving::receive_item,
        crate::handlers::receiving::complete_session,
        crate::handlers::receiving::po_status,

        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::deactivate_supplier,
        crate::handlers::suppliers::list_prices,
        crate::handlers::suppliers::add_price,
        crate::handlers::suppliers::bulk_add_prices,
        crate::handlers::suppliers::add_shipping_profile,
        crate::handlers::suppliers::add_upc_alias,

        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::list_departments,
        crate::handlers::products::list_vendors,
        crate::handlers::products::product_stats,
        crate::handlers::products::get_product_by_upc,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
    ),
    components(
        schemas(
            crate::handlers::common::StatusMessage,
            crate::handlers::scan::BatchScanRequest,
            crate::handlers::cart::CreateOrdersRequest,
            crate::handlers::suppliers::BulkPriceRequest,

            crate::services::comparison::ComparisonResult,
            crate::services::comparison::PriceOffer,
            crate::services::comparison::PriceStatistics,
            crate::services::comparison::ProductSnapshot,
            crate::services::receiving::ExpectedItem,
            crate::services::receiving::SessionTotals,
            crate::services::receiving::LineProgress,

            crate::entities::purchase_order::PurchaseOrderStatus,
            crate::entities::po_line_item::LineItemStatus,
            crate::entities::receiving_session::ReceivingStatus,
            crate::entities::receiving_item::DiscrepancyType,
            crate::entities::supplier_price::PriceType,
            crate::entities::supplier::FeedType,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_scanner_routes() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Best Buy Scanner API"));
        assert!(json.contains("/api/best-buy/scan/{upc}"));
        assert!(json.contains("/api/best-buy/receiving/po/{po_id}/status"));
        assert!(json.contains("PurchaseOrderStatus"));
    }
}
