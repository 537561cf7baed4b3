mod common;

use assert_matches::assert_matches;
use std::collections::HashSet;

use axum::http::StatusCode;
use best_buy_scanner::{
    entities::comparison,
    errors::ServiceError,
    services::comparison::{ComparisonOptions, SaveComparisonInput, PRODUCT_NOT_FOUND},
};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;

const COLA: &str = "012345678905";

#[tokio::test]
async fn unknown_upc_is_a_normal_result() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .comparison
        .compare("000000000000", ComparisonOptions::default())
        .await
        .expect("unknown UPC must not fail");

    assert!(result.prices.is_empty());
    assert!(result.product.is_none());
    assert_eq!(result.error.as_deref(), Some(PRODUCT_NOT_FOUND));
    assert_eq!(result.suppliers_checked, 0);

    let (status, body) = app.get("/api/best-buy/scan/000000000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], PRODUCT_NOT_FOUND);
    assert_eq!(body["prices"], json!([]));
}

#[tokio::test]
async fn offers_are_ranked_by_landed_cost_not_unit_cost() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", Some(dec!(3.00))).await;
    let cheap_but_shipped = app.seed_supplier("CORE", "Core-Mark").await;
    let flat = app.seed_supplier("MCL", "McLane").await;

    // 2.00 + 6.00 / 12 = 2.50 landed
    app.seed_price(COLA, cheap_but_shipped.id, dec!(2.00), 12, 2, true).await;
    app.seed_shipping(cheap_but_shipped.id, dec!(6.00)).await;
    app.seed_price(COLA, flat.id, dec!(2.25), 12, 2, true).await;

    let result = app
        .state
        .services
        .comparison
        .compare(COLA, ComparisonOptions::default())
        .await
        .unwrap();

    assert_eq!(result.prices.len(), 2);
    assert_eq!(result.prices[0].supplier_id, flat.id);
    assert_eq!(result.prices[0].rank, 1);
    assert_eq!(result.prices[1].supplier_id, cheap_but_shipped.id);
    assert_eq!(result.prices[1].landed_cost_per_unit, dec!(2.50));
    assert_eq!(result.prices[1].rank, 2);

    let stats = result.statistics.expect("statistics for priced item");
    assert_eq!(stats.min_cost, dec!(2.00));
    assert_eq!(stats.max_cost, dec!(2.25));
    assert_eq!(stats.spread, dec!(0.25));
    assert_eq!(stats.potential_savings, Some(dec!(1.00)));
    assert_eq!(result.prices[0].savings_vs_current, Some(dec!(0.75)));
}

#[tokio::test]
async fn only_latest_price_per_supplier_survives() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", None).await;
    let supplier = app.seed_supplier("CORE", "Core-Mark").await;
    let other = app.seed_supplier("MCL", "McLane").await;

    app.seed_price(COLA, supplier.id, dec!(1.50), 1, 48, true).await;
    app.seed_price(COLA, supplier.id, dec!(1.75), 1, 3, true).await;
    app.seed_price(COLA, other.id, dec!(1.25), 1, 10, true).await;

    let result = app
        .state
        .services
        .comparison
        .compare(COLA, ComparisonOptions::default())
        .await
        .unwrap();

    let ids: HashSet<i32> = result.prices.iter().map(|o| o.supplier_id).collect();
    assert_eq!(ids.len(), result.prices.len());

    let latest = result
        .prices
        .iter()
        .find(|o| o.supplier_id == supplier.id)
        .unwrap();
    assert_eq!(latest.unit_cost, dec!(1.75));
    assert!(result.statistics.unwrap().potential_savings.is_none());
}

#[tokio::test]
async fn stale_out_of_stock_and_inactive_offers_are_filtered() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", None).await;
    let stale = app.seed_supplier("OLD", "Old Prices").await;
    let empty = app.seed_supplier("OOS", "Out Of Stock").await;
    let retired = app.seed_supplier("GONE", "Retired").await;
    let good = app.seed_supplier("GOOD", "Good Supplier").await;

    app.seed_price(COLA, stale.id, dec!(1.00), 1, 200, true).await;
    app.seed_price(COLA, empty.id, dec!(1.00), 1, 1, false).await;
    app.seed_price(COLA, retired.id, dec!(1.00), 1, 1, true).await;
    app.seed_price(COLA, good.id, dec!(1.50), 1, 1, true).await;
    app.state
        .services
        .suppliers
        .deactivate_supplier(retired.id)
        .await
        .unwrap();

    let comparison = &app.state.services.comparison;
    let result = comparison.compare(COLA, ComparisonOptions::default()).await.unwrap();
    assert_eq!(result.prices.len(), 1);
    assert_eq!(result.prices[0].supplier_id, good.id);

    let with_stock_and_age = comparison
        .compare(
            COLA,
            ComparisonOptions {
                max_age_hours: 240,
                include_out_of_stock: true,
                limit: 10,
            },
        )
        .await
        .unwrap();
    assert_eq!(with_stock_and_age.prices.len(), 3);
}

#[tokio::test]
async fn limit_truncates_offers_but_not_statistics() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", None).await;
    for (i, cost) in [dec!(1.00), dec!(1.25), dec!(1.50)].into_iter().enumerate() {
        let s = app.seed_supplier(&format!("S{}", i), &format!("Supplier {}", i)).await;
        app.seed_price(COLA, s.id, cost, 1, 1, true).await;
    }

    let (status, body) = app.get(&format!("/api/best-buy/scan/{}?limit=2", COLA)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prices"].as_array().unwrap().len(), 2);
    assert_eq!(body["suppliers_checked"], 3);
    assert_eq!(decimal(&body["statistics"]["max_cost"]), dec!(1.50));
}

#[tokio::test]
async fn alias_and_ean_forms_are_matched() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", None).await;
    let by_sku = app.seed_supplier("SKU", "Sku Supplier").await;
    let by_ean = app.seed_supplier("EAN", "Ean Supplier").await;

    app.seed_alias(by_sku.id, "CM-1001", COLA).await;
    app.seed_price("CM-1001", by_sku.id, dec!(1.25), 1, 1, true).await;
    app.seed_price("0012345678905", by_ean.id, dec!(1.50), 1, 1, true).await;

    let result = app
        .state
        .services
        .comparison
        .compare(COLA, ComparisonOptions::default())
        .await
        .unwrap();

    let ids: Vec<i32> = result.prices.iter().map(|o| o.supplier_id).collect();
    assert_eq!(ids, vec![by_sku.id, by_ean.id]);
}

#[tokio::test]
async fn batch_sums_potential_savings() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", Some(dec!(2.00))).await;
    app.seed_product("049000000443", "Diet Cola", Some(dec!(1.00))).await;
    let s = app.seed_supplier("CORE", "Core-Mark").await;
    app.seed_price(COLA, s.id, dec!(1.50), 1, 1, true).await;
    app.seed_price("049000000443", s.id, dec!(1.25), 1, 1, true).await;

    let (status, body) = app
        .post(
            "/api/best-buy/scan/batch",
            json!({ "upcs": [COLA, "049000000443", "000000000000"] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["items_compared"], 3);
    assert_eq!(body["summary"]["items_with_prices"], 2);
    assert_eq!(decimal(&body["summary"]["total_potential_savings"]), dec!(0.50));
}

#[tokio::test]
async fn saving_a_comparison_persists_snapshot() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", Some(dec!(2.00))).await;
    let s = app.seed_supplier("CORE", "Core-Mark").await;
    app.seed_price(COLA, s.id, dec!(1.50), 1, 1, true).await;

    let saved = app
        .state
        .services
        .comparison
        .save_comparison(SaveComparisonInput {
            upc: COLA.to_string(),
            selected_supplier_id: s.id,
            quantity: 4,
            user_id: Some("buyer".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(saved.status, "saved");

    let row = comparison::Entity::find_by_id(saved.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("comparison row");
    assert_eq!(row.best_supplier_id, Some(s.id));
    assert_eq!(row.savings_per_unit, Some(dec!(0.50)));
    assert_eq!(row.savings_percent, Some(dec!(25.00)));
    assert_eq!(row.order_qty, Some(4));
    assert_eq!(row.all_options["upc"], COLA);

    let missing = app
        .state
        .services
        .comparison
        .save_comparison(SaveComparisonInput {
            upc: "000000000000".to_string(),
            selected_supplier_id: s.id,
            quantity: 1,
            user_id: None,
        })
        .await;
    assert_matches!(missing, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn oversized_price_window_is_rejected() {
    let app = TestApp::new().await;
    let product = app.seed_product(COLA, "Cola 12oz", None).await;
    let s = app.seed_supplier("CORE", "Core-Mark").await;
    app.seed_price(COLA, s.id, dec!(1.50), 1, 1, true).await;

    let (status, body) = app
        .get(&format!("/api/best-buy/scan/{}?max_age_hours=10000000000", COLA))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = app
        .get(&format!("/api/best-buy/scan/product/{}?max_age_hours=-5", product.id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let direct = app
        .state
        .services
        .comparison
        .compare(
            COLA,
            ComparisonOptions {
                max_age_hours: 10_000_000_000,
                ..Default::default()
            },
        )
        .await;
    assert_matches!(direct, Err(ServiceError::InvalidInput(_)));

    let (status, body) = app
        .get(&format!("/api/best-buy/scan/{}?max_age_hours=87600", COLA))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prices"].as_array().unwrap().len(), 1);
}
