mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use best_buy_scanner::{
    entities::supplier_price::PriceType,
    errors::ServiceError,
    services::{
        catalog::ProductFilter,
        prices::ManualPriceEntry,
        suppliers::{NewUpcAlias, SupplierUpdate},
    },
};
use common::{decimal, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

const COLA: &str = "012345678905";

fn price(upc: &str, unit_cost: Decimal, case_pack: i32) -> ManualPriceEntry {
    ManualPriceEntry {
        upc: upc.to_string(),
        unit_cost,
        case_cost: None,
        case_pack,
        price_type: PriceType::List,
        promo_name: None,
        in_stock: true,
        supplier_sku: None,
        effective_date: None,
        expires_at: None,
    }
}

#[tokio::test]
async fn health_and_status_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/api/best-buy/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "best-buy-scanner");
}

#[tokio::test]
async fn product_catalog_search_and_stats() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", Some(dec!(1.00))).await;
    app.seed_product("028400090858", "Potato Chips", None).await;

    let (status, body) = app
        .post(
            "/api/best-buy/products",
            json!({ "upc": "049000000443", "name": "Diet COLA", "department": "Beverage" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pack_size"], 1);

    let (status, _) = app
        .post("/api/best-buy/products", json!({ "upc": COLA, "name": "Dup" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let found = app
        .state
        .services
        .products
        .list_products(ProductFilter {
            search: Some("cola".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Cola 12oz", "Diet COLA"]);

    let (status, body) = app.get("/api/best-buy/products/departments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Beverage", "Grocery"]));

    let stats = app.state.services.products.product_stats().await.unwrap();
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.products_with_cost, 1);
    assert_eq!(stats.departments, 2);

    let (status, body) = app.get(&format!("/api/best-buy/products/upc/{}", COLA)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Cola 12oz");
}

#[tokio::test]
async fn supplier_lifecycle_over_http() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/best-buy/suppliers",
            json!({ "code": "CORE", "name": "Core-Mark", "email": "orders@core.example" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order_lead_days"], 2);
    let id = body["id"].as_i64().unwrap();

    let (status, _) = app
        .post("/api/best-buy/suppliers", json!({ "code": "CORE", "name": "Again" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/best-buy/suppliers", json!({ "code": "BAD", "name": "x", "email": "nope" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/best-buy/suppliers/{}", id),
            Some(json!({ "delivery_days": "Mon,Thu" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery_days"], "Mon,Thu");

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/best-buy/suppliers/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (_, active) = app.get("/api/best-buy/suppliers").await;
    assert_eq!(active, json!([]));
    let (_, all) = app.get("/api/best-buy/suppliers?active_only=false").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn supplier_update_touches_only_given_fields() {
    let app = TestApp::new().await;
    let s = app.seed_supplier("CORE", "Core-Mark").await;

    let updated = app
        .state
        .services
        .suppliers
        .update_supplier(
            s.id,
            SupplierUpdate {
                order_lead_days: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.order_lead_days, 5);
    assert_eq!(updated.name, "Core-Mark");
    assert!(updated.is_active);
}

#[tokio::test]
async fn bulk_prices_tolerate_bad_rows() {
    let app = TestApp::new().await;
    app.seed_product(COLA, "Cola 12oz", None).await;
    let s = app.seed_supplier("CORE", "Core-Mark").await;

    let result = app
        .state
        .services
        .prices
        .bulk_add_prices(
            s.id,
            vec![
                price(COLA, dec!(1.25), 12),
                price("028400090858", dec!(0), 1),
                price("049000000443", dec!(0.50), 0),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.failed, 2);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].upc, "028400090858");

    let stored = app
        .state
        .services
        .prices
        .get_supplier_prices(s.id, None, None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].case_cost, Some(dec!(15.00)));
    assert!(stored[0].product_id.is_some());

    let (status, body) = app
        .get(&format!("/api/best-buy/suppliers/{}/prices?department=Grocery", s.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body[0]["unit_cost"]), dec!(1.25));

    let current = app
        .state
        .services
        .prices
        .current_price(COLA, s.id)
        .await
        .unwrap();
    assert_eq!(current.map(|p| p.unit_cost), Some(dec!(1.25)));
}

#[tokio::test]
async fn duplicate_alias_conflicts() {
    let app = TestApp::new().await;
    let s = app.seed_supplier("CORE", "Core-Mark").await;
    let alias = || NewUpcAlias {
        supplier_sku: "CM-1001".to_string(),
        standard_upc: COLA.to_string(),
        supplier_name: None,
        match_method: None,
        created_by: None,
    };

    let suppliers = &app.state.services.suppliers;
    let created = suppliers.add_upc_alias(s.id, alias()).await.unwrap();
    assert_eq!(created.match_method.as_deref(), Some("manual"));

    let again = suppliers.add_upc_alias(s.id, alias()).await;
    assert_matches!(again, Err(ServiceError::Conflict(_)));
}
