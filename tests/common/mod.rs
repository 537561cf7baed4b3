#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use best_buy_scanner::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::{
        product, supplier,
        supplier::FeedType,
        supplier_price::{self, PriceType},
        supplier_shipping, upc_alias,
    },
    events::{self, EventSender},
    AppState,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Application state and router backed by a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            environment: "test".to_string(),
            db_max_connections: 1,
            db_min_connections: 1,
            ..AppConfig::default()
        };

        let pool = db::establish_connection_with_config(&DbConfig::from(&cfg))
            .await
            .expect("in-memory sqlite should connect");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = best_buy_scanner::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Sends a request through the full router and returns status plus decoded JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("failed to serialize request body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn seed_product(&self, upc: &str, name: &str, current_cost: Option<Decimal>) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            upc: Set(upc.to_string()),
            name: Set(name.to_string()),
            department: Set(Some("Grocery".to_string())),
            current_vendor: Set(None),
            current_cost: Set(current_cost),
            retail_price: Set(None),
            pack_size: Set(1),
            on_hand: Set(0),
            reorder_point: Set(None),
            reorder_qty: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }

    pub async fn seed_supplier(&self, code: &str, name: &str) -> supplier::Model {
        let now = Utc::now();
        supplier::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            contact_name: Set(None),
            phone: Set(None),
            email: Set(None),
            website: Set(None),
            account_number: Set(None),
            rep_name: Set(None),
            rep_phone: Set(None),
            min_order_amount: Set(None),
            min_order_cases: Set(None),
            order_lead_days: Set(2),
            delivery_days: Set(None),
            feed_type: Set(FeedType::Manual),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed supplier")
    }

    /// Inserts a price observation effective `hours_ago` hours in the past.
    pub async fn seed_price(
        &self,
        upc: &str,
        supplier_id: i32,
        unit_cost: Decimal,
        case_pack: i32,
        hours_ago: i64,
        in_stock: bool,
    ) -> supplier_price::Model {
        let effective = Utc::now() - Duration::hours(hours_ago);
        supplier_price::ActiveModel {
            upc: Set(upc.to_string()),
            product_id: Set(None),
            supplier_id: Set(supplier_id),
            supplier_sku: Set(None),
            unit_cost: Set(unit_cost),
            case_cost: Set(None),
            case_pack: Set(case_pack),
            effective_date: Set(effective),
            expires_at: Set(None),
            price_type: Set(PriceType::List),
            promo_name: Set(None),
            source: Set(Some("manual".to_string())),
            in_stock: Set(in_stock),
            available_qty: Set(None),
            created_at: Set(effective),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed supplier price")
    }

    pub async fn seed_shipping(&self, supplier_id: i32, per_case_fee: Decimal) -> supplier_shipping::Model {
        supplier_shipping::ActiveModel {
            supplier_id: Set(supplier_id),
            method: Set("delivery".to_string()),
            per_case_fee: Set(Some(per_case_fee)),
            flat_fee: Set(None),
            free_shipping_threshold: Set(None),
            effective_date: Set(Utc::now() - Duration::hours(1)),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed shipping profile")
    }

    pub async fn seed_alias(&self, supplier_id: i32, supplier_sku: &str, standard_upc: &str) -> upc_alias::Model {
        upc_alias::ActiveModel {
            supplier_id: Set(supplier_id),
            supplier_sku: Set(supplier_sku.to_string()),
            supplier_name: Set(None),
            standard_upc: Set(standard_upc.to_string()),
            match_method: Set(Some("manual".to_string())),
            created_at: Set(Utc::now()),
            created_by: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed upc alias")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Decimal fields serialize as JSON strings.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal, got {other}"),
    }
}
