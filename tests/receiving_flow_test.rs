mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use best_buy_scanner::{
    entities::{
        po_line_item::{self, LineItemStatus},
        purchase_order::PurchaseOrderStatus,
        receiving_item::DiscrepancyType,
        receiving_session::ReceivingStatus,
    },
    errors::ServiceError,
    services::{
        purchase_orders::{NewLineItem, NewPurchaseOrder, PurchaseOrderDetail, SendOrderInput},
        purchase_orders::MAX_LINE_QTY,
        receiving::{CompleteSession, ReceiveItem, StartReceiving},
    },
};
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

const COLA: &str = "012345678905";
const CHIPS: &str = "028400090858";

async fn sent_order(app: &TestApp, lines: &[(&str, i32)]) -> PurchaseOrderDetail {
    let supplier = app.seed_supplier("CORE", "Core-Mark").await;
    let orders = &app.state.services.purchase_orders;

    let items = lines
        .iter()
        .map(|(upc, qty)| NewLineItem {
            upc: upc.to_string(),
            qty: *qty,
            unit_cost: Some(dec!(1.00)),
            case_pack: None,
        })
        .collect();
    let order = orders
        .create(NewPurchaseOrder {
            supplier_id: supplier.id,
            notes: None,
            created_by: None,
            items,
        })
        .await
        .unwrap();
    orders
        .send(order.order.id, SendOrderInput::default())
        .await
        .unwrap();
    orders.get(order.order.id).await.unwrap()
}

fn scan(upc: &str, qty_received: i32, qty_damaged: i32) -> ReceiveItem {
    ReceiveItem {
        upc: upc.to_string(),
        qty_received,
        qty_damaged,
        notes: None,
    }
}

fn start_for(po_id: i32) -> StartReceiving {
    StartReceiving {
        po_id: Some(po_id),
        ..Default::default()
    }
}

#[tokio::test]
async fn short_takes_precedence_over_damage() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 10)]).await;
    let receiving = &app.state.services.receiving;

    let started = receiving.start(start_for(order.order.id)).await.unwrap();
    assert_eq!(started.expected_items.len(), 1);
    assert_eq!(started.session.supplier_id, Some(order.order.supplier_id));

    let po = app.state.services.purchase_orders.get(order.order.id).await.unwrap();
    assert_eq!(po.order.status, PurchaseOrderStatus::Partial);

    let result = receiving
        .receive(started.session.id, scan(COLA, 8, 1))
        .await
        .unwrap();
    assert!(result.on_po);
    assert_eq!(result.item.qty_expected, Some(10));
    assert_eq!(result.item.qty_good, 7);
    assert_eq!(result.item.discrepancy_type, DiscrepancyType::Short);
    assert_eq!(result.item.discrepancy_qty, 3);
    assert_eq!(result.session_totals.items_short, 1);
    assert_eq!(result.session_totals.items_damaged, 0);
    assert_eq!(result.session_totals.total_cases, 8);

    let line = po_line_item::Entity::find()
        .filter(po_line_item::Column::PoId.eq(order.order.id))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.qty_received, 8);
    assert_eq!(line.qty_pending, 2);
    assert_eq!(line.qty_pending, line.qty_ordered - line.qty_received);
    assert_eq!(line.status, LineItemStatus::Partial);
}

#[tokio::test]
async fn exact_damaged_delivery_is_flagged_damaged() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 4)]).await;
    let receiving = &app.state.services.receiving;

    let session = receiving.start(start_for(order.order.id)).await.unwrap().session;
    let result = receiving.receive(session.id, scan(COLA, 5, 1)).await.unwrap();

    assert_eq!(result.item.qty_good, 4);
    assert_eq!(result.item.discrepancy_type, DiscrepancyType::Damaged);
    assert_eq!(result.item.discrepancy_qty, 1);
}

#[tokio::test]
async fn unexpected_upc_is_wrong_item() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 4)]).await;
    let receiving = &app.state.services.receiving;

    let session = receiving.start(start_for(order.order.id)).await.unwrap().session;
    let result = receiving.receive(session.id, scan(CHIPS, 3, 0)).await.unwrap();

    assert!(!result.on_po);
    assert_eq!(result.item.discrepancy_type, DiscrepancyType::WrongItem);
    assert_eq!(result.item.discrepancy_qty, 3);
    assert_eq!(result.item.po_line_id, None);
}

#[tokio::test]
async fn pending_stays_consistent_across_over_receipt() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 6)]).await;
    let receiving = &app.state.services.receiving;
    let session = receiving.start(start_for(order.order.id)).await.unwrap().session;

    for (qty, expected_type) in [
        (4, DiscrepancyType::Short),
        (3, DiscrepancyType::Over),
        (1, DiscrepancyType::Over),
    ] {
        let result = receiving.receive(session.id, scan(COLA, qty, 0)).await.unwrap();
        assert_eq!(result.item.discrepancy_type, expected_type);

        let line = po_line_item::Entity::find()
            .filter(po_line_item::Column::PoId.eq(order.order.id))
            .one(&*app.state.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.qty_pending, line.qty_ordered - line.qty_received);
    }

    let status = receiving.po_status(order.order.id).await.unwrap();
    assert_eq!(status.total_ordered, 6);
    assert_eq!(status.total_received, 8);
    assert_eq!(status.items[0].qty_pending, -2);
    assert_eq!(status.items[0].status, LineItemStatus::Received);
}

#[tokio::test]
async fn completion_sets_received_or_partial() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 2), (CHIPS, 3)]).await;
    let receiving = &app.state.services.receiving;

    let first = receiving.start(start_for(order.order.id)).await.unwrap().session;
    receiving.receive(first.id, scan(COLA, 2, 0)).await.unwrap();
    let done = receiving
        .complete(first.id, CompleteSession::default())
        .await
        .unwrap();
    assert_eq!(done.session.status, ReceivingStatus::Completed);
    assert_eq!(done.po_status, Some(PurchaseOrderStatus::Partial));

    let late = receiving.receive(first.id, scan(CHIPS, 1, 0)).await;
    assert_matches!(late, Err(ServiceError::InvalidState(_)));

    let second = receiving.start(start_for(order.order.id)).await.unwrap();
    assert_eq!(second.expected_items.len(), 1);
    assert_eq!(second.expected_items[0].upc, CHIPS);

    receiving.receive(second.session.id, scan(CHIPS, 3, 0)).await.unwrap();
    let done = receiving
        .complete(second.session.id, CompleteSession::default())
        .await
        .unwrap();
    assert_eq!(done.po_status, Some(PurchaseOrderStatus::Received));

    let status = receiving.po_status(order.order.id).await.unwrap();
    assert_eq!(status.percent_complete, dec!(100.0));
}

#[tokio::test]
async fn receiving_validates_inputs() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 2)]).await;
    let receiving = &app.state.services.receiving;

    let missing = receiving.start(StartReceiving::default()).await;
    assert_matches!(missing, Err(ServiceError::InvalidInput(_)));

    let session = receiving.start(start_for(order.order.id)).await.unwrap().session;
    let too_damaged = receiving.receive(session.id, scan(COLA, 1, 2)).await;
    assert_matches!(too_damaged, Err(ServiceError::InvalidInput(_)));

    let (status, _) = app
        .post(
            &format!("/api/best-buy/receiving/sessions/{}/receive", session.id),
            json!({ "upc": COLA, "qty_received": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/best-buy/receiving/sessions/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn supplier_only_session_over_http() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("DSD", "Direct Store Delivery").await;

    let (status, body) = app
        .post(
            "/api/best-buy/receiving/sessions",
            json!({ "supplier_id": supplier.id, "invoice_number": "INV-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["expected_items"], json!([]));
    let session_id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/api/best-buy/receiving/sessions/{}/receive", session_id),
            json!({ "upc": COLA, "qty_received": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["on_po"], false);
    assert_eq!(body["discrepancy_type"], "none");

    let (status, body) = app
        .post(
            &format!("/api/best-buy/receiving/sessions/{}/receive", session_id),
            json!({ "upc": CHIPS, "qty_received": 3, "qty_damaged": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["discrepancy_type"], "damaged");
    assert_eq!(body["discrepancy_qty"], 1);

    let (status, body) = app
        .post(
            &format!("/api/best-buy/receiving/sessions/{}/complete", session_id),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["po_status"].is_null());

    let (status, body) = app
        .get(&format!("/api/best-buy/receiving/sessions?supplier_id={}", supplier.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_quantities_are_rejected_without_touching_counters() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("DSD", "Direct Store Delivery").await;

    let (status, body) = app
        .post(
            "/api/best-buy/receiving/sessions",
            json!({ "supplier_id": supplier.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["id"].as_i64().unwrap();

    for _ in 0..2 {
        let (status, _) = app
            .post(
                &format!("/api/best-buy/receiving/sessions/{}/receive", session_id),
                json!({ "upc": COLA, "qty_received": 2000000000 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let receiving = &app.state.services.receiving;
    let direct = receiving
        .receive(session_id as i32, scan(COLA, 2_000_000_000, 0))
        .await;
    assert_matches!(direct, Err(ServiceError::InvalidInput(_)));

    let detail = receiving.get(session_id as i32).await.unwrap();
    assert_eq!(detail.session.total_items, 0);
    assert_eq!(detail.session.total_cases, 0);
}

#[tokio::test]
async fn line_receipts_stop_at_the_line_limit() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 5)]).await;
    let receiving = &app.state.services.receiving;
    let session = receiving.start(start_for(order.order.id)).await.unwrap().session;

    receiving
        .receive(session.id, scan(COLA, MAX_LINE_QTY, 0))
        .await
        .unwrap();
    let overflow = receiving.receive(session.id, scan(COLA, 1, 0)).await;
    assert_matches!(overflow, Err(ServiceError::InvalidInput(_)));

    let line = po_line_item::Entity::find()
        .filter(po_line_item::Column::PoId.eq(order.order.id))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.qty_received, MAX_LINE_QTY);
    assert_eq!(line.qty_pending, line.qty_ordered - line.qty_received);

    let detail = receiving.get(session.id).await.unwrap();
    assert_eq!(detail.session.total_items, 1);
    assert_eq!(detail.received_items.len(), 1);
}

#[tokio::test]
async fn pending_matches_after_every_scan_of_a_mixed_delivery() {
    let app = TestApp::new().await;
    let order = sent_order(&app, &[(COLA, 20), (CHIPS, 7)]).await;
    let receiving = &app.state.services.receiving;
    let session = receiving.start(start_for(order.order.id)).await.unwrap().session;

    let deliveries = [
        (COLA, 3, 0),
        (CHIPS, 7, 2),
        (COLA, 0, 0),
        (COLA, 12, 1),
        (CHIPS, 4, 0),
        (COLA, 9, 3),
    ];
    let mut received = std::collections::HashMap::new();
    for (upc, qty, damaged) in deliveries {
        receiving.receive(session.id, scan(upc, qty, damaged)).await.unwrap();
        *received.entry(upc).or_insert(0) += qty;

        let lines = po_line_item::Entity::find()
            .filter(po_line_item::Column::PoId.eq(order.order.id))
            .all(&*app.state.db)
            .await
            .unwrap();
        for line in lines {
            assert_eq!(line.qty_received, received.get(line.upc.as_str()).copied().unwrap_or(0));
            assert_eq!(line.qty_pending, line.qty_ordered - line.qty_received);
        }
    }
}
