use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    entities::{
        po_line_item::{self, LineItemStatus},
        product,
        purchase_order::{self, PurchaseOrderStatus},
        supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::prices::current_price_with,
};

const MAX_PO_NUMBER_ATTEMPTS: usize = 5;

/// Most cases a single order line, cart entry or line receipt may add up to
pub const MAX_LINE_QTY: i32 = 1_000_000;

/// Line to add to an order. Without `unit_cost` the supplier's current price is used.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewLineItem {
    #[validate(length(min = 1, max = 50))]
    pub upc: String,
    #[validate(range(min = 1, max = 1000000))]
    pub qty: i32,
    pub unit_cost: Option<Decimal>,
    #[validate(range(min = 1, max = 10000))]
    pub case_pack: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewPurchaseOrder {
    pub supplier_id: i32,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[serde(default)]
    pub items: Vec<NewLineItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderUpdate {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub expected_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SendOrderInput {
    pub expected_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<i32>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderSummary {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub supplier_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub supplier_name: Option<String>,
    pub supplier_email: Option<String>,
    pub line_items: Vec<po_line_item::Model>,
}

/// A line mutation together with the order total it produced
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineItemChange {
    pub status: String,
    pub line: Option<po_line_item::Model>,
    pub po_total_cost: Decimal,
}

/// `PO-{supplier code}-{YYYYMMDD}`
pub fn po_number_prefix(supplier_code: &str, date: NaiveDate) -> String {
    format!("PO-{}-{}", supplier_code, date.format("%Y%m%d"))
}

pub fn format_po_number(supplier_code: &str, date: NaiveDate, sequence: u32) -> String {
    format!("{}-{:03}", po_number_prefix(supplier_code, date), sequence)
}

/// One past the highest numeric suffix already issued under `prefix`
pub fn next_sequence<S: AsRef<str>>(prefix: &str, existing: &[S]) -> u32 {
    existing
        .iter()
        .filter_map(|number| {
            number
                .as_ref()
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('-'))
                .and_then(|suffix| suffix.parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0)
        + 1
}

/// Adds case quantities. Totals past [`MAX_LINE_QTY`] are rejected.
pub fn add_qty(current: i32, added: i32) -> Result<i32, ServiceError> {
    current
        .checked_add(added)
        .filter(|total| *total <= MAX_LINE_QTY)
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "Quantity {} + {} exceeds the limit of {} cases",
                current, added, MAX_LINE_QTY
            ))
        })
}

pub fn line_total(unit_cost: Decimal, qty: i32) -> Decimal {
    (unit_cost * Decimal::from(qty)).round_dp(2)
}

pub fn line_status(qty_ordered: i32, qty_received: i32) -> LineItemStatus {
    if qty_received >= qty_ordered {
        LineItemStatus::Received
    } else if qty_received > 0 {
        LineItemStatus::Partial
    } else {
        LineItemStatus::Pending
    }
}

/// Header totals derived from the lines of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub total_items: i32,
    pub total_cases: i32,
    pub total_cost: Decimal,
    pub items_received: i32,
    pub cases_received: i32,
}

impl OrderTotals {
    pub fn from_lines(lines: &[po_line_item::Model]) -> Self {
        lines.iter().fold(Self::default(), |mut totals, line| {
            totals.total_items = totals.total_items.saturating_add(1);
            totals.total_cases = totals.total_cases.saturating_add(line.qty_ordered);
            totals.total_cost += line.line_total;
            if line.qty_received > 0 {
                totals.items_received = totals.items_received.saturating_add(1);
            }
            totals.cases_received = totals.cases_received.saturating_add(line.qty_received);
            totals
        })
    }
}

pub(crate) async fn find_order<C: ConnectionTrait>(
    db: &C,
    po_id: i32,
) -> Result<purchase_order::Model, ServiceError> {
    purchase_order::Entity::find_by_id(po_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Purchase order", po_id))
}

pub(crate) async fn find_supplier<C: ConnectionTrait>(
    db: &C,
    supplier_id: i32,
) -> Result<supplier::Model, ServiceError> {
    supplier::Entity::find_by_id(supplier_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))
}

async fn lines_of<C: ConnectionTrait>(
    db: &C,
    po_id: i32,
) -> Result<Vec<po_line_item::Model>, ServiceError> {
    Ok(po_line_item::Entity::find()
        .filter(po_line_item::Column::PoId.eq(po_id))
        .order_by_asc(po_line_item::Column::Id)
        .all(db)
        .await?)
}

/// Rewrites the header totals from the order's current lines
pub async fn recompute_totals<C: ConnectionTrait>(
    db: &C,
    order: purchase_order::Model,
) -> Result<purchase_order::Model, ServiceError> {
    let lines = lines_of(db, order.id).await?;
    let totals = OrderTotals::from_lines(&lines);

    let mut active = order.into_active_model();
    active.total_items = Set(totals.total_items);
    active.total_cases = Set(totals.total_cases);
    active.total_cost = Set(totals.total_cost);
    active.items_received = Set(totals.items_received);
    active.cases_received = Set(totals.cases_received);

    Ok(active.update(db).await?)
}

/// Inserts a draft order under the next free PO number for today.
///
/// Each attempt runs in a savepoint; a unique-index collision on `po_number`
/// rolls the savepoint back and retries with a fresh sequence.
pub(crate) async fn create_draft_order<C>(
    db: &C,
    supplier: &supplier::Model,
    notes: Option<String>,
    created_by: Option<String>,
) -> Result<purchase_order::Model, ServiceError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let now = Utc::now();
    let prefix = po_number_prefix(&supplier.code, now.date_naive());

    for attempt in 1..=MAX_PO_NUMBER_ATTEMPTS {
        let existing: Vec<String> = purchase_order::Entity::find()
            .select_only()
            .column(purchase_order::Column::PoNumber)
            .filter(purchase_order::Column::PoNumber.starts_with(prefix.as_str()))
            .into_tuple()
            .all(db)
            .await?;
        let po_number = format_po_number(
            &supplier.code,
            now.date_naive(),
            next_sequence(&prefix, &existing),
        );

        let order = purchase_order::ActiveModel {
            po_number: Set(po_number.clone()),
            supplier_id: Set(supplier.id),
            status: Set(PurchaseOrderStatus::Draft),
            created_at: Set(now),
            sent_at: Set(None),
            expected_delivery: Set(None),
            closed_at: Set(None),
            total_items: Set(0),
            total_cases: Set(0),
            total_cost: Set(Decimal::ZERO),
            items_received: Set(0),
            cases_received: Set(0),
            notes: Set(notes.clone()),
            created_by: Set(created_by.clone()),
            ..Default::default()
        };

        let savepoint = db.begin().await?;
        match order.insert(&savepoint).await {
            Ok(created) => {
                savepoint.commit().await?;
                return Ok(created);
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                savepoint.rollback().await?;
                counter!("best_buy.po_number_collisions", 1);
                warn!(%po_number, attempt, "PO number already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::Conflict(format!(
        "Could not allocate a PO number under {}",
        prefix
    )))
}

/// Adds a line to an order, merging into an existing line for the same UPC.
///
/// Does not touch the header totals; callers recompute them once all lines are in.
pub(crate) async fn add_line_item<C: ConnectionTrait>(
    db: &C,
    order: &purchase_order::Model,
    item: &NewLineItem,
) -> Result<po_line_item::Model, ServiceError> {
    if !order.status.accepts_new_items() {
        return Err(ServiceError::InvalidState(format!(
            "Cannot add items to {} order",
            order.status
        )));
    }
    if !(1..=MAX_LINE_QTY).contains(&item.qty) {
        return Err(ServiceError::InvalidInput(format!(
            "Quantity must be between 1 and {}, got {}",
            MAX_LINE_QTY, item.qty
        )));
    }

    let existing = po_line_item::Entity::find()
        .filter(po_line_item::Column::PoId.eq(order.id))
        .filter(po_line_item::Column::Upc.eq(item.upc.as_str()))
        .one(db)
        .await?;

    if let Some(line) = existing {
        let qty_ordered = add_qty(line.qty_ordered, item.qty)?;
        let qty_received = line.qty_received;
        let unit_cost = line.unit_cost;
        let status = line.status;

        let mut active = line.into_active_model();
        active.qty_ordered = Set(qty_ordered);
        active.line_total = Set(line_total(unit_cost, qty_ordered));
        active.qty_pending = Set(qty_ordered - qty_received);
        if qty_received > 0 {
            active.status = Set(line_status(qty_ordered, qty_received));
        } else {
            active.status = Set(status);
        }

        return Ok(active.update(db).await?);
    }

    let price = current_price_with(db, &item.upc, order.supplier_id).await?;
    let unit_cost = match (item.unit_cost, &price) {
        (Some(cost), _) => cost,
        (None, Some(price)) => price.unit_cost,
        (None, None) => {
            return Err(ServiceError::MissingPrice(format!(
                "No price found for {} from supplier {}",
                item.upc, order.supplier_id
            )))
        }
    };
    let case_pack = item
        .case_pack
        .or_else(|| price.as_ref().map(|p| p.case_pack))
        .unwrap_or(1)
        .max(1);

    let catalogued = product::Entity::find()
        .filter(product::Column::Upc.eq(item.upc.as_str()))
        .one(db)
        .await?;

    let line = po_line_item::ActiveModel {
        po_id: Set(order.id),
        upc: Set(item.upc.clone()),
        product_id: Set(catalogued.as_ref().map(|p| p.id)),
        product_name: Set(Some(
            catalogued
                .map(|p| p.name)
                .unwrap_or_else(|| format!("UPC: {}", item.upc)),
        )),
        supplier_sku: Set(price.and_then(|p| p.supplier_sku)),
        qty_ordered: Set(item.qty),
        unit_cost: Set(unit_cost),
        case_pack: Set(case_pack),
        line_total: Set(line_total(unit_cost, item.qty)),
        qty_received: Set(0),
        qty_pending: Set(item.qty),
        status: Set(LineItemStatus::Pending),
        ..Default::default()
    };

    Ok(line.insert(db).await?)
}

async fn load_detail<C: ConnectionTrait>(
    db: &C,
    order: purchase_order::Model,
) -> Result<PurchaseOrderDetail, ServiceError> {
    let supplier = order.find_related(supplier::Entity).one(db).await?;
    let line_items = lines_of(db, order.id).await?;

    Ok(PurchaseOrderDetail {
        supplier_name: supplier.as_ref().map(|s| s.name.clone()),
        supplier_email: supplier.and_then(|s| s.email),
        order,
        line_items,
    })
}

/// Purchase order lifecycle: draft, sent, partial, received, closed
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    default_list_limit: u64,
}

impl PurchaseOrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        default_list_limit: u64,
    ) -> Self {
        Self {
            db,
            event_sender,
            default_list_limit,
        }
    }

    /// Creates a draft order, optionally with its first lines
    #[instrument(skip(self, input), fields(supplier_id = input.supplier_id))]
    pub async fn create(&self, input: NewPurchaseOrder) -> Result<PurchaseOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;

        let supplier = find_supplier(&txn, input.supplier_id).await?;
        let mut order = create_draft_order(&txn, &supplier, input.notes, input.created_by).await?;

        if !input.items.is_empty() {
            for item in &input.items {
                add_line_item(&txn, &order, item).await?;
            }
            order = recompute_totals(&txn, order).await?;
        }

        let detail = load_detail(&txn, order).await?;
        txn.commit().await?;

        counter!("best_buy.purchase_orders_created", 1);
        info!(po_id = detail.order.id, po_number = %detail.order.po_number, "Purchase order created");
        self.event_sender.send_or_log(Event::PurchaseOrderCreated {
            po_id: detail.order.id,
            po_number: detail.order.po_number.clone(),
            supplier_id: detail.order.supplier_id,
        });

        Ok(detail)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, po_id: i32) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = &*self.db;
        let order = find_order(db, po_id).await?;
        load_detail(db, order).await
    }

    /// Newest orders first
    #[instrument(skip(self))]
    pub async fn list(&self, filter: OrderListFilter) -> Result<Vec<PurchaseOrderSummary>, ServiceError> {
        let db = &*self.db;

        let mut query = purchase_order::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchase_order::Column::SupplierId.eq(supplier_id));
        }

        let orders = query
            .order_by_desc(purchase_order::Column::CreatedAt)
            .order_by_desc(purchase_order::Column::Id)
            .limit(filter.limit.unwrap_or(self.default_list_limit))
            .all(db)
            .await?;

        let mut supplier_ids: Vec<i32> = orders.iter().map(|o| o.supplier_id).collect();
        supplier_ids.sort_unstable();
        supplier_ids.dedup();
        let names: HashMap<i32, String> = supplier::Entity::find()
            .filter(supplier::Column::Id.is_in(supplier_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| PurchaseOrderSummary {
                supplier_name: names.get(&order.supplier_id).cloned(),
                order,
            })
            .collect())
    }

    /// Adds or merges a line; allowed while the order is draft, sent or partial
    #[instrument(skip(self, item), fields(upc = %item.upc))]
    pub async fn add_item(&self, po_id: i32, item: NewLineItem) -> Result<LineItemChange, ServiceError> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, po_id).await?;
        let line = add_line_item(&txn, &order, &item).await?;
        let order = recompute_totals(&txn, order).await?;

        txn.commit().await?;

        info!(po_id, line_id = line.id, qty = line.qty_ordered, "Line item saved");
        Ok(LineItemChange {
            status: "saved".to_string(),
            line: Some(line),
            po_total_cost: order.total_cost,
        })
    }

    /// Removes a line from a draft order
    #[instrument(skip(self))]
    pub async fn remove_item(&self, po_id: i32, item_id: i32) -> Result<LineItemChange, ServiceError> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, po_id).await?;
        if order.status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::InvalidState(format!(
                "Cannot remove items from {} order",
                order.status
            )));
        }

        let line = po_line_item::Entity::find_by_id(item_id)
            .filter(po_line_item::Column::PoId.eq(po_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Line item", item_id))?;
        line.delete(&txn).await?;

        let order = recompute_totals(&txn, order).await?;
        txn.commit().await?;

        info!(po_id, item_id, "Line item removed");
        Ok(LineItemChange {
            status: "deleted".to_string(),
            line: None,
            po_total_cost: order.total_cost,
        })
    }

    /// draft -> sent. Requires at least one line.
    #[instrument(skip(self))]
    pub async fn send(&self, po_id: i32, input: SendOrderInput) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, po_id).await?;
        if order.status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::InvalidState(format!(
                "Can only send draft orders, current status: {}",
                order.status
            )));
        }
        if order.total_items == 0 {
            return Err(ServiceError::InvalidState("Cannot send empty order".to_string()));
        }

        let sent_at = Utc::now();
        let mut active = order.into_active_model();
        active.status = Set(PurchaseOrderStatus::Sent);
        active.sent_at = Set(Some(sent_at));
        if let Some(expected) = input.expected_delivery {
            active.expected_delivery = Set(Some(expected));
        }
        let order = active.update(&txn).await?;

        txn.commit().await?;

        info!(po_id, po_number = %order.po_number, "Purchase order sent");
        self.event_sender
            .send_or_log(Event::PurchaseOrderSent { po_id, sent_at });

        Ok(order)
    }

    /// Any state -> closed. Closing a closed order is a no-op.
    #[instrument(skip(self))]
    pub async fn close(&self, po_id: i32) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, po_id).await?;
        if order.status == PurchaseOrderStatus::Closed {
            return Ok(order);
        }

        let mut active = order.into_active_model();
        active.status = Set(PurchaseOrderStatus::Closed);
        active.closed_at = Set(Some(Utc::now()));
        let order = active.update(&txn).await?;

        txn.commit().await?;

        info!(po_id, "Purchase order closed");
        self.event_sender.send_or_log(Event::PurchaseOrderClosed(po_id));

        Ok(order)
    }

    /// Deletes a draft order together with its lines
    #[instrument(skip(self))]
    pub async fn delete(&self, po_id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, po_id).await?;
        if order.status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::InvalidState(
                "Can only delete draft orders".to_string(),
            ));
        }

        po_line_item::Entity::delete_many()
            .filter(po_line_item::Column::PoId.eq(po_id))
            .exec(&txn)
            .await?;
        order.delete(&txn).await?;

        txn.commit().await?;

        info!(po_id, "Purchase order deleted");
        self.event_sender.send_or_log(Event::PurchaseOrderDeleted(po_id));

        Ok(())
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        po_id: i32,
        update: PurchaseOrderUpdate,
    ) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, po_id).await?;
        if order.status == PurchaseOrderStatus::Closed {
            return Err(ServiceError::InvalidState(
                "Cannot update closed order".to_string(),
            ));
        }

        let mut active = order.into_active_model();
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(expected) = update.expected_delivery {
            active.expected_delivery = Set(Some(expected));
        }
        let order = active.update(&txn).await?;

        txn.commit().await?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(id: i32, qty_ordered: i32, qty_received: i32, unit_cost: Decimal) -> po_line_item::Model {
        po_line_item::Model {
            id,
            po_id: 1,
            upc: format!("0000000000{:02}", id),
            product_id: None,
            product_name: None,
            supplier_sku: None,
            qty_ordered,
            unit_cost,
            case_pack: 12,
            line_total: line_total(unit_cost, qty_ordered),
            qty_received,
            qty_pending: qty_ordered - qty_received,
            status: line_status(qty_ordered, qty_received),
        }
    }

    #[test]
    fn po_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_po_number("CORE", date, 1), "PO-CORE-20240307-001");
        assert_eq!(format_po_number("MCL", date, 42), "PO-MCL-20240307-042");
    }

    #[test]
    fn next_sequence_follows_highest_suffix() {
        let prefix = "PO-CORE-20240307";
        assert_eq!(next_sequence::<&str>(prefix, &[]), 1);
        assert_eq!(
            next_sequence(prefix, &["PO-CORE-20240307-001", "PO-CORE-20240307-003"]),
            4
        );
    }

    #[test]
    fn next_sequence_ignores_foreign_numbers() {
        let prefix = "PO-CORE-20240307";
        assert_eq!(
            next_sequence(
                prefix,
                &["PO-CORE-20240307-002", "PO-COREX-20240307-009", "PO-CORE-20240307-abc"]
            ),
            3
        );
    }

    #[rstest]
    #[case(dec!(2.50), 4, dec!(10.00))]
    #[case(dec!(1.3333), 3, dec!(4.00))]
    #[case(dec!(0.125), 1, dec!(0.12))]
    fn line_total_is_rounded_to_cents(#[case] unit: Decimal, #[case] qty: i32, #[case] expected: Decimal) {
        assert_eq!(line_total(unit, qty), expected);
    }

    #[rstest]
    #[case(10, 0, LineItemStatus::Pending)]
    #[case(10, 4, LineItemStatus::Partial)]
    #[case(10, 10, LineItemStatus::Received)]
    #[case(10, 12, LineItemStatus::Received)]
    fn line_status_tracks_receipts(#[case] ordered: i32, #[case] received: i32, #[case] expected: LineItemStatus) {
        assert_eq!(line_status(ordered, received), expected);
    }

    #[rstest]
    #[case(2, 3, Some(5))]
    #[case(MAX_LINE_QTY - 1, 1, Some(MAX_LINE_QTY))]
    #[case(MAX_LINE_QTY, 1, None)]
    #[case(2_000_000_000, 2_000_000_000, None)]
    fn add_qty_is_bounded(#[case] current: i32, #[case] added: i32, #[case] expected: Option<i32>) {
        assert_eq!(add_qty(current, added).ok(), expected);
    }

    #[test]
    fn totals_saturate_instead_of_wrapping() {
        let lines = vec![line(1, i32::MAX, i32::MAX, dec!(1)), line(2, 5, 5, dec!(1))];
        let totals = OrderTotals::from_lines(&lines);
        assert_eq!(totals.total_cases, i32::MAX);
        assert_eq!(totals.cases_received, i32::MAX);
    }

    #[test]
    fn totals_from_lines() {
        let lines = vec![
            line(1, 4, 0, dec!(2.50)),
            line(2, 2, 2, dec!(10.00)),
            line(3, 6, 3, dec!(0.50)),
        ];
        let totals = OrderTotals::from_lines(&lines);

        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.total_cases, 12);
        assert_eq!(totals.total_cost, dec!(33.00));
        assert_eq!(totals.items_received, 2);
        assert_eq!(totals.cases_received, 5);
    }

    #[test]
    fn totals_of_empty_order_are_zero() {
        assert_eq!(OrderTotals::from_lines(&[]), OrderTotals::default());
    }

    proptest! {
        #[test]
        fn recomputing_totals_is_stable(
            specs in prop::collection::vec((1i32..50, 0i32..60, 1u32..10_000), 0..20)
        ) {
            let lines: Vec<po_line_item::Model> = specs
                .iter()
                .enumerate()
                .map(|(i, (ordered, received, cents))| {
                    line(i as i32, *ordered, *received, Decimal::new(*cents as i64, 2))
                })
                .collect();

            let first = OrderTotals::from_lines(&lines);
            let second = OrderTotals::from_lines(&lines);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.total_items as usize, lines.len());
        }
    }
}
