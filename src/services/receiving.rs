use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
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
        product, purchase_order::{self, PurchaseOrderStatus},
        receiving_item::{self, DiscrepancyType},
        receiving_session::{self, ReceivingStatus},
        supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::purchase_orders::{
        add_qty, find_order, find_supplier, line_status, recompute_totals, MAX_LINE_QTY,
    },
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct StartReceiving {
    pub po_id: Option<i32>,
    pub supplier_id: Option<i32>,
    #[validate(length(max = 50))]
    pub invoice_number: Option<String>,
    #[validate(length(max = 50))]
    pub delivery_ticket: Option<String>,
    pub received_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReceiveItem {
    #[validate(length(min = 1, max = 50))]
    pub upc: String,
    #[validate(range(min = 0, max = 1000000))]
    pub qty_received: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 1000000))]
    pub qty_damaged: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CompleteSession {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionListFilter {
    pub po_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub status: Option<ReceivingStatus>,
    pub limit: Option<u64>,
}

/// A purchase order line as seen from the receiving dock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExpectedItem {
    pub po_line_id: i32,
    pub upc: String,
    pub product_name: Option<String>,
    pub qty_ordered: i32,
    pub qty_received: i32,
    pub qty_pending: i32,
}

impl From<&po_line_item::Model> for ExpectedItem {
    fn from(line: &po_line_item::Model) -> Self {
        Self {
            po_line_id: line.id,
            upc: line.upc.clone(),
            product_name: line.product_name.clone(),
            qty_ordered: line.qty_ordered,
            qty_received: line.qty_received,
            qty_pending: line.qty_ordered - line.qty_received,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionStarted {
    #[serde(flatten)]
    pub session: receiving_session::Model,
    pub expected_items: Vec<ExpectedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionSummary {
    #[serde(flatten)]
    pub session: receiving_session::Model,
    pub po_number: Option<String>,
    pub supplier_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: receiving_session::Model,
    pub po_number: Option<String>,
    pub supplier_name: Option<String>,
    pub expected_items: Vec<ExpectedItem>,
    pub received_items: Vec<receiving_item::Model>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionTotals {
    pub total_items: i32,
    pub total_cases: i32,
    pub items_short: i32,
    pub items_over: i32,
    pub items_damaged: i32,
}

impl From<&receiving_session::Model> for SessionTotals {
    fn from(s: &receiving_session::Model) -> Self {
        Self {
            total_items: s.total_items,
            total_cases: s.total_cases,
            items_short: s.items_short,
            items_over: s.items_over,
            items_damaged: s.items_damaged,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceiveResult {
    #[serde(flatten)]
    pub item: receiving_item::Model,
    pub on_po: bool,
    pub session_totals: SessionTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletionResult {
    #[serde(flatten)]
    pub session: receiving_session::Model,
    pub po_status: Option<PurchaseOrderStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineProgress {
    pub id: i32,
    pub upc: String,
    pub product_name: Option<String>,
    pub qty_ordered: i32,
    pub qty_received: i32,
    pub qty_pending: i32,
    pub status: LineItemStatus,
    pub percent_received: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PoReceivingStatus {
    pub po_id: i32,
    pub po_number: String,
    pub status: PurchaseOrderStatus,
    pub total_ordered: i32,
    pub total_received: i32,
    pub percent_complete: Decimal,
    pub items: Vec<LineProgress>,
}

/// How a scan relates to the session's purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatch {
    /// Matched a line with this many cases still expected
    Expected(i32),
    /// The session has an order but the UPC is not on it
    NotOnOrder,
    /// Free-standing delivery, nothing to reconcile against
    NoOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub discrepancy_type: DiscrepancyType,
    pub discrepancy_qty: i32,
    pub qty_good: i32,
}

/// Classifies one scan. Short and over take precedence over damaged.
pub fn classify(line: LineMatch, qty_received: i32, qty_damaged: i32) -> Classification {
    let qty_good = qty_received - qty_damaged;

    let (discrepancy_type, discrepancy_qty) = match line {
        LineMatch::Expected(expected) if qty_good < expected => {
            (DiscrepancyType::Short, expected - qty_good)
        }
        LineMatch::Expected(expected) if qty_good > expected => {
            (DiscrepancyType::Over, qty_good - expected)
        }
        LineMatch::NotOnOrder => (DiscrepancyType::WrongItem, qty_received),
        LineMatch::Expected(_) | LineMatch::NoOrder if qty_damaged > 0 => {
            (DiscrepancyType::Damaged, qty_damaged)
        }
        LineMatch::Expected(_) | LineMatch::NoOrder => (DiscrepancyType::None, 0),
    };

    Classification {
        discrepancy_type,
        discrepancy_qty,
        qty_good,
    }
}

/// `part / whole` as a percentage with one decimal; zero when `whole` is zero
pub fn percent(part: i32, whole: i32) -> Decimal {
    if whole <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::from(100) / Decimal::from(whole)).round_dp(1)
}

/// A line's receiving progress after one more receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineReceipt {
    pub qty_received: i32,
    pub qty_pending: i32,
    pub status: LineItemStatus,
}

pub fn apply_receipt(qty_ordered: i32, qty_received: i32, qty: i32) -> Result<LineReceipt, ServiceError> {
    let qty_received = add_qty(qty_received, qty)?;
    Ok(LineReceipt {
        qty_received,
        qty_pending: qty_ordered - qty_received,
        status: line_status(qty_ordered, qty_received),
    })
}

fn bump_counters(
    session: &mut SessionTotals,
    kind: DiscrepancyType,
    qty_received: i32,
    qty_damaged: i32,
) -> Result<(), ServiceError> {
    session.total_cases = session.total_cases.checked_add(qty_received).ok_or_else(|| {
        ServiceError::InvalidInput("Session case count would overflow".to_string())
    })?;
    session.total_items = session.total_items.saturating_add(1);
    match kind {
        DiscrepancyType::Short => session.items_short += 1,
        DiscrepancyType::Over => session.items_over += 1,
        _ if kind == DiscrepancyType::Damaged || qty_damaged > 0 => session.items_damaged += 1,
        _ => {}
    }
    Ok(())
}

async fn find_session<C: ConnectionTrait>(
    db: &C,
    session_id: i32,
) -> Result<receiving_session::Model, ServiceError> {
    receiving_session::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Receiving session", session_id))
}

async fn order_lines<C: ConnectionTrait>(
    db: &C,
    po_id: i32,
    pending_only: bool,
) -> Result<Vec<po_line_item::Model>, ServiceError> {
    let mut query = po_line_item::Entity::find().filter(po_line_item::Column::PoId.eq(po_id));
    if pending_only {
        query = query.filter(po_line_item::Column::QtyPending.gt(0));
    }
    Ok(query.order_by_asc(po_line_item::Column::Id).all(db).await?)
}

/// Delivery check-in against purchase orders
#[derive(Clone)]
pub struct ReceivingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    default_list_limit: u64,
}

impl ReceivingService {
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

    /// Opens a session anchored on a purchase order or, failing that, a supplier.
    /// A sent order moves to partial as soon as receiving starts.
    #[instrument(skip(self, input), fields(po_id = ?input.po_id, supplier_id = ?input.supplier_id))]
    pub async fn start(&self, input: StartReceiving) -> Result<SessionStarted, ServiceError> {
        let txn = self.db.begin().await?;

        let (po_id, supplier_id) = match (input.po_id, input.supplier_id) {
            (Some(po_id), _) => {
                let order = find_order(&txn, po_id).await?;
                match order.status {
                    PurchaseOrderStatus::Closed => {
                        return Err(ServiceError::InvalidState(format!(
                            "Cannot receive against closed order {}",
                            order.po_number
                        )))
                    }
                    PurchaseOrderStatus::Sent => {
                        let supplier_id = order.supplier_id;
                        let mut active = order.into_active_model();
                        active.status = Set(PurchaseOrderStatus::Partial);
                        active.update(&txn).await?;
                        (Some(po_id), supplier_id)
                    }
                    _ => (Some(po_id), order.supplier_id),
                }
            }
            (None, Some(supplier_id)) => {
                find_supplier(&txn, supplier_id).await?;
                (None, supplier_id)
            }
            (None, None) => {
                return Err(ServiceError::InvalidInput(
                    "Must provide po_id or supplier_id".to_string(),
                ))
            }
        };

        let session = receiving_session::ActiveModel {
            po_id: Set(po_id),
            supplier_id: Set(Some(supplier_id)),
            received_at: Set(Utc::now()),
            completed_at: Set(None),
            received_by: Set(input.received_by),
            invoice_number: Set(input.invoice_number),
            delivery_ticket: Set(input.delivery_ticket),
            status: Set(ReceivingStatus::InProgress),
            total_items: Set(0),
            total_cases: Set(0),
            items_short: Set(0),
            items_over: Set(0),
            items_damaged: Set(0),
            notes: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let expected_items = match po_id {
            Some(po_id) => order_lines(&txn, po_id, true)
                .await?
                .iter()
                .map(ExpectedItem::from)
                .collect(),
            None => Vec::new(),
        };

        txn.commit().await?;

        info!(session_id = session.id, "Receiving session started");
        self.event_sender.send_or_log(Event::ReceivingStarted {
            session_id: session.id,
            po_id,
        });

        Ok(SessionStarted {
            session,
            expected_items,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, session_id: i32) -> Result<SessionDetail, ServiceError> {
        let db = &*self.db;
        let session = find_session(db, session_id).await?;

        let (po_number, expected_items) = match session.po_id {
            Some(po_id) => {
                let order = purchase_order::Entity::find_by_id(po_id).one(db).await?;
                let lines = order_lines(db, po_id, false).await?;
                (
                    order.map(|o| o.po_number),
                    lines.iter().map(ExpectedItem::from).collect(),
                )
            }
            None => (None, Vec::new()),
        };

        let supplier_name = match session.supplier_id {
            Some(id) => supplier::Entity::find_by_id(id).one(db).await?.map(|s| s.name),
            None => None,
        };

        let received_items = receiving_item::Entity::find()
            .filter(receiving_item::Column::SessionId.eq(session_id))
            .order_by_asc(receiving_item::Column::Id)
            .all(db)
            .await?;

        Ok(SessionDetail {
            session,
            po_number,
            supplier_name,
            expected_items,
            received_items,
        })
    }

    /// Newest sessions first
    #[instrument(skip(self))]
    pub async fn list(&self, filter: SessionListFilter) -> Result<Vec<SessionSummary>, ServiceError> {
        let db = &*self.db;

        let mut query = receiving_session::Entity::find();
        if let Some(po_id) = filter.po_id {
            query = query.filter(receiving_session::Column::PoId.eq(po_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(receiving_session::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(receiving_session::Column::Status.eq(status));
        }

        let sessions = query
            .order_by_desc(receiving_session::Column::ReceivedAt)
            .order_by_desc(receiving_session::Column::Id)
            .limit(filter.limit.unwrap_or(self.default_list_limit))
            .all(db)
            .await?;

        let po_ids: Vec<i32> = sessions.iter().filter_map(|s| s.po_id).collect();
        let po_numbers: HashMap<i32, String> = purchase_order::Entity::find()
            .filter(purchase_order::Column::Id.is_in(po_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|o| (o.id, o.po_number))
            .collect();

        let supplier_ids: Vec<i32> = sessions.iter().filter_map(|s| s.supplier_id).collect();
        let supplier_names: HashMap<i32, String> = supplier::Entity::find()
            .filter(supplier::Column::Id.is_in(supplier_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(sessions
            .into_iter()
            .map(|session| SessionSummary {
                po_number: session.po_id.and_then(|id| po_numbers.get(&id).cloned()),
                supplier_name: session.supplier_id.and_then(|id| supplier_names.get(&id).cloned()),
                session,
            })
            .collect())
    }

    /// Records one scanned delivery line and reconciles it against the order
    #[instrument(skip(self, input), fields(upc = %input.upc))]
    pub async fn receive(&self, session_id: i32, input: ReceiveItem) -> Result<ReceiveResult, ServiceError> {
        if input.qty_received < 0 || input.qty_damaged < 0 {
            return Err(ServiceError::InvalidInput(
                "Quantities cannot be negative".to_string(),
            ));
        }
        if input.qty_received > MAX_LINE_QTY {
            return Err(ServiceError::InvalidInput(format!(
                "Received quantity {} exceeds the limit of {} cases",
                input.qty_received, MAX_LINE_QTY
            )));
        }
        if input.qty_damaged > input.qty_received {
            return Err(ServiceError::InvalidInput(format!(
                "Damaged quantity {} exceeds received quantity {}",
                input.qty_damaged, input.qty_received
            )));
        }

        let txn = self.db.begin().await?;

        let session = find_session(&txn, session_id).await?;
        if session.status == ReceivingStatus::Completed {
            return Err(ServiceError::InvalidState("Session already completed".to_string()));
        }

        let product_name = product::Entity::find()
            .filter(product::Column::Upc.eq(input.upc.as_str()))
            .one(&txn)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| format!("UPC: {}", input.upc));

        let matched_line = match session.po_id {
            Some(po_id) => {
                po_line_item::Entity::find()
                    .filter(po_line_item::Column::PoId.eq(po_id))
                    .filter(po_line_item::Column::Upc.eq(input.upc.as_str()))
                    .order_by_asc(po_line_item::Column::Id)
                    .one(&txn)
                    .await?
            }
            None => None,
        };

        let line_match = match (&matched_line, session.po_id) {
            (Some(line), _) => LineMatch::Expected(line.qty_ordered - line.qty_received),
            (None, Some(_)) => LineMatch::NotOnOrder,
            (None, None) => LineMatch::NoOrder,
        };
        let outcome = classify(line_match, input.qty_received, input.qty_damaged);
        let qty_expected = match line_match {
            LineMatch::Expected(expected) => Some(expected),
            _ => None,
        };

        let po_line_id = match matched_line {
            Some(line) => {
                let line_id = line.id;
                let receipt = apply_receipt(line.qty_ordered, line.qty_received, input.qty_received)?;

                let mut active = line.into_active_model();
                active.qty_received = Set(receipt.qty_received);
                active.qty_pending = Set(receipt.qty_pending);
                active.status = Set(receipt.status);
                active.update(&txn).await?;

                Some(line_id)
            }
            None => None,
        };

        let item = receiving_item::ActiveModel {
            session_id: Set(session_id),
            po_line_id: Set(po_line_id),
            upc: Set(input.upc.clone()),
            product_name: Set(Some(product_name)),
            qty_received: Set(input.qty_received),
            qty_expected: Set(qty_expected),
            qty_damaged: Set(input.qty_damaged),
            qty_good: Set(outcome.qty_good),
            discrepancy_type: Set(outcome.discrepancy_type),
            discrepancy_qty: Set(outcome.discrepancy_qty),
            discrepancy_notes: Set(input.notes),
            scanned_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut totals = SessionTotals::from(&session);
        bump_counters(
            &mut totals,
            outcome.discrepancy_type,
            input.qty_received,
            input.qty_damaged,
        )?;

        let po_id = session.po_id;
        let mut active = session.into_active_model();
        active.total_items = Set(totals.total_items);
        active.total_cases = Set(totals.total_cases);
        active.items_short = Set(totals.items_short);
        active.items_over = Set(totals.items_over);
        active.items_damaged = Set(totals.items_damaged);
        active.update(&txn).await?;

        if let Some(po_id) = po_id {
            let order = find_order(&txn, po_id).await?;
            recompute_totals(&txn, order).await?;
        }

        txn.commit().await?;

        counter!("best_buy.items_received", 1);
        if outcome.discrepancy_type != DiscrepancyType::None {
            warn!(
                session_id,
                upc = %item.upc,
                discrepancy = %outcome.discrepancy_type,
                qty = outcome.discrepancy_qty,
                "Receiving discrepancy"
            );
        }

        Ok(ReceiveResult {
            item,
            on_po: po_line_id.is_some(),
            session_totals: totals,
        })
    }

    /// Marks the session completed and settles the order status from its pending lines.
    /// A closed order is left as it is.
    #[instrument(skip(self, input))]
    pub async fn complete(&self, session_id: i32, input: CompleteSession) -> Result<CompletionResult, ServiceError> {
        let txn = self.db.begin().await?;

        let session = find_session(&txn, session_id).await?;
        let po_id = session.po_id;

        let mut active = session.into_active_model();
        active.status = Set(ReceivingStatus::Completed);
        active.completed_at = Set(Some(Utc::now()));
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        let session = active.update(&txn).await?;

        let po_status = match po_id {
            Some(po_id) => {
                let order = find_order(&txn, po_id).await?;
                if order.status == PurchaseOrderStatus::Closed {
                    Some(order.status)
                } else {
                    let pending = po_line_item::Entity::find()
                        .filter(po_line_item::Column::PoId.eq(po_id))
                        .filter(po_line_item::Column::QtyPending.gt(0))
                        .count(&txn)
                        .await?;
                    let status = if pending == 0 {
                        PurchaseOrderStatus::Received
                    } else {
                        PurchaseOrderStatus::Partial
                    };

                    let mut active = order.into_active_model();
                    active.status = Set(status);
                    active.update(&txn).await?;
                    Some(status)
                }
            }
            None => None,
        };

        txn.commit().await?;

        info!(session_id, po_status = ?po_status, "Receiving session completed");
        self.event_sender.send_or_log(Event::ReceivingCompleted {
            session_id,
            po_id,
            items_short: session.items_short,
            items_over: session.items_over,
            items_damaged: session.items_damaged,
        });

        Ok(CompletionResult { session, po_status })
    }

    /// Ordered vs received, per line and for the whole order
    #[instrument(skip(self))]
    pub async fn po_status(&self, po_id: i32) -> Result<PoReceivingStatus, ServiceError> {
        let db = &*self.db;
        let order = find_order(db, po_id).await?;
        let lines = order_lines(db, po_id, false).await?;

        let total_ordered: i32 = lines.iter().map(|l| l.qty_ordered).sum();
        let total_received: i32 = lines.iter().map(|l| l.qty_received).sum();

        let items = lines
            .into_iter()
            .map(|l| LineProgress {
                percent_received: percent(l.qty_received, l.qty_ordered),
                qty_pending: l.qty_ordered - l.qty_received,
                id: l.id,
                upc: l.upc,
                product_name: l.product_name,
                qty_ordered: l.qty_ordered,
                qty_received: l.qty_received,
                status: l.status,
            })
            .collect();

        Ok(PoReceivingStatus {
            po_id: order.id,
            po_number: order.po_number,
            status: order.status,
            total_ordered,
            total_received,
            percent_complete: percent(total_received, total_ordered),
            items,
        })
    }
}
