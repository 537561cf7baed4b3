use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{cart_item, product, supplier},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        prices::current_price_with,
        purchase_orders::{
            add_line_item, add_qty, create_draft_order, find_supplier, line_total,
            recompute_totals, NewLineItem, MAX_LINE_QTY,
        },
    },
};

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddToCart {
    #[validate(length(min = 1, max = 50))]
    pub upc: String,
    pub supplier_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 1000000))]
    pub quantity: i32,
    pub unit_cost: Option<Decimal>,
    pub added_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartSummary {
    pub total_items: usize,
    pub po_count: usize,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartAddResult {
    pub id: i32,
    pub upc: String,
    pub product_name: Option<String>,
    pub supplier_name: String,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub cart_summary: CartSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: i32,
    pub upc: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub case_pack: i32,
    pub line_total: Decimal,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierCartGroup {
    pub supplier_id: i32,
    pub supplier_name: Option<String>,
    pub supplier_code: Option<String>,
    pub item_count: usize,
    pub total_cases: i32,
    pub total_cost: Decimal,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartContents {
    pub po_count: usize,
    pub total_items: usize,
    pub total_cost: Decimal,
    pub suppliers: Vec<SupplierCartGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedOrder {
    pub id: i32,
    pub po_number: String,
    pub supplier_name: String,
    pub item_count: usize,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartConversion {
    pub pos_created: usize,
    pub purchase_orders: Vec<CreatedOrder>,
}

/// Buckets cart entries per supplier, each bucket in the order items were added
pub fn group_by_supplier(items: Vec<cart_item::Model>) -> BTreeMap<i32, Vec<cart_item::Model>> {
    let mut groups: BTreeMap<i32, Vec<cart_item::Model>> = BTreeMap::new();
    for item in items {
        groups.entry(item.supplier_id).or_default().push(item);
    }
    for bucket in groups.values_mut() {
        bucket.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
    }
    groups
}

fn summarize(items: &[cart_item::Model]) -> CartSummary {
    let mut suppliers: Vec<i32> = items.iter().map(|i| i.supplier_id).collect();
    suppliers.sort_unstable();
    suppliers.dedup();

    CartSummary {
        total_items: items.len(),
        po_count: suppliers.len(),
        total_cost: items
            .iter()
            .map(|i| line_total(i.unit_cost, i.quantity))
            .sum(),
    }
}

/// Staging area between a scan and a purchase order
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds to the cart, or bumps the quantity of the existing (upc, supplier) entry.
    /// The unit cost of an existing entry stays as first locked in.
    #[instrument(skip(self, input), fields(upc = %input.upc, supplier_id = input.supplier_id))]
    pub async fn add(&self, input: AddToCart) -> Result<CartAddResult, ServiceError> {
        if !(1..=MAX_LINE_QTY).contains(&input.quantity) {
            return Err(ServiceError::InvalidInput(format!(
                "Quantity must be between 1 and {}, got {}",
                MAX_LINE_QTY, input.quantity
            )));
        }

        let txn = self.db.begin().await?;
        let supplier = find_supplier(&txn, input.supplier_id).await?;

        let existing = cart_item::Entity::find()
            .filter(cart_item::Column::Upc.eq(input.upc.as_str()))
            .filter(cart_item::Column::SupplierId.eq(input.supplier_id))
            .one(&txn)
            .await?;

        let item = match existing {
            Some(entry) => {
                let quantity = add_qty(entry.quantity, input.quantity)?;
                let mut active = entry.into_active_model();
                active.quantity = Set(quantity);
                active.update(&txn).await?
            }
            None => {
                let price = current_price_with(&txn, &input.upc, input.supplier_id).await?;
                let (unit_cost, case_pack) = match (input.unit_cost, &price) {
                    (Some(cost), price) => (cost, price.as_ref().map_or(1, |p| p.case_pack)),
                    (None, Some(price)) => (price.unit_cost, price.case_pack),
                    (None, None) => {
                        return Err(ServiceError::MissingPrice(
                            "No price found for this item from this supplier".to_string(),
                        ))
                    }
                };

                let product_name = product::Entity::find()
                    .filter(product::Column::Upc.eq(input.upc.as_str()))
                    .one(&txn)
                    .await?
                    .map(|p| p.name)
                    .unwrap_or_else(|| format!("UPC: {}", input.upc));

                cart_item::ActiveModel {
                    upc: Set(input.upc.clone()),
                    product_name: Set(Some(product_name)),
                    supplier_id: Set(input.supplier_id),
                    quantity: Set(input.quantity),
                    unit_cost: Set(unit_cost),
                    case_pack: Set(case_pack.max(1)),
                    added_at: Set(Utc::now()),
                    added_by: Set(input.added_by.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let all = cart_item::Entity::find().all(&txn).await?;
        txn.commit().await?;

        info!(cart_item_id = item.id, quantity = item.quantity, "Cart updated");
        Ok(CartAddResult {
            id: item.id,
            upc: item.upc,
            product_name: item.product_name,
            supplier_name: supplier.name,
            quantity: item.quantity,
            unit_cost: item.unit_cost,
            cart_summary: summarize(&all),
        })
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, item_id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let item = cart_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cart item", item_id))?;
        item.delete(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Empties the cart. Returns how many entries were removed.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64, ServiceError> {
        let txn = self.db.begin().await?;
        let removed = cart_item::Entity::delete_many().exec(&txn).await?;
        txn.commit().await?;

        info!(removed = removed.rows_affected, "Cart cleared");
        Ok(removed.rows_affected)
    }

    /// Cart contents grouped the way they will be split into orders
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<CartContents, ServiceError> {
        let db = &*self.db;

        let items = cart_item::Entity::find()
            .order_by_asc(cart_item::Column::SupplierId)
            .order_by_asc(cart_item::Column::AddedAt)
            .all(db)
            .await?;

        let suppliers: HashMap<i32, supplier::Model> = supplier::Entity::find()
            .filter(
                supplier::Column::Id.is_in(items.iter().map(|i| i.supplier_id).collect::<Vec<_>>()),
            )
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut groups = Vec::new();
        let mut total_items = 0;
        let mut total_cost = Decimal::ZERO;

        for (supplier_id, entries) in group_by_supplier(items) {
            let supplier = suppliers.get(&supplier_id);
            let lines: Vec<CartLine> = entries
                .into_iter()
                .map(|e| CartLine {
                    line_total: line_total(e.unit_cost, e.quantity),
                    id: e.id,
                    upc: e.upc,
                    product_name: e.product_name,
                    quantity: e.quantity,
                    unit_cost: e.unit_cost,
                    case_pack: e.case_pack,
                    added_at: e.added_at,
                })
                .collect();
            let group_cost: Decimal = lines.iter().map(|l| l.line_total).sum();

            total_items += lines.len();
            total_cost += group_cost;
            groups.push(SupplierCartGroup {
                supplier_id,
                supplier_name: supplier.map(|s| s.name.clone()),
                supplier_code: supplier.map(|s| s.code.clone()),
                item_count: lines.len(),
                total_cases: lines.iter().fold(0i32, |sum, l| sum.saturating_add(l.quantity)),
                total_cost: group_cost,
                items: lines,
            });
        }

        Ok(CartContents {
            po_count: groups.len(),
            total_items,
            total_cost,
            suppliers: groups,
        })
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<CartSummary, ServiceError> {
        let items = cart_item::Entity::find().all(&*self.db).await?;
        Ok(summarize(&items))
    }

    /// Turns the cart into one draft order per supplier.
    ///
    /// Orders are created first and the cart is emptied last, all in one transaction.
    #[instrument(skip(self))]
    pub async fn create_orders(&self, created_by: Option<String>) -> Result<CartConversion, ServiceError> {
        let txn = self.db.begin().await?;

        let items = cart_item::Entity::find()
            .order_by_asc(cart_item::Column::SupplierId)
            .order_by_asc(cart_item::Column::AddedAt)
            .all(&txn)
            .await?;
        if items.is_empty() {
            return Err(ServiceError::InvalidState("Cart is empty".to_string()));
        }

        let mut created = Vec::new();
        for (supplier_id, entries) in group_by_supplier(items) {
            let supplier = find_supplier(&txn, supplier_id).await?;
            let order = create_draft_order(&txn, &supplier, None, created_by.clone()).await?;

            for entry in &entries {
                let line = NewLineItem {
                    upc: entry.upc.clone(),
                    qty: entry.quantity,
                    unit_cost: Some(entry.unit_cost),
                    case_pack: Some(entry.case_pack),
                };
                add_line_item(&txn, &order, &line).await?;
            }

            let order = recompute_totals(&txn, order).await?;
            created.push(CreatedOrder {
                id: order.id,
                po_number: order.po_number,
                supplier_name: supplier.name,
                item_count: entries.len(),
                total_cost: order.total_cost,
            });
        }

        cart_item::Entity::delete_many().exec(&txn).await?;
        txn.commit().await?;

        let po_ids: Vec<i32> = created.iter().map(|o| o.id).collect();
        let total_cost: Decimal = created.iter().map(|o| o.total_cost).sum();
        info!(pos_created = created.len(), %total_cost, "Cart converted to purchase orders");
        self.event_sender
            .send_or_log(Event::CartConverted { po_ids, total_cost });

        Ok(CartConversion {
            pos_created: created.len(),
            purchase_orders: created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn entry(id: i32, supplier_id: i32, minutes_ago: i64, qty: i32, cost: Decimal) -> cart_item::Model {
        cart_item::Model {
            id,
            upc: format!("UPC{}", id),
            product_name: None,
            supplier_id,
            quantity: qty,
            unit_cost: cost,
            case_pack: 1,
            added_at: Utc::now() - Duration::minutes(minutes_ago),
            added_by: None,
        }
    }

    #[test]
    fn groups_by_supplier_in_added_order() {
        let groups = group_by_supplier(vec![
            entry(1, 2, 5, 1, dec!(1)),
            entry(2, 1, 10, 1, dec!(1)),
            entry(3, 2, 30, 1, dec!(1)),
        ]);

        let keys: Vec<i32> = groups.keys().copied().collect();
        assert_eq!(keys, vec![1, 2]);
        let ids: Vec<i32> = groups[&2].iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn summary_counts_distinct_suppliers() {
        let summary = summarize(&[
            entry(1, 2, 0, 2, dec!(2.50)),
            entry(2, 1, 0, 3, dec!(0.50)),
            entry(3, 2, 0, 1, dec!(1.00)),
        ]);

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.po_count, 2);
        assert_eq!(summary.total_cost, dec!(7.50));
    }

    #[test]
    fn add_request_defaults_quantity() {
        let parsed: AddToCart =
            serde_json::from_str(r#"{"upc":"012345678905","supplier_id":3}"#).unwrap();
        assert_eq!(parsed.quantity, 1);
        assert!(parsed.validate().is_ok());
    }
}
