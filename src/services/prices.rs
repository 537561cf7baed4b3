use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        product,
        supplier,
        supplier_price::{self, PriceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

const DEFAULT_PRICE_LIST_LIMIT: u64 = 100;

fn default_case_pack() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

pub(crate) fn validate_positive_cost(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

/// A single price typed in by hand or read from an uploaded price list
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ManualPriceEntry {
    #[validate(length(min = 1, max = 50))]
    pub upc: String,
    #[validate(custom = "validate_positive_cost")]
    pub unit_cost: Decimal,
    pub case_cost: Option<Decimal>,
    #[serde(default = "default_case_pack")]
    #[validate(range(min = 1))]
    pub case_pack: i32,
    #[serde(default)]
    pub price_type: PriceType,
    pub promo_name: Option<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    pub supplier_sku: Option<String>,
    pub effective_date: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BulkPriceError {
    pub upc: String,
    pub error: String,
}

/// Outcome of a price list upload. Rejected rows never roll back accepted ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkPriceResult {
    pub created: usize,
    pub failed: usize,
    pub errors: Vec<BulkPriceError>,
}

/// Looks up the current observation for a (UPC, supplier) pair.
///
/// Current means the latest `effective_date` that is not in the future and has not expired.
pub async fn current_price_with<C: ConnectionTrait>(
    db: &C,
    upc: &str,
    supplier_id: i32,
) -> Result<Option<supplier_price::Model>, ServiceError> {
    let now = Utc::now();

    let price = supplier_price::Entity::find()
        .filter(supplier_price::Column::Upc.eq(upc))
        .filter(supplier_price::Column::SupplierId.eq(supplier_id))
        .filter(supplier_price::Column::EffectiveDate.lte(now))
        .filter(
            Condition::any()
                .add(supplier_price::Column::ExpiresAt.is_null())
                .add(supplier_price::Column::ExpiresAt.gt(now)),
        )
        .order_by_desc(supplier_price::Column::EffectiveDate)
        .order_by_desc(supplier_price::Column::Id)
        .one(db)
        .await?;

    Ok(price)
}

async fn insert_price<C: ConnectionTrait>(
    db: &C,
    supplier_id: i32,
    entry: &ManualPriceEntry,
) -> Result<supplier_price::Model, ServiceError> {
    if !entry.unit_cost.is_sign_positive() || entry.unit_cost.is_zero() {
        return Err(ServiceError::InvalidInput(format!(
            "unit_cost must be positive, got {}",
            entry.unit_cost
        )));
    }
    if entry.case_pack < 1 {
        return Err(ServiceError::InvalidInput(format!(
            "case_pack must be at least 1, got {}",
            entry.case_pack
        )));
    }

    let product_id = product::Entity::find()
        .filter(product::Column::Upc.eq(entry.upc.as_str()))
        .one(db)
        .await?
        .map(|p| p.id);

    let now = Utc::now();
    let case_cost = entry
        .case_cost
        .unwrap_or_else(|| entry.unit_cost * Decimal::from(entry.case_pack));

    let price = supplier_price::ActiveModel {
        upc: Set(entry.upc.clone()),
        product_id: Set(product_id),
        supplier_id: Set(supplier_id),
        supplier_sku: Set(entry.supplier_sku.clone()),
        unit_cost: Set(entry.unit_cost),
        case_cost: Set(Some(case_cost)),
        case_pack: Set(entry.case_pack),
        effective_date: Set(entry.effective_date.unwrap_or(now)),
        expires_at: Set(entry.expires_at),
        price_type: Set(entry.price_type),
        promo_name: Set(entry.promo_name.clone()),
        source: Set(Some("manual".to_string())),
        in_stock: Set(entry.in_stock),
        available_qty: Set(None),
        created_at: Set(now),
        ..Default::default()
    };

    Ok(price.insert(db).await?)
}

async fn ensure_supplier<C: ConnectionTrait>(
    db: &C,
    supplier_id: i32,
) -> Result<supplier::Model, ServiceError> {
    supplier::Entity::find_by_id(supplier_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))
}

/// Append-only store of supplier price observations
#[derive(Clone)]
pub struct PriceService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl PriceService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Records one manual price for a supplier
    #[instrument(skip(self, entry), fields(upc = %entry.upc))]
    pub async fn add_supplier_price(
        &self,
        supplier_id: i32,
        entry: ManualPriceEntry,
    ) -> Result<supplier_price::Model, ServiceError> {
        let txn = self.db.begin().await?;

        ensure_supplier(&txn, supplier_id).await?;
        let created = insert_price(&txn, supplier_id, &entry).await?;

        txn.commit().await?;

        info!(
            price_id = created.id,
            supplier_id,
            unit_cost = %created.unit_cost,
            "Supplier price recorded"
        );
        Ok(created)
    }

    /// Uploads a price list. Every row gets its own savepoint so one bad row only fails itself.
    #[instrument(skip(self, entries), fields(rows = entries.len()))]
    pub async fn bulk_add_prices(
        &self,
        supplier_id: i32,
        entries: Vec<ManualPriceEntry>,
    ) -> Result<BulkPriceResult, ServiceError> {
        let txn = self.db.begin().await?;
        ensure_supplier(&txn, supplier_id).await?;

        let mut result = BulkPriceResult::default();

        for entry in &entries {
            let savepoint = txn.begin().await?;
            match insert_price(&savepoint, supplier_id, entry).await {
                Ok(_) => {
                    savepoint.commit().await?;
                    result.created += 1;
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    warn!(upc = %entry.upc, "Rejected price row: {}", e);
                    result.failed += 1;
                    result.errors.push(BulkPriceError {
                        upc: entry.upc.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        txn.commit().await?;

        info!(
            supplier_id,
            created = result.created,
            failed = result.failed,
            "Price list imported"
        );
        self.event_sender.send_or_log(Event::PricesImported {
            supplier_id,
            created: result.created,
            failed: result.failed,
        });

        Ok(result)
    }

    /// Newest prices first, optionally restricted to one catalog department
    #[instrument(skip(self))]
    pub async fn get_supplier_prices(
        &self,
        supplier_id: i32,
        department: Option<String>,
        limit: Option<u64>,
    ) -> Result<Vec<supplier_price::Model>, ServiceError> {
        let db = &*self.db;
        ensure_supplier(db, supplier_id).await?;

        let mut query = supplier_price::Entity::find()
            .filter(supplier_price::Column::SupplierId.eq(supplier_id));

        if let Some(department) = department {
            query = query
                .join(JoinType::InnerJoin, supplier_price::Relation::Product.def())
                .filter(product::Column::Department.eq(department));
        }

        let prices = query
            .order_by_desc(supplier_price::Column::EffectiveDate)
            .order_by_desc(supplier_price::Column::Id)
            .limit(limit.unwrap_or(DEFAULT_PRICE_LIST_LIMIT))
            .all(db)
            .await?;

        Ok(prices)
    }

    #[instrument(skip(self))]
    pub async fn current_price(
        &self,
        upc: &str,
        supplier_id: i32,
    ) -> Result<Option<supplier_price::Model>, ServiceError> {
        current_price_with(&*self.db, upc, supplier_id).await
    }
}
