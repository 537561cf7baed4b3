//! Price comparison engine.
//!
//! Turns the raw price observations for one scanned item into a ranked list of
//! supplier offers, one per supplier, ordered by landed cost per unit.

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        comparison::{self, ComparisonAction},
        product, supplier,
        supplier_price::{self, PriceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{landed_cost, upc},
};

pub const PRODUCT_NOT_FOUND: &str = "Product not found in catalog";

/// Catalog state of the scanned item at comparison time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub id: i32,
    pub name: String,
    pub department: Option<String>,
    pub current_cost: Option<Decimal>,
    pub current_vendor: Option<String>,
    pub retail_price: Option<Decimal>,
    pub pack_size: i32,
}

impl From<&product::Model> for ProductSnapshot {
    fn from(p: &product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            department: p.department.clone(),
            current_cost: p.current_cost,
            current_vendor: p.current_vendor.clone(),
            retail_price: p.retail_price,
            pack_size: p.pack_size.max(1),
        }
    }
}

/// One supplier's current offer for the scanned item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceOffer {
    pub rank: usize,
    pub supplier_id: i32,
    pub supplier_name: String,
    pub supplier_code: String,
    pub unit_cost: Decimal,
    pub case_cost: Decimal,
    pub case_pack: i32,
    pub landed_cost_per_unit: Decimal,
    pub effective_date: DateTime<Utc>,
    pub price_age_hours: Decimal,
    pub in_stock: bool,
    pub price_type: PriceType,
    pub promo_name: Option<String>,
    pub savings_vs_current: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceStatistics {
    pub min_cost: Decimal,
    pub max_cost: Decimal,
    pub avg_cost: Decimal,
    pub spread: Decimal,
    pub potential_savings: Option<Decimal>,
}

/// Result of one scan. An unknown UPC is a normal result with `error` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComparisonResult {
    pub upc: String,
    pub product: Option<ProductSnapshot>,
    pub prices: Vec<PriceOffer>,
    pub statistics: Option<PriceStatistics>,
    /// Offers found before the result was truncated to the limit
    pub suppliers_checked: usize,
    pub comparison_time: DateTime<Utc>,
    pub error: Option<String>,
}

impl ComparisonResult {
    fn product_not_found(upc: &str, now: DateTime<Utc>) -> Self {
        Self {
            upc: upc.to_string(),
            product: None,
            prices: Vec::new(),
            statistics: None,
            suppliers_checked: 0,
            comparison_time: now,
            error: Some(PRODUCT_NOT_FOUND.to_string()),
        }
    }

    pub fn potential_savings(&self) -> Option<Decimal> {
        self.statistics.as_ref().and_then(|s| s.potential_savings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonOptions {
    pub max_age_hours: i64,
    pub include_out_of_stock: bool,
    pub limit: usize,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            max_age_hours: 168,
            include_out_of_stock: false,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchSummary {
    pub items_compared: usize,
    pub items_with_prices: usize,
    pub total_potential_savings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchComparison {
    pub comparisons: Vec<ComparisonResult>,
    pub summary: BatchSummary,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveComparisonInput {
    #[validate(length(min = 1, max = 50))]
    pub upc: String,
    pub selected_supplier_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SavedComparison {
    pub id: i32,
    pub status: String,
}

/// Keeps the most recent observation per supplier.
///
/// Rows are ordered by supplier id, then newest effective date first, and the first
/// row of each supplier survives.
pub fn dedupe_latest_per_supplier(mut rows: Vec<supplier_price::Model>) -> Vec<supplier_price::Model> {
    rows.sort_by(|a, b| {
        a.supplier_id
            .cmp(&b.supplier_id)
            .then_with(|| b.effective_date.cmp(&a.effective_date))
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(row.supplier_id));
    rows
}

/// Orders offers by landed cost per unit and numbers them from 1. Ties keep input order.
pub fn rank_offers(offers: &mut [PriceOffer]) {
    offers.sort_by(|a, b| a.landed_cost_per_unit.cmp(&b.landed_cost_per_unit));
    for (i, offer) in offers.iter_mut().enumerate() {
        offer.rank = i + 1;
    }
}

/// Statistics over raw unit costs of every ranked offer, before any truncation
pub fn compute_statistics(
    offers: &[PriceOffer],
    current_cost: Option<Decimal>,
) -> Option<PriceStatistics> {
    let min_cost = offers.iter().map(|o| o.unit_cost).min()?;
    let max_cost = offers.iter().map(|o| o.unit_cost).max()?;
    let total: Decimal = offers.iter().map(|o| o.unit_cost).sum();
    let avg_cost = (total / Decimal::from(offers.len())).round_dp(4);

    let potential_savings = current_cost
        .map(|current| (current - min_cost).round_dp(4))
        .filter(|savings| *savings > Decimal::ZERO);

    Some(PriceStatistics {
        min_cost,
        max_cost,
        avg_cost,
        spread: (max_cost - min_cost).round_dp(4),
        potential_savings,
    })
}

pub fn price_age_hours(effective_date: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    let seconds = (now - effective_date).num_seconds();
    (Decimal::from(seconds) / Decimal::from(3600)).round_dp(1)
}

fn build_offer(
    price: &supplier_price::Model,
    supplier: &supplier::Model,
    landed: Decimal,
    current_cost: Option<Decimal>,
    now: DateTime<Utc>,
) -> PriceOffer {
    PriceOffer {
        rank: 0,
        supplier_id: supplier.id,
        supplier_name: supplier.name.clone(),
        supplier_code: supplier.code.clone(),
        unit_cost: price.unit_cost,
        case_cost: price.effective_case_cost(),
        case_pack: price.case_pack.max(1),
        landed_cost_per_unit: landed,
        effective_date: price.effective_date,
        price_age_hours: price_age_hours(price.effective_date, now),
        in_stock: price.in_stock,
        price_type: price.price_type,
        promo_name: price.promo_name.clone(),
        savings_vs_current: savings_vs_current(current_cost, price.unit_cost),
    }
}

/// Difference to the catalog cost; a zero difference counts as no savings.
pub fn savings_vs_current(current_cost: Option<Decimal>, unit_cost: Decimal) -> Option<Decimal> {
    current_cost
        .map(|current| (current - unit_cost).round_dp(4))
        .filter(|savings| !savings.is_zero())
}

/// Oldest `effective_date` still inside the price window.
pub fn price_cutoff(now: DateTime<Utc>, max_age_hours: i64) -> Result<DateTime<Utc>, ServiceError> {
    Duration::try_hours(max_age_hours)
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!("max_age_hours {} is out of range", max_age_hours))
        })
}

/// Runs one comparison on any connection, including an open transaction.
pub async fn compare_with<C: ConnectionTrait>(
    db: &C,
    scanned: &str,
    options: &ComparisonOptions,
) -> Result<ComparisonResult, ServiceError> {
    let now = Utc::now();

    let Some(item) = product::Entity::find()
        .filter(product::Column::Upc.eq(scanned))
        .one(db)
        .await?
    else {
        debug!(upc = scanned, "Scanned UPC is not in the catalog");
        return Ok(ComparisonResult::product_not_found(scanned, now));
    };

    let codes = upc::resolve(db, scanned).await?;
    let cutoff = price_cutoff(now, options.max_age_hours)?;

    let mut query = supplier_price::Entity::find()
        .filter(supplier_price::Column::Upc.is_in(codes))
        .filter(supplier_price::Column::EffectiveDate.gte(cutoff))
        .filter(supplier_price::Column::EffectiveDate.lte(now))
        .filter(
            Condition::any()
                .add(supplier_price::Column::ExpiresAt.is_null())
                .add(supplier_price::Column::ExpiresAt.gt(now)),
        );
    if !options.include_out_of_stock {
        query = query.filter(supplier_price::Column::InStock.eq(true));
    }

    let rows = query
        .order_by_asc(supplier_price::Column::SupplierId)
        .order_by_desc(supplier_price::Column::EffectiveDate)
        .all(db)
        .await?;
    let latest = dedupe_latest_per_supplier(rows);

    let supplier_ids: Vec<i32> = latest.iter().map(|p| p.supplier_id).collect();
    let suppliers: HashMap<i32, supplier::Model> = supplier::Entity::find()
        .filter(supplier::Column::Id.is_in(supplier_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut offers = Vec::with_capacity(latest.len());
    for price in &latest {
        let Some(supplier) = suppliers.get(&price.supplier_id).filter(|s| s.is_active) else {
            continue;
        };

        let shipping = landed_cost::latest_shipping_profile(db, supplier.id).await?;
        let landed = landed_cost::landed_cost(
            price.unit_cost,
            price.case_pack.max(1),
            shipping.as_ref(),
        );

        offers.push(build_offer(price, supplier, landed, item.current_cost, now));
    }

    rank_offers(&mut offers);
    let statistics = compute_statistics(&offers, item.current_cost);
    let suppliers_checked = offers.len();
    offers.truncate(options.limit);

    Ok(ComparisonResult {
        upc: scanned.to_string(),
        product: Some(ProductSnapshot::from(&item)),
        prices: offers,
        statistics,
        suppliers_checked,
        comparison_time: now,
        error: None,
    })
}

/// Scan entry point: compares, batches and saves supplier offers
#[derive(Clone)]
pub struct ComparisonService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    defaults: ComparisonOptions,
}

impl ComparisonService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        defaults: ComparisonOptions,
    ) -> Self {
        Self {
            db,
            event_sender,
            defaults,
        }
    }

    pub fn default_options(&self) -> ComparisonOptions {
        self.defaults
    }

    #[instrument(skip(self))]
    pub async fn compare(
        &self,
        upc: &str,
        options: ComparisonOptions,
    ) -> Result<ComparisonResult, ServiceError> {
        let started = std::time::Instant::now();
        let result = compare_with(&*self.db, upc, &options).await?;

        counter!("best_buy.comparisons", 1);
        histogram!("best_buy.comparison_duration_ms", started.elapsed().as_millis() as f64);
        debug!(
            upc,
            suppliers_checked = result.suppliers_checked,
            "Comparison finished"
        );

        Ok(result)
    }

    /// Compares every UPC independently with the default options
    #[instrument(skip(self, upcs), fields(items = upcs.len()))]
    pub async fn batch_compare(&self, upcs: &[String]) -> Result<BatchComparison, ServiceError> {
        let mut comparisons = Vec::with_capacity(upcs.len());
        for upc in upcs {
            comparisons.push(self.compare(upc, self.defaults).await?);
        }

        let summary = BatchSummary {
            items_compared: comparisons.len(),
            items_with_prices: comparisons.iter().filter(|c| !c.prices.is_empty()).count(),
            total_potential_savings: comparisons
                .iter()
                .filter_map(ComparisonResult::potential_savings)
                .sum::<Decimal>()
                .round_dp(2),
        };

        Ok(BatchComparison {
            comparisons,
            summary,
        })
    }

    #[instrument(skip(self))]
    pub async fn compare_by_product_id(
        &self,
        product_id: i32,
        options: ComparisonOptions,
    ) -> Result<ComparisonResult, ServiceError> {
        let item = product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

        self.compare(&item.upc, options).await
    }

    /// Re-runs the comparison and stores it as an immutable record
    #[instrument(skip(self, input), fields(upc = %input.upc))]
    pub async fn save_comparison(
        &self,
        input: SaveComparisonInput,
    ) -> Result<SavedComparison, ServiceError> {
        let txn = self.db.begin().await?;

        let result = compare_with(&txn, &input.upc, &self.defaults).await?;
        if let Some(error) = &result.error {
            return Err(ServiceError::NotFound(error.clone()));
        }

        let snapshot = result.product.as_ref();
        let best = result.prices.first();
        let current_cost = snapshot.and_then(|p| p.current_cost);
        let savings_per_unit = result.potential_savings();
        let savings_percent = match (savings_per_unit, current_cost) {
            (Some(savings), Some(current)) if !current.is_zero() => {
                Some((savings / current * Decimal::from(100)).round_dp(2))
            }
            _ => None,
        };

        let now = Utc::now();
        let saved = comparison::ActiveModel {
            upc: Set(input.upc.clone()),
            product_id: Set(snapshot.map(|p| p.id)),
            scanned_at: Set(result.comparison_time),
            scanned_by: Set(input.user_id.clone()),
            current_cost: Set(current_cost),
            current_vendor: Set(snapshot.and_then(|p| p.current_vendor.clone())),
            best_supplier_id: Set(best.map(|o| o.supplier_id)),
            best_unit_cost: Set(best.map(|o| o.unit_cost)),
            savings_per_unit: Set(savings_per_unit),
            savings_percent: Set(savings_percent),
            all_options: Set(serde_json::to_value(&result)?),
            action: Set(ComparisonAction::Saved),
            ordered_from_supplier_id: Set(Some(input.selected_supplier_id)),
            order_qty: Set(Some(input.quantity)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(comparison_id = saved.id, "Comparison saved");
        self.event_sender.send_or_log(Event::ComparisonSaved {
            comparison_id: saved.id,
            upc: input.upc,
            supplier_id: input.selected_supplier_id,
        });

        Ok(SavedComparison {
            id: saved.id,
            status: "saved".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn offer(supplier_id: i32, unit_cost: Decimal, landed: Decimal) -> PriceOffer {
        PriceOffer {
            rank: 0,
            supplier_id,
            supplier_name: format!("Supplier {}", supplier_id),
            supplier_code: format!("S{}", supplier_id),
            unit_cost,
            case_cost: unit_cost * dec!(12),
            case_pack: 12,
            landed_cost_per_unit: landed,
            effective_date: Utc::now(),
            price_age_hours: dec!(0),
            in_stock: true,
            price_type: PriceType::List,
            promo_name: None,
            savings_vs_current: None,
        }
    }

    fn price_row(id: i32, supplier_id: i32, hours_ago: i64) -> supplier_price::Model {
        let now = Utc::now();
        supplier_price::Model {
            id,
            upc: "012345678905".into(),
            product_id: Some(1),
            supplier_id,
            supplier_sku: None,
            unit_cost: dec!(1.00),
            case_cost: None,
            case_pack: 12,
            effective_date: now - Duration::hours(hours_ago),
            expires_at: None,
            price_type: PriceType::List,
            promo_name: None,
            source: None,
            in_stock: true,
            available_qty: None,
            created_at: now,
        }
    }

    #[test]
    fn ranking_uses_landed_cost_not_unit_cost() {
        let mut offers = vec![
            offer(1, dec!(2.00), dec!(2.50)),
            offer(2, dec!(2.10), dec!(2.10)),
        ];
        rank_offers(&mut offers);

        assert_eq!(offers[0].supplier_id, 2);
        assert_eq!(offers[0].rank, 1);
        assert_eq!(offers[1].supplier_id, 1);
        assert_eq!(offers[1].rank, 2);
    }

    #[test]
    fn ranking_ties_keep_input_order() {
        let mut offers = vec![
            offer(7, dec!(1.00), dec!(1.00)),
            offer(3, dec!(1.00), dec!(1.00)),
        ];
        rank_offers(&mut offers);
        assert_eq!(offers[0].supplier_id, 7);
        assert_eq!(offers[1].supplier_id, 3);
    }

    #[test]
    fn dedupe_keeps_newest_row_per_supplier() {
        let rows = vec![
            price_row(1, 2, 48),
            price_row(2, 1, 10),
            price_row(3, 2, 2),
            price_row(4, 1, 30),
        ];
        let latest = dedupe_latest_per_supplier(rows);

        let ids: Vec<i32> = latest.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn statistics_cover_every_offer() {
        let offers = vec![
            offer(1, dec!(2.00), dec!(2.00)),
            offer(2, dec!(2.50), dec!(2.50)),
            offer(3, dec!(3.00), dec!(3.00)),
        ];
        let stats = compute_statistics(&offers, Some(dec!(2.75))).unwrap();

        assert_eq!(stats.min_cost, dec!(2.00));
        assert_eq!(stats.max_cost, dec!(3.00));
        assert_eq!(stats.avg_cost, dec!(2.5));
        assert_eq!(stats.spread, dec!(1.00));
        assert_eq!(stats.potential_savings, Some(dec!(0.75)));
    }

    #[test]
    fn statistics_drop_non_positive_savings() {
        let offers = vec![offer(1, dec!(2.00), dec!(2.00))];
        assert_eq!(
            compute_statistics(&offers, Some(dec!(1.50))).unwrap().potential_savings,
            None
        );
        assert_eq!(
            compute_statistics(&offers, Some(dec!(2.00))).unwrap().potential_savings,
            None
        );
        assert_eq!(compute_statistics(&offers, None).unwrap().potential_savings, None);
    }

    #[test]
    fn statistics_absent_without_offers() {
        assert!(compute_statistics(&[], Some(dec!(1))).is_none());
    }

    #[test]
    fn savings_vs_current_skips_unknown_and_equal_cost() {
        assert_eq!(savings_vs_current(Some(dec!(2.00)), dec!(1.25)), Some(dec!(0.75)));
        assert_eq!(savings_vs_current(Some(dec!(1.00)), dec!(1.25)), Some(dec!(-0.25)));
        assert_eq!(savings_vs_current(Some(dec!(1.25)), dec!(1.25)), None);
        assert_eq!(savings_vs_current(None, dec!(1.25)), None);
    }

    #[test]
    fn price_cutoff_rejects_windows_past_the_calendar() {
        let now = Utc::now();
        assert_eq!(price_cutoff(now, 24).unwrap(), now - Duration::hours(24));
        assert_matches!(price_cutoff(now, 10_000_000_000), Err(ServiceError::InvalidInput(_)));
        assert_matches!(price_cutoff(now, i64::MAX), Err(ServiceError::InvalidInput(_)));
    }

    #[test]
    fn price_age_is_rounded_to_tenths_of_an_hour() {
        let now = Utc::now();
        assert_eq!(price_age_hours(now - Duration::minutes(90), now), dec!(1.5));
        assert_eq!(price_age_hours(now - Duration::hours(168), now), dec!(168));
    }

    proptest! {
        #[test]
        fn ranked_offers_are_sorted_and_numbered(costs in prop::collection::vec(0u32..100_000, 0..40)) {
            let mut offers: Vec<PriceOffer> = costs
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let landed = Decimal::new(*c as i64, 4);
                    offer(i as i32, landed, landed)
                })
                .collect();
            rank_offers(&mut offers);

            for (i, o) in offers.iter().enumerate() {
                prop_assert_eq!(o.rank, i + 1);
            }
            for pair in offers.windows(2) {
                prop_assert!(pair[0].landed_cost_per_unit <= pair[1].landed_cost_per_unit);
            }
        }

        #[test]
        fn dedupe_leaves_one_row_per_supplier(
            rows in prop::collection::vec((1i32..6, 0i64..500), 0..60)
        ) {
            let input: Vec<supplier_price::Model> = rows
                .iter()
                .enumerate()
                .map(|(i, (supplier, hours))| price_row(i as i32, *supplier, *hours))
                .collect();
            let latest = dedupe_latest_per_supplier(input.clone());

            let distinct: HashSet<i32> = input.iter().map(|r| r.supplier_id).collect();
            prop_assert_eq!(latest.len(), distinct.len());

            for kept in &latest {
                let newest = input
                    .iter()
                    .filter(|r| r.supplier_id == kept.supplier_id)
                    .map(|r| r.effective_date)
                    .max()
                    .unwrap();
                prop_assert_eq!(kept.effective_date, newest);
            }
        }
    }
}
