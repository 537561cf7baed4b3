use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Saved scan result. Written once by an explicit save and never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "best_buy_comparisons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub upc: String,
    pub product_id: Option<i32>,
    pub scanned_at: DateTime<Utc>,
    pub scanned_by: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub current_cost: Option<Decimal>,
    pub current_vendor: Option<String>,

    pub best_supplier_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub best_unit_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub savings_per_unit: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub savings_percent: Option<Decimal>,

    /// Full comparison payload as captured at save time
    #[sea_orm(column_type = "Json")]
    pub all_options: Json,

    pub action: ComparisonAction,
    pub ordered_from_supplier_id: Option<i32>,
    pub order_qty: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ComparisonAction {
    #[sea_orm(string_value = "ordered")]
    Ordered,
    #[sea_orm(string_value = "saved")]
    Saved,
    #[sea_orm(string_value = "ignored")]
    Ignored,
}
