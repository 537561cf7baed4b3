use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One price observation for a UPC from a supplier.
///
/// Rows are append-only: a new price is a new row. For a given (UPC, supplier) the
/// observation with the latest `effective_date` that is neither expired nor in the
/// future is the current price.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = SupplierPrice)]
#[sea_orm(table_name = "supplier_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub upc: String,
    pub product_id: Option<i32>,
    pub supplier_id: i32,
    pub supplier_sku: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub unit_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub case_cost: Option<Decimal>,
    pub case_pack: i32,

    pub effective_date: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,

    pub price_type: PriceType,
    pub promo_name: Option<String>,
    pub source: Option<String>,

    pub in_stock: bool,
    pub available_qty: Option<i32>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored case cost, or unit cost times case pack when the feed omitted it
    pub fn effective_case_cost(&self) -> Decimal {
        self.case_cost
            .unwrap_or_else(|| self.unit_cost * Decimal::from(self.case_pack.max(1)))
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PriceType {
    #[default]
    #[sea_orm(string_value = "list")]
    List,
    #[sea_orm(string_value = "promo")]
    Promo,
    #[sea_orm(string_value = "contract")]
    Contract,
}
