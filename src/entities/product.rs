use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog item, keyed by UPC. Seeded from the store pricebook and never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Product)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub upc: String,
    pub name: String,
    pub department: Option<String>,

    /// Current sourcing
    pub current_vendor: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub current_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub retail_price: Option<Decimal>,
    pub pack_size: i32,

    /// Inventory
    pub on_hand: i32,
    pub reorder_point: Option<i32>,
    pub reorder_qty: Option<i32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::supplier_price::Entity")]
    SupplierPrices,
}

impl Related<super::supplier_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplierPrices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
