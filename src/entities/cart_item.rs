use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staged line waiting to become part of a purchase order. One row per (upc, supplier).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = CartItem)]
#[sea_orm(table_name = "order_cart_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub upc: String,
    pub product_name: Option<String>,
    pub supplier_id: i32,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub unit_cost: Decimal,
    pub case_pack: i32,
    pub added_at: DateTime<Utc>,
    pub added_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
