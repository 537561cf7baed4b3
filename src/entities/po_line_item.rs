use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One ordered UPC on a purchase order. Quantities are in cases.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PoLineItem)]
#[sea_orm(table_name = "po_line_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub po_id: i32,
    pub upc: String,
    pub product_id: Option<i32>,
    pub product_name: Option<String>,
    pub supplier_sku: Option<String>,

    pub qty_ordered: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 4)))")]
    pub unit_cost: Decimal,
    pub case_pack: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub line_total: Decimal,

    pub qty_received: i32,
    /// Always `qty_ordered - qty_received`; negative when over-received
    pub qty_pending: i32,
    pub status: LineItemStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_order::Entity",
        from = "Column::PoId",
        to = "super::purchase_order::Column::Id",
        on_delete = "Cascade"
    )]
    PurchaseOrder,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
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
pub enum LineItemStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "over")]
    Over,
    #[sea_orm(string_value = "short")]
    Short,
}
