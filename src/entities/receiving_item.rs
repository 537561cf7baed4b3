use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ReceivingItem)]
#[sea_orm(table_name = "receiving_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub session_id: i32,
    pub po_line_id: Option<i32>,
    pub upc: String,
    pub product_name: Option<String>,

    pub qty_received: i32,
    /// Only known when the scan matched a purchase order line
    pub qty_expected: Option<i32>,
    pub qty_damaged: i32,
    pub qty_good: i32,

    pub discrepancy_type: DiscrepancyType,
    pub discrepancy_qty: i32,
    pub discrepancy_notes: Option<String>,

    pub scanned_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receiving_session::Entity",
        from = "Column::SessionId",
        to = "super::receiving_session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::po_line_item::Entity",
        from = "Column::PoLineId",
        to = "super::po_line_item::Column::Id"
    )]
    LineItem,
}

impl Related<super::receiving_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::po_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItem.def()
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiscrepancyType {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "short")]
    Short,
    #[sea_orm(string_value = "over")]
    Over,
    #[sea_orm(string_value = "damaged")]
    Damaged,
    #[sea_orm(string_value = "wrong_item")]
    WrongItem,
}
