//! Database entities for the procurement schema.

pub mod cart_item;
pub mod comparison;
pub mod po_line_item;
pub mod product;
pub mod purchase_order;
pub mod receiving_item;
pub mod receiving_session;
pub mod supplier;
pub mod supplier_price;
pub mod supplier_shipping;
pub mod upc_alias;
