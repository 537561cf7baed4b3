pub mod cart;
pub mod catalog;
pub mod comparison;
pub mod landed_cost;
pub mod prices;
pub mod purchase_orders;
pub mod receiving;
pub mod suppliers;
pub mod upc;
