pub mod cart;
pub mod common;
pub mod orders;
pub mod products;
pub mod receiving;
pub mod scan;
pub mod suppliers;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{
    cart::CartService, catalog::ProductService, comparison::ComparisonOptions,
    comparison::ComparisonService, prices::PriceService, purchase_orders::PurchaseOrderService,
    receiving::ReceivingService, suppliers::SupplierService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub comparison: Arc<ComparisonService>,
    pub products: Arc<ProductService>,
    pub suppliers: Arc<SupplierService>,
    pub prices: Arc<PriceService>,
    pub cart: Arc<CartService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub receiving: Arc<ReceivingService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        let comparison_defaults = ComparisonOptions {
            max_age_hours: config.price_max_age_hours,
            include_out_of_stock: false,
            limit: config.comparison_limit as usize,
        };

        Self {
            comparison: Arc::new(ComparisonService::new(
                db.clone(),
                event_sender.clone(),
                comparison_defaults,
            )),
            products: Arc::new(ProductService::new(db.clone())),
            suppliers: Arc::new(SupplierService::new(db.clone())),
            prices: Arc::new(PriceService::new(db.clone(), event_sender.clone())),
            cart: Arc::new(CartService::new(db.clone(), event_sender.clone())),
            purchase_orders: Arc::new(PurchaseOrderService::new(
                db.clone(),
                event_sender.clone(),
                config.order_list_limit,
            )),
            receiving: Arc::new(ReceivingService::new(
                db,
                event_sender,
                config.order_list_limit,
            )),
        }
    }
}
