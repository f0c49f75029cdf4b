pub mod catalog;
pub mod customers;
pub mod orders;

use std::sync::Arc;

pub use catalog::CatalogService;
pub use customers::CustomerService;
pub use orders::OrderService;

use crate::db::DbPool;
use crate::events::EventSender;

/// Service registry wired once and shared by the embedding layer.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn build(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(db.clone(), event_sender.clone())),
            customers: Arc::new(CustomerService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db, event_sender)),
        }
    }
}
