use std::sync::Arc;

use mercantile_core::{
    config::AppConfig,
    db,
    entities::{customer, order, product},
    events::{Event, EventSender},
    logging,
    services::{
        catalog::RegisterProductInput, customers::RegisterCustomerInput, orders::PlaceOrderInput,
    },
    AppState,
};
use tokio::sync::mpsc;

/// Helper harness for spinning up an application state backed by a private
/// in-memory SQLite database.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        logging::try_init("warn");

        let mut cfg = AppConfig::new("sqlite::memory:", "test");
        cfg.auto_migrate = true;
        // A single connection keeps the in-memory database alive for the
        // whole test and private to it.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let (tx, mut rx) = mpsc::channel::<Event>(64);
        let event_task = tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let state = AppState::new(Arc::new(pool), cfg, EventSender::new(tx));

        Self {
            state,
            _event_task: event_task,
        }
    }

    /// Registers a product through the catalog service.
    #[allow(dead_code)]
    pub async fn seed_product(&self, sku: &str, price: &str) -> product::Model {
        self.state
            .catalog_service()
            .register_product(RegisterProductInput {
                sku: sku.to_owned(),
                name: format!("Product {sku}"),
                description: String::new(),
                price: price.to_owned(),
                ean: String::new(),
            })
            .await
            .expect("failed to seed product")
    }

    /// Registers a customer through the registry.
    #[allow(dead_code)]
    pub async fn seed_customer(&self, name: &str, email: &str) -> customer::Model {
        self.state
            .customer_service()
            .register_customer(RegisterCustomerInput {
                name: name.to_owned(),
                email: email.to_owned(),
                phone: String::new(),
                address: String::new(),
            })
            .await
            .expect("failed to seed customer")
    }

    /// Places an order with one line through the order engine.
    #[allow(dead_code)]
    pub async fn seed_order(&self, cust_no: i64, sku: &str, qty: &str) -> order::Model {
        self.state
            .order_service()
            .place_order(PlaceOrderInput {
                cust_no: cust_no.to_string(),
                date: "2024-03-15".to_owned(),
                sku: sku.to_owned(),
                qty: qty.to_owned(),
            })
            .await
            .expect("failed to seed order")
    }
}
