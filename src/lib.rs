//! mercantile-core
//!
//! Transactional core for a small trading business: catalog, suppliers,
//! customers, and orders over a relational store. The crate exposes one
//! async operation per business action; HTTP routing and rendering belong
//! to the embedding layer.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod sequence;
pub mod services;
pub mod validation;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = services::AppServices::build(db.clone(), Arc::new(event_sender.clone()));
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }

    pub fn catalog_service(&self) -> Arc<services::CatalogService> {
        self.services.catalog.clone()
    }

    pub fn customer_service(&self) -> Arc<services::CustomerService> {
        self.services.customers.clone()
    }

    pub fn order_service(&self) -> Arc<services::OrderService> {
        self.services.orders.clone()
    }
}
