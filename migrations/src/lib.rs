pub use sea_orm_migration::prelude::*;

mod m20240315_000001_create_product_table;
mod m20240315_000002_create_supplier_tables;
mod m20240315_000003_create_customer_table;
mod m20240315_000004_create_order_tables;
mod m20240315_000005_add_reference_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240315_000001_create_product_table::Migration),
            Box::new(m20240315_000002_create_supplier_tables::Migration),
            Box::new(m20240315_000003_create_customer_table::Migration),
            Box::new(m20240315_000004_create_order_tables::Migration),
            Box::new(m20240315_000005_add_reference_indexes::Migration),
        ]
    }
}
