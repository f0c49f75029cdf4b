use sea_orm_migration::prelude::*;

use crate::m20240315_000002_create_supplier_tables::Supplier;
use crate::m20240315_000004_create_order_tables::{Contains, Orders, Pay};

#[derive(DeriveMigrationName)]
pub struct Migration;

// Indexes on the reference columns the cascading deletes and the order
// total aggregate filter on.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_cust_no")
                    .table(Orders::Table)
                    .col(Orders::CustNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contains_sku")
                    .table(Contains::Table)
                    .col(Contains::Sku)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pay_cust_no")
                    .table(Pay::Table)
                    .col(Pay::CustNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_supplier_sku")
                    .table(Supplier::Table)
                    .col(Supplier::Sku)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_supplier_sku").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_pay_cust_no").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contains_sku").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_cust_no").to_owned())
            .await
    }
}
