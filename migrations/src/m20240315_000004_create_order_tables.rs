use sea_orm_migration::prelude::*;

use crate::m20240315_000001_create_product_table::Product;
use crate::m20240315_000003_create_customer_table::Customer;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::OrderNo)
                            .big_integer()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::CustNo).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Date).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer")
                            .from(Orders::Table, Orders::CustNo)
                            .to(Customer::Table, Customer::CustNo),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contains::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contains::OrderNo).big_integer().not_null())
                    .col(ColumnDef::new(Contains::Sku).string_len(25).not_null())
                    .col(ColumnDef::new(Contains::Qty).integer().not_null())
                    .primary_key(Index::create().col(Contains::OrderNo).col(Contains::Sku))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contains_orders")
                            .from(Contains::Table, Contains::OrderNo)
                            .to(Orders::Table, Orders::OrderNo),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contains_product")
                            .from(Contains::Table, Contains::Sku)
                            .to(Product::Table, Product::Sku),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pay::Table)
                    .if_not_exists()
                    // One payment per order, hence the order number is the key.
                    .col(
                        ColumnDef::new(Pay::OrderNo)
                            .big_integer()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pay::CustNo).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pay_orders")
                            .from(Pay::Table, Pay::OrderNo)
                            .to(Orders::Table, Orders::OrderNo),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pay_customer")
                            .from(Pay::Table, Pay::CustNo)
                            .to(Customer::Table, Customer::CustNo),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pay::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    OrderNo,
    CustNo,
    Date,
}

#[derive(DeriveIden)]
pub enum Contains {
    Table,
    OrderNo,
    Sku,
    Qty,
}

#[derive(DeriveIden)]
pub enum Pay {
    Table,
    OrderNo,
    CustNo,
}
