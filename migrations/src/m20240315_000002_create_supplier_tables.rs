use sea_orm_migration::prelude::*;

use crate::m20240315_000001_create_product_table::Product;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Supplier::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Supplier::Tin)
                            .string_len(20)
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Supplier::Name).string_len(200).null())
                    .col(ColumnDef::new(Supplier::Address).string_len(255).null())
                    // Nullable: deleting a product clears the reference.
                    .col(ColumnDef::new(Supplier::Sku).string_len(25).null())
                    .col(ColumnDef::new(Supplier::Date).date().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_product")
                            .from(Supplier::Table, Supplier::Sku)
                            .to(Product::Table, Product::Sku),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Delivery::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Delivery::Address).string_len(255).not_null())
                    .col(ColumnDef::new(Delivery::Tin).string_len(20).not_null())
                    .primary_key(
                        Index::create()
                            .col(Delivery::Address)
                            .col(Delivery::Tin),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_delivery_supplier")
                            .from(Delivery::Table, Delivery::Tin)
                            .to(Supplier::Table, Supplier::Tin),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Delivery::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Supplier::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Supplier {
    Table,
    Tin,
    Name,
    Address,
    Sku,
    Date,
}

#[derive(DeriveIden)]
pub enum Delivery {
    Table,
    Address,
    Tin,
}
