use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::{self, DbPool},
    entities::{delivery, order_line, product, supplier},
    errors::ServiceError,
    events::{Event, EventSender},
    validation,
};

/// Raw product registration fields as collected by the web layer; empty
/// strings mean the field was left blank.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterProductInput {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub ean: String,
}

/// Raw product update fields; at least one must be supplied.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProductInput {
    pub price: String,
    pub description: String,
}

/// Raw supplier registration fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterSupplierInput {
    pub tin: String,
    pub name: String,
    pub address: String,
    pub sku: String,
    pub date: String,
}

/// Owns products and suppliers and their cross-references.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new product. The SKU and any non-zero EAN must both be
    /// unused.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn register_product(
        &self,
        input: RegisterProductInput,
    ) -> Result<product::Model, ServiceError> {
        let new = validation::product_registration(
            &input.sku,
            &input.name,
            &input.description,
            &input.price,
            &input.ean,
        )?;

        let txn = db::begin_serializable(&self.db).await?;

        if product::Entity::find_by_id(new.sku.as_str())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict("product", new.sku));
        }

        if let Some(ean) = new.ean {
            let ean_taken = product::Entity::find()
                .filter(product::Column::Ean.eq(ean))
                .one(&txn)
                .await?
                .is_some();
            if ean_taken {
                return Err(ServiceError::conflict("product", ean.to_string()));
            }
        }

        let created = product::ActiveModel {
            sku: Set(new.sku),
            name: Set(new.name),
            description: Set(new.description),
            price: Set(new.price),
            ean: Set(new.ean),
        }
        .insert(&txn)
        .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::ProductRegistered {
                sku: created.sku.clone(),
            })
            .await;
        info!(sku = %created.sku, "product registered");

        Ok(created)
    }

    /// Updates a product's price and/or description, leaving the rest
    /// untouched.
    #[instrument(skip(self, input), fields(sku = %sku))]
    pub async fn update_product(
        &self,
        sku: &str,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let changes = validation::product_update(&input.price, &input.description)?;

        let txn = db::begin_serializable(&self.db).await?;

        let existing = product::Entity::find_by_id(sku)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", sku))?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }

        let updated = active.update(&txn).await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated {
                sku: updated.sku.clone(),
            })
            .await;
        info!(sku = %updated.sku, "product updated");

        Ok(updated)
    }

    /// Deletes a product: suppliers referencing it lose the reference,
    /// order lines carrying it disappear, then the product row goes. A
    /// missing SKU is a no-op, not an error.
    #[instrument(skip(self), fields(sku = %sku))]
    pub async fn delete_product(&self, sku: &str) -> Result<(), ServiceError> {
        let txn = db::begin_serializable(&self.db).await?;

        supplier::Entity::update_many()
            .col_expr(supplier::Column::Sku, Expr::value(Option::<String>::None))
            .filter(supplier::Column::Sku.eq(sku))
            .exec(&txn)
            .await?;

        order_line::Entity::delete_many()
            .filter(order_line::Column::Sku.eq(sku))
            .exec(&txn)
            .await?;

        product::Entity::delete_many()
            .filter(product::Column::Sku.eq(sku))
            .exec(&txn)
            .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted {
                sku: sku.to_owned(),
            })
            .await;
        info!(sku = %sku, "product deleted");

        Ok(())
    }

    /// Fetches one product by SKU.
    #[instrument(skip(self), fields(sku = %sku))]
    pub async fn get_product(&self, sku: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(sku)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", sku))
    }

    /// Lists all products, SKU ascending.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .order_by_asc(product::Column::Sku)
            .all(&*self.db)
            .await?)
    }

    /// Registers a new supplier. The TIN must be unused and the referenced
    /// SKU must name an existing product.
    #[instrument(skip(self, input), fields(tin = %input.tin))]
    pub async fn register_supplier(
        &self,
        input: RegisterSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let new = validation::supplier_registration(
            &input.tin,
            &input.name,
            &input.address,
            &input.sku,
            &input.date,
        )?;

        let txn = db::begin_serializable(&self.db).await?;

        if supplier::Entity::find_by_id(new.tin.as_str())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict("supplier", new.tin));
        }

        if product::Entity::find_by_id(new.sku.as_str())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("product", new.sku));
        }

        let created = supplier::ActiveModel {
            tin: Set(new.tin),
            name: Set(new.name),
            address: Set(new.address),
            sku: Set(Some(new.sku)),
            date: Set(new.date),
        }
        .insert(&txn)
        .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::SupplierRegistered {
                tin: created.tin.clone(),
            })
            .await;
        info!(tin = %created.tin, "supplier registered");

        Ok(created)
    }

    /// Deletes a supplier together with its delivery records. A missing TIN
    /// is a no-op.
    #[instrument(skip(self), fields(tin = %tin))]
    pub async fn delete_supplier(&self, tin: &str) -> Result<(), ServiceError> {
        let txn = db::begin_serializable(&self.db).await?;

        delivery::Entity::delete_many()
            .filter(delivery::Column::Tin.eq(tin))
            .exec(&txn)
            .await?;

        supplier::Entity::delete_many()
            .filter(supplier::Column::Tin.eq(tin))
            .exec(&txn)
            .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::SupplierDeleted {
                tin: tin.to_owned(),
            })
            .await;
        info!(tin = %tin, "supplier deleted");

        Ok(())
    }

    /// Fetches one supplier by TIN.
    #[instrument(skip(self), fields(tin = %tin))]
    pub async fn supplier_info(&self, tin: &str) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(tin)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("supplier", tin))
    }

    /// Lists all suppliers, TIN ascending.
    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .order_by_asc(supplier::Column::Tin)
            .all(&*self.db)
            .await?)
    }
}
