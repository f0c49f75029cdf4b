use std::sync::Arc;

use sea_orm::sea_query::Query;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::{self, DbPool},
    entities::{customer, order, order_line, payment},
    errors::ServiceError,
    events::{Event, EventSender},
    sequence::{self, Sequence},
    validation,
};

/// Raw customer registration fields as collected by the web layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterCustomerInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Owns customer records and the cascade that removes everything a
/// customer left behind.
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new customer under a freshly allocated customer number.
    /// The email must be unused.
    #[instrument(skip(self, input))]
    pub async fn register_customer(
        &self,
        input: RegisterCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let new = validation::customer_registration(
            &input.name,
            &input.email,
            &input.phone,
            &input.address,
        )?;

        let txn = db::begin_serializable(&self.db).await?;

        let email_taken = customer::Entity::find()
            .filter(customer::Column::Email.eq(new.email.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if email_taken {
            return Err(ServiceError::conflict("customer", new.email));
        }

        let cust_no = sequence::next_id(&txn, Sequence::CustomerNumber).await?;

        let created = customer::ActiveModel {
            cust_no: Set(cust_no),
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            address: Set(new.address),
        }
        .insert(&txn)
        .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::CustomerRegistered(created.cust_no))
            .await;
        info!(cust_no = created.cust_no, "customer registered");

        Ok(created)
    }

    /// Deletes a customer and, in the same transaction, every payment,
    /// order line and order that depends on them. A missing customer is a
    /// no-op.
    #[instrument(skip(self), fields(cust_no = cust_no))]
    pub async fn delete_customer(&self, cust_no: i64) -> Result<(), ServiceError> {
        let txn = db::begin_serializable(&self.db).await?;

        let owned_orders = Query::select()
            .column(order::Column::OrderNo)
            .from(order::Entity)
            .and_where(order::Column::CustNo.eq(cust_no))
            .to_owned();

        order_line::Entity::delete_many()
            .filter(order_line::Column::OrderNo.in_subquery(owned_orders))
            .exec(&txn)
            .await?;

        payment::Entity::delete_many()
            .filter(payment::Column::CustNo.eq(cust_no))
            .exec(&txn)
            .await?;

        order::Entity::delete_many()
            .filter(order::Column::CustNo.eq(cust_no))
            .exec(&txn)
            .await?;

        customer::Entity::delete_many()
            .filter(customer::Column::CustNo.eq(cust_no))
            .exec(&txn)
            .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::CustomerDeleted(cust_no))
            .await;
        info!(cust_no = cust_no, "customer deleted");

        Ok(())
    }

    /// Fetches one customer by number.
    #[instrument(skip(self), fields(cust_no = cust_no))]
    pub async fn customer_info(&self, cust_no: i64) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(cust_no)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", cust_no.to_string()))
    }

    /// Lists all customers, customer number ascending.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        Ok(customer::Entity::find()
            .order_by_asc(customer::Column::CustNo)
            .all(&*self.db)
            .await?)
    }
}
