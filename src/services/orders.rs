use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::{self, DbPool},
    entities::order::OrderStatus,
    entities::{customer, order, order_line, payment, product},
    errors::ServiceError,
    events::{Event, EventSender},
    sequence::{self, Sequence},
    validation,
};

/// Raw order placement fields: the order header plus its mandatory first
/// line.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlaceOrderInput {
    pub cust_no: String,
    pub date: String,
    pub sku: String,
    pub qty: String,
}

/// Raw fields for adding a product to an existing order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AddLineInput {
    pub sku: String,
    pub qty: String,
}

/// Raw fields for paying an order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PayOrderInput {
    pub payment_method: String,
    pub cust_no: String,
}

/// An order's line joined with the product it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineView {
    pub sku: String,
    pub qty: i32,
    pub product_name: String,
}

/// Read model for one order: header, derived status, lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order: order::Model,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineView>,
}

/// Aggregates over an order's lines, computed by the store on read. Totals
/// are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total_products: i64,
    pub total_qty: i64,
    pub total_price: Decimal,
}

#[derive(FromQueryResult)]
struct TotalsRow {
    total_products: i64,
    total_qty: Option<i64>,
    total_price: Option<Decimal>,
}

/// Owns orders, their line items and payments, and the Open → Paid state
/// machine.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Derives the order's lifecycle state from the presence of a payment
    /// row. Called once per unit of work; the result is trusted for the
    /// rest of that transaction.
    async fn status<C: ConnectionTrait>(conn: &C, order_no: i64) -> Result<OrderStatus, DbErr> {
        let paid = payment::Entity::find_by_id(order_no)
            .one(conn)
            .await?
            .is_some();
        Ok(if paid {
            OrderStatus::Paid
        } else {
            OrderStatus::Open
        })
    }

    /// Places a new order for an existing customer with its first line.
    #[instrument(skip(self, input), fields(cust_no = %input.cust_no, sku = %input.sku))]
    pub async fn place_order(&self, input: PlaceOrderInput) -> Result<order::Model, ServiceError> {
        let new = validation::order_placement(&input.cust_no, &input.date, &input.sku, &input.qty)?;

        let txn = db::begin_serializable(&self.db).await?;

        if customer::Entity::find_by_id(new.cust_no)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("customer", new.cust_no.to_string()));
        }

        if product::Entity::find_by_id(new.sku.as_str())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("product", new.sku));
        }

        let order_no = sequence::next_id(&txn, Sequence::OrderNumber).await?;

        let placed = order::ActiveModel {
            order_no: Set(order_no),
            cust_no: Set(new.cust_no),
            date: Set(new.date),
        }
        .insert(&txn)
        .await?;

        order_line::ActiveModel {
            order_no: Set(order_no),
            sku: Set(new.sku),
            qty: Set(new.qty),
        }
        .insert(&txn)
        .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced(placed.order_no))
            .await;
        info!(order_no = placed.order_no, "order placed");

        Ok(placed)
    }

    /// Adds a product to an open order. Quantities for a product already in
    /// the order accumulate on its existing line; a paid order rejects any
    /// change to its lines.
    #[instrument(skip(self, input), fields(order_no = order_no, sku = %input.sku))]
    pub async fn add_product_to_order(
        &self,
        order_no: i64,
        input: AddLineInput,
    ) -> Result<order_line::Model, ServiceError> {
        let txn = db::begin_serializable(&self.db).await?;

        let order = order::Entity::find_by_id(order_no)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_no.to_string()))?;

        if Self::status(&txn, order.order_no).await? == OrderStatus::Paid {
            return Err(ServiceError::business_rule(
                "cannot add products to an order that is already paid",
            ));
        }

        let item = validation::order_line(&input.sku, &input.qty)?;

        if product::Entity::find_by_id(item.sku.as_str())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("product", item.sku));
        }

        let existing = order_line::Entity::find_by_id((order_no, item.sku.clone()))
            .one(&txn)
            .await?;

        let line = match existing {
            Some(line) => {
                let qty = line.qty + item.qty;
                let mut active: order_line::ActiveModel = line.into();
                active.qty = Set(qty);
                active.update(&txn).await?
            }
            None => {
                order_line::ActiveModel {
                    order_no: Set(order_no),
                    sku: Set(item.sku),
                    qty: Set(item.qty),
                }
                .insert(&txn)
                .await?
            }
        };

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::OrderLineAdded {
                order_no,
                sku: line.sku.clone(),
            })
            .await;
        info!(order_no = order_no, sku = %line.sku, qty = line.qty, "product added to order");

        Ok(line)
    }

    /// Pays an open order. Only the customer who placed the order may pay
    /// it, with one of the accepted methods, exactly once.
    #[instrument(skip(self, input), fields(order_no = order_no))]
    pub async fn pay_order(
        &self,
        order_no: i64,
        input: PayOrderInput,
    ) -> Result<payment::Model, ServiceError> {
        let txn = db::begin_serializable(&self.db).await?;

        let order = order::Entity::find_by_id(order_no)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_no.to_string()))?;

        if Self::status(&txn, order.order_no).await? == OrderStatus::Paid {
            return Err(ServiceError::business_rule("order is already paid"));
        }

        let attempt = validation::payment(&input.payment_method, &input.cust_no)?;

        if attempt.payer != order.cust_no {
            return Err(ServiceError::business_rule(
                "an order must be paid by the client who placed it",
            ));
        }

        let paid = payment::ActiveModel {
            order_no: Set(order_no),
            cust_no: Set(attempt.payer),
        }
        .insert(&txn)
        .await?;

        db::commit(txn).await?;

        self.event_sender
            .send_or_log(Event::OrderPaid(order_no))
            .await;
        info!(order_no = order_no, cust_no = paid.cust_no, method = %attempt.method, "order paid");

        Ok(paid)
    }

    /// Fetches one order with its derived status and its lines joined with
    /// product names, SKU ascending.
    #[instrument(skip(self), fields(order_no = order_no))]
    pub async fn order_info(&self, order_no: i64) -> Result<OrderInfo, ServiceError> {
        let db = &*self.db;

        let order = order::Entity::find_by_id(order_no)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_no.to_string()))?;

        let status = Self::status(db, order_no).await?;

        let rows = order_line::Entity::find()
            .filter(order_line::Column::OrderNo.eq(order_no))
            .find_also_related(product::Entity)
            .order_by_asc(order_line::Column::Sku)
            .all(db)
            .await?;

        let lines = rows
            .into_iter()
            .map(|(line, product)| OrderLineView {
                sku: line.sku,
                qty: line.qty,
                product_name: product.map(|p| p.name).unwrap_or_default(),
            })
            .collect();

        Ok(OrderInfo {
            order,
            status,
            lines,
        })
    }

    /// Computes the order's display totals (line count, unit count,
    /// SUM(qty * price)) on read.
    #[instrument(skip(self), fields(order_no = order_no))]
    pub async fn order_totals(&self, order_no: i64) -> Result<OrderTotals, ServiceError> {
        let db = &*self.db;

        if order::Entity::find_by_id(order_no).one(db).await?.is_none() {
            return Err(ServiceError::not_found("order", order_no.to_string()));
        }

        let row = order_line::Entity::find()
            .select_only()
            .column_as(order_line::Column::Sku.count(), "total_products")
            .column_as(order_line::Column::Qty.sum(), "total_qty")
            .column_as(
                SimpleExpr::from(Func::sum(
                    Expr::col((order_line::Entity, order_line::Column::Qty))
                        .mul(Expr::col((product::Entity, product::Column::Price))),
                )),
                "total_price",
            )
            .join(JoinType::InnerJoin, order_line::Relation::Product.def())
            .filter(order_line::Column::OrderNo.eq(order_no))
            .into_model::<TotalsRow>()
            .one(db)
            .await?;

        let row = row.unwrap_or(TotalsRow {
            total_products: 0,
            total_qty: None,
            total_price: None,
        });

        Ok(OrderTotals {
            total_products: row.total_products,
            total_qty: row.total_qty.unwrap_or(0),
            total_price: row.total_price.unwrap_or(Decimal::ZERO),
        })
    }

    /// Lists all orders, order number ascending.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<order::Model>, ServiceError> {
        Ok(order::Entity::find()
            .order_by_asc(order::Column::OrderNo)
            .all(&*self.db)
            .await?)
    }
}
