//! Key allocation for auto-numbered entities.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QuerySelect};

use crate::entities::{customer, order};

/// Entities whose keys are handed out as one greater than the current
/// maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    CustomerNumber,
    OrderNumber,
}

#[derive(FromQueryResult)]
struct MaxKey {
    max_key: Option<i64>,
}

/// Returns the next key for `sequence`: MAX(key) + 1, or 1 when no rows
/// exist yet.
///
/// The read must run on the same transaction as the insert that consumes
/// the key. Allocation is only race-free because that transaction is the
/// serializable one `db::serializable` opens: two concurrent allocations
/// conflict at commit and one of them retries with a fresh maximum.
pub async fn next_id<C: ConnectionTrait>(conn: &C, sequence: Sequence) -> Result<i64, DbErr> {
    let query = match sequence {
        Sequence::CustomerNumber => customer::Entity::find()
            .select_only()
            .column_as(customer::Column::CustNo.max(), "max_key")
            .into_model::<MaxKey>(),
        Sequence::OrderNumber => order::Entity::find()
            .select_only()
            .column_as(order::Column::OrderNo.max(), "max_key")
            .into_model::<MaxKey>(),
    };

    let row = query.one(conn).await?;
    Ok(row.and_then(|r| r.max_key).unwrap_or(0) + 1)
}
