use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter as StrumEnumIter, EnumString};

/// Payment row for an order. Its presence is what makes an order Paid; the
/// key being the order number is what makes a second payment impossible.
/// The payer must be the customer who placed the order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pay")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_no: i64,
    pub cust_no: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderNo",
        to = "super::order::Column::OrderNo"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustNo",
        to = "super::customer::Column::CustNo"
    )]
    Customer,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Accepted payment methods. Validated at pay time; the store keeps only
/// who paid which order, matching the `pay` schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, StrumEnumIter,
)]
pub enum PaymentMethod {
    #[strum(serialize = "MBWay")]
    MbWay,
    Multibanco,
    Paypal,
    Visa,
}

/// Spelling the web layer submits, in display order.
pub const METHOD_NAMES: &[&str] = &["MBWay", "Multibanco", "Paypal", "Visa"];

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_accepted_name_parses() {
        for name in METHOD_NAMES {
            assert!(
                PaymentMethod::from_str(name).is_ok(),
                "{name} should be a valid payment method"
            );
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for method in PaymentMethod::iter() {
            let parsed = PaymentMethod::from_str(&method.to_string()).unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(PaymentMethod::from_str("Cheque").is_err());
        assert!(PaymentMethod::from_str("mbway").is_err());
    }
}
