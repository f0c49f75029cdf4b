//! Per-entity validation schemas.
//!
//! Each operation has one stateless function taking the raw field values the
//! web layer collected and returning either a normalized value set or the
//! first violated constraint. Constraints are declared per field as an
//! ordered list and evaluated in a fixed order, so a submission surfaces
//! exactly one error no matter how many fields are wrong.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::entities::payment::{PaymentMethod, METHOD_NAMES};

/// First constraint violated by a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Syntactic constraint on a single raw field value.
#[derive(Debug, Clone, Copy)]
enum Constraint {
    Required,
    MaxLen(usize),
    /// Letters, with spaces allowed between words.
    Alphabetic,
    /// Decimal digits only.
    Digits,
    /// Digits plus `.` or `,` as a decimal separator.
    Amount,
    /// At most this many significant digits.
    MaxDigits(usize),
    PositiveInt,
    OneOf(&'static [&'static str]),
    Date,
}

/// A field paired with its ordered constraint list. An empty raw value is
/// "absent": it violates `Required` and satisfies everything else.
struct Field<'a> {
    name: &'static str,
    value: &'a str,
    constraints: &'static [Constraint],
}

impl<'a> Field<'a> {
    fn new(name: &'static str, value: &'a str, constraints: &'static [Constraint]) -> Self {
        Self {
            name,
            value,
            constraints,
        }
    }
}

fn evaluate(fields: &[Field<'_>]) -> Result<(), ValidationError> {
    for field in fields {
        check_field(field)?;
    }
    Ok(())
}

fn check_field(field: &Field<'_>) -> Result<(), ValidationError> {
    if field.value.is_empty() {
        for constraint in field.constraints {
            if matches!(constraint, Constraint::Required) {
                return Err(ValidationError::new(field.name, "is required"));
            }
        }
        return Ok(());
    }

    for constraint in field.constraints {
        check_constraint(field.name, field.value, constraint)?;
    }
    Ok(())
}

fn check_constraint(
    name: &'static str,
    value: &str,
    constraint: &Constraint,
) -> Result<(), ValidationError> {
    match constraint {
        Constraint::Required => Ok(()),
        Constraint::MaxLen(max) => {
            if value.chars().count() > *max {
                Err(ValidationError::new(
                    name,
                    format!("must be at most {max} characters long"),
                ))
            } else {
                Ok(())
            }
        }
        Constraint::Alphabetic => {
            let word_chars = value.chars().all(|c| c.is_alphabetic() || c == ' ');
            if word_chars && value.trim() == value {
                Ok(())
            } else {
                Err(ValidationError::new(name, "must be alphabetic"))
            }
        }
        Constraint::Digits => {
            if value.chars().all(|c| c.is_ascii_digit()) {
                Ok(())
            } else {
                Err(ValidationError::new(name, "must be numeric"))
            }
        }
        Constraint::Amount => {
            if value.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
                Ok(())
            } else {
                Err(ValidationError::new(name, "is not a valid amount"))
            }
        }
        Constraint::MaxDigits(max) => {
            if value.chars().filter(char::is_ascii_digit).count() > *max {
                Err(ValidationError::new(
                    name,
                    format!("must have at most {max} digits"),
                ))
            } else {
                Ok(())
            }
        }
        Constraint::PositiveInt => {
            let parsed = value
                .chars()
                .all(|c| c.is_ascii_digit())
                .then(|| value.parse::<i64>().ok())
                .flatten();
            match parsed {
                Some(n) if n > 0 => Ok(()),
                _ => Err(ValidationError::new(name, "must be a positive integer")),
            }
        }
        Constraint::OneOf(accepted) => {
            if accepted.contains(&value) {
                Ok(())
            } else {
                Err(ValidationError::new(
                    name,
                    format!("must be one of {}", accepted.join(", ")),
                ))
            }
        }
        Constraint::Date => {
            if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
                Ok(())
            } else {
                Err(ValidationError::new(name, "is not a valid date"))
            }
        }
    }
}

fn parse_price(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let price = Decimal::from_str(&raw.replace(',', "."))
        .map_err(|_| ValidationError::new(field, "is not a valid amount"))?;
    if price <= Decimal::ZERO {
        return Err(ValidationError::new(field, "must be positive"));
    }
    Ok(price)
}

fn parse_date(raw: &str) -> NaiveDate {
    // Only called after the Date constraint held.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_default()
}

fn optional(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_owned())
    }
}

/// Normalized product registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub ean: Option<i64>,
}

pub fn product_registration(
    sku: &str,
    name: &str,
    description: &str,
    price: &str,
    ean: &str,
) -> Result<NewProduct, ValidationError> {
    evaluate(&[
        Field::new(
            "sku",
            sku,
            &[Constraint::Required, Constraint::MaxLen(25)],
        ),
        Field::new(
            "name",
            name,
            &[Constraint::Required, Constraint::MaxLen(200)],
        ),
        Field::new(
            "price",
            price,
            &[
                Constraint::Required,
                Constraint::Amount,
                Constraint::MaxDigits(10),
            ],
        ),
        Field::new("ean", ean, &[Constraint::Digits, Constraint::MaxLen(13)]),
    ])?;

    Ok(NewProduct {
        sku: sku.to_owned(),
        name: name.to_owned(),
        description: optional(description),
        price: parse_price("price", price)?,
        ean: parse_ean(ean),
    })
}

// "" and "0" both mean "no barcode".
fn parse_ean(raw: &str) -> Option<i64> {
    match raw.parse::<i64>() {
        Ok(0) | Err(_) => None,
        Ok(ean) => Some(ean),
    }
}

/// Normalized product update; only supplied fields change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

pub fn product_update(price: &str, description: &str) -> Result<ProductChanges, ValidationError> {
    evaluate(&[Field::new(
        "price",
        price,
        &[Constraint::Amount, Constraint::MaxDigits(10)],
    )])?;

    if price.is_empty() && description.is_empty() {
        return Err(ValidationError::new(
            "price",
            "or description is required to update a product",
        ));
    }

    let price = if price.is_empty() {
        None
    } else {
        Some(parse_price("price", price)?)
    };

    Ok(ProductChanges {
        price,
        description: optional(description),
    })
}

/// Normalized supplier registration. The SKU must be supplied here even
/// though the stored reference is nullable; only a later product deletion
/// clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupplier {
    pub tin: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub sku: String,
    pub date: Option<NaiveDate>,
}

pub fn supplier_registration(
    tin: &str,
    name: &str,
    address: &str,
    sku: &str,
    date: &str,
) -> Result<NewSupplier, ValidationError> {
    evaluate(&[
        Field::new(
            "tin",
            tin,
            &[Constraint::Required, Constraint::MaxLen(20)],
        ),
        Field::new("name", name, &[Constraint::MaxLen(200)]),
        Field::new("address", address, &[Constraint::MaxLen(255)]),
        Field::new(
            "sku",
            sku,
            &[Constraint::Required, Constraint::MaxLen(25)],
        ),
        Field::new("date", date, &[Constraint::Date]),
    ])?;

    Ok(NewSupplier {
        tin: tin.to_owned(),
        name: optional(name),
        address: optional(address),
        sku: sku.to_owned(),
        date: optional(date).map(|raw| parse_date(&raw)),
    })
}

/// Normalized customer registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub fn customer_registration(
    name: &str,
    email: &str,
    phone: &str,
    address: &str,
) -> Result<NewCustomer, ValidationError> {
    evaluate(&[
        Field::new(
            "name",
            name,
            &[
                Constraint::Required,
                Constraint::Alphabetic,
                Constraint::MaxLen(80),
            ],
        ),
        Field::new(
            "email",
            email,
            &[Constraint::Required, Constraint::MaxLen(254)],
        ),
        Field::new("phone", phone, &[Constraint::MaxLen(15)]),
        Field::new("address", address, &[Constraint::MaxLen(255)]),
    ])?;

    Ok(NewCustomer {
        name: name.to_owned(),
        email: email.to_owned(),
        phone: optional(phone),
        address: optional(address),
    })
}

/// Normalized order placement: the order header plus its first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub cust_no: i64,
    pub date: NaiveDate,
    pub sku: String,
    pub qty: i32,
}

pub fn order_placement(
    cust_no: &str,
    date: &str,
    sku: &str,
    qty: &str,
) -> Result<NewOrder, ValidationError> {
    evaluate(&[
        Field::new(
            "cust_no",
            cust_no,
            &[Constraint::Required, Constraint::Digits],
        ),
        Field::new("date", date, &[Constraint::Required, Constraint::Date]),
        Field::new(
            "sku",
            sku,
            &[Constraint::Required, Constraint::MaxLen(25)],
        ),
        Field::new(
            "qty",
            qty,
            &[Constraint::Required, Constraint::PositiveInt],
        ),
    ])?;

    Ok(NewOrder {
        cust_no: parse_key("cust_no", cust_no)?,
        date: parse_date(date),
        sku: sku.to_owned(),
        qty: parse_qty("qty", qty)?,
    })
}

/// Normalized line item for an existing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub sku: String,
    pub qty: i32,
}

pub fn order_line(sku: &str, qty: &str) -> Result<LineItem, ValidationError> {
    evaluate(&[
        Field::new(
            "sku",
            sku,
            &[Constraint::Required, Constraint::MaxLen(25)],
        ),
        Field::new(
            "qty",
            qty,
            &[Constraint::Required, Constraint::PositiveInt],
        ),
    ])?;

    Ok(LineItem {
        sku: sku.to_owned(),
        qty: parse_qty("qty", qty)?,
    })
}

/// Normalized payment attempt. Whether the payer owns the order is a
/// business rule checked by the Order Engine, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentAttempt {
    pub method: PaymentMethod,
    pub payer: i64,
}

pub fn payment(method: &str, payer: &str) -> Result<PaymentAttempt, ValidationError> {
    evaluate(&[
        Field::new(
            "payment_method",
            method,
            &[Constraint::Required, Constraint::OneOf(METHOD_NAMES)],
        ),
        Field::new(
            "cust_no",
            payer,
            &[Constraint::Required, Constraint::Digits],
        ),
    ])?;

    Ok(PaymentAttempt {
        // The OneOf constraint held, so this cannot fail.
        method: PaymentMethod::from_str(method)
            .map_err(|_| ValidationError::new("payment_method", "is not accepted"))?,
        payer: parse_key("cust_no", payer)?,
    })
}

fn parse_key(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>()
        .map_err(|_| ValidationError::new(field, "must be numeric"))
}

fn parse_qty(field: &'static str, raw: &str) -> Result<i32, ValidationError> {
    raw.parse::<i32>()
        .map_err(|_| ValidationError::new(field, "must be a positive integer"))
}
