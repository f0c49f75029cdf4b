use http::StatusCode;
use sea_orm::error::DbErr;
use serde::Serialize;

use crate::validation::ValidationError;

/// Error taxonomy for core operations. Every operation reports exactly one
/// of these synchronously; a transaction that fails rolls back before the
/// error is returned, so no error ever leaves a partial mutation behind.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Store or transaction failure. Not user-actionable.
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} {key} already exists")]
    Conflict { entity: &'static str, key: String },

    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },

    /// A lifecycle rule was violated (paying twice, adding to a paid order,
    /// paying someone else's order).
    #[error("{0}")]
    BusinessRule(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation {
            field: err.field,
            reason: err.reason,
        }
    }
}

impl ServiceError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn conflict(entity: &'static str, key: impl Into<String>) -> Self {
        ServiceError::Conflict {
            entity,
            key: key.into(),
        }
    }

    pub fn business_rule(reason: impl Into<String>) -> Self {
        ServiceError::BusinessRule(reason.into())
    }

    /// Whether retrying the whole operation from scratch may succeed. True
    /// only for transactions the store aborted to preserve serializability;
    /// such operations left no trace behind.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(err) => crate::db::is_serialization_conflict(err),
            _ => false,
        }
    }

    /// Returns the HTTP status code for this error. This is the single
    /// source of truth the embedding web layer maps from.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Returns the message suitable for user-facing responses. Store errors
    /// collapse to a generic message so connection strings, table names and
    /// driver detail never leak.
    pub fn response_message(&self) -> String {
        match self {
            Self::Database(_) => "database error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Builds the serializable body the web layer renders.
    pub fn to_response(&self) -> ErrorResponse {
        let status = self.status_code();
        ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Standard error body handed to the web layer.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::not_found("product", "A1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::conflict("customer", "x@y.pt").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Validation {
                field: "qty",
                reason: "must be a positive integer".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::business_rule("order is already paid").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_store_detail() {
        let err = ServiceError::Database(DbErr::Custom(
            "connection to postgres://secret failed".into(),
        ));
        assert_eq!(err.response_message(), "database error");

        // User-facing kinds keep their message.
        assert_eq!(
            ServiceError::not_found("order", "42").response_message(),
            "order 42 not found"
        );
    }

    #[test]
    fn to_response_carries_canonical_reason() {
        let body = ServiceError::conflict("product", "A1").to_response();
        assert_eq!(body.error, "Conflict");
        assert_eq!(body.message, "product A1 already exists");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Conflict");
        assert_eq!(json["message"], "product A1 already exists");
    }

    #[test]
    fn only_serialization_conflicts_are_retryable() {
        let conflict = ServiceError::Database(DbErr::Custom(
            "could not serialize access due to concurrent update".into(),
        ));
        assert!(conflict.is_retryable());

        assert!(!ServiceError::Database(DbErr::Custom("boom".into())).is_retryable());
        assert!(!ServiceError::not_found("order", "1").is_retryable());
        assert!(!ServiceError::business_rule("order is already paid").is_retryable());
    }

    #[test]
    fn validation_error_converts_with_field_intact() {
        let source = crate::validation::ValidationError {
            field: "email",
            reason: "is required".into(),
        };
        match ServiceError::from(source) {
            ServiceError::Validation { field, reason } => {
                assert_eq!(field, "email");
                assert_eq!(reason, "is required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
