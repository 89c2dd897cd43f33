//! Error types and HTTP error response handling.
//!
//! Every failure the ledger engine can produce is one `AppError` variant.
//! The variant carries the payload for its kind, and `AppError::kind()`
//! exposes the closed classification used by callers that only need to
//! branch on the category (tests, the HTTP layer).

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

/// Result alias used by services and stores.
pub type AppResult<T> = Result<T, AppError>;

/// Classification of an `AppError`, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    BusinessRuleViolation,
    AccountNotFound,
    InsufficientFunds,
    UnsupportedConversion,
    Internal,
}

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation**: caller input is malformed; detected before any I/O
/// - **Resource**: a referenced entity or money account does not exist
/// - **Business rules**: the input is well formed but the ledger refuses it
/// - **Infrastructure**: database failures and corrupt rows
///
/// All of these leave the store unchanged: services roll back their
/// transaction before returning any of them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request shape is wrong. Carries one message per offending field.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A referenced entity (obligation, client, account, adjustment) is absent.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The operation violates a ledger rule (overpayment, currency
    /// mismatch, obligation already paid or cancelled, ...).
    ///
    /// Returns HTTP 409 Conflict.
    #[error("{0}")]
    BusinessRule(String),

    /// No active money account matches the name synthesized from a payment
    /// method and currency.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("No active money account named '{name}'")]
    AccountNotFound { name: String },

    /// The origin account of an exchange cannot cover the amount.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error(
        "Insufficient funds in {account}: available {available} {currency}, required {required} {currency}"
    )]
    InsufficientFunds {
        account: String,
        currency: String,
        available: Decimal,
        required: Decimal,
    },

    /// The currency pair is not the configured local/foreign pair.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Unsupported conversion: {from} -> {to}")]
    UnsupportedConversion { from: String, to: String },

    /// Database operation failed.
    ///
    /// Returns HTTP 500 and hides the details from the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row could not be interpreted (unknown status code, missing
    /// tag column).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-message validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn rule(message: impl Into<String>) -> Self {
        AppError::BusinessRule(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::ValidationFailed,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::BusinessRule(_) => ErrorKind::BusinessRuleViolation,
            AppError::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            AppError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            AppError::UnsupportedConversion { .. } => ErrorKind::UnsupportedConversion,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A request body that is not valid JSON or does not match the expected
/// shape (unknown payment method, missing field) is a validation failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "business_rule_violation",
///     "message": "Human-readable error message",
///     "details": ["optional", "per-field", "messages"]
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound | ErrorKind::AccountNotFound => StatusCode::NOT_FOUND,
            ErrorKind::BusinessRuleViolation => StatusCode::CONFLICT,
            ErrorKind::InsufficientFunds | ErrorKind::UnsupportedConversion => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match self {
            AppError::Validation(ref errors) => json!({
                "error": {
                    "code": kind,
                    "message": "Validation failed",
                    "details": errors,
                }
            }),
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error");
                json!({
                    "error": {
                        "code": kind,
                        "message": "An internal error occurred",
                    }
                })
            }
            AppError::Internal(ref msg) => {
                tracing::error!(error = %msg, "internal error");
                json!({
                    "error": {
                        "code": kind,
                        "message": "An internal error occurred",
                    }
                })
            }
            ref other => json!({
                "error": {
                    "code": kind,
                    "message": other.to_string(),
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (AppError::invalid("amount"), StatusCode::BAD_REQUEST),
            (
                AppError::NotFound { entity: "sale", id: 7 },
                StatusCode::NOT_FOUND,
            ),
            (AppError::rule("already paid"), StatusCode::CONFLICT),
            (
                AppError::AccountNotFound { name: "CASH EUR".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::InsufficientFunds {
                    account: "BANK UYU".into(),
                    currency: "UYU".into(),
                    available: dec!(10),
                    required: dec!(20),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Internal("bad status".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn insufficient_funds_message_names_both_amounts() {
        let err = AppError::InsufficientFunds {
            account: "CASH USD".into(),
            currency: "USD".into(),
            available: dec!(12.50),
            required: dec!(25.00),
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(
            err.to_string(),
            "Insufficient funds in CASH USD: available 12.50 USD, required 25.00 USD"
        );
    }
}
