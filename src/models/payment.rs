//! Payment data models and API request/response types.
//!
//! This module defines:
//! - `PaymentLine`: one chunk of money in a payment request (amount + method)
//! - `PaymentTransaction`: the persisted receipt/disbursement for one line
//! - `PaymentApplication`: how much of a transaction was credited to one obligation
//! - `RegisterPaymentRequest` / `PaymentReceipt`: the RegisterPayment contract

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RecordState;
use super::obligation::{ObligationKind, ObligationStatus};

/// How a payment line was settled.
///
/// Wire codes are the ones used on the farm's paperwork. Unknown codes are
/// rejected when the request body is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "EFECTIVO")]
    Cash,
    #[serde(rename = "TRANSFERENCIA")]
    Transfer,
    #[serde(rename = "DEBITO")]
    Debit,
    #[serde(rename = "CREDITO")]
    Credit,
    #[serde(rename = "OTROS", alias = "OTRO")]
    Other,
}

text_codes!(PaymentMethod {
    Cash => "EFECTIVO",
    Transfer => "TRANSFERENCIA",
    Debit => "DEBITO",
    Credit => "CREDITO",
    Other => "OTROS",
});

/// Whether money entered the business (sale collections) or left it
/// (expense payments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDirection {
    Incoming,
    Outgoing,
}

text_codes!(PaymentDirection {
    Incoming => "INCOMING",
    Outgoing => "OUTGOING",
});

/// Allocation policy for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStrategy {
    /// Everything goes to one named obligation.
    Direct,
    /// Oldest outstanding obligations of the payer first.
    Fifo,
}

/// One line of a payment request.
///
/// # JSON Example
///
/// ```json
/// { "amount": 1500.00, "method": "TRANSFERENCIA", "reference": "BROU 88213" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLine {
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for RegisterPayment.
///
/// # JSON Example
///
/// ```json
/// {
///   "kind": "SALE",
///   "payer_id": 12,
///   "currency": "UYU",
///   "strategy": "FIFO",
///   "lines": [
///     { "amount": 1000, "method": "EFECTIVO" },
///     { "amount": 500, "method": "TRANSFERENCIA", "reference": "BROU 88213" }
///   ]
/// }
/// ```
///
/// `target_obligation_id` is required for `DIRECT` and ignored for `FIFO`.
/// `payer_id` is the client for sales and must be absent for expenses.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPaymentRequest {
    pub kind: ObligationKind,
    #[serde(default)]
    pub payer_id: Option<i64>,
    pub currency: String,
    pub strategy: AllocationStrategy,
    #[serde(default)]
    pub target_obligation_id: Option<i64>,
    pub lines: Vec<PaymentLine>,
    /// Payment date; defaults to now.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// A persisted payment transaction.
///
/// # Database Table
///
/// Maps to `payment_transactions`. One row per payment line; `account_id`
/// is the money account resolved from the line's method and currency.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct PaymentTransaction {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub direction: PaymentDirection,
    /// Paying client for sale collections, NULL for expense payments.
    pub client_id: Option<i64>,
    pub amount: Decimal,
    pub currency: String,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub account_id: i64,
    pub state: RecordState,
}

/// Insert payload for `payment_transactions`.
#[derive(Debug, Clone)]
pub struct NewPaymentTransaction {
    pub created_at: DateTime<Utc>,
    pub direction: PaymentDirection,
    pub client_id: Option<i64>,
    pub amount: Decimal,
    pub currency: String,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub account_id: i64,
}

/// A persisted payment application.
///
/// # Database Table
///
/// Maps to `payment_applications`, which stores the obligation link as two
/// nullable columns (`sale_id`, `expense_id`) with exactly one set. The model
/// folds them into `kind` + `obligation_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentApplication {
    pub id: i64,
    pub transaction_id: i64,
    pub kind: ObligationKind,
    pub obligation_id: i64,
    pub amount_applied: Decimal,
    pub applied_at: DateTime<Utc>,
}

/// Insert payload for `payment_applications`.
#[derive(Debug, Clone)]
pub struct NewPaymentApplication {
    pub transaction_id: i64,
    pub kind: ObligationKind,
    pub obligation_id: i64,
    pub amount_applied: Decimal,
    pub applied_at: DateTime<Utc>,
}

/// Balance change written to one obligation by a payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObligationUpdate {
    pub kind: ObligationKind,
    pub obligation_id: i64,
    pub previous_pending: Decimal,
    pub amount_applied: Decimal,
    pub new_pending: Decimal,
    pub new_status: ObligationStatus,
}

/// Response for RegisterPayment.
///
/// `total_paid` is what the transactions record; `total_applied` is what
/// reached obligations. They differ only when a FIFO payment exceeds the
/// payer's outstanding debt, in which case `unapplied` holds the excess.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub transactions: Vec<PaymentTransaction>,
    pub applications: Vec<PaymentApplication>,
    pub updated_obligations: Vec<ObligationUpdate>,
    pub total_paid: Decimal,
    pub total_applied: Decimal,
    pub unapplied: Decimal,
    pub debt_before: Decimal,
    pub debt_after: Decimal,
}

/// Query parameters for paginated history endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Page {
    /// Clamp to sane bounds before it reaches a query.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, 500),
            offset: self.offset.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_codes_round_trip_through_text() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Transfer,
            PaymentMethod::Debit,
            PaymentMethod::Credit,
            PaymentMethod::Other,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().ok(), Some(method));
        }
    }

    #[test]
    fn legacy_other_code_is_accepted_on_the_wire() {
        let line: PaymentLine =
            serde_json::from_str(r#"{ "amount": 10.5, "method": "OTRO" }"#).unwrap();
        assert_eq!(line.method, PaymentMethod::Other);

        let err = serde_json::from_str::<PaymentLine>(r#"{ "amount": 1, "method": "CHEQUE" }"#);
        assert!(err.is_err());
    }
}
