//! Obligation models: sales (owed to the farm) and expenses (owed by it).
//!
//! Both kinds share the balance bookkeeping: a fixed `total`, a persisted
//! `amount_pending`, and a status derived from the two. Only the tags differ.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{PaymentApplication, PaymentDirection, PaymentLine, PaymentTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationKind {
    Sale,
    Expense,
}

impl ObligationKind {
    /// Entity name used in `NotFound` errors and log fields.
    pub fn entity(&self) -> &'static str {
        match self {
            ObligationKind::Sale => "sale",
            ObligationKind::Expense => "expense",
        }
    }

    /// Money moves in for sales and out for expenses.
    pub fn direction(&self) -> PaymentDirection {
        match self {
            ObligationKind::Sale => PaymentDirection::Incoming,
            ObligationKind::Expense => PaymentDirection::Outgoing,
        }
    }
}

/// Payment status of an obligation.
///
/// `Cancelled` is only ever set on sales and is never produced by
/// `derive_status`; the ledger refuses payments against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Cancelled,
}

text_codes!(ObligationStatus {
    Pending => "PENDING",
    PartiallyPaid => "PARTIALLY_PAID",
    Paid => "PAID",
    Cancelled => "CANCELLED",
});

/// Kind-specific attributes of an obligation.
///
/// # JSON Example
///
/// ```json
/// { "kind": "EXPENSE", "category_id": 3, "subcategory_id": null, "supplier": "Agroveterinaria Sur" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationTags {
    Sale {
        client_id: i64,
    },
    Expense {
        category_id: i64,
        #[serde(default)]
        subcategory_id: Option<i64>,
        #[serde(default)]
        supplier: Option<String>,
    },
}

impl ObligationTags {
    pub fn kind(&self) -> ObligationKind {
        match self {
            ObligationTags::Sale { .. } => ObligationKind::Sale,
            ObligationTags::Expense { .. } => ObligationKind::Expense,
        }
    }

    /// Counterparty paying the obligation; only sales have one.
    pub fn client_id(&self) -> Option<i64> {
        match self {
            ObligationTags::Sale { client_id } => Some(*client_id),
            ObligationTags::Expense { .. } => None,
        }
    }
}

/// A sale or expense row.
///
/// # Database Tables
///
/// Maps to `sales` or `expenses`. `amount_pending` is persisted and updated
/// by every payment; the amount paid is derived from the applications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obligation {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tags: ObligationTags,
    pub total: Decimal,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
    pub amount_pending: Decimal,
    pub status: ObligationStatus,
}

impl Obligation {
    pub fn kind(&self) -> ObligationKind {
        self.tags.kind()
    }

    #[cfg(test)]
    pub fn amount_paid(&self) -> Decimal {
        super::money::round_money(self.total - self.amount_pending)
    }
}

/// Insert payload for a sale or expense.
#[derive(Debug, Clone)]
pub struct ObligationDraft {
    pub created_at: DateTime<Utc>,
    pub tags: ObligationTags,
    pub total: Decimal,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
    pub amount_pending: Decimal,
    pub status: ObligationStatus,
    pub note: Option<String>,
}

/// Response for GetObligationStatus.
///
/// `amount_paid` is the sum of the obligation's payment applications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObligationSummary {
    pub kind: ObligationKind,
    pub id: i64,
    pub currency: String,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub amount_pending: Decimal,
    pub status: ObligationStatus,
}

/// How much of a new obligation its initial payment lines cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentScenario {
    Full,
    Partial,
    None,
}

/// One obligation of a CreateObligationsBatch request.
///
/// # JSON Example
///
/// ```json
/// {
///   "tags": { "kind": "EXPENSE", "category_id": 3 },
///   "total": 1200.00,
///   "currency": "UYU",
///   "due_date": "2025-03-31",
///   "payment_lines": [ { "amount": 200.00, "method": "EFECTIVO" } ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct NewObligation {
    pub tags: ObligationTags,
    pub total: Decimal,
    pub currency: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp; defaults to now.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub payment_lines: Vec<PaymentLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateObligationsBatchRequest {
    pub obligations: Vec<NewObligation>,
}

/// One created obligation with the payment rows written for it.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedObligation {
    pub obligation: Obligation,
    pub scenario: PaymentScenario,
    pub transactions: Vec<PaymentTransaction>,
    pub applications: Vec<PaymentApplication>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateObligationsBatchResponse {
    pub created_obligations: Vec<CreatedObligation>,
}

/// Outstanding sale debt of one client in one currency.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ClientDebt {
    pub client_id: i64,
    pub client_name: String,
    pub currency: String,
    pub amount_pending: Decimal,
    /// Number of sales with money still pending.
    pub pending_sales: i64,
}

/// Query parameters for the clients-with-debt listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingClientsQuery {
    #[serde(default)]
    pub currency: Option<String>,
}

/// Query parameters for outstanding-obligation listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutstandingQuery {
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}
