//! Financial adjustment models.
//!
//! A financial adjustment is a manual ledger entry outside the sale/expense
//! flow, e.g. a bank fee bonification spread over several sales. Its type
//! (a "dimension") says whether money comes in or goes out; its detail lines
//! say which sales or expenses it relates to.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RecordState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustmentNature {
    #[serde(rename = "INGRESO")]
    Income,
    #[serde(rename = "EGRESO")]
    Outflow,
}

text_codes!(AdjustmentNature {
    Income => "INGRESO",
    Outflow => "EGRESO",
});

/// Represents a row of `adjustment_types`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct AdjustmentType {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub nature: AdjustmentNature,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating an adjustment type.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdjustmentType {
    pub code: String,
    pub description: String,
    pub nature: AdjustmentNature,
}

/// Request body for replacing an adjustment type.
///
/// `active` defaults to `true`, so a type is re-enabled unless the body
/// says otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAdjustmentType {
    pub code: String,
    pub description: String,
    pub nature: AdjustmentNature,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Represents a row of `financial_adjustments`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct FinancialAdjustment {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub type_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub account_id: Option<i64>,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub state: RecordState,
}

/// Represents a row of `adjustment_details`.
///
/// Exactly one of `sale_id` / `expense_id` is set.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct AdjustmentDetail {
    pub id: i64,
    pub adjustment_id: i64,
    pub sale_id: Option<i64>,
    pub expense_id: Option<i64>,
    pub amount_applied: Decimal,
    pub percentage: Option<Decimal>,
    pub calculation_base: Option<Decimal>,
    pub applied_at: DateTime<Utc>,
}

/// One detail line of a create-adjustment request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdjustmentDetail {
    #[serde(default)]
    pub sale_id: Option<i64>,
    #[serde(default)]
    pub expense_id: Option<i64>,
    pub amount_applied: Decimal,
    #[serde(default)]
    pub percentage: Option<Decimal>,
    #[serde(default)]
    pub calculation_base: Option<Decimal>,
}

/// Request body for creating a financial adjustment.
///
/// # JSON Example
///
/// ```json
/// {
///   "type_id": 2,
///   "amount": 150.00,
///   "currency": "UYU",
///   "account_id": 3,
///   "details": [
///     { "sale_id": 41, "amount_applied": 100.00, "percentage": 2, "calculation_base": 5000 },
///     { "sale_id": 42, "amount_applied": 50.00 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdjustmentRequest {
    pub type_id: i64,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub details: Vec<NewAdjustmentDetail>,
}

/// Insert payload for `financial_adjustments`.
#[derive(Debug, Clone)]
pub struct NewFinancialAdjustment {
    pub created_at: DateTime<Utc>,
    pub type_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub account_id: Option<i64>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// An adjustment with its detail lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentWithDetails {
    pub adjustment: FinancialAdjustment,
    pub details: Vec<AdjustmentDetail>,
}

/// Query parameters for listing adjustments.
///
/// `from` and `to` are inclusive calendar days (UTC) of `created_at`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjustmentFilter {
    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub state: Option<RecordState>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// An adjustment with its type and account, for listings.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 7,
///   "created_at": "2025-02-03T12:00:00Z",
///   "type_id": 2,
///   "amount": 150.0,
///   "currency": "UYU",
///   "account_id": 3,
///   "reference": null,
///   "note": "bonificación",
///   "state": "ACTIVE",
///   "type_code": "BONIF",
///   "type_description": "Bonificación bancaria",
///   "type_nature": "INGRESO",
///   "account_name": "BANK UYU"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct AdjustmentListEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub adjustment: FinancialAdjustment,
    pub type_code: String,
    pub type_description: String,
    pub type_nature: AdjustmentNature,
    pub account_name: Option<String>,
}
