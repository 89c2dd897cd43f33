//! Currency exchange models and API request/response types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RecordState;

/// Which side of the exchange the operator typed the amount in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Denomination {
    Origin,
    Destination,
}

/// Request body for RegisterExchange.
///
/// # JSON Example
///
/// ```json
/// {
///   "origin_account_id": 1,
///   "destination_account_id": 4,
///   "amount": 1000,
///   "denomination": "ORIGIN",
///   "conversion_factor": 40,
///   "note": "Cambio semanal"
/// }
/// ```
///
/// `conversion_factor` is units of local currency per unit of foreign
/// currency. It is ignored (forced to 1) when both accounts share a currency.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRequest {
    pub origin_account_id: i64,
    pub destination_account_id: i64,
    pub amount: Decimal,
    pub denomination: Denomination,
    pub conversion_factor: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

/// Represents a row of `currency_exchanges`.
///
/// Exchanges are created and never mutated.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct CurrencyExchange {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub origin_account_id: i64,
    pub destination_account_id: i64,
    pub amount_origin: Decimal,
    pub currency_origin: String,
    pub amount_destination: Decimal,
    pub currency_destination: String,
    pub conversion_factor: Decimal,
    pub note: Option<String>,
    pub state: RecordState,
}

/// Insert payload for `currency_exchanges`.
#[derive(Debug, Clone)]
pub struct NewCurrencyExchange {
    pub origin_account_id: i64,
    pub destination_account_id: i64,
    pub amount_origin: Decimal,
    pub currency_origin: String,
    pub amount_destination: Decimal,
    pub currency_destination: String,
    pub conversion_factor: Decimal,
    pub note: Option<String>,
}

/// Response for RegisterExchange.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeReceipt {
    pub exchange_id: i64,
    pub created_at: DateTime<Utc>,
    pub origin_account: String,
    pub destination_account: String,
    pub amount_origin: Decimal,
    pub currency_origin: String,
    pub amount_destination: Decimal,
    pub currency_destination: String,
    pub conversion_factor: Decimal,
    pub origin_balance_before: Decimal,
    pub origin_balance_after: Decimal,
}

/// An exchange with both account names, for history listings.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ExchangeHistoryEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub exchange: CurrencyExchange,
    pub origin_account_name: String,
    pub destination_account_name: String,
}
