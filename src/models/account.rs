//! Money account models.
//!
//! A money account is a named, currency-scoped pool of funds such as
//! `CASH UYU` or `BANK USD`. Its balance is never stored on the row; it is
//! read from the `account_balances` view, which sums every active
//! transaction, exchange and adjustment that references the account.

use rust_decimal::Decimal;
use serde::Serialize;

/// Represents a row of `money_accounts`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct MoneyAccount {
    pub id: i64,

    /// Unique name following the `<CLASS> <CURRENCY>` convention.
    pub name: String,

    /// ISO 4217 code, fixed for the life of the account.
    pub currency: String,

    /// Inactive accounts are never resolved for new payments.
    pub active: bool,
}

/// An account together with its real-time balance.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct AccountBalance {
    pub account_id: i64,
    pub name: String,
    pub currency: String,
    pub active: bool,
    pub balance: Decimal,
}
