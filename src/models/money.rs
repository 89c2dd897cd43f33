//! Fixed-point money helpers.
//!
//! Every monetary value in the ledger has two decimal places. Intermediate
//! results are rounded right after each multiplication, division or
//! subtraction, so long chains of small applications cannot drift by a cent.
//!
//! Amounts are stored as `NUMERIC(14, 2)` and conversion factors as
//! `NUMERIC(14, 4)`; request values outside those ranges are rejected as
//! validation errors before any arithmetic runs.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{AppError, AppResult};

/// Number of decimal places stored for every amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(14, 2)` column holds.
pub const MAX_AMOUNT: Decimal = dec!(999999999999.99);

/// Number of decimal places stored for conversion factors.
pub const FACTOR_SCALE: u32 = 4;

/// Smallest factor that survives rounding to `FACTOR_SCALE`.
pub const MIN_FACTOR: Decimal = dec!(0.0001);

/// Largest factor a `NUMERIC(14, 4)` column holds.
pub const MAX_FACTOR: Decimal = dec!(9999999999.9999);

/// Round to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a conversion factor to the stored precision, halves away from zero.
pub fn round_factor(factor: Decimal) -> Decimal {
    factor.round_dp_with_strategy(FACTOR_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validation error for an arithmetic result outside `Decimal` or the
/// stored range.
pub fn out_of_range(field: &str) -> AppError {
    AppError::invalid(format!("{field} is out of range"))
}

/// Round `amount` to cents and check it is positive and fits the column.
///
/// Messages are prefixed with `field` and appended to `errors`.
pub fn check_amount(field: &str, amount: Decimal, errors: &mut Vec<String>) -> Decimal {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        errors.push(format!("{field} must be greater than 0"));
    } else if amount > MAX_AMOUNT {
        errors.push(format!("{field} must not exceed {MAX_AMOUNT}"));
    }
    amount
}

/// Round `factor` to the stored precision and check it fits the column.
pub fn check_factor(field: &str, factor: Decimal, errors: &mut Vec<String>) -> Decimal {
    let factor = round_factor(factor);
    if factor < MIN_FACTOR || factor > MAX_FACTOR {
        errors.push(format!(
            "{field} must be between {MIN_FACTOR} and {MAX_FACTOR}"
        ));
    }
    factor
}

/// Sum a sequence of amounts, rounding the result to cents.
///
/// # Errors
///
/// `Validation` when the sum does not fit in a `Decimal`.
pub fn sum_money<I>(amounts: I) -> AppResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .map(round_money)
        .ok_or_else(|| out_of_range("sum of amounts"))
}
