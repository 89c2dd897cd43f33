//! Currency exchanges between money accounts.
//!
//! An exchange moves money out of one account and into another. When both
//! accounts hold the same currency it is a plain transfer; otherwise the
//! operator-supplied factor (units of local currency per unit of foreign
//! currency) converts between the configured local and foreign currencies.
//! Exchanges never touch obligations.

use rust_decimal::Decimal;

use crate::{
    config::LedgerSettings,
    error::{AppError, AppResult},
    models::{
        account::AccountBalance,
        exchange::{
            Denomination, ExchangeHistoryEntry, ExchangeReceipt, ExchangeRequest,
            NewCurrencyExchange,
        },
        money::{MAX_AMOUNT, check_amount, check_factor, out_of_range, round_factor, round_money},
        payment::Page,
    },
    store::{LedgerStore, LedgerTx, finish},
};

/// Both sides of an exchange, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub amount_origin: Decimal,
    pub amount_destination: Decimal,
    /// Factor actually used; 1 for same-currency transfers.
    pub factor: Decimal,
}

/// Compute origin and destination amounts.
///
/// `amount` is denominated in the origin or destination currency as
/// `denomination` says; the other side is derived from it. The factor is
/// rounded to four decimals first, the precision it is stored with, so the
/// stored factor reproduces the stored amounts.
///
/// # Errors
///
/// - `UnsupportedConversion` when the currencies differ and are not the
///   configured local/foreign pair
/// - `Validation` when the derived amount does not fit an amount column
pub fn convert(
    settings: &LedgerSettings,
    currency_origin: &str,
    currency_destination: &str,
    amount: Decimal,
    denomination: Denomination,
    factor: Decimal,
) -> AppResult<Conversion> {
    let amount = round_money(amount);

    if currency_origin == currency_destination {
        return Ok(Conversion {
            amount_origin: amount,
            amount_destination: amount,
            factor: Decimal::ONE,
        });
    }

    let local = settings.local_currency.as_str();
    let foreign = settings.foreign_currency.as_str();
    let to_foreign = match (currency_origin, currency_destination) {
        (o, d) if o == local && d == foreign => true,
        (o, d) if o == foreign && d == local => false,
        _ => {
            return Err(AppError::UnsupportedConversion {
                from: currency_origin.to_string(),
                to: currency_destination.to_string(),
            });
        }
    };

    let factor = round_factor(factor);
    let derived = |value: Option<Decimal>| {
        value
            .map(round_money)
            .filter(|v| *v <= MAX_AMOUNT)
            .ok_or_else(|| out_of_range("converted amount"))
    };

    // local amounts are foreign amounts times the factor
    let (amount_origin, amount_destination) = match (denomination, to_foreign) {
        (Denomination::Origin, true) => (amount, derived(amount.checked_div(factor))?),
        (Denomination::Origin, false) => (amount, derived(amount.checked_mul(factor))?),
        (Denomination::Destination, true) => (derived(amount.checked_mul(factor))?, amount),
        (Denomination::Destination, false) => (derived(amount.checked_div(factor))?, amount),
    };

    Ok(Conversion {
        amount_origin,
        amount_destination,
        factor,
    })
}

fn validate(request: &ExchangeRequest) -> AppResult<()> {
    let mut errors = Vec::new();

    check_amount("amount", request.amount, &mut errors);
    check_factor("conversion_factor", request.conversion_factor, &mut errors);
    if request.origin_account_id == request.destination_account_id {
        errors.push("origin and destination accounts must differ".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn usable(balance: Option<AccountBalance>, id: i64) -> AppResult<AccountBalance> {
    let balance = balance.ok_or(AppError::NotFound {
        entity: "money account",
        id,
    })?;
    if !balance.active {
        return Err(AppError::rule(format!(
            "Money account {} is inactive",
            balance.name
        )));
    }
    Ok(balance)
}

fn ensure_funds(origin: &AccountBalance, required: Decimal) -> AppResult<()> {
    if required > origin.balance {
        return Err(AppError::InsufficientFunds {
            account: origin.name.clone(),
            currency: origin.currency.clone(),
            available: origin.balance,
            required,
        });
    }
    Ok(())
}

/// RegisterExchange.
///
/// Both balances are read concurrently on the pool to fail fast; the origin
/// balance is then re-read under a row lock inside the transaction, so two
/// exchanges draining the same account cannot both pass the check.
///
/// # Errors
///
/// - `Validation`: amount or factor outside its column range, same account
///   on both sides, or a converted amount that rounds to zero or overflows
/// - `NotFound` / `BusinessRule`: unknown or inactive account
/// - `UnsupportedConversion`: currency pair outside the configured pair
/// - `InsufficientFunds`: origin balance below the origin amount
#[tracing::instrument(
    skip(store, settings, request),
    fields(origin = request.origin_account_id, destination = request.destination_account_id)
)]
pub async fn register_exchange<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    request: ExchangeRequest,
) -> AppResult<ExchangeReceipt> {
    validate(&request)?;

    let (origin, destination) = tokio::try_join!(
        store.account_balance(request.origin_account_id),
        store.account_balance(request.destination_account_id),
    )?;
    let origin = usable(origin, request.origin_account_id)?;
    let destination = usable(destination, request.destination_account_id)?;

    let conversion = convert(
        settings,
        &origin.currency,
        &destination.currency,
        request.amount,
        request.denomination,
        request.conversion_factor,
    )?;
    if conversion.amount_origin <= Decimal::ZERO || conversion.amount_destination <= Decimal::ZERO {
        return Err(AppError::invalid("amount is too small to convert"));
    }
    ensure_funds(&origin, conversion.amount_origin)?;

    let mut tx = store.begin().await?;
    let outcome = write_exchange(&mut tx, &request, &origin, &destination, conversion).await;
    let receipt = finish(tx, outcome).await?;

    tracing::info!(
        exchange_id = receipt.exchange_id,
        amount_origin = %receipt.amount_origin,
        currency_origin = %receipt.currency_origin,
        amount_destination = %receipt.amount_destination,
        currency_destination = %receipt.currency_destination,
        "exchange registered"
    );

    Ok(receipt)
}

async fn write_exchange<T: LedgerTx>(
    tx: &mut T,
    request: &ExchangeRequest,
    origin: &AccountBalance,
    destination: &AccountBalance,
    conversion: Conversion,
) -> AppResult<ExchangeReceipt> {
    let locked = tx
        .lock_account_balance(origin.account_id)
        .await?
        .ok_or(AppError::NotFound {
            entity: "money account",
            id: origin.account_id,
        })?;
    ensure_funds(&locked, conversion.amount_origin)?;

    let exchange = tx
        .insert_exchange(&NewCurrencyExchange {
            origin_account_id: origin.account_id,
            destination_account_id: destination.account_id,
            amount_origin: conversion.amount_origin,
            currency_origin: origin.currency.clone(),
            amount_destination: conversion.amount_destination,
            currency_destination: destination.currency.clone(),
            conversion_factor: conversion.factor,
            note: request.note.clone(),
        })
        .await?;

    Ok(ExchangeReceipt {
        exchange_id: exchange.id,
        created_at: exchange.created_at,
        origin_account: origin.name.clone(),
        destination_account: destination.name.clone(),
        amount_origin: exchange.amount_origin,
        currency_origin: exchange.currency_origin,
        amount_destination: exchange.amount_destination,
        currency_destination: exchange.currency_destination,
        conversion_factor: exchange.conversion_factor,
        origin_balance_before: locked.balance,
        origin_balance_after: round_money(locked.balance - conversion.amount_origin),
    })
}

/// Real-time balance of one money account, active or not.
pub async fn account_balance<S: LedgerStore>(store: &S, account_id: i64) -> AppResult<AccountBalance> {
    store.account_balance(account_id).await?.ok_or(AppError::NotFound {
        entity: "money account",
        id: account_id,
    })
}

/// Active exchanges, newest first.
pub async fn exchange_history<S: LedgerStore>(
    store: &S,
    page: Page,
) -> AppResult<Vec<ExchangeHistoryEntry>> {
    store.exchange_history(page.clamped()).await
}
