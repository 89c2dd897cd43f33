//! Debt ledger reads: obligation status and outstanding debt.

use rust_decimal::Decimal;

use crate::{
    config::LedgerSettings,
    error::{AppError, AppResult},
    models::{
        money::{round_money, sum_money},
        obligation::{
            ClientDebt, Obligation, ObligationKind, ObligationStatus, ObligationSummary,
            OutstandingQuery, PendingClientsQuery,
        },
    },
    store::{LedgerStore, OutstandingFilter, obligation_not_found},
};

/// Status implied by a pending amount.
///
/// Never returns `Cancelled`; cancellation is an explicit state, not a
/// balance.
pub fn derive_status(amount_pending: Decimal, total: Decimal) -> ObligationStatus {
    if amount_pending <= Decimal::ZERO {
        ObligationStatus::Paid
    } else if amount_pending < total {
        ObligationStatus::PartiallyPaid
    } else {
        ObligationStatus::Pending
    }
}

/// Sum of pending amounts.
pub fn total_pending(obligations: &[Obligation]) -> AppResult<Decimal> {
    sum_money(obligations.iter().map(|o| o.amount_pending))
}

/// GetObligationStatus: total, paid, pending and status of one obligation.
///
/// `amount_paid` is the sum of the obligation's applications, so a reader
/// sees exactly what the payment rows say. Status is re-derived from the
/// pending amount unless the obligation was cancelled.
pub async fn get_obligation_status<S: LedgerStore>(
    store: &S,
    kind: ObligationKind,
    id: i64,
) -> AppResult<ObligationSummary> {
    let mut summary = store
        .obligation_summary(kind, id)
        .await?
        .ok_or_else(|| obligation_not_found(kind, id))?;

    summary.amount_paid = round_money(summary.amount_paid);
    if summary.status != ObligationStatus::Cancelled {
        summary.status = derive_status(summary.amount_pending, summary.total);
    }

    Ok(summary)
}

/// GetOutstandingObligations: pending debt, oldest first.
///
/// For sales the filter usually names a client; expenses have no payer and
/// ignore `client_id`.
pub async fn outstanding_obligations<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    kind: ObligationKind,
    query: OutstandingQuery,
) -> AppResult<Vec<Obligation>> {
    let currency = query.currency.map(|c| c.trim().to_uppercase());
    if let Some(message) = currency
        .as_deref()
        .and_then(|c| settings.check_currency("currency", c))
    {
        return Err(AppError::invalid(message));
    }

    let filter = OutstandingFilter {
        client_id: match kind {
            ObligationKind::Sale => query.client_id,
            ObligationKind::Expense => None,
        },
        currency,
    };

    store.outstanding_obligations(kind, &filter).await
}

/// Clients that owe money, one row per client and currency, largest debt
/// first. This is where a FIFO sale payment usually starts: pick the payer,
/// then pay against its outstanding sales.
pub async fn pending_clients<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    query: PendingClientsQuery,
) -> AppResult<Vec<ClientDebt>> {
    let currency = query.currency.map(|c| c.trim().to_uppercase());
    if let Some(message) = currency
        .as_deref()
        .and_then(|c| settings.check_currency("currency", c))
    {
        return Err(AppError::invalid(message));
    }

    store.pending_clients(currency.as_deref()).await
}
