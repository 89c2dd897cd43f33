//! Payment registration: the atomic transaction coordinator.
//!
//! One call of `register_payment` is one database transaction:
//!
//! 1. Validate the request (no I/O)
//! 2. Lock the target obligation(s) and plan the allocation
//! 3. Resolve a money account and insert a payment transaction per line
//! 4. Write the new pending amount and status of every obligation touched
//! 5. Insert one application row per (transaction, obligation) pair
//! 6. Commit, or roll back everything on the first error
//!
//! # Atomicity Guarantees
//!
//! Every statement runs on the same `LedgerTx`. The obligation rows are
//! locked before they are read for allocation, so concurrent payments
//! against the same debt serialize on the store's row locks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    config::LedgerSettings,
    error::{AppError, AppResult},
    models::{
        money::{check_amount, round_money},
        obligation::ObligationKind,
        payment::{
            AllocationStrategy, NewPaymentApplication, NewPaymentTransaction, Page,
            PaymentApplication, PaymentLine, PaymentReceipt, PaymentTransaction,
            RegisterPaymentRequest,
        },
    },
    services::{
        account_resolver::resolve_account,
        allocation::{Allocation, allocate_direct, allocate_fifo},
        ledger_reader::total_pending,
    },
    store::{LedgerStore, LedgerTx, OutstandingFilter, finish, obligation_not_found},
};

/// Check payment lines and return their amounts rounded to cents.
///
/// Messages are prefixed with `field` (e.g. `lines` or
/// `obligations[2].payment_lines`) and appended to `errors`.
pub(crate) fn validate_lines(
    field: &str,
    lines: &[PaymentLine],
    errors: &mut Vec<String>,
) -> Vec<Decimal> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| check_amount(&format!("{field}[{i}].amount"), line.amount, errors))
        .collect()
}

/// Validated form of a payment request.
struct PaymentPlanInput {
    currency: String,
    amounts: Vec<Decimal>,
}

fn validate(request: &RegisterPaymentRequest, settings: &LedgerSettings) -> AppResult<PaymentPlanInput> {
    let mut errors = Vec::new();

    if request.lines.is_empty() {
        errors.push("lines must contain at least one payment line".to_string());
    }
    let amounts = validate_lines("lines", &request.lines, &mut errors);

    let currency = request.currency.trim().to_uppercase();
    if let Some(message) = settings.check_currency("currency", &currency) {
        errors.push(message);
    }

    match request.strategy {
        AllocationStrategy::Direct if request.target_obligation_id.is_none() => {
            errors.push("target_obligation_id is required for DIRECT payments".to_string());
        }
        AllocationStrategy::Fifo
            if request.kind == ObligationKind::Sale && request.payer_id.is_none() =>
        {
            errors.push("payer_id is required for FIFO sale payments".to_string());
        }
        _ => {}
    }
    if request.kind == ObligationKind::Expense && request.payer_id.is_some() {
        errors.push("payer_id must be empty for expense payments".to_string());
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(PaymentPlanInput { currency, amounts })
}

/// RegisterPayment.
///
/// # Errors
///
/// - `Validation`: malformed request, detected before the transaction opens
/// - `NotFound`: target obligation or paying client does not exist
/// - `BusinessRule`: overpayment, currency mismatch, target paid or
///   cancelled, payer without outstanding debt
/// - `AccountNotFound`: a line's method and currency map to no active account
/// - `Database`: any store failure
///
/// On every error the store is left unchanged.
#[tracing::instrument(
    skip(store, settings, request),
    fields(kind = ?request.kind, strategy = ?request.strategy, payer_id = ?request.payer_id)
)]
pub async fn register_payment<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    request: RegisterPaymentRequest,
) -> AppResult<PaymentReceipt> {
    let input = validate(&request, settings)?;

    let mut tx = store.begin().await?;
    let outcome = apply_payment(&mut tx, settings, &request, &input).await;
    let receipt = finish(tx, outcome).await?;

    tracing::info!(
        transactions = receipt.transactions.len(),
        applications = receipt.applications.len(),
        total_paid = %receipt.total_paid,
        total_applied = %receipt.total_applied,
        currency = %input.currency,
        "payment registered"
    );

    Ok(receipt)
}

async fn apply_payment<T: LedgerTx>(
    tx: &mut T,
    settings: &LedgerSettings,
    request: &RegisterPaymentRequest,
    input: &PaymentPlanInput,
) -> AppResult<PaymentReceipt> {
    let kind = request.kind;
    let paid_at = request.paid_at.unwrap_or_else(Utc::now);

    let (allocation, debt_before, client_id) = match request.strategy {
        AllocationStrategy::Direct => {
            let target_id = request
                .target_obligation_id
                .ok_or_else(|| AppError::invalid("target_obligation_id is required"))?;
            let target = tx
                .lock_obligation(kind, target_id)
                .await?
                .ok_or_else(|| obligation_not_found(kind, target_id))?;

            if target.currency != input.currency {
                return Err(AppError::rule(format!(
                    "Currency mismatch: {} {} is in {}, payment is in {}",
                    kind.entity(),
                    target.id,
                    target.currency,
                    input.currency
                )));
            }
            let owner = target.tags.client_id();
            if let (Some(payer), Some(owner)) = (request.payer_id, owner) {
                if payer != owner {
                    return Err(AppError::rule(format!(
                        "sale {} does not belong to client {payer}",
                        target.id
                    )));
                }
            }

            let allocation = allocate_direct(&input.amounts, &target)?;
            (allocation, target.amount_pending, owner)
        }
        AllocationStrategy::Fifo => {
            if let Some(client_id) = request.payer_id {
                if !tx.client_exists(client_id).await? {
                    return Err(AppError::NotFound {
                        entity: "client",
                        id: client_id,
                    });
                }
            }

            let filter = OutstandingFilter {
                client_id: request.payer_id,
                currency: Some(input.currency.clone()),
            };
            let outstanding = tx.lock_outstanding(kind, &filter).await?;
            if outstanding.is_empty() {
                return Err(AppError::rule(match request.payer_id {
                    Some(client_id) => format!(
                        "Client {client_id} has no outstanding debt in {}",
                        input.currency
                    ),
                    None => format!("There are no outstanding expenses in {}", input.currency),
                }));
            }

            let allocation = allocate_fifo(&input.amounts, &outstanding)?;
            if allocation.unapplied > Decimal::ZERO {
                tracing::warn!(
                    unapplied = %allocation.unapplied,
                    currency = %input.currency,
                    "payment exceeds outstanding debt; excess not applied"
                );
            }
            (allocation, total_pending(&outstanding)?, request.payer_id)
        }
    };

    let transactions = insert_transactions(
        tx,
        settings,
        kind,
        client_id,
        &input.currency,
        &request.lines,
        &input.amounts,
        paid_at,
    )
    .await?;

    let applications = write_allocation(tx, &allocation, &transactions, kind, paid_at).await?;

    Ok(PaymentReceipt {
        debt_after: round_money(debt_before - allocation.total_applied),
        debt_before,
        total_paid: allocation.total_paid,
        total_applied: allocation.total_applied,
        unapplied: allocation.unapplied,
        updated_obligations: allocation.updates,
        applications,
        transactions,
    })
}

/// Insert one payment transaction per line, each in its resolved account.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn insert_transactions<T: LedgerTx>(
    tx: &mut T,
    settings: &LedgerSettings,
    kind: ObligationKind,
    client_id: Option<i64>,
    currency: &str,
    lines: &[PaymentLine],
    amounts: &[Decimal],
    created_at: DateTime<Utc>,
) -> AppResult<Vec<PaymentTransaction>> {
    let mut transactions = Vec::with_capacity(lines.len());

    for (line, amount) in lines.iter().zip(amounts) {
        let account = resolve_account(tx, &settings.accounts, line.method, currency).await?;

        let transaction = tx
            .insert_payment_transaction(&NewPaymentTransaction {
                created_at,
                direction: kind.direction(),
                client_id,
                amount: *amount,
                currency: currency.to_string(),
                method: line.method,
                reference: line.reference.clone(),
                note: line.note.clone(),
                account_id: account.id,
            })
            .await?;
        transactions.push(transaction);
    }

    Ok(transactions)
}

/// Persist a planned allocation: balance updates first, then one
/// application row per planned application, in plan order.
pub(crate) async fn write_allocation<T: LedgerTx>(
    tx: &mut T,
    allocation: &Allocation,
    transactions: &[PaymentTransaction],
    kind: ObligationKind,
    applied_at: DateTime<Utc>,
) -> AppResult<Vec<PaymentApplication>> {
    for update in &allocation.updates {
        tx.update_obligation_balance(kind, update.obligation_id, update.new_pending, update.new_status)
            .await?;
    }

    let mut applications = Vec::with_capacity(allocation.applications.len());
    for planned in &allocation.applications {
        let transaction = transactions.get(planned.line_index).ok_or_else(|| {
            AppError::Internal(format!("no transaction for payment line {}", planned.line_index))
        })?;

        let application = tx
            .insert_application(&NewPaymentApplication {
                transaction_id: transaction.id,
                kind,
                obligation_id: planned.obligation_id,
                amount_applied: planned.amount,
                applied_at,
            })
            .await?;
        applications.push(application);
    }

    Ok(applications)
}

/// Payment transactions received from a client, newest first.
pub async fn client_payments<S: LedgerStore>(
    store: &S,
    client_id: i64,
    page: Page,
) -> AppResult<Vec<PaymentTransaction>> {
    store.client_payments(client_id, page.clamped()).await
}
