//! Batch creation of obligations with their initial payments.
//!
//! The whole batch is one transaction. Each obligation is inserted with the
//! pending amount left after its initial lines, then each line gets a payment
//! transaction and an application against that obligation alone.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    config::LedgerSettings,
    error::{AppError, AppResult},
    models::{
        money::{check_amount, round_money, sum_money},
        obligation::{
            CreateObligationsBatchRequest, CreateObligationsBatchResponse, CreatedObligation,
            NewObligation, ObligationDraft, ObligationTags, PaymentScenario,
        },
        payment::NewPaymentApplication,
    },
    services::{ledger_reader::derive_status, payment_service},
    store::{LedgerStore, LedgerTx, finish},
};

/// Classify how much of `total` the initial lines cover.
///
/// # Errors
///
/// `BusinessRule` when the lines exceed the total.
pub fn classify_scenario(total: Decimal, paid: Decimal) -> AppResult<PaymentScenario> {
    if paid > total {
        return Err(AppError::rule(format!(
            "Initial payments of {paid} exceed the obligation total {total}"
        )));
    }

    Ok(if paid == total {
        PaymentScenario::Full
    } else if paid > Decimal::ZERO {
        PaymentScenario::Partial
    } else {
        PaymentScenario::None
    })
}

/// An obligation that passed validation.
struct Prepared {
    input: NewObligation,
    currency: String,
    total: Decimal,
    amounts: Vec<Decimal>,
    paid: Decimal,
    scenario: PaymentScenario,
}

fn prepare(
    request: CreateObligationsBatchRequest,
    settings: &LedgerSettings,
) -> AppResult<Vec<Prepared>> {
    let mut errors = Vec::new();

    if request.obligations.is_empty() {
        errors.push("obligations must contain at least one obligation".to_string());
    }

    let mut checked = Vec::with_capacity(request.obligations.len());
    for (i, input) in request.obligations.into_iter().enumerate() {
        let field = format!("obligations[{i}]");
        let total = check_amount(&format!("{field}.total"), input.total, &mut errors);

        let currency = input.currency.trim().to_uppercase();
        if let Some(message) = settings.check_currency(&format!("{field}.currency"), &currency) {
            errors.push(message);
        }

        let amounts = payment_service::validate_lines(
            &format!("{field}.payment_lines"),
            &input.payment_lines,
            &mut errors,
        );
        checked.push((field, input, currency, total, amounts));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut prepared = Vec::with_capacity(checked.len());
    for (field, input, currency, total, amounts) in checked {
        let paid = sum_money(amounts.iter().copied())?;
        let scenario = classify_scenario(total, paid)?;
        if scenario != PaymentScenario::Full && input.due_date.is_none() {
            errors.push(format!(
                "{field}.due_date is required when the obligation is not fully paid"
            ));
        }

        prepared.push(Prepared {
            input,
            currency,
            total,
            amounts,
            paid,
            scenario,
        });
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(prepared)
}

/// CreateObligationsBatch.
///
/// # Errors
///
/// - `Validation`: malformed obligation or line, missing due date for a
///   partial or unpaid obligation
/// - `BusinessRule`: initial lines exceed an obligation's total
/// - `NotFound`: unknown client or expense category
/// - `AccountNotFound`: a line's method and currency map to no account
///
/// Any error rolls back the whole batch.
#[tracing::instrument(skip_all, fields(obligations = request.obligations.len()))]
pub async fn create_obligations_batch<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    request: CreateObligationsBatchRequest,
) -> AppResult<CreateObligationsBatchResponse> {
    let prepared = prepare(request, settings)?;

    let mut tx = store.begin().await?;
    let outcome = insert_all(&mut tx, settings, prepared).await;
    let response = finish(tx, outcome).await?;

    tracing::info!(
        created = response.created_obligations.len(),
        "obligation batch created"
    );

    Ok(response)
}

async fn insert_all<T: LedgerTx>(
    tx: &mut T,
    settings: &LedgerSettings,
    prepared: Vec<Prepared>,
) -> AppResult<CreateObligationsBatchResponse> {
    let mut created_obligations = Vec::with_capacity(prepared.len());
    for item in prepared {
        created_obligations.push(insert_one(tx, settings, item).await?);
    }

    Ok(CreateObligationsBatchResponse {
        created_obligations,
    })
}

async fn ensure_tags_exist<T: LedgerTx>(tx: &mut T, tags: &ObligationTags) -> AppResult<()> {
    match tags {
        ObligationTags::Sale { client_id } => {
            if !tx.client_exists(*client_id).await? {
                return Err(AppError::NotFound {
                    entity: "client",
                    id: *client_id,
                });
            }
        }
        ObligationTags::Expense {
            category_id,
            subcategory_id,
            ..
        } => {
            for id in std::iter::once(*category_id).chain(*subcategory_id) {
                if !tx.category_exists(id).await? {
                    return Err(AppError::NotFound {
                        entity: "expense category",
                        id,
                    });
                }
            }
        }
    }
    Ok(())
}

async fn insert_one<T: LedgerTx>(
    tx: &mut T,
    settings: &LedgerSettings,
    item: Prepared,
) -> AppResult<CreatedObligation> {
    let Prepared {
        input,
        currency,
        total,
        amounts,
        paid,
        scenario,
    } = item;

    ensure_tags_exist(tx, &input.tags).await?;

    let created_at = input.created_at.unwrap_or_else(Utc::now);
    let amount_pending = round_money(total - paid);
    let obligation = tx
        .insert_obligation(&ObligationDraft {
            created_at,
            tags: input.tags.clone(),
            total,
            currency: currency.clone(),
            due_date: match scenario {
                PaymentScenario::Full => None,
                PaymentScenario::Partial | PaymentScenario::None => input.due_date,
            },
            amount_pending,
            status: derive_status(amount_pending, total),
            note: input.note.clone(),
        })
        .await?;

    let kind = obligation.kind();
    let transactions = payment_service::insert_transactions(
        tx,
        settings,
        kind,
        obligation.tags.client_id(),
        &currency,
        &input.payment_lines,
        &amounts,
        created_at,
    )
    .await?;

    let mut applications = Vec::with_capacity(transactions.len());
    for transaction in &transactions {
        let application = tx
            .insert_application(&NewPaymentApplication {
                transaction_id: transaction.id,
                kind,
                obligation_id: obligation.id,
                amount_applied: transaction.amount,
                applied_at: created_at,
            })
            .await?;
        applications.push(application);
    }

    tracing::debug!(
        obligation_id = obligation.id,
        kind = ?kind,
        scenario = ?scenario,
        %total,
        %paid,
        "obligation inserted"
    );

    Ok(CreatedObligation {
        obligation,
        scenario,
        transactions,
        applications,
    })
}
