//! Financial adjustments and their types.
//!
//! An adjustment is money booked outside the sale/expense flow, such as a
//! bank fee bonification. Its detail lines tie it to sales or expenses for
//! reporting; they never change an obligation's pending amount. Voiding an
//! adjustment removes it from account balances and leaves obligations as
//! they are.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    config::LedgerSettings,
    error::{AppError, AppResult},
    models::{
        adjustment::{
            AdjustmentFilter, AdjustmentListEntry, AdjustmentType, AdjustmentWithDetails,
            CreateAdjustmentRequest, FinancialAdjustment, NewAdjustmentDetail, NewAdjustmentType,
            NewFinancialAdjustment, UpdateAdjustmentType,
        },
        money::{check_amount, round_money, sum_money},
        obligation::{ObligationKind, ObligationStatus},
    },
    store::{LedgerStore, LedgerTx, finish, obligation_not_found},
};

/// Largest accepted gap between the detail sum and the adjustment amount.
const DETAIL_TOLERANCE: Decimal = dec!(0.01);

pub async fn list_adjustment_types<S: LedgerStore>(
    store: &S,
    include_inactive: bool,
) -> AppResult<Vec<AdjustmentType>> {
    store.adjustment_types(!include_inactive).await
}

/// Upper-cased code and trimmed description of an adjustment type.
fn type_fields(code: &str, description: &str) -> AppResult<(String, String)> {
    let code = code.trim().to_uppercase();
    let description = description.trim().to_string();

    let mut errors = Vec::new();
    if code.is_empty() {
        errors.push("code must not be empty".to_string());
    }
    if description.is_empty() {
        errors.push("description must not be empty".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok((code, description))
}

/// Create an adjustment type. The code is stored upper-cased.
pub async fn create_adjustment_type<S: LedgerStore>(
    store: &S,
    new: NewAdjustmentType,
) -> AppResult<AdjustmentType> {
    let (code, description) = type_fields(&new.code, &new.description)?;
    let new = NewAdjustmentType {
        code,
        description,
        nature: new.nature,
    };

    let created = store.insert_adjustment_type(&new).await?;
    tracing::info!(type_id = created.id, code = %created.code, "adjustment type created");

    Ok(created)
}

/// Replace an adjustment type's code, description, nature and active flag.
///
/// Deactivating a type stops new adjustments from using it; existing
/// adjustments keep it.
///
/// # Errors
///
/// - `Validation`: empty code or description
/// - `NotFound`: unknown type
/// - `BusinessRule`: code taken by another type
pub async fn update_adjustment_type<S: LedgerStore>(
    store: &S,
    id: i64,
    update: UpdateAdjustmentType,
) -> AppResult<AdjustmentType> {
    let (code, description) = type_fields(&update.code, &update.description)?;
    let update = UpdateAdjustmentType {
        code,
        description,
        ..update
    };

    let updated = store
        .update_adjustment_type(id, &update)
        .await?
        .ok_or(AppError::NotFound {
            entity: "adjustment type",
            id,
        })?;
    tracing::info!(
        type_id = id,
        code = %updated.code,
        active = updated.active,
        "adjustment type updated"
    );

    Ok(updated)
}

/// Adjustments matching the filter, newest first.
///
/// # Errors
///
/// `Validation` for an unsupported currency or a `from` day after `to`.
pub async fn list_adjustments<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    filter: AdjustmentFilter,
) -> AppResult<Vec<AdjustmentListEntry>> {
    let mut errors = Vec::new();

    let currency = filter.currency.map(|c| c.trim().to_uppercase());
    if let Some(message) = currency
        .as_deref()
        .and_then(|c| settings.check_currency("currency", c))
    {
        errors.push(message);
    }
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            errors.push(format!("from ({from}) must not be after to ({to})"));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    store
        .adjustments(&AdjustmentFilter {
            currency,
            ..filter
        })
        .await
}

/// The obligation a detail line points at.
fn detail_target(detail: &NewAdjustmentDetail) -> Option<(ObligationKind, i64)> {
    match (detail.sale_id, detail.expense_id) {
        (Some(id), None) => Some((ObligationKind::Sale, id)),
        (None, Some(id)) => Some((ObligationKind::Expense, id)),
        _ => None,
    }
}

fn validate(request: &CreateAdjustmentRequest, settings: &LedgerSettings) -> AppResult<String> {
    let mut errors = Vec::new();

    let amount = check_amount("amount", request.amount, &mut errors);
    let currency = request.currency.trim().to_uppercase();
    if let Some(message) = settings.check_currency("currency", &currency) {
        errors.push(message);
    }
    if request.details.is_empty() {
        errors.push("details must contain at least one line".to_string());
    }

    for (i, detail) in request.details.iter().enumerate() {
        if detail_target(detail).is_none() {
            errors.push(format!(
                "details[{i}] must reference exactly one of sale_id or expense_id"
            ));
        }
        check_amount(
            &format!("details[{i}].amount_applied"),
            detail.amount_applied,
            &mut errors,
        );
        if let Some(percentage) = detail.percentage {
            if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                errors.push(format!("details[{i}].percentage must be between 0 and 100"));
            }
        }
        if let Some(base) = detail.calculation_base {
            check_amount(&format!("details[{i}].calculation_base"), base, &mut errors);
        }
    }

    if !request.details.is_empty() {
        let detail_sum = sum_money(request.details.iter().map(|d| round_money(d.amount_applied)))
            .ok()
            .and_then(|sum| sum.checked_sub(amount).map(|gap| (sum, gap)));
        match detail_sum {
            Some((sum, gap)) if gap.abs() > DETAIL_TOLERANCE => errors.push(format!(
                "details sum {sum} does not match the adjustment amount {amount}"
            )),
            Some(_) => {}
            None => errors.push("details sum is out of range".to_string()),
        }
    }

    if errors.is_empty() {
        Ok(currency)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Create a financial adjustment with its detail lines.
///
/// # Errors
///
/// - `Validation`: malformed amounts, details or currency
/// - `NotFound`: unknown type, account, sale or expense
/// - `BusinessRule`: inactive type or account, account in another currency,
///   detail pointing at a cancelled sale
#[tracing::instrument(skip_all, fields(type_id = request.type_id))]
pub async fn create_adjustment<S: LedgerStore>(
    store: &S,
    settings: &LedgerSettings,
    request: CreateAdjustmentRequest,
) -> AppResult<AdjustmentWithDetails> {
    let currency = validate(&request, settings)?;

    let mut tx = store.begin().await?;
    let outcome = insert_adjustment(&mut tx, &request, currency).await;
    let created = finish(tx, outcome).await?;

    tracing::info!(
        adjustment_id = created.adjustment.id,
        amount = %created.adjustment.amount,
        currency = %created.adjustment.currency,
        details = created.details.len(),
        "financial adjustment created"
    );

    Ok(created)
}

async fn insert_adjustment<T: LedgerTx>(
    tx: &mut T,
    request: &CreateAdjustmentRequest,
    currency: String,
) -> AppResult<AdjustmentWithDetails> {
    let adjustment_type = tx
        .find_adjustment_type(request.type_id)
        .await?
        .ok_or(AppError::NotFound {
            entity: "adjustment type",
            id: request.type_id,
        })?;
    if !adjustment_type.active {
        return Err(AppError::rule(format!(
            "Adjustment type {} is inactive",
            adjustment_type.code
        )));
    }

    if let Some(account_id) = request.account_id {
        let account = tx.find_account(account_id).await?.ok_or(AppError::NotFound {
            entity: "money account",
            id: account_id,
        })?;
        if !account.active {
            return Err(AppError::rule(format!("Money account {} is inactive", account.name)));
        }
        if account.currency != currency {
            return Err(AppError::rule(format!(
                "Money account {} holds {}, adjustment is in {currency}",
                account.name, account.currency
            )));
        }
    }

    for (kind, id) in request.details.iter().filter_map(detail_target) {
        let obligation = tx
            .lock_obligation(kind, id)
            .await?
            .ok_or_else(|| obligation_not_found(kind, id))?;
        if obligation.status == ObligationStatus::Cancelled {
            return Err(AppError::rule(format!(
                "{} {id} is cancelled",
                kind.entity()
            )));
        }
    }

    let created_at = request.created_at.unwrap_or_else(Utc::now);
    let adjustment = tx
        .insert_adjustment(&NewFinancialAdjustment {
            created_at,
            type_id: adjustment_type.id,
            amount: round_money(request.amount),
            currency,
            account_id: request.account_id,
            reference: request.reference.clone(),
            note: request.note.clone(),
        })
        .await?;

    let mut details = Vec::with_capacity(request.details.len());
    for detail in &request.details {
        let detail = NewAdjustmentDetail {
            amount_applied: round_money(detail.amount_applied),
            ..detail.clone()
        };
        details.push(
            tx.insert_adjustment_detail(adjustment.id, &detail, created_at)
                .await?,
        );
    }

    Ok(AdjustmentWithDetails {
        adjustment,
        details,
    })
}

pub async fn get_adjustment<S: LedgerStore>(store: &S, id: i64) -> AppResult<AdjustmentWithDetails> {
    store.adjustment(id).await?.ok_or(AppError::NotFound {
        entity: "financial adjustment",
        id,
    })
}

/// Void an active adjustment. One-way: a voided adjustment stays voided.
pub async fn void_adjustment<S: LedgerStore>(store: &S, id: i64) -> AppResult<FinancialAdjustment> {
    if let Some(voided) = store.void_adjustment(id).await? {
        tracing::info!(adjustment_id = id, "financial adjustment voided");
        return Ok(voided);
    }

    match store.adjustment(id).await? {
        Some(_) => Err(AppError::rule(format!(
            "Financial adjustment {id} is already voided"
        ))),
        None => Err(AppError::NotFound {
            entity: "financial adjustment",
            id,
        }),
    }
}
