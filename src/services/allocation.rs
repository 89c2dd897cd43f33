//! Payment allocation engine.
//!
//! Allocation is pure: it takes the line amounts of a payment and the
//! obligations it may settle, and returns a plan. The coordinator turns the
//! plan into rows.
//!
//! Lines are consumed in request order and obligations in the order given
//! (oldest first for FIFO). When one obligation takes money from several
//! lines, or one line spreads over several obligations, each planned
//! application names the line it draws from, so the persisted application
//! rows link the exact transaction carrying the money.
//!
//! Every subtraction is rounded to cents immediately.

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        money::{round_money, sum_money},
        obligation::{Obligation, ObligationStatus},
        payment::ObligationUpdate,
    },
    services::ledger_reader::derive_status,
};

/// One application row to write: `amount` of line `line_index` credited to
/// `obligation_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedApplication {
    pub line_index: usize,
    pub obligation_id: i64,
    pub amount: Decimal,
}

/// Result of an allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub applications: Vec<PlannedApplication>,
    /// One entry per obligation that received money, in allocation order.
    pub updates: Vec<ObligationUpdate>,
    pub total_paid: Decimal,
    pub total_applied: Decimal,
    /// Money that reached no obligation. Only FIFO can leave any.
    pub unapplied: Decimal,
}

#[cfg(test)]
impl Allocation {
    /// Amount credited to one obligation, zero if untouched.
    pub fn applied_to(&self, obligation_id: i64) -> Decimal {
        self.applications
            .iter()
            .filter(|a| a.obligation_id == obligation_id)
            .map(|a| a.amount)
            .sum()
    }
}

/// FIFO allocation over `obligations`, which must already be sorted oldest
/// first with ties broken by id.
///
/// Each obligation takes `min(remaining, pending)`. Whatever remains once
/// the obligations are exhausted is reported as `unapplied` and not
/// credited anywhere.
///
/// # Errors
///
/// `Validation` when the line amounts do not fit in a `Decimal` together.
pub fn allocate_fifo(line_amounts: &[Decimal], obligations: &[Obligation]) -> AppResult<Allocation> {
    allocate(line_amounts, obligations)
}

/// DIRECT allocation: the whole payment goes to `obligation`.
///
/// # Errors
///
/// `BusinessRule` when the obligation is cancelled, already paid, or the
/// payment exceeds its pending amount. Nothing is planned in that case.
/// `Validation` when the line amounts do not fit in a `Decimal` together.
pub fn allocate_direct(line_amounts: &[Decimal], obligation: &Obligation) -> AppResult<Allocation> {
    let entity = obligation.kind().entity();

    if obligation.status == ObligationStatus::Cancelled {
        return Err(AppError::rule(format!(
            "Cannot pay {entity} {}: it is cancelled",
            obligation.id
        )));
    }
    if obligation.amount_pending <= Decimal::ZERO {
        return Err(AppError::rule(format!(
            "{entity} {} is already fully paid",
            obligation.id
        )));
    }

    let total = sum_money(line_amounts.iter().copied().map(round_money))?;
    if total > obligation.amount_pending {
        return Err(AppError::rule(format!(
            "Payment of {total} exceeds the pending amount {} of {entity} {}",
            obligation.amount_pending, obligation.id
        )));
    }

    allocate(line_amounts, std::slice::from_ref(obligation))
}

fn allocate(line_amounts: &[Decimal], obligations: &[Obligation]) -> AppResult<Allocation> {
    let mut left: Vec<Decimal> = line_amounts.iter().copied().map(round_money).collect();
    let total_paid = sum_money(left.iter().copied())?;
    let mut line = 0;
    let mut remaining = total_paid;

    let mut applications = Vec::new();
    let mut updates = Vec::new();

    for obligation in obligations {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take = remaining.min(obligation.amount_pending);
        if take <= Decimal::ZERO {
            continue;
        }

        // spread `take` over the lines, oldest line first
        let mut need = take;
        while need > Decimal::ZERO && line < left.len() {
            let part = need.min(left[line]);
            if part > Decimal::ZERO {
                applications.push(PlannedApplication {
                    line_index: line,
                    obligation_id: obligation.id,
                    amount: part,
                });
                need = round_money(need - part);
                left[line] = round_money(left[line] - part);
            }
            if left[line] <= Decimal::ZERO {
                line += 1;
            }
        }

        remaining = round_money(remaining - take);
        let new_pending = round_money(obligation.amount_pending - take);
        tracing::debug!(
            obligation_id = obligation.id,
            %take,
            %new_pending,
            "allocated"
        );

        updates.push(ObligationUpdate {
            kind: obligation.kind(),
            obligation_id: obligation.id,
            previous_pending: obligation.amount_pending,
            amount_applied: take,
            new_pending,
            new_status: derive_status(new_pending, obligation.total),
        });
    }

    let total_applied = sum_money(updates.iter().map(|u| u.amount_applied))?;

    Ok(Allocation {
        applications,
        updates,
        total_paid,
        total_applied,
        unapplied: round_money(total_paid - total_applied),
    })
}
