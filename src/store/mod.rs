//! Storage seam for the ledger engine.
//!
//! `LedgerStore` hands out pool-level reads and opens transactions;
//! `LedgerTx` is one atomic unit of work holding a single connection. Every
//! mutating statement of an operation goes through the same `LedgerTx`, one
//! at a time, and the unit ends with exactly one `commit` or `rollback`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::models::{
    account::{AccountBalance, MoneyAccount},
    adjustment::{
        AdjustmentDetail, AdjustmentFilter, AdjustmentListEntry, AdjustmentType,
        AdjustmentWithDetails, FinancialAdjustment, NewAdjustmentDetail, NewAdjustmentType,
        NewFinancialAdjustment, UpdateAdjustmentType,
    },
    exchange::{CurrencyExchange, ExchangeHistoryEntry, NewCurrencyExchange},
    obligation::{
        ClientDebt, Obligation, ObligationDraft, ObligationKind, ObligationStatus,
        ObligationSummary,
    },
    payment::{
        NewPaymentApplication, NewPaymentTransaction, Page, PaymentApplication, PaymentTransaction,
    },
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgLedgerStore;

/// Filter for outstanding (pending > 0, not cancelled) obligations.
#[derive(Debug, Clone, Default)]
pub struct OutstandingFilter {
    /// Client of the sales; ignored for expenses.
    pub client_id: Option<i64>,
    pub currency: Option<String>,
}

/// Pool-level access: read-only queries and transaction start.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Tx: LedgerTx;

    /// Check out a connection and open a transaction on it.
    async fn begin(&self) -> AppResult<Self::Tx>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> AppResult<()>;

    /// Totals of one obligation; `amount_paid` is the sum of its applications.
    async fn obligation_summary(
        &self,
        kind: ObligationKind,
        id: i64,
    ) -> AppResult<Option<ObligationSummary>>;

    /// Outstanding obligations, oldest first, ties broken by ascending id.
    async fn outstanding_obligations(
        &self,
        kind: ObligationKind,
        filter: &OutstandingFilter,
    ) -> AppResult<Vec<Obligation>>;

    /// Clients with outstanding sales, grouped per currency, largest debt
    /// first. Cancelled sales are left out.
    async fn pending_clients(&self, currency: Option<&str>) -> AppResult<Vec<ClientDebt>>;

    async fn account_balance(&self, account_id: i64) -> AppResult<Option<AccountBalance>>;

    async fn account_balances(&self) -> AppResult<Vec<AccountBalance>>;

    /// Payment transactions received from a client, newest first.
    async fn client_payments(&self, client_id: i64, page: Page)
    -> AppResult<Vec<PaymentTransaction>>;

    /// Active exchanges, newest first.
    async fn exchange_history(&self, page: Page) -> AppResult<Vec<ExchangeHistoryEntry>>;

    async fn adjustment_types(&self, only_active: bool) -> AppResult<Vec<AdjustmentType>>;

    async fn insert_adjustment_type(&self, new: &NewAdjustmentType) -> AppResult<AdjustmentType>;

    /// Replace the fields of an adjustment type. Returns `None` when no type
    /// with that id exists.
    async fn update_adjustment_type(
        &self,
        id: i64,
        update: &UpdateAdjustmentType,
    ) -> AppResult<Option<AdjustmentType>>;

    /// Adjustments matching `filter`, newest first.
    async fn adjustments(&self, filter: &AdjustmentFilter) -> AppResult<Vec<AdjustmentListEntry>>;

    async fn adjustment(&self, id: i64) -> AppResult<Option<AdjustmentWithDetails>>;

    /// Flip an ACTIVE adjustment to VOIDED. Returns `None` when no active
    /// adjustment with that id exists.
    async fn void_adjustment(&self, id: i64) -> AppResult<Option<FinancialAdjustment>>;
}

/// One atomic unit of work.
///
/// Dropping a `LedgerTx` without calling `commit` discards its writes.
#[async_trait]
pub trait LedgerTx: Send {
    async fn find_active_account_by_name(&mut self, name: &str) -> AppResult<Option<MoneyAccount>>;

    async fn find_account(&mut self, id: i64) -> AppResult<Option<MoneyAccount>>;

    /// Lock the account row and read its balance, serializing concurrent
    /// withdrawals from the same account.
    async fn lock_account_balance(&mut self, id: i64) -> AppResult<Option<AccountBalance>>;

    async fn client_exists(&mut self, id: i64) -> AppResult<bool>;

    async fn category_exists(&mut self, id: i64) -> AppResult<bool>;

    /// Read one obligation and lock it for the balance update.
    async fn lock_obligation(&mut self, kind: ObligationKind, id: i64)
    -> AppResult<Option<Obligation>>;

    /// Outstanding obligations locked for update, oldest first, ties broken
    /// by ascending id.
    async fn lock_outstanding(
        &mut self,
        kind: ObligationKind,
        filter: &OutstandingFilter,
    ) -> AppResult<Vec<Obligation>>;

    async fn insert_obligation(&mut self, draft: &ObligationDraft) -> AppResult<Obligation>;

    async fn update_obligation_balance(
        &mut self,
        kind: ObligationKind,
        id: i64,
        amount_pending: Decimal,
        status: ObligationStatus,
    ) -> AppResult<()>;

    async fn insert_payment_transaction(
        &mut self,
        new: &NewPaymentTransaction,
    ) -> AppResult<PaymentTransaction>;

    async fn insert_application(
        &mut self,
        new: &NewPaymentApplication,
    ) -> AppResult<PaymentApplication>;

    async fn insert_exchange(&mut self, new: &NewCurrencyExchange) -> AppResult<CurrencyExchange>;

    async fn find_adjustment_type(&mut self, id: i64) -> AppResult<Option<AdjustmentType>>;

    async fn insert_adjustment(
        &mut self,
        new: &NewFinancialAdjustment,
    ) -> AppResult<FinancialAdjustment>;

    async fn insert_adjustment_detail(
        &mut self,
        adjustment_id: i64,
        detail: &NewAdjustmentDetail,
        applied_at: DateTime<Utc>,
    ) -> AppResult<AdjustmentDetail>;

    async fn commit(self) -> AppResult<()>;

    async fn rollback(self) -> AppResult<()>;
}

/// End an atomic unit: commit on success, roll back on failure.
///
/// The original error is always what the caller sees; a failing rollback is
/// only logged, since the store discards the transaction on disconnect anyway.
pub async fn finish<T, R>(tx: T, outcome: AppResult<R>) -> AppResult<R>
where
    T: LedgerTx,
    R: Send,
{
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            tracing::debug!(error = %err, kind = ?err.kind(), "transaction rolled back");
            Err(err)
        }
    }
}

/// `NotFound` for an obligation.
pub fn obligation_not_found(kind: ObligationKind, id: i64) -> AppError {
    AppError::NotFound {
        entity: kind.entity(),
        id,
    }
}
