//! In-memory ledger store for unit tests.
//!
//! Each transaction works on a private copy of the state and publishes it on
//! commit, so a rolled back (or dropped) transaction leaves no trace. Fail
//! points let a test break the n-th write of a transaction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{LedgerStore, LedgerTx, OutstandingFilter};
use crate::error::{AppError, AppResult};
use crate::models::{
    RecordState,
    account::{AccountBalance, MoneyAccount},
    adjustment::{
        AdjustmentDetail, AdjustmentFilter, AdjustmentListEntry, AdjustmentNature,
        AdjustmentType, AdjustmentWithDetails, FinancialAdjustment, NewAdjustmentDetail,
        NewAdjustmentType, NewFinancialAdjustment, UpdateAdjustmentType,
    },
    exchange::{CurrencyExchange, ExchangeHistoryEntry, NewCurrencyExchange},
    money::round_money,
    obligation::{
        ClientDebt, Obligation, ObligationDraft, ObligationKind, ObligationStatus,
        ObligationSummary, ObligationTags,
    },
    payment::{
        NewPaymentApplication, NewPaymentTransaction, Page, PaymentApplication, PaymentDirection,
        PaymentTransaction,
    },
};

/// Timestamp `day` days after 2025-01-01T00:00:00Z.
pub fn ts(day: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_735_689_600 + day * 86_400, 0).unwrap()
}

/// Write that should fail inside a transaction, counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Obligation(usize),
    Transaction(usize),
    Application(usize),
    Exchange(usize),
    AdjustmentDetail(usize),
}

#[derive(Debug, Clone)]
pub struct StoredAccount {
    pub account: MoneyAccount,
    pub opening_balance: Decimal,
}

/// Everything the store holds. Ids come from one shared sequence.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub accounts: Vec<StoredAccount>,
    /// Client names by id.
    pub clients: BTreeMap<i64, String>,
    pub categories: Vec<i64>,
    pub sales: BTreeMap<i64, Obligation>,
    pub expenses: BTreeMap<i64, Obligation>,
    pub transactions: Vec<PaymentTransaction>,
    pub applications: Vec<PaymentApplication>,
    pub exchanges: Vec<CurrencyExchange>,
    pub adjustment_types: Vec<AdjustmentType>,
    pub adjustments: Vec<FinancialAdjustment>,
    pub details: Vec<AdjustmentDetail>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn obligations(&self, kind: ObligationKind) -> &BTreeMap<i64, Obligation> {
        match kind {
            ObligationKind::Sale => &self.sales,
            ObligationKind::Expense => &self.expenses,
        }
    }

    fn obligations_mut(&mut self, kind: ObligationKind) -> &mut BTreeMap<i64, Obligation> {
        match kind {
            ObligationKind::Sale => &mut self.sales,
            ObligationKind::Expense => &mut self.expenses,
        }
    }

    pub fn obligation(&self, kind: ObligationKind, id: i64) -> Option<&Obligation> {
        self.obligations(kind).get(&id)
    }

    /// Sum of active applications credited to one obligation.
    pub fn applied_to(&self, kind: ObligationKind, id: i64) -> Decimal {
        let total = self
            .applications
            .iter()
            .filter(|a| a.kind == kind && a.obligation_id == id)
            .filter(|a| {
                self.transactions
                    .iter()
                    .any(|t| t.id == a.transaction_id && t.state == RecordState::Active)
            })
            .map(|a| a.amount_applied)
            .sum();
        round_money(total)
    }

    fn outstanding(&self, kind: ObligationKind, filter: &OutstandingFilter) -> Vec<Obligation> {
        let mut rows: Vec<Obligation> = self
            .obligations(kind)
            .values()
            .filter(|o| o.amount_pending > Decimal::ZERO && o.status != ObligationStatus::Cancelled)
            .filter(|o| match (kind, filter.client_id) {
                (ObligationKind::Sale, Some(client_id)) => o.tags.client_id() == Some(client_id),
                _ => true,
            })
            .filter(|o| filter.currency.as_deref().is_none_or(|c| o.currency == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rows
    }

    pub fn balance(&self, account_id: i64) -> Option<AccountBalance> {
        let stored = self.accounts.iter().find(|a| a.account.id == account_id)?;
        let mut balance = stored.opening_balance;

        for t in self.transactions.iter().filter(|t| t.state == RecordState::Active) {
            if t.account_id == account_id {
                match t.direction {
                    PaymentDirection::Incoming => balance += t.amount,
                    PaymentDirection::Outgoing => balance -= t.amount,
                }
            }
        }
        for e in self.exchanges.iter().filter(|e| e.state == RecordState::Active) {
            if e.origin_account_id == account_id {
                balance -= e.amount_origin;
            }
            if e.destination_account_id == account_id {
                balance += e.amount_destination;
            }
        }
        for adj in self.adjustments.iter().filter(|a| a.state == RecordState::Active) {
            if adj.account_id != Some(account_id) {
                continue;
            }
            let nature = self
                .adjustment_types
                .iter()
                .find(|t| t.id == adj.type_id)
                .map(|t| t.nature);
            match nature {
                Some(AdjustmentNature::Income) => balance += adj.amount,
                Some(AdjustmentNature::Outflow) => balance -= adj.amount,
                None => {}
            }
        }

        Some(AccountBalance {
            account_id,
            name: stored.account.name.clone(),
            currency: stored.account.currency.clone(),
            active: stored.account.active,
            balance: round_money(balance),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
    fail_point: Arc<Mutex<Option<FailPoint>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Copy of the committed state.
    pub fn state(&self) -> MemoryState {
        self.lock().clone()
    }

    pub fn fail_at(&self, point: FailPoint) {
        *self.fail_point.lock().unwrap() = Some(point);
    }

    pub fn add_account(&self, name: &str, currency: &str, opening_balance: Decimal) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.accounts.push(StoredAccount {
            account: MoneyAccount {
                id,
                name: name.to_string(),
                currency: currency.to_string(),
                active: true,
            },
            opening_balance,
        });
        id
    }

    pub fn deactivate_account(&self, id: i64) {
        let mut state = self.lock();
        if let Some(stored) = state.accounts.iter_mut().find(|a| a.account.id == id) {
            stored.account.active = false;
        }
    }

    pub fn add_client(&self) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.clients.insert(id, format!("client {id}"));
        id
    }

    pub fn add_named_client(&self, name: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.clients.insert(id, name.to_string());
        id
    }

    pub fn add_category(&self) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.categories.push(id);
        id
    }

    fn add_obligation(
        &self,
        tags: ObligationTags,
        total: Decimal,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        let kind = tags.kind();
        state.obligations_mut(kind).insert(
            id,
            Obligation {
                id,
                created_at,
                tags,
                total,
                currency: currency.to_string(),
                due_date: None,
                amount_pending: total,
                status: ObligationStatus::Pending,
            },
        );
        id
    }

    /// Unpaid sale of `total`.
    pub fn add_sale(
        &self,
        client_id: i64,
        total: Decimal,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        self.add_obligation(ObligationTags::Sale { client_id }, total, currency, created_at)
    }

    /// Unpaid expense of `total`.
    pub fn add_expense(
        &self,
        category_id: i64,
        total: Decimal,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let tags = ObligationTags::Expense {
            category_id,
            subcategory_id: None,
            supplier: None,
        };
        self.add_obligation(tags, total, currency, created_at)
    }

    pub fn set_status(&self, kind: ObligationKind, id: i64, status: ObligationStatus) {
        let mut state = self.lock();
        if let Some(obligation) = state.obligations_mut(kind).get_mut(&id) {
            obligation.status = status;
        }
    }

    pub fn add_adjustment_type(&self, code: &str, nature: AdjustmentNature, active: bool) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.adjustment_types.push(AdjustmentType {
            id,
            code: code.to_string(),
            description: code.to_lowercase(),
            nature,
            active,
            created_at: ts(0),
        });
        id
    }
}

pub struct MemoryLedgerTx {
    shared: Arc<Mutex<MemoryState>>,
    work: MemoryState,
    fail_point: Option<FailPoint>,
    writes: BTreeMap<&'static str, usize>,
}

impl MemoryLedgerTx {
    /// Count a write and fail it if it hits the configured fail point.
    fn write(&mut self, what: &'static str) -> AppResult<()> {
        let count = self.writes.entry(what).or_default();
        *count += 1;
        let nth = *count;

        let hit = match self.fail_point {
            Some(FailPoint::Obligation(n)) => what == "obligation" && n == nth,
            Some(FailPoint::Transaction(n)) => what == "transaction" && n == nth,
            Some(FailPoint::Application(n)) => what == "application" && n == nth,
            Some(FailPoint::Exchange(n)) => what == "exchange" && n == nth,
            Some(FailPoint::AdjustmentDetail(n)) => what == "adjustment_detail" && n == nth,
            None => false,
        };
        if hit {
            return Err(AppError::Database(sqlx::Error::Protocol(format!(
                "injected failure on {what} #{nth}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Tx = MemoryLedgerTx;

    async fn begin(&self) -> AppResult<MemoryLedgerTx> {
        Ok(MemoryLedgerTx {
            shared: Arc::clone(&self.state),
            work: self.state(),
            fail_point: *self.fail_point.lock().unwrap(),
            writes: BTreeMap::new(),
        })
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn obligation_summary(
        &self,
        kind: ObligationKind,
        id: i64,
    ) -> AppResult<Option<ObligationSummary>> {
        let state = self.lock();
        Ok(state.obligation(kind, id).map(|o| ObligationSummary {
            kind,
            id,
            currency: o.currency.clone(),
            total: o.total,
            amount_paid: state.applied_to(kind, id),
            amount_pending: o.amount_pending,
            status: o.status,
        }))
    }

    async fn outstanding_obligations(
        &self,
        kind: ObligationKind,
        filter: &OutstandingFilter,
    ) -> AppResult<Vec<Obligation>> {
        Ok(self.lock().outstanding(kind, filter))
    }

    async fn pending_clients(&self, currency: Option<&str>) -> AppResult<Vec<ClientDebt>> {
        let state = self.lock();
        let mut grouped: BTreeMap<(i64, String), (Decimal, i64)> = BTreeMap::new();
        for sale in state
            .sales
            .values()
            .filter(|s| s.amount_pending > Decimal::ZERO && s.status != ObligationStatus::Cancelled)
            .filter(|s| currency.is_none_or(|c| s.currency == c))
        {
            let Some(client_id) = sale.tags.client_id() else {
                continue;
            };
            let entry = grouped
                .entry((client_id, sale.currency.clone()))
                .or_insert((Decimal::ZERO, 0));
            entry.0 += sale.amount_pending;
            entry.1 += 1;
        }

        let mut debts: Vec<ClientDebt> = grouped
            .into_iter()
            .map(|((client_id, currency), (amount_pending, pending_sales))| ClientDebt {
                client_id,
                client_name: state.clients.get(&client_id).cloned().unwrap_or_default(),
                currency,
                amount_pending: round_money(amount_pending),
                pending_sales,
            })
            .collect();
        debts.sort_by(|a, b| {
            b.amount_pending
                .cmp(&a.amount_pending)
                .then(a.client_id.cmp(&b.client_id))
                .then(a.currency.cmp(&b.currency))
        });
        Ok(debts)
    }

    async fn account_balance(&self, account_id: i64) -> AppResult<Option<AccountBalance>> {
        Ok(self.lock().balance(account_id))
    }

    async fn account_balances(&self) -> AppResult<Vec<AccountBalance>> {
        let state = self.lock();
        let mut balances: Vec<AccountBalance> = state
            .accounts
            .iter()
            .filter_map(|a| state.balance(a.account.id))
            .collect();
        balances.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(balances)
    }

    async fn client_payments(
        &self,
        client_id: i64,
        page: Page,
    ) -> AppResult<Vec<PaymentTransaction>> {
        let mut rows: Vec<PaymentTransaction> = self
            .lock()
            .transactions
            .iter()
            .filter(|t| t.client_id == Some(client_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn exchange_history(&self, page: Page) -> AppResult<Vec<ExchangeHistoryEntry>> {
        let state = self.lock();
        let name_of = |id: i64| {
            state
                .accounts
                .iter()
                .find(|a| a.account.id == id)
                .map(|a| a.account.name.clone())
                .unwrap_or_default()
        };
        let mut rows: Vec<ExchangeHistoryEntry> = state
            .exchanges
            .iter()
            .filter(|e| e.state == RecordState::Active)
            .map(|e| ExchangeHistoryEntry {
                exchange: e.clone(),
                origin_account_name: name_of(e.origin_account_id),
                destination_account_name: name_of(e.destination_account_id),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.exchange
                .created_at
                .cmp(&a.exchange.created_at)
                .then(b.exchange.id.cmp(&a.exchange.id))
        });
        Ok(rows
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn adjustment_types(&self, only_active: bool) -> AppResult<Vec<AdjustmentType>> {
        let mut types: Vec<AdjustmentType> = self
            .lock()
            .adjustment_types
            .iter()
            .filter(|t| !only_active || t.active)
            .cloned()
            .collect();
        types.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(types)
    }

    async fn insert_adjustment_type(&self, new: &NewAdjustmentType) -> AppResult<AdjustmentType> {
        let mut state = self.lock();
        if state.adjustment_types.iter().any(|t| t.code == new.code) {
            return Err(AppError::rule(format!(
                "Adjustment type code '{}' already exists",
                new.code
            )));
        }
        let inserted = AdjustmentType {
            id: state.next_id(),
            code: new.code.clone(),
            description: new.description.clone(),
            nature: new.nature,
            active: true,
            created_at: Utc::now(),
        };
        state.adjustment_types.push(inserted.clone());
        Ok(inserted)
    }

    async fn update_adjustment_type(
        &self,
        id: i64,
        update: &UpdateAdjustmentType,
    ) -> AppResult<Option<AdjustmentType>> {
        let mut state = self.lock();
        if state
            .adjustment_types
            .iter()
            .any(|t| t.id != id && t.code == update.code)
        {
            return Err(AppError::rule(format!(
                "Adjustment type code '{}' already exists",
                update.code
            )));
        }
        let updated = state.adjustment_types.iter_mut().find(|t| t.id == id);
        Ok(updated.map(|t| {
            t.code = update.code.clone();
            t.description = update.description.clone();
            t.nature = update.nature;
            t.active = update.active;
            t.clone()
        }))
    }

    async fn adjustments(&self, filter: &AdjustmentFilter) -> AppResult<Vec<AdjustmentListEntry>> {
        let state = self.lock();
        let mut entries: Vec<AdjustmentListEntry> = state
            .adjustments
            .iter()
            .filter(|a| filter.type_id.is_none_or(|id| a.type_id == id))
            .filter(|a| filter.from.is_none_or(|d| a.created_at.date_naive() >= d))
            .filter(|a| filter.to.is_none_or(|d| a.created_at.date_naive() <= d))
            .filter(|a| filter.state.is_none_or(|s| a.state == s))
            .filter(|a| filter.currency.as_deref().is_none_or(|c| a.currency == c))
            .filter_map(|a| {
                let ty = state.adjustment_types.iter().find(|t| t.id == a.type_id)?;
                let account_name = a.account_id.and_then(|id| {
                    state
                        .accounts
                        .iter()
                        .find(|s| s.account.id == id)
                        .map(|s| s.account.name.clone())
                });
                Some(AdjustmentListEntry {
                    adjustment: a.clone(),
                    type_code: ty.code.clone(),
                    type_description: ty.description.clone(),
                    type_nature: ty.nature,
                    account_name,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.adjustment
                .created_at
                .cmp(&a.adjustment.created_at)
                .then(b.adjustment.id.cmp(&a.adjustment.id))
        });
        Ok(entries)
    }

    async fn adjustment(&self, id: i64) -> AppResult<Option<AdjustmentWithDetails>> {
        let state = self.lock();
        Ok(state
            .adjustments
            .iter()
            .find(|a| a.id == id)
            .map(|adjustment| AdjustmentWithDetails {
                adjustment: adjustment.clone(),
                details: state
                    .details
                    .iter()
                    .filter(|d| d.adjustment_id == id)
                    .cloned()
                    .collect(),
            }))
    }

    async fn void_adjustment(&self, id: i64) -> AppResult<Option<FinancialAdjustment>> {
        let mut state = self.lock();
        let adjustment = state
            .adjustments
            .iter_mut()
            .find(|a| a.id == id && a.state == RecordState::Active);
        Ok(adjustment.map(|a| {
            a.state = RecordState::Voided;
            a.clone()
        }))
    }
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn find_active_account_by_name(&mut self, name: &str) -> AppResult<Option<MoneyAccount>> {
        Ok(self
            .work
            .accounts
            .iter()
            .find(|a| a.account.name == name && a.account.active)
            .map(|a| a.account.clone()))
    }

    async fn find_account(&mut self, id: i64) -> AppResult<Option<MoneyAccount>> {
        Ok(self
            .work
            .accounts
            .iter()
            .find(|a| a.account.id == id)
            .map(|a| a.account.clone()))
    }

    async fn lock_account_balance(&mut self, id: i64) -> AppResult<Option<AccountBalance>> {
        Ok(self.work.balance(id))
    }

    async fn client_exists(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.work.clients.contains_key(&id))
    }

    async fn category_exists(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.work.categories.contains(&id))
    }

    async fn lock_obligation(
        &mut self,
        kind: ObligationKind,
        id: i64,
    ) -> AppResult<Option<Obligation>> {
        Ok(self.work.obligation(kind, id).cloned())
    }

    async fn lock_outstanding(
        &mut self,
        kind: ObligationKind,
        filter: &OutstandingFilter,
    ) -> AppResult<Vec<Obligation>> {
        Ok(self.work.outstanding(kind, filter))
    }

    async fn insert_obligation(&mut self, draft: &ObligationDraft) -> AppResult<Obligation> {
        self.write("obligation")?;
        let id = self.work.next_id();
        let obligation = Obligation {
            id,
            created_at: draft.created_at,
            tags: draft.tags.clone(),
            total: draft.total,
            currency: draft.currency.clone(),
            due_date: draft.due_date,
            amount_pending: draft.amount_pending,
            status: draft.status,
        };
        self.work
            .obligations_mut(draft.tags.kind())
            .insert(id, obligation.clone());
        Ok(obligation)
    }

    async fn update_obligation_balance(
        &mut self,
        kind: ObligationKind,
        id: i64,
        amount_pending: Decimal,
        status: ObligationStatus,
    ) -> AppResult<()> {
        let obligation = self
            .work
            .obligations_mut(kind)
            .get_mut(&id)
            .ok_or_else(|| super::obligation_not_found(kind, id))?;
        obligation.amount_pending = amount_pending;
        obligation.status = status;
        Ok(())
    }

    async fn insert_payment_transaction(
        &mut self,
        new: &NewPaymentTransaction,
    ) -> AppResult<PaymentTransaction> {
        self.write("transaction")?;
        let transaction = PaymentTransaction {
            id: self.work.next_id(),
            created_at: new.created_at,
            direction: new.direction,
            client_id: new.client_id,
            amount: new.amount,
            currency: new.currency.clone(),
            method: new.method,
            reference: new.reference.clone(),
            note: new.note.clone(),
            account_id: new.account_id,
            state: RecordState::Active,
        };
        self.work.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn insert_application(
        &mut self,
        new: &NewPaymentApplication,
    ) -> AppResult<PaymentApplication> {
        self.write("application")?;
        let application = PaymentApplication {
            id: self.work.next_id(),
            transaction_id: new.transaction_id,
            kind: new.kind,
            obligation_id: new.obligation_id,
            amount_applied: new.amount_applied,
            applied_at: new.applied_at,
        };
        self.work.applications.push(application.clone());
        Ok(application)
    }

    async fn insert_exchange(&mut self, new: &NewCurrencyExchange) -> AppResult<CurrencyExchange> {
        self.write("exchange")?;
        let exchange = CurrencyExchange {
            id: self.work.next_id(),
            created_at: Utc::now(),
            origin_account_id: new.origin_account_id,
            destination_account_id: new.destination_account_id,
            amount_origin: new.amount_origin,
            currency_origin: new.currency_origin.clone(),
            amount_destination: new.amount_destination,
            currency_destination: new.currency_destination.clone(),
            conversion_factor: new.conversion_factor,
            note: new.note.clone(),
            state: RecordState::Active,
        };
        self.work.exchanges.push(exchange.clone());
        Ok(exchange)
    }

    async fn find_adjustment_type(&mut self, id: i64) -> AppResult<Option<AdjustmentType>> {
        Ok(self
            .work
            .adjustment_types
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn insert_adjustment(
        &mut self,
        new: &NewFinancialAdjustment,
    ) -> AppResult<FinancialAdjustment> {
        self.write("adjustment")?;
        let adjustment = FinancialAdjustment {
            id: self.work.next_id(),
            created_at: new.created_at,
            type_id: new.type_id,
            amount: new.amount,
            currency: new.currency.clone(),
            account_id: new.account_id,
            reference: new.reference.clone(),
            note: new.note.clone(),
            state: RecordState::Active,
        };
        self.work.adjustments.push(adjustment.clone());
        Ok(adjustment)
    }

    async fn insert_adjustment_detail(
        &mut self,
        adjustment_id: i64,
        detail: &NewAdjustmentDetail,
        applied_at: DateTime<Utc>,
    ) -> AppResult<AdjustmentDetail> {
        self.write("adjustment_detail")?;
        let inserted = AdjustmentDetail {
            id: self.work.next_id(),
            adjustment_id,
            sale_id: detail.sale_id,
            expense_id: detail.expense_id,
            amount_applied: detail.amount_applied,
            percentage: detail.percentage,
            calculation_base: detail.calculation_base,
            applied_at,
        };
        self.work.details.push(inserted.clone());
        Ok(inserted)
    }

    async fn commit(self) -> AppResult<()> {
        *self.shared.lock().unwrap() = self.work;
        Ok(())
    }

    async fn rollback(self) -> AppResult<()> {
        Ok(())
    }
}
