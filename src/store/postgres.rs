//! PostgreSQL implementation of the ledger store.
//!
//! Obligation rows of both kinds are read through one column list so a
//! single row type serves sales and expenses; kind-specific columns are
//! selected as typed NULLs on the other table.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::Postgres;

use super::{LedgerStore, LedgerTx, OutstandingFilter};
use crate::db::DbPool;
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
        ObligationSummary, ObligationTags,
    },
    payment::{
        NewPaymentApplication, NewPaymentTransaction, Page, PaymentApplication, PaymentTransaction,
    },
};

const SALE_SELECT: &str = r#"
    SELECT id, created_at, client_id,
           NULL::BIGINT AS category_id, NULL::BIGINT AS subcategory_id, NULL::TEXT AS supplier,
           total, currency, due_date, amount_pending, status
    FROM sales
"#;

const EXPENSE_SELECT: &str = r#"
    SELECT id, created_at, NULL::BIGINT AS client_id,
           category_id, subcategory_id, supplier,
           total, currency, due_date, amount_pending, status
    FROM expenses
"#;

const TRANSACTION_COLUMNS: &str = "id, created_at, direction, client_id, amount, currency, method, reference, note, account_id, state";

const ADJUSTMENT_COLUMNS: &str =
    "id, created_at, type_id, amount, currency, account_id, reference, note, state";

const DETAIL_COLUMNS: &str = "id, adjustment_id, sale_id, expense_id, amount_applied, percentage, calculation_base, applied_at";

fn obligation_select(kind: ObligationKind) -> &'static str {
    match kind {
        ObligationKind::Sale => SALE_SELECT,
        ObligationKind::Expense => EXPENSE_SELECT,
    }
}

fn obligation_table(kind: ObligationKind) -> &'static str {
    match kind {
        ObligationKind::Sale => "sales",
        ObligationKind::Expense => "expenses",
    }
}

/// Build the outstanding-obligations query. `$1` is the currency filter,
/// `$2` the client filter (sales only).
fn outstanding_sql(kind: ObligationKind, lock: bool) -> String {
    let client_clause = match kind {
        ObligationKind::Sale => "AND ($2::BIGINT IS NULL OR client_id = $2)",
        ObligationKind::Expense => "",
    };
    format!(
        "{} WHERE amount_pending > 0 AND status <> 'CANCELLED' \
         AND ($1::TEXT IS NULL OR currency = $1) {} \
         ORDER BY created_at ASC, id ASC{}",
        obligation_select(kind),
        client_clause,
        if lock { " FOR UPDATE" } else { "" },
    )
}

#[derive(Debug, sqlx::FromRow)]
struct ObligationRow {
    id: i64,
    created_at: DateTime<Utc>,
    client_id: Option<i64>,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
    supplier: Option<String>,
    total: Decimal,
    currency: String,
    due_date: Option<NaiveDate>,
    amount_pending: Decimal,
    status: ObligationStatus,
}

impl ObligationRow {
    fn into_obligation(self, kind: ObligationKind) -> AppResult<Obligation> {
        let tags = match kind {
            ObligationKind::Sale => ObligationTags::Sale {
                client_id: self.client_id.ok_or_else(|| {
                    AppError::Internal(format!("sale {} has no client", self.id))
                })?,
            },
            ObligationKind::Expense => ObligationTags::Expense {
                category_id: self.category_id.ok_or_else(|| {
                    AppError::Internal(format!("expense {} has no category", self.id))
                })?,
                subcategory_id: self.subcategory_id,
                supplier: self.supplier,
            },
        };

        Ok(Obligation {
            id: self.id,
            created_at: self.created_at,
            tags,
            total: self.total,
            currency: self.currency,
            due_date: self.due_date,
            amount_pending: self.amount_pending,
            status: self.status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    currency: String,
    total: Decimal,
    amount_paid: Decimal,
    amount_pending: Decimal,
    status: ObligationStatus,
}

/// Translate a unique-constraint violation into a business rule error.
fn unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::rule(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Ledger store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: DbPool,
}

impl PgLedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// One PostgreSQL transaction. The connection goes back to the pool when
/// the transaction is committed, rolled back, or dropped.
pub struct PgLedgerTx {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Tx = PgLedgerTx;

    async fn begin(&self) -> AppResult<PgLedgerTx> {
        let tx = self.pool.begin().await?;
        Ok(PgLedgerTx { tx })
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn obligation_summary(
        &self,
        kind: ObligationKind,
        id: i64,
    ) -> AppResult<Option<ObligationSummary>> {
        let link_column = match kind {
            ObligationKind::Sale => "sale_id",
            ObligationKind::Expense => "expense_id",
        };
        let sql = format!(
            r#"
            SELECT o.id, o.currency, o.total, o.amount_pending, o.status,
                   COALESCE((
                       SELECT SUM(a.amount_applied)
                       FROM payment_applications a
                       JOIN payment_transactions t ON t.id = a.transaction_id
                       WHERE a.{link_column} = o.id AND t.state = 'ACTIVE'
                   ), 0) AS amount_paid
            FROM {table} o
            WHERE o.id = $1
            "#,
            table = obligation_table(kind),
        );

        let row = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| ObligationSummary {
            kind,
            id: row.id,
            currency: row.currency,
            total: row.total,
            amount_paid: row.amount_paid,
            amount_pending: row.amount_pending,
            status: row.status,
        }))
    }

    async fn outstanding_obligations(
        &self,
        kind: ObligationKind,
        filter: &OutstandingFilter,
    ) -> AppResult<Vec<Obligation>> {
        let sql = outstanding_sql(kind, false);
        let mut query = sqlx::query_as::<_, ObligationRow>(&sql).bind(filter.currency.as_deref());
        if kind == ObligationKind::Sale {
            query = query.bind(filter.client_id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(|row| row.into_obligation(kind)).collect()
    }

    async fn pending_clients(&self, currency: Option<&str>) -> AppResult<Vec<ClientDebt>> {
        let debts = sqlx::query_as::<_, ClientDebt>(
            r#"
            SELECT s.client_id, c.name AS client_name, s.currency,
                   SUM(s.amount_pending) AS amount_pending,
                   COUNT(*) AS pending_sales
            FROM sales s
            JOIN clients c ON c.id = s.client_id
            WHERE s.amount_pending > 0
              AND s.status <> 'CANCELLED'
              AND ($1::TEXT IS NULL OR s.currency = $1)
            GROUP BY s.client_id, c.name, s.currency
            ORDER BY SUM(s.amount_pending) DESC, s.client_id ASC, s.currency ASC
            "#,
        )
        .bind(currency)
        .fetch_all(&self.pool)
        .await?;

        Ok(debts)
    }

    async fn account_balance(&self, account_id: i64) -> AppResult<Option<AccountBalance>> {
        let balance = sqlx::query_as::<_, AccountBalance>(
            "SELECT account_id, name, currency, active, balance FROM account_balances WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    async fn account_balances(&self) -> AppResult<Vec<AccountBalance>> {
        let balances = sqlx::query_as::<_, AccountBalance>(
            "SELECT account_id, name, currency, active, balance FROM account_balances ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }

    async fn client_payments(
        &self,
        client_id: i64,
        page: Page,
    ) -> AppResult<Vec<PaymentTransaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM payment_transactions \
             WHERE client_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let transactions = sqlx::query_as::<_, PaymentTransaction>(&sql)
            .bind(client_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(transactions)
    }

    async fn exchange_history(&self, page: Page) -> AppResult<Vec<ExchangeHistoryEntry>> {
        let entries = sqlx::query_as::<_, ExchangeHistoryEntry>(
            r#"
            SELECT e.id, e.created_at, e.origin_account_id, e.destination_account_id,
                   e.amount_origin, e.currency_origin, e.amount_destination, e.currency_destination,
                   e.conversion_factor, e.note, e.state,
                   o.name AS origin_account_name,
                   d.name AS destination_account_name
            FROM currency_exchanges e
            JOIN money_accounts o ON o.id = e.origin_account_id
            JOIN money_accounts d ON d.id = e.destination_account_id
            WHERE e.state = 'ACTIVE'
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn adjustment_types(&self, only_active: bool) -> AppResult<Vec<AdjustmentType>> {
        let types = sqlx::query_as::<_, AdjustmentType>(
            r#"
            SELECT id, code, description, nature, active, created_at
            FROM adjustment_types
            WHERE (NOT $1 OR active)
            ORDER BY code
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    async fn insert_adjustment_type(&self, new: &NewAdjustmentType) -> AppResult<AdjustmentType> {
        sqlx::query_as::<_, AdjustmentType>(
            r#"
            INSERT INTO adjustment_types (code, description, nature)
            VALUES ($1, $2, $3)
            RETURNING id, code, description, nature, active, created_at
            "#,
        )
        .bind(&new.code)
        .bind(&new.description)
        .bind(new.nature)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            unique_violation(err, &format!("Adjustment type code '{}' already exists", new.code))
        })
    }

    async fn update_adjustment_type(
        &self,
        id: i64,
        update: &UpdateAdjustmentType,
    ) -> AppResult<Option<AdjustmentType>> {
        sqlx::query_as::<_, AdjustmentType>(
            r#"
            UPDATE adjustment_types
            SET code = $2, description = $3, nature = $4, active = $5
            WHERE id = $1
            RETURNING id, code, description, nature, active, created_at
            "#,
        )
        .bind(id)
        .bind(&update.code)
        .bind(&update.description)
        .bind(update.nature)
        .bind(update.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            unique_violation(err, &format!("Adjustment type code '{}' already exists", update.code))
        })
    }

    async fn adjustments(&self, filter: &AdjustmentFilter) -> AppResult<Vec<AdjustmentListEntry>> {
        let entries = sqlx::query_as::<_, AdjustmentListEntry>(
            r#"
            SELECT f.id, f.created_at, f.type_id, f.amount, f.currency, f.account_id,
                   f.reference, f.note, f.state,
                   ty.code AS type_code,
                   ty.description AS type_description,
                   ty.nature AS type_nature,
                   a.name AS account_name
            FROM financial_adjustments f
            JOIN adjustment_types ty ON ty.id = f.type_id
            LEFT JOIN money_accounts a ON a.id = f.account_id
            WHERE ($1::BIGINT IS NULL OR f.type_id = $1)
              AND ($2::DATE IS NULL OR (f.created_at AT TIME ZONE 'UTC')::DATE >= $2)
              AND ($3::DATE IS NULL OR (f.created_at AT TIME ZONE 'UTC')::DATE <= $3)
              AND ($4::TEXT IS NULL OR f.state = $4)
              AND ($5::TEXT IS NULL OR f.currency = $5)
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(filter.type_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.state)
        .bind(filter.currency.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn adjustment(&self, id: i64) -> AppResult<Option<AdjustmentWithDetails>> {
        let sql = format!("SELECT {ADJUSTMENT_COLUMNS} FROM financial_adjustments WHERE id = $1");
        let Some(adjustment) = sqlx::query_as::<_, FinancialAdjustment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let sql =
            format!("SELECT {DETAIL_COLUMNS} FROM adjustment_details WHERE adjustment_id = $1 ORDER BY id");
        let details = sqlx::query_as::<_, AdjustmentDetail>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(AdjustmentWithDetails {
            adjustment,
            details,
        }))
    }

    async fn void_adjustment(&self, id: i64) -> AppResult<Option<FinancialAdjustment>> {
        let sql = format!(
            "UPDATE financial_adjustments SET state = 'VOIDED' \
             WHERE id = $1 AND state = 'ACTIVE' RETURNING {ADJUSTMENT_COLUMNS}"
        );
        let voided = sqlx::query_as::<_, FinancialAdjustment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(voided)
    }
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn find_active_account_by_name(&mut self, name: &str) -> AppResult<Option<MoneyAccount>> {
        let account = sqlx::query_as::<_, MoneyAccount>(
            "SELECT id, name, currency, active FROM money_accounts WHERE name = $1 AND active = TRUE",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(account)
    }

    async fn find_account(&mut self, id: i64) -> AppResult<Option<MoneyAccount>> {
        let account = sqlx::query_as::<_, MoneyAccount>(
            "SELECT id, name, currency, active FROM money_accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(account)
    }

    async fn lock_account_balance(&mut self, id: i64) -> AppResult<Option<AccountBalance>> {
        // FOR UPDATE on the account row serializes concurrent withdrawals
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM money_accounts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let balance = sqlx::query_as::<_, AccountBalance>(
            "SELECT account_id, name, currency, active, balance FROM account_balances WHERE account_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(balance)
    }

    async fn client_exists(&mut self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(exists)
    }

    async fn category_exists(&mut self, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM expense_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(exists)
    }

    async fn lock_obligation(
        &mut self,
        kind: ObligationKind,
        id: i64,
    ) -> AppResult<Option<Obligation>> {
        let sql = format!("{} WHERE id = $1 FOR UPDATE", obligation_select(kind));
        let row = sqlx::query_as::<_, ObligationRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(|row| row.into_obligation(kind)).transpose()
    }

    async fn lock_outstanding(
        &mut self,
        kind: ObligationKind,
        filter: &OutstandingFilter,
    ) -> AppResult<Vec<Obligation>> {
        let sql = outstanding_sql(kind, true);
        let mut query = sqlx::query_as::<_, ObligationRow>(&sql).bind(filter.currency.as_deref());
        if kind == ObligationKind::Sale {
            query = query.bind(filter.client_id);
        }
        let rows = query.fetch_all(&mut *self.tx).await?;

        rows.into_iter().map(|row| row.into_obligation(kind)).collect()
    }

    async fn insert_obligation(&mut self, draft: &ObligationDraft) -> AppResult<Obligation> {
        let id: i64 = match &draft.tags {
            ObligationTags::Sale { client_id } => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO sales (
                        created_at, client_id, total, currency, due_date, note, amount_pending, status
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id
                    "#,
                )
                .bind(draft.created_at)
                .bind(client_id)
                .bind(draft.total)
                .bind(&draft.currency)
                .bind(draft.due_date)
                .bind(&draft.note)
                .bind(draft.amount_pending)
                .bind(draft.status)
                .fetch_one(&mut *self.tx)
                .await?
            }
            ObligationTags::Expense {
                category_id,
                subcategory_id,
                supplier,
            } => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO expenses (
                        created_at, category_id, subcategory_id, supplier,
                        total, currency, due_date, note, amount_pending, status
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    RETURNING id
                    "#,
                )
                .bind(draft.created_at)
                .bind(category_id)
                .bind(subcategory_id)
                .bind(supplier)
                .bind(draft.total)
                .bind(&draft.currency)
                .bind(draft.due_date)
                .bind(&draft.note)
                .bind(draft.amount_pending)
                .bind(draft.status)
                .fetch_one(&mut *self.tx)
                .await?
            }
        };

        Ok(Obligation {
            id,
            created_at: draft.created_at,
            tags: draft.tags.clone(),
            total: draft.total,
            currency: draft.currency.clone(),
            due_date: draft.due_date,
            amount_pending: draft.amount_pending,
            status: draft.status,
        })
    }

    async fn update_obligation_balance(
        &mut self,
        kind: ObligationKind,
        id: i64,
        amount_pending: Decimal,
        status: ObligationStatus,
    ) -> AppResult<()> {
        let sql = format!(
            "UPDATE {} SET amount_pending = $2, status = $3 WHERE id = $1",
            obligation_table(kind)
        );
        let updated = sqlx::query(&sql)
            .bind(id)
            .bind(amount_pending)
            .bind(status)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(super::obligation_not_found(kind, id));
        }

        Ok(())
    }

    async fn insert_payment_transaction(
        &mut self,
        new: &NewPaymentTransaction,
    ) -> AppResult<PaymentTransaction> {
        let sql = format!(
            r#"
            INSERT INTO payment_transactions (
                created_at, direction, client_id, amount, currency, method,
                reference, note, account_id, state
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'ACTIVE')
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        let transaction = sqlx::query_as::<_, PaymentTransaction>(&sql)
            .bind(new.created_at)
            .bind(new.direction)
            .bind(new.client_id)
            .bind(new.amount)
            .bind(&new.currency)
            .bind(new.method)
            .bind(&new.reference)
            .bind(&new.note)
            .bind(new.account_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(transaction)
    }

    async fn insert_application(
        &mut self,
        new: &NewPaymentApplication,
    ) -> AppResult<PaymentApplication> {
        let (sale_id, expense_id) = match new.kind {
            ObligationKind::Sale => (Some(new.obligation_id), None),
            ObligationKind::Expense => (None, Some(new.obligation_id)),
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO payment_applications (
                transaction_id, sale_id, expense_id, amount_applied, applied_at
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(new.transaction_id)
        .bind(sale_id)
        .bind(expense_id)
        .bind(new.amount_applied)
        .bind(new.applied_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(PaymentApplication {
            id,
            transaction_id: new.transaction_id,
            kind: new.kind,
            obligation_id: new.obligation_id,
            amount_applied: new.amount_applied,
            applied_at: new.applied_at,
        })
    }

    async fn insert_exchange(&mut self, new: &NewCurrencyExchange) -> AppResult<CurrencyExchange> {
        let exchange = sqlx::query_as::<_, CurrencyExchange>(
            r#"
            INSERT INTO currency_exchanges (
                origin_account_id, destination_account_id,
                amount_origin, currency_origin,
                amount_destination, currency_destination,
                conversion_factor, note, state
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'ACTIVE')
            RETURNING id, created_at, origin_account_id, destination_account_id,
                      amount_origin, currency_origin, amount_destination, currency_destination,
                      conversion_factor, note, state
            "#,
        )
        .bind(new.origin_account_id)
        .bind(new.destination_account_id)
        .bind(new.amount_origin)
        .bind(&new.currency_origin)
        .bind(new.amount_destination)
        .bind(&new.currency_destination)
        .bind(new.conversion_factor)
        .bind(&new.note)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(exchange)
    }

    async fn find_adjustment_type(&mut self, id: i64) -> AppResult<Option<AdjustmentType>> {
        let adjustment_type = sqlx::query_as::<_, AdjustmentType>(
            "SELECT id, code, description, nature, active, created_at FROM adjustment_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(adjustment_type)
    }

    async fn insert_adjustment(
        &mut self,
        new: &NewFinancialAdjustment,
    ) -> AppResult<FinancialAdjustment> {
        let sql = format!(
            r#"
            INSERT INTO financial_adjustments (
                created_at, type_id, amount, currency, account_id, reference, note, state
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'ACTIVE')
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        );
        let adjustment = sqlx::query_as::<_, FinancialAdjustment>(&sql)
            .bind(new.created_at)
            .bind(new.type_id)
            .bind(new.amount)
            .bind(&new.currency)
            .bind(new.account_id)
            .bind(&new.reference)
            .bind(&new.note)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(adjustment)
    }

    async fn insert_adjustment_detail(
        &mut self,
        adjustment_id: i64,
        detail: &NewAdjustmentDetail,
        applied_at: DateTime<Utc>,
    ) -> AppResult<AdjustmentDetail> {
        let sql = format!(
            r#"
            INSERT INTO adjustment_details (
                adjustment_id, sale_id, expense_id, amount_applied,
                percentage, calculation_base, applied_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {DETAIL_COLUMNS}
            "#
        );
        let inserted = sqlx::query_as::<_, AdjustmentDetail>(&sql)
            .bind(adjustment_id)
            .bind(detail.sale_id)
            .bind(detail.expense_id)
            .bind(detail.amount_applied)
            .bind(detail.percentage)
            .bind(detail.calculation_base)
            .bind(applied_at)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(inserted)
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> AppResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
