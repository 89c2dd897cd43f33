//! Sale and expense HTTP handlers.
//!
//! - POST /api/v1/obligations/batch - Create obligations with initial payments
//! - GET /api/v1/sales/:id/status, /api/v1/expenses/:id/status - Obligation status
//! - GET /api/v1/sales/outstanding, /api/v1/expenses/outstanding - Pending debt, oldest first
//! - GET /api/v1/clients/pending - Clients with outstanding sales, largest debt first

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    error::AppError,
    handlers::AppState,
    models::obligation::{
        ClientDebt, CreateObligationsBatchRequest, CreateObligationsBatchResponse, Obligation,
        ObligationKind, ObligationSummary, OutstandingQuery, PendingClientsQuery,
    },
    services::{batch_service, ledger_reader},
    store::LedgerStore,
};

/// Create a batch of obligations atomically.
///
/// # Request Body
///
/// ```json
/// {
///   "obligations": [
///     {
///       "tags": { "kind": "EXPENSE", "category_id": 3, "supplier": "Agroveterinaria Sur" },
///       "total": 1200.00,
///       "currency": "UYU",
///       "due_date": "2025-03-31",
///       "payment_lines": [{ "amount": 200.00, "method": "EFECTIVO" }]
///     }
///   ]
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: every created obligation with its payment rows
/// - **Error (400)**: malformed obligation, missing due date
/// - **Error (404)**: unknown client, category or money account
/// - **Error (409)**: initial payments exceed the total
pub async fn create_batch<S: LedgerStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateObligationsBatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateObligationsBatchResponse>), AppError> {
    let Json(request) = payload?;

    let response =
        batch_service::create_obligations_batch(&state.store, &state.settings, request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn sale_status<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<ObligationSummary>, AppError> {
    let summary = ledger_reader::get_obligation_status(&state.store, ObligationKind::Sale, id).await?;
    Ok(Json(summary))
}

pub async fn expense_status<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<ObligationSummary>, AppError> {
    let summary =
        ledger_reader::get_obligation_status(&state.store, ObligationKind::Expense, id).await?;
    Ok(Json(summary))
}

/// Clients with outstanding sales, one row per client and currency.
///
/// # Response (200 OK)
///
/// ```json
/// [
///   { "client_id": 12, "client_name": "Ana Pereira", "currency": "UYU", "amount_pending": 4200.0, "pending_sales": 3 }
/// ]
/// ```
pub async fn pending_clients<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<PendingClientsQuery>,
) -> Result<Json<Vec<ClientDebt>>, AppError> {
    let debts = ledger_reader::pending_clients(&state.store, &state.settings, query).await?;
    Ok(Json(debts))
}

/// Outstanding sales, optionally filtered by `client_id` and `currency`.
pub async fn outstanding_sales<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<OutstandingQuery>,
) -> Result<Json<Vec<Obligation>>, AppError> {
    let rows = ledger_reader::outstanding_obligations(
        &state.store,
        &state.settings,
        ObligationKind::Sale,
        query,
    )
    .await?;
    Ok(Json(rows))
}

/// Outstanding expenses, optionally filtered by `currency`.
pub async fn outstanding_expenses<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<OutstandingQuery>,
) -> Result<Json<Vec<Obligation>>, AppError> {
    let rows = ledger_reader::outstanding_obligations(
        &state.store,
        &state.settings,
        ObligationKind::Expense,
        query,
    )
    .await?;
    Ok(Json(rows))
}
