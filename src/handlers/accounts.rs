//! Money account HTTP handlers.
//!
//! - GET /api/v1/accounts - List money accounts with their real-time balance
//! - GET /api/v1/accounts/:id - One account with its real-time balance

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppError, handlers::AppState, models::account::AccountBalance,
    services::exchange_service, store::LedgerStore,
};

/// List every money account with its derived balance, ordered by name.
///
/// # Response (200 OK)
///
/// ```json
/// [
///   { "account_id": 2, "name": "BANK UYU", "currency": "UYU", "active": true, "balance": 15230.5 },
///   { "account_id": 1, "name": "CASH UYU", "currency": "UYU", "active": true, "balance": 820.0 }
/// ]
/// ```
pub async fn list_balances<S: LedgerStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<AccountBalance>>, AppError> {
    let balances = state.store.account_balances().await?;

    Ok(Json(balances))
}

/// Balance of one money account, e.g. before registering an exchange.
///
/// - **Error (404)**: unknown account
pub async fn get_balance<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountBalance>, AppError> {
    let balance = exchange_service::account_balance(&state.store, account_id).await?;
    Ok(Json(balance))
}
