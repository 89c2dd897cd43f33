//! Currency exchange HTTP handlers.
//!
//! - POST /api/v1/exchanges - Move money between two accounts
//! - GET /api/v1/exchanges - Exchange history, newest first

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    error::AppError,
    handlers::AppState,
    models::{
        exchange::{ExchangeHistoryEntry, ExchangeReceipt, ExchangeRequest},
        payment::Page,
    },
    services::exchange_service,
    store::LedgerStore,
};

/// Register an exchange or same-currency transfer.
///
/// # Request Body
///
/// ```json
/// {
///   "origin_account_id": 1,
///   "destination_account_id": 4,
///   "amount": 1000,
///   "denomination": "ORIGIN",
///   "conversion_factor": 40
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: amounts on both sides and the origin balance
/// - **Error (400)**: non-positive amount or factor, same account twice
/// - **Error (404)**: unknown account
/// - **Error (422)**: insufficient funds or unsupported currency pair
pub async fn register_exchange<S: LedgerStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ExchangeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExchangeReceipt>), AppError> {
    let Json(request) = payload?;

    let receipt =
        exchange_service::register_exchange(&state.store, &state.settings, request).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn exchange_history<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<ExchangeHistoryEntry>>, AppError> {
    let history = exchange_service::exchange_history(&state.store, page).await?;
    Ok(Json(history))
}
