//! Payment HTTP handlers.
//!
//! - POST /api/v1/payments - RegisterPayment (DIRECT or FIFO)
//! - GET /api/v1/clients/:id/payments - Payment history of a client

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    error::AppError,
    handlers::AppState,
    models::payment::{Page, PaymentReceipt, PaymentTransaction, RegisterPaymentRequest},
    services::payment_service,
    store::LedgerStore,
};

/// Register a payment and apply it to one or more obligations.
///
/// # Request Body
///
/// ```json
/// {
///   "kind": "SALE",
///   "payer_id": 12,
///   "currency": "UYU",
///   "strategy": "FIFO",
///   "lines": [{ "amount": 1500, "method": "TRANSFERENCIA", "reference": "BROU 88213" }]
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the payment receipt
/// - **Error (400)**: malformed request or unknown payment method
/// - **Error (404)**: obligation, client or money account not found
/// - **Error (409)**: overpayment, currency mismatch, paid or cancelled target
pub async fn register_payment<S: LedgerStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RegisterPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentReceipt>), AppError> {
    let Json(request) = payload?;

    let receipt = payment_service::register_payment(&state.store, &state.settings, request).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Payment transactions received from a client, newest first.
///
/// # Query Parameters
///
/// - `limit` (default 50, max 500)
/// - `offset` (default 0)
pub async fn client_payments<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(client_id): Path<i64>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PaymentTransaction>>, AppError> {
    let transactions = payment_service::client_payments(&state.store, client_id, page).await?;

    Ok(Json(transactions))
}
