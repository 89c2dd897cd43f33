//! Liveness probe: store connectivity plus the currency pair the ledger runs with.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{error::AppError, handlers::AppState, store::LedgerStore};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub local_currency: String,
    pub foreign_currency: String,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health`. An unreachable store surfaces as the usual 500 envelope.
pub async fn health_check<S: LedgerStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<HealthResponse>, AppError> {
    state.store.ping().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        store: "connected",
        local_currency: state.settings.local_currency.clone(),
        foreign_currency: state.settings.foreign_currency.clone(),
        timestamp: Utc::now(),
    }))
}
