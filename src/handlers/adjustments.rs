//! Financial adjustment HTTP handlers.
//!
//! - GET/POST /api/v1/adjustment-types - List or create adjustment types
//! - PUT /api/v1/adjustment-types/:id - Edit a type, including its active flag
//! - GET /api/v1/adjustments - List adjustments with optional filters
//! - POST /api/v1/adjustments - Create an adjustment with its details
//! - GET /api/v1/adjustments/:id - Adjustment with details
//! - POST /api/v1/adjustments/:id/void - Void an active adjustment

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::AppState,
    models::adjustment::{
        AdjustmentFilter, AdjustmentListEntry, AdjustmentType, AdjustmentWithDetails,
        CreateAdjustmentRequest, FinancialAdjustment, NewAdjustmentType, UpdateAdjustmentType,
    },
    services::adjustment_service,
    store::LedgerStore,
};

#[derive(Debug, Default, Deserialize)]
pub struct TypeListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// List adjustment types, active ones only unless `include_inactive=true`.
pub async fn list_types<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<TypeListQuery>,
) -> Result<Json<Vec<AdjustmentType>>, AppError> {
    let types = adjustment_service::list_adjustment_types(&state.store, query.include_inactive).await?;
    Ok(Json(types))
}

/// Create an adjustment type.
///
/// # Request Body
///
/// ```json
/// { "code": "COMISION", "description": "Comisión bancaria", "nature": "EGRESO" }
/// ```
pub async fn create_type<S: LedgerStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewAdjustmentType>, JsonRejection>,
) -> Result<(StatusCode, Json<AdjustmentType>), AppError> {
    let Json(new) = payload?;

    let created = adjustment_service::create_adjustment_type(&state.store, new).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an adjustment type.
///
/// # Request Body
///
/// ```json
/// { "code": "COMISION", "description": "Comisión bancaria", "nature": "EGRESO", "active": false }
/// ```
///
/// `active` defaults to `true` when omitted.
///
/// - **Error (404)**: unknown type
/// - **Error (409)**: code already used by another type
pub async fn update_type<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateAdjustmentType>, JsonRejection>,
) -> Result<Json<AdjustmentType>, AppError> {
    let Json(update) = payload?;

    let updated = adjustment_service::update_adjustment_type(&state.store, id, update).await?;

    Ok(Json(updated))
}

/// List adjustments, newest first.
///
/// # Query Parameters
///
/// - `type_id`
/// - `from`, `to` (inclusive days, `YYYY-MM-DD`)
/// - `state` (`ACTIVE` or `VOIDED`)
/// - `currency`
pub async fn list<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(filter): Query<AdjustmentFilter>,
) -> Result<Json<Vec<AdjustmentListEntry>>, AppError> {
    let adjustments =
        adjustment_service::list_adjustments(&state.store, &state.settings, filter).await?;
    Ok(Json(adjustments))
}

/// Create a financial adjustment.
///
/// # Response
///
/// - **Success (201 Created)**: the adjustment with its detail lines
/// - **Error (400)**: malformed amounts or details
/// - **Error (404)**: unknown type, account, sale or expense
/// - **Error (409)**: inactive type or account, currency mismatch, cancelled sale
pub async fn create<S: LedgerStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateAdjustmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AdjustmentWithDetails>), AppError> {
    let Json(request) = payload?;

    let created = adjustment_service::create_adjustment(&state.store, &state.settings, request).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<AdjustmentWithDetails>, AppError> {
    let adjustment = adjustment_service::get_adjustment(&state.store, id).await?;
    Ok(Json(adjustment))
}

/// Void an adjustment. Obligation balances are not touched.
///
/// - **Error (404)**: unknown adjustment
/// - **Error (409)**: already voided
pub async fn void<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<FinancialAdjustment>, AppError> {
    let voided = adjustment_service::void_adjustment(&state.store, id).await?;
    Ok(Json(voided))
}
