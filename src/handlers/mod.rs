//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, query string)
//! 2. Calls one service function with the shared store and ledger settings
//! 3. Returns HTTP response (JSON, status code)
//!
//! Handlers are generic over the `LedgerStore`, so the same router serves
//! PostgreSQL in production and the in-memory store in tests.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{config::LedgerSettings, store::LedgerStore};

/// Money account balance endpoints
pub mod accounts;
/// Financial adjustment endpoints
pub mod adjustments;
/// Currency exchange endpoints
pub mod exchanges;
/// Health check endpoint
pub mod health;
/// Sale and expense endpoints
pub mod obligations;
/// Payment registration endpoints
pub mod payments;

/// State shared with every handler.
#[derive(Debug, Clone)]
pub struct AppState<S> {
    pub store: S,
    pub settings: Arc<LedgerSettings>,
}

impl<S> AppState<S> {
    pub fn new(store: S, settings: LedgerSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }
}

/// Build the API router.
///
/// Tracing and CORS layers are added by the caller.
pub fn router<S>(state: AppState<S>) -> Router
where
    S: LedgerStore + Clone + 'static,
{
    Router::new()
        .route("/health", get(health::health_check::<S>))
        // Payments
        .route("/api/v1/payments", post(payments::register_payment::<S>))
        .route(
            "/api/v1/clients/{id}/payments",
            get(payments::client_payments::<S>),
        )
        .route(
            "/api/v1/clients/pending",
            get(obligations::pending_clients::<S>),
        )
        // Obligations
        .route(
            "/api/v1/obligations/batch",
            post(obligations::create_batch::<S>),
        )
        .route(
            "/api/v1/sales/outstanding",
            get(obligations::outstanding_sales::<S>),
        )
        .route(
            "/api/v1/sales/{id}/status",
            get(obligations::sale_status::<S>),
        )
        .route(
            "/api/v1/expenses/outstanding",
            get(obligations::outstanding_expenses::<S>),
        )
        .route(
            "/api/v1/expenses/{id}/status",
            get(obligations::expense_status::<S>),
        )
        // Money accounts and exchanges
        .route("/api/v1/accounts", get(accounts::list_balances::<S>))
        .route("/api/v1/accounts/{id}", get(accounts::get_balance::<S>))
        .route(
            "/api/v1/exchanges",
            post(exchanges::register_exchange::<S>).get(exchanges::exchange_history::<S>),
        )
        // Financial adjustments
        .route(
            "/api/v1/adjustment-types",
            get(adjustments::list_types::<S>).post(adjustments::create_type::<S>),
        )
        .route(
            "/api/v1/adjustment-types/{id}",
            put(adjustments::update_type::<S>),
        )
        .route(
            "/api/v1/adjustments",
            get(adjustments::list::<S>).post(adjustments::create::<S>),
        )
        .route("/api/v1/adjustments/{id}", get(adjustments::get::<S>))
        .route(
            "/api/v1/adjustments/{id}/void",
            post(adjustments::void::<S>),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::adjustment::AdjustmentNature;
    use crate::store::memory::{MemoryLedgerStore, ts};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn app(store: &MemoryLedgerStore) -> Router {
        router(AppState::new(store.clone(), LedgerSettings::default()))
    }

    #[tokio::test]
    async fn health_reports_connected() {
        let store = MemoryLedgerStore::new();
        let (status, body) = send(app(&store), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "connected");
        assert_eq!(body["local_currency"], "UYU");
        assert_eq!(body["foreign_currency"], "USD");
    }

    #[tokio::test]
    async fn payment_round_trip_over_http() {
        let store = MemoryLedgerStore::new();
        store.add_account("CASH UYU", "UYU", dec!(0));
        let client = store.add_client();
        let sale = store.add_sale(client, dec!(300), "UYU", ts(1));

        let (status, body) = send(
            app(&store),
            "POST",
            "/api/v1/payments",
            Some(json!({
                "kind": "SALE",
                "payer_id": client,
                "currency": "UYU",
                "strategy": "FIFO",
                "lines": [{ "amount": 120.5, "method": "EFECTIVO" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["total_applied"], json!(120.5));

        let (status, body) = send(
            app(&store),
            "GET",
            &format!("/api/v1/sales/{sale}/status"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "PARTIALLY_PAID");
        assert_eq!(body["amount_pending"], json!(179.5));
    }

    #[tokio::test]
    async fn errors_use_the_tagged_envelope() {
        let store = MemoryLedgerStore::new();

        let (status, body) = send(app(&store), "GET", "/api/v1/expenses/5/status", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");

        let (status, body) = send(
            app(&store),
            "POST",
            "/api/v1/payments",
            Some(json!({
                "kind": "SALE",
                "payer_id": 1,
                "currency": "UYU",
                "strategy": "FIFO",
                "lines": [{ "amount": 10, "method": "CHEQUE" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn adjustment_void_twice_conflicts() {
        let store = MemoryLedgerStore::new();
        let client = store.add_client();
        let sale = store.add_sale(client, dec!(100), "UYU", ts(1));
        let type_id = store.add_adjustment_type("BONIF", AdjustmentNature::Income, true);

        let (status, body) = send(
            app(&store),
            "POST",
            "/api/v1/adjustments",
            Some(json!({
                "type_id": type_id,
                "amount": 10,
                "currency": "UYU",
                "details": [{ "sale_id": sale, "amount_applied": 10 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["adjustment"]["id"].as_i64().unwrap();

        let uri = format!("/api/v1/adjustments/{id}/void");
        let (status, body) = send(app(&store), "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "VOIDED");

        let (status, _) = send(app(&store), "POST", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn out_of_range_factor_is_a_bad_request() {
        let store = MemoryLedgerStore::new();
        let pesos = store.add_account("BANK UYU", "UYU", dec!(5000));
        let dollars = store.add_account("BANK USD", "USD", dec!(0));

        let (status, body) = send(
            app(&store),
            "POST",
            "/api/v1/exchanges",
            Some(json!({
                "origin_account_id": pesos,
                "destination_account_id": dollars,
                "amount": 1000,
                "denomination": "ORIGIN",
                "conversion_factor": 1e-26
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
        assert!(store.state().exchanges.is_empty());
    }

    #[tokio::test]
    async fn ledger_reads_and_type_maintenance_over_http() {
        let store = MemoryLedgerStore::new();
        let cash = store.add_account("CASH UYU", "UYU", dec!(75));
        let client = store.add_named_client("Ana Pereira");
        store.add_sale(client, dec!(100), "UYU", ts(1));
        store.add_sale(client, dec!(20), "UYU", ts(2));
        let type_id = store.add_adjustment_type("BONIF", AdjustmentNature::Income, true);

        let (status, body) = send(app(&store), "GET", "/api/v1/clients/pending?currency=UYU", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["client_name"], "Ana Pereira");
        assert_eq!(body[0]["amount_pending"], json!(120.0));
        assert_eq!(body[0]["pending_sales"], 2);

        let (status, body) = send(app(&store), "GET", &format!("/api/v1/accounts/{cash}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], json!(75.0));

        let (status, _) = send(app(&store), "GET", "/api/v1/accounts/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            app(&store),
            "PUT",
            &format!("/api/v1/adjustment-types/{type_id}"),
            Some(json!({ "code": "bonif", "description": "Bonificación", "nature": "INGRESO", "active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], false);

        let (status, body) = send(app(&store), "GET", "/api/v1/adjustments?state=VOIDED", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
