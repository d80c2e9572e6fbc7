//! # Route Modules
//!
//! One module per resource, each contributing its routes to the shared
//! router.
//!
//! ## Endpoint Map
//! ```text
//! GET    /                      welcome banner
//! GET    /health                liveness probe
//!
//! POST   /items                 GET /items        GET|PUT|DELETE /items/{id}
//! POST   /suppliers             GET /suppliers    GET|PUT|DELETE /suppliers/{id}
//! POST   /customers             GET /customers    GET|PUT|DELETE /customers/{id}
//!
//! POST   /purchases             record a purchase batch
//! GET    /purchases             all lines          GET|DELETE /purchases/{id}
//!
//! POST   /create-sale           record a sale slip
//! GET    /sales                 all lines          GET|DELETE /sales/{id}
//!
//! POST   /vouchers              record a credit voucher batch
//! GET    /vouchers              all lines          GET|DELETE /vouchers/{id}
//! POST   /debit_vouchers        record a debit voucher batch
//! GET    /debit_vouchers        all lines          GET|DELETE /debit_vouchers/{id}
//! ```

pub mod customers;
pub mod items;
pub mod purchases;
pub mod sales;
pub mod suppliers;
pub mod vouchers;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::AppState;

/// Assembles all resource routers into the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(items::router())
        .merge(suppliers::router())
        .merge(customers::router())
        .merge(purchases::router())
        .merge(sales::router())
        .merge(vouchers::router())
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the API!" }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.db.health_check().await;
    let status = if healthy { "ok" } else { "degraded" };
    Json(json!({ "status": status }))
}
