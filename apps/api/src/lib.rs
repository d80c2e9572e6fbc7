//! # Khata API
//!
//! HTTP JSON server for the Khata back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Khata API Server                               │
//! │                                                                         │
//! │  Client ───► HTTP (8080) ───► Routes ───► Recorders ───► SQLite        │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                           khata-core (pure math)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary lives in `main.rs`; everything else is a library so the
//! recorders can be exercised directly in tests against an in-memory
//! database.

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use khata_core::BalanceMode;
use khata_db::Database;

pub use config::ApiConfig;
pub use error::ApiError;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// How slip-level cash is charged against sale lines.
    pub balance_mode: BalanceMode,
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    routes::router(state)
}
