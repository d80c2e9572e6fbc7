//! # khata-core: Pure Business Logic for Khata
//!
//! This crate is the **heart** of Khata. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Khata Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients (JSON)                          │   │
//! │  │    items, suppliers, customers, purchases, sales, vouchers      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ axum routes                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    khata-api (HTTP Layer)                       │   │
//! │  │    request parsing, recorders, error → status mapping           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ khata-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  billing  │  │ validation│  │   error   │  │   │
//! │  │   │   Item    │  │ figures   │  │ coercion  │  │ CoreError │  │   │
//! │  │   │ Purchase  │  │ bill nos  │  │  checks   │  │  Validat. │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    khata-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Supplier, Purchase, Sale, vouchers, etc.)
//! - [`billing`] - Line arithmetic, cash apportionment, bill-number formatting
//! - [`validation`] - Payload coercion and business rule checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Float Amounts**: Amounts, rates, and readings are `f64` to match the
//!    stored columns and keep the documented formulas exact
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use khata_core::billing::{purchase_figures, sale_figures};
//!
//! // 10 units purchased at 5.0 with 10% discount and 20 paid up front
//! let p = purchase_figures(10.0, 5.0, 10.0, 20.0);
//! assert_eq!(p.balance, 25.0);
//!
//! // Meter 100 → 150 at unit rate 2.0, 80 cash tendered
//! let s = sale_figures(100.0, 150.0, 2.0, 80.0);
//! assert_eq!(s.net_amount, 100.0);
//! assert_eq!(s.balance, 20.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use khata_core::CoreError` instead of
// `use khata_core::error::CoreError`

pub use billing::{BalanceMode, PurchaseFigures, SaleFigures};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum attempts to mint a unique bill number before giving up.
///
/// ## Why bounded?
/// The random suffix makes collisions vanishingly unlikely, but the retry
/// loop must still terminate; after this many collisions the recorder fails
/// the whole batch with [`CoreError::BillNumberExhausted`].
pub const MAX_BILL_NO_ATTEMPTS: u32 = 5;
