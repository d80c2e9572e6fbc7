//! # Repository Module
//!
//! Database repository implementations for Khata.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  axum Handler                                                          │
//! │       │                                                                 │
//! │       │  db.items().get_by_name("Petrol")                              │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ItemRepository                                                        │
//! │  ├── list(&self)                                                       │
//! │  ├── get(&self, id)                                                    │
//! │  ├── insert(&self, item)                                               │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//! Read methods borrow the pool directly. Write methods that participate in
//! a recording workflow take `&mut SqliteConnection` instead, so a caller
//! can wrap the whole batch in one `pool.begin()` transaction and commit or
//! roll back atomically.
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Item CRUD and name lookup
//! - [`supplier::SupplierRepository`] - Supplier CRUD and name lookup
//! - [`customer::CustomerRepository`] - Customer CRUD
//! - [`purchase::PurchaseRepository`] - Purchase lines and bill numbers
//! - [`sale::SaleRepository`] - Sale lines, amounts, credit sales
//! - [`voucher::VoucherRepository`] - Credit/debit voucher lines

pub mod customer;
pub mod item;
pub mod purchase;
pub mod sale;
pub mod supplier;
pub mod voucher;
