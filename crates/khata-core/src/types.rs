//! # Domain Types
//!
//! Core domain types used throughout Khata.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │    Purchase     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  purchase_no    │   │  slip_no        │       │
//! │  │  item_code      │   │  bill_no (uniq) │   │  readings       │       │
//! │  │  rates          │   │  line figures   │   │  line figures   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ Supplier        │   │     Amount      │   │   CreditSale    │       │
//! │  │ Customer        │   │  payment chan.  │   │  shortfall      │       │
//! │  │  cash_balance   │   │  per slip       │   │  per slip       │       │
//! │  │  BalanceType    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │ CreditVoucher   │   │  DebitVoucher   │  one row per account line,  │
//! │  └─────────────────┘   └─────────────────┘  batch keyed by voucher_no  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every persisted record carries an `id: i64` assigned by SQLite
//! (`INTEGER PRIMARY KEY AUTOINCREMENT`). Business identifiers (`item_code`,
//! `bill_no`, `purchase_no`, `slip_no`, `voucher_no`) ride alongside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Balance Type
// =============================================================================

/// Polarity of a supplier/customer running balance.
///
/// Stored as TEXT with the PascalCase spellings (`Receivable` / `Payable`)
/// that existing clients send and expect back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "PascalCase"))]
pub enum BalanceType {
    /// Money owed to us.
    Receivable,
    /// Money we owe.
    Payable,
}

// =============================================================================
// Item
// =============================================================================

/// A stocked item available for purchase and sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (SQLite rowid).
    pub id: i64,

    /// Category tag (free text).
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub item_type: Option<String>,

    /// Display name. Purchase requests resolve items by exact name match.
    pub item_name: String,

    /// Business identifier, unique across all items.
    pub item_code: String,

    /// Reorder threshold.
    pub minimum_level: Option<i64>,

    /// Units per packet for packeted stock.
    pub qty_per_packet: Option<i64>,

    /// Default rate applied to purchase lines when the request omits one.
    pub purchase_rate: Option<f64>,

    /// Rate snapshot taken by sale lines at recording time.
    pub sale_rate: Option<f64>,

    /// Wholesale rate (informational).
    pub wholesale_rate: Option<f64>,

    /// Default sale discount (informational).
    pub sale_discount_percent: Option<f64>,

    /// Stock on hand when the item was registered.
    pub opening_stock: Option<f64>,

    /// Unit of measure ("litre", "packet", ...).
    pub unit: Option<String>,
}

/// Fields accepted when creating or fully replacing an [`Item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    pub item_name: String,
    pub item_code: String,
    #[serde(default)]
    pub minimum_level: Option<i64>,
    #[serde(default)]
    pub qty_per_packet: Option<i64>,
    #[serde(default)]
    pub purchase_rate: Option<f64>,
    #[serde(default)]
    pub sale_rate: Option<f64>,
    #[serde(default)]
    pub wholesale_rate: Option<f64>,
    #[serde(default)]
    pub sale_discount_percent: Option<f64>,
    #[serde(default)]
    pub opening_stock: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

// =============================================================================
// Supplier / Customer
// =============================================================================

/// A supplier we purchase from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    /// Purchase requests resolve suppliers by exact name match.
    pub name: String,
    pub address: Option<String>,
    pub tel: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    /// Running balance; polarity given by `cash_balance_type`.
    pub cash_balance: Option<f64>,
    pub cash_balance_type: BalanceType,
}

/// Fields accepted when creating or fully replacing a [`Supplier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cash_balance: Option<f64>,
    pub cash_balance_type: BalanceType,
}

/// A customer we sell to. Same shape as [`Supplier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub tel: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub cash_balance: Option<f64>,
    pub cash_balance_type: BalanceType,
}

/// Fields accepted when creating or fully replacing a [`Customer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cash_balance: Option<f64>,
    pub cash_balance_type: BalanceType,
}

// =============================================================================
// Purchase
// =============================================================================

/// One line of a purchase batch.
///
/// All lines of a batch share `purchase_no`; each line carries its own
/// globally unique `bill_no`. Supplier/item references are nullable because
/// the schema sets them NULL if the referenced row is ever removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: i64,
    /// Groups lines into one logical purchase; not unique by itself.
    pub purchase_no: String,
    /// Generated, globally unique external reference.
    pub bill_no: String,
    pub date: DateTime<Utc>,
    pub supplier_id: Option<i64>,
    pub item_id: Option<i64>,
    pub qty: f64,
    pub purchase_rate: f64,
    pub sale_rate: f64,
    /// `qty × purchase_rate`, fixed at recording time.
    pub net_amount: f64,
    pub description: Option<String>,
    pub discount_percent: f64,
    /// `net_amount × discount_percent / 100`, fixed at recording time.
    pub discount: f64,
    pub payment: f64,
    /// `net_amount − discount − payment`, fixed at recording time.
    pub balance: f64,
}

/// A fully computed purchase line ready for insertion.
#[derive(Debug, Clone)]
pub struct NewPurchaseLine {
    pub purchase_no: String,
    pub bill_no: String,
    pub supplier_id: i64,
    pub item_id: i64,
    pub qty: f64,
    pub purchase_rate: f64,
    pub sale_rate: f64,
    pub net_amount: f64,
    pub description: Option<String>,
    pub discount_percent: f64,
    pub discount: f64,
    pub payment: f64,
    pub balance: f64,
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale slip.
///
/// All lines of a slip share `slip_no`. The `cash` column repeats the
/// slip-level tender on every line; see the recorder for how per-line
/// `balance` relates to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub slip_no: String,
    pub date: DateTime<Utc>,
    pub salesperson: String,
    pub cashier: String,
    pub customer_id: i64,
    pub item_id: i64,
    pub previous_reading: f64,
    pub current_reading: f64,
    /// `current_reading − previous_reading`.
    pub qty: f64,
    /// Item sale rate snapshot taken at recording time (not live-linked).
    pub unit_rate: f64,
    /// `qty × unit_rate`.
    pub net_amount: f64,
    pub cash: f64,
    pub balance: f64,
}

/// A fully computed sale line ready for insertion.
#[derive(Debug, Clone)]
pub struct NewSaleLine {
    pub slip_no: String,
    pub salesperson: String,
    pub cashier: String,
    pub customer_id: i64,
    pub item_id: i64,
    pub previous_reading: f64,
    pub current_reading: f64,
    pub qty: f64,
    pub unit_rate: f64,
    pub net_amount: f64,
    pub cash: f64,
    pub balance: f64,
}

// =============================================================================
// Amount
// =============================================================================

/// How the single `cash` value of a slip was tendered.
///
/// Exactly one row per recorded slip, linked to the slip's first Sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Amount {
    pub id: i64,
    pub sale_id: i64,
    pub is_online: bool,
    /// Set when tendered in hand; NULL for online payments.
    pub cash_in_hand: Option<f64>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Payment-channel record ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAmount {
    pub sale_id: i64,
    pub is_online: bool,
    pub cash_in_hand: Option<f64>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

// =============================================================================
// Credit Sale
// =============================================================================

/// Shortfall bookkeeping for a slip whose total exceeds the cash tendered.
///
/// Created iff `sum(net_amount) > cash`; `debit` is the difference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditSale {
    pub id: i64,
    pub sale_id: i64,
    pub customer_id: i64,
    pub debit: f64,
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Shortfall record ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCreditSale {
    pub sale_id: i64,
    pub customer_id: i64,
    pub debit: f64,
    pub description: Option<String>,
}

// =============================================================================
// Vouchers
// =============================================================================

/// One account line of a credit voucher batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditVoucher {
    pub id: i64,
    /// Batch key shared by every line of the voucher.
    pub voucher_no: String,
    pub date: DateTime<Utc>,
    /// Batch-level credit account tag ("online" or "in hand").
    pub cr_account: String,
    pub account_code: String,
    pub account_name: String,
    pub debit: f64,
    pub description: Option<String>,
}

/// One account line of a debit voucher batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DebitVoucher {
    pub id: i64,
    pub voucher_no: String,
    pub date: DateTime<Utc>,
    /// Batch-level debit account tag ("online" or "in hand").
    pub db_account: String,
    pub account_code: String,
    pub account_name: String,
    pub credit: f64,
    pub description: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_type_serde_spelling() {
        let json = serde_json::to_string(&BalanceType::Receivable).unwrap();
        assert_eq!(json, "\"Receivable\"");

        let parsed: BalanceType = serde_json::from_str("\"Payable\"").unwrap();
        assert_eq!(parsed, BalanceType::Payable);

        // Lowercase spellings are rejected, not coerced.
        assert!(serde_json::from_str::<BalanceType>("\"payable\"").is_err());
    }

    #[test]
    fn test_item_type_field_renamed() {
        let json = r#"{
            "item_name": "Petrol",
            "item_code": "PET-01",
            "type": "fuel",
            "sale_rate": 2.0
        }"#;
        let item: NewItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_type.as_deref(), Some("fuel"));
        assert_eq!(item.sale_rate, Some(2.0));
        assert!(item.unit.is_none());
    }
}
