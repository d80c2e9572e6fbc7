//! # Billing Module
//!
//! Pure arithmetic for the purchase and sale recording workflows.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Recording Pipeline                                   │
//! │                                                                         │
//! │  HTTP request ──► validation ──► reference resolution                   │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                              billing (THIS MODULE)                      │
//! │                     net amounts, discounts, balances                    │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                                  persistence                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function: same input, same output, no I/O.
//! Amounts are `f64` end to end, matching the stored column types, so the
//! documented formulas hold exactly as written.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Purchase Line Figures
// =============================================================================

/// Derived figures for one purchase line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFigures {
    /// `qty × purchase_rate`
    pub net_amount: f64,
    /// `net_amount × discount_percent / 100`
    pub discount: f64,
    /// `net_amount − discount − payment`
    pub balance: f64,
}

/// Computes the derived figures for one purchase line.
///
/// `discount_percent` and `payment` are batch-level values applied uniformly
/// to every line, not per-line amounts.
///
/// ## Example
/// ```rust
/// use khata_core::billing::purchase_figures;
///
/// // 10 units at 5.0, 10% discount, 20 paid up front
/// let f = purchase_figures(10.0, 5.0, 10.0, 20.0);
/// assert_eq!(f.net_amount, 50.0);
/// assert_eq!(f.discount, 5.0);
/// assert_eq!(f.balance, 25.0);
/// ```
pub fn purchase_figures(
    qty: f64,
    purchase_rate: f64,
    discount_percent: f64,
    payment: f64,
) -> PurchaseFigures {
    let net_amount = qty * purchase_rate;
    let discount = net_amount * (discount_percent / 100.0);
    let balance = net_amount - discount - payment;

    PurchaseFigures {
        net_amount,
        discount,
        balance,
    }
}

// =============================================================================
// Sale Line Figures
// =============================================================================

/// Derived figures for one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleFigures {
    /// `current_reading − previous_reading`
    pub qty: f64,
    /// `qty × unit_rate`
    pub net_amount: f64,
    /// `net_amount − cash` for whatever cash value the line was given
    pub balance: f64,
}

/// Computes the derived figures for one sale line.
///
/// Quantity comes from meter readings. A negative delta (current below
/// previous) is passed through unchecked; whether that should be rejected is
/// an unresolved product question, so the computation stays permissive.
///
/// `cash` is whatever portion of the slip tender this line is charged
/// against; see [`BalanceMode`] for the two policies.
pub fn sale_figures(
    previous_reading: f64,
    current_reading: f64,
    unit_rate: f64,
    cash: f64,
) -> SaleFigures {
    let qty = current_reading - previous_reading;
    let net_amount = qty * unit_rate;
    let balance = net_amount - cash;

    SaleFigures {
        qty,
        net_amount,
        balance,
    }
}

/// Credit shortfall for a slip, if any.
///
/// A credit sale exists iff the summed net amount exceeds the cash tendered;
/// the debit is exactly the difference.
pub fn credit_shortfall(total_net_amount: f64, cash: f64) -> Option<f64> {
    if total_net_amount > cash {
        Some(total_net_amount - cash)
    } else {
        None
    }
}

// =============================================================================
// Balance Mode
// =============================================================================

/// Policy for charging the slip-level cash against individual sale lines.
///
/// ## Why Two Modes
/// Historically every line's balance was computed against the *whole* slip
/// cash, so with multiple lines the per-line balances do not sum to the slip
/// remainder. That behavior is load-bearing for existing reports, so it
/// stays the default; `Apportioned` splits the cash across lines pro-rata
/// by net amount instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMode {
    /// Every line is charged the full slip cash (historical behavior).
    #[default]
    WholeSlip,
    /// Cash is split across lines proportionally to net amount.
    Apportioned,
}

impl FromStr for BalanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whole_slip" => Ok(BalanceMode::WholeSlip),
            "apportioned" => Ok(BalanceMode::Apportioned),
            other => Err(format!(
                "unknown balance mode '{other}' (expected 'whole_slip' or 'apportioned')"
            )),
        }
    }
}

/// Splits the slip cash across lines proportionally to their net amounts.
///
/// The last line absorbs the rounding remainder so the shares always sum to
/// exactly `cash`. When the total net amount is zero there is nothing to be
/// proportional to; the whole cash lands on the last line.
pub fn apportion_cash(net_amounts: &[f64], cash: f64) -> Vec<f64> {
    if net_amounts.is_empty() {
        return Vec::new();
    }

    let total: f64 = net_amounts.iter().sum();
    let mut shares = Vec::with_capacity(net_amounts.len());
    let mut allocated = 0.0;

    for (i, net) in net_amounts.iter().enumerate() {
        let share = if i == net_amounts.len() - 1 {
            cash - allocated
        } else if total != 0.0 {
            cash * (net / total)
        } else {
            0.0
        };
        allocated += share;
        shares.push(share);
    }

    shares
}

// =============================================================================
// Bill Number Formatting
// =============================================================================

/// Number of characters in the random bill-number suffix.
pub const BILL_NO_SUFFIX_LEN: usize = 6;

/// Formats a bill number from its three parts.
///
/// ## Format
/// `<prefix>_<timestamp>_<suffix>` where the prefix is the first three
/// characters of the item name, uppercased (fewer if the name is shorter).
///
/// ## Example
/// ```rust
/// use khata_core::billing::format_bill_no;
///
/// assert_eq!(format_bill_no("Petrol", 1700000000, "X7K2Q9"), "PET_1700000000_X7K2Q9");
/// ```
pub fn format_bill_no(item_name: &str, timestamp: i64, suffix: &str) -> String {
    let prefix: String = item_name
        .chars()
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!("{}_{}_{}", prefix, timestamp, suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_figures_basic() {
        // 10 units at rate 5.0, 10% discount, payment 20
        let f = purchase_figures(10.0, 5.0, 10.0, 20.0);
        assert_eq!(f.net_amount, 50.0);
        assert_eq!(f.discount, 5.0);
        assert_eq!(f.balance, 25.0);
    }

    #[test]
    fn test_purchase_figures_no_discount_no_payment() {
        let f = purchase_figures(3.0, 7.5, 0.0, 0.0);
        assert_eq!(f.net_amount, 22.5);
        assert_eq!(f.discount, 0.0);
        assert_eq!(f.balance, 22.5);
    }

    #[test]
    fn test_purchase_balance_formula_holds() {
        let f = purchase_figures(12.0, 4.25, 7.5, 13.0);
        assert_eq!(f.discount, f.net_amount * (7.5 / 100.0));
        assert_eq!(f.balance, f.net_amount - f.discount - 13.0);
    }

    #[test]
    fn test_sale_figures_basic() {
        // readings 100 → 150 at rate 2.0, cash 80
        let f = sale_figures(100.0, 150.0, 2.0, 80.0);
        assert_eq!(f.qty, 50.0);
        assert_eq!(f.net_amount, 100.0);
        assert_eq!(f.balance, 20.0);
    }

    #[test]
    fn test_sale_figures_negative_delta_passes_through() {
        // Current below previous is not rejected; the math just goes negative.
        let f = sale_figures(150.0, 100.0, 2.0, 0.0);
        assert_eq!(f.qty, -50.0);
        assert_eq!(f.net_amount, -100.0);
        assert_eq!(f.balance, -100.0);
    }

    #[test]
    fn test_credit_shortfall() {
        assert_eq!(credit_shortfall(100.0, 80.0), Some(20.0));
        assert_eq!(credit_shortfall(80.0, 80.0), None);
        assert_eq!(credit_shortfall(50.0, 80.0), None);
    }

    #[test]
    fn test_apportion_cash_sums_exactly() {
        let nets = [100.0, 50.0, 25.0];
        let shares = apportion_cash(&nets, 70.0);
        assert_eq!(shares.len(), 3);
        let sum: f64 = shares.iter().sum();
        assert_eq!(sum, 70.0);
        // Largest line takes the largest share.
        assert!(shares[0] > shares[1] && shares[1] > shares[2]);
    }

    #[test]
    fn test_apportion_cash_zero_total() {
        let shares = apportion_cash(&[0.0, 0.0], 30.0);
        assert_eq!(shares, vec![0.0, 30.0]);
    }

    #[test]
    fn test_apportion_cash_empty() {
        assert!(apportion_cash(&[], 100.0).is_empty());
    }

    #[test]
    fn test_balance_mode_parsing() {
        assert_eq!("whole_slip".parse::<BalanceMode>().unwrap(), BalanceMode::WholeSlip);
        assert_eq!("Apportioned".parse::<BalanceMode>().unwrap(), BalanceMode::Apportioned);
        assert!("split".parse::<BalanceMode>().is_err());
        assert_eq!(BalanceMode::default(), BalanceMode::WholeSlip);
    }

    #[test]
    fn test_format_bill_no() {
        assert_eq!(
            format_bill_no("Petrol", 1700000000, "X7K2Q9"),
            "PET_1700000000_X7K2Q9"
        );
        // Short names keep whatever characters they have.
        assert_eq!(format_bill_no("Lp", 1700000000, "AAAAAA"), "LP_1700000000_AAAAAA");
        // Lowercase names are uppercased.
        assert_eq!(format_bill_no("diesel", 1, "000000"), "DIE_1_000000");
    }
}
