//! # Sale Routes
//!
//! Records sale slips and serves slip read models.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       POST /create-sale                                 │
//! │                                                                         │
//! │  { slip_no, salesperson, cashier, customer_id, cash, items: [...],     │
//! │    is_online?, bank_name?, account_number?, credit_description? }       │
//! │       │                                                                 │
//! │       ├── resolve customer by id ──► 404 if unknown                    │
//! │       ├── per line: resolve item, qty = current − previous,            │
//! │       │            net = qty × item.sale_rate                          │
//! │       ├── charge cash per balance mode (whole-slip or apportioned)     │
//! │       │                                                                 │
//! │       ├── BEGIN TRANSACTION                                            │
//! │       │     insert lines, one amounts row on the FIRST line,           │
//! │       │     credit_sales row iff sum(net) > cash                       │
//! │       └── COMMIT ──► { message: "Sale created successfully." }         │
//! │                                                                         │
//! │  Any failure rolls back the whole slip.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities come from meter readings; a line's `unit_rate` is a snapshot
//! of the item's catalog sale rate at recording time.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;
use khata_core::billing::{apportion_cash, credit_shortfall, sale_figures, BalanceMode};
use khata_core::validation::{non_empty, numeric_field, required_str};
use khata_core::{CoreError, Item, NewAmount, NewCreditSale, NewSaleLine, ValidationError};
use khata_db::Database;

/// Description stored on a credit sale when the request does not name one.
const DEFAULT_CREDIT_DESCRIPTION: &str = "Credit added for sale";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-sale", post(create_sale))
        .route("/sales", get(list_sales))
        .route("/sales/{id}", get(get_sale).delete(delete_sale))
}

// =============================================================================
// Request Types
// =============================================================================

/// Sale slip request body.
#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub slip_no: Option<String>,
    pub salesperson: Option<String>,
    pub cashier: Option<String>,
    pub customer_id: Option<i64>,
    pub cash: Option<Value>,
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub credit_description: Option<String>,
}

/// One requested sale line.
#[derive(Debug, Deserialize)]
pub struct SaleItemRequest {
    pub item_id: Option<i64>,
    pub previous_reading: Option<Value>,
    pub current_reading: Option<Value>,
}

// =============================================================================
// Recorder
// =============================================================================

/// Records a sale slip atomically.
///
/// All lines share the slip number and the slip-level cash; the payment
/// channel is tracked by exactly one `amounts` row on the first line, and a
/// `credit_sales` row records the shortfall when the slip total exceeds the
/// cash tendered.
pub async fn record_sale(
    db: &Database,
    balance_mode: BalanceMode,
    req: SaleRequest,
) -> Result<(), ApiError> {
    let slip_no = required_str("slip_no", req.slip_no.as_deref())?.to_string();
    let salesperson = required_str("salesperson", req.salesperson.as_deref())?.to_string();
    let cashier = required_str("cashier", req.cashier.as_deref())?.to_string();
    let customer_id = req
        .customer_id
        .ok_or(ValidationError::Required { field: "customer_id" })
        .map_err(CoreError::from)?;
    let cash_raw = req
        .cash
        .ok_or(ValidationError::Required { field: "cash" })
        .map_err(CoreError::from)?;
    let cash = numeric_field("cash", &cash_raw)?;

    non_empty("items", &req.items)?;

    let customer = db
        .customers()
        .get(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer not found"))?;

    // Phase 1: resolve items and compute readings/net amounts.
    struct PreparedLine {
        item: Item,
        previous: f64,
        current: f64,
        qty: f64,
        unit_rate: f64,
        net_amount: f64,
    }

    let mut prepared = Vec::with_capacity(req.items.len());
    for line in &req.items {
        let item_id = line
            .item_id
            .ok_or(ValidationError::Required { field: "item_id" })
            .map_err(CoreError::from)?;

        let item = db
            .items()
            .get(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Item with ID {item_id} not found")))?;

        let unit_rate = item
            .sale_rate
            .ok_or_else(|| CoreError::MissingSaleRate(item.item_name.clone()))?;

        let previous = numeric_field(
            "previous_reading",
            line.previous_reading
                .as_ref()
                .ok_or(ValidationError::Required { field: "previous_reading" })
                .map_err(CoreError::from)?,
        )?;
        let current = numeric_field(
            "current_reading",
            line.current_reading
                .as_ref()
                .ok_or(ValidationError::Required { field: "current_reading" })
                .map_err(CoreError::from)?,
        )?;

        // Figures against the whole-slip cash; apportioned mode recomputes
        // the balance below.
        let figures = sale_figures(previous, current, unit_rate, cash);

        prepared.push(PreparedLine {
            item,
            previous,
            current,
            qty: figures.qty,
            unit_rate,
            net_amount: figures.net_amount,
        });
    }

    let total_net: f64 = prepared.iter().map(|l| l.net_amount).sum();

    // Per-line cash charges decide each stored balance.
    let line_charges: Vec<f64> = match balance_mode {
        BalanceMode::WholeSlip => vec![cash; prepared.len()],
        BalanceMode::Apportioned => {
            let nets: Vec<f64> = prepared.iter().map(|l| l.net_amount).collect();
            apportion_cash(&nets, cash)
        }
    };

    // Phase 2: insert the slip in one transaction.
    let mut tx = db.pool().begin().await.map_err(khata_db::DbError::from)?;
    let mut first_sale_id: Option<i64> = None;

    for (line, charge) in prepared.iter().zip(&line_charges) {
        let sale_id = db
            .sales()
            .insert_line(
                &mut tx,
                &NewSaleLine {
                    slip_no: slip_no.clone(),
                    salesperson: salesperson.clone(),
                    cashier: cashier.clone(),
                    customer_id: customer.id,
                    item_id: line.item.id,
                    previous_reading: line.previous,
                    current_reading: line.current,
                    qty: line.qty,
                    unit_rate: line.unit_rate,
                    net_amount: line.net_amount,
                    cash,
                    balance: line.net_amount - charge,
                },
            )
            .await?;

        first_sale_id.get_or_insert(sale_id);
    }

    // prepared is non-empty, so there is always a first line.
    let anchor_sale_id = first_sale_id.ok_or_else(|| {
        ApiError::Internal("sale slip recorded no lines".to_string())
    })?;

    db.sales()
        .insert_amount(
            &mut tx,
            &NewAmount {
                sale_id: anchor_sale_id,
                is_online: req.is_online,
                cash_in_hand: if req.is_online { None } else { Some(cash) },
                bank_name: req.bank_name,
                account_number: req.account_number,
            },
        )
        .await?;

    if let Some(debit) = credit_shortfall(total_net, cash) {
        db.sales()
            .insert_credit_sale(
                &mut tx,
                &NewCreditSale {
                    sale_id: anchor_sale_id,
                    customer_id: customer.id,
                    debit,
                    description: Some(
                        req.credit_description
                            .unwrap_or_else(|| DEFAULT_CREDIT_DESCRIPTION.to_string()),
                    ),
                },
            )
            .await?;
    }

    tx.commit().await.map_err(khata_db::DbError::from)?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_sale(
    State(state): State<AppState>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    record_sale(&state.db, state.balance_mode, req).await?;

    Ok(Json(json!({ "message": "Sale created successfully." })))
}

async fn list_sales(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sales = state.db.sales().list().await?;
    Ok(Json(sales))
}

/// Returns the whole slip the requested line belongs to, with the payment
/// channel rows and slip totals.
async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = state
        .db
        .sales()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale not found"))?;

    let lines = state.db.sales().list_by_slip(&sale.slip_no).await?;
    let amounts = state.db.sales().amounts_for_slip(&sale.slip_no).await?;

    let total_qty: f64 = lines.iter().map(|s| s.qty).sum();
    let total_net_amount: f64 = lines.iter().map(|s| s.net_amount).sum();
    let total_balance = total_net_amount - sale.cash;

    Ok(Json(json!({
        "slip_no": sale.slip_no,
        "salesperson": lines[0].salesperson,
        "cashier": lines[0].cashier,
        "customer_id": lines[0].customer_id,
        "cash": lines[0].cash,
        "date": sale.date,
        "items": lines.iter().map(|s| json!({
            "item_id": s.item_id,
            "previous_reading": s.previous_reading,
            "current_reading": s.current_reading,
            "qty": s.qty,
            "unit_rate": s.unit_rate,
            "net_amount": s.net_amount,
        })).collect::<Vec<_>>(),
        "amounts": amounts.iter().map(|a| json!({
            "is_online": a.is_online,
            "cash_in_hand": a.cash_in_hand,
            "bank_name": a.bank_name,
            "account_number": a.account_number,
            "timestamp": a.timestamp,
        })).collect::<Vec<_>>(),
        "total_qty": total_qty,
        "total_net_amount": total_net_amount,
        "total_balance": total_balance,
    })))
}

async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.sales().get(id).await?.is_none() {
        return Err(ApiError::not_found("Sale not found"));
    }

    state.db.sales().delete_with_dependents(id).await?;
    Ok(Json(json!({ "message": "Sale deleted successfully." })))
}

// =============================================================================
// Unit Tests
// =============================================================================
