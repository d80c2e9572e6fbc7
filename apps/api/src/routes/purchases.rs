//! # Purchase Routes
//!
//! Records purchase batches and serves purchase read models.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      POST /purchases                                    │
//! │                                                                         │
//! │  { purchase_no, supplier_name, items: [...], discount_percentage,      │
//! │    payment }                                                            │
//! │       │                                                                 │
//! │       ├── resolve supplier by exact name ──► 400 if unknown            │
//! │       ├── per line: resolve item by name, coerce numerics,             │
//! │       │            compute net/discount/balance                        │
//! │       │                                                                 │
//! │       ├── BEGIN TRANSACTION                                            │
//! │       │     per line: mint bill_no, insert                             │
//! │       │                                                                 │
//! │       └── COMMIT ──► { message, purchases: [{item_name, bill_no}] }    │
//! │                                                                         │
//! │  Any line failure rolls back the whole batch.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `qty`, `purchaseRate`, `saleRate`, `discount_percentage` and `payment`
//! arrive as JSON numbers or numeric strings; both are accepted.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;
use khata_core::billing::purchase_figures;
use khata_core::validation::{numeric_field, numeric_field_or};
use khata_core::{CoreError, NewPurchaseLine};
use khata_db::Database;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/purchases", post(create_purchase).get(list_purchases))
        .route("/purchases/{id}", get(get_purchase).delete(delete_purchase))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Purchase batch request body.
///
/// Top-level fields are optional at the serde level so their absence yields
/// the documented message instead of a generic deserialization error.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub purchase_no: Option<String>,
    pub supplier_name: Option<String>,
    pub items: Option<Vec<PurchaseItemRequest>>,
    #[serde(default)]
    pub discount_percentage: Option<Value>,
    #[serde(default)]
    pub payment: Option<Value>,
}

/// One requested purchase line.
#[derive(Debug, Deserialize)]
pub struct PurchaseItemRequest {
    pub item_name: Option<String>,
    pub qty: Option<Value>,
    #[serde(rename = "purchaseRate", default)]
    pub purchase_rate: Option<Value>,
    #[serde(rename = "saleRate", default)]
    pub sale_rate: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One recorded line of the response.
#[derive(Debug, Serialize)]
pub struct PurchaseCreated {
    pub item_name: String,
    pub bill_no: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub message: String,
    pub purchases: Vec<PurchaseCreated>,
}

// =============================================================================
// Recorder
// =============================================================================

/// Records a purchase batch atomically.
///
/// Every line shares the request's `purchase_no` and the batch-level
/// discount percentage and payment; each line gets its own minted bill
/// number. The whole batch lands in one transaction.
pub async fn record_purchase(
    db: &Database,
    req: PurchaseRequest,
) -> Result<PurchaseResponse, ApiError> {
    let (purchase_no, supplier_name, items) = match (req.purchase_no, req.supplier_name, req.items)
    {
        (Some(p), Some(s), Some(i)) => (p, s, i),
        _ => {
            return Err(ApiError::bad_request(
                "Missing required fields: purchase_no, supplier_name, items",
            ))
        }
    };

    let supplier = db
        .suppliers()
        .get_by_name(&supplier_name)
        .await?
        .ok_or_else(|| CoreError::UnknownSupplier(supplier_name.clone()))?;

    let discount_percent =
        numeric_field_or("discount_percentage", req.discount_percentage.as_ref(), 0.0)?;
    let payment = numeric_field_or("payment", req.payment.as_ref(), 0.0)?;

    // Phase 1: resolve catalog references and compute every line before
    // touching the purchases table, so validation failures never open a
    // transaction.
    let mut prepared = Vec::with_capacity(items.len());
    for line in items {
        let (item_name, qty_raw) = match (line.item_name, line.qty) {
            (Some(n), Some(q)) => (n, q),
            _ => {
                return Err(ApiError::bad_request(
                    "Each item must have item_name and qty",
                ))
            }
        };

        let item = db
            .items()
            .get_by_name(&item_name)
            .await?
            .ok_or_else(|| CoreError::UnknownItem(item_name.clone()))?;

        let qty = numeric_field("qty", &qty_raw)?;

        // Request values win; the item's catalog rates are the fallback.
        let purchase_rate = match (&line.purchase_rate, item.purchase_rate) {
            (Some(v), _) => numeric_field("purchaseRate", v)?,
            (None, Some(rate)) => rate,
            (None, None) => {
                return Err(ApiError::bad_request(format!(
                    "Item '{}' has no purchase rate",
                    item.item_name
                )))
            }
        };
        let sale_rate = match (&line.sale_rate, item.sale_rate) {
            (Some(v), _) => numeric_field("saleRate", v)?,
            (None, Some(rate)) => rate,
            (None, None) => {
                return Err(CoreError::MissingSaleRate(item.item_name.clone()).into())
            }
        };

        let figures = purchase_figures(qty, purchase_rate, discount_percent, payment);
        prepared.push((item, qty, purchase_rate, sale_rate, figures, line.description));
    }

    // Phase 2: mint bill numbers and insert, all inside one transaction.
    let mut tx = db.pool().begin().await.map_err(khata_db::DbError::from)?;
    let mut recorded = Vec::with_capacity(prepared.len());

    for (item, qty, purchase_rate, sale_rate, figures, description) in prepared {
        let bill_no = db.purchases().mint_bill_no(&mut tx, &item.item_name).await?;

        db.purchases()
            .insert_line(
                &mut tx,
                &NewPurchaseLine {
                    purchase_no: purchase_no.clone(),
                    bill_no: bill_no.clone(),
                    supplier_id: supplier.id,
                    item_id: item.id,
                    qty,
                    purchase_rate,
                    sale_rate,
                    net_amount: figures.net_amount,
                    description,
                    discount_percent,
                    discount: figures.discount,
                    payment,
                    balance: figures.balance,
                },
            )
            .await?;

        recorded.push(PurchaseCreated {
            item_name: item.item_name,
            bill_no,
        });
    }

    tx.commit().await.map_err(khata_db::DbError::from)?;

    Ok(PurchaseResponse {
        message: "Purchase(s) added".to_string(),
        purchases: recorded,
    })
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_purchase(
    State(state): State<AppState>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let response = record_purchase(&state.db, req).await?;
    Ok(Json(response))
}

async fn list_purchases(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = state.db.purchases().list().await?;

    let result: Vec<Value> = records
        .into_iter()
        .map(|p| {
            json!({
                "id": p.id,
                "purchase_no": p.purchase_no,
                "bill_no": p.bill_no,
                "date": p.date,
                "supplier": p.supplier_name.unwrap_or_else(|| "No Supplier".to_string()),
                "item": p.item_name.unwrap_or_else(|| "Unknown Item".to_string()),
                "qty": p.qty,
                "purchase_rate": p.purchase_rate,
                "sale_rate": p.sale_rate,
                "net_amount": p.net_amount,
                "description": p.description,
                "discount_percent": p.discount_percent,
                "discount": p.discount,
                "payment": p.payment,
                "balance": p.balance,
            })
        })
        .collect();

    Ok(Json(result))
}

/// Returns the whole batch the requested line belongs to, headed by that
/// line's own figures.
async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = state
        .db
        .purchases()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Purchase not found"))?;

    let batch = state
        .db
        .purchases()
        .list_by_purchase_no(&purchase.purchase_no)
        .await?;

    if batch.is_empty() {
        return Err(ApiError::not_found(
            "No items found for this purchase number",
        ));
    }

    let supplier_name = batch
        .iter()
        .find(|r| r.id == id)
        .and_then(|r| r.supplier_name.clone())
        .unwrap_or_else(|| "Unknown Supplier".to_string());

    // Lines whose item was since removed are skipped rather than rendered
    // with a dangling reference.
    let items: Vec<Value> = batch
        .iter()
        .filter(|r| r.item_id.is_some())
        .map(|r| {
            json!({
                "item_id": r.item_id,
                "item_name": r.item_name,
                "qty": r.qty,
                "purchase_rate": r.purchase_rate,
                "sale_rate": r.sale_rate,
                "net_amount": r.net_amount,
                "description": r.description.clone().unwrap_or_default(),
            })
        })
        .collect();

    Ok(Json(json!({
        "purchase_id": purchase.id,
        "purchase_no": purchase.purchase_no,
        "bill_no": purchase.bill_no,
        "date": purchase.date,
        "supplier_name": supplier_name,
        "net_amount": purchase.net_amount,
        "description": purchase.description,
        "discount_percent": purchase.discount_percent,
        "discount": purchase.discount,
        "payment": purchase.payment,
        "balance": purchase.balance,
        "items": items,
    })))
}

async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.purchases().get(id).await?.is_none() {
        return Err(ApiError::not_found("Purchase not found"));
    }

    state.db.purchases().delete(id).await?;
    Ok(Json(json!({ "message": "Purchase deleted" })))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use khata_core::{BalanceType, NewCustomer, NewItem, NewSupplier};
    use khata_db::DbConfig;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.suppliers()
            .insert(&NewSupplier {
                name: "Acme Fuels".to_string(),
                address: None,
                tel: None,
                mobile: None,
                email: None,
                cash_balance: None,
                cash_balance_type: BalanceType::Payable,
            })
            .await
            .unwrap();

        db.items()
            .insert(&NewItem {
                item_type: None,
                item_name: "Petrol".to_string(),
                item_code: "PET-01".to_string(),
                minimum_level: None,
                qty_per_packet: None,
                purchase_rate: Some(1.5),
                sale_rate: Some(2.0),
                wholesale_rate: None,
                sale_discount_percent: None,
                opening_stock: None,
                unit: None,
            })
            .await
            .unwrap();

        db.customers()
            .insert(&NewCustomer {
                name: "Walk-in".to_string(),
                address: None,
                tel: None,
                mobile: None,
                email: None,
                cash_balance: None,
                cash_balance_type: BalanceType::Receivable,
            })
            .await
            .unwrap();

        db
    }

    fn request(items: Vec<PurchaseItemRequest>) -> PurchaseRequest {
        PurchaseRequest {
            purchase_no: Some("PN-1".to_string()),
            supplier_name: Some("Acme Fuels".to_string()),
            items: Some(items),
            discount_percentage: Some(json!(10)),
            payment: Some(json!(20)),
        }
    }

    fn petrol_line(qty: Value) -> PurchaseItemRequest {
        PurchaseItemRequest {
            item_name: Some("Petrol".to_string()),
            qty: Some(qty),
            purchase_rate: Some(json!(5.0)),
            sale_rate: Some(json!(6.0)),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_record_purchase_figures() {
        let db = seeded_db().await;

        let response = record_purchase(&db, request(vec![petrol_line(json!(10))]))
            .await
            .unwrap();
        assert_eq!(response.message, "Purchase(s) added");
        assert_eq!(response.purchases.len(), 1);
        assert!(response.purchases[0].bill_no.starts_with("PET_"));

        // 10 × 5.0 = 50, 10% discount = 5, balance = 50 − 5 − 20 = 25
        let lines = db.purchases().list_by_purchase_no("PN-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].net_amount, 50.0);
        assert_eq!(lines[0].discount, 5.0);
        assert_eq!(lines[0].balance, 25.0);
    }

    #[tokio::test]
    async fn test_numeric_strings_accepted() {
        let db = seeded_db().await;

        record_purchase(&db, request(vec![petrol_line(json!("10"))]))
            .await
            .unwrap();

        let lines = db.purchases().list_by_purchase_no("PN-1").await.unwrap();
        assert_eq!(lines[0].qty, 10.0);
    }

    #[tokio::test]
    async fn test_non_numeric_qty_rejected() {
        let db = seeded_db().await;

        let err = record_purchase(&db, request(vec![petrol_line(json!("lots"))]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "qty must be numeric"));

        // The failed batch must not leave partial lines behind.
        assert!(db.purchases().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_supplier_and_item() {
        let db = seeded_db().await;

        let mut req = request(vec![petrol_line(json!(1))]);
        req.supplier_name = Some("Nobody".to_string());
        let err = record_purchase(&db, req).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.starts_with("Invalid supplier name")));

        let mut line = petrol_line(json!(1));
        line.item_name = Some("Diesel".to_string());
        let err = record_purchase(&db, request(vec![line])).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Invalid item: Diesel"));
    }

    #[tokio::test]
    async fn test_missing_line_fields() {
        let db = seeded_db().await;

        let line = PurchaseItemRequest {
            item_name: Some("Petrol".to_string()),
            qty: None,
            purchase_rate: None,
            sale_rate: None,
            description: None,
        };
        let err = record_purchase(&db, request(vec![line])).await.unwrap_err();
        assert!(
            matches!(err, ApiError::BadRequest(msg) if msg == "Each item must have item_name and qty")
        );
    }

    #[tokio::test]
    async fn test_catalog_rates_used_as_fallback() {
        let db = seeded_db().await;

        let line = PurchaseItemRequest {
            item_name: Some("Petrol".to_string()),
            qty: Some(json!(4)),
            purchase_rate: None,
            sale_rate: None,
            description: None,
        };
        record_purchase(&db, request(vec![line])).await.unwrap();

        let lines = db.purchases().list_by_purchase_no("PN-1").await.unwrap();
        // Catalog purchase_rate 1.5, sale_rate 2.0
        assert_eq!(lines[0].purchase_rate, 1.5);
        assert_eq!(lines[0].sale_rate, 2.0);
        assert_eq!(lines[0].net_amount, 6.0);
    }

    #[tokio::test]
    async fn test_multi_line_batch_unique_bill_nos() {
        let db = seeded_db().await;

        let response = record_purchase(
            &db,
            request(vec![petrol_line(json!(1)), petrol_line(json!(2))]),
        )
        .await
        .unwrap();

        assert_eq!(response.purchases.len(), 2);
        assert_ne!(
            response.purchases[0].bill_no,
            response.purchases[1].bill_no
        );
    }

    #[tokio::test]
    async fn test_empty_items_is_a_noop_batch() {
        let db = seeded_db().await;

        let response = record_purchase(&db, request(vec![])).await.unwrap();
        assert!(response.purchases.is_empty());
        assert!(db.purchases().list().await.unwrap().is_empty());
    }
}
