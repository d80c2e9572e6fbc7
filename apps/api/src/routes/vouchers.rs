//! # Voucher Routes
//!
//! Credit and debit voucher endpoints. A voucher request carries one
//! counter-account and a batch of account lines; every line is inserted in
//! one transaction under the shared voucher number.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;
use khata_core::validation::{numeric_field, required_str};
use khata_db::{Database, NewCreditVoucherLine, NewDebitVoucherLine};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(list_credit_vouchers).post(create_credit_voucher))
        .route("/vouchers/{id}", get(get_credit_voucher).delete(delete_credit_voucher))
        .route("/debit_vouchers", get(list_debit_vouchers).post(create_debit_voucher))
        .route(
            "/debit_vouchers/{id}",
            get(get_debit_voucher).delete(delete_debit_voucher),
        )
}

// =============================================================================
// Request Types
// =============================================================================

/// Credit voucher request body.
#[derive(Debug, Deserialize)]
pub struct CreditVoucherRequest {
    pub voucher_no: Option<String>,
    pub cr_account: Option<String>,
    #[serde(default)]
    pub accounts: Vec<CreditAccountRequest>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Debit voucher request body.
#[derive(Debug, Deserialize)]
pub struct DebitVoucherRequest {
    pub voucher_no: Option<String>,
    pub db_account: Option<String>,
    #[serde(default)]
    pub accounts: Vec<DebitAccountRequest>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One account line of a credit voucher. `debit` accepts a JSON number or a
/// numeric string.
#[derive(Debug, Deserialize)]
pub struct CreditAccountRequest {
    pub account_code: Option<String>,
    pub account_name: Option<String>,
    pub debit: Option<Value>,
}

/// One account line of a debit voucher, keyed `credit` on the wire.
#[derive(Debug, Deserialize)]
pub struct DebitAccountRequest {
    pub account_code: Option<String>,
    pub account_name: Option<String>,
    pub credit: Option<Value>,
}

/// Validates an account line and coerces its amount.
fn resolve_account(
    code: Option<&str>,
    name: Option<&str>,
    amount_field: &'static str,
    amount: Option<&Value>,
) -> Result<(String, String, f64), ApiError> {
    let code = required_str("account_code", code)?.to_string();
    let name = required_str("account_name", name)?.to_string();
    let raw = amount.ok_or(khata_core::ValidationError::Required {
        field: amount_field,
    })
    .map_err(khata_core::CoreError::from)?;
    let value = numeric_field(amount_field, raw)?;
    Ok((code, name, value))
}

// =============================================================================
// Recorders
// =============================================================================

/// Records a credit voucher batch atomically, returning the stored lines.
pub async fn record_credit_voucher(
    db: &Database,
    req: CreditVoucherRequest,
) -> Result<Vec<khata_core::CreditVoucher>, ApiError> {
    let voucher_no = required_str("voucher_no", req.voucher_no.as_deref())?.to_string();
    let cr_account = required_str("cr_account", req.cr_account.as_deref())?.to_string();

    if req.accounts.is_empty() {
        return Err(ApiError::bad_request("Accounts list is required."));
    }

    // Validate every line before the first insert.
    let mut lines = Vec::with_capacity(req.accounts.len());
    for account in &req.accounts {
        let (account_code, account_name, debit) = resolve_account(
            account.account_code.as_deref(),
            account.account_name.as_deref(),
            "debit",
            account.debit.as_ref(),
        )?;
        lines.push(NewCreditVoucherLine {
            voucher_no: voucher_no.clone(),
            cr_account: cr_account.clone(),
            account_code,
            account_name,
            debit,
            description: req.description.clone(),
        });
    }

    let mut tx = db.pool().begin().await.map_err(khata_db::DbError::from)?;
    let mut stored = Vec::with_capacity(lines.len());
    for line in &lines {
        stored.push(db.vouchers().insert_credit(&mut tx, line).await?);
    }
    tx.commit().await.map_err(khata_db::DbError::from)?;

    Ok(stored)
}

/// Records a debit voucher batch atomically, returning the stored lines.
pub async fn record_debit_voucher(
    db: &Database,
    req: DebitVoucherRequest,
) -> Result<Vec<khata_core::DebitVoucher>, ApiError> {
    let voucher_no = required_str("voucher_no", req.voucher_no.as_deref())?.to_string();
    let db_account = required_str("db_account", req.db_account.as_deref())?.to_string();

    if req.accounts.is_empty() {
        return Err(ApiError::bad_request("Accounts list is required."));
    }

    let mut lines = Vec::with_capacity(req.accounts.len());
    for account in &req.accounts {
        let (account_code, account_name, credit) = resolve_account(
            account.account_code.as_deref(),
            account.account_name.as_deref(),
            "credit",
            account.credit.as_ref(),
        )?;
        lines.push(NewDebitVoucherLine {
            voucher_no: voucher_no.clone(),
            db_account: db_account.clone(),
            account_code,
            account_name,
            credit,
            description: req.description.clone(),
        });
    }

    let mut tx = db.pool().begin().await.map_err(khata_db::DbError::from)?;
    let mut stored = Vec::with_capacity(lines.len());
    for line in &lines {
        stored.push(db.vouchers().insert_debit(&mut tx, line).await?);
    }
    tx.commit().await.map_err(khata_db::DbError::from)?;

    Ok(stored)
}

// =============================================================================
// Credit Voucher Handlers
// =============================================================================

async fn create_credit_voucher(
    State(state): State<AppState>,
    payload: Result<Json<CreditVoucherRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let stored = record_credit_voucher(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn list_credit_vouchers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let vouchers = state.db.vouchers().list_credit().await?;
    Ok(Json(vouchers))
}

/// Returns the whole voucher batch the requested line belongs to.
async fn get_credit_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let voucher = state
        .db
        .vouchers()
        .get_credit(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Voucher not found"))?;

    let batch = state.db.vouchers().list_credit_by_no(&voucher.voucher_no).await?;
    let total_debit: f64 = batch.iter().map(|v| v.debit).sum();

    Ok(Json(json!({
        "voucher_no": voucher.voucher_no,
        "cr_account": voucher.cr_account,
        "description": voucher.description,
        "date": voucher.date,
        "accounts": batch.iter().map(|v| json!({
            "account_code": v.account_code,
            "account_name": v.account_name,
            "debit": v.debit,
        })).collect::<Vec<_>>(),
        "total_debit": total_debit,
    })))
}

async fn delete_credit_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.vouchers().get_credit(id).await?.is_none() {
        return Err(ApiError::not_found("Voucher not found"));
    }

    state.db.vouchers().delete_credit(id).await?;
    Ok(Json(json!({ "message": "Voucher deleted" })))
}

// =============================================================================
// Debit Voucher Handlers
// =============================================================================

async fn create_debit_voucher(
    State(state): State<AppState>,
    payload: Result<Json<DebitVoucherRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let stored = record_debit_voucher(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn list_debit_vouchers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let vouchers = state.db.vouchers().list_debit().await?;
    Ok(Json(vouchers))
}

async fn get_debit_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let voucher = state
        .db
        .vouchers()
        .get_debit(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debit Voucher not found"))?;

    let batch = state.db.vouchers().list_debit_by_no(&voucher.voucher_no).await?;
    let total_credit: f64 = batch.iter().map(|v| v.credit).sum();

    Ok(Json(json!({
        "voucher_no": voucher.voucher_no,
        "db_account": voucher.db_account,
        "description": voucher.description,
        "date": voucher.date,
        "accounts": batch.iter().map(|v| json!({
            "account_code": v.account_code,
            "account_name": v.account_name,
            "credit": v.credit,
        })).collect::<Vec<_>>(),
        "total_credit": total_credit,
    })))
}

async fn delete_debit_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.vouchers().get_debit(id).await?.is_none() {
        return Err(ApiError::not_found("Debit Voucher not found"));
    }

    state.db.vouchers().delete_debit(id).await?;
    Ok(Json(json!({ "message": "Debit Voucher deleted" })))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use khata_db::DbConfig;

    fn debit_account(code: &str, debit: Value) -> CreditAccountRequest {
        CreditAccountRequest {
            account_code: Some(code.to_string()),
            account_name: Some(format!("Account {code}")),
            debit: Some(debit),
        }
    }

    fn credit_account(code: &str, credit: Value) -> DebitAccountRequest {
        DebitAccountRequest {
            account_code: Some(code.to_string()),
            account_name: Some(format!("Account {code}")),
            credit: Some(credit),
        }
    }

    #[tokio::test]
    async fn test_record_credit_voucher_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let stored = record_credit_voucher(
            &db,
            CreditVoucherRequest {
                voucher_no: Some("CV-9".to_string()),
                cr_account: Some("in hand".to_string()),
                accounts: vec![
                    debit_account("4001", json!(150)),
                    debit_account("4002", json!("50")),
                ],
                description: Some("Month end".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|v| v.voucher_no == "CV-9"));
        assert_eq!(stored[1].debit, 50.0);

        let total: f64 = db
            .vouchers()
            .list_credit_by_no("CV-9")
            .await
            .unwrap()
            .iter()
            .map(|v| v.debit)
            .sum();
        assert_eq!(total, 200.0);
    }

    #[tokio::test]
    async fn test_empty_accounts_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = record_credit_voucher(
            &db,
            CreditVoucherRequest {
                voucher_no: Some("CV-9".to_string()),
                cr_account: Some("in hand".to_string()),
                accounts: vec![],
                description: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Accounts list is required."));
    }

    #[tokio::test]
    async fn test_bad_amount_inserts_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = record_credit_voucher(
            &db,
            CreditVoucherRequest {
                voucher_no: Some("CV-9".to_string()),
                cr_account: Some("in hand".to_string()),
                accounts: vec![
                    debit_account("4001", json!(150)),
                    debit_account("4002", json!("lots")),
                ],
                description: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "debit must be numeric"));
        assert!(db.vouchers().list_credit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_debit_voucher_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let stored = record_debit_voucher(
            &db,
            DebitVoucherRequest {
                voucher_no: Some("DV-3".to_string()),
                db_account: Some("online".to_string()),
                accounts: vec![credit_account("5001", json!(300))],
                description: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].db_account, "online");
        assert_eq!(stored[0].credit, 300.0);
    }

    #[tokio::test]
    async fn test_wire_payloads_use_debit_and_credit_keys() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Account lines arrive keyed "debit" on credit vouchers and
        // "credit" on debit vouchers.
        let req: CreditVoucherRequest = serde_json::from_value(json!({
            "voucher_no": "CV-1",
            "cr_account": "in hand",
            "accounts": [
                { "account_code": "4001", "account_name": "Cash", "debit": 150 }
            ]
        }))
        .unwrap();
        let stored = record_credit_voucher(&db, req).await.unwrap();
        assert_eq!(stored[0].debit, 150.0);

        let req: DebitVoucherRequest = serde_json::from_value(json!({
            "voucher_no": "DV-1",
            "db_account": "online",
            "accounts": [
                { "account_code": "5001", "account_name": "Rent", "credit": 300 }
            ]
        }))
        .unwrap();
        let stored = record_debit_voucher(&db, req).await.unwrap();
        assert_eq!(stored[0].credit, 300.0);
    }

    #[tokio::test]
    async fn test_missing_debit_key_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let req: CreditVoucherRequest = serde_json::from_value(json!({
            "voucher_no": "CV-1",
            "cr_account": "in hand",
            "accounts": [
                { "account_code": "4001", "account_name": "Cash" }
            ]
        }))
        .unwrap();
        let err = record_credit_voucher(&db, req).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.ends_with("debit is required")));
    }
}
