//! Supplier CRUD routes.
//!
//! Deletion is guarded against purchase references.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;
use khata_core::NewSupplier;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suppliers", post(create_supplier).get(list_suppliers))
        .route(
            "/suppliers/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

async fn create_supplier(
    State(state): State<AppState>,
    payload: Result<Json<NewSupplier>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_supplier) = payload?;
    let supplier = state.db.suppliers().insert(&new_supplier).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Supplier created", "supplier": supplier })),
    ))
}

async fn list_suppliers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state.db.suppliers().list().await?;
    Ok(Json(suppliers))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .db
        .suppliers()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier not found"))?;

    Ok(Json(supplier))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<NewSupplier>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(changes) = payload?;
    let supplier = state.db.suppliers().update(id, &changes).await?;

    Ok(Json(json!({ "message": "Supplier updated", "supplier": supplier })))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.suppliers().get(id).await?.is_none() {
        return Err(ApiError::not_found("Supplier not found"));
    }

    if state.db.purchases().count_for_supplier(id).await? > 0 {
        return Err(ApiError::conflict(
            "Cannot delete supplier, it is associated with one or more purchases.",
        ));
    }

    state.db.suppliers().delete(id).await?;
    Ok(Json(json!({ "message": "Supplier deleted" })))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use khata_core::{BalanceMode, BalanceType, NewItem, NewPurchaseLine};
    use khata_db::{Database, DbConfig};

    /// Seeds one supplier and one item; returns the state and the
    /// (supplier, item) ids.
    async fn seeded_state() -> (AppState, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let supplier = db
            .suppliers()
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

        let item = db
            .items()
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

        let state = AppState {
            db,
            balance_mode: BalanceMode::WholeSlip,
        };
        (state, supplier.id, item.id)
    }

    async fn seed_purchase(state: &AppState, supplier_id: i64, item_id: i64) {
        let mut tx = state.db.pool().begin().await.unwrap();
        state
            .db
            .purchases()
            .insert_line(
                &mut tx,
                &NewPurchaseLine {
                    purchase_no: "PN-1".to_string(),
                    bill_no: "PET_AAAAA1".to_string(),
                    supplier_id,
                    item_id,
                    qty: 1.0,
                    purchase_rate: 1.5,
                    sale_rate: 2.0,
                    net_amount: 1.5,
                    description: None,
                    discount_percent: 0.0,
                    discount: 0.0,
                    payment: 0.0,
                    balance: 1.5,
                },
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_blocked_by_purchase_reference() {
        let (state, supplier_id, item_id) = seeded_state().await;
        seed_purchase(&state, supplier_id, item_id).await;

        let err = match delete_supplier(State(state.clone()), Path(supplier_id)).await {
            Ok(_) => panic!("delete should have been blocked"),
            Err(err) => err,
        };
        assert!(
            matches!(err, ApiError::Conflict(msg) if msg == "Cannot delete supplier, it is associated with one or more purchases.")
        );

        // The guarded supplier must survive the attempt.
        assert!(state.db.suppliers().get(supplier_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreferenced_supplier_deletes() {
        let (state, supplier_id, _) = seeded_state().await;

        assert!(delete_supplier(State(state.clone()), Path(supplier_id))
            .await
            .is_ok());
        assert!(state.db.suppliers().get(supplier_id).await.unwrap().is_none());
    }
}
