//! Customer CRUD routes.
//!
//! Deletion is guarded against sale references.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;
use khata_core::NewCustomer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer).get(list_customers))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_customer) = payload?;
    let customer = state.db.customers().insert(&new_customer).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Customer created", "customer": customer })),
    ))
}

async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .db
        .customers()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer not found"))?;

    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(changes) = payload?;
    let customer = state.db.customers().update(id, &changes).await?;

    Ok(Json(json!({ "message": "Customer updated", "customer": customer })))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.customers().get(id).await?.is_none() {
        return Err(ApiError::not_found("Customer not found"));
    }

    if state.db.sales().count_for_customer(id).await? > 0 {
        return Err(ApiError::conflict(
            "Cannot delete customer, they are associated with purchases or sales",
        ));
    }

    state.db.customers().delete(id).await?;
    Ok(Json(json!({ "message": "Customer deleted" })))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use khata_core::{BalanceMode, BalanceType, NewItem, NewSaleLine};
    use khata_db::{Database, DbConfig};

    /// Seeds one customer and one item; returns the state and the
    /// (customer, item) ids.
    async fn seeded_state() -> (AppState, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let customer = db
            .customers()
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
        (state, customer.id, item.id)
    }

    async fn seed_sale(state: &AppState, customer_id: i64, item_id: i64) {
        let mut tx = state.db.pool().begin().await.unwrap();
        state
            .db
            .sales()
            .insert_line(
                &mut tx,
                &NewSaleLine {
                    slip_no: "S-1".to_string(),
                    salesperson: "Ali".to_string(),
                    cashier: "Ali".to_string(),
                    customer_id,
                    item_id,
                    previous_reading: 0.0,
                    current_reading: 1.0,
                    qty: 1.0,
                    unit_rate: 2.0,
                    net_amount: 2.0,
                    cash: 2.0,
                    balance: 0.0,
                },
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_blocked_by_sale_reference() {
        let (state, customer_id, item_id) = seeded_state().await;
        seed_sale(&state, customer_id, item_id).await;

        let err = match delete_customer(State(state.clone()), Path(customer_id)).await {
            Ok(_) => panic!("delete should have been blocked"),
            Err(err) => err,
        };
        assert!(
            matches!(err, ApiError::Conflict(msg) if msg == "Cannot delete customer, they are associated with purchases or sales")
        );

        // The guarded customer must survive the attempt.
        assert!(state.db.customers().get(customer_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreferenced_customer_deletes() {
        let (state, customer_id, _) = seeded_state().await;

        assert!(delete_customer(State(state.clone()), Path(customer_id))
            .await
            .is_ok());
        assert!(state.db.customers().get(customer_id).await.unwrap().is_none());
    }
}
