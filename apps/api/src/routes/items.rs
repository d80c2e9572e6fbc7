//! Item CRUD routes.
//!
//! Deletion is guarded: an item referenced by any purchase or sale line
//! cannot be removed, because recorded documents would lose their catalog
//! link.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;
use khata_core::NewItem;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}

async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_item) = payload?;
    let item = state.db.items().insert(&new_item).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Item created", "item": item })),
    ))
}

async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.db.items().list().await?;
    Ok(Json(items))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .db
        .items()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(changes) = payload?;
    let item = state.db.items().update(id, &changes).await?;

    Ok(Json(json!({ "message": "Item updated", "item": item })))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.items().get(id).await?.is_none() {
        return Err(ApiError::not_found("Item not found"));
    }

    if state.db.purchases().count_for_item(id).await? > 0 {
        return Err(ApiError::conflict(
            "Cannot delete item, it is associated with purchases",
        ));
    }
    if state.db.sales().count_for_item(id).await? > 0 {
        return Err(ApiError::conflict(
            "Cannot delete item, it is associated with sales",
        ));
    }

    state.db.items().delete(id).await?;
    Ok(Json(json!({ "message": "Item deleted successfully" })))
}

// =============================================================================
// Unit Tests
// =============================================================================
