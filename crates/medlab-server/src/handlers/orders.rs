//! Order lifecycle endpoints: creation, partial update and result entry.
//!
//! Inbound payloads use the external camelCase vocabulary; empty-string
//! `priority`/`status` on update read as "leave unchanged" while an empty
//! `notes` string is a real update that clears nothing but whitespace.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_core::{OrderStatus, Priority};
use medlab_db_mysql::queries::orders::{self, NewOrder, OrderChanges, ResultItem};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::handlers::{read_err, write_err};
use crate::server::AppState;

/// Payload for POST /api/orders.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub patient_id: i64,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub test_ids: Vec<i64>,
}

/// Payload for PUT /api/orders/{order_id}.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for PUT /api/orders/{order_id}/results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultsRequest {
    #[serde(default)]
    pub results: Vec<ResultEntry>,
    #[serde(default = "default_mark_completed")]
    pub mark_completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub test_id: i64,
    #[serde(default)]
    pub value: Option<Decimal>,
}

fn default_mark_completed() -> bool {
    true
}

/// GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = orders::list_orders(&state.pool).await.map_err(read_err)?;
    Ok(Json(rows))
}

/// GET /api/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = orders::get_order(&state.pool, order_id)
        .await
        .map_err(read_err)?;
    Ok(Json(detail))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = NewOrder {
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        priority: req
            .priority
            .as_deref()
            .map(Priority::from_external)
            .unwrap_or_default(),
        notes: req.notes,
        test_ids: req.test_ids,
    };

    let order_id = orders::create_order(&state.pool, &order)
        .await
        .map_err(write_err)?;
    Ok(Json(json!({ "order_id": order_id })))
}

/// PUT /api/orders/{order_id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = OrderChanges {
        priority: req
            .priority
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(Priority::from_external),
        status: req
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(OrderStatus::from_external),
        notes: req.notes,
    };

    orders::update_order(&state.pool, order_id, &changes)
        .await
        .map_err(write_err)?;
    Ok(Json(json!({ "status": "ok" })))
}

/// PUT /api/orders/{order_id}/results
pub async fn submit_results(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(req): Json<SubmitResultsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let results: Vec<ResultItem> = req
        .results
        .into_iter()
        .map(|r| ResultItem {
            test_id: r.test_id,
            value: r.value,
        })
        .collect();

    orders::submit_results(&state.pool, order_id, &results, req.mark_completed)
        .await
        .map_err(write_err)?;
    Ok(Json(json!({
        "status": "ok",
        "message": "Results updated successfully"
    })))
}
