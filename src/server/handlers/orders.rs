//! Fulfillment order endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use log::{error, info};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::super::state::AppState;
use super::{JsonError, json_error, status_for};
use crate::error::PosterError;
use crate::services::Order;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// POST /api/orders - Forward an order to the fulfillment API.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(order): Json<Order>,
) -> Result<Json<Value>, JsonError> {
    let order = order.with_reference_id();
    info!("Received order {}", order.order_reference_id);

    let err = match state.fulfillment.create_order(&order).await {
        Ok(created) => return Ok(Json(json!({ "success": true, "order": created }))),
        Err(e) => e,
    };

    let status = status_for(&err);
    match err {
        PosterError::Rejected { message, details, .. } => {
            Err((status, Json(json!({ "error": message, "details": details }))))
        }
        other => {
            error!("Error creating order: {}", other);
            Err(json_error(status, other.to_string()))
        }
    }
}

/// GET /api/orders?orderId=... - Look up an order.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Value>, JsonError> {
    let order_id = query
        .order_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| json_error(StatusCode::BAD_REQUEST, "Order ID is required"))?;

    let order = state.fulfillment.get_order(&order_id).await.map_err(|e| {
        error!("Error getting order {}: {}", order_id, e);
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get order")
    })?;

    Ok(Json(json!({ "success": true, "order": order })))
}
