//! services/api/src/web/orders.rs
//!
//! Order endpoints: create, list, get and status update. The caller's
//! identity arrives from the auth middleware as an `Extension<Uuid>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use docuflow_core::domain::Order;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::WebError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status.as_str().to_string(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /orders - Create a new order for the current user
#[utoipa::path(
    post,
    path = "/orders",
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let order = state.orders.create(user_id).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET /orders - List the current user's orders
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders owned by the caller", body = [OrderResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let orders = state.orders.list(user_id).await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(body))
}

/// GET /orders/{id} - Get one order (ownership-checked)
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderResponse),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No such order")
    )
)]
pub async fn get_order_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let order = state.orders.get(order_id, user_id).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// PUT /orders/{id}/status - Update an order's status
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Status not in the valid set"),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No such order")
    )
)]
pub async fn update_order_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, WebError> {
    let order = state
        .orders
        .update_status(order_id, &req.status, user_id)
        .await?;
    Ok(Json(OrderResponse::from(order)))
}
