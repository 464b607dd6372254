//! services/api/src/web/payments.rs
//!
//! Payment endpoints: create a payment intent against the external
//! processor and confirm it once the caller has paid.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::WebError;
use crate::web::state::AppState;

/// Minor-unit amount charged when the request does not specify one.
const DEFAULT_AMOUNT_MINOR: i64 = 1000;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, Default, ToSchema)]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor currency units (e.g. cents). Defaults to 1000.
    pub amount: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /orders/{id}/payment-intent - Create a payment intent for an order
#[utoipa::path(
    post,
    path = "/orders/{id}/payment-intent",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 201, description = "Intent created", body = PaymentIntentResponse),
        (status = 400, description = "Invalid amount or processor error"),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No such order"),
        (status = 409, description = "A pending intent already exists for this order")
    )
)]
pub async fn create_payment_intent_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
    body: Option<Json<CreatePaymentIntentRequest>>,
) -> Result<impl IntoResponse, WebError> {
    let amount = body
        .and_then(|Json(req)| req.amount)
        .unwrap_or(DEFAULT_AMOUNT_MINOR);

    let created = state.payments.create_intent(order_id, amount, user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentIntentResponse {
            client_secret: created.client_secret,
        }),
    ))
}

/// POST /orders/{id}/payment-confirm - Confirm a payment intent
#[utoipa::path(
    post,
    path = "/orders/{id}/payment-confirm",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment confirmed; order is paid"),
        (status = 400, description = "Intent not yet succeeded, or processor error"),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No matching intent for this order"),
        (status = 409, description = "Payment already confirmed")
    )
)]
pub async fn confirm_payment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, WebError> {
    state
        .payments
        .confirm(order_id, &req.payment_intent_id, user_id)
        .await?;
    Ok(Json(json!({ "message": "payment confirmed successfully" })))
}
