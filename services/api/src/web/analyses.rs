//! services/api/src/web/analyses.rs
//!
//! Analysis endpoints: request an analysis against an order and read back
//! pending/completed state. Execution belongs to the external worker.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use docuflow_core::domain::Analysis;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::WebError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AnalysisRequest {
    pub analysis_type: String,
}

#[derive(Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub analysis_type: String,
    pub result_data: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Analysis> for AnalysisResponse {
    fn from(analysis: Analysis) -> Self {
        Self {
            id: analysis.id,
            order_id: analysis.order_id,
            analysis_type: analysis.analysis_type.as_str().to_string(),
            result_data: analysis.result_data,
            status: analysis.status.as_str().to_string(),
            created_at: analysis.created_at,
            completed_at: analysis.completed_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /orders/{id}/analysis - Request an analysis for an order
#[utoipa::path(
    post,
    path = "/orders/{id}/analysis",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = AnalysisRequest,
    responses(
        (status = 201, description = "Pending analysis recorded", body = AnalysisResponse),
        (status = 400, description = "Unsupported analysis type"),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No such order")
    )
)]
pub async fn request_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, WebError> {
    let analysis = state
        .analyses
        .request(order_id, &req.analysis_type, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(AnalysisResponse::from(analysis))))
}

/// GET /orders/{id}/analysis - List analyses for an order
#[utoipa::path(
    get,
    path = "/orders/{id}/analysis",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Analyses for the order", body = [AnalysisResponse]),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No such order")
    )
)]
pub async fn list_analyses_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let analyses = state.analyses.list_for_order(order_id, user_id).await?;
    let body: Vec<AnalysisResponse> = analyses.into_iter().map(AnalysisResponse::from).collect();
    Ok(Json(body))
}

/// GET /analysis/{id} - Get one analysis
#[utoipa::path(
    get,
    path = "/analysis/{id}",
    params(("id" = Uuid, Path, description = "Analysis id")),
    responses(
        (status = 200, description = "The analysis", body = AnalysisResponse),
        (status = 403, description = "Caller does not own the parent order"),
        (status = 404, description = "No such analysis")
    )
)]
pub async fn get_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(analysis_id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let analysis = state.analyses.get(analysis_id, user_id).await?;
    Ok(Json(AnalysisResponse::from(analysis)))
}
