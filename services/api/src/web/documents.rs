//! services/api/src/web/documents.rs
//!
//! Document endpoints: multipart upload against an order, metadata reads,
//! download and delete.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use docuflow_core::domain::Document;
use docuflow_core::ports::ServiceError;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::WebError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            order_id: document.order_id,
            filename: document.filename,
            file_type: document.file_type.as_str().to_string(),
            status: document.status,
            uploaded_at: document.uploaded_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /orders/{id}/documents - Upload a document to an order
///
/// Accepts a multipart/form-data request with a single file part.
#[utoipa::path(
    post,
    path = "/orders/{id}/documents",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body(content_type = "multipart/form-data", description = "The document to upload."),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Missing file or disallowed file type"),
        (status = 403, description = "Caller does not own this order"),
        (status = 404, description = "No such order")
    )
)]
pub async fn upload_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(order_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, WebError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(format!("failed to read multipart data: {}", e)))?
        .ok_or_else(|| ServiceError::BadRequest("no file provided".to_string()))?;

    let filename = field.file_name().map(|n| n.to_string());
    let bytes: bytes::Bytes = field
        .bytes()
        .await
        .map_err(|e| ServiceError::BadRequest(format!("failed to read file bytes: {}", e)))?;

    let document = state
        .documents
        .upload(order_id, user_id, filename.as_deref(), &bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// GET /documents/{id} - Get document metadata
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document metadata", body = DocumentResponse),
        (status = 403, description = "Caller does not own the parent order"),
        (status = 404, description = "No such document")
    )
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let document = state.documents.get(document_id, user_id).await?;
    Ok(Json(DocumentResponse::from(document)))
}

/// GET /documents/{id}/download - Download the stored file
#[utoipa::path(
    get,
    path = "/documents/{id}/download",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The file as an attachment"),
        (status = 403, description = "Caller does not own the parent order"),
        (status = 404, description = "Document or stored file missing")
    )
)]
pub async fn download_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let (document, bytes) = state.documents.download(document_id, user_id).await?;
    let headers = [
        (
            header::CONTENT_TYPE,
            document.file_type.mime_type().to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.filename),
        ),
    ];
    Ok((headers, bytes))
}

/// DELETE /documents/{id} - Delete a document and its stored file
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 403, description = "Caller does not own the parent order"),
        (status = 404, description = "No such document")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    state.documents.delete(document_id, user_id).await?;
    Ok(Json(json!({ "message": "document deleted successfully" })))
}
