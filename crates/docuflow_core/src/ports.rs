//! crates/docuflow_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! database, the payment processor, or the file store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Analysis, AnalysisType, Document, DocumentKind, Order, OrderStatus, Payment, PaymentStatus,
    User, UserCredentials,
};

//=========================================================================================
// Core Error and Result Types
//=========================================================================================

/// The domain error taxonomy.
///
/// Every variant maps 1:1 to a transport status code, so nothing is lost
/// between the service layer and the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid input shape or an unsupported enum value.
    #[error("{0}")]
    BadRequest(String),
    /// Caller is authenticated but does not own the resource.
    #[error("{0}")]
    Forbidden(String),
    /// The referenced entity or file does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Duplicate in-flight intent, or re-confirmation of a terminal payment.
    #[error("{0}")]
    Conflict(String),
    /// The external payment processor reported an error. Surfaced to the
    /// caller, never retried inside a request.
    #[error("payment processor error: {0}")]
    Processor(String),
    /// Anything that should not happen: storage faults, broken invariants.
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, ServiceError>`.
pub type ServiceResult<T> = Result<T, ServiceError>;

//=========================================================================================
// Entity Store Port
//=========================================================================================

/// Persistent storage for the five aggregates, with transactional semantics
/// where the payment flow needs them.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Users and auth sessions ---
    async fn create_user(&self, email: &str, hashed_password: &str) -> ServiceResult<User>;

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<User>;

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> ServiceResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> ServiceResult<()>;

    // --- Orders ---
    async fn create_order(&self, user_id: Uuid) -> ServiceResult<Order>;

    async fn get_order(&self, order_id: Uuid) -> ServiceResult<Order>;

    async fn list_orders(&self, user_id: Uuid) -> ServiceResult<Vec<Order>>;

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> ServiceResult<Order>;

    // --- Documents ---
    async fn insert_document(
        &self,
        id: Uuid,
        order_id: Uuid,
        filename: &str,
        stored_path: &str,
        file_type: DocumentKind,
    ) -> ServiceResult<Document>;

    async fn get_document(&self, document_id: Uuid) -> ServiceResult<Document>;

    async fn delete_document(&self, document_id: Uuid) -> ServiceResult<()>;

    // --- Analyses ---
    async fn insert_analysis(
        &self,
        order_id: Uuid,
        analysis_type: AnalysisType,
    ) -> ServiceResult<Analysis>;

    async fn get_analysis(&self, analysis_id: Uuid) -> ServiceResult<Analysis>;

    async fn list_analyses(&self, order_id: Uuid) -> ServiceResult<Vec<Analysis>>;

    // --- Payments ---

    /// Returns the pending payment for an order, if one is in flight.
    async fn find_pending_payment(&self, order_id: Uuid) -> ServiceResult<Option<Payment>>;

    async fn find_payment_by_intent(
        &self,
        order_id: Uuid,
        intent_id: &str,
    ) -> ServiceResult<Option<Payment>>;

    /// Inserts a pending payment row.
    ///
    /// Implementations must reject a second pending payment for the same
    /// order with `ServiceError::Conflict`, even under concurrent inserts
    /// (the adapter backs this with a partial unique index).
    async fn insert_pending_payment(
        &self,
        order_id: Uuid,
        intent_id: &str,
        amount: Decimal,
        currency: &str,
    ) -> ServiceResult<Payment>;

    /// Persists a processor-reported interim status onto a payment.
    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: &PaymentStatus,
    ) -> ServiceResult<()>;

    /// Marks the payment succeeded and the order paid in one transaction.
    /// Both writes land or neither does.
    async fn complete_payment(&self, payment_id: Uuid, order_id: Uuid) -> ServiceResult<()>;
}

//=========================================================================================
// Payment Processor Port
//=========================================================================================

/// The external processor's handle for an authorized-but-unsettled charge.
#[derive(Debug, Clone)]
pub struct IntentHandle {
    pub intent_id: String,
    /// The client-facing secret the caller needs for its payment
    /// collection step.
    pub client_secret: String,
}

/// The external payment processor. Authoritative for payment state; the
/// core never invents payment success locally.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Creates an intent for `amount_minor` minor currency units.
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        order_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<IntentHandle>;

    /// Queries the processor for the current status of an intent.
    async fn retrieve_intent_status(&self, intent_id: &str) -> ServiceResult<String>;
}

//=========================================================================================
// File Store Port
//=========================================================================================

/// A staged upload: bytes written to a temporary location, not yet visible
/// at the final locator.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub staging_locator: String,
    pub final_locator: String,
}

/// Physical storage for uploaded documents.
///
/// Uploads are two-phase: `stage` writes the bytes aside, and `promote`
/// atomically moves them to the final locator once the database row has
/// committed. A failed commit calls `discard`, so no orphaned file is left
/// behind.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn stage(&self, key: &str, bytes: &[u8]) -> ServiceResult<StagedFile>;

    async fn promote(&self, staged: &StagedFile) -> ServiceResult<()>;

    async fn discard(&self, staged: &StagedFile) -> ServiceResult<()>;

    async fn read(&self, locator: &str) -> ServiceResult<Vec<u8>>;

    /// Removes a stored file. Implementations tolerate an already-missing
    /// file and report success.
    async fn delete(&self, locator: &str) -> ServiceResult<()>;

    async fn exists(&self, locator: &str) -> ServiceResult<bool>;
}
