//! services/api/src/web/mod.rs
//!
//! The Axum transport layer: handlers, auth middleware, shared state and
//! the master OpenAPI definition.

pub mod analyses;
pub mod auth;
pub mod documents;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod payments;
pub mod state;

pub use error::WebError;
pub use middleware::require_auth;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        orders::create_order_handler,
        orders::list_orders_handler,
        orders::get_order_handler,
        orders::update_order_status_handler,
        documents::upload_document_handler,
        documents::get_document_handler,
        documents::download_document_handler,
        documents::delete_document_handler,
        analyses::request_analysis_handler,
        analyses::list_analyses_handler,
        analyses::get_analysis_handler,
        payments::create_payment_intent_handler,
        payments::confirm_payment_handler,
    ),
    components(schemas(
        auth::SignupRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        orders::OrderResponse,
        orders::UpdateOrderStatusRequest,
        documents::DocumentResponse,
        analyses::AnalysisRequest,
        analyses::AnalysisResponse,
        payments::CreatePaymentIntentRequest,
        payments::PaymentIntentResponse,
        payments::ConfirmPaymentRequest,
        error::ErrorBody,
    )),
    tags(
        (name = "docuflow API", description = "Order, document, analysis and payment endpoints.")
    )
)]
pub struct ApiDoc;
