//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.
//!
//! Identity is resolved once per request and handed to handlers as an
//! explicit `Extension<Uuid>` argument; nothing downstream re-reads the
//! cookie.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// The name of the auth session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Pulls the auth session id out of a Cookie header value.
pub fn session_from_cookie_header(header_value: &str) -> Option<&str> {
    header_value
        .split(';')
        .find_map(|c| c.trim().strip_prefix(SESSION_COOKIE).and_then(|rest| rest.strip_prefix('=')))
}

/// Middleware that validates the auth session cookie and extracts the
/// caller's user id.
///
/// If valid, inserts the user id into request extensions for handlers to
/// use. If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let session_id =
        session_from_cookie_header(cookie_header).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .store
        .validate_auth_session(session_id)
        .await
        .map_err(|e| {
            debug!("auth session rejected: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
