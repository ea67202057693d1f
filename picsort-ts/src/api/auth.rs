//! Session middleware for picsort-ts
//!
//! Every protected route requires the active working token in the
//! `X-Picsort-Session` header. The middleware checks it against the
//! session arbiter; health and session-acquisition routes do not pass
//! through here.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::error::ApiError;
use crate::error::{Error, Result};
use crate::AppState;

/// Header carrying the session token
pub const SESSION_HEADER: &str = "x-picsort-session";

/// Parse the session token from request headers
pub fn token_from_headers(headers: &HeaderMap) -> Result<Uuid> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or(Error::Unauthorized)
}

/// Session authorization middleware
///
/// Returns 401 Unauthorized when the header is missing, malformed, or
/// does not name the live session.
pub async fn session_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let token = token_from_headers(request.headers())?;
    state.engine.lock().await.authorize(token)?;
    Ok(next.run(request).await)
}
