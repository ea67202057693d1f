//! Session acquisition and heartbeat handlers

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use uuid::Uuid;

use super::auth::token_from_headers;
use super::error::ApiResult;
use crate::error::Error;
use crate::AppState;

/// Session token response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: Uuid,
}

/// POST /api/session
///
/// Grants the working token when no live session exists; 409 otherwise.
/// A rejected caller just tries again later - nothing is queued.
pub async fn acquire_session(State(state): State<AppState>) -> ApiResult<Json<SessionResponse>> {
    let token = state.engine.lock().await.acquire_session()?;
    Ok(Json(SessionResponse { token }))
}

/// POST /api/session/heartbeat
///
/// Refreshes the active session. A missing, malformed, or superseded
/// token answers 401 SessionExpired; the client must re-acquire.
pub async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let token = token_from_headers(&headers).map_err(|_| Error::SessionExpired)?;
    let token = state.engine.lock().await.heartbeat(token)?;
    Ok(Json(SessionResponse { token }))
}
