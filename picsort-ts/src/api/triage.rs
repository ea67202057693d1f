//! Triage handlers: assign, pending list, undo, commit, initialize

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use crate::engine::{CommitReport, InitializeReport, PendingAction};
use crate::AppState;

/// Assign request body
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub image_name: String,
    pub target_folder: String,
}

/// Assign response: the queued action plus current stack depth
#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub image_name: String,
    pub target_folder: String,
    pub pending: usize,
}

/// Pending-action listing, oldest first
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub actions: Vec<PendingAction>,
}

/// POST /api/actions
///
/// Queues "move image to folder". The image stops being offered as
/// current until the action is undone or committed.
pub async fn assign_action(
    State(state): State<AppState>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<AssignResponse>> {
    let mut engine = state.engine.lock().await;
    engine.assign(&request.image_name, &request.target_folder)?;
    let pending = engine.pending().len();
    Ok(Json(AssignResponse {
        image_name: request.image_name,
        target_folder: request.target_folder,
        pending,
    }))
}

/// GET /api/actions
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<PendingResponse>> {
    let engine = state.engine.lock().await;
    Ok(Json(PendingResponse {
        actions: engine.pending().to_vec(),
    }))
}

/// POST /api/undo
///
/// Discards the most recent pending action and returns it; no file
/// moved, so the image is immediately current-eligible again.
pub async fn undo(State(state): State<AppState>) -> ApiResult<Json<PendingAction>> {
    let action = state.engine.lock().await.undo()?;
    Ok(Json(action))
}

/// POST /api/commit
///
/// Applies every pending action to storage and retrains on the newly
/// labeled images. Per-action failures are reported in the result list
/// without blocking sibling actions.
pub async fn commit(State(state): State<AppState>) -> ApiResult<Json<CommitReport>> {
    let report = state.engine.lock().await.commit().await?;
    Ok(Json(report))
}

/// POST /api/initialize
///
/// Trains the classifier from the existing category folders unless the
/// hash ledger shows they were already trained on. Idempotent.
pub async fn initialize(State(state): State<AppState>) -> ApiResult<Json<InitializeReport>> {
    let report = state.engine.lock().await.initialize().await?;
    Ok(Json(report))
}
