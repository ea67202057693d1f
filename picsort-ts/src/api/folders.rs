//! Folder management handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ApiResult;
use crate::engine::FolderStatus;
use crate::AppState;

/// Folder listing response
#[derive(Debug, Serialize)]
pub struct FoldersResponse {
    pub folders: BTreeMap<String, FolderStatus>,
}

/// Create-folder request body
#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

/// Response naming the affected folder
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub name: String,
}

/// GET /api/folders
///
/// Fresh name -> {is_empty, pending_count} map, computed from storage
/// and the action stack on every call.
pub async fn list_folders(State(state): State<AppState>) -> ApiResult<Json<FoldersResponse>> {
    let folders = state.engine.lock().await.list_folders()?;
    Ok(Json(FoldersResponse { folders }))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Json(request): Json<CreateFolderRequest>,
) -> ApiResult<Json<FolderResponse>> {
    state.engine.lock().await.create_folder(&request.name)?;
    Ok(Json(FolderResponse { name: request.name }))
}

/// DELETE /api/folders/:name
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<FolderResponse>> {
    state.engine.lock().await.delete_folder(&name)?;
    Ok(Json(FolderResponse { name }))
}
