//! Current-image and classification handlers

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use crate::classify::Confidences;
use crate::error::Error;
use crate::AppState;

/// Header carrying the served image's filename
pub const IMAGE_NAME_HEADER: &str = "x-picsort-image";

/// Classification request body
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub image_name: String,
}

/// Classification response
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub image_name: String,
    pub predictions: Confidences,
}

/// GET /api/image
///
/// Serves the next triageable image as raw bytes with its MIME type;
/// the filename travels in the `X-Picsort-Image` header. Pure read:
/// repeated calls return the same image until it is assigned.
pub async fn current_image(State(state): State<AppState>) -> ApiResult<Response> {
    let image = state.engine.lock().await.current_image()?;

    Response::builder()
        .header(header::CONTENT_TYPE, image.mime_type)
        .header(IMAGE_NAME_HEADER, image.image_name.as_str())
        .body(Body::from(image.bytes))
        .map_err(|e| ApiError(Error::Internal(e.to_string())))
}

/// POST /api/classify
///
/// Scores one triageable image against all known categories. The
/// classifier output is returned unmodified.
pub async fn classify_image(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> ApiResult<Json<ClassifyResponse>> {
    let predictions = state.engine.lock().await.classify(&request.image_name)?;
    Ok(Json(ClassifyResponse {
        image_name: request.image_name,
        predictions,
    }))
}
