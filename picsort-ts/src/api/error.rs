//! HTTP mapping of engine errors
//!
//! One engine error enum feeds every handler, so the status mapping is
//! centralized here: arbitration errors map to 401/409, validation
//! errors to 400/404/409, and everything internal to 500. Bodies are
//! always `{"error": "<message>"}`.

use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Wrapper that carries an engine error to an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

/// Handler result type
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::SessionExpired | Error::Unauthorized => StatusCode::UNAUTHORIZED,

            Error::SessionBusy
            | Error::FolderExists(_)
            | Error::FolderNotDeletable(_)
            | Error::AlreadyPending(_)
            | Error::EmptyStack
            | Error::NothingToCommit => StatusCode::CONFLICT,

            Error::ReservedName(_) | Error::InvalidName | Error::ReservedTarget => {
                StatusCode::BAD_REQUEST
            }

            Error::FolderNotFound(_) | Error::ImageNotFound(_) | Error::NoImageAvailable => {
                StatusCode::NOT_FOUND
            }

            Error::Training(_)
            | Error::Prediction(_)
            | Error::Database(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
