//! HTTP API handlers for picsort-ts

pub mod auth;
pub mod error;
pub mod folders;
pub mod health;
pub mod image;
pub mod session;
pub mod triage;

pub use auth::{session_middleware, SESSION_HEADER};
pub use error::{ApiError, ApiResult};
pub use folders::{create_folder, delete_folder, list_folders};
pub use health::health_routes;
pub use image::{classify_image, current_image};
pub use session::{acquire_session, heartbeat};
pub use triage::{assign_action, commit, initialize, list_pending, undo};
