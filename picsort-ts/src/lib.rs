//! picsort-ts library - Triage Server module
//!
//! Serves the single-operator image triage API: session arbitration,
//! folder management, current-image selection, classification, the
//! pending-action stack, and commit with incremental retraining.

use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod classify;
pub mod engine;
pub mod error;
pub mod storage;

use engine::TriageEngine;

/// Application state shared across HTTP handlers
///
/// The engine sits behind one async mutex: every core operation
/// (assign, undo, folder create/delete, commit) runs under a single
/// mutual-exclusion domain. Commit and initialize hold the lock for
/// their full duration; the one active session simply waits.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<TriageEngine>>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: TriageEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}

/// Build application router
///
/// Session and health routes are public; everything else requires the
/// working token and passes through the session middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    // Protected routes (require the active session token)
    let protected = Router::new()
        .route("/api/initialize", post(api::initialize))
        .route("/api/folders", get(api::list_folders))
        .route("/api/folders", post(api::create_folder))
        .route("/api/folders/:name", delete(api::delete_folder))
        .route("/api/image", get(api::current_image))
        .route("/api/classify", post(api::classify_image))
        .route("/api/actions", get(api::list_pending))
        .route("/api/actions", post(api::assign_action))
        .route("/api/undo", post(api::undo))
        .route("/api/commit", post(api::commit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    // Public routes (session acquisition and health)
    let public = Router::new()
        .route("/api/session", post(api::acquire_session))
        .route("/api/session/heartbeat", post(api::heartbeat))
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(CorsLayer::permissive())
}
