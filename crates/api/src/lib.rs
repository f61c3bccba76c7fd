//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Static serving of the upload directory under `/uploads`
//! - Response types

pub mod routes;

use axum::Router;
use sharebox_core::share::ShareService;
use sharebox_db::FileRepository;
use sharebox_notify::TelegramNotifier;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Share service as wired in the server: SQLite metadata, Telegram notifications.
pub type Share = ShareService<FileRepository, TelegramNotifier>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload orchestrator.
    pub share: Arc<Share>,
    /// Directory served under `/uploads`.
    pub upload_dir: PathBuf,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);

    Router::new()
        .nest("/api", routes::api_routes(&state))
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
