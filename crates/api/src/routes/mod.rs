//! API route definitions.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;
use sharebox_core::share::ShareError;
use sharebox_shared::AppError;
use tracing::error;

use crate::AppState;

pub mod files;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(files::routes(state.share.max_file_size()))
}

/// JSON error body: `{"error": "<message>"}`.
pub(crate) fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Map a share error to its HTTP response, logging server-side failures.
pub(crate) fn share_error(err: ShareError) -> Response {
    let app_err = AppError::from(err);
    let status =
        StatusCode::from_u16(app_err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %app_err, code = app_err.error_code(), "Request failed");
    }

    error_body(status, app_err.client_message())
}
