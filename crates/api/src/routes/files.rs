//! Upload, metadata, download and preview routes.

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{error_body, share_error};
use crate::{AppState, Share};
use sharebox_core::share::{FileRecord, Preview, ShareError, UploadResult, UploadTextInput};
use sharebox_core::storage::{StorageError, StoredBlob};

/// Creates the file routes.
///
/// The multipart route enforces `max_file_size` itself, so the default
/// body limit is lifted there.
pub fn routes(max_file_size: u64) -> Router<AppState> {
    let text_limit = usize::try_from(max_file_size).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/text",
            post(upload_text).layer(DefaultBodyLimit::max(text_limit)),
        )
        .route("/file/{id}", get(get_file))
        .route("/download/{id}", get(download_file))
        .route("/preview/{id}", get(preview_file))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a text upload.
#[derive(Debug, Deserialize)]
pub struct TextUploadRequest {
    /// Text to store.
    pub content: String,
    /// Optional annotation.
    #[serde(default)]
    pub description: Option<String>,
}

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Share token.
    pub id: String,
    /// Display name.
    pub filename: String,
    /// Public share link.
    pub share_url: String,
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        Self {
            id: result.id,
            filename: result.filename,
            share_url: result.share_url,
        }
    }
}

/// Metadata of a stored file, as shown to clients.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// Share token.
    pub id: String,
    /// Display name.
    pub filename: String,
    /// MIME type.
    pub filetype: String,
    /// Size in bytes.
    pub filesize: i64,
    /// Annotation, empty when absent.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            filetype: record.content_type,
            filesize: record.size,
            description: record.description.unwrap_or_default(),
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// A `file` field written to storage but not yet recorded.
struct StagedFile {
    blob: StoredBlob,
    filename: String,
    content_type: Option<String>,
}

fn malformed(detail: &str) -> Response {
    warn!(error = %detail, "Rejected multipart body");
    error_body(StatusCode::BAD_REQUEST, "Invalid multipart request")
}

/// Drain the multipart body, streaming the first `file` field to storage.
///
/// A `file` part without a filename is not an upload and is skipped.
async fn read_upload(
    share: &Share,
    multipart: &mut Multipart,
) -> Result<(Option<StagedFile>, Option<String>), Response> {
    let mut staged: Option<StagedFile> = None;
    let mut description = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(abandon(share, staged, &e.body_text()).await),
        };

        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("file") if staged.is_none() => {
                let Some(filename) = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
                else {
                    continue;
                };
                let content_type = field.content_type().map(ToString::to_string);
                let content = field.map(|chunk| chunk.map_err(std::io::Error::other));

                match share.store_file(&filename, 0, Box::pin(content)).await {
                    Ok(blob) => {
                        staged = Some(StagedFile {
                            blob,
                            filename,
                            content_type,
                        });
                    }
                    Err(ShareError::Storage(StorageError::Stream(detail))) => {
                        return Err(malformed(&detail));
                    }
                    Err(e) => return Err(share_error(e)),
                }
            }
            Some("description") => match field.text().await {
                Ok(text) => description = Some(text),
                Err(e) => return Err(abandon(share, staged, &e.body_text()).await),
            },
            _ => {}
        }
    }

    Ok((staged, description))
}

/// Reject a broken body, dropping any blob already written for it.
async fn abandon(share: &Share, staged: Option<StagedFile>, detail: &str) -> Response {
    if let Some(file) = staged {
        share.discard_file(file.blob).await;
    }
    malformed(detail)
}

/// Characters left unescaped in an RFC 5987 `filename*` value.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// `Content-Disposition` value for a download.
///
/// `filename` carries an ASCII fallback where anything that cannot appear
/// in a quoted header value becomes `_`. `filename*` carries the exact
/// name, UTF-8 percent-encoded.
fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(filename, ATTR_CHAR);

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn content_type_header(content_type: &str) -> HeaderValue {
    HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/api/upload`
/// Upload a file from a multipart form.
async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let (file, description) = match read_upload(&state.share, &mut multipart).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let Some(file) = file else {
        return error_body(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    match state
        .share
        .record_file(file.blob, file.filename, file.content_type, description)
        .await
    {
        Ok(result) => {
            info!(file_id = %result.id, "Upload accepted");
            (StatusCode::OK, Json(UploadResponse::from(result))).into_response()
        }
        Err(e) => share_error(e),
    }
}

/// POST `/api/text`
/// Store a text snippet.
async fn upload_text(
    State(state): State<AppState>,
    payload: Result<Json<TextUploadRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid request");
    };

    let input = UploadTextInput {
        content: payload.content,
        description: payload.description,
    };

    match state.share.upload_text(input).await {
        Ok(result) => (StatusCode::OK, Json(UploadResponse::from(result))).into_response(),
        Err(e) => share_error(e),
    }
}

/// GET `/api/file/{id}`
async fn get_file(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.share.get_info(&id).await {
        Ok(record) => Json(FileResponse::from(record)).into_response(),
        Err(e) => share_error(e),
    }
}

/// GET `/api/download/{id}`
/// Stream the blob as an attachment under its original filename.
async fn download_file(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let download = match state.share.download(&id).await {
        Ok(download) => download,
        Err(e) => return share_error(e),
    };

    (
        [
            (header::CONTENT_TYPE, content_type_header(&download.content_type)),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&download.filename),
            ),
        ],
        Body::from_stream(download.content),
    )
        .into_response()
}

/// GET `/api/preview/{id}`
/// Stream previewable blobs inline, otherwise answer with the metadata.
async fn preview_file(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.share.preview(&id).await {
        Ok(Preview::Inline {
            content_type,
            content,
        }) => (
            [(header::CONTENT_TYPE, content_type_header(&content_type))],
            Body::from_stream(content),
        )
            .into_response(),
        Ok(Preview::Metadata(record)) => Json(FileResponse::from(record)).into_response(),
        Err(e) => share_error(e),
    }
}
