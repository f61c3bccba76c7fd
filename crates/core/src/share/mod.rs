//! File sharing pipeline.
//!
//! This module provides the request-facing orchestration of uploads and
//! retrievals:
//! - Upload validation (size limit)
//! - Blob write, then metadata insert
//! - Detached, best-effort notification dispatch
//! - Metadata lookup, download and inline preview

mod error;
mod service;
mod types;

pub use error::ShareError;
pub use service::{FileRepository, ShareService};
pub use types::{
    DEFAULT_CONTENT_TYPE, Download, FileRecord, PREVIEWABLE_EXTENSIONS, Preview, TEXT_CONTENT_TYPE,
    TEXT_FILENAME, UploadFileInput, UploadResult, UploadTextInput, build_share_url, is_previewable,
    normalize_description,
};
