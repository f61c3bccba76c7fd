//! File share types and data structures.

use chrono::{DateTime, Utc};

use crate::storage::ByteStream;

/// Display name given to inline text submissions.
pub const TEXT_FILENAME: &str = "text.txt";

/// MIME type of inline text submissions.
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// MIME type used when an upload declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata record describing a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Share token and storage key stem.
    pub id: String,
    /// Original filename, or `text.txt` for text submissions.
    pub filename: String,
    /// Storage key relative to the upload root. Never exposed to clients.
    pub storage_key: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes of the stored blob.
    pub size: i64,
    /// Free-text annotation from the uploader.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Lowercased extension of the display name, including the dot.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// Input for uploading a file.
pub struct UploadFileInput {
    /// Original filename.
    pub filename: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Declared size in bytes, checked before anything is stored.
    pub size_hint: u64,
    /// Optional description.
    pub description: Option<String>,
    /// File content.
    pub content: ByteStream,
}

impl std::fmt::Debug for UploadFileInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFileInput")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size_hint", &self.size_hint)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Input for uploading an inline text blob.
#[derive(Debug, Clone)]
pub struct UploadTextInput {
    /// Text content.
    pub content: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Share token.
    pub id: String,
    /// Display name.
    pub filename: String,
    /// Public share link.
    pub share_url: String,
}

/// Blob content ready to be sent as a download.
pub struct Download {
    /// MIME type.
    pub content_type: String,
    /// Original filename for the attachment header.
    pub filename: String,
    /// Blob content.
    pub content: ByteStream,
}

/// Result of a preview request.
pub enum Preview {
    /// Content that browsers can render inline.
    Inline {
        /// MIME type.
        content_type: String,
        /// Blob content.
        content: ByteStream,
    },
    /// Not previewable; the caller renders the metadata instead.
    Metadata(FileRecord),
}

/// Extensions whose content is served inline by `preview`.
pub const PREVIEWABLE_EXTENSIONS: [&str; 7] =
    [".jpg", ".jpeg", ".png", ".gif", ".webp", ".pdf", ".txt"];

/// Check whether a record can be previewed inline.
#[must_use]
pub fn is_previewable(record: &FileRecord) -> bool {
    record
        .extension()
        .is_some_and(|ext| PREVIEWABLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Build the public share link for an identifier.
#[must_use]
pub fn build_share_url(base_url: &str, id: &str) -> String {
    format!("{}/s/{id}", base_url.trim_end_matches('/'))
}

/// Normalize an optional free-text field: blank input becomes `None`.
#[must_use]
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
