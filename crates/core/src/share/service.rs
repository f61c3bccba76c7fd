//! File share service implementation.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use tracing::{info, warn};

use super::error::ShareError;
use super::types::{
    DEFAULT_CONTENT_TYPE, Download, FileRecord, Preview, TEXT_CONTENT_TYPE, TEXT_FILENAME,
    UploadFileInput, UploadResult, UploadTextInput, build_share_url, is_previewable,
    normalize_description,
};
use crate::notify::Notifier;
use crate::storage::{BlobStore, StoredBlob};

/// Repository trait for file metadata persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// Records are append-only: there is no update or delete.
pub trait FileRepository: Send + Sync {
    /// Insert a new record. Fails with `DuplicateId` if the id exists.
    fn create(
        &self,
        record: FileRecord,
    ) -> impl Future<Output = Result<FileRecord, ShareError>> + Send;

    /// Find a record by its identifier.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<FileRecord>, ShareError>> + Send;
}

/// Which notification shape to send for a new record.
#[derive(Debug, Clone, Copy)]
enum Notification {
    Text,
    Attachment,
}

/// Upload orchestrator: blob store, metadata store and notifier.
pub struct ShareService<R: FileRepository, N: Notifier> {
    storage: Arc<BlobStore>,
    repo: Arc<R>,
    notifier: Arc<N>,
    base_url: String,
}

impl<R: FileRepository, N: Notifier> ShareService<R, N> {
    /// Create a new share service.
    #[must_use]
    pub fn new(
        storage: Arc<BlobStore>,
        repo: Arc<R>,
        notifier: Arc<N>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            repo,
            notifier,
            base_url: base_url.into(),
        }
    }

    /// Maximum accepted upload size in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.storage.config().max_file_size
    }

    /// Public share link for an identifier.
    #[must_use]
    pub fn share_url(&self, id: &str) -> String {
        build_share_url(&self.base_url, id)
    }

    /// Upload a file.
    ///
    /// The blob is written first, then its metadata record. The attachment
    /// notification runs on a detached task and never affects the result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The content exceeds the limit (nothing is stored)
    /// - The blob cannot be written
    /// - The metadata record cannot be inserted
    pub async fn upload_file(&self, input: UploadFileInput) -> Result<UploadResult, ShareError> {
        let blob = self
            .store_file(&input.filename, input.size_hint, input.content)
            .await?;

        self.record_file(blob, input.filename, input.content_type, input.description)
            .await
    }

    /// Write an uploaded stream to the blob store without recording it.
    ///
    /// `size_hint` is the declared size, or 0 when unknown. The actual
    /// content is also cut off once it passes the limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the content exceeds the limit, the stream fails,
    /// or the blob cannot be written. No partial blob is left behind.
    pub async fn store_file<S>(
        &self,
        filename: &str,
        size_hint: u64,
        content: S,
    ) -> Result<StoredBlob, ShareError>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + Unpin,
    {
        self.storage.validate_size(size_hint)?;
        Ok(self.storage.save(filename, content).await?)
    }

    /// Drop a stored blob whose upload was abandoned before it was recorded.
    pub async fn discard_file(&self, blob: StoredBlob) {
        self.storage.discard(&blob.key).await;
    }

    /// Insert the metadata record for a stored blob and notify about it.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata record cannot be inserted.
    pub async fn record_file(
        &self,
        blob: StoredBlob,
        filename: String,
        content_type: Option<String>,
        description: Option<String>,
    ) -> Result<UploadResult, ShareError> {
        let content_type = content_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let record = FileRecord {
            id: blob.id,
            filename,
            storage_key: blob.key,
            content_type,
            size: i64::try_from(blob.size).unwrap_or(i64::MAX),
            description: normalize_description(description),
            created_at: Utc::now(),
        };

        // A failed insert leaves the blob orphaned; blobs are never deleted.
        let record = self.repo.create(record).await?;

        info!(
            file_id = %record.id,
            filename = %record.filename,
            size = record.size,
            "File uploaded"
        );

        let result = self.result_for(&record);
        self.dispatch(record, Notification::Attachment);
        Ok(result)
    }

    /// Upload an inline text blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is empty, or the blob or its metadata
    /// cannot be written.
    pub async fn upload_text(&self, input: UploadTextInput) -> Result<UploadResult, ShareError> {
        if input.content.is_empty() {
            return Err(ShareError::validation("content is required"));
        }

        let blob = self.storage.save_text(&input.content).await?;

        let record = FileRecord {
            id: blob.id,
            filename: TEXT_FILENAME.to_string(),
            storage_key: blob.key,
            content_type: TEXT_CONTENT_TYPE.to_string(),
            size: i64::try_from(input.content.len()).unwrap_or(i64::MAX),
            description: normalize_description(input.description),
            created_at: Utc::now(),
        };

        let record = self.repo.create(record).await?;

        info!(file_id = %record.id, size = record.size, "Text uploaded");

        let result = self.result_for(&record);
        self.dispatch(record, Notification::Text);
        Ok(result)
    }

    /// Get the metadata record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the lookup fails.
    pub async fn get_info(&self, id: &str) -> Result<FileRecord, ShareError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ShareError::not_found(id))
    }

    /// Open a blob for download under its original filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the blob cannot be read.
    pub async fn download(&self, id: &str) -> Result<Download, ShareError> {
        let record = self.get_info(id).await?;
        let content = self.storage.open(&record.storage_key).await?;

        Ok(Download {
            content_type: record.content_type,
            filename: record.filename,
            content,
        })
    }

    /// Open a blob for inline rendering, or fall back to its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the blob cannot be read.
    pub async fn preview(&self, id: &str) -> Result<Preview, ShareError> {
        let record = self.get_info(id).await?;

        if !is_previewable(&record) {
            return Ok(Preview::Metadata(record));
        }

        let content = self.storage.open(&record.storage_key).await?;
        Ok(Preview::Inline {
            content_type: record.content_type,
            content,
        })
    }

    fn result_for(&self, record: &FileRecord) -> UploadResult {
        UploadResult {
            id: record.id.clone(),
            filename: record.filename.clone(),
            share_url: self.share_url(&record.id),
        }
    }

    /// Fire-and-forget notification.
    ///
    /// The task is never joined; its failures are only visible in logs.
    fn dispatch(&self, record: FileRecord, kind: Notification) {
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            let outcome = match kind {
                Notification::Text => notifier.notify_text(&record).await,
                Notification::Attachment => notifier.notify_with_attachment(&record).await,
            };

            if let Err(e) = outcome {
                warn!(file_id = %record.id, error = %e, "Notification failed");
            }
        });
    }
}
