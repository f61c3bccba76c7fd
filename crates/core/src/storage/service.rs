//! Blob store implementation using Apache OpenDAL.

use std::path::Path;

use bytes::Bytes;
use futures::{Stream, StreamExt, stream::BoxStream};
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::StorageConfig;
use super::error::StorageError;

/// Byte stream flowing into or out of the blob store.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A blob that has been fully written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Generated identifier, also the public share token.
    pub id: String,
    /// Storage key relative to the upload root.
    pub key: String,
    /// Number of bytes written.
    pub size: u64,
}

/// Blob store for uploaded files and text submissions.
pub struct BlobStore {
    operator: Operator,
    config: StorageConfig,
}

impl BlobStore {
    /// Create a new blob store from configuration.
    ///
    /// Creates the root directory when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created or the
    /// operator cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.root).map_err(|e| {
            StorageError::configuration(format!(
                "failed to create storage directory {}: {e}",
                config.root.display()
            ))
        })?;

        let operator = Self::create_operator(&config.root)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL filesystem operator rooted at `root`.
    fn create_operator(root: &Path) -> Result<Operator, StorageError> {
        let root = root
            .canonicalize()
            .map_err(|e| StorageError::configuration(e.to_string()))?;
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );

        Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish()
            .pipe(Ok)
    }

    /// Validate a declared upload size against the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns an error if the size exceeds the limit.
    pub fn validate_size(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }
        Ok(())
    }

    /// Generate storage key for a blob.
    ///
    /// Format: `{id}{.ext}` where the extension is taken from the original
    /// filename, or empty when it has none.
    #[must_use]
    pub fn generate_storage_key(id: &str, filename: &str) -> String {
        let ext = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", sanitize_filename(ext)))
            .unwrap_or_default();

        format!("{id}{ext}")
    }

    /// Store an uploaded byte stream under a fresh identifier.
    ///
    /// The stream is written chunk by chunk; it is cut off as soon as it
    /// grows past the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream fails or exceeds the size limit before
    /// it is fully drained, or the blob cannot be written. No partial blob
    /// is left behind.
    pub async fn save<S>(&self, filename: &str, mut content: S) -> Result<StoredBlob, StorageError>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + Unpin,
    {
        let id = Uuid::new_v4().to_string();
        let key = Self::generate_storage_key(&id, filename);

        let mut writer = self.operator.writer(&key).await?;
        let mut size: u64 = 0;

        while let Some(chunk) = content.next().await {
            let result = match chunk {
                Ok(chunk) => {
                    size += chunk.len() as u64;
                    if size > self.config.max_file_size {
                        Err(StorageError::file_too_large(size, self.config.max_file_size))
                    } else {
                        writer.write(chunk).await.map_err(StorageError::from)
                    }
                }
                Err(e) => Err(StorageError::stream(e.to_string())),
            };

            if let Err(err) = result {
                if let Err(e) = writer.abort().await {
                    debug!(key = %key, error = %e, "writer abort failed");
                }
                self.discard(&key).await;
                return Err(err);
            }
        }

        writer.close().await?;
        debug!(key = %key, size, "blob stored");

        Ok(StoredBlob { id, key, size })
    }

    /// Store an inline text submission under a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    pub async fn save_text(&self, content: &str) -> Result<StoredBlob, StorageError> {
        let id = Uuid::new_v4().to_string();
        let key = format!("{id}.txt");
        let data = Bytes::copy_from_slice(content.as_bytes());
        let size = data.len() as u64;

        self.operator.write(&key, data).await?;
        debug!(key = %key, size, "text blob stored");

        Ok(StoredBlob { id, key, size })
    }

    /// Open a blob for streaming reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob does not exist or cannot be read.
    pub async fn open(&self, key: &str) -> Result<ByteStream, StorageError> {
        let reader = self.operator.reader(key).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::not_found(key),
            _ => StorageError::from(e),
        })?;
        let stream = reader.into_bytes_stream(..).await?;
        Ok(stream.boxed())
    }

    /// Read a whole blob into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob does not exist or cannot be read.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::not_found(key),
            _ => StorageError::from(e),
        })?;
        Ok(buffer.to_bytes())
    }

    /// Remove a blob that no record references, ignoring failures.
    pub async fn discard(&self, key: &str) {
        if let Err(e) = self.operator.delete(key).await {
            warn!(key = %key, error = %e, "failed to discard blob");
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize a filename fragment for storage keys.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn store_in(dir: &tempfile::TempDir) -> BlobStore {
        BlobStore::from_config(StorageConfig::new(dir.path())).expect("should create store")
    }

    fn chunks(parts: &[&'static [u8]]) -> ByteStream {
        let items: Vec<std::io::Result<Bytes>> =
            parts.iter().map(|p| Ok(Bytes::from_static(p))).collect();
        stream::iter(items).boxed()
    }

    async fn collect(mut content: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = content.next().await {
            out.extend_from_slice(&chunk.expect("chunk should read"));
        }
        out
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("pdf"), "pdf");
        assert_eq!(sanitize_filename("my file"), "my_file");
        assert_eq!(sanitize_filename("日本"), "__");
    }

    #[test]
    fn test_generate_storage_key() {
        let id = "6ba7b811-9dad-11d1-80b4-00c04fd430c8";
        assert_eq!(
            BlobStore::generate_storage_key(id, "invoice.pdf"),
            format!("{id}.pdf")
        );
        assert_eq!(
            BlobStore::generate_storage_key(id, "archive.tar.gz"),
            format!("{id}.gz")
        );
        assert_eq!(BlobStore::generate_storage_key(id, "README"), id);
        assert_eq!(BlobStore::generate_storage_key(id, ""), id);
    }

    #[test]
    fn test_from_config_creates_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("nested").join("uploads");

        BlobStore::from_config(StorageConfig::new(&root)).expect("should create store");
        assert!(root.is_dir());

        // Opening again over an existing directory is fine.
        BlobStore::from_config(StorageConfig::new(&root)).expect("should reopen store");
    }

    #[test]
    fn test_validate_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BlobStore::from_config(StorageConfig::new(dir.path()).with_max_file_size(1024))
            .expect("should create store");

        assert!(store.validate_size(1024).is_ok());
        let err = store.validate_size(1025).unwrap_err();
        assert!(matches!(
            err,
            StorageError::FileTooLarge {
                size: 1025,
                max: 1024
            }
        ));
    }

    #[tokio::test]
    async fn test_save_and_open_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let blob = store
            .save("photo.png", chunks(&[b"hello ", b"blob ", b"world"]))
            .await
            .expect("save should succeed");

        assert_eq!(blob.id.len(), 36);
        assert_eq!(blob.key, format!("{}.png", blob.id));
        assert_eq!(blob.size, 16);
        assert!(dir.path().join(&blob.key).is_file());

        let content = store.open(&blob.key).await.expect("open should succeed");
        assert_eq!(collect(content).await, b"hello blob world");
    }

    #[tokio::test]
    async fn test_save_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let blob = store.save_text("héllo").await.expect("save should succeed");

        assert!(blob.key.ends_with(".txt"));
        assert_eq!(blob.size, 6);
        let data = store.read(&blob.key).await.expect("read should succeed");
        assert_eq!(&data[..], "héllo".as_bytes());
    }

    #[tokio::test]
    async fn test_save_stream_error_leaves_no_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let items: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::other("connection reset")),
        ];
        let err = store
            .save("broken.bin", stream::iter(items).boxed())
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Stream(_)));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "bin"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_save_stops_at_size_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = BlobStore::from_config(StorageConfig::new(dir.path()).with_max_file_size(8))
            .expect("should create store");

        let err = store
            .save("big.bin", chunks(&[b"12345", b"67890", b"never read"]))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::FileTooLarge { size: 10, max: 8 }));
        let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_open_missing_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let err = store.read("missing.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        let err = store.open("missing.txt").await.err().expect("open should fail");
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_saves_get_distinct_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let (a, b) = tokio::join!(store.save_text("a"), store.save_text("b"));
        let (a, b) = (a.expect("save a"), b.expect("save b"));
        assert_ne!(a.id, b.id);
    }
}
