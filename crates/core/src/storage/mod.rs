//! Blob storage for uploaded files using Apache OpenDAL.
//!
//! Blobs live on the local filesystem under the configured upload root.
//! Every blob is keyed by a freshly generated UUID plus the extension of
//! the original filename, so the key doubles as the public share token stem.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL (Fs)                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.writer("{id}{ext}")     │ op.reader("{id}{ext}")             │
//! │ op.write("{id}.txt", text) │ op.delete("{id}{ext}")             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::StorageConfig;
pub use error::StorageError;
pub use service::{BlobStore, ByteStream, StoredBlob};
