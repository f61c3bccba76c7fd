//! Notification error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Notification delivery errors. Never surfaced to upload callers.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be sent or the response not read.
    #[error("notification transport failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("notification endpoint returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The blob to attach could not be read.
    #[error("failed to read attachment: {0}")]
    Attachment(#[from] StorageError),

    /// The notifier is misconfigured.
    #[error("notifier configuration error: {0}")]
    Configuration(String),
}

impl NotifyError {
    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an API error.
    #[must_use]
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }
}
