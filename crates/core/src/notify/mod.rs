//! New-upload notifications.
//!
//! This module defines the [`Notifier`] contract the upload pipeline calls
//! after a blob has been stored, plus the pure message formatting shared by
//! every notifier implementation. Delivery is best-effort: the pipeline runs
//! notifiers on a detached task and only logs their failures.

mod error;
mod format;

pub use error::NotifyError;
pub use format::{attachment_caption, escape_markdown, format_file_size, is_photo, text_message};

use std::future::Future;

use crate::share::FileRecord;

/// Relay of new-upload events to an external messaging endpoint.
///
/// Implementations must return `Ok(())` without contacting anything when
/// they are not configured.
pub trait Notifier: Send + Sync + 'static {
    /// Send a text-only notification describing the record.
    fn notify_text(
        &self,
        record: &FileRecord,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// Send a notification carrying the blob itself as an attachment.
    fn notify_with_attachment(
        &self,
        record: &FileRecord,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}
