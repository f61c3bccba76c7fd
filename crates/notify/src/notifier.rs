use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sharebox_core::notify::{Notifier, NotifyError, attachment_caption, text_message};
use sharebox_core::share::{FileRecord, build_share_url};
use sharebox_core::storage::BlobStore;
use tracing::{debug, info, instrument};

use crate::config::TelegramConfig;
use crate::types::{AttachmentMethod, SendMessageRequest};

/// Notifier that posts new uploads to a Telegram chat.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
    storage: Arc<BlobStore>,
}

impl TelegramNotifier {
    /// Create a new notifier with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: TelegramConfig, storage: Arc<BlobStore>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(config, client, storage))
    }

    /// Create a new notifier with a custom HTTP client.
    pub fn with_client(config: TelegramConfig, client: Client, storage: Arc<BlobStore>) -> Self {
        Self {
            config,
            client,
            storage,
        }
    }

    /// Whether notifications are actually delivered.
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    fn share_url(&self, record: &FileRecord) -> String {
        build_share_url(&self.config.base_url, &record.id)
    }

    /// Map a non-success response to an API error.
    async fn check_response(response: reqwest::Response) -> Result<(), NotifyError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::api(status.as_u16(), body));
        }

        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    #[instrument(skip(self, record), fields(file_id = %record.id, provider = "telegram"))]
    async fn notify_text(&self, record: &FileRecord) -> Result<(), NotifyError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let text = text_message(record, &self.share_url(record));
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: &text,
            parse_mode: "Markdown",
        };

        debug!("posting message to Telegram");

        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        Self::check_response(response).await?;
        info!("Telegram message sent");
        Ok(())
    }

    #[instrument(skip(self, record), fields(file_id = %record.id, provider = "telegram"))]
    async fn notify_with_attachment(&self, record: &FileRecord) -> Result<(), NotifyError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let data = self.storage.read(&record.storage_key).await?;
        let caption = attachment_caption(record, &self.share_url(record));
        let method = AttachmentMethod::for_content_type(&record.content_type);

        let part = Part::bytes(data.to_vec())
            .file_name(record.filename.clone())
            .mime_str(&record.content_type)
            .unwrap_or_else(|_| Part::bytes(data.to_vec()).file_name(record.filename.clone()));

        let form = Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .text("caption", caption)
            .part(method.field(), part);

        debug!(method = method.method(), size = data.len(), "posting attachment to Telegram");

        let response = self
            .client
            .post(self.config.method_url(method.method()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        Self::check_response(response).await?;
        info!(method = method.method(), "Telegram attachment sent");
        Ok(())
    }
}
