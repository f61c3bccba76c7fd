use sharebox_shared::AppConfig;

/// Default Telegram Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram notifier.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token. Empty disables the notifier.
    pub bot_token: String,

    /// Destination chat. Empty disables the notifier.
    pub chat_id: String,

    /// Bot API base URL, without the `/bot{token}` suffix.
    pub api_base_url: String,

    /// Public base URL used to build share links.
    pub base_url: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TelegramConfig {
    /// Create a new configuration against the public Bot API.
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            base_url: base_url.into(),
        }
    }

    /// Point the notifier at a different Bot API endpoint.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    /// URL of a Bot API method.
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

impl From<&AppConfig> for TelegramConfig {
    fn from(config: &AppConfig) -> Self {
        Self::new(
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
            config.base_url.clone(),
        )
        .with_api_base_url(config.telegram_api_url.clone())
    }
}
