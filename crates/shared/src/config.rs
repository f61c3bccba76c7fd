//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
///
/// Built once at startup and handed to each component's constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used to build share links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Telegram bot token. Empty disables notifications.
    #[serde(default)]
    pub telegram_bot_token: String,
    /// Telegram destination chat. Empty disables notifications.
    #[serde(default)]
    pub telegram_chat_id: String,
    /// Telegram Bot API base URL.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Directory holding uploaded blobs.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// SQLite database file holding file metadata.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_database_path() -> String {
    "./data.db".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            telegram_api_url: default_telegram_api_url(),
            max_file_size: default_max_file_size(),
            upload_dir: default_upload_dir(),
            database_path: default_database_path(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Environment variables are read without a prefix (`PORT`, `BASE_URL`,
    /// `TELEGRAM_BOT_TOKEN`, ...). Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::default().ignore_empty(true))
            .build()?;

        config.try_deserialize()
    }

    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
