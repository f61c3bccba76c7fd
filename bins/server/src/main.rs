//! Sharebox Server
//!
//! Main entry point for the file and text sharing service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sharebox_api::{AppState, create_router};
use sharebox_core::share::ShareService;
use sharebox_core::storage::{BlobStore, StorageConfig};
use sharebox_db::{FileRepository, connect};
use sharebox_notify::{TelegramConfig, TelegramNotifier};
use sharebox_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharebox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Open metadata store
    let db = connect(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path))?;
    info!(path = %config.database_path, "Connected to database");

    // Blob store
    let upload_dir = PathBuf::from(&config.upload_dir);
    let storage_config = StorageConfig::new(&upload_dir).with_max_file_size(config.max_file_size);
    let storage = Arc::new(BlobStore::from_config(storage_config)?);
    info!(
        upload_dir = %config.upload_dir,
        max_file_size = config.max_file_size,
        "Blob store ready"
    );

    // Notifier
    let notifier = TelegramNotifier::new(TelegramConfig::from(&config), Arc::clone(&storage))?;
    if notifier.is_enabled() {
        info!("Telegram notifications enabled");
    } else {
        warn!("Telegram credentials not set, notifications disabled");
    }

    // Create application state
    let share = ShareService::new(
        storage,
        Arc::new(FileRepository::new(db)),
        Arc::new(notifier),
        config.base_url.clone(),
    );
    let state = AppState {
        share: Arc::new(share),
        upload_dir,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
