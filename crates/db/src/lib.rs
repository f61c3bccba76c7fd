//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository implementations for the core traits
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::FileRepository;

use std::path::Path;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migration::Migrator;

/// Opens (creating if needed) the SQLite database file and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the
/// connection cannot be established or a migration fails.
pub async fn connect(database_path: &str) -> Result<DatabaseConnection, DbErr> {
    if let Some(parent) = Path::new(database_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbErr::Custom(format!(
                "failed to create database directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let db = Database::connect(database_url(database_path)).await?;
    Migrator::up(&db, None).await?;
    info!(path = %database_path, "Database ready");

    Ok(db)
}

/// SQLite connection URL for a file path, created on first open.
#[must_use]
pub fn database_url(database_path: &str) -> String {
    format!("sqlite://{database_path}?mode=rwc")
}
