//! File metadata repository for database operations.
//!
//! Implements the core `FileRepository` trait using SeaORM.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use tracing::debug;

use crate::entities::files;
use sharebox_core::share::{FileRecord, FileRepository as FileRepoTrait, ShareError};

/// File metadata repository implementation.
#[derive(Debug, Clone)]
pub struct FileRepository {
    db: DatabaseConnection,
}

impl FileRepository {
    /// Create a new file repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl FileRepoTrait for FileRepository {
    async fn create(&self, record: FileRecord) -> Result<FileRecord, ShareError> {
        let id = record.id.clone();
        let active_model = files::ActiveModel {
            id: Set(record.id),
            filename: Set(record.filename),
            storage_key: Set(record.storage_key),
            content_type: Set(record.content_type),
            size: Set(record.size),
            description: Set(record.description),
            created_at: Set(record.created_at),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_insert_error(&id, e))?;

        debug!(file_id = %model.id, "file record inserted");
        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<FileRecord>, ShareError> {
        let model = files::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ShareError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }
}

/// Map an insert failure, singling out primary key collisions.
fn map_insert_error(id: &str, err: DbErr) -> ShareError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ShareError::DuplicateId(id.to_string()),
        _ => ShareError::repository(err.to_string()),
    }
}

/// Convert database model to domain record.
fn to_domain(model: files::Model) -> FileRecord {
    FileRecord {
        id: model.id,
        filename: model.filename,
        storage_key: model.storage_key,
        content_type: model.content_type,
        size: model.size,
        description: model.description,
        created_at: model.created_at,
    }
}
