//! Storage layer
//!
//! Uses SQLite (embedded) when `DATABASE_URL` is set, flat JSON documents
//! otherwise. The choice is made once at startup.

#[cfg(test)]
pub mod failing;
pub mod json_file;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use catalog_core::RecordStore;
use std::sync::Arc;

/// The stores a running server holds
pub struct Backends {
    /// Serves every request for the life of the process
    pub active: Arc<dyn RecordStore>,
    /// Always available as the migration source
    pub files: Arc<JsonFileStore>,
}

pub async fn open(config: &ServerConfig) -> Result<Backends> {
    let files = Arc::new(JsonFileStore::new(
        config.sheets_path(),
        config.categories_path(),
    ));

    let active: Arc<dyn RecordStore> = match config.database_url() {
        Some(url) => Arc::new(
            SqliteStore::connect(url)
                .await
                .context("Failed to initialize database")?,
        ),
        None => {
            tracing::info!(
                "DATABASE_URL not set, using JSON documents {} and {}",
                files.sheets_path().display(),
                files.categories_path().display()
            );
            files.clone()
        }
    };

    Ok(Backends { active, files })
}
