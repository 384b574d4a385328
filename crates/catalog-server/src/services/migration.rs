//! One-shot import of the JSON documents into the relational backend

use crate::services::Broadcaster;
use crate::storage::JsonFileStore;
use catalog_core::{BackendKind, CatalogError, CatalogEvent, RecordStore, Result, StoreResultExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub categories: usize,
    pub sheets: usize,
}

pub struct Migrator {
    source: Arc<JsonFileStore>,
    target: Arc<dyn RecordStore>,
    broadcaster: Arc<Broadcaster>,
}

impl Migrator {
    pub fn new(
        source: Arc<JsonFileStore>,
        target: Arc<dyn RecordStore>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            source,
            target,
            broadcaster,
        }
    }

    /// Replace the relational contents with the current documents.
    ///
    /// Categories go first so sheet links resolve against them. Running it
    /// again overwrites rather than merges.
    pub async fn migrate(&self) -> Result<MigrationReport> {
        if self.target.backend() != BackendKind::Relational {
            return Err(CatalogError::validation(
                "DATABASE_URL not configured; migration not needed",
            ));
        }

        let categories = self
            .source
            .read_categories_strict()
            .await
            .during("reading categories for migration")?;
        let sheets = self
            .source
            .read_sheets_strict()
            .await
            .during("reading sheets for migration")?;

        self.target
            .replace_categories(&categories)
            .await
            .during("migrating categories")?;
        self.target
            .replace_sheets(&sheets)
            .await
            .during("migrating sheets")?;

        let report = MigrationReport {
            categories: categories.len(),
            sheets: sheets.len(),
        };
        info!(
            "Migration complete: {} categories, {} sheets",
            report.categories, report.sheets
        );

        self.broadcaster.broadcast(CatalogEvent::SheetsRefreshed);
        Ok(report)
    }
}
