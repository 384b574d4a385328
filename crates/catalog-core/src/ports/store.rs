//! Storage port for persistence
//!
//! Every write replaces a whole collection. Implementations decide how much
//! atomicity they can offer for a single call; callers never get atomicity
//! across a `load` followed by a `replace_*`.

use crate::error::StoreError;
use crate::integrity::partition_by_reference;
use async_trait::async_trait;
use catalog_types::{Category, Sheet};
use std::fmt;

/// The two record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Sheet,
    Category,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Sheet => write!(f, "Sheet"),
            RecordKind::Category => write!(f, "Category"),
        }
    }
}

/// Which backend a store is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    JsonFile,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Relational => write!(f, "relational"),
            BackendKind::JsonFile => write!(f, "json-file"),
        }
    }
}

/// Record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend(&self) -> BackendKind;

    /// All sheets in stored order (id ascending for the relational backend)
    async fn load_sheets(&self) -> Result<Vec<Sheet>, StoreError>;

    async fn load_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Replace the sheet collection. Category links that do not resolve to
    /// a stored category may be dropped by the backend.
    async fn replace_sheets(&self, sheets: &[Sheet]) -> Result<(), StoreError>;

    async fn replace_categories(&self, categories: &[Category]) -> Result<(), StoreError>;

    /// Delete a category together with every sheet that references it,
    /// returning the ids of the removed sheets.
    ///
    /// The default writes the categories first: if the sheet write then
    /// fails, sheets are left with a dangling id but none is lost while its
    /// category still exists.
    async fn delete_category_cascading(&self, category_id: i64) -> Result<Vec<i64>, StoreError> {
        let mut categories = self.load_categories().await?;
        categories.retain(|c| c.id != category_id);
        let (removed, survivors) = partition_by_reference(self.load_sheets().await?, category_id);

        self.replace_categories(&categories).await?;
        if !removed.is_empty() {
            self.replace_sheets(&survivors).await?;
        }
        Ok(removed.iter().map(|s| s.id).collect())
    }

    /// Delete every category. Sheets stay, with their links cleared.
    async fn clear_categories(&self) -> Result<(), StoreError> {
        self.replace_categories(&[]).await?;

        let mut sheets = self.load_sheets().await?;
        if sheets.iter().all(|s| s.categories.is_empty()) {
            return Ok(());
        }
        for sheet in &mut sheets {
            sheet.categories.clear();
        }
        self.replace_sheets(&sheets).await
    }
}
