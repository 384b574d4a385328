//! Sheet orchestration: validate, mutate the loaded collection, persist,
//! broadcast

use crate::services::{Broadcaster, IntegrityCoordinator};
use catalog_core::integrity::allocate_id;
use catalog_core::{
    CatalogError, CatalogEvent, CategoryLinks, NewSheet, RecordKind, RecordStore, Result, Sheet,
    SheetPatch, StoreResultExt,
};
use std::sync::Arc;
use tracing::info;

pub struct SheetService {
    store: Arc<dyn RecordStore>,
    integrity: Arc<IntegrityCoordinator>,
    broadcaster: Arc<Broadcaster>,
}

impl SheetService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        integrity: Arc<IntegrityCoordinator>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            store,
            integrity,
            broadcaster,
        }
    }

    pub async fn list(&self) -> Result<Vec<Sheet>> {
        self.store.load_sheets().await.during("loading sheets")
    }

    pub async fn get(&self, id: i64) -> Result<Sheet> {
        self.list()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Sheet, id))
    }

    pub async fn create(&self, new: NewSheet) -> Result<Sheet> {
        let (Some(title), Some(url)) = (non_blank(new.title), non_blank(new.url)) else {
            return Err(CatalogError::validation("Title and URL are required"));
        };

        let mut sheets = self.store.load_sheets().await.during("creating sheet")?;

        let mut sheet = Sheet::new(allocate_id(sheets.iter().map(|s| s.id))?, title, url);
        sheet.image = new.image;
        if let Some(requested) = new.categories {
            sheet.categories = self.integrity.valid_category_refs(&requested).await?;
        }

        sheets.push(sheet.clone());
        self.store
            .replace_sheets(&sheets)
            .await
            .during("creating sheet")?;
        info!("Created sheet {}: {}", sheet.id, sheet.title);

        self.broadcaster.broadcast(CatalogEvent::SheetCreated {
            data: sheet.clone(),
        });
        Ok(sheet)
    }

    /// Overwrite the fields present in `patch`; the path id always wins.
    pub async fn update(&self, id: i64, patch: SheetPatch) -> Result<Sheet> {
        let mut sheets = self.store.load_sheets().await.during("updating sheet")?;
        let idx = sheets
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Sheet, id))?;

        if patch.is_empty() {
            return Err(CatalogError::validation("No data provided for update"));
        }
        if is_blank(&patch.title) || is_blank(&patch.url) {
            return Err(CatalogError::validation("Title and URL must not be empty"));
        }

        let categories = match &patch.categories {
            Some(requested) => Some(self.integrity.valid_category_refs(requested).await?),
            None => None,
        };

        let sheet = &mut sheets[idx];
        if let Some(title) = patch.title {
            sheet.title = title;
        }
        if let Some(url) = patch.url {
            sheet.url = url;
        }
        if let Some(image) = patch.image {
            sheet.image = image;
        }
        if let Some(categories) = categories {
            sheet.categories = categories;
        }
        sheet.id = id;
        sheet.touch();
        let updated = sheet.clone();

        self.store
            .replace_sheets(&sheets)
            .await
            .during("updating sheet")?;
        info!("Updated sheet {}", id);

        self.broadcaster.broadcast(CatalogEvent::SheetUpdated {
            data: updated.clone(),
        });
        Ok(updated)
    }

    /// Replace the sheet's category links with the valid subset of `links`.
    pub async fn set_categories(&self, id: i64, links: CategoryLinks) -> Result<Sheet> {
        let mut sheets = self
            .store
            .load_sheets()
            .await
            .during("updating sheet categories")?;
        let idx = sheets
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Sheet, id))?;

        let requested = links.requested_ids().ok_or_else(|| {
            CatalogError::validation("A list of category ids must be provided")
        })?;
        let categories = self.integrity.valid_category_refs(&requested).await?;

        let sheet = &mut sheets[idx];
        sheet.categories = categories;
        sheet.touch();
        let updated = sheet.clone();

        self.store
            .replace_sheets(&sheets)
            .await
            .during("updating sheet categories")?;
        info!(
            "Sheet {} now linked to categories {:?}",
            id, updated.categories
        );

        self.broadcaster.broadcast(CatalogEvent::SheetUpdated {
            data: updated.clone(),
        });
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<Sheet> {
        let mut sheets = self.store.load_sheets().await.during("deleting sheet")?;
        let idx = sheets
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Sheet, id))?;

        let removed = sheets.remove(idx);
        self.store
            .replace_sheets(&sheets)
            .await
            .during("deleting sheet")?;
        info!("Deleted sheet {}", id);

        self.broadcaster.broadcast(CatalogEvent::SheetDeleted { id });
        Ok(removed)
    }

    pub async fn delete_all(&self) -> Result<()> {
        self.store
            .replace_sheets(&[])
            .await
            .during("deleting sheets")?;
        info!("Deleted all sheets");

        self.broadcaster.broadcast(CatalogEvent::SheetsRefreshed);
        Ok(())
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| v.trim().is_empty())
}
