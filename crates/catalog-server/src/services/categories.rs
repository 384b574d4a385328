//! Category orchestration

use crate::services::sheets::{is_blank, non_blank};
use crate::services::{Broadcaster, IntegrityCoordinator};
use catalog_core::integrity::allocate_id;
use catalog_core::{
    CatalogError, CatalogEvent, Category, CategoryPatch, NewCategory, RecordKind, RecordStore,
    Result, StoreResultExt,
};
use std::sync::Arc;
use tracing::info;

pub struct CategoryService {
    store: Arc<dyn RecordStore>,
    integrity: Arc<IntegrityCoordinator>,
    broadcaster: Arc<Broadcaster>,
}

impl CategoryService {
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

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.store.load_categories().await.during("loading categories")
    }

    pub async fn get(&self, id: i64) -> Result<Category> {
        self.list()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Category, id))
    }

    pub async fn create(&self, new: NewCategory) -> Result<Category> {
        let Some(name) = non_blank(new.name) else {
            return Err(CatalogError::validation("Category name is required"));
        };

        let mut categories = self
            .store
            .load_categories()
            .await
            .during("creating category")?;

        let category = Category::new(allocate_id(categories.iter().map(|c| c.id))?, name);
        categories.push(category.clone());
        self.store
            .replace_categories(&categories)
            .await
            .during("creating category")?;
        info!("Created category {}: {}", category.id, category.name);

        self.broadcaster.broadcast(CatalogEvent::CategoryCreated {
            data: category.clone(),
        });
        Ok(category)
    }

    pub async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Category> {
        let mut categories = self
            .store
            .load_categories()
            .await
            .during("updating category")?;
        let idx = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Category, id))?;

        if patch.is_empty() {
            return Err(CatalogError::validation("No data provided for update"));
        }
        if is_blank(&patch.name) {
            return Err(CatalogError::validation("Category name must not be empty"));
        }

        let category = &mut categories[idx];
        if let Some(name) = patch.name {
            category.name = name;
        }
        category.id = id;
        category.touch();
        let updated = category.clone();

        self.store
            .replace_categories(&categories)
            .await
            .during("updating category")?;
        info!("Updated category {}", id);

        self.broadcaster.broadcast(CatalogEvent::CategoryUpdated {
            data: updated.clone(),
        });
        Ok(updated)
    }

    /// Delete a category and every sheet that references it.
    pub async fn delete(&self, id: i64) -> Result<Category> {
        let removed = self
            .store
            .load_categories()
            .await
            .during("deleting category")?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CatalogError::not_found(RecordKind::Category, id))?;

        self.integrity.delete_category_cascading(id).await?;
        info!("Deleted category {}", id);

        self.broadcaster
            .broadcast(CatalogEvent::CategoryDeleted { id });
        Ok(removed)
    }

    /// Empty the collection. Unlike `delete`, this does not cascade: sheets
    /// stay, with their category links cleared.
    pub async fn delete_all(&self) -> Result<()> {
        self.store
            .clear_categories()
            .await
            .during("deleting categories")?;
        info!("Deleted all categories");

        self.broadcaster.broadcast(CatalogEvent::SheetsRefreshed);
        Ok(())
    }
}
