//! Category reference checks and the category -> sheet cascade

use crate::services::Broadcaster;
use catalog_core::integrity::filter_valid_category_refs;
use catalog_core::{CatalogEvent, RecordStore, Result, StoreResultExt};
use std::sync::Arc;
use tracing::info;

pub struct IntegrityCoordinator {
    store: Arc<dyn RecordStore>,
    broadcaster: Arc<Broadcaster>,
}

impl IntegrityCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// The requested ids that currently name a category
    pub async fn valid_category_refs(&self, requested: &[i64]) -> Result<Vec<i64>> {
        let existing: Vec<i64> = self
            .store
            .load_categories()
            .await
            .during("loading categories")?
            .iter()
            .map(|c| c.id)
            .collect();
        Ok(filter_valid_category_refs(requested, &existing))
    }

    /// Delete a category and every sheet that references it.
    ///
    /// The store applies both removals together where it can; a failure is
    /// reported before anything is broadcast. Returns the number of sheets
    /// removed and announces them only when there were some.
    pub async fn delete_category_cascading(&self, category_id: i64) -> Result<usize> {
        let removed = self
            .store
            .delete_category_cascading(category_id)
            .await
            .during("deleting category")?;

        if removed.is_empty() {
            return Ok(0);
        }
        info!(
            "Deleting category {} removed sheets {:?}",
            category_id, removed
        );

        self.broadcaster.broadcast(CatalogEvent::SheetsRefreshed);
        Ok(removed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::failing::FailingStore;
    use crate::storage::JsonFileStore;
    use catalog_core::{Category, Sheet};

    fn files_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(
            dir.path().join("dados.json"),
            dir.path().join("categorias.json"),
        )
    }

    async fn seed(store: &dyn RecordStore) {
        store
            .replace_categories(&[
                Category::new(1, "Math".to_string()),
                Category::new(2, "Physics".to_string()),
            ])
            .await
            .unwrap();

        let mut algebra = Sheet::new(1, "Algebra".to_string(), "http://a".to_string());
        algebra.categories = vec![1];
        let mut optics = Sheet::new(2, "Optics".to_string(), "http://o".to_string());
        optics.categories = vec![2];
        let mut mechanics = Sheet::new(3, "Mechanics".to_string(), "http://m".to_string());
        mechanics.categories = vec![2, 1];
        store
            .replace_sheets(&[algebra, optics, mechanics])
            .await
            .unwrap();
    }

    fn coordinator(store: Arc<dyn RecordStore>) -> (Arc<Broadcaster>, IntegrityCoordinator) {
        let broadcaster = Arc::new(Broadcaster::new());
        let coordinator = IntegrityCoordinator::new(store, broadcaster.clone());
        (broadcaster, coordinator)
    }

    #[tokio::test]
    async fn test_cascade_removes_only_referencing_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(files_in(&dir));
        seed(store.as_ref()).await;
        let (broadcaster, coordinator) = coordinator(store.clone());
        let (_client, mut rx) = broadcaster.register();

        let removed = coordinator.delete_category_cascading(1).await.unwrap();

        assert_eq!(removed, 2);
        let remaining: Vec<i64> = store.load_sheets().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(remaining, vec![2]);
        let categories: Vec<i64> = store.load_categories().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(categories, vec![2]);
        assert_eq!(rx.recv().await, Some(CatalogEvent::SheetsRefreshed));
    }

    #[tokio::test]
    async fn test_cascade_without_references_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(files_in(&dir));
        seed(store.as_ref()).await;
        store
            .replace_categories(&[Category::new(42, "Empty".to_string())])
            .await
            .unwrap();
        let (broadcaster, coordinator) = coordinator(store.clone());
        let (_client, mut rx) = broadcaster.register();

        let removed = coordinator.delete_category_cascading(42).await.unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.load_sheets().await.unwrap().len(), 3);
        assert!(store.load_categories().await.unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_category_write_keeps_sheets_and_stays_quiet() {
        let dir = tempfile::tempdir().unwrap();
        seed(&files_in(&dir)).await;
        let store = Arc::new(FailingStore::new(files_in(&dir)).failing_category_writes());
        let (broadcaster, coordinator) = coordinator(store.clone());
        let (_client, mut rx) = broadcaster.register();

        let err = coordinator.delete_category_cascading(1).await.unwrap_err();

        assert!(err.to_string().starts_with("Error deleting category"));
        assert_eq!(store.load_sheets().await.unwrap().len(), 3);
        assert_eq!(store.load_categories().await.unwrap().len(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_valid_category_refs() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(files_in(&dir));
        seed(store.as_ref()).await;
        let (_broadcaster, coordinator) = coordinator(store);

        let valid = coordinator.valid_category_refs(&[2, 99, 1]).await.unwrap();
        assert_eq!(valid, vec![2, 1]);
    }
}
