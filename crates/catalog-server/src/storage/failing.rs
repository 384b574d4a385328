//! Store wrapper whose writes can be made to fail

use super::JsonFileStore;
use async_trait::async_trait;
use catalog_core::{BackendKind, Category, RecordStore, Sheet, StoreError};
use std::io;

pub struct FailingStore {
    inner: JsonFileStore,
    fail_sheet_writes: bool,
    fail_category_writes: bool,
}

impl FailingStore {
    pub fn new(inner: JsonFileStore) -> Self {
        Self {
            inner,
            fail_sheet_writes: false,
            fail_category_writes: false,
        }
    }

    pub fn failing_sheet_writes(mut self) -> Self {
        self.fail_sheet_writes = true;
        self
    }

    pub fn failing_category_writes(mut self) -> Self {
        self.fail_category_writes = true;
        self
    }
}

fn denied() -> StoreError {
    io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem").into()
}

#[async_trait]
impl RecordStore for FailingStore {
    fn backend(&self) -> BackendKind {
        self.inner.backend()
    }

    async fn load_sheets(&self) -> Result<Vec<Sheet>, StoreError> {
        self.inner.load_sheets().await
    }

    async fn load_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.inner.load_categories().await
    }

    async fn replace_sheets(&self, sheets: &[Sheet]) -> Result<(), StoreError> {
        if self.fail_sheet_writes {
            return Err(denied());
        }
        self.inner.replace_sheets(sheets).await
    }

    async fn replace_categories(&self, categories: &[Category]) -> Result<(), StoreError> {
        if self.fail_category_writes {
            return Err(denied());
        }
        self.inner.replace_categories(categories).await
    }
}
