//! Flat JSON document store
//!
//! One pretty-printed array per collection. Reads are fail-soft: a missing
//! or unparseable document loads as an empty collection, and a single record
//! that does not fit the schema is skipped while the rest load. Writes go to
//! a sibling `.tmp` file that is then renamed over the document.

use async_trait::async_trait;
use catalog_core::{BackendKind, Category, RecordKind, RecordStore, Sheet, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct JsonFileStore {
    sheets_path: PathBuf,
    categories_path: PathBuf,
    /// Serializes writers so they never share a temp file
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(sheets_path: impl Into<PathBuf>, categories_path: impl Into<PathBuf>) -> Self {
        Self {
            sheets_path: sheets_path.into(),
            categories_path: categories_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn sheets_path(&self) -> &Path {
        &self.sheets_path
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    /// Read sheets, failing on a corrupt document or record. A missing file
    /// is empty.
    pub async fn read_sheets_strict(&self) -> Result<Vec<Sheet>, StoreError> {
        read_document(&self.sheets_path, Records::Strict).await
    }

    /// Read categories, failing on a corrupt document or record. A missing
    /// file is empty.
    pub async fn read_categories_strict(&self) -> Result<Vec<Category>, StoreError> {
        read_document(&self.categories_path, Records::Strict).await
    }

    async fn write<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;

        let _guard = self.write_lock.lock().await;
        let tmp = tmp_path(path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn backend(&self) -> BackendKind {
        BackendKind::JsonFile
    }

    async fn load_sheets(&self) -> Result<Vec<Sheet>, StoreError> {
        fail_soft(
            read_document(&self.sheets_path, Records::Lenient).await,
            RecordKind::Sheet,
            &self.sheets_path,
        )
    }

    async fn load_categories(&self) -> Result<Vec<Category>, StoreError> {
        fail_soft(
            read_document(&self.categories_path, Records::Lenient).await,
            RecordKind::Category,
            &self.categories_path,
        )
    }

    async fn replace_sheets(&self, sheets: &[Sheet]) -> Result<(), StoreError> {
        self.write(&self.sheets_path, sheets).await
    }

    async fn replace_categories(&self, categories: &[Category]) -> Result<(), StoreError> {
        self.write(&self.categories_path, categories).await
    }
}

/// What to do with a record that parses as JSON but not as `T`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Records {
    /// Skip it with a warning
    Lenient,
    /// Fail the whole read
    Strict,
}

async fn read_document<T: DeserializeOwned>(
    path: &Path,
    mode: Records,
) -> Result<Vec<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let items = match serde_json::from_slice::<Value>(&bytes)? {
        // A literal `null` document counts as empty
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(StoreError::Serialization(
                "document is not a JSON array".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(e) if mode == Records::Lenient => {
                warn!(
                    "Skipping record {} of {}: {}",
                    index,
                    path.display(),
                    e
                );
            }
            Err(e) => {
                return Err(StoreError::Serialization(format!(
                    "record {}: {}",
                    index, e
                )))
            }
        }
    }
    Ok(records)
}

fn fail_soft<T>(
    result: Result<Vec<T>, StoreError>,
    kind: RecordKind,
    path: &Path,
) -> Result<Vec<T>, StoreError> {
    match result {
        Err(StoreError::Serialization(e)) => {
            warn!(
                "Unreadable {} document {}, treating as empty: {}",
                kind,
                path.display(),
                e
            );
            Ok(Vec::new())
        }
        other => other,
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(
            dir.path().join("dados.json"),
            dir.path().join("categorias.json"),
        )
    }

    #[tokio::test]
    async fn test_missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load_sheets().await.unwrap().is_empty());
        assert!(store.load_categories().await.unwrap().is_empty());
        assert!(store.read_sheets_strict().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_fail_soft_but_strict_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.sheets_path(), b"[{\"id\": 1,").await.unwrap();

        assert!(store.load_sheets().await.unwrap().is_empty());
        let err = store.read_sheets_strict().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_off_schema_record_is_skipped_not_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mixed = r#"[
  {"id": 1, "titulo": "Keep me", "url": "http://k", "categorias": []},
  {"id": 2, "titulo": null, "url": "http://n"},
  {"id": 3, "title": "Also kept", "url": "http://a"}
]"#;
        tokio::fs::write(store.sheets_path(), mixed).await.unwrap();

        let sheets = store.load_sheets().await.unwrap();
        let titles: Vec<&str> = sheets.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Keep me", "Also kept"]);

        let err = store.read_sheets_strict().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_non_array_document_is_fail_soft() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.categories_path(), b"{\"id\": 1}").await.unwrap();

        assert!(store.load_categories().await.unwrap().is_empty());
        assert!(store.read_categories_strict().await.is_err());
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut sheet = Sheet::new(1, "Álgebra".to_string(), "http://x".to_string());
        sheet.categories = vec![2, 1];
        sheet.touch();
        let sheets = vec![sheet, Sheet::new(2, "Other".to_string(), "http://y".to_string())];
        store.replace_sheets(&sheets).await.unwrap();

        let categories = vec![Category::new(1, "Math".to_string())];
        store.replace_categories(&categories).await.unwrap();

        assert_eq!(store.load_sheets().await.unwrap(), sheets);
        assert_eq!(store.load_categories().await.unwrap(), categories);
        assert!(!tmp_path(store.sheets_path()).exists());
    }

    #[tokio::test]
    async fn test_document_is_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .replace_categories(&[Category::new(1, "Matemática".to_string())])
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(store.categories_path()).await.unwrap();
        assert!(text.starts_with("[\n  {"));
        assert!(text.contains("Matemática"));
    }

    #[tokio::test]
    async fn test_reads_legacy_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let legacy = r#"[
  {
    "titulo": "Algebra",
    "url": "http://x",
    "id": 1,
    "criado_em": "2024-05-02T09:30:12.000001",
    "categorias": [1]
  }
]"#;
        tokio::fs::write(store.sheets_path(), legacy).await.unwrap();

        let sheets = store.load_sheets().await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].title, "Algebra");
        assert_eq!(sheets[0].categories, vec![1]);
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        let path = Path::new("/data/dados.json");
        assert_eq!(tmp_path(path), PathBuf::from("/data/dados.json.tmp"));
    }
}
