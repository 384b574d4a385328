//! SQLite record store (embedded, no external dependencies)
//!
//! Every `replace_*` call runs inside one transaction; dropping the
//! transaction on an error path rolls the whole call back.

use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog_core::{BackendKind, Category, RecordStore, Sheet, StoreError};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid DATABASE_URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // Create parent directory if needed
        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_url)
            })?;

        tracing::info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sheets (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                image TEXT,
                created_at DATETIME NOT NULL,
                updated_at DATETIME
            )
            "#,
        )
        .execute(pool)
        .await?;

        // position keeps the order the client gave the links in
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sheet_categories (
                sheet_id INTEGER NOT NULL REFERENCES sheets(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (sheet_id, category_id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn load_sheets(&self) -> std::result::Result<Vec<Sheet>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let rows: Vec<SheetRow> = sqlx::query_as(
            r#"
            SELECT id, title, url, image, created_at, updated_at
            FROM sheets ORDER BY id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        let links: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT sheet_id, category_id FROM sheet_categories
            ORDER BY sheet_id, position
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        let mut by_sheet: HashMap<i64, Vec<i64>> = HashMap::new();
        for (sheet_id, category_id) in links {
            by_sheet.entry(sheet_id).or_default().push(category_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categories = by_sheet.remove(&row.id).unwrap_or_default();
                row.into_sheet(categories)
            })
            .collect())
    }

    async fn load_categories(&self) -> std::result::Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_sheets(&self, sheets: &[Sheet]) -> std::result::Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Links go with their sheets via ON DELETE CASCADE
        sqlx::query("DELETE FROM sheets")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for sheet in sheets {
            sqlx::query(
                r#"
                INSERT INTO sheets (id, title, url, image, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(sheet.id)
            .bind(&sheet.title)
            .bind(&sheet.url)
            .bind(&sheet.image)
            .bind(sheet.created_at)
            .bind(sheet.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            // Only link categories that exist right now
            for (position, category_id) in sheet.categories.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT OR IGNORE INTO sheet_categories (sheet_id, category_id, position)
                    SELECT ?1, id, ?3 FROM categories WHERE id = ?2
                    "#,
                )
                .bind(sheet.id)
                .bind(category_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            }
        }

        tx.commit().await.map_err(db_err)?;
        tracing::debug!("Replaced sheets table with {} rows", sheets.len());

        Ok(())
    }

    async fn replace_categories(
        &self,
        categories: &[Category],
    ) -> std::result::Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Deleting the categories cascades to every link, so keep a copy and
        // restore the ones whose category survives the replacement.
        let links: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT sheet_id, category_id, position FROM sheet_categories
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM categories")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for category in categories {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        let kept: HashSet<i64> = categories.iter().map(|c| c.id).collect();
        for (sheet_id, category_id, position) in links {
            if !kept.contains(&category_id) {
                continue;
            }
            sqlx::query(
                r#"
                INSERT INTO sheet_categories (sheet_id, category_id, position)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(sheet_id)
            .bind(category_id)
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        tracing::debug!("Replaced categories table with {} rows", categories.len());

        Ok(())
    }

    async fn delete_category_cascading(
        &self,
        category_id: i64,
    ) -> std::result::Result<Vec<i64>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let removed: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT sheet_id FROM sheet_categories
            WHERE category_id = ?1 ORDER BY sheet_id
            "#,
        )
        .bind(category_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            DELETE FROM sheets
            WHERE id IN (SELECT sheet_id FROM sheet_categories WHERE category_id = ?1)
            "#,
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        tracing::debug!(
            "Deleted category {} and {} sheets",
            category_id,
            removed.len()
        );

        Ok(removed)
    }

    async fn clear_categories(&self) -> std::result::Result<(), StoreError> {
        // Links go with their categories via ON DELETE CASCADE
        sqlx::query("DELETE FROM categories")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct SheetRow {
    id: i64,
    title: String,
    url: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl SheetRow {
    fn into_sheet(self, categories: Vec<i64>) -> Sheet {
        Sheet {
            id: self.id,
            title: self.title,
            url: self.url,
            image: self.image,
            categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
        let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
        SqliteStore::connect(&url).await.unwrap()
    }

    fn sheet(id: i64, categories: Vec<i64>) -> Sheet {
        let mut sheet = Sheet::new(id, format!("Sheet {id}"), format!("http://example.com/{id}"));
        sheet.categories = categories;
        sheet
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let mut math = Category::new(1, "Math".to_string());
        math.touch();
        let categories = vec![math, Category::new(2, "Physics".to_string())];
        store.replace_categories(&categories).await.unwrap();

        let mut algebra = sheet(1, vec![2, 1]);
        algebra.image = Some("cover.png".to_string());
        let sheets = vec![algebra, sheet(2, vec![])];
        store.replace_sheets(&sheets).await.unwrap();

        assert_eq!(store.load_categories().await.unwrap(), categories);
        assert_eq!(store.load_sheets().await.unwrap(), sheets);
    }

    #[tokio::test]
    async fn test_links_to_missing_categories_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .replace_categories(&[Category::new(1, "Math".to_string())])
            .await
            .unwrap();
        store.replace_sheets(&[sheet(1, vec![1, 99])]).await.unwrap();

        let loaded = store.load_sheets().await.unwrap();
        assert_eq!(loaded[0].categories, vec![1]);
    }

    #[tokio::test]
    async fn test_replacing_categories_keeps_surviving_links() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .replace_categories(&[
                Category::new(1, "Math".to_string()),
                Category::new(2, "Physics".to_string()),
            ])
            .await
            .unwrap();
        store.replace_sheets(&[sheet(1, vec![1, 2])]).await.unwrap();

        let mut renamed = Category::new(1, "Mathematics".to_string());
        renamed.touch();
        store.replace_categories(&[renamed]).await.unwrap();

        let loaded = store.load_sheets().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].categories, vec![1]);
    }

    #[tokio::test]
    async fn test_failed_replace_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let original = vec![Category::new(1, "Math".to_string())];
        store.replace_categories(&original).await.unwrap();

        // Duplicate primary key fails halfway through the transaction
        let broken = vec![
            Category::new(5, "A".to_string()),
            Category::new(5, "B".to_string()),
        ];
        let err = store.replace_categories(&broken).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        assert_eq!(store.load_categories().await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_connect_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("catalog.db");
        let store = SqliteStore::connect(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();

        assert!(path.exists());
        assert!(store.load_sheets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_category_cascading() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .replace_categories(&[
                Category::new(1, "Math".to_string()),
                Category::new(2, "Physics".to_string()),
            ])
            .await
            .unwrap();
        store
            .replace_sheets(&[sheet(1, vec![1]), sheet(2, vec![2]), sheet(3, vec![2, 1])])
            .await
            .unwrap();

        let removed = store.delete_category_cascading(1).await.unwrap();
        assert_eq!(removed, vec![1, 3]);

        let categories = store.load_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, 2);
        let sheets = store.load_sheets().await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!((sheets[0].id, sheets[0].categories.clone()), (2, vec![2]));
    }

    #[tokio::test]
    async fn test_failed_category_delete_keeps_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .replace_categories(&[Category::new(1, "Math".to_string())])
            .await
            .unwrap();
        store.replace_sheets(&[sheet(1, vec![1])]).await.unwrap();

        sqlx::query(
            r#"
            CREATE TRIGGER keep_categories BEFORE DELETE ON categories
            BEGIN SELECT RAISE(ABORT, 'categories are read-only'); END
            "#,
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.delete_category_cascading(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        // The sheet delete ran first in the same transaction and was undone
        let sheets = store.load_sheets().await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].categories, vec![1]);
        assert_eq!(store.load_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_categories_unlinks_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .replace_categories(&[Category::new(1, "Math".to_string())])
            .await
            .unwrap();
        store.replace_sheets(&[sheet(1, vec![1])]).await.unwrap();

        store.clear_categories().await.unwrap();

        assert!(store.load_categories().await.unwrap().is_empty());
        let sheets = store.load_sheets().await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert!(sheets[0].categories.is_empty());
    }

    #[tokio::test]
    async fn test_replace_with_empty_clears_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store.replace_sheets(&[sheet(1, vec![])]).await.unwrap();
        store.replace_sheets(&[]).await.unwrap();
        store.replace_sheets(&[]).await.unwrap();

        assert!(store.load_sheets().await.unwrap().is_empty());
    }
}
