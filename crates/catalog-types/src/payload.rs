//! Request payloads
//!
//! Every field is optional so that missing required fields surface as
//! validation errors with a useful message instead of a decode failure.

use serde::{Deserialize, Deserializer};

/// Body of `POST /sheets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSheet {
    #[serde(alias = "titulo")]
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(alias = "imagem")]
    pub image: Option<String>,
    #[serde(alias = "categorias")]
    pub categories: Option<Vec<i64>>,
}

/// Body of `PUT /sheets/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetPatch {
    /// Accepted but ignored: the path id always wins
    pub id: Option<i64>,
    #[serde(alias = "titulo")]
    pub title: Option<String>,
    pub url: Option<String>,
    /// `null` clears the image, absence keeps it
    #[serde(default, alias = "imagem", deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(alias = "categorias")]
    pub categories: Option<Vec<i64>>,
}

impl SheetPatch {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.title.is_none()
            && self.url.is_none()
            && self.image.is_none()
            && self.categories.is_none()
    }
}

/// Body of `POST /categories`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCategory {
    #[serde(alias = "nome")]
    pub name: Option<String>,
}

/// Body of `PUT /categories/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub id: Option<i64>,
    #[serde(alias = "nome")]
    pub name: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }
}

/// Body of `PUT /sheets/{id}/categories`
///
/// Kept as raw JSON so the handler can tell "not a list" apart from
/// "a list with entries that are not category ids".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryLinks {
    #[serde(alias = "categorias")]
    pub categories: Option<serde_json::Value>,
}

impl CategoryLinks {
    /// Integer entries of the list, or `None` when no list was given.
    pub fn requested_ids(&self) -> Option<Vec<i64>> {
        match &self.categories {
            Some(serde_json::Value::Array(items)) => {
                Some(items.iter().filter_map(serde_json::Value::as_i64).collect())
            }
            _ => None,
        }
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
