//! Persisted record types

use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog card
///
/// Field aliases accept documents written by the older Portuguese-named
/// service, so its `dados.json` can be read and migrated as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: i64,
    #[serde(alias = "titulo")]
    pub title: String,
    pub url: String,
    #[serde(default, alias = "imagem")]
    pub image: Option<String>,
    /// Ids of the categories this sheet belongs to, in the order given
    #[serde(default, alias = "categorias")]
    pub categories: Vec<i64>,
    #[serde(
        alias = "criado_em",
        default = "Utc::now",
        deserialize_with = "timestamp::deserialize_or_now"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        alias = "atualizado_em",
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sheet {
    pub fn new(id: i64, title: String, url: String) -> Self {
        Self {
            id,
            title,
            url,
            image: None,
            categories: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn references(&self, category_id: i64) -> bool {
        self.categories.contains(&category_id)
    }
}

/// A named tag that sheets may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(
        alias = "criado_em",
        default = "Utc::now",
        deserialize_with = "timestamp::deserialize_or_now"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        alias = "atualizado_em",
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(id: i64, name: String) -> Self {
        Self {
            id,
            name,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
