//! Real-time event protocol (server -> client only)

use crate::{Category, Sheet};
use serde::{Deserialize, Serialize};

/// Mutation notifications pushed to every connected client
///
/// Wire names are fixed by the deployed frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    #[serde(rename = "sheet_created")]
    SheetCreated { data: Sheet },
    #[serde(rename = "sheet_editada")]
    SheetUpdated { data: Sheet },
    #[serde(rename = "sheet_deletada")]
    SheetDeleted { id: i64 },

    #[serde(rename = "category_created")]
    CategoryCreated { data: Category },
    #[serde(rename = "category_editada")]
    CategoryUpdated { data: Category },
    #[serde(rename = "category_deletada")]
    CategoryDeleted { id: i64 },

    /// Bulk change; clients should refetch everything
    #[serde(rename = "planilhas_atualizadas")]
    SheetsRefreshed,
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::SheetCreated { .. } => "sheet_created",
            CatalogEvent::SheetUpdated { .. } => "sheet_editada",
            CatalogEvent::SheetDeleted { .. } => "sheet_deletada",
            CatalogEvent::CategoryCreated { .. } => "category_created",
            CatalogEvent::CategoryUpdated { .. } => "category_editada",
            CatalogEvent::CategoryDeleted { .. } => "category_deletada",
            CatalogEvent::SheetsRefreshed => "planilhas_atualizadas",
        }
    }
}
