//! Sheet Catalog Core Library
//!
//! Domain errors, the persistence port and the referential-integrity rules
//! shared by every storage backend.

// Re-export pure types from catalog-types
pub use catalog_types::*;

pub mod error;
pub mod integrity;
pub mod ports;

pub use error::{CatalogError, Result, StoreError, StoreResultExt};
pub use ports::{BackendKind, RecordKind, RecordStore};
