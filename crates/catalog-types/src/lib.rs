//! Catalog Types - Pure type definitions shared by the server and its clients
//!
//! This crate contains only serde data types with no async runtime
//! dependencies: the persisted records, the request payloads, the real-time
//! event protocol and the HTTP response envelope.

pub mod envelope;
pub mod event;
pub mod payload;
pub mod record;
pub mod timestamp;

pub use envelope::ApiResponse;
pub use event::CatalogEvent;
pub use payload::{CategoryLinks, CategoryPatch, NewCategory, NewSheet, SheetPatch};
pub use record::{Category, Sheet};
