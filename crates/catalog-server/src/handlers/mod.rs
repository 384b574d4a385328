//! HTTP handlers

pub mod categories;
pub mod error;
pub mod health;
pub mod migrate;
pub mod sheets;
pub mod ws;

pub use error::{ApiError, ApiResult};
pub use health::health;
