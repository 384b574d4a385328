//! Business logic services

pub mod broadcaster;
pub mod categories;
pub mod integrity;
pub mod migration;
pub mod sheets;

pub use broadcaster::Broadcaster;
pub use categories::CategoryService;
pub use integrity::IntegrityCoordinator;
pub use migration::{MigrationReport, Migrator};
pub use sheets::SheetService;
