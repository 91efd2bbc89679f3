// storage/mod.rs
// Catalog persistence module

mod filter;
mod migrations;
mod models;
mod pool;
mod store;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use filter::QueryFilter;
pub use migrations::run_migrations;
pub use models::{CatalogRecord, ProbeTarget, ServerConfig};
pub use pool::init_db_pool_with_path;
pub use store::RecordStore;
