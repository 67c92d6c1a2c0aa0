// Adapters layer: concrete implementations for external systems (region files, scene catalogs, storage).

pub mod catalog;
pub mod region;
pub mod storage;

pub use catalog::{catalog_from_config, ApiCatalog, FileCatalog};
pub use storage::LocalStorage;
