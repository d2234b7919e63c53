#![forbid(unsafe_code)]

pub mod json;
pub mod mapping;
pub mod repository;

pub use json::{CatalogDocument, CatalogMetadata, JsonFileCatalog, PairRecord};
pub use repository::{CatalogSource, InMemoryCatalog, MissingCatalog, StorageError};
