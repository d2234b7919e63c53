//! JSON catalog document (`image_mapping.json`) and the file-backed source.

mod document;
mod file_source;

pub use document::{CatalogDocument, CatalogMetadata, PairRecord};
pub use file_source::JsonFileCatalog;
