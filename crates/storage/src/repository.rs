use async_trait::async_trait;
use fakefinder_core::model::{Catalog, ImagePairDraft};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by catalog sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound
        } else {
            StorageError::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Source of raw image-pair records.
///
/// Sources return unvalidated drafts; validation and fallback handling happen in the
/// services layer so every source gets the same treatment.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load every pair record the source knows about, in document order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the backing document is missing, or other
    /// storage errors if it cannot be read or parsed.
    async fn load_pairs(&self) -> Result<Vec<ImagePairDraft>, StorageError>;
}

/// Catalog source backed by records held in memory, for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    drafts: Arc<Vec<ImagePairDraft>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new(drafts: Vec<ImagePairDraft>) -> Self {
        Self {
            drafts: Arc::new(drafts),
        }
    }

    /// Expose an already validated catalog as a source.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let drafts = catalog
            .pairs()
            .iter()
            .map(|pair| ImagePairDraft::new(pair.id().as_str(), pair.real_path(), pair.fake_path()))
            .collect();
        Self::new(drafts)
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn load_pairs(&self) -> Result<Vec<ImagePairDraft>, StorageError> {
        Ok(self.drafts.as_ref().clone())
    }
}

/// Catalog source that always fails, for exercising degraded-mode handling.
#[derive(Clone, Copy, Debug, Default)]
pub struct MissingCatalog;

#[async_trait]
impl CatalogSource for MissingCatalog {
    async fn load_pairs(&self) -> Result<Vec<ImagePairDraft>, StorageError> {
        Err(StorageError::NotFound)
    }
}
