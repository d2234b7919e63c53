use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fakefinder_core::model::ImagePairDraft;

use super::document::CatalogDocument;
use crate::repository::{CatalogSource, StorageError};

/// Catalog source reading a JSON mapping file from disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file does not exist, `StorageError::Io`
    /// for other read failures and `StorageError::Serialization` for malformed JSON.
    pub async fn read_document(&self) -> Result<CatalogDocument, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        CatalogDocument::from_json(&raw)
    }

    /// Write `document` to the file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails.
    pub async fn save(&self, document: &CatalogDocument) -> Result<(), StorageError> {
        let json = document.to_json_pretty()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn load_pairs(&self) -> Result<Vec<ImagePairDraft>, StorageError> {
        let document = self.read_document().await?;
        tracing::debug!(
            path = %self.path.display(),
            records = document.pairs.len(),
            "read catalog document"
        );
        Ok(document.into_drafts())
    }
}
