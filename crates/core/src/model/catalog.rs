use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::PairId;
use crate::model::pair::{ImagePair, ImagePairDraft, PairError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog contains no pairs")]
    Empty,

    #[error("catalog contains no valid pairs ({skipped} record(s) rejected)")]
    NoValidPairs { skipped: usize },

    #[error("duplicate pair id: {id}")]
    DuplicateId { id: PairId },

    #[error(transparent)]
    InvalidPair(#[from] PairError),
}

/// A catalog record that was dropped during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Zero-based position of the record in the source document.
    pub index: usize,
    pub error: CatalogError,
}

/// Outcome of building a catalog from loosely validated records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub skipped: Vec<SkippedRecord>,
}

impl CatalogReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Read-only collection of validated image pairs.
///
/// Never empty, and pair ids are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pairs: Vec<ImagePair>,
}

impl Catalog {
    /// Build a catalog from already validated pairs.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateId` when two pairs share an id.
    pub fn new(pairs: Vec<ImagePair>) -> Result<Self, CatalogError> {
        if pairs.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(pairs.len());
        for pair in &pairs {
            if !seen.insert(pair.id()) {
                return Err(CatalogError::DuplicateId {
                    id: pair.id().clone(),
                });
            }
        }
        Ok(Self { pairs })
    }

    /// Validate raw records, skipping the ones that fail.
    ///
    /// Later records reusing an earlier id are skipped as duplicates.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` when there are no records at all and
    /// `CatalogError::NoValidPairs` when every record was rejected.
    pub fn from_drafts(
        drafts: impl IntoIterator<Item = ImagePairDraft>,
    ) -> Result<(Self, CatalogReport), CatalogError> {
        let mut report = CatalogReport::default();
        let mut seen: HashSet<PairId> = HashSet::new();
        let mut pairs = Vec::new();
        let mut total = 0_usize;

        for (index, draft) in drafts.into_iter().enumerate() {
            total += 1;
            let pair = match draft.validate() {
                Ok(pair) => pair,
                Err(err) => {
                    report.skipped.push(SkippedRecord {
                        index,
                        error: err.into(),
                    });
                    continue;
                }
            };
            if !seen.insert(pair.id().clone()) {
                report.skipped.push(SkippedRecord {
                    index,
                    error: CatalogError::DuplicateId {
                        id: pair.id().clone(),
                    },
                });
                continue;
            }
            pairs.push(pair);
        }

        if total == 0 {
            return Err(CatalogError::Empty);
        }
        if pairs.is_empty() {
            return Err(CatalogError::NoValidPairs {
                skipped: report.skipped.len(),
            });
        }

        Ok((Self { pairs }, report))
    }

    /// Minimal built-in catalog used when the real one is missing or malformed.
    #[must_use]
    pub fn fallback() -> Self {
        let pairs = (1..=3)
            .filter_map(|n| {
                ImagePairDraft::new(
                    format!("fallback_{n}"),
                    format!("images/fallback/real_{n}.jpg"),
                    format!("images/fallback/fake_{n}.jpg"),
                )
                .validate()
                .ok()
            })
            .collect();
        Self { pairs }
    }

    #[must_use]
    pub fn pairs(&self) -> &[ImagePair] {
        &self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
