use serde::Serialize;
use thiserror::Error;

use crate::model::ids::PairId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PairError {
    #[error("pair id cannot be empty")]
    EmptyId,

    #[error("pair {id}: real image path cannot be empty")]
    EmptyRealPath { id: String },

    #[error("pair {id}: fake image path cannot be empty")]
    EmptyFakePath { id: String },

    #[error("pair {id}: real and fake image paths must differ")]
    IdenticalPaths { id: String },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated pair record, as read from a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImagePairDraft {
    pub id: String,
    pub real_path: String,
    pub fake_path: String,
}

impl ImagePairDraft {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        real_path: impl Into<String>,
        fake_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            real_path: real_path.into(),
            fake_path: fake_path.into(),
        }
    }

    /// Validate and normalize the draft into an `ImagePair`.
    ///
    /// # Errors
    ///
    /// Returns `PairError` if the id or either path is blank, or if both paths are equal.
    pub fn validate(self) -> Result<ImagePair, PairError> {
        let id = PairId::new(&self.id).map_err(|_| PairError::EmptyId)?;
        let real_path = self.real_path.trim().to_owned();
        let fake_path = self.fake_path.trim().to_owned();

        if real_path.is_empty() {
            return Err(PairError::EmptyRealPath { id: id.to_string() });
        }
        if fake_path.is_empty() {
            return Err(PairError::EmptyFakePath { id: id.to_string() });
        }
        if real_path == fake_path {
            return Err(PairError::IdenticalPaths { id: id.to_string() });
        }

        Ok(ImagePair {
            id,
            real_path,
            fake_path,
        })
    }
}

//
// ─── PAIR ──────────────────────────────────────────────────────────────────────
//

/// One authentic portrait bound to one synthetic portrait.
///
/// `fake_path` is always the synthetic image. Pairs are immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePair {
    id: PairId,
    real_path: String,
    fake_path: String,
}

impl ImagePair {
    #[must_use]
    pub fn id(&self) -> &PairId {
        &self.id
    }

    #[must_use]
    pub fn real_path(&self) -> &str {
        &self.real_path
    }

    #[must_use]
    pub fn fake_path(&self) -> &str {
        &self.fake_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_fields() {
        let pair = ImagePairDraft::new(" pair_0 ", " images/a.jpg", "images/b.jpg ")
            .validate()
            .unwrap();
        assert_eq!(pair.id().as_str(), "pair_0");
        assert_eq!(pair.real_path(), "images/a.jpg");
        assert_eq!(pair.fake_path(), "images/b.jpg");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert_eq!(
            ImagePairDraft::new("", "a.jpg", "b.jpg").validate(),
            Err(PairError::EmptyId)
        );
        assert_eq!(
            ImagePairDraft::new("p", " ", "b.jpg").validate(),
            Err(PairError::EmptyRealPath { id: "p".into() })
        );
        assert_eq!(
            ImagePairDraft::new("p", "a.jpg", "").validate(),
            Err(PairError::EmptyFakePath { id: "p".into() })
        );
    }

    #[test]
    fn validate_rejects_identical_paths() {
        let err = ImagePairDraft::new("p", "same.jpg", " same.jpg")
            .validate()
            .unwrap_err();
        assert_eq!(err, PairError::IdenticalPaths { id: "p".into() });
    }
}
