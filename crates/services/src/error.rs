//! Shared error types for the services crate.

use thiserror::Error;

use fakefinder_core::model::{CatalogError, QuizSummaryError};
use storage::StorageError;

use crate::sessions::{SessionAction, SessionState};

/// Errors emitted by `RoundSequencer`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SequenceError {
    #[error("no image pairs available to build rounds from")]
    InsufficientData,
}

/// Why a catalog load fell back to the built-in pairs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("catalog source unavailable: {0}")]
    Source(#[from] StorageError),
    #[error("catalog rejected: {0}")]
    Invalid(#[from] CatalogError),
    #[error("catalog loader stopped before publishing a result")]
    LoaderGone,
}

/// Errors emitted by the quiz session and its driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("catalog is still loading")]
    NotReady,
    #[error("no image pairs available for a session")]
    InsufficientData,
    #[error("an answer was already recorded for this round")]
    DuplicateSelection,
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: SessionAction,
        state: SessionState,
    },
    #[error("session has no rounds")]
    Empty,
    #[error(transparent)]
    Summary(#[from] QuizSummaryError),
}

impl From<SequenceError> for SessionError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::InsufficientData => SessionError::InsufficientData,
        }
    }
}
