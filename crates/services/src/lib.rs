#![forbid(unsafe_code)]

pub mod catalog_service;
pub mod error;
pub mod sequencer;
pub mod sessions;

pub use fakefinder_core::Clock;

pub use catalog_service::{CatalogHandle, CatalogNotice, CatalogPublisher, LoadedCatalog, load_catalog};
pub use error::{CatalogLoadError, SequenceError, SessionError};
pub use sequencer::{RoundPlan, RoundSequencer};

pub use sessions::{
    AnswerFeedback, FinalReport, QuizIntent, QuizService, QuizSession, QuizUpdate, RestartTarget,
    RoundView, SessionAction, SessionProgress, SessionState,
};
