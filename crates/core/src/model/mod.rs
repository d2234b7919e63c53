mod catalog;
mod ids;
mod pair;
mod round;
mod settings;
mod summary;

pub use catalog::{Catalog, CatalogError, CatalogReport, SkippedRecord};
pub use ids::{PairId, ParseIdError};
pub use pair::{ImagePair, ImagePairDraft, PairError};
pub use round::{Round, Side};
pub use settings::{QuizSettings, QuizSettingsDraft, SettingsError};
pub use summary::{AnswerRecord, QuizSummary, QuizSummaryError};
