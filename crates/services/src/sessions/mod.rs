mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{QuizSession, SessionAction, SessionState};
pub use view::{AnswerFeedback, FinalReport, RoundView, feedback_message};
pub use workflow::{QuizIntent, QuizService, QuizUpdate, RestartTarget};
