use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use fakefinder_core::model::{AnswerRecord, QuizSummary, Round, Side};
use fakefinder_core::scoring::{TierThresholds, percentage};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATES & ACTIONS ──────────────────────────────────────────────────────────
//

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    Welcome,
    InProgress,
    RoundAnswered,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Welcome => f.write_str("on the welcome screen"),
            SessionState::InProgress => f.write_str("a round is awaiting an answer"),
            SessionState::RoundAnswered => f.write_str("the current round is already answered"),
            SessionState::Finished => f.write_str("the session is finished"),
        }
    }
}

/// Operations that move a session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionAction {
    Start,
    SelectAnswer,
    Advance,
    Restart,
    GoHome,
    Summarize,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionAction::Start => "start",
            SessionAction::SelectAnswer => "select an answer",
            SessionAction::Advance => "advance",
            SessionAction::Restart => "restart",
            SessionAction::GoHome => "go home",
            SessionAction::Summarize => "summarize",
        };
        f.write_str(name)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz traversal from the welcome screen through every round to the results.
///
/// Transitions:
/// `Welcome -> InProgress -> RoundAnswered -> InProgress ... -> Finished`, and
/// back to `Welcome` through `reset` or `go_home` from any state.
///
/// Rejected operations leave the session untouched.
#[derive(Clone)]
pub struct QuizSession {
    rounds: Vec<Round>,
    current: usize,
    score: u32,
    pending: Option<Side>,
    state: SessionState,
    answers: Vec<AnswerRecord>,
    tiers: TierThresholds,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// A session on the welcome screen with no rounds yet.
    #[must_use]
    pub fn new(tiers: TierThresholds) -> Self {
        Self::with_rounds(Vec::new(), tiers)
    }

    /// A session on the welcome screen holding `rounds`.
    #[must_use]
    pub fn with_rounds(rounds: Vec<Round>, tiers: TierThresholds) -> Self {
        Self {
            rounds,
            current: 0,
            score: 0,
            pending: None,
            state: SessionState::Welcome,
            answers: Vec::new(),
            tiers,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn has_rounds(&self) -> bool {
        !self.rounds.is_empty()
    }

    /// Zero-based index of the current round. Equals `total_rounds()` once finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        match self.state {
            SessionState::InProgress | SessionState::RoundAnswered => self.rounds.get(self.current),
            SessionState::Welcome | SessionState::Finished => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn pending_selection(&self) -> Option<Side> {
        self.pending
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn tiers(&self) -> &TierThresholds {
        &self.tiers
    }

    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        u32::try_from(self.rounds.len()).unwrap_or(u32::MAX)
    }

    /// Running percentage of correct answers over all rounds in the session.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        percentage(self.score, self.total_rounds())
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Finished
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.rounds.len();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.is_complete(),
        }
    }

    /// Begin the first round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Welcome` and
    /// `SessionError::Empty` if the session holds no rounds.
    pub fn start(&mut self, started_at: DateTime<Utc>) -> Result<&Round, SessionError> {
        if self.state != SessionState::Welcome {
            return Err(self.reject(SessionAction::Start));
        }
        if self.rounds.is_empty() {
            return Err(SessionError::Empty);
        }

        self.current = 0;
        self.score = 0;
        self.pending = None;
        self.answers.clear();
        self.started_at = Some(started_at);
        self.completed_at = None;
        self.state = SessionState::InProgress;
        tracing::info!(rounds = self.rounds.len(), "quiz session started");

        self.rounds.first().ok_or(SessionError::Empty)
    }

    /// Record the answer for the current round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DuplicateSelection` if the round was already answered and
    /// `SessionError::InvalidTransition` outside a round.
    pub fn select_answer(&mut self, side: Side) -> Result<&AnswerRecord, SessionError> {
        match self.state {
            SessionState::InProgress => {}
            SessionState::RoundAnswered => {
                tracing::debug!(round = self.current, %side, "ignoring repeated selection");
                return Err(SessionError::DuplicateSelection);
            }
            SessionState::Welcome | SessionState::Finished => {
                return Err(self.reject(SessionAction::SelectAnswer));
            }
        }

        let round = self.rounds.get(self.current).ok_or(SessionError::Empty)?;
        let record = AnswerRecord {
            round_index: round.index(),
            pair_id: round.source_pair_id().clone(),
            selected: side,
            synthetic_side: round.synthetic_side(),
        };
        if record.is_correct() {
            self.score = self.score.saturating_add(1);
        }
        tracing::debug!(
            round = self.current,
            %side,
            correct = record.is_correct(),
            score = self.score,
            "answer recorded"
        );

        self.pending = Some(side);
        self.state = SessionState::RoundAnswered;
        self.answers.push(record);
        self.answers.last().ok_or(SessionError::Empty)
    }

    /// Move past the answered round. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the current round is answered.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<SessionState, SessionError> {
        if self.state != SessionState::RoundAnswered {
            return Err(self.reject(SessionAction::Advance));
        }

        self.current += 1;
        if self.current >= self.rounds.len() {
            self.state = SessionState::Finished;
            // The wall clock may step backwards mid-quiz.
            self.completed_at = Some(self.started_at.map_or(now, |started| now.max(started)));
            tracing::info!(
                score = self.score,
                total = self.rounds.len(),
                "quiz session finished"
            );
        } else {
            self.pending = None;
            self.state = SessionState::InProgress;
        }
        Ok(self.state)
    }

    /// Replace the rounds and return to the welcome screen. Valid from any state.
    pub fn reset(&mut self, rounds: Vec<Round>) {
        *self = Self::with_rounds(rounds, self.tiers);
    }

    /// Abandon the session and return to the welcome screen. Valid from any state.
    ///
    /// Rounds are dropped; the next start needs a fresh sequence.
    pub fn go_home(&mut self) {
        if matches!(
            self.state,
            SessionState::InProgress | SessionState::RoundAnswered
        ) {
            tracing::info!(
                answered = self.answers.len(),
                total = self.rounds.len(),
                "quiz session abandoned"
            );
        }
        self.reset(Vec::new());
    }

    /// Summary of a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` if the session is not finished.
    pub fn build_summary(&self) -> Result<QuizSummary, SessionError> {
        let (Some(started_at), Some(completed_at)) = (self.started_at, self.completed_at) else {
            return Err(self.reject(SessionAction::Summarize));
        };
        Ok(QuizSummary::from_answers(
            started_at,
            completed_at,
            &self.answers,
            &self.tiers,
        )?)
    }

    fn reject(&self, action: SessionAction) -> SessionError {
        tracing::warn!(%action, state = ?self.state, "rejected session transition");
        SessionError::InvalidTransition {
            action,
            state: self.state,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("state", &self.state)
            .field("rounds_len", &self.rounds.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("pending", &self.pending)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
