use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{PairId, Side};
use crate::scoring::{Tier, TierThresholds, percentage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many answers for a single session: {len}")]
    TooManyAnswers { len: usize },

    #[error("score ({score}) exceeds total rounds ({total})")]
    ScoreOutOfRange { score: u32, total: u32 },
}

/// The answer given for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub round_index: usize,
    pub pair_id: PairId,
    pub selected: Side,
    pub synthetic_side: Side,
}

impl AnswerRecord {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected == self.synthetic_side
    }
}

/// Aggregate result of a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: u32,
    total: u32,
    percentage: u8,
    tier: Tier,
}

impl QuizSummary {
    /// Build a summary from a score and round count.
    ///
    /// # Errors
    ///
    /// Returns `QuizSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`,
    /// or `QuizSummaryError::ScoreOutOfRange` if `score > total`.
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: u32,
        total: u32,
        tiers: &TierThresholds,
    ) -> Result<Self, QuizSummaryError> {
        if completed_at < started_at {
            return Err(QuizSummaryError::InvalidTimeRange);
        }
        if score > total {
            return Err(QuizSummaryError::ScoreOutOfRange { score, total });
        }

        Ok(Self {
            started_at,
            completed_at,
            score,
            total,
            percentage: percentage(score, total),
            tier: tiers.tier_for(score, total),
        })
    }

    /// Build a summary from the recorded answers, one per round.
    ///
    /// # Errors
    ///
    /// Returns `QuizSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `QuizSummaryError::TooManyAnswers` if the answer count cannot fit in `u32`.
    pub fn from_answers(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        answers: &[AnswerRecord],
        tiers: &TierThresholds,
    ) -> Result<Self, QuizSummaryError> {
        let total = u32::try_from(answers.len())
            .map_err(|_| QuizSummaryError::TooManyAnswers { len: answers.len() })?;
        let score = answers
            .iter()
            .filter(|answer| answer.is_correct())
            .fold(0_u32, |acc, _| acc.saturating_add(1));

        Self::new(started_at, completed_at, score, total, tiers)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        self.tier.message()
    }
}
