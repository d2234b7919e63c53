use serde::Serialize;

use fakefinder_core::model::{AnswerRecord, QuizSummary, Side};
use fakefinder_core::scoring::Tier;

use super::service::QuizSession;

/// Render-facing data for the round currently on screen.
///
/// Presentation-agnostic: the renderer decides how images and numbers are drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
    /// 1-based.
    pub round_number: usize,
    pub total_rounds: u32,
    pub left_image: String,
    pub right_image: String,
    pub score: u32,
    pub percentage: u8,
}

impl RoundView {
    /// View of the current round, or `None` outside a round.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let round = session.current_round()?;
        Some(Self {
            round_number: round.index() + 1,
            total_rounds: session.total_rounds(),
            left_image: round.left_image().to_owned(),
            right_image: round.right_image().to_owned(),
            score: session.score(),
            percentage: session.percentage(),
        })
    }
}

/// Result of one answer, for highlighting the synthetic image and showing feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
    pub round_number: usize,
    pub correct: bool,
    pub selected: Side,
    pub synthetic_side: Side,
    pub message: String,
    pub score: u32,
    pub percentage: u8,
    pub is_last_round: bool,
}

impl AnswerFeedback {
    #[must_use]
    pub fn new(record: &AnswerRecord, session: &QuizSession) -> Self {
        let correct = record.is_correct();
        let round_number = record.round_index + 1;
        Self {
            round_number,
            correct,
            selected: record.selected,
            synthetic_side: record.synthetic_side,
            message: feedback_message(correct, record.synthetic_side),
            score: session.score(),
            percentage: session.percentage(),
            is_last_round: round_number == session.rounds().len(),
        }
    }
}

/// Feedback line for one answer.
#[must_use]
pub fn feedback_message(correct: bool, synthetic_side: Side) -> String {
    if correct {
        "Correct! You identified the deepfake!".to_owned()
    } else {
        format!(
            "Image {} was the deepfake. Keep practicing!",
            synthetic_side.label()
        )
    }
}

/// Results screen data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalReport {
    pub score: u32,
    pub total_rounds: u32,
    pub percentage: u8,
    pub tier: Tier,
    pub message: String,
    pub summary: QuizSummary,
}

impl From<QuizSummary> for FinalReport {
    fn from(summary: QuizSummary) -> Self {
        Self {
            score: summary.score(),
            total_rounds: summary.total(),
            percentage: summary.percentage(),
            tier: summary.tier(),
            message: summary.message().to_owned(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakefinder_core::model::{ImagePairDraft, Round};
    use fakefinder_core::scoring::TierThresholds;
    use fakefinder_core::time::fixed_now;

    fn session_with(sides: &[Side]) -> QuizSession {
        let rounds = sides
            .iter()
            .enumerate()
            .map(|(i, side)| {
                let pair = ImagePairDraft::new(format!("p{i}"), format!("r{i}.jpg"), format!("f{i}.jpg"))
                    .validate()
                    .unwrap();
                Round::from_pair(i, &pair, *side)
            })
            .collect();
        QuizSession::with_rounds(rounds, TierThresholds::default())
    }

    #[test]
    fn round_view_is_one_based() {
        let mut session = session_with(&[Side::Right, Side::Left]);
        assert!(RoundView::from_session(&session).is_none());

        session.start(fixed_now()).unwrap();
        let view = RoundView::from_session(&session).unwrap();
        assert_eq!(view.round_number, 1);
        assert_eq!(view.total_rounds, 2);
        assert_eq!(view.left_image, "r0.jpg");
        assert_eq!(view.right_image, "f0.jpg");
        assert_eq!(view.percentage, 0);
    }

    #[test]
    fn wrong_answer_names_the_synthetic_image() {
        let mut session = session_with(&[Side::Right]);
        session.start(fixed_now()).unwrap();
        let record = session.select_answer(Side::Left).unwrap().clone();
        let feedback = AnswerFeedback::new(&record, &session);

        assert!(!feedback.correct);
        assert_eq!(feedback.synthetic_side, Side::Right);
        assert_eq!(feedback.message, "Image B was the deepfake. Keep practicing!");
        assert!(feedback.is_last_round);
    }

    #[test]
    fn final_report_carries_tier_message() {
        let mut session = session_with(&[Side::Left]);
        session.start(fixed_now()).unwrap();
        session.select_answer(Side::Left).unwrap();
        session.advance(fixed_now()).unwrap();

        let report = FinalReport::from(session.build_summary().unwrap());
        assert_eq!(report.score, 1);
        assert_eq!(report.percentage, 100);
        assert_eq!(report.tier, Tier::Excellent);
        assert_eq!(report.message, Tier::Excellent.message());
    }
}
