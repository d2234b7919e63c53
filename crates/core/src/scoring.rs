//! Score percentages and result tiers.
//!
//! Tier thresholds are percentages of the round count, so the same table works
//! for a 5-round session and a 50-round one.

use serde::Serialize;

use crate::model::SettingsError;

/// Percentage of correct answers, rounded half up (`round(score / total * 100)`).
///
/// Returns 0 when `total` is 0. Scores above `total` are clamped to 100.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score.min(total));
    let total = u64::from(total);
    let rounded = (200 * score + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── TIERS ─────────────────────────────────────────────────────────────────────
//

/// Result bracket for a finished session, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl Tier {
    /// Position in the tier table, 0 being the top tier.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Tier::Excellent => 0,
            Tier::Good => 1,
            Tier::Fair => 2,
            Tier::NeedsPractice => 3,
        }
    }

    /// Feedback line shown on the results screen.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent! You have a keen eye for spotting deepfakes!",
            Tier::Good => "Good job! You're getting better at detecting deepfakes!",
            Tier::Fair => "Not bad! Keep practicing to improve your deepfake detection skills!",
            Tier::NeedsPractice => {
                "Keep practicing! Deepfake detection takes time and attention to detail!"
            }
        }
    }
}

/// Minimum percentages for the three upper tiers. Anything below `fair` is
/// `Tier::NeedsPractice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThresholds {
    excellent: u8,
    good: u8,
    fair: u8,
}

impl TierThresholds {
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidTierThresholds` unless
    /// `100 >= excellent > good > fair >= 1`.
    pub fn new(excellent: u8, good: u8, fair: u8) -> Result<Self, SettingsError> {
        let ordered = excellent > good && good > fair;
        if !ordered || excellent > 100 || fair == 0 {
            return Err(SettingsError::InvalidTierThresholds {
                excellent,
                good,
                fair,
            });
        }
        Ok(Self {
            excellent,
            good,
            fair,
        })
    }

    #[must_use]
    pub fn excellent(&self) -> u8 {
        self.excellent
    }

    #[must_use]
    pub fn good(&self) -> u8 {
        self.good
    }

    #[must_use]
    pub fn fair(&self) -> u8 {
        self.fair
    }

    /// Highest tier whose threshold `score / total` meets.
    ///
    /// Compares exact fractions, not the rounded percentage.
    #[must_use]
    pub fn tier_for(&self, score: u32, total: u32) -> Tier {
        let meets = |threshold: u8| {
            u64::from(score) * 100 >= u64::from(threshold) * u64::from(total)
        };
        if total == 0 {
            Tier::NeedsPractice
        } else if meets(self.excellent) {
            Tier::Excellent
        } else if meets(self.good) {
            Tier::Good
        } else if meets(self.fair) {
            Tier::Fair
        } else {
            Tier::NeedsPractice
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 80,
            good: 60,
            fair: 40,
        }
    }
}
