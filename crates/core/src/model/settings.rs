use thiserror::Error;

use crate::scoring::TierThresholds;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("total rounds must be > 0")]
    InvalidTotalRounds,

    #[error("selection attempts per round must be > 0")]
    InvalidSelectionAttempts,

    #[error("tier thresholds must satisfy 100 >= excellent > good > fair >= 1 (got {excellent}/{good}/{fair})")]
    InvalidTierThresholds { excellent: u8, good: u8, fair: u8 },
}

/// Quiz configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    total_rounds: u32,
    tiers: TierThresholds,
    selection_attempts_per_round: u32,
}

/// Partially specified settings; unset fields take the defaults.
#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub total_rounds: Option<u32>,
    pub tier_thresholds: Option<[u8; 3]>,
    pub selection_attempts_per_round: Option<u32>,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_total_rounds(mut self, total_rounds: u32) -> Self {
        self.total_rounds = Some(total_rounds);
        self
    }

    /// Validate the draft, filling unset fields from `QuizSettings::default()`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if any provided value is out of range.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let defaults = QuizSettings::default();

        let total_rounds = self.total_rounds.unwrap_or(defaults.total_rounds);
        if total_rounds == 0 {
            return Err(SettingsError::InvalidTotalRounds);
        }

        let selection_attempts_per_round = self
            .selection_attempts_per_round
            .unwrap_or(defaults.selection_attempts_per_round);
        if selection_attempts_per_round == 0 {
            return Err(SettingsError::InvalidSelectionAttempts);
        }

        let tiers = match self.tier_thresholds {
            Some([excellent, good, fair]) => TierThresholds::new(excellent, good, fair)?,
            None => defaults.tiers,
        };

        Ok(QuizSettings {
            total_rounds,
            tiers,
            selection_attempts_per_round,
        })
    }
}

impl QuizSettings {
    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    #[must_use]
    pub fn tiers(&self) -> &TierThresholds {
        &self.tiers
    }

    /// Upper bound on random draws per round during distinct pair selection.
    #[must_use]
    pub fn selection_attempts_per_round(&self) -> u32 {
        self.selection_attempts_per_round
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            total_rounds: 10,
            tiers: TierThresholds::default(),
            selection_attempts_per_round: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_yields_defaults() {
        let settings = QuizSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, QuizSettings::default());
        assert_eq!(settings.total_rounds(), 10);
        assert_eq!(settings.tiers().excellent(), 80);
        assert_eq!(settings.selection_attempts_per_round(), 8);
    }

    #[test]
    fn draft_rejects_zero_rounds() {
        let err = QuizSettingsDraft::new()
            .with_total_rounds(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, SettingsError::InvalidTotalRounds);
    }

    #[test]
    fn draft_rejects_zero_attempts() {
        let draft = QuizSettingsDraft {
            selection_attempts_per_round: Some(0),
            ..QuizSettingsDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            SettingsError::InvalidSelectionAttempts
        );
    }

    #[test]
    fn draft_applies_custom_tiers() {
        let draft = QuizSettingsDraft {
            total_rounds: Some(5),
            tier_thresholds: Some([90, 70, 50]),
            selection_attempts_per_round: None,
        };
        let settings = draft.validate().unwrap();
        assert_eq!(settings.total_rounds(), 5);
        assert_eq!(settings.tiers().good(), 70);

        let bad = QuizSettingsDraft {
            tier_thresholds: Some([40, 60, 80]),
            ..QuizSettingsDraft::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(SettingsError::InvalidTierThresholds { .. })
        ));
    }
}
