use rand::Rng;
use rand::seq::SliceRandom;

use fakefinder_core::model::{ImagePair, QuizSettings, Round, Side};

use crate::error::SequenceError;

/// Rounds produced for one session, plus how they were chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundPlan {
    pub rounds: Vec<Round>,
    /// Number of different pairs used.
    pub distinct_pairs: usize,
    /// Rounds reusing a pair already used earlier in the plan.
    pub repeated: usize,
    /// Pairs taken in catalog order after random selection ran out of attempts.
    pub deterministic_fill: usize,
}

impl RoundPlan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Turns a catalog into a randomized sequence of rounds.
///
/// Pairs are distinct whenever the catalog is large enough. Distinct selection
/// draws at random up to `attempts_per_round * count` times, then fills the
/// remaining slots from unused pairs in catalog order; the final order is
/// shuffled either way. When the catalog is smaller than `count`, whole shuffled
/// passes over the catalog are concatenated so each pair appears as evenly as
/// possible.
#[derive(Debug, Clone, Copy)]
pub struct RoundSequencer {
    attempts_per_round: u32,
}

impl RoundSequencer {
    #[must_use]
    pub fn new(attempts_per_round: u32) -> Self {
        Self {
            attempts_per_round: attempts_per_round.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self::new(settings.selection_attempts_per_round())
    }

    /// Build `count` rounds from `pairs`. `pairs` is only read.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::InsufficientData` if `pairs` is empty.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        pairs: &[ImagePair],
        count: usize,
        rng: &mut R,
    ) -> Result<RoundPlan, SequenceError> {
        if pairs.is_empty() {
            return Err(SequenceError::InsufficientData);
        }

        let (order, deterministic_fill) = if count <= pairs.len() {
            self.pick_distinct(pairs.len(), count, rng)
        } else {
            tracing::warn!(
                pairs = pairs.len(),
                rounds = count,
                "catalog smaller than round count; pairs will repeat"
            );
            (repeat_passes(pairs.len(), count, rng), 0)
        };

        let distinct_pairs = count.min(pairs.len());
        let rounds = order
            .into_iter()
            .enumerate()
            .map(|(index, pair_index)| {
                let side = if rng.random::<bool>() {
                    Side::Left
                } else {
                    Side::Right
                };
                Round::from_pair(index, &pairs[pair_index], side)
            })
            .collect();

        Ok(RoundPlan {
            rounds,
            distinct_pairs,
            repeated: count - distinct_pairs,
            deterministic_fill,
        })
    }

    fn pick_distinct<R: Rng + ?Sized>(
        &self,
        len: usize,
        count: usize,
        rng: &mut R,
    ) -> (Vec<usize>, usize) {
        let budget = usize::try_from(self.attempts_per_round)
            .unwrap_or(usize::MAX)
            .saturating_mul(count);
        let mut used = vec![false; len];
        let mut picked = Vec::with_capacity(count);
        let mut attempts = 0_usize;

        while picked.len() < count && attempts < budget {
            attempts += 1;
            let candidate = rng.random_range(0..len);
            if !used[candidate] {
                used[candidate] = true;
                picked.push(candidate);
            }
        }

        let drawn = picked.len();
        if drawn < count {
            picked.extend(
                (0..len)
                    .filter(|index| !used[*index])
                    .take(count - drawn),
            );
            tracing::warn!(
                attempts,
                filled = count - drawn,
                "random pair selection hit its attempt cap; filled remaining rounds in catalog order"
            );
        }

        picked.shuffle(rng);
        (picked, count - drawn)
    }
}

impl Default for RoundSequencer {
    fn default() -> Self {
        Self::from_settings(&QuizSettings::default())
    }
}

/// Concatenate shuffled passes over `0..len` until `count` indices are produced.
///
/// A pass never starts with the index the previous pass ended on, so the same pair
/// is not shown twice in a row when `len > 1`.
fn repeat_passes<R: Rng + ?Sized>(len: usize, count: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::with_capacity(count);
    while order.len() < count {
        let mut pass: Vec<usize> = (0..len).collect();
        pass.shuffle(rng);
        if len > 1 && order.last() == pass.first() {
            let swap_with = rng.random_range(1..len);
            pass.swap(0, swap_with);
        }
        let take = (count - order.len()).min(len);
        order.extend_from_slice(&pass[..take]);
    }
    order
}
