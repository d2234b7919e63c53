use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::PairId;
use crate::model::pair::ImagePair;

//
// ─── SIDE ──────────────────────────────────────────────────────────────────────
//

/// Placement slot of an image within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Letter shown to the player for this slot (`A` on the left, `B` on the right).
    #[must_use]
    pub fn label(self) -> char {
        match self {
            Side::Left => 'A',
            Side::Right => 'B',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

//
// ─── ROUND ─────────────────────────────────────────────────────────────────────
//

/// One presented question: a pair placed into left/right slots.
///
/// The two slots always hold the real and fake paths of the source pair, and
/// `synthetic_side` names the slot holding the fake one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Round {
    index: usize,
    left_image: String,
    right_image: String,
    synthetic_side: Side,
    source_pair_id: PairId,
}

impl Round {
    /// Place `pair` into a round, putting its fake image on `synthetic_side`.
    #[must_use]
    pub fn from_pair(index: usize, pair: &ImagePair, synthetic_side: Side) -> Self {
        let (left_image, right_image) = match synthetic_side {
            Side::Left => (pair.fake_path(), pair.real_path()),
            Side::Right => (pair.real_path(), pair.fake_path()),
        };
        Self {
            index,
            left_image: left_image.to_owned(),
            right_image: right_image.to_owned(),
            synthetic_side,
            source_pair_id: pair.id().clone(),
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn left_image(&self) -> &str {
        &self.left_image
    }

    #[must_use]
    pub fn right_image(&self) -> &str {
        &self.right_image
    }

    #[must_use]
    pub fn image(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_image,
            Side::Right => &self.right_image,
        }
    }

    #[must_use]
    pub fn synthetic_side(&self) -> Side {
        self.synthetic_side
    }

    #[must_use]
    pub fn source_pair_id(&self) -> &PairId {
        &self.source_pair_id
    }

    /// True when `side` points at the synthetic image.
    #[must_use]
    pub fn is_correct(&self, side: Side) -> bool {
        side == self.synthetic_side
    }
}
