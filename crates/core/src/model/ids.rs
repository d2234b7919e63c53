use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of an image pair, as written in the catalog (`pair_0`, `pair_1`, ...).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

impl PairId {
    /// Creates a new `PairId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the identifier is empty after trimming.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ParseIdError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                raw: id.as_ref().to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PairId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairId({})", self.0)
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for parsing a `PairId` from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pair id: {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for PairId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PairId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_id_trims_whitespace() {
        let id = PairId::new("  pair_3 ").unwrap();
        assert_eq!(id.as_str(), "pair_3");
        assert_eq!(id.to_string(), "pair_3");
        assert_eq!(format!("{id:?}"), "PairId(pair_3)");
    }

    #[test]
    fn pair_id_rejects_blank() {
        assert!(PairId::new("   ").is_err());
        assert!("".parse::<PairId>().is_err());
    }

    #[test]
    fn pair_id_parses_from_str() {
        let id: PairId = "pair_12".parse().unwrap();
        assert_eq!(id, PairId::new("pair_12").unwrap());
    }
}
