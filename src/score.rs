//! Rarity score type.
//!
//! Scores use the cost/odds convention: smaller values are easier to
//! obtain, larger values are rarer. A natural probability `p` becomes odds
//! `1 / p`. `RarityScore::UNRESOLVED` (`+inf`) stands for "no information".
//!
//! Every constructor normalizes its input, so a `RarityScore` is always a
//! finite positive number or the sentinel. Zero, negative, NaN and infinite
//! inputs all collapse to the sentinel.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A non-negative rarity score, or the `UNRESOLVED` sentinel.
///
/// # Examples
///
/// ```rust
/// use rarecraft::RarityScore;
///
/// let common = RarityScore::from_probability(0.5);
/// assert_eq!(common.get(), Some(2.0));
///
/// let bogus = RarityScore::from_odds(f64::NAN);
/// assert!(!bogus.is_resolved());
/// assert_eq!(bogus, RarityScore::UNRESOLVED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RarityScore(f64);

impl RarityScore {
    /// Sentinel for "no information available". Compares greater than any
    /// resolved score.
    pub const UNRESOLVED: RarityScore = RarityScore(f64::INFINITY);

    /// Create a score from a cost/odds value.
    ///
    /// Non-finite and non-positive values become `UNRESOLVED`.
    pub fn from_odds(odds: f64) -> Self {
        if odds.is_finite() && odds > 0.0 {
            Self(odds)
        } else {
            Self::UNRESOLVED
        }
    }

    /// Create a score from a probability in `(0, 1]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rarecraft::RarityScore;
    ///
    /// assert_eq!(RarityScore::from_probability(0.25).get(), Some(4.0));
    /// assert!(!RarityScore::from_probability(0.0).is_resolved());
    /// assert!(!RarityScore::from_probability(1.5).is_resolved());
    /// ```
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.0 && probability <= 1.0 {
            Self::from_odds(1.0 / probability)
        } else {
            Self::UNRESOLVED
        }
    }

    /// Whether this score carries information.
    pub fn is_resolved(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    /// Raw value; `f64::INFINITY` for the sentinel.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The value if resolved.
    pub fn get(self) -> Option<f64> {
        if self.is_resolved() {
            Some(self.0)
        } else {
            None
        }
    }

    /// Multiply by a factor. `UNRESOLVED` stays unresolved; overflow
    /// saturates at `f64::MAX`.
    pub fn scale(self, factor: f64) -> Self {
        if !self.is_resolved() {
            return self;
        }
        let scaled = self.0 * factor;
        if scaled == f64::INFINITY {
            Self(f64::MAX)
        } else {
            Self::from_odds(scaled)
        }
    }

    /// The more accessible of two scores.
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

impl From<f64> for RarityScore {
    fn from(odds: f64) -> Self {
        Self::from_odds(odds)
    }
}

impl fmt::Display for RarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("unresolved"),
        }
    }
}

impl Serialize for RarityScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.get().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RarityScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw.map_or(RarityScore::UNRESOLVED, RarityScore::from_odds))
    }
}
