//! Merge policy module.
//!
//! An item may be obtainable naturally, by crafting, or both. A merge
//! policy combines the two signals into the final score. There is no single
//! correct rule, so the resolver takes the policy as a parameter.
//!
//! Every built-in policy follows the same fallback: when only one signal
//! is resolved it wins unchanged, and when neither is, the result is the
//! configured unknown default.

use crate::error::{RarityError, Result};
use crate::score::RarityScore;
use serde::{Deserialize, Serialize};

/// Score for items with no usable signal at all: odds of a coin flip.
pub const DEFAULT_UNKNOWN_RARITY: f64 = 2.0;

/// Strategy combining natural and crafted rarity.
pub trait MergePolicy {
    /// Combine the two signals.
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore;

    /// Human-readable description of this policy.
    fn description(&self) -> String;
}

impl MergePolicy for Box<dyn MergePolicy> {
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore {
        (**self).merge(natural, crafted)
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

impl<P: MergePolicy + ?Sized> MergePolicy for &P {
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore {
        (**self).merge(natural, crafted)
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// Shared fallback: `Some(result)` when at most one side is resolved.
fn fallback(
    natural: RarityScore,
    crafted: RarityScore,
    unknown: RarityScore,
) -> Option<RarityScore> {
    match (natural.is_resolved(), crafted.is_resolved()) {
        (true, true) => None,
        (true, false) => Some(natural),
        (false, true) => Some(crafted),
        (false, false) => Some(unknown),
    }
}

/// A blend of two finite scores. Rounding can push it past `f64::MAX`;
/// that saturates instead of turning into the sentinel.
fn blended(odds: f64) -> RarityScore {
    if odds == f64::INFINITY {
        RarityScore::from_odds(f64::MAX)
    } else {
        RarityScore::from_odds(odds)
    }
}

fn unknown_score(unknown: f64) -> Result<RarityScore> {
    let score = RarityScore::from_odds(unknown);
    if score.is_resolved() {
        Ok(score)
    } else {
        Err(RarityError::InvalidConfig(format!(
            "unknown default must be positive and finite, got {unknown}"
        )))
    }
}

/// The more accessible path wins.
///
/// # Examples
///
/// ```rust
/// use rarecraft::merge::{MergePolicy, MinMerge};
/// use rarecraft::RarityScore;
///
/// let policy = MinMerge::default();
/// let natural = RarityScore::from_odds(8.0);
/// let crafted = RarityScore::from_odds(3.0);
///
/// assert_eq!(policy.merge(natural, crafted).get(), Some(3.0));
/// assert_eq!(policy.merge(natural, RarityScore::UNRESOLVED).get(), Some(8.0));
/// assert_eq!(policy.merge(RarityScore::UNRESOLVED, RarityScore::UNRESOLVED).get(), Some(2.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MinMerge {
    unknown: RarityScore,
}

impl MinMerge {
    /// Create with a custom unknown default.
    pub fn new(unknown: f64) -> Result<Self> {
        Ok(Self {
            unknown: unknown_score(unknown)?,
        })
    }
}

impl Default for MinMerge {
    fn default() -> Self {
        Self {
            unknown: RarityScore::from_odds(DEFAULT_UNKNOWN_RARITY),
        }
    }
}

impl MergePolicy for MinMerge {
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore {
        fallback(natural, crafted, self.unknown).unwrap_or_else(|| natural.min(crafted))
    }

    fn description(&self) -> String {
        "min".to_string()
    }
}

/// Straight average of both signals.
#[derive(Debug, Clone, Copy)]
pub struct AverageMerge {
    unknown: RarityScore,
}

impl AverageMerge {
    /// Create with a custom unknown default.
    pub fn new(unknown: f64) -> Result<Self> {
        Ok(Self {
            unknown: unknown_score(unknown)?,
        })
    }
}

impl Default for AverageMerge {
    fn default() -> Self {
        Self {
            unknown: RarityScore::from_odds(DEFAULT_UNKNOWN_RARITY),
        }
    }
}

impl MergePolicy for AverageMerge {
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore {
        fallback(natural, crafted, self.unknown).unwrap_or_else(|| {
            blended(natural.value() / 2.0 + crafted.value() / 2.0)
        })
    }

    fn description(&self) -> String {
        "average".to_string()
    }
}

/// Fixed-weight blend, e.g. `0.6 × natural + 0.4 × crafted`.
///
/// Weights are normalized to sum to one.
///
/// # Examples
///
/// ```rust
/// use rarecraft::merge::{MergePolicy, WeightedMerge};
/// use rarecraft::RarityScore;
///
/// let policy = WeightedMerge::new(0.6, 0.4, 2.0).unwrap();
/// let merged = policy.merge(RarityScore::from_odds(10.0), RarityScore::from_odds(5.0));
/// assert!((merged.value() - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WeightedMerge {
    natural_weight: f64,
    crafted_weight: f64,
    unknown: RarityScore,
}

impl WeightedMerge {
    /// Create a blend. Weights must be finite, non-negative and not both zero.
    pub fn new(natural_weight: f64, crafted_weight: f64, unknown: f64) -> Result<Self> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        let total = natural_weight + crafted_weight;
        if !(valid(natural_weight) && valid(crafted_weight) && total > 0.0) {
            return Err(RarityError::InvalidConfig(format!(
                "merge weights must be non-negative and not both zero, \
                 got {natural_weight} / {crafted_weight}"
            )));
        }
        Ok(Self {
            natural_weight: natural_weight / total,
            crafted_weight: crafted_weight / total,
            unknown: unknown_score(unknown)?,
        })
    }
}

impl MergePolicy for WeightedMerge {
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore {
        fallback(natural, crafted, self.unknown).unwrap_or_else(|| {
            blended(self.natural_weight * natural.value() + self.crafted_weight * crafted.value())
        })
    }

    fn description(&self) -> String {
        format!(
            "{:.2}×natural + {:.2}×crafted",
            self.natural_weight, self.crafted_weight
        )
    }
}

/// A policy backed by a closure.
///
/// The closure sees raw inputs, sentinel included; output is normalized.
pub struct FnMerge<F> {
    description: String,
    f: F,
}

impl<F> FnMerge<F>
where
    F: Fn(RarityScore, RarityScore) -> RarityScore,
{
    /// Wrap a closure as a policy.
    pub fn new(description: impl Into<String>, f: F) -> Self {
        Self {
            description: description.into(),
            f,
        }
    }
}

impl<F> MergePolicy for FnMerge<F>
where
    F: Fn(RarityScore, RarityScore) -> RarityScore,
{
    fn merge(&self, natural: RarityScore, crafted: RarityScore) -> RarityScore {
        let merged = (self.f)(natural, crafted);
        if merged.is_resolved() {
            merged
        } else {
            RarityScore::UNRESOLVED
        }
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Declarative merge rule, as it appears in configuration.
///
/// # Examples
///
/// ```rust
/// use rarecraft::merge::MergeRule;
/// use rarecraft::RarityScore;
///
/// let rule: MergeRule = serde_json::from_str(
///     r#"{"rule": "weighted", "natural_weight": 0.6, "crafted_weight": 0.4}"#,
/// ).unwrap();
/// let policy = rule.compile(2.0).unwrap();
/// let merged = policy.merge(RarityScore::from_odds(1.0), RarityScore::from_odds(2.0));
/// assert!((merged.value() - 1.4).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MergeRule {
    /// `MinMerge`.
    #[default]
    Min,
    /// `AverageMerge`.
    Average,
    /// `WeightedMerge`.
    Weighted {
        /// Weight of the natural signal.
        natural_weight: f64,
        /// Weight of the crafted signal.
        crafted_weight: f64,
    },
}

impl MergeRule {
    /// Build the policy.
    pub fn compile(&self, unknown: f64) -> Result<Box<dyn MergePolicy>> {
        Ok(match *self {
            MergeRule::Min => Box::new(MinMerge::new(unknown)?),
            MergeRule::Average => Box::new(AverageMerge::new(unknown)?),
            MergeRule::Weighted {
                natural_weight,
                crafted_weight,
            } => Box::new(WeightedMerge::new(natural_weight, crafted_weight, unknown)?),
        })
    }
}
