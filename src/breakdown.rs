//! Resolution results.
//!
//! `RarityBreakdown` records how one item's score came about;
//! `RarityMap` is the final identifier → score mapping handed to sinks;
//! `RarityReport` bundles both with run diagnostics.

use crate::item_id::ItemId;
use crate::score::RarityScore;
use crate::state::ResolutionStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one item's final score was reached.
///
/// # Examples
///
/// ```rust
/// use rarecraft::breakdown::RarityBreakdown;
/// use rarecraft::{ItemId, RarityScore};
///
/// let b = RarityBreakdown::new(
///     ItemId::from_str("torch"),
///     RarityScore::UNRESOLVED,
///     RarityScore::from_odds(0.75),
///     RarityScore::from_odds(0.75),
/// )
/// .with_recipe(0);
///
/// assert_eq!(b.recipe, Some(0));
/// assert!(!b.natural.is_resolved());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityBreakdown {
    /// The item.
    pub item: ItemId,
    /// Natural acquisition signal.
    pub natural: RarityScore,
    /// Crafted signal from the cheapest recipe.
    pub crafted: RarityScore,
    /// Final merged score.
    pub score: RarityScore,
    /// Index of the recipe that produced `crafted`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<usize>,
}

impl RarityBreakdown {
    /// Create a breakdown with no chosen recipe.
    pub fn new(
        item: ItemId,
        natural: RarityScore,
        crafted: RarityScore,
        score: RarityScore,
    ) -> Self {
        Self {
            item,
            natural,
            crafted,
            score,
            recipe: None,
        }
    }

    /// Record which recipe was chosen.
    pub fn with_recipe(mut self, index: usize) -> Self {
        self.recipe = Some(index);
        self
    }
}

/// Final identifier → score mapping.
///
/// Keys are unique and iterate in sorted order, so serialized output is
/// reproducible. Serializes as a flat JSON object.
///
/// # Examples
///
/// ```rust
/// use rarecraft::{ItemId, RarityMap, RarityScore};
///
/// let mut map = RarityMap::new();
/// map.insert(ItemId::from_str("stone"), RarityScore::from_odds(1.0));
/// map.insert(ItemId::from_str("diamond"), RarityScore::from_odds(800.0));
///
/// let json = serde_json::to_string(&map).unwrap();
/// assert_eq!(json, r#"{"diamond":800.0,"stone":1.0}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RarityMap {
    scores: BTreeMap<ItemId, RarityScore>,
}

impl RarityMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score for `item`.
    pub fn get(&self, item: &ItemId) -> Option<RarityScore> {
        self.scores.get(item).copied()
    }

    /// Insert or replace a score.
    pub fn insert(&mut self, item: ItemId, score: RarityScore) -> Option<RarityScore> {
        self.scores.insert(item, score)
    }

    /// Whether `item` has a score.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.scores.contains_key(item)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, RarityScore)> {
        self.scores.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(ItemId, RarityScore)> for RarityMap {
    fn from_iter<I: IntoIterator<Item = (ItemId, RarityScore)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RarityReport {
    /// Final scores for every catalog item.
    pub scores: RarityMap,
    /// Per-item breakdowns, keyed like `scores`.
    pub breakdowns: BTreeMap<ItemId, RarityBreakdown>,
    /// Recipe loops found in the catalog, each sorted.
    pub cycles: Vec<Vec<ItemId>>,
    /// Run counters.
    pub stats: ResolutionStats,
}
