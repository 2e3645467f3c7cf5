//! Per-run resolution state.
//!
//! `VisitationSet` tracks which items are on the current ingredient chain;
//! `MemoCache` holds finalized results. Both live in a `ResolutionState`
//! that the resolver builds fresh for every run, so nothing leaks between
//! runs.

use crate::breakdown::RarityBreakdown;
use crate::item_id::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Items currently being resolved on the active chain.
///
/// Empty before and after every top-level resolution.
#[derive(Debug, Clone, Default)]
pub struct VisitationSet {
    active: HashSet<ItemId>,
}

impl VisitationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `item` as in flight. Returns `false` if it already was.
    pub fn enter(&mut self, item: &ItemId) -> bool {
        self.active.insert(item.clone())
    }

    /// Unmark `item`.
    pub fn leave(&mut self, item: &ItemId) {
        self.active.remove(item);
    }

    /// Whether `item` is in flight.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.active.contains(item)
    }

    /// Number of items in flight.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Finalized results for the current run.
///
/// Written at most once per item; the first write wins.
///
/// # Examples
///
/// ```rust
/// use rarecraft::breakdown::RarityBreakdown;
/// use rarecraft::state::MemoCache;
/// use rarecraft::{ItemId, RarityScore};
///
/// let mut memo = MemoCache::new();
/// let id = ItemId::from_str("stick");
///
/// let settled = |odds: f64| {
///     let score = RarityScore::from_odds(odds);
///     RarityBreakdown::new(id.clone(), RarityScore::UNRESOLVED, score, score)
/// };
/// let first = settled(1.0);
/// let second = settled(9.0);
///
/// assert!(memo.commit(first));
/// assert!(!memo.commit(second));
/// assert_eq!(memo.score(&id).and_then(|s| s.get()), Some(1.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoCache {
    entries: HashMap<ItemId, RarityBreakdown>,
}

impl MemoCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached breakdown for `item`.
    pub fn get(&self, item: &ItemId) -> Option<&RarityBreakdown> {
        self.entries.get(item)
    }

    /// Cached final score for `item`.
    pub fn score(&self, item: &ItemId) -> Option<crate::score::RarityScore> {
        self.entries.get(item).map(|b| b.score)
    }

    /// Store a finalized result. Returns `false` and keeps the existing
    /// entry if `item` was already committed.
    pub fn commit(&mut self, breakdown: RarityBreakdown) -> bool {
        if self.entries.contains_key(&breakdown.item) {
            return false;
        }
        self.entries.insert(breakdown.item.clone(), breakdown);
        true
    }

    /// Whether `item` has been committed.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.entries.contains_key(item)
    }

    /// Number of committed items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters collected during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Catalog items that received a final score.
    pub items: usize,
    /// Ingredient lookups answered from the memo cache.
    pub memo_hits: usize,
    /// Ingredient edges cut because the ingredient was already in flight.
    pub cycle_cuts: usize,
}

/// Mutable state for one resolver run.
#[derive(Debug, Clone, Default)]
pub struct ResolutionState {
    /// Items on the active chain.
    pub visiting: VisitationSet,
    /// Finalized results.
    pub memo: MemoCache,
    /// Run counters.
    pub stats: ResolutionStats,
}

impl ResolutionState {
    /// Create empty state.
    pub fn new() -> Self {
        Self::default()
    }
}
