//! # rarecraft - Recipe-Graph Rarity Propagation
//!
//! Assigns every item in a game catalog a rarity score that reflects both
//! how it can be found and how it can be crafted:
//! - **Natural** rarity comes straight from the catalog (spawn odds, loot drops)
//! - **Crafted** rarity is derived recursively from ingredient rarities
//! - A pluggable **merge policy** combines the two
//!
//! ## Scale
//!
//! Scores are costs, or odds: smaller means more accessible. A natural
//! probability `p` becomes `1 / p`. `RarityScore::UNRESOLVED` means "no
//! usable signal"; zero, negative and non-finite inputs all collapse to it.
//!
//! ## Pipeline
//!
//! ```text
//! [CatalogSource] → [RecipeGraphWalker + AdjustmentPipeline] → [MergePolicy]
//!                                                              ↓
//!                                        [ResultSink] ← [RarityMap]
//! ```
//!
//! 1. The resolver lists every catalog item once
//! 2. The walker descends into ingredients on an explicit stack,
//!    memoizing settled items and cutting recipe loops at the re-entry edge
//! 3. Each ingredient cost is scaled by the adjustment pipeline before it is
//!    averaged into its recipe
//! 4. Natural and crafted rarity merge into the final score
//!
//! ## Example
//!
//! ```rust
//! use rarecraft::adjust::AdjustmentPipeline;
//! use rarecraft::catalog::{InMemoryCatalog, Ingredient, Recipe};
//! use rarecraft::merge::MinMerge;
//! use rarecraft::{ItemId, RarityResolver};
//!
//! let mut catalog = InMemoryCatalog::new();
//! catalog.item("iron_ore").spawn_probability(0.125);
//! catalog
//!     .item("iron_block")
//!     .recipe(Recipe::new(vec![Ingredient::new("iron_ore", 9)], 1));
//!
//! let resolver = RarityResolver::new(AdjustmentPipeline::new(), MinMerge::default());
//! let scores = resolver.resolve_all(&catalog).unwrap();
//!
//! assert_eq!(scores.get(&ItemId::from_str("iron_ore")).and_then(|s| s.get()), Some(8.0));
//! assert_eq!(scores.get(&ItemId::from_str("iron_block")).and_then(|s| s.get()), Some(8.0));
//! ```
//!
//! ## Modules
//!
//! - [`item_id`] - Item identifier type
//! - [`score`] - Rarity score and the unresolved sentinel
//! - [`catalog`] - Catalog interface and in-memory catalog
//! - [`adjust`] - Ingredient adjustment factors
//! - [`merge`] - Natural/crafted merge policies
//! - [`walker`] - Crafted-rarity walker
//! - [`state`] - Per-run visitation set and memo cache
//! - [`resolver`] - Whole-catalog resolver
//! - [`breakdown`] - Results and reports
//! - [`graph`] - Recipe loop diagnostics
//! - [`config`] - Resolver configuration
//! - [`sink`] - Result consumers
//! - [`error`] - Error types

pub mod adjust;
pub mod breakdown;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod item_id;
pub mod merge;
pub mod resolver;
pub mod score;
pub mod sink;
pub mod state;
pub mod walker;

// Re-export main types for convenience
pub use adjust::{AdjustmentFactor, AdjustmentPipeline};
pub use breakdown::{RarityBreakdown, RarityMap, RarityReport};
pub use catalog::{CatalogSource, InMemoryCatalog, Ingredient, Recipe};
pub use config::ResolverConfig;
pub use error::{RarityError, Result};
pub use item_id::ItemId;
pub use merge::MergePolicy;
pub use resolver::RarityResolver;
pub use score::RarityScore;
pub use sink::ResultSink;
pub use walker::RecipeGraphWalker;
