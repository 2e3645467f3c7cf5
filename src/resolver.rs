//! Rarity resolver module.
//!
//! Provides `RarityResolver`, the main entry point. It walks every item a
//! catalog lists exactly once, merges natural and crafted rarity with the
//! configured policy, and returns the finished mapping.
//!
//! Every run gets a fresh `ResolutionState`, so nothing carries over
//! between runs and one resolver can serve many catalogs.

use crate::adjust::AdjustmentPipeline;
use crate::breakdown::{RarityBreakdown, RarityMap, RarityReport};
use crate::catalog::CatalogSource;
use crate::config::ResolverConfig;
use crate::error::{RarityError, Result};
use crate::graph::RecipeGraph;
use crate::item_id::ItemId;
use crate::merge::MergePolicy;
use crate::sink::ResultSink;
use crate::state::{ResolutionState, ResolutionStats};
use crate::walker::RecipeGraphWalker;
use std::collections::BTreeMap;
use tracing::{debug, debug_span, info};

/// Resolves a rarity score for every item in a catalog.
///
/// The merge policy is a type parameter; configuration-driven resolvers
/// use the boxed default. The policy also owns the unknown default, so an
/// item with no usable signal scores the same however it got there.
///
/// # Examples
///
/// ```rust
/// use rarecraft::adjust::AdjustmentPipeline;
/// use rarecraft::catalog::{InMemoryCatalog, Ingredient, Recipe};
/// use rarecraft::merge::MinMerge;
/// use rarecraft::{ItemId, RarityResolver};
///
/// let mut catalog = InMemoryCatalog::new();
/// catalog.item("A").natural(1.0);
/// catalog.item("B").recipe(Recipe::new(vec![Ingredient::new("A", 2)], 1));
/// catalog.item("C").recipe(Recipe::new(vec![Ingredient::new("B", 2)], 1));
///
/// let resolver = RarityResolver::new(AdjustmentPipeline::new(), MinMerge::default());
/// let scores = resolver.resolve_all(&catalog).unwrap();
///
/// assert_eq!(scores.get(&ItemId::from_str("B")).and_then(|s| s.get()), Some(1.0));
/// assert_eq!(scores.get(&ItemId::from_str("C")).and_then(|s| s.get()), Some(1.0));
/// ```
pub struct RarityResolver<M = Box<dyn MergePolicy>> {
    pipeline: AdjustmentPipeline,
    policy: M,
}

impl RarityResolver {
    /// Build a resolver from configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rarecraft::{RarityResolver, ResolverConfig};
    ///
    /// let resolver = RarityResolver::from_config(&ResolverConfig::default()).unwrap();
    /// assert_eq!(resolver.pipeline().len(), 2);
    /// ```
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: config.build_pipeline()?,
            policy: config.build_policy()?,
        })
    }
}

impl<M: MergePolicy> RarityResolver<M> {
    /// Create a resolver.
    pub fn new(pipeline: AdjustmentPipeline, policy: M) -> Self {
        Self { pipeline, policy }
    }

    /// The adjustment pipeline.
    pub fn pipeline(&self) -> &AdjustmentPipeline {
        &self.pipeline
    }

    /// The merge policy.
    pub fn policy(&self) -> &M {
        &self.policy
    }

    /// Resolve every item in `catalog`.
    ///
    /// Fails only if the catalog cannot list its items. Every listed item
    /// gets a score, falling back to the policy's unknown default.
    pub fn resolve_all<C: CatalogSource>(&self, catalog: &C) -> Result<RarityMap> {
        let (breakdowns, _) = self.run(catalog)?;
        Ok(Self::scores(&breakdowns))
    }

    /// Resolve every item and keep the per-item breakdowns, run counters and
    /// the recipe loops present in the catalog.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rarecraft::adjust::AdjustmentPipeline;
    /// use rarecraft::catalog::{InMemoryCatalog, Ingredient, Recipe};
    /// use rarecraft::merge::MinMerge;
    /// use rarecraft::{ItemId, RarityResolver};
    ///
    /// let mut catalog = InMemoryCatalog::new();
    /// catalog.item("A").recipe(Recipe::new(vec![Ingredient::new("B", 1)], 1));
    /// catalog.item("B").recipe(Recipe::new(vec![Ingredient::new("A", 1)], 1));
    ///
    /// let resolver = RarityResolver::new(AdjustmentPipeline::new(), MinMerge::default());
    /// let report = resolver.resolve_report(&catalog).unwrap();
    ///
    /// assert_eq!(report.cycles, vec![vec![ItemId::from_str("A"), ItemId::from_str("B")]]);
    /// assert_eq!(report.stats.items, 2);
    /// ```
    pub fn resolve_report<C: CatalogSource>(&self, catalog: &C) -> Result<RarityReport> {
        let (breakdowns, stats) = self.run(catalog)?;
        let cycles = RecipeGraph::from_catalog(catalog)?.cycles();
        for cycle in &cycles {
            debug!(items = ?cycle, "recipe loop");
        }
        Ok(RarityReport {
            scores: Self::scores(&breakdowns),
            breakdowns,
            cycles,
            stats,
        })
    }

    /// Resolve every item and hand the result to `sink`.
    pub fn resolve_into<C, S>(&self, catalog: &C, sink: &mut S) -> Result<RarityMap>
    where
        C: CatalogSource,
        S: ResultSink + ?Sized,
    {
        let scores = self.resolve_all(catalog)?;
        sink.write(&scores)?;
        Ok(scores)
    }

    /// Resolve a single item against a fresh state.
    ///
    /// The item does not have to be listed by the catalog.
    pub fn resolve_item<C: CatalogSource>(&self, catalog: &C, item: &ItemId) -> RarityBreakdown {
        let walker = self.walker(catalog);
        let mut state = ResolutionState::new();
        self.settle(&walker, item, &mut state)
    }

    fn walker<'a, C: CatalogSource>(&'a self, catalog: &'a C) -> RecipeGraphWalker<'a, C, M> {
        RecipeGraphWalker::new(catalog, &self.pipeline, &self.policy)
    }

    fn run<C: CatalogSource>(
        &self,
        catalog: &C,
    ) -> Result<(BTreeMap<ItemId, RarityBreakdown>, ResolutionStats)> {
        let span = debug_span!(
            "resolve_all",
            policy = %self.policy.description(),
            factors = self.pipeline.len()
        );
        let _enter = span.enter();

        let items = catalog.list_items().map_err(|err| match err {
            RarityError::CatalogUnavailable(_) => err,
            other => RarityError::CatalogUnavailable(other.to_string()),
        })?;

        let walker = self.walker(catalog);
        let mut state = ResolutionState::new();
        let mut breakdowns = BTreeMap::new();

        for item in items {
            if breakdowns.contains_key(&item) {
                continue;
            }
            let breakdown = self.settle(&walker, &item, &mut state);
            breakdowns.insert(item, breakdown);
        }

        state.stats.items = breakdowns.len();
        let stats = state.stats;
        info!(
            items = stats.items,
            memo_hits = stats.memo_hits,
            cycle_cuts = stats.cycle_cuts,
            "rarity resolution finished"
        );
        Ok((breakdowns, stats))
    }

    /// Final result for one top-level item, committed to the memo cache.
    fn settle<C: CatalogSource>(
        &self,
        walker: &RecipeGraphWalker<'_, C, M>,
        item: &ItemId,
        state: &mut ResolutionState,
    ) -> RarityBreakdown {
        if let Some(done) = state.memo.get(item) {
            return done.clone();
        }

        let natural = walker.natural_rarity(item);
        let crafted = walker.crafted(item, state);
        let breakdown = RarityBreakdown {
            item: item.clone(),
            natural,
            crafted: crafted.score,
            score: self.policy.merge(natural, crafted.score),
            recipe: crafted.recipe,
        };

        state.memo.commit(breakdown.clone());
        breakdown
    }

    fn scores(breakdowns: &BTreeMap<ItemId, RarityBreakdown>) -> RarityMap {
        breakdowns
            .iter()
            .map(|(item, breakdown)| (item.clone(), breakdown.score))
            .collect()
    }
}
