//! Recipe graph walker.
//!
//! Resolves an item's crafted rarity by descending into its ingredients.
//! Each recipe's cost is the quantity-weighted mean of its adjusted
//! ingredient costs, divided by the units it produces; the cheapest recipe
//! wins.
//!
//! The descent runs on an explicit stack of frames, one per item on the
//! active chain, so chain length is bounded by memory rather than by the
//! native stack.
//!
//! Recipe loops are cut at the re-entry edge: an ingredient that is
//! already on the active chain contributes `UNRESOLVED` for that edge only.
//! Every settled frame carries the set of in-flight items it was cut
//! against. An ingredient settled with an empty cut set does not depend on
//! the chain that reached it, so it is committed to the memo cache;
//! anything else is used for the current parent and then dropped.

use crate::adjust::AdjustmentPipeline;
use crate::breakdown::RarityBreakdown;
use crate::catalog::{CatalogSource, Ingredient, Recipe};
use crate::item_id::ItemId;
use crate::merge::MergePolicy;
use crate::score::RarityScore;
use crate::state::ResolutionState;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Crafted rarity of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftedRarity {
    /// Cost of the cheapest recipe, or `UNRESOLVED`.
    pub score: RarityScore,
    /// Index of that recipe in `recipes_for` order.
    pub recipe: Option<usize>,
}

/// The edge a frame was entered through: the ingredient's natural rarity
/// and its quantity weight in the parent recipe.
struct Edge {
    natural: RarityScore,
    weight: f64,
}

/// One item on the active chain.
struct Frame {
    item: ItemId,
    /// `None` for the top-level item.
    edge: Option<Edge>,
    recipes: Vec<Recipe>,
    recipe: usize,
    ingredient: usize,
    // Running sums for the current recipe.
    total: f64,
    weight: f64,
    complete: bool,
    best: RarityScore,
    best_recipe: Option<usize>,
    cut: BTreeSet<ItemId>,
}

impl Frame {
    fn open(item: ItemId, edge: Option<Edge>, recipes: Vec<Recipe>) -> Self {
        Self {
            item,
            edge,
            recipes,
            recipe: 0,
            ingredient: 0,
            total: 0.0,
            weight: 0.0,
            complete: true,
            best: RarityScore::UNRESOLVED,
            best_recipe: None,
            cut: BTreeSet::new(),
        }
    }

    /// The next ingredient to resolve, closing finished recipes on the way.
    /// `None` once every recipe has been costed.
    fn next_ingredient(&mut self) -> Option<Ingredient> {
        while let Some(recipe) = self.recipes.get(self.recipe) {
            if let Some(ingredient) = recipe.ingredients.get(self.ingredient) {
                return Some(ingredient.clone());
            }
            let cost = self.recipe_cost(recipe.output());
            if cost.is_resolved() && cost < self.best {
                self.best = cost;
                self.best_recipe = Some(self.recipe);
            }
            self.recipe += 1;
            self.ingredient = 0;
            self.total = 0.0;
            self.weight = 0.0;
            self.complete = true;
        }
        None
    }

    /// Fold the adjusted cost of the current ingredient into the recipe.
    fn accept(&mut self, cost: RarityScore, weight: f64) {
        match cost.get() {
            Some(cost) => {
                self.total += cost * weight;
                self.weight += weight;
            }
            None => self.complete = false,
        }
        self.ingredient += 1;
    }

    fn recipe_cost(&self, output: f64) -> RarityScore {
        if !self.complete || self.weight == 0.0 {
            trace!(item = %self.item, recipe = self.recipe, "recipe has no usable cost");
            return RarityScore::UNRESOLVED;
        }
        let mean = if self.total.is_finite() {
            self.total / self.weight
        } else {
            f64::MAX
        };
        RarityScore::from_odds(mean / output)
    }
}

/// Crafted-rarity resolver over a catalog.
///
/// The walker borrows everything it needs; all mutable state lives in the
/// `ResolutionState` passed to each call.
///
/// # Examples
///
/// ```rust
/// use rarecraft::adjust::AdjustmentPipeline;
/// use rarecraft::catalog::{InMemoryCatalog, Ingredient, Recipe};
/// use rarecraft::merge::MinMerge;
/// use rarecraft::state::ResolutionState;
/// use rarecraft::walker::RecipeGraphWalker;
/// use rarecraft::ItemId;
///
/// let mut catalog = InMemoryCatalog::new();
/// catalog.item("log").natural(4.0);
/// catalog.item("planks").recipe(Recipe::new(vec![Ingredient::new("log", 1)], 4));
///
/// let pipeline = AdjustmentPipeline::new();
/// let policy = MinMerge::default();
/// let walker = RecipeGraphWalker::new(&catalog, &pipeline, &policy);
///
/// let mut state = ResolutionState::new();
/// let planks = walker.crafted_rarity(&ItemId::from_str("planks"), &mut state);
/// assert_eq!(planks.get(), Some(1.0));
/// assert!(state.visiting.is_empty());
/// ```
pub struct RecipeGraphWalker<'a, C, M> {
    catalog: &'a C,
    pipeline: &'a AdjustmentPipeline,
    policy: &'a M,
}

impl<'a, C, M> RecipeGraphWalker<'a, C, M>
where
    C: CatalogSource,
    M: MergePolicy,
{
    /// Create a walker.
    pub fn new(catalog: &'a C, pipeline: &'a AdjustmentPipeline, policy: &'a M) -> Self {
        Self {
            catalog,
            pipeline,
            policy,
        }
    }

    /// Natural rarity of `item`, with a failed lookup folded into `UNRESOLVED`.
    pub fn natural_rarity(&self, item: &ItemId) -> RarityScore {
        match self.catalog.natural_rarity_of(item) {
            Ok(score) => score,
            Err(err) => {
                trace!(item = %item, error = %err, "no natural signal");
                RarityScore::UNRESOLVED
            }
        }
    }

    /// Crafted rarity of `item`.
    pub fn crafted_rarity(&self, item: &ItemId, state: &mut ResolutionState) -> RarityScore {
        self.crafted(item, state).score
    }

    /// Crafted rarity of `item` along with the recipe that produced it.
    ///
    /// A memoized item returns its cached result. An item already on the
    /// active chain returns `UNRESOLVED`. The visitation set is left as it
    /// was found.
    pub fn crafted(&self, item: &ItemId, state: &mut ResolutionState) -> CraftedRarity {
        if let Some(done) = state.memo.get(item) {
            return CraftedRarity {
                score: done.crafted,
                recipe: done.recipe,
            };
        }
        if !state.visiting.enter(item) {
            state.stats.cycle_cuts += 1;
            return CraftedRarity {
                score: RarityScore::UNRESOLVED,
                recipe: None,
            };
        }

        let mut settled = CraftedRarity {
            score: RarityScore::UNRESOLVED,
            recipe: None,
        };
        let mut stack = vec![Frame::open(item.clone(), None, self.recipes(item))];

        while let Some(mut frame) = stack.pop() {
            if let Some(ingredient) = frame.next_ingredient() {
                let weight = ingredient.weight();
                let ingredient = ingredient.item;
                if state.visiting.contains(&ingredient) {
                    state.stats.cycle_cuts += 1;
                    frame.accept(RarityScore::UNRESOLVED, weight);
                    frame.cut.insert(ingredient);
                    stack.push(frame);
                } else if let Some(score) = state.memo.score(&ingredient) {
                    state.stats.memo_hits += 1;
                    frame.accept(self.adjust(score, &ingredient), weight);
                    stack.push(frame);
                } else {
                    state.visiting.enter(&ingredient);
                    let edge = Edge {
                        natural: self.natural_rarity(&ingredient),
                        weight,
                    };
                    let recipes = self.recipes(&ingredient);
                    stack.push(frame);
                    stack.push(Frame::open(ingredient, Some(edge), recipes));
                }
                continue;
            }

            state.visiting.leave(&frame.item);
            frame.cut.remove(&frame.item);

            let (Some(edge), Some(parent)) = (frame.edge, stack.last_mut()) else {
                settled = CraftedRarity {
                    score: frame.best,
                    recipe: frame.best_recipe,
                };
                continue;
            };

            let score = self.policy.merge(edge.natural, frame.best);
            if frame.cut.is_empty() {
                let mut done =
                    RarityBreakdown::new(frame.item.clone(), edge.natural, frame.best, score);
                done.recipe = frame.best_recipe;
                state.memo.commit(done);
            }
            parent.accept(self.adjust(score, &frame.item), edge.weight);
            parent.cut.extend(frame.cut);
        }
        settled
    }

    fn recipes(&self, item: &ItemId) -> Vec<Recipe> {
        match self.catalog.recipes_for(item) {
            Ok(recipes) => recipes,
            Err(err) => {
                debug!(item = %item, error = %err, "recipe lookup failed, treating as uncraftable");
                Vec::new()
            }
        }
    }

    fn adjust(&self, score: RarityScore, ingredient: &ItemId) -> RarityScore {
        self.pipeline.adjust(score, ingredient, self.catalog)
    }
}
