//! Catalog module.
//!
//! The catalog is the external registry the engine queries: which items
//! exist, how each one is crafted, and the raw acquisition signals used by
//! natural rarity and adjustment factors. The engine never discovers or
//! validates the catalog; it only asks questions through `CatalogSource`.
//!
//! `InMemoryCatalog` is a ready-made source backed by a JSON snapshot.

use crate::error::{RarityError, Result};
use crate::item_id::ItemId;
use crate::score::RarityScore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

fn one() -> u32 {
    1
}

fn one_f64() -> f64 {
    1.0
}

/// One ingredient line of a recipe.
///
/// Quantity `0` is read as "ingredient present", same as `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// The ingredient item.
    pub item: ItemId,
    /// Units consumed per craft.
    #[serde(default = "one")]
    pub quantity: u32,
}

impl Ingredient {
    /// Create an ingredient line.
    pub fn new(item: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }

    /// Weight of this line when averaging ingredient costs.
    pub fn weight(&self) -> f64 {
        f64::from(self.quantity.max(1))
    }
}

/// A rule producing `output_count` units of one item from ingredients.
///
/// # Examples
///
/// ```rust
/// use rarecraft::catalog::{Ingredient, Recipe};
///
/// // 4 planks from 1 log
/// let planks = Recipe::new(vec![Ingredient::new("log", 1)], 4);
/// assert_eq!(planks.output(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Ingredient lines, in declaration order.
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Units produced per craft.
    #[serde(default = "one")]
    pub output_count: u32,
}

impl Recipe {
    /// Create a recipe.
    pub fn new(ingredients: Vec<Ingredient>, output_count: u32) -> Self {
        Self {
            ingredients,
            output_count,
        }
    }

    /// Units produced per craft, never below one.
    pub fn output(&self) -> f64 {
        f64::from(self.output_count.max(1))
    }
}

/// Smelting or other processing an item needs before it can be used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Processing {
    /// Processing time in seconds.
    pub seconds: f64,
    /// Fuel efficiency modifier; `1.0` is a standard fuel.
    #[serde(default = "one_f64")]
    pub fuel_modifier: f64,
}

/// Read-only view of the item registry and its acquisition signals.
///
/// Signal methods return `Result` so a missing value is explicit; callers
/// fold `Err` into a neutral value. The default implementations report
/// every signal as missing and every item as needing no processing.
pub trait CatalogSource {
    /// Every item id, in a stable order.
    ///
    /// Failure here aborts the whole run.
    fn list_items(&self) -> Result<Vec<ItemId>>;

    /// Recipes producing `item`; empty when it cannot be crafted.
    fn recipes_for(&self, item: &ItemId) -> Result<Vec<Recipe>>;

    /// Natural acquisition odds (mining, world generation, loot).
    fn natural_rarity_of(&self, item: &ItemId) -> Result<RarityScore>;

    /// Probability of finding `item` in the world, in `(0, 1]`.
    fn spawn_probability(&self, item: &ItemId) -> Result<f64> {
        Err(RarityError::MissingData {
            item: item.clone(),
            signal: "spawn probability",
        })
    }

    /// Probability of `item` dropping from loot, in `(0, 1]`.
    fn drop_chance(&self, item: &ItemId) -> Result<f64> {
        Err(RarityError::MissingData {
            item: item.clone(),
            signal: "drop chance",
        })
    }

    /// Processing requirements; `None` when the item is used as-is.
    fn processing(&self, _item: &ItemId) -> Result<Option<Processing>> {
        Ok(None)
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn list_items(&self) -> Result<Vec<ItemId>> {
        (**self).list_items()
    }

    fn recipes_for(&self, item: &ItemId) -> Result<Vec<Recipe>> {
        (**self).recipes_for(item)
    }

    fn natural_rarity_of(&self, item: &ItemId) -> Result<RarityScore> {
        (**self).natural_rarity_of(item)
    }

    fn spawn_probability(&self, item: &ItemId) -> Result<f64> {
        (**self).spawn_probability(item)
    }

    fn drop_chance(&self, item: &ItemId) -> Result<f64> {
        (**self).drop_chance(item)
    }

    fn processing(&self, item: &ItemId) -> Result<Option<Processing>> {
        (**self).processing(item)
    }
}

/// Catalog entry for one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemEntry {
    id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    natural: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spawn_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    drop_chance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processing: Option<Processing>,
    #[serde(default)]
    recipes: Vec<Recipe>,
}

impl ItemEntry {
    /// Set explicit natural odds.
    pub fn natural(&mut self, odds: f64) -> &mut Self {
        self.natural = Some(odds);
        self
    }

    /// Add a recipe.
    pub fn recipe(&mut self, recipe: Recipe) -> &mut Self {
        self.recipes.push(recipe);
        self
    }

    /// Set the world spawn probability.
    pub fn spawn_probability(&mut self, probability: f64) -> &mut Self {
        self.spawn_probability = Some(probability);
        self
    }

    /// Set the loot drop chance.
    pub fn drop_chance(&mut self, probability: f64) -> &mut Self {
        self.drop_chance = Some(probability);
        self
    }

    /// Mark the item as needing processing.
    pub fn processing(&mut self, seconds: f64, fuel_modifier: f64) -> &mut Self {
        self.processing = Some(Processing {
            seconds,
            fuel_modifier,
        });
        self
    }

    /// Natural odds: the explicit value if present, otherwise the cheaper
    /// of the spawn and drop odds.
    fn natural_score(&self) -> RarityScore {
        if let Some(odds) = self.natural {
            return RarityScore::from_odds(odds);
        }
        let spawn = self
            .spawn_probability
            .map_or(RarityScore::UNRESOLVED, RarityScore::from_probability);
        let drop = self
            .drop_chance
            .map_or(RarityScore::UNRESOLVED, RarityScore::from_probability);
        spawn.min(drop)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogSnapshot {
    #[serde(default)]
    items: Vec<ItemEntry>,
}

/// A catalog held in memory.
///
/// Items enumerate in the order they were first declared.
///
/// # Examples
///
/// ```rust
/// use rarecraft::catalog::{CatalogSource, InMemoryCatalog, Ingredient, Recipe};
///
/// let mut catalog = InMemoryCatalog::new();
/// catalog.item("log").natural(1.0);
/// catalog
///     .item("planks")
///     .recipe(Recipe::new(vec![Ingredient::new("log", 1)], 4));
///
/// let ids = catalog.list_items().unwrap();
/// assert_eq!(ids.len(), 2);
/// assert_eq!(ids[0].as_str(), "log");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    order: Vec<ItemId>,
    entries: HashMap<ItemId, ItemEntry>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `id`, declaring it if needed.
    pub fn item(&mut self, id: impl Into<ItemId>) -> &mut ItemEntry {
        let id = id.into();
        if !self.entries.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.entries.entry(id.clone()).or_insert_with(|| ItemEntry {
            id: Some(id),
            ..ItemEntry::default()
        })
    }

    /// Number of declared items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog has no items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Parse a JSON snapshot of the form `{"items": [{"id": ..., ...}]}`.
    ///
    /// Repeated ids merge into one entry: later recipes are appended and
    /// later signals win.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rarecraft::catalog::{CatalogSource, InMemoryCatalog};
    /// use rarecraft::ItemId;
    ///
    /// let json = r#"{
    ///     "items": [
    ///         { "id": "ore", "spawn_probability": 0.25 },
    ///         { "id": "ingot", "recipes": [
    ///             { "ingredients": [{ "item": "ore" }], "output_count": 1 }
    ///         ] }
    ///     ]
    /// }"#;
    /// let catalog = InMemoryCatalog::from_json_str(json).unwrap();
    /// let ore = catalog.natural_rarity_of(&ItemId::from_str("ore")).unwrap();
    /// assert_eq!(ore.get(), Some(4.0));
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for entry in snapshot.items {
            let id = entry.id.clone().ok_or_else(|| {
                RarityError::InvalidConfig("catalog entry without an id".to_string())
            })?;
            let slot = catalog.item(id);
            slot.natural = entry.natural.or(slot.natural);
            slot.spawn_probability = entry.spawn_probability.or(slot.spawn_probability);
            slot.drop_chance = entry.drop_chance.or(slot.drop_chance);
            slot.processing = entry.processing.or(slot.processing);
            slot.recipes.extend(entry.recipes);
        }
        Ok(catalog)
    }

    /// Read a JSON snapshot from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize the catalog back into snapshot form.
    pub fn to_json_string(&self) -> Result<String> {
        let snapshot = CatalogSnapshot {
            items: self
                .order
                .iter()
                .filter_map(|id| self.entries.get(id).cloned())
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    fn entry(&self, item: &ItemId) -> Option<&ItemEntry> {
        self.entries.get(item)
    }

    fn missing(item: &ItemId, signal: &'static str) -> RarityError {
        RarityError::MissingData {
            item: item.clone(),
            signal,
        }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn list_items(&self) -> Result<Vec<ItemId>> {
        Ok(self.order.clone())
    }

    fn recipes_for(&self, item: &ItemId) -> Result<Vec<Recipe>> {
        Ok(self
            .entry(item)
            .map(|e| e.recipes.clone())
            .unwrap_or_default())
    }

    fn natural_rarity_of(&self, item: &ItemId) -> Result<RarityScore> {
        let score = self
            .entry(item)
            .map_or(RarityScore::UNRESOLVED, ItemEntry::natural_score);
        if score.is_resolved() {
            Ok(score)
        } else {
            Err(Self::missing(item, "natural rarity"))
        }
    }

    fn spawn_probability(&self, item: &ItemId) -> Result<f64> {
        self.entry(item)
            .and_then(|e| e.spawn_probability)
            .ok_or_else(|| Self::missing(item, "spawn probability"))
    }

    fn drop_chance(&self, item: &ItemId) -> Result<f64> {
        self.entry(item)
            .and_then(|e| e.drop_chance)
            .ok_or_else(|| Self::missing(item, "drop chance"))
    }

    fn processing(&self, item: &ItemId) -> Result<Option<Processing>> {
        Ok(self.entry(item).and_then(|e| e.processing))
    }
}
