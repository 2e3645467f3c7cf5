//! Adjustment pipeline module.
//!
//! Before an ingredient's rarity is averaged into a recipe, situational
//! factors scale it: how hard the ingredient is to find, how long it takes
//! to process. Each factor produces a multiplier; the pipeline applies them
//! in registration order.
//!
//! Factors read external signals, which may be missing. A factor that
//! fails, or returns a multiplier that is not finite and positive, counts
//! as the neutral multiplier `1.0`.

use crate::catalog::CatalogSource;
use crate::error::{RarityError, Result};
use crate::item_id::ItemId;
use crate::score::RarityScore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A named multiplicative cost factor for ingredients.
///
/// # Examples
///
/// ```rust
/// use rarecraft::adjust::{AdjustmentFactor, FlatFactor};
/// use rarecraft::catalog::InMemoryCatalog;
/// use rarecraft::ItemId;
///
/// let factor = FlatFactor::new(1.5);
/// let catalog = InMemoryCatalog::new();
/// let m = factor.multiplier(&ItemId::from_str("stick"), &catalog).unwrap();
/// assert_eq!(m, 1.5);
/// ```
pub trait AdjustmentFactor: Send + Sync {
    /// Short name used in logs and breakdowns.
    fn name(&self) -> String;

    /// Multiplier for `ingredient`. `Err` means the signal was unavailable.
    fn multiplier(&self, ingredient: &ItemId, signals: &dyn CatalogSource) -> Result<f64>;
}

/// Which availability signal a factor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySignal {
    /// World spawn probability.
    Spawn,
    /// Loot table drop chance.
    LootDrop,
}

/// Scales cost by the odds of finding the ingredient (`1 / p`).
#[derive(Debug, Clone)]
pub struct AvailabilityOddsFactor {
    signal: AvailabilitySignal,
}

impl AvailabilityOddsFactor {
    /// Create a factor reading `signal`.
    pub fn new(signal: AvailabilitySignal) -> Self {
        Self { signal }
    }
}

impl AdjustmentFactor for AvailabilityOddsFactor {
    fn name(&self) -> String {
        match self.signal {
            AvailabilitySignal::Spawn => "spawn odds".to_string(),
            AvailabilitySignal::LootDrop => "drop odds".to_string(),
        }
    }

    fn multiplier(&self, ingredient: &ItemId, signals: &dyn CatalogSource) -> Result<f64> {
        let (probability, signal) = match self.signal {
            AvailabilitySignal::Spawn => {
                (signals.spawn_probability(ingredient)?, "spawn probability")
            }
            AvailabilitySignal::LootDrop => (signals.drop_chance(ingredient)?, "drop chance"),
        };
        RarityScore::from_probability(probability)
            .get()
            .ok_or_else(|| RarityError::MissingData {
                item: ingredient.clone(),
                signal,
            })
    }
}

/// How processing time turns into a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingScale {
    /// `seconds × fuel_modifier` used directly as the multiplier.
    Linear,
    /// `1 + seconds × fuel_modifier / interval`: one extra unit of cost
    /// per `seconds` of processing.
    PerInterval {
        /// Length of one cost unit, in seconds.
        seconds: f64,
    },
}

/// Scales cost by smelting or processing time.
///
/// Items that need no processing get `1.0`.
#[derive(Debug, Clone)]
pub struct ProcessingTimeFactor {
    scale: ProcessingScale,
}

impl ProcessingTimeFactor {
    /// Create a factor with the given scale.
    pub fn new(scale: ProcessingScale) -> Self {
        Self { scale }
    }

    /// One unit of cost per minute of processing.
    pub fn per_minute() -> Self {
        Self::new(ProcessingScale::PerInterval { seconds: 60.0 })
    }
}

impl AdjustmentFactor for ProcessingTimeFactor {
    fn name(&self) -> String {
        match self.scale {
            ProcessingScale::Linear => "processing time".to_string(),
            ProcessingScale::PerInterval { seconds } => format!("processing time /{seconds}s"),
        }
    }

    fn multiplier(&self, ingredient: &ItemId, signals: &dyn CatalogSource) -> Result<f64> {
        let Some(processing) = signals.processing(ingredient)? else {
            return Ok(1.0);
        };
        let cost = processing.seconds * processing.fuel_modifier;
        if !(cost.is_finite() && cost >= 0.0) {
            return Err(RarityError::MissingData {
                item: ingredient.clone(),
                signal: "processing time",
            });
        }
        Ok(match self.scale {
            ProcessingScale::Linear => cost,
            ProcessingScale::PerInterval { seconds } => 1.0 + cost / seconds,
        })
    }
}

/// A constant multiplier applied to every ingredient.
#[derive(Debug, Clone)]
pub struct FlatFactor {
    multiplier: f64,
}

impl FlatFactor {
    /// Create a flat factor.
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }
}

impl AdjustmentFactor for FlatFactor {
    fn name(&self) -> String {
        format!("×{:.2}", self.multiplier)
    }

    fn multiplier(&self, _ingredient: &ItemId, _signals: &dyn CatalogSource) -> Result<f64> {
        Ok(self.multiplier)
    }
}

/// A factor backed by a closure.
///
/// # Examples
///
/// ```rust
/// use rarecraft::adjust::{AdjustmentPipeline, FnFactor};
/// use rarecraft::catalog::InMemoryCatalog;
/// use rarecraft::{CatalogSource, ItemId, RarityScore};
///
/// let nether_tax = FnFactor::new("nether", |item: &ItemId, _signals: &dyn CatalogSource| {
///     Ok(if item.as_str().starts_with("nether") { 3.0 } else { 1.0 })
/// });
/// let pipeline = AdjustmentPipeline::new().with_factor(Box::new(nether_tax));
/// let catalog = InMemoryCatalog::new();
///
/// let rack = ItemId::from_str("netherrack");
/// let cost = pipeline.adjust(RarityScore::from_odds(2.0), &rack, &catalog);
/// assert_eq!(cost.get(), Some(6.0));
/// ```
pub struct FnFactor<F> {
    name: String,
    f: F,
}

impl<F> FnFactor<F>
where
    F: Fn(&ItemId, &dyn CatalogSource) -> Result<f64> + Send + Sync,
{
    /// Wrap a closure as a named factor.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> AdjustmentFactor for FnFactor<F>
where
    F: Fn(&ItemId, &dyn CatalogSource) -> Result<f64> + Send + Sync,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn multiplier(&self, ingredient: &ItemId, signals: &dyn CatalogSource) -> Result<f64> {
        (self.f)(ingredient, signals)
    }
}

/// Declarative form of a factor, as it appears in configuration.
///
/// # Examples
///
/// ```rust
/// use rarecraft::adjust::FactorSpec;
///
/// let spec: FactorSpec = serde_json::from_str(
///     r#"{"kind": "processing_time", "scale": {"per_interval": {"seconds": 60.0}}}"#,
/// ).unwrap();
/// let factor = spec.compile().unwrap();
/// assert_eq!(factor.name(), "processing time /60s");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactorSpec {
    /// `AvailabilityOddsFactor`.
    AvailabilityOdds {
        /// Signal to read.
        signal: AvailabilitySignal,
    },
    /// `ProcessingTimeFactor`.
    ProcessingTime {
        /// Scaling mode.
        scale: ProcessingScale,
    },
    /// `FlatFactor`.
    Flat {
        /// Constant multiplier.
        multiplier: f64,
    },
}

impl FactorSpec {
    /// Build the factor, rejecting parameters that could never produce a
    /// usable multiplier.
    pub fn compile(&self) -> Result<Box<dyn AdjustmentFactor>> {
        match *self {
            FactorSpec::AvailabilityOdds { signal } => {
                Ok(Box::new(AvailabilityOddsFactor::new(signal)))
            }
            FactorSpec::ProcessingTime { scale } => {
                if let ProcessingScale::PerInterval { seconds } = scale {
                    if !(seconds.is_finite() && seconds > 0.0) {
                        return Err(RarityError::InvalidConfig(format!(
                            "processing interval must be positive, got {seconds}"
                        )));
                    }
                }
                Ok(Box::new(ProcessingTimeFactor::new(scale)))
            }
            FactorSpec::Flat { multiplier } => {
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(RarityError::InvalidConfig(format!(
                        "flat multiplier must be positive, got {multiplier}"
                    )));
                }
                Ok(Box::new(FlatFactor::new(multiplier)))
            }
        }
    }
}

/// Ordered list of adjustment factors.
///
/// # Examples
///
/// ```rust
/// use rarecraft::adjust::{AdjustmentPipeline, ProcessingTimeFactor};
/// use rarecraft::catalog::InMemoryCatalog;
/// use rarecraft::{ItemId, RarityScore};
///
/// let mut catalog = InMemoryCatalog::new();
/// catalog.item("iron_ingot").processing(10.0, 1.0);
///
/// let pipeline = AdjustmentPipeline::new()
///     .with_factor(Box::new(ProcessingTimeFactor::per_minute()));
///
/// // 10 s of smelting adds 1/6 of a cost unit.
/// let ingot = ItemId::from_str("iron_ingot");
/// let cost = pipeline.adjust(RarityScore::from_odds(6.0), &ingot, &catalog);
/// assert!((cost.value() - 7.0).abs() < 1e-9);
/// ```
#[derive(Default)]
pub struct AdjustmentPipeline {
    factors: Vec<Box<dyn AdjustmentFactor>>,
}

impl AdjustmentPipeline {
    /// Create an empty pipeline (every ingredient passes through unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from factor specs.
    pub fn from_specs(specs: &[FactorSpec]) -> Result<Self> {
        let factors = specs
            .iter()
            .map(FactorSpec::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { factors })
    }

    /// Append a factor.
    pub fn with_factor(mut self, factor: Box<dyn AdjustmentFactor>) -> Self {
        self.factors.push(factor);
        self
    }

    /// Append a factor in place.
    pub fn push(&mut self, factor: Box<dyn AdjustmentFactor>) {
        self.factors.push(factor);
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the pipeline has no factors.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Factor names, in application order.
    pub fn names(&self) -> Vec<String> {
        self.factors.iter().map(|f| f.name()).collect()
    }

    /// Effective cost of `ingredient` given its raw rarity.
    pub fn adjust(
        &self,
        raw: RarityScore,
        ingredient: &ItemId,
        signals: &dyn CatalogSource,
    ) -> RarityScore {
        if !raw.is_resolved() {
            return raw;
        }
        self.factors.iter().fold(raw, |score, factor| {
            score.scale(Self::checked_multiplier(&**factor, ingredient, signals))
        })
    }

    fn checked_multiplier(
        factor: &dyn AdjustmentFactor,
        ingredient: &ItemId,
        signals: &dyn CatalogSource,
    ) -> f64 {
        match factor.multiplier(ingredient, signals) {
            Ok(m) if m.is_finite() && m > 0.0 => m,
            Ok(m) => {
                debug!(
                    factor = %factor.name(),
                    item = %ingredient,
                    multiplier = m,
                    "unusable multiplier, using neutral"
                );
                1.0
            }
            Err(err) => {
                debug!(
                    factor = %factor.name(),
                    item = %ingredient,
                    error = %err,
                    "signal unavailable, using neutral"
                );
                1.0
            }
        }
    }
}

impl std::fmt::Debug for AdjustmentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjustmentPipeline")
            .field("factors", &self.names())
            .finish()
    }
}
