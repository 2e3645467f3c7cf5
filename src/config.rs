//! Resolver configuration.
//!
//! A `ResolverConfig` is plain data, usually read from JSON. It compiles
//! into the adjustment pipeline and merge policy a `RarityResolver` runs
//! with. Every field has a default, so `{}` is a valid configuration.

use crate::adjust::{AdjustmentPipeline, AvailabilitySignal, FactorSpec, ProcessingScale};
use crate::error::{RarityError, Result};
use crate::merge::{MergePolicy, MergeRule, DEFAULT_UNKNOWN_RARITY};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declarative resolver settings.
///
/// # Examples
///
/// ```rust
/// use rarecraft::merge::MergeRule;
/// use rarecraft::ResolverConfig;
///
/// let config = ResolverConfig::from_json_str(r#"{
///     "merge": { "rule": "average" },
///     "factors": [{ "kind": "flat", "multiplier": 1.5 }],
///     "unknown_default": 4.0
/// }"#).unwrap();
///
/// assert_eq!(config.merge, MergeRule::Average);
/// assert_eq!(config.factors.len(), 1);
/// assert_eq!(config.unknown_default, 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How natural and crafted rarity combine.
    pub merge: MergeRule,
    /// Ingredient adjustment factors, applied in order.
    pub factors: Vec<FactorSpec>,
    /// Score for items with no usable signal. Handed to the merge policy,
    /// which is the only place it is applied.
    pub unknown_default: f64,
}

impl Default for ResolverConfig {
    /// Min merge, spawn odds and one unit of cost per minute of processing.
    fn default() -> Self {
        Self {
            merge: MergeRule::Min,
            factors: vec![
                FactorSpec::AvailabilityOdds {
                    signal: AvailabilitySignal::Spawn,
                },
                FactorSpec::ProcessingTime {
                    scale: ProcessingScale::PerInterval { seconds: 60.0 },
                },
            ],
            unknown_default: DEFAULT_UNKNOWN_RARITY,
        }
    }
}

impl ResolverConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that every setting can be compiled.
    pub fn validate(&self) -> Result<()> {
        if !(self.unknown_default.is_finite() && self.unknown_default > 0.0) {
            return Err(RarityError::InvalidConfig(format!(
                "unknown_default must be positive and finite, got {}",
                self.unknown_default
            )));
        }
        self.build_pipeline()?;
        self.build_policy()?;
        Ok(())
    }

    /// Compile the factor list.
    pub fn build_pipeline(&self) -> Result<AdjustmentPipeline> {
        AdjustmentPipeline::from_specs(&self.factors)
    }

    /// Compile the merge rule.
    pub fn build_policy(&self) -> Result<Box<dyn MergePolicy>> {
        self.merge.compile(self.unknown_default)
    }
}
