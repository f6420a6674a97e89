//! Configuration types for the balancing engine.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Top-level balancing configuration.
///
/// Defines the size band, balance tolerances, search budget, and penalty
/// weights. Loaded from TOML/JSON at runtime; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Smallest acceptable group
    pub min_size: usize,

    /// Largest acceptable group; also the placement capacity
    pub max_size: usize,

    /// Largest acceptable |female - male| per group
    pub max_gender_diff: usize,

    /// Largest acceptable |upper tier - lower tier| per group
    pub max_grade_diff: usize,

    /// Ceiling on optimization passes
    pub max_passes: usize,

    /// Penalty weights
    pub weights: PenaltyWeights,

    /// Which grade years count as the lower and upper tier
    pub tiers: TierConfig,

    /// Display rank per grade label (e.g. "2A" -> 1)
    pub grade_order: BTreeMap<String, u32>,
}

/// Penalty weights. Size must dominate balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Per student outside the size band
    pub size: u64,
    /// Per unit of gender difference
    pub gender: u64,
    /// Per unit of grade difference
    pub grade: u64,
}

/// Grade years that form the two balanced tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub lower: u32,
    pub upper: u32,
}

/// Smallest accepted ratio between the size weight and each balance weight.
pub const SIZE_DOMINANCE_RATIO: u64 = 10;

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            min_size: 15,
            max_size: 16,
            max_gender_diff: 2,
            max_grade_diff: 2,
            max_passes: 20,
            weights: PenaltyWeights::default(),
            tiers: TierConfig::default(),
            grade_order: [("2A", 1), ("2B", 2), ("3A", 3), ("3B", 4)]
                .into_iter()
                .map(|(label, rank)| (label.to_string(), rank))
                .collect(),
        }
    }
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            size: 1000,
            gender: 50,
            grade: 50,
        }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self { lower: 2, upper: 3 }
    }
}

impl BalanceConfig {
    /// Load from a `.toml` file, or JSON for any other extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&raw)
                .with_context(|| format!("parsing TOML config {}", path.display()))?,
            _ => serde_json::from_str(&raw)
                .with_context(|| format!("parsing JSON config {}", path.display()))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, reason: String| ValidationError::InvalidConfig {
            field: field.to_string(),
            reason,
        };

        if self.max_size == 0 {
            return Err(invalid("max_size", "must be at least 1".to_string()));
        }
        if self.min_size > self.max_size {
            return Err(invalid(
                "min_size",
                format!("{} exceeds max_size {}", self.min_size, self.max_size),
            ));
        }
        if self.tiers.lower == self.tiers.upper {
            return Err(invalid(
                "tiers",
                format!("lower and upper are both {}", self.tiers.lower),
            ));
        }

        let balance_max = self.weights.gender.max(self.weights.grade);
        if self.weights.size < balance_max.saturating_mul(SIZE_DOMINANCE_RATIO) {
            return Err(invalid(
                "weights.size",
                format!(
                    "{} must be at least {}x the largest balance weight ({})",
                    self.weights.size, SIZE_DOMINANCE_RATIO, balance_max
                ),
            ));
        }

        Ok(())
    }
}
