//! Results collection for balancing trials.
//!
//! Captures per run:
//! - Whether the run validated or how it failed
//! - Penalty before and after
//! - Search effort (passes, swaps, size-repair transfers)
//! - History violations in the output (must always be zero)

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one balancing trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Difficulty preset name
    pub difficulty: String,
    pub trial: usize,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub groups: usize,
    pub students: usize,
    /// Run reached the Validated state
    pub success: bool,
    /// Error kind when the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub initial_penalty: u64,
    /// Penalty of the final (or best partial) roster
    pub final_penalty: u64,
    pub passes: usize,
    pub swaps: usize,
    pub transfers: usize,
    pub relocations: usize,
    /// Groups left outside the gender or grade tolerance
    pub unbalanced_groups: usize,
    pub history_violations: usize,
}

impl RunRecord {
    pub fn penalty_reduction(&self) -> f64 {
        self.initial_penalty as f64 - self.final_penalty as f64
    }
}

/// Aggregate results from a trial grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridResults {
    pub results: Vec<RunRecord>,
    /// Summary statistics by difficulty
    pub summary: HashMap<String, DifficultySummary>,
}

/// Summary statistics for one difficulty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultySummary {
    pub difficulty: String,
    pub trials: usize,
    pub success_rate: f64,
    /// Standard error of success rate: sqrt(p(1-p)/n)
    pub success_rate_se: f64,
    /// 95% confidence interval for success rate: (lower, upper)
    pub success_rate_ci: (f64, f64),
    pub avg_penalty_reduction: f64,
    pub avg_passes: f64,
    /// Standard error of avg_passes
    pub avg_passes_se: f64,
    pub min_passes: usize,
    pub max_passes: usize,
    pub avg_unbalanced_groups: f64,
    pub history_violations: usize,
}

impl GridResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: RunRecord) {
        self.results.push(record);
    }

    /// Compute summary statistics.
    pub fn compute_summary(&mut self) {
        let mut by_difficulty: HashMap<String, Vec<&RunRecord>> = HashMap::new();
        for record in &self.results {
            by_difficulty
                .entry(record.difficulty.clone())
                .or_default()
                .push(record);
        }

        self.summary.clear();
        for (difficulty, records) in by_difficulty {
            let trials = records.len();
            let n = trials as f64;
            let successes = records.iter().filter(|r| r.success).count();
            let success_rate = successes as f64 / n;

            let success_rate_se = if trials > 1 {
                (success_rate * (1.0 - success_rate) / n).sqrt()
            } else {
                0.0
            };

            // 95% CI: p ± 1.96 * SE, clamped to [0, 1]
            let z = 1.96;
            let success_rate_ci = (
                (success_rate - z * success_rate_se).max(0.0),
                (success_rate + z * success_rate_se).min(1.0),
            );

            let passes: Vec<f64> = records.iter().map(|r| r.passes as f64).collect();
            let avg_passes = passes.iter().sum::<f64>() / n;
            let avg_passes_se = if trials > 1 {
                let variance =
                    passes.iter().map(|p| (p - avg_passes).powi(2)).sum::<f64>() / (n - 1.0);
                variance.sqrt() / n.sqrt()
            } else {
                0.0
            };

            let summary = DifficultySummary {
                difficulty: difficulty.clone(),
                trials,
                success_rate,
                success_rate_se,
                success_rate_ci,
                avg_penalty_reduction: records.iter().map(|r| r.penalty_reduction()).sum::<f64>() / n,
                avg_passes,
                avg_passes_se,
                min_passes: records.iter().map(|r| r.passes).min().unwrap_or(0),
                max_passes: records.iter().map(|r| r.passes).max().unwrap_or(0),
                avg_unbalanced_groups: records.iter().map(|r| r.unbalanced_groups as f64).sum::<f64>()
                    / n,
                history_violations: records.iter().map(|r| r.history_violations).sum(),
            };
            self.summary.insert(difficulty, summary);
        }
    }

    /// Save results to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing results {}", path.display()))?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let results = serde_json::from_str(&json)?;
        Ok(results)
    }
}
