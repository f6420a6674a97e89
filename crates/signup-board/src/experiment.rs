//! Trial runner: balances generated rounds across seeds and difficulties.

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{debug, info};

use balance_kernel::analyzer::total_penalty;
use balance_kernel::{BalanceConfig, BalanceError, BalancingEngine, History, Roster};

use crate::generator::{CohortConfig, CohortGenerator};
use crate::results::{GridResults, RunRecord};

/// Configuration for a trial grid.
#[derive(Debug, Clone)]
pub struct TrialRunnerConfig {
    pub balance: BalanceConfig,
    /// Trials per difficulty
    pub trials: usize,
    pub difficulties: Vec<String>,
    /// Trial `t` uses seed `base_seed + t`
    pub base_seed: u64,
}

impl Default for TrialRunnerConfig {
    fn default() -> Self {
        Self {
            balance: BalanceConfig::default(),
            trials: 30,
            difficulties: vec!["easy".to_string(), "medium".to_string(), "hard".to_string()],
            base_seed: 0,
        }
    }
}

pub struct TrialRunner {
    config: TrialRunnerConfig,
}

impl TrialRunner {
    pub fn new(config: TrialRunnerConfig) -> Self {
        Self { config }
    }

    /// Generate one round and balance it.
    pub fn run_trial(&self, difficulty: &str, cohort: CohortConfig, trial: usize, seed: u64) -> RunRecord {
        let started_at = Utc::now();
        let snapshot = CohortGenerator::new(cohort, seed).generate(&format!("{difficulty}-{trial}"));
        let roster = snapshot.roster();
        let history = History::build(&snapshot.history);
        let initial_penalty = total_penalty(&roster, &self.config.balance);

        let mut record = RunRecord {
            difficulty: difficulty.to_string(),
            trial,
            seed,
            started_at,
            ended_at: started_at,
            groups: roster.groups.len(),
            students: roster.student_count(),
            success: false,
            error_kind: None,
            initial_penalty,
            final_penalty: initial_penalty,
            passes: 0,
            swaps: 0,
            transfers: 0,
            relocations: 0,
            unbalanced_groups: 0,
            history_violations: 0,
        };

        let mut engine = BalancingEngine::new(self.config.balance.clone(), seed);
        match engine.run(roster, &history) {
            Ok(report) => {
                record.success = true;
                record.final_penalty = report.final_penalty;
                record.passes = report.passes;
                record.swaps = report.swaps_committed;
                record.transfers = report.transfers.len();
                record.relocations = report.relocations.len();
                record.unbalanced_groups = report.unbalanced.len();
                record.history_violations = count_violations(&report.roster, &history);
            }
            Err(err) => {
                record.error_kind = Some(err.kind().to_string());
                if let BalanceError::OptimizationExhausted { partial, .. } = &err {
                    record.final_penalty = total_penalty(partial, &self.config.balance);
                    record.history_violations = count_violations(partial, &history);
                }
                debug!(difficulty, trial, seed, error = %err, "Trial failed");
            }
        }

        record.ended_at = Utc::now();
        record
    }

    /// Run every difficulty for the configured number of trials.
    pub fn run_grid(&self) -> Result<GridResults> {
        let mut presets = Vec::new();
        for name in &self.config.difficulties {
            let Some(cohort) = CohortConfig::by_name(name) else {
                bail!("unknown difficulty: {name}");
            };
            presets.push((name.trim().to_lowercase(), cohort));
        }

        let mut results = GridResults::new();
        for (name, cohort) in &presets {
            for trial in 0..self.config.trials {
                let seed = self.config.base_seed.wrapping_add(trial as u64);
                let record = self.run_trial(name, cohort.clone(), trial, seed);
                info!(
                    difficulty = %name,
                    trial,
                    success = record.success,
                    initial_penalty = record.initial_penalty,
                    final_penalty = record.final_penalty,
                    "Trial complete"
                );
                results.add(record);
            }
        }

        results.compute_summary();
        Ok(results)
    }
}

fn count_violations(roster: &Roster, history: &History) -> usize {
    roster
        .assignments()
        .filter(|(student, group)| history.occupied(student.key(), group))
        .count()
}
