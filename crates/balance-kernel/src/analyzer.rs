//! Group analysis: balance statistics and the penalty the engine descends.
//!
//! Everything here is a pure function of a group and the configuration.
//! The penalty is a weighted sum where the size weight dominates both balance
//! weights, so any move that fixes size beats any move that only fixes
//! balance.

use serde::{Deserialize, Serialize};

use crate::config::BalanceConfig;
use crate::model::{Gender, Group, GradeTier, Roster};

/// Composition of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupStats {
    pub size: usize,
    pub female: usize,
    pub male: usize,
    pub unknown_gender: usize,
    pub lower_tier: usize,
    pub upper_tier: usize,
    pub other_tier: usize,
    /// |female - male|
    pub gender_diff: usize,
    /// |upper - lower|
    pub grade_diff: usize,
    /// Size, gender, and grade all within tolerance
    pub valid: bool,
}

impl GroupStats {
    pub fn size_ok(&self, config: &BalanceConfig) -> bool {
        (config.min_size..=config.max_size).contains(&self.size)
    }

    pub fn balanced(&self, config: &BalanceConfig) -> bool {
        self.gender_diff <= config.max_gender_diff && self.grade_diff <= config.max_grade_diff
    }
}

pub fn analyze(group: &Group, config: &BalanceConfig) -> GroupStats {
    let mut stats = GroupStats {
        size: group.len(),
        ..Default::default()
    };

    for student in &group.members {
        match student.gender {
            Gender::Female => stats.female += 1,
            Gender::Male => stats.male += 1,
            Gender::Unknown => stats.unknown_gender += 1,
        }
        match student.grade.tier(&config.tiers) {
            GradeTier::Lower => stats.lower_tier += 1,
            GradeTier::Upper => stats.upper_tier += 1,
            GradeTier::Other => stats.other_tier += 1,
        }
    }

    stats.gender_diff = stats.female.abs_diff(stats.male);
    stats.grade_diff = stats.upper_tier.abs_diff(stats.lower_tier);
    stats.valid = stats.size_ok(config) && stats.balanced(config);
    stats
}

/// Scalar badness of one group. Zero size terms inside the band.
pub fn penalty(group: &Group, config: &BalanceConfig) -> u64 {
    penalty_of(&analyze(group, config), config)
}

/// Saturates at `u64::MAX` for extreme weights.
pub fn penalty_of(stats: &GroupStats, config: &BalanceConfig) -> u64 {
    let deficit = config.min_size.saturating_sub(stats.size) as u64;
    let excess = stats.size.saturating_sub(config.max_size) as u64;
    let w = &config.weights;

    (deficit + excess)
        .saturating_mul(w.size)
        .saturating_add((stats.gender_diff as u64).saturating_mul(w.gender))
        .saturating_add((stats.grade_diff as u64).saturating_mul(w.grade))
}

pub fn total_penalty(roster: &Roster, config: &BalanceConfig) -> u64 {
    roster
        .groups
        .iter()
        .fold(0u64, |total, g| total.saturating_add(penalty(g, config)))
}
