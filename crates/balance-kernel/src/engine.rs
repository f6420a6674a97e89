//! The balancing engine: randomized pairwise swaps, then deterministic size
//! repair.
//!
//! A run moves through `Initialized -> Optimizing -> SizeRepair` and ends in
//! `Validated` or `Failed`. The history constraint is absolute: no step ever
//! moves a student into a group their history forbids, and the final check
//! fails the run if one is found anyway.
//!
//! ## Usage
//!
//! ```ignore
//! use balance_kernel::{BalanceConfig, BalancingEngine, History};
//!
//! let mut engine = BalancingEngine::new(BalanceConfig::default(), 42);
//! let report = engine.run(roster, &history)?;
//! assert!(report.unbalanced.is_empty());
//! ```

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::analyzer::{GroupStats, analyze, penalty, penalty_of, total_penalty};
use crate::config::BalanceConfig;
use crate::error::{BalanceError, BalanceResult, ValidationError};
use crate::history::History;
use crate::model::{Group, Roster, Student};
use crate::normalize::StudentKey;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Initialized,
    Optimizing,
    SizeRepair,
    Validated,
    Failed,
}

/// One student moved between groups outside of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub student: String,
    pub from: String,
    pub to: String,
}

/// Per-group outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: String,
    pub stats: GroupStats,
    pub penalty: u64,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Final assignment
    pub roster: Roster,
    pub seed: u64,
    pub initial_penalty: u64,
    pub final_penalty: u64,
    /// Optimization passes actually run
    pub passes: usize,
    pub swaps_committed: usize,
    /// Moves made before optimizing to clear history violations in the input
    pub relocations: Vec<Transfer>,
    /// Moves made by size repair
    pub transfers: Vec<Transfer>,
    pub states: Vec<EngineState>,
    pub groups: Vec<GroupSummary>,
    /// Groups whose gender or grade difference is still above tolerance
    pub unbalanced: Vec<String>,
}

/// Outcome of the size-repair sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeRepair {
    pub transfers: Vec<Transfer>,
    /// Group -> first student whose move the history blocked
    pub blocked: HashMap<String, String>,
}

/// Seeded balancing engine. One instance can serve many runs; the RNG
/// stream continues across them.
#[derive(Debug, Clone)]
pub struct BalancingEngine {
    config: BalanceConfig,
    seed: u64,
    rng: ChaCha8Rng,
    /// State trace of the most recent run
    states: Vec<EngineState>,
}

impl BalancingEngine {
    pub fn new(config: BalanceConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            states: Vec::new(),
        }
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// States visited by the most recent run, ending in `Validated` or
    /// `Failed` once the run returned.
    pub fn states(&self) -> &[EngineState] {
        &self.states
    }

    /// Balance `roster` against `history`.
    ///
    /// Size is a hard goal, balance is best effort, history is absolute.
    pub fn run(&mut self, mut roster: Roster, history: &History) -> BalanceResult<BalanceReport> {
        self.states = vec![EngineState::Initialized];
        if let Err(err) = self.config.validate().and_then(|()| check_duplicates(&roster)) {
            self.states.push(EngineState::Failed);
            return Err(err.into());
        }

        let initial_penalty = total_penalty(&roster, &self.config);
        info!(
            groups = roster.groups.len(),
            students = roster.student_count(),
            penalty = initial_penalty,
            seed = self.seed,
            "Balancing run initialized"
        );

        let relocations = relocate_violators(&mut roster, history, &self.config);

        self.states.push(EngineState::Optimizing);
        let (passes, swaps_committed) = self.optimize(&mut roster, history);

        self.states.push(EngineState::SizeRepair);
        let repair = repair_sizes(&mut roster, history, &self.config);

        if let Some((student, group)) = first_history_violation(&roster, history) {
            self.states.push(EngineState::Failed);
            warn!(student = %student, group = %group, states = ?self.states, "History violation after balancing");
            return Err(BalanceError::HistoryConflict { student, group });
        }

        if let Some(idx) = roster
            .groups
            .iter()
            .position(|g| !analyze(g, &self.config).size_ok(&self.config))
        {
            self.states.push(EngineState::Failed);
            let group = roster.groups[idx].name.clone();
            let size = roster.groups[idx].len();
            let student = repair.blocked.get(&group).cloned();
            warn!(
                group = %group,
                size,
                blocked = ?student,
                states = ?self.states,
                "Size repair could not reach the size band"
            );
            return Err(BalanceError::OptimizationExhausted {
                group,
                size,
                min: self.config.min_size,
                max: self.config.max_size,
                student,
                partial: Box::new(roster),
            });
        }

        self.states.push(EngineState::Validated);

        let groups: Vec<GroupSummary> = roster
            .groups
            .iter()
            .map(|g| {
                let stats = analyze(g, &self.config);
                GroupSummary {
                    group: g.name.clone(),
                    penalty: penalty_of(&stats, &self.config),
                    stats,
                }
            })
            .collect();
        let unbalanced = groups
            .iter()
            .filter(|s| !s.stats.balanced(&self.config))
            .map(|s| s.group.clone())
            .collect::<Vec<_>>();
        let final_penalty = groups
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.penalty));

        info!(
            initial_penalty,
            final_penalty,
            passes,
            swaps = swaps_committed,
            transfers = repair.transfers.len(),
            unbalanced = unbalanced.len(),
            "Balancing run validated"
        );

        Ok(BalanceReport {
            roster,
            seed: self.seed,
            initial_penalty,
            final_penalty,
            passes,
            swaps_committed,
            relocations,
            transfers: repair.transfers,
            states: self.states.clone(),
            groups,
            unbalanced,
        })
    }

    /// Random pairwise swaps. Returns (passes run, swaps committed).
    ///
    /// The roster always equals the best assignment seen so far: a swap is
    /// kept only when it strictly lowers the total penalty.
    fn optimize(&mut self, roster: &mut Roster, history: &History) -> (usize, usize) {
        let mut best = total_penalty(roster, &self.config);
        let mut passes = 0;
        let mut committed_total = 0;
        let n = roster.groups.len();

        for pass in 0..self.config.max_passes {
            passes = pass + 1;
            let mut committed = 0;

            for i in 0..n {
                for j in (i + 1)..n {
                    let (gi, gj) = (&roster.groups[i], &roster.groups[j]);
                    if gi.is_empty() || gj.is_empty() {
                        continue;
                    }
                    if analyze(gi, &self.config).valid && analyze(gj, &self.config).valid {
                        continue;
                    }

                    let si = self.rng.random_range(0..gi.len());
                    let sj = self.rng.random_range(0..gj.len());

                    // Hard constraint first, no penalty work for rejected pairs.
                    if history.occupied(gi.members[si].key(), &gj.name)
                        || history.occupied(gj.members[sj].key(), &gi.name)
                    {
                        trace!(pass, a = %gi.name, b = %gj.name, "Swap rejected by history");
                        continue;
                    }

                    let before = penalty(gi, &self.config).saturating_add(penalty(gj, &self.config));
                    swap_members(&mut roster.groups, (i, si), (j, sj));
                    let after = penalty(&roster.groups[i], &self.config)
                        .saturating_add(penalty(&roster.groups[j], &self.config));

                    // Only the two touched groups change, so comparing them
                    // decides the total without re-summing.
                    if after < before {
                        let candidate = best.saturating_sub(before).saturating_add(after);
                        debug!(
                            pass,
                            a = %roster.groups[i].name,
                            b = %roster.groups[j].name,
                            penalty = candidate,
                            "Swap committed"
                        );
                        best = candidate;
                        committed += 1;
                    } else {
                        swap_members(&mut roster.groups, (i, si), (j, sj));
                    }
                }
            }

            committed_total += committed;
            debug!(pass, committed, penalty = best, "Optimization pass finished");
            if committed == 0 {
                break;
            }
        }

        (passes, committed_total)
    }
}

/// Reject input where the same student sits in two groups (or twice in one).
pub fn check_duplicates(roster: &Roster) -> Result<(), ValidationError> {
    let mut seen: HashMap<StudentKey, &str> = HashMap::new();
    for (student, group) in roster.assignments() {
        if let Some(first_group) = seen.insert(student.key().clone(), group) {
            return Err(ValidationError::DuplicateStudent {
                student: student.name.clone(),
                first_group: first_group.to_string(),
                second_group: group.to_string(),
            });
        }
    }
    Ok(())
}

/// Move students out of groups their history forbids.
///
/// Groups and members are scanned in order. A violator goes to the first
/// legal group below `max_size`; failing that, it trades places with the
/// first student it can legally swap with. Anything left is caught by the
/// final history check.
pub fn relocate_violators(roster: &mut Roster, history: &History, config: &BalanceConfig) -> Vec<Transfer> {
    let mut moves = Vec::new();
    let n = roster.groups.len();

    for gi in 0..n {
        let mut si = 0;
        while si < roster.groups[gi].len() {
            let student = &roster.groups[gi].members[si];
            let key = student.key().clone();
            if !history.occupied(&key, &roster.groups[gi].name) {
                si += 1;
                continue;
            }

            let open = (0..n).find(|&gj| {
                gj != gi
                    && roster.groups[gj].len() < config.max_size
                    && !history.occupied(&key, &roster.groups[gj].name)
            });
            if let Some(gj) = open {
                let moved = roster.groups[gi].members.remove(si);
                moves.push(transfer(&moved, &roster.groups[gi], &roster.groups[gj]));
                debug!(student = %moved.name, from = %roster.groups[gi].name, to = %roster.groups[gj].name, "Relocated history violator");
                roster.groups[gj].members.push(moved);
                continue;
            }

            let partner = (0..n).filter(|&gj| gj != gi).find_map(|gj| {
                let target = &roster.groups[gj];
                if history.occupied(&key, &target.name) {
                    return None;
                }
                target
                    .members
                    .iter()
                    .position(|other| !history.occupied(other.key(), &roster.groups[gi].name))
                    .map(|sj| (gj, sj))
            });
            if let Some((gj, sj)) = partner {
                let a = roster.groups[gi].members[si].clone();
                let b = roster.groups[gj].members[sj].clone();
                moves.push(transfer(&a, &roster.groups[gi], &roster.groups[gj]));
                moves.push(transfer(&b, &roster.groups[gj], &roster.groups[gi]));
                debug!(student = %a.name, partner = %b.name, "Relocated history violator by swap");
                swap_members(&mut roster.groups, (gi, si), (gj, sj));
            } else {
                warn!(student = %student.name, group = %roster.groups[gi].name, "No legal relocation for history violator");
            }
            si += 1;
        }
    }

    moves
}

/// Deterministic size repair.
///
/// Groups below `min_size` pull the first eligible student from donors above
/// `min_size`, in group order. Groups above `max_size` push their first
/// eligible students to recipients below `max_size`, in group order. A
/// student is eligible when the receiving group is not in their history.
/// Sweeps repeat until nothing moves. Every move strictly shrinks the total
/// distance from the size band, so the loop terminates.
pub fn repair_sizes(roster: &mut Roster, history: &History, config: &BalanceConfig) -> SizeRepair {
    let mut repair = SizeRepair::default();
    let n = roster.groups.len();

    loop {
        let mut moved = false;

        for gi in 0..n {
            while roster.groups[gi].len() < config.min_size {
                let Some((donor, si)) = find_donor(roster, history, config, gi, &mut repair.blocked) else {
                    break;
                };
                let student = roster.groups[donor].members.remove(si);
                record_move(&mut repair, &student, &roster.groups[donor], &roster.groups[gi]);
                roster.groups[gi].members.push(student);
                moved = true;
            }

            while roster.groups[gi].len() > config.max_size {
                let Some((recipient, si)) = find_recipient(roster, history, config, gi, &mut repair.blocked)
                else {
                    break;
                };
                let student = roster.groups[gi].members.remove(si);
                record_move(&mut repair, &student, &roster.groups[gi], &roster.groups[recipient]);
                roster.groups[recipient].members.push(student);
                moved = true;
            }
        }

        if !moved {
            break;
        }
    }

    repair
}

fn find_donor(
    roster: &Roster,
    history: &History,
    config: &BalanceConfig,
    target: usize,
    blocked: &mut HashMap<String, String>,
) -> Option<(usize, usize)> {
    let target_name = &roster.groups[target].name;
    for (gj, donor) in roster.groups.iter().enumerate() {
        if gj == target || donor.len() <= config.min_size {
            continue;
        }
        match donor.members.iter().position(|s| !history.occupied(s.key(), target_name)) {
            Some(si) => return Some((gj, si)),
            None => {
                if let Some(first) = donor.members.first() {
                    blocked.entry(target_name.clone()).or_insert_with(|| first.name.clone());
                }
            }
        }
    }
    None
}

fn find_recipient(
    roster: &Roster,
    history: &History,
    config: &BalanceConfig,
    source: usize,
    blocked: &mut HashMap<String, String>,
) -> Option<(usize, usize)> {
    let group = &roster.groups[source];
    let mut any_open = false;
    for (gj, recipient) in roster.groups.iter().enumerate() {
        if gj == source || recipient.len() >= config.max_size {
            continue;
        }
        any_open = true;
        if let Some(si) = group
            .members
            .iter()
            .position(|s| !history.occupied(s.key(), &recipient.name))
        {
            return Some((gj, si));
        }
    }
    if any_open
        && let Some(first) = group.members.first()
    {
        blocked.entry(group.name.clone()).or_insert_with(|| first.name.clone());
    }
    None
}

fn record_move(repair: &mut SizeRepair, student: &Student, from: &Group, to: &Group) {
    debug!(student = %student.name, from = %from.name, to = %to.name, "Size repair transfer");
    repair.transfers.push(transfer(student, from, to));
}

fn transfer(student: &Student, from: &Group, to: &Group) -> Transfer {
    Transfer {
        student: student.name.clone(),
        from: from.name.clone(),
        to: to.name.clone(),
    }
}

/// First (student, group) pair the history forbids, in roster order.
pub fn first_history_violation(roster: &Roster, history: &History) -> Option<(String, String)> {
    roster
        .assignments()
        .find(|(student, group)| history.occupied(student.key(), group))
        .map(|(student, group)| (student.name.clone(), group.to_string()))
}

fn swap_members(groups: &mut [Group], (gi, si): (usize, usize), (gj, sj): (usize, usize)) {
    debug_assert_ne!(gi, gj);
    let (lo, hi) = if gi < gj { ((gi, si), (gj, sj)) } else { ((gj, sj), (gi, si)) };
    let (left, right) = groups.split_at_mut(hi.0);
    std::mem::swap(&mut left[lo.0].members[lo.1], &mut right[0].members[hi.1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PastAssignment;
    use crate::model::Gender;

    fn students(prefix: &str, count: usize, gender: Gender, grade: &str) -> Vec<Student> {
        (0..count)
            .map(|i| Student::new(format!("{prefix}{i} Student"), gender, grade))
            .collect()
    }

    fn small_config() -> BalanceConfig {
        BalanceConfig {
            min_size: 3,
            max_size: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_balanced_small_and_oversized_single_gender() {
        let mut a = students("Fa", 5, Gender::Female, "2A");
        a.extend(students("Ma", 5, Gender::Male, "3A"));
        let b = students("Fb", 20, Gender::Female, "2B");
        let roster = Roster::new(vec![Group::with_members("A", a), Group::with_members("B", b)]);

        let mut engine = BalancingEngine::new(BalanceConfig::default(), 7);
        let report = engine.run(roster, &History::default()).unwrap();

        assert_eq!(report.roster.groups[0].len(), 15);
        assert_eq!(report.roster.groups[1].len(), 15);
        assert_eq!(report.transfers.len(), 5);
        assert!(report.transfers.iter().all(|t| t.from == "B" && t.to == "A"));
        assert_eq!(report.states.last(), Some(&EngineState::Validated));
    }

    #[test]
    fn test_size_repair_respects_history() {
        let config = small_config();
        let mut big = students("F", 6, Gender::Female, "2A");
        big.extend(students("M", 1, Gender::Male, "2A"));
        let mut roster = Roster::new(vec![
            Group::with_members("Art", vec![]),
            Group::with_members("Music", big),
        ]);
        // The first two students of Music already did Art.
        let history = History::build(&[
            PastAssignment::new("F0 Student", "Art"),
            PastAssignment::new("F1 Student", "Art"),
        ]);

        let repair = repair_sizes(&mut roster, &history, &config);

        assert_eq!(roster.groups[0].len(), 3);
        assert_eq!(roster.groups[1].len(), 4);
        assert!(first_history_violation(&roster, &history).is_none());
        let moved: Vec<&str> = repair.transfers.iter().map(|t| t.student.as_str()).collect();
        assert_eq!(moved, vec!["F2 Student", "F3 Student", "F4 Student"]);
    }

    #[test]
    fn test_size_repair_is_deterministic() {
        let config = small_config();
        let build = || {
            Roster::new(vec![
                Group::with_members("Art", students("A", 1, Gender::Female, "2A")),
                Group::with_members("Music", students("M", 7, Gender::Male, "3A")),
                Group::with_members("Drama", students("D", 2, Gender::Female, "2B")),
            ])
        };
        let history = History::build(&[PastAssignment::new("M0 Student", "Art")]);

        let mut first = build();
        let mut second = build();
        let r1 = repair_sizes(&mut first, &history, &config);
        let r2 = repair_sizes(&mut second, &history, &config);
        assert_eq!(first, second);
        assert_eq!(r1, r2);
        assert!(first.groups.iter().all(|g| (3..=4).contains(&g.len())));
    }

    #[test]
    fn test_exhausted_names_blocked_student() {
        let config = small_config();
        let roster = Roster::new(vec![
            Group::with_members("Art", students("A", 1, Gender::Female, "2A")),
            Group::with_members("Music", students("M", 5, Gender::Male, "3A")),
        ]);
        // Every Music student already did Art.
        let records: Vec<PastAssignment> = (0..5)
            .map(|i| PastAssignment::new(format!("M{i} Student"), "Art"))
            .collect();
        let history = History::build(&records);

        let mut engine = BalancingEngine::new(config, 1);
        let err = engine.run(roster, &history).unwrap_err();
        match err {
            BalanceError::OptimizationExhausted { group, size, student, partial, .. } => {
                assert_eq!(group, "Art");
                assert_eq!(size, 1);
                assert_eq!(student.as_deref(), Some("M0 Student"));
                assert!(first_history_violation(&partial, &history).is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let roster = Roster::new(vec![
            Group::with_members("Art", vec![Student::new("Ana Novak", Gender::Female, "2A")]),
            Group::with_members("Music", vec![Student::new("novak ana", Gender::Female, "2A")]),
        ]);
        let mut engine = BalancingEngine::new(small_config(), 1);
        let err = engine.run(roster, &History::default()).unwrap_err();
        assert!(matches!(
            err,
            BalanceError::Validation(ValidationError::DuplicateStudent { ref first_group, ref second_group, .. })
                if first_group == "Art" && second_group == "Music"
        ));
    }

    #[test]
    fn test_relocation_moves_violator() {
        let config = small_config();
        let mut roster = Roster::new(vec![
            Group::with_members("Art", students("A", 3, Gender::Female, "2A")),
            Group::with_members("Music", students("M", 3, Gender::Male, "3A")),
        ]);
        let history = History::build(&[PastAssignment::new("A1 Student", "Art")]);

        let moves = relocate_violators(&mut roster, &history, &config);
        assert_eq!(
            moves,
            vec![Transfer {
                student: "A1 Student".to_string(),
                from: "Art".to_string(),
                to: "Music".to_string(),
            }]
        );
        assert!(first_history_violation(&roster, &history).is_none());
    }

    #[test]
    fn test_relocation_swaps_when_full() {
        let config = small_config();
        let mut roster = Roster::new(vec![
            Group::with_members("Art", students("A", 4, Gender::Female, "2A")),
            Group::with_members("Music", students("M", 4, Gender::Male, "3A")),
        ]);
        let history = History::build(&[
            PastAssignment::new("A0 Student", "Art"),
            PastAssignment::new("M0 Student", "Art"),
        ]);

        let moves = relocate_violators(&mut roster, &history, &config);
        assert_eq!(moves.len(), 2);
        assert!(first_history_violation(&roster, &history).is_none());
        assert_eq!(roster.groups[0].len(), 4);
        assert!(roster.groups[0].contains(&StudentKey::from_name("M1 Student")));
    }

    #[test]
    fn test_same_seed_same_result() {
        let build = || {
            let mut a = students("Fa", 8, Gender::Female, "2A");
            a.extend(students("Ga", 8, Gender::Female, "3A"));
            let mut b = students("Mb", 8, Gender::Male, "2B");
            b.extend(students("Nb", 8, Gender::Male, "3B"));
            Roster::new(vec![Group::with_members("A", a), Group::with_members("B", b)])
        };
        let r1 = BalancingEngine::new(BalanceConfig::default(), 99)
            .run(build(), &History::default())
            .unwrap();
        let r2 = BalancingEngine::new(BalanceConfig::default(), 99)
            .run(build(), &History::default())
            .unwrap();
        assert_eq!(r1, r2);
        assert!(r1.final_penalty <= r1.initial_penalty);
    }

    #[test]
    fn test_swaps_improve_gender_balance() {
        let mut engine = BalancingEngine::new(BalanceConfig::default(), 3);
        let a = students("F", 16, Gender::Female, "2A");
        let b = students("M", 16, Gender::Male, "2A");
        let roster = Roster::new(vec![Group::with_members("A", a), Group::with_members("B", b)]);

        let report = engine.run(roster, &History::default()).unwrap();
        assert!(report.swaps_committed > 0);
        assert!(report.final_penalty < report.initial_penalty);
        assert!(report.passes >= 1);
    }

    #[test]
    fn test_unresolvable_violator_fails_run() {
        let config = BalanceConfig {
            min_size: 1,
            max_size: 2,
            ..Default::default()
        };
        let roster = Roster::new(vec![
            Group::with_members("A", vec![Student::new("Ana Novak", Gender::Female, "2A")]),
            Group::with_members("B", vec![Student::new("Bor Lah", Gender::Male, "3A")]),
        ]);
        // Ana already did both groups, so no move or swap can clear her.
        let history = History::build(&[
            PastAssignment::new("Ana Novak", "A"),
            PastAssignment::new("Ana Novak", "B"),
        ]);

        let mut engine = BalancingEngine::new(config, 4);
        let err = engine.run(roster, &history).unwrap_err();
        match err {
            BalanceError::HistoryConflict { student, group } => {
                assert_eq!(student, "Ana Novak");
                assert_eq!(group, "A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            engine.states(),
            &[
                EngineState::Initialized,
                EngineState::Optimizing,
                EngineState::SizeRepair,
                EngineState::Failed,
            ]
        );
    }

    #[test]
    fn test_extreme_size_weight_does_not_overflow() {
        let config = BalanceConfig {
            weights: crate::config::PenaltyWeights {
                size: u64::MAX / 2,
                gender: 1,
                grade: 1,
            },
            ..small_config()
        };
        let roster = Roster::new(vec![
            Group::with_members("Art", students("A", 1, Gender::Female, "2A")),
            Group::with_members("Music", students("M", 5, Gender::Male, "3A")),
        ]);

        let mut engine = BalancingEngine::new(config, 1);
        let report = engine.run(roster, &History::default()).unwrap();

        assert_eq!(report.initial_penalty, u64::MAX);
        assert!(report.final_penalty < report.initial_penalty);
        assert!(report.roster.groups.iter().all(|g| (3..=4).contains(&g.len())));
        assert_eq!(engine.states().last(), Some(&EngineState::Validated));
    }

    #[test]
    fn test_invalid_input_records_failed_state() {
        let roster = Roster::new(vec![
            Group::with_members("Art", vec![Student::new("Ana Novak", Gender::Female, "2A")]),
            Group::with_members("Music", vec![Student::new("Ana Novak", Gender::Female, "2A")]),
        ]);
        let mut engine = BalancingEngine::new(small_config(), 1);
        assert!(engine.run(roster, &History::default()).is_err());
        assert_eq!(engine.states(), &[EngineState::Initialized, EngineState::Failed]);
    }
}
