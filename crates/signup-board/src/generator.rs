//! Cohort generator.
//!
//! Generates random sign-up rounds: a directory, skewed initial groups, and
//! the history of earlier rounds. Initial placements never break history,
//! the same way the sign-up board never accepts such a placement.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use balance_kernel::{DirectoryRecord, Gender, Group, PastAssignment, Roster, Student};

use crate::store::RoundSnapshot;

const FIRST_NAMES: [&str; 24] = [
    "Ana", "Bor", "Cvetka", "Domen", "Ema", "Filip", "Gaja", "Hana", "Igor", "Jana", "Klemen",
    "Lara", "Matej", "Nika", "Oskar", "Pia", "Rok", "Sara", "Tilen", "Urša", "Vid", "Zala",
    "Žan", "Špela",
];

const LAST_NAMES: [&str; 20] = [
    "Novak", "Horvat", "Krajnc", "Kovačič", "Zupančič", "Potočnik", "Mlakar", "Kos", "Vidmar",
    "Golob", "Turk", "Kralj", "Božič", "Korošec", "Bizjak", "Zupan", "Hribar", "Kavčič",
    "Rozman", "Kastelic",
];

const GROUP_NAMES: [&str; 8] = [
    "Robotics", "Theatre", "Ecology", "Journalism", "Chess", "Choir", "Astronomy", "Pottery",
];

/// Configuration for generating a round.
#[derive(Debug, Clone)]
pub struct CohortConfig {
    /// Number of project groups.
    pub num_groups: usize,
    /// Number of students placed in the round.
    pub num_students: usize,
    /// Probability a student is female (the rest are male).
    pub female_fraction: f64,
    /// Probability a student is in the lower grade tier.
    pub lower_tier_fraction: f64,
    /// Probability a student signed up for the first group.
    pub skew: f64,
    /// Number of archived rounds.
    pub past_rounds: usize,
    /// Probability a student took part in a given archived round.
    pub history_fraction: f64,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self::easy()
    }
}

impl CohortConfig {
    /// Easy difficulty: near-even sign-ups, little history.
    pub fn easy() -> Self {
        Self {
            num_groups: 4,
            num_students: 62,
            female_fraction: 0.5,
            lower_tier_fraction: 0.5,
            skew: 0.1,
            past_rounds: 1,
            history_fraction: 0.3,
        }
    }

    /// Medium difficulty: a popular group and two archived rounds.
    pub fn medium() -> Self {
        Self {
            num_groups: 5,
            num_students: 78,
            female_fraction: 0.55,
            lower_tier_fraction: 0.45,
            skew: 0.3,
            past_rounds: 2,
            history_fraction: 0.5,
        }
    }

    /// Hard difficulty: heavy skew, lopsided cohort, dense history.
    pub fn hard() -> Self {
        Self {
            num_groups: 6,
            num_students: 92,
            female_fraction: 0.65,
            lower_tier_fraction: 0.35,
            skew: 0.5,
            past_rounds: 3,
            history_fraction: 0.7,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "easy" => Some(Self::easy()),
            "medium" => Some(Self::medium()),
            "hard" => Some(Self::hard()),
            _ => None,
        }
    }
}

/// Generator for sign-up rounds.
pub struct CohortGenerator {
    config: CohortConfig,
    rng: ChaCha8Rng,
}

impl CohortGenerator {
    pub fn new(config: CohortConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a round snapshot ready to balance.
    pub fn generate(&mut self, label: &str) -> RoundSnapshot {
        let group_names: Vec<String> = GROUP_NAMES
            .iter()
            .cycle()
            .take(self.config.num_groups)
            .enumerate()
            .map(|(i, name)| {
                if i < GROUP_NAMES.len() {
                    name.to_string()
                } else {
                    format!("{} {}", name, i / GROUP_NAMES.len() + 1)
                }
            })
            .collect();

        let directory = self.generate_directory();
        let mut groups: Vec<Group> = group_names.iter().map(|name| Group::new(name.as_str())).collect();
        let mut history = Vec::new();
        if groups.is_empty() {
            return RoundSnapshot::new(label, &Roster::default(), history, directory);
        }

        for record in &directory {
            let student = Student::new(
                record.display_name(),
                Gender::parse(&record.gender),
                record.grade.as_str(),
            );
            let current = self.pick_group(groups.len());

            for _ in 0..self.config.past_rounds {
                if groups.len() < 2 || !self.rng.random_bool(self.config.history_fraction) {
                    continue;
                }
                let mut past = self.rng.random_range(0..groups.len() - 1);
                if past >= current {
                    past += 1;
                }
                history.push(PastAssignment::new(record.display_name(), groups[past].name.clone()));
            }

            groups[current].members.push(student);
        }

        RoundSnapshot::new(label, &Roster::new(groups), history, directory)
    }

    fn pick_group(&mut self, count: usize) -> usize {
        if self.rng.random_bool(self.config.skew) {
            0
        } else {
            self.rng.random_range(0..count)
        }
    }

    fn generate_directory(&mut self) -> Vec<DirectoryRecord> {
        let mut names: Vec<(&str, &str)> = FIRST_NAMES
            .iter()
            .flat_map(|first| LAST_NAMES.iter().map(move |last| (*first, *last)))
            .collect();
        names.shuffle(&mut self.rng);

        names
            .into_iter()
            .take(self.config.num_students)
            .map(|(first, last)| {
                let gender = if self.rng.random_bool(self.config.female_fraction) {
                    "F"
                } else {
                    "M"
                };
                let year = if self.rng.random_bool(self.config.lower_tier_fraction) {
                    2
                } else {
                    3
                };
                let section = if self.rng.random_bool(0.5) { 'A' } else { 'B' };
                DirectoryRecord {
                    last: last.to_string(),
                    first: first.to_string(),
                    grade: format!("{year}{section}"),
                    gender: gender.to_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_kernel::History;

    #[test]
    fn test_generate_counts() {
        let mut generator = CohortGenerator::new(CohortConfig::medium(), 42);
        let snapshot = generator.generate("spring");

        assert_eq!(snapshot.groups.len(), 5);
        assert_eq!(snapshot.directory.len(), 78);
        assert_eq!(snapshot.roster().student_count(), 78);
        assert!(snapshot.round_id.starts_with("round_"));
    }

    #[test]
    fn test_same_seed_same_cohort() {
        let a = CohortGenerator::new(CohortConfig::hard(), 7).generate("spring");
        let b = CohortGenerator::new(CohortConfig::hard(), 7).generate("spring");
        assert_eq!(a.groups, b.groups);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_initial_groups_respect_history() {
        let snapshot = CohortGenerator::new(CohortConfig::hard(), 3).generate("spring");
        let history = History::build(&snapshot.history);
        for (student, group) in snapshot.roster().assignments() {
            assert!(!history.occupied(student.key(), group));
        }
        assert!(!snapshot.history.is_empty());
    }

    #[test]
    fn test_directory_resolves_every_student() {
        use balance_kernel::StudentDirectory;

        let snapshot = CohortGenerator::new(CohortConfig::easy(), 11).generate("spring");
        let directory = snapshot.to_directory();
        for (student, _) in snapshot.roster().assignments() {
            let found = directory.lookup(&student.name).unwrap();
            assert_eq!(found.grade, student.grade);
        }
    }

    #[test]
    fn test_by_name() {
        assert_eq!(CohortConfig::by_name("HARD").map(|c| c.num_groups), Some(6));
        assert!(CohortConfig::by_name("extreme").is_none());
    }
}
