//! Students, groups, and the roster the engine rearranges.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{BalanceConfig, TierConfig};
use crate::normalize::StudentKey;

/// Gender as recorded in the directory.
///
/// Parsing follows the sign-up sheets: anything starting with `f` is female,
/// anything starting with `m` is male, everything else (including a blank
/// cell) is unknown. Unknown never balances either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unknown,
}

impl Gender {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('f') => Self::Female,
            Some('m') => Self::Male,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for Gender {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Which side of the grade balance a student counts toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeTier {
    Lower,
    Upper,
    Other,
}

/// A grade label such as `2A` or `3B`.
///
/// Only the leading year takes part in balancing. The section letter is kept
/// for display ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grade(String);

impl Grade {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_string())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading number of the label (`2` for `2A`).
    pub fn year(&self) -> Option<u32> {
        let digits: String = self.0.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    /// Trailing section letter (`A` for `2A`), uppercased.
    pub fn section(&self) -> Option<char> {
        let rest = self.0.trim_start_matches(|c: char| c.is_ascii_digit()).trim();
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
            _ => None,
        }
    }

    pub fn tier(&self, tiers: &TierConfig) -> GradeTier {
        match self.year() {
            Some(year) if year == tiers.lower => GradeTier::Lower,
            Some(year) if year == tiers.upper => GradeTier::Upper,
            _ => GradeTier::Other,
        }
    }

    /// Display sort key: configured order first, then year and section,
    /// unparseable labels near the end, blank labels last.
    pub fn sort_key(&self, config: &BalanceConfig) -> u64 {
        if self.0.is_empty() {
            return u64::MAX;
        }
        if let Some(rank) = config.grade_order.get(&self.0) {
            return u64::from(*rank) * 1000;
        }
        let parsed_rest = self.0.trim_start_matches(|c: char| c.is_ascii_digit()).trim();
        match self.year() {
            Some(year) if parsed_rest.is_empty() || self.section().is_some() => {
                let letter = self.section().unwrap_or('A');
                u64::from(year) * 1000 + u64::from(letter as u8 - b'A' + 1)
            }
            _ => u64::MAX - 1,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Grade {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// A student as loaded for a round. Immutable during a run.
///
/// The normalized key is computed once at construction; rebuild the student
/// with [`Student::new`] rather than editing `name` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StudentRow")]
pub struct Student {
    /// Name as written in the source.
    pub name: String,
    pub gender: Gender,
    pub grade: Grade,
    #[serde(skip)]
    key: StudentKey,
}

/// Serialized shape of a [`Student`].
#[derive(Deserialize)]
struct StudentRow {
    name: String,
    #[serde(default)]
    gender: Gender,
    #[serde(default)]
    grade: Grade,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self::new(row.name, row.gender, row.grade)
    }
}

impl Student {
    pub fn new(name: impl Into<String>, gender: Gender, grade: impl Into<Grade>) -> Self {
        let name = name.into().trim().to_string();
        let key = StudentKey::from_name(&name);
        Self {
            name,
            gender,
            grade: grade.into(),
            key,
        }
    }

    pub fn key(&self) -> &StudentKey {
        &self.key
    }
}

/// One project group and the students currently in it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub members: Vec<Student>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            members: Vec::new(),
        }
    }

    pub fn with_members(name: impl Into<String>, members: Vec<Student>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of a student by normalized name.
    pub fn position(&self, key: &StudentKey) -> Option<usize> {
        self.members.iter().position(|s| s.key() == key)
    }

    pub fn contains(&self, key: &StudentKey) -> bool {
        self.position(key).is_some()
    }
}

/// All groups of a round, in a fixed order.
///
/// The order is the deterministic scan order used by size repair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roster {
    pub groups: Vec<Group>,
}

impl Roster {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Empty groups with the given names.
    pub fn empty<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: names.into_iter().map(Group::new).collect(),
        }
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    pub fn index_of(&self, group: &str) -> Option<usize> {
        let wanted = group.trim();
        self.groups.iter().position(|g| g.name == wanted)
    }

    pub fn group(&self, group: &str) -> Option<&Group> {
        self.index_of(group).map(|i| &self.groups[i])
    }

    pub fn group_mut(&mut self, group: &str) -> Option<&mut Group> {
        self.index_of(group).map(move |i| &mut self.groups[i])
    }

    pub fn student_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Group currently holding the student, if any.
    pub fn locate(&self, key: &StudentKey) -> Option<(usize, usize)> {
        self.groups
            .iter()
            .enumerate()
            .find_map(|(gi, g)| g.position(key).map(|si| (gi, si)))
    }

    /// Every (student, group) pair, group by group.
    pub fn assignments(&self) -> impl Iterator<Item = (&Student, &str)> {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().map(move |s| (s, g.name.as_str())))
    }

    /// Normalized name → group name.
    pub fn membership(&self) -> HashMap<StudentKey, String> {
        self.assignments()
            .map(|(s, g)| (s.key().clone(), g.to_string()))
            .collect()
    }

    /// Copy with each group ordered by grade, then name (case-insensitive).
    pub fn sorted_for_display(&self, config: &BalanceConfig) -> Self {
        let groups = self
            .groups
            .iter()
            .map(|g| {
                let mut members = g.members.clone();
                members.sort_by(|a, b| display_order(a, b, config));
                Group::with_members(g.name.clone(), members)
            })
            .collect();
        Self { groups }
    }
}

fn display_order(a: &Student, b: &Student, config: &BalanceConfig) -> Ordering {
    a.grade
        .sort_key(config)
        .cmp(&b.grade.sort_key(config))
        .then_with(|| crate::normalize::fold(&a.name).cmp(&crate::normalize::fold(&b.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("F"), Gender::Female);
        assert_eq!(Gender::parse("female"), Gender::Female);
        assert_eq!(Gender::parse(" m "), Gender::Male);
        assert_eq!(Gender::parse(""), Gender::Unknown);
        assert_eq!(Gender::parse("x"), Gender::Unknown);
    }

    #[test]
    fn test_gender_serde() {
        let g: Gender = serde_json::from_str("\"Female\"").unwrap();
        assert_eq!(g, Gender::Female);
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
    }

    #[test]
    fn test_grade_parts() {
        let grade = Grade::new("3b");
        assert_eq!(grade.year(), Some(3));
        assert_eq!(grade.section(), Some('B'));
        assert_eq!(Grade::new("2").section(), None);
        assert_eq!(Grade::new("").year(), None);
    }

    #[test]
    fn test_grade_tier() {
        let tiers = TierConfig::default();
        assert_eq!(Grade::new("2A").tier(&tiers), GradeTier::Lower);
        assert_eq!(Grade::new("3B").tier(&tiers), GradeTier::Upper);
        assert_eq!(Grade::new("4A").tier(&tiers), GradeTier::Other);
        assert_eq!(Grade::new("").tier(&tiers), GradeTier::Other);
    }

    #[test]
    fn test_grade_sort_key() {
        let config = BalanceConfig::default();
        assert_eq!(Grade::new("2A").sort_key(&config), 1000);
        assert_eq!(Grade::new("3B").sort_key(&config), 4000);
        assert_eq!(Grade::new("10C").sort_key(&config), 10_003);
        assert_eq!(Grade::new("n/a").sort_key(&config), u64::MAX - 1);
        assert_eq!(Grade::new("").sort_key(&config), u64::MAX);
    }

    #[test]
    fn test_sorted_for_display() {
        let config = BalanceConfig::default();
        let roster = Roster::new(vec![Group::with_members(
            "Robotics",
            vec![
                Student::new("Zora Kos", Gender::Female, "3A"),
                Student::new("ana Novak", Gender::Female, "2B"),
                Student::new("Bor Lah", Gender::Male, "2B"),
                Student::new("Ema Vidmar", Gender::Female, ""),
            ],
        )]);

        let sorted = roster.sorted_for_display(&config);
        let names: Vec<&str> = sorted.groups[0]
            .members
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["ana Novak", "Bor Lah", "Zora Kos", "Ema Vidmar"]);
    }

    #[test]
    fn test_deserialized_student_has_key() {
        let student: Student =
            serde_json::from_str(r#"{"name": " Novák Ana ", "gender": "f", "grade": "2A"}"#).unwrap();
        assert_eq!(student.name, "Novák Ana");
        assert_eq!(student.key(), &StudentKey::from_name("ana novak"));
        assert_eq!(student, Student::new("Novák Ana", Gender::Female, "2A"));

        let json = serde_json::to_string(&student).unwrap();
        assert!(!json.contains("key"));
    }

    #[test]
    fn test_locate_uses_normalized_names() {
        let roster = Roster::new(vec![
            Group::new("Art"),
            Group::with_members(
                "Robotics",
                vec![Student::new("Novák Ana", Gender::Female, "2A")],
            ),
        ]);
        assert_eq!(roster.locate(&StudentKey::from_name("ana novak")), Some((1, 0)));
        assert_eq!(roster.locate(&StudentKey::from_name("Bor Lah")), None);
    }
}
