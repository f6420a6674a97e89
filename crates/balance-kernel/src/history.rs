//! Prior-round history: which groups each student has already done.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::Roster;
use crate::normalize::StudentKey;

/// One archived (student, group) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastAssignment {
    pub student: String,
    pub group: String,
}

impl PastAssignment {
    pub fn new(student: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            student: student.into(),
            group: group.into(),
        }
    }
}

/// Normalized student → set of group names already occupied.
///
/// The engine only reads it. Rounds append to it when they close.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    occupied: HashMap<StudentKey, BTreeSet<String>>,
}

impl History {
    /// Build from archived records. Order and duplicates do not matter.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PastAssignment>,
    {
        let mut history = Self::default();
        for record in records {
            history.record(&record.student, &record.group);
        }
        history
    }

    /// Add one record. Blank names or groups are ignored.
    pub fn record(&mut self, student: &str, group: &str) {
        let key = StudentKey::from_name(student);
        let group = group.trim();
        if key.is_empty() || group.is_empty() {
            return;
        }
        self.occupied
            .entry(key)
            .or_default()
            .insert(group.to_string());
    }

    /// Append every assignment of a roster.
    pub fn record_roster(&mut self, roster: &Roster) {
        for (student, group) in roster.assignments() {
            self.record(&student.name, group);
        }
    }

    pub fn occupied(&self, key: &StudentKey, group: &str) -> bool {
        self.occupied
            .get(key)
            .is_some_and(|groups| groups.contains(group.trim()))
    }

    /// Same as [`History::occupied`] for a raw name.
    pub fn occupied_by_name(&self, student: &str, group: &str) -> bool {
        self.occupied(&StudentKey::from_name(student), group)
    }

    pub fn groups_for(&self, key: &StudentKey) -> Option<&BTreeSet<String>> {
        self.occupied.get(key)
    }

    /// Number of students with at least one record.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Flatten back to records, sorted by key then group.
    pub fn to_records(&self) -> Vec<PastAssignment> {
        let mut keys: Vec<&StudentKey> = self.occupied.keys().collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|k| {
                self.occupied[k]
                    .iter()
                    .map(move |g| PastAssignment::new(k.as_str(), g.as_str()))
            })
            .collect()
    }
}
