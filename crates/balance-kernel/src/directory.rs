//! Student directory: resolves a name to gender and grade.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::model::{Gender, Grade, Student};
use crate::normalize::StudentKey;

/// How many known keys a NotFound error carries for diagnostics.
const SAMPLE_SIZE: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("no directory entry for {input:?} (key {key}); sample keys: {}", sample.join(", "))]
    NotFound {
        input: String,
        key: StudentKey,
        sample: Vec<String>,
    },
}

impl From<DirectoryError> for ValidationError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound { input, .. } => ValidationError::UnknownStudent { student: input },
        }
    }
}

/// Read-only source of student attributes.
pub trait StudentDirectory: Send + Sync {
    fn lookup(&self, name: &str) -> Result<Student, DirectoryError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One row of the directory as kept in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub last: String,
    pub first: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub gender: String,
}

impl DirectoryRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first.trim(), self.last.trim())
    }
}

/// Directory held in memory, matching "Last First" and "First Last".
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    entries: HashMap<StudentKey, usize>,
    records: Vec<DirectoryRecord>,
}

impl InMemoryDirectory {
    pub fn new(records: impl IntoIterator<Item = DirectoryRecord>) -> Self {
        let mut directory = Self::default();
        for record in records {
            directory.insert(record);
        }
        directory
    }

    /// Add a record. A later record with the same name wins.
    pub fn insert(&mut self, record: DirectoryRecord) {
        let idx = self.records.len();
        let last_first = format!("{} {}", record.last, record.first);
        let first_last = format!("{} {}", record.first, record.last);
        self.entries.insert(StudentKey::from_name(&last_first), idx);
        self.entries.insert(StudentKey::from_name(&first_last), idx);
        self.records.push(record);
    }

    pub fn records(&self) -> &[DirectoryRecord] {
        &self.records
    }

    fn sample(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().map(|k| k.to_string()).collect();
        keys.sort();
        keys.truncate(SAMPLE_SIZE);
        keys
    }
}

impl StudentDirectory for InMemoryDirectory {
    fn lookup(&self, name: &str) -> Result<Student, DirectoryError> {
        let key = StudentKey::from_name(name);
        match self.entries.get(&key) {
            Some(&idx) => {
                let record = &self.records[idx];
                Ok(Student::new(
                    record.display_name(),
                    Gender::parse(&record.gender),
                    Grade::new(record.grade.as_str()),
                ))
            }
            None => Err(DirectoryError::NotFound {
                input: name.to_string(),
                key,
                sample: self.sample(),
            }),
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
