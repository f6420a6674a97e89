//! Single-student placement into an open round.
//!
//! No balancing happens here. The student is appended at the first free
//! slot if every check passes; any failure leaves the roster untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BalanceConfig;
use crate::directory::StudentDirectory;
use crate::error::{BalanceError, BalanceResult, ValidationError};
use crate::history::History;
use crate::model::Roster;
use crate::normalize;

/// Where a placed student landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReceipt {
    pub student: String,
    pub group: String,
    /// Zero-based position inside the group
    pub slot: usize,
}

/// Place `student` into `group`.
///
/// Checks, in order: full name, known group, directory entry, already in
/// this group, already in another group, capacity, history.
pub fn place(
    roster: &mut Roster,
    history: &History,
    directory: &dyn StudentDirectory,
    config: &BalanceConfig,
    student: &str,
    group: &str,
) -> BalanceResult<PlacementReceipt> {
    let result = check(roster, history, directory, config, student, group);
    let (gi, resolved) = match result {
        Ok(ok) => ok,
        Err(err) => {
            debug!(student, group, kind = err.kind(), error = %err, "Placement rejected");
            return Err(err);
        }
    };

    let target = &mut roster.groups[gi];
    target.members.push(resolved);
    let slot = target.len() - 1;
    let receipt = PlacementReceipt {
        student: target.members[slot].name.clone(),
        group: target.name.clone(),
        slot,
    };
    info!(student = %receipt.student, group = %receipt.group, slot, "Student placed");
    Ok(receipt)
}

fn check(
    roster: &Roster,
    history: &History,
    directory: &dyn StudentDirectory,
    config: &BalanceConfig,
    student: &str,
    group: &str,
) -> BalanceResult<(usize, crate::model::Student)> {
    if !normalize::is_full_name(student) {
        return Err(ValidationError::IncompleteName {
            name: student.trim().to_string(),
        }
        .into());
    }

    let gi = roster.index_of(group).ok_or_else(|| ValidationError::UnknownGroup {
        group: group.trim().to_string(),
    })?;
    let target = &roster.groups[gi];

    let resolved = directory.lookup(student).map_err(ValidationError::from)?;
    let key = resolved.key().clone();

    if target.contains(&key) {
        return Err(BalanceError::DuplicateAssignment {
            student: resolved.name,
            group: target.name.clone(),
        });
    }
    if let Some((other, _)) = roster.locate(&key) {
        return Err(BalanceError::DuplicateAssignment {
            student: resolved.name,
            group: roster.groups[other].name.clone(),
        });
    }

    if target.len() >= config.max_size {
        return Err(BalanceError::CapacityExceeded {
            group: target.name.clone(),
            capacity: config.max_size,
        });
    }

    if history.occupied(&key, &target.name) {
        return Err(BalanceError::HistoryConflict {
            student: resolved.name,
            group: target.name.clone(),
        });
    }

    Ok((gi, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryRecord, InMemoryDirectory};
    use crate::history::PastAssignment;
    use crate::model::{Gender, Group, Student};

    fn directory() -> InMemoryDirectory {
        let rows = [
            ("Novak", "Ana", "2A", "F"),
            ("Lah", "Bor", "3B", "M"),
            ("Kos", "Zora", "3A", "F"),
            ("Vidmar", "Ema", "2B", "F"),
        ];
        InMemoryDirectory::new(rows.iter().map(|(last, first, grade, gender)| DirectoryRecord {
            last: last.to_string(),
            first: first.to_string(),
            grade: grade.to_string(),
            gender: gender.to_string(),
        }))
    }

    fn config() -> BalanceConfig {
        BalanceConfig {
            min_size: 1,
            max_size: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_place_appends() {
        let mut roster = Roster::empty(["Art", "Music"]);
        let receipt = place(&mut roster, &History::default(), &directory(), &config(), "novak ana", "Art").unwrap();
        assert_eq!(receipt.slot, 0);
        assert_eq!(receipt.student, "Ana Novak");
        assert_eq!(roster.groups[0].members[0].grade.label(), "2A");
    }

    #[test]
    fn test_duplicate_leaves_group_unchanged() {
        let mut roster = Roster::empty(["Art", "Music"]);
        let dir = directory();
        place(&mut roster, &History::default(), &dir, &config(), "Ana Novak", "Art").unwrap();
        let before = roster.clone();

        let err = place(&mut roster, &History::default(), &dir, &config(), "ANA  NOVÁK", "Art").unwrap_err();
        assert!(matches!(err, BalanceError::DuplicateAssignment { ref group, .. } if group == "Art"));
        assert_eq!(roster, before);
    }

    #[test]
    fn test_already_in_other_group() {
        let mut roster = Roster::empty(["Art", "Music"]);
        let dir = directory();
        place(&mut roster, &History::default(), &dir, &config(), "Ana Novak", "Art").unwrap();

        let err = place(&mut roster, &History::default(), &dir, &config(), "Ana Novak", "Music").unwrap_err();
        assert!(matches!(err, BalanceError::DuplicateAssignment { ref group, .. } if group == "Art"));
        assert!(roster.groups[1].is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut roster = Roster::new(vec![Group::with_members(
            "Art",
            vec![
                Student::new("Bor Lah", Gender::Male, "3B"),
                Student::new("Zora Kos", Gender::Female, "3A"),
            ],
        )]);
        let before = roster.clone();
        let err = place(&mut roster, &History::default(), &directory(), &config(), "Ema Vidmar", "Art").unwrap_err();
        assert!(matches!(err, BalanceError::CapacityExceeded { capacity: 2, .. }));
        assert_eq!(roster, before);
    }

    #[test]
    fn test_history_conflict() {
        let mut roster = Roster::empty(["Art"]);
        let history = History::build(&[PastAssignment::new("Vidmar Ema", "Art")]);
        let err = place(&mut roster, &history, &directory(), &config(), "Ema Vidmar", "Art").unwrap_err();
        assert_eq!(err.kind(), "history_conflict");
        assert!(roster.groups[0].is_empty());
    }

    #[test]
    fn test_validation_failures() {
        let mut roster = Roster::empty(["Art"]);
        let dir = directory();
        let history = History::default();

        let err = place(&mut roster, &history, &dir, &config(), "Ana", "Art").unwrap_err();
        assert!(matches!(err, BalanceError::Validation(ValidationError::IncompleteName { .. })));

        let err = place(&mut roster, &history, &dir, &config(), "Ana Novak", "Chess").unwrap_err();
        assert!(matches!(err, BalanceError::Validation(ValidationError::UnknownGroup { .. })));

        let err = place(&mut roster, &history, &dir, &config(), "Nobody Here", "Art").unwrap_err();
        assert!(matches!(err, BalanceError::Validation(ValidationError::UnknownStudent { .. })));
    }
}
