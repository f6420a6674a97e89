//! A sign-up round: the open roster, its history, and the close workflow.

use mti::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BalanceConfig;
use crate::directory::StudentDirectory;
use crate::engine::{BalanceReport, BalancingEngine};
use crate::error::{BalanceResult, ValidationError};
use crate::history::History;
use crate::model::Roster;
use crate::placement::{self, PlacementReceipt};

/// Namespace UUID for deterministic round IDs (MTI v5).
const ROUND_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3f, 0x1c, 0x6e, 0x92, 0x5b, 0x0d, 0x4a, 0x7e, 0x8c, 0x21, 0xd4, 0x9a, 0x60, 0xb3, 0x17, 0xe5,
]);

/// Deterministic id for a round label, e.g. `round_01h455vb4pex5vsknk084sn02q`.
pub fn round_id(label: &str) -> String {
    let v5_uuid = Uuid::new_v5(&ROUND_NAMESPACE, label.trim().as_bytes());
    let prefix = TypeIdPrefix::try_from("round").expect("round is a valid prefix");
    let suffix = TypeIdSuffix::from(v5_uuid);
    MagicTypeId::new(prefix, suffix).to_string()
}

/// Label of the round that follows `label`: `spring` -> `spring #2`,
/// `spring #2` -> `spring #3`.
pub fn next_label(label: &str) -> String {
    let label = label.trim();
    if let Some((base, n)) = label.rsplit_once(" #")
        && let Ok(n) = n.parse::<u32>()
    {
        return format!("{} #{}", base, n + 1);
    }
    format!("{} #2", label)
}

/// Result of closing a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedRound {
    /// Id of the round that was closed
    pub closed_id: String,
    pub closed_label: String,
    /// Id of the round that is now open
    pub next_id: String,
    pub next_label: String,
    pub report: BalanceReport,
}

/// One open round.
#[derive(Debug, Clone)]
pub struct Round {
    id: String,
    label: String,
    roster: Roster,
    history: History,
    config: BalanceConfig,
}

impl Round {
    /// Open a round with empty groups.
    pub fn open<I, S>(label: &str, groups: I, history: History, config: BalanceConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_roster(label, Roster::empty(groups), history, config)
    }

    /// Resume a round with students already placed.
    pub fn with_roster(label: &str, roster: Roster, history: History, config: BalanceConfig) -> Self {
        Self {
            id: round_id(label),
            label: label.trim().to_string(),
            roster,
            history,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn place(
        &mut self,
        directory: &dyn StudentDirectory,
        student: &str,
        group: &str,
    ) -> BalanceResult<PlacementReceipt> {
        placement::place(
            &mut self.roster,
            &self.history,
            directory,
            &self.config,
            student,
            group,
        )
    }

    /// Balance, archive, and open the next round.
    ///
    /// On success the balanced assignment is appended to history and the
    /// round restarts with the same group names, all empty. On failure the
    /// round is left as it was.
    pub fn close(&mut self, seed: u64) -> BalanceResult<ClosedRound> {
        if self.roster.student_count() == 0 {
            warn!(round = %self.id, "Close requested for a round with no students");
            return Err(ValidationError::EmptyRound.into());
        }

        let mut engine = BalancingEngine::new(self.config.clone(), seed);
        let report = engine.run(self.roster.clone(), &self.history)?;

        self.history.record_roster(&report.roster);

        let closed_id = std::mem::take(&mut self.id);
        let closed_label = std::mem::take(&mut self.label);
        self.label = next_label(&closed_label);
        self.id = round_id(&self.label);
        self.roster = Roster::empty(report.roster.group_names());

        info!(
            closed = %closed_id,
            next = %self.id,
            students = report.roster.student_count(),
            "Round closed"
        );

        Ok(ClosedRound {
            closed_id,
            closed_label,
            next_id: self.id.clone(),
            next_label: self.label.clone(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryRecord, InMemoryDirectory};
    use crate::error::BalanceError;
    use crate::history::PastAssignment;

    fn directory(count: usize) -> InMemoryDirectory {
        InMemoryDirectory::new((0..count).map(|i| DirectoryRecord {
            last: format!("Last{i}"),
            first: format!("First{i}"),
            grade: if i % 2 == 0 { "2A" } else { "3B" }.to_string(),
            gender: if i % 3 == 0 { "M" } else { "F" }.to_string(),
        }))
    }

    fn config() -> BalanceConfig {
        BalanceConfig {
            min_size: 2,
            max_size: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_round_id_is_stable() {
        assert_eq!(round_id("spring"), round_id(" spring "));
        assert_ne!(round_id("spring"), round_id("autumn"));
        assert!(round_id("spring").starts_with("round_"));
    }

    #[test]
    fn test_next_label() {
        assert_eq!(next_label("spring"), "spring #2");
        assert_eq!(next_label("spring #2"), "spring #3");
        assert_eq!(next_label("#x"), "#x #2");
    }

    #[test]
    fn test_close_empty_round() {
        let mut round = Round::open("spring", ["Art", "Music"], History::default(), config());
        let err = round.close(1).unwrap_err();
        assert!(matches!(err, BalanceError::Validation(ValidationError::EmptyRound)));
        assert_eq!(round.label(), "spring");
    }

    #[test]
    fn test_close_archives_and_reopens() {
        let dir = directory(5);
        let mut round = Round::open("spring", ["Art", "Music"], History::default(), config());
        for i in 0..3 {
            round.place(&dir, &format!("First{i} Last{i}"), "Art").unwrap();
        }
        for i in 3..5 {
            round.place(&dir, &format!("First{i} Last{i}"), "Music").unwrap();
        }

        let closed = round.close(5).unwrap();
        assert_eq!(closed.closed_label, "spring");
        assert_eq!(closed.next_label, "spring #2");
        assert_eq!(round.id(), closed.next_id);
        assert_eq!(round.roster().student_count(), 0);
        assert_eq!(round.roster().group_names(), vec!["Art", "Music"]);

        for (student, group) in closed.report.roster.assignments() {
            assert!(round.history().occupied(student.key(), group));
        }
    }

    #[test]
    fn test_failed_close_leaves_round() {
        let dir = directory(1);
        let history = History::build(&[PastAssignment::new("First0 Last0", "Music")]);
        let mut round = Round::open("spring", ["Art", "Music"], history, config());
        round.place(&dir, "First0 Last0", "Art").unwrap();
        let before = round.roster().clone();

        let err = round.close(3).unwrap_err();
        assert_eq!(err.kind(), "optimization_exhausted");
        assert_eq!(round.roster(), &before);
        assert_eq!(round.label(), "spring");
        assert!(!round.history().occupied_by_name("First0 Last0", "Art"));
    }
}
