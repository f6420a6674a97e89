//! Round snapshots on disk.
//!
//! A snapshot is everything needed to resume a round: its label, the groups
//! and who is in them, the archived history, and the directory. The store
//! keeps one JSON file per round id in a directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use balance_kernel::normalize;
use balance_kernel::round::round_id;
use balance_kernel::{
    BalanceConfig, DirectoryRecord, Group, History, InMemoryDirectory, PastAssignment, Roster, Round,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Serialized state of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round_id: String,
    pub label: String,
    pub saved_at: DateTime<Utc>,
    pub groups: Vec<Group>,
    #[serde(default)]
    pub history: Vec<PastAssignment>,
    #[serde(default)]
    pub directory: Vec<DirectoryRecord>,
}

impl RoundSnapshot {
    pub fn new(
        label: &str,
        roster: &Roster,
        history: Vec<PastAssignment>,
        directory: Vec<DirectoryRecord>,
    ) -> Self {
        Self {
            round_id: round_id(label),
            label: label.trim().to_string(),
            saved_at: Utc::now(),
            groups: roster.groups.clone(),
            history,
            directory,
        }
    }

    pub fn from_round(round: &Round, directory: Vec<DirectoryRecord>) -> Self {
        Self::new(round.label(), round.roster(), round.history().to_records(), directory)
    }

    /// Groups as a roster. Single-word names are skipped with a warning.
    pub fn roster(&self) -> Roster {
        let groups = self
            .groups
            .iter()
            .map(|g| {
                let members = g
                    .members
                    .iter()
                    .filter(|s| {
                        let full = normalize::is_full_name(&s.name);
                        if !full {
                            warn!(student = %s.name, group = %g.name, "Skipping entry without a full name");
                        }
                        full
                    })
                    .cloned()
                    .collect();
                Group::with_members(g.name.clone(), members)
            })
            .collect();
        Roster::new(groups)
    }

    pub fn to_round(&self, config: BalanceConfig) -> Round {
        Round::with_roster(&self.label, self.roster(), History::build(&self.history), config)
    }

    pub fn to_directory(&self) -> InMemoryDirectory {
        InMemoryDirectory::new(self.directory.iter().cloned())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing snapshot {}", path.display()))?;
        Ok(())
    }
}

/// Directory of snapshots, one `<round_id>.json` per round.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("creating snapshot store {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, round_id: &str) -> Result<PathBuf> {
        if round_id.is_empty() || round_id.contains(['/', '\\', '.']) {
            bail!("invalid round id: {round_id:?}");
        }
        Ok(self.root.join(format!("{round_id}.json")))
    }

    /// Save under the snapshot's round id, replacing any earlier save.
    pub fn save(&self, snapshot: &RoundSnapshot) -> Result<PathBuf> {
        let path = self.path_for(&snapshot.round_id)?;
        snapshot.write(&path)?;
        info!(round = %snapshot.round_id, path = %path.display(), "Snapshot saved");
        Ok(path)
    }

    pub fn load(&self, round_id: &str) -> Result<RoundSnapshot> {
        let snapshot = RoundSnapshot::read(self.path_for(round_id)?)?;
        if snapshot.round_id != round_id {
            bail!(
                "snapshot file for {round_id} holds round {}",
                snapshot.round_id
            );
        }
        debug!(round = %round_id, "Snapshot loaded");
        Ok(snapshot)
    }

    /// Round ids present in the store, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_kernel::{Gender, Student};

    fn snapshot(label: &str) -> RoundSnapshot {
        let roster = Roster::new(vec![
            Group::with_members(
                "Art",
                vec![
                    Student::new("Ana Novak", Gender::Female, "2A"),
                    Student::new("Cher", Gender::Female, "3A"),
                ],
            ),
            Group::new("Music"),
        ]);
        RoundSnapshot::new(
            label,
            &roster,
            vec![PastAssignment::new("Ana Novak", "Music")],
            vec![DirectoryRecord {
                last: "Novak".to_string(),
                first: "Ana".to_string(),
                grade: "2A".to_string(),
                gender: "F".to_string(),
            }],
        )
    }

    #[test]
    fn test_store_save_load_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("rounds")).unwrap();

        let spring = snapshot("spring");
        let autumn = snapshot("autumn");
        store.save(&spring).unwrap();
        store.save(&autumn).unwrap();

        let loaded = store.load(&spring.round_id).unwrap();
        assert_eq!(loaded, spring);

        let mut expected = vec![spring.round_id.clone(), autumn.round_id.clone()];
        expected.sort();
        assert_eq!(store.list().unwrap(), expected);
    }

    #[test]
    fn test_load_missing_round() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert!(store.load("round_missing").is_err());
        assert!(store.load("../escape").is_err());
    }

    #[test]
    fn test_roster_skips_single_word_names() {
        let roster = snapshot("spring").roster();
        assert_eq!(roster.groups[0].len(), 1);
        assert_eq!(roster.groups[0].members[0].name, "Ana Novak");
    }

    #[test]
    fn test_to_round_carries_history() {
        let round = snapshot("spring").to_round(BalanceConfig::default());
        assert_eq!(round.label(), "spring");
        assert!(round.history().occupied_by_name("novak ana", "Music"));
        assert_eq!(round.roster().student_count(), 1);
    }
}
