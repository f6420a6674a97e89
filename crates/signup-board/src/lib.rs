//! Signup Board - rounds, snapshots, and trial grids over the balancing kernel.
//!
//! Students sign up for project groups; when a round closes the groups are
//! rebalanced and the assignment is archived so nobody repeats a project.
//!
//! ## Pieces
//!
//! - **store**: JSON snapshots of a round, one file per round id
//! - **board**: place and close through the round actor
//! - **generator**: seeded cohorts at three difficulties
//! - **experiment** / **results**: trial grids with success-rate statistics

pub mod board;
pub mod experiment;
pub mod generator;
pub mod results;
pub mod store;

pub use experiment::{TrialRunner, TrialRunnerConfig};
pub use generator::{CohortConfig, CohortGenerator};
pub use results::{DifficultySummary, GridResults, RunRecord};
pub use store::{RoundSnapshot, SnapshotStore};
