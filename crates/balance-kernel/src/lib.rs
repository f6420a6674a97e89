//! Balance Kernel: history-constrained group balancing for sign-up rounds
//!
//! Students placed into project groups are rearranged so every group lands
//! inside a size band, gender and grade tiers are balanced within tolerance,
//! and no student repeats a project from an earlier round.

pub mod actors;
pub mod analyzer;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod history;
pub mod messages;
pub mod model;
pub mod normalize;
pub mod placement;
pub mod round;

pub use actors::{RoundActor, RoundClient, RoundClientError, RoundObserver};
pub use analyzer::{GroupStats, analyze, penalty, total_penalty};
pub use config::{BalanceConfig, PenaltyWeights, TierConfig};
pub use directory::{DirectoryError, DirectoryRecord, InMemoryDirectory, StudentDirectory};
pub use engine::{BalanceReport, BalancingEngine, EngineState, GroupSummary, Transfer};
pub use error::{BalanceError, BalanceResult, ValidationError};
pub use history::{History, PastAssignment};
pub use model::{Gender, Grade, GradeTier, Group, Roster, Student};
pub use normalize::StudentKey;
pub use placement::PlacementReceipt;
pub use round::{ClosedRound, Round};
