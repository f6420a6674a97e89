//! Error taxonomy for placement and balancing.
//!
//! Every variant is recoverable at the caller level and carries the student,
//! group, and constraint involved. Errors are `Clone` so they can ride inside
//! actor messages.

use thiserror::Error;

use crate::model::Roster;

/// Malformed input to a placement or balancing run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("student not found in directory: {student}")]
    UnknownStudent { student: String },

    #[error("group is not part of this round: {group}")]
    UnknownGroup { group: String },

    #[error("a full name (first + last) is required, got {name:?}")]
    IncompleteName { name: String },

    #[error("{student} is listed in both {first_group} and {second_group}")]
    DuplicateStudent {
        student: String,
        first_group: String,
        second_group: String,
    },

    #[error("round has no assigned students")]
    EmptyRound,

    #[error("invalid configuration: {field} ({reason})")]
    InvalidConfig { field: String, reason: String },
}

/// Failures surfaced by placement and balancing.
#[derive(Error, Debug, Clone)]
pub enum BalanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{student} is already listed in {group}")]
    DuplicateAssignment { student: String, group: String },

    #[error("{group} is full ({capacity} students)")]
    CapacityExceeded { group: String, capacity: usize },

    #[error("{student} already did {group} in a previous round")]
    HistoryConflict { student: String, group: String },

    /// Size repair could not bring `group` inside the size band without
    /// breaking the history constraint. `partial` is the best-effort roster.
    #[error(
        "could not bring {group} to {min}..={max} students (size {size}){}",
        blocked_suffix(.student)
    )]
    OptimizationExhausted {
        group: String,
        size: usize,
        min: usize,
        max: usize,
        student: Option<String>,
        partial: Box<Roster>,
    },
}

fn blocked_suffix(student: &Option<String>) -> String {
    match student {
        Some(name) => format!("; {} cannot move without repeating a project", name),
        None => String::new(),
    }
}

impl BalanceError {
    /// Short machine-friendly kind, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::DuplicateAssignment { .. } => "duplicate_assignment",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::HistoryConflict { .. } => "history_conflict",
            Self::OptimizationExhausted { .. } => "optimization_exhausted",
        }
    }
}

pub type BalanceResult<T> = Result<T, BalanceError>;
