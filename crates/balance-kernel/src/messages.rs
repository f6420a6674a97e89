//! Message types for acton-reactive actor communication.
//!
//! Requests carry a request id (via mti) so callers can match the outcome
//! the round actor sends to its observer.

use acton_reactive::prelude::ActorHandle;

use crate::error::BalanceError;
use crate::history::PastAssignment;
use crate::model::Roster;
use crate::placement::PlacementReceipt;
use crate::round::ClosedRound;

/// Place one student into a group of the open round.
#[derive(Debug, Clone)]
pub struct PlaceStudent {
    pub request_id: String,
    pub student: String,
    pub group: String,
}

/// Balance and archive the open round, then open the next one.
#[derive(Debug, Clone)]
pub struct CloseRound {
    pub request_id: String,
    /// Seed for the engine's RNG
    pub seed: u64,
}

/// Ask for a copy of the open roster.
#[derive(Debug, Clone)]
pub struct QueryRoster {
    pub request_id: String,
}

/// Register the actor that receives every outcome.
#[derive(Debug, Clone)]
pub struct RegisterRoundObserver {
    pub handle: ActorHandle,
}

#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    pub request_id: String,
    pub result: Result<PlacementReceipt, BalanceError>,
}

#[derive(Debug, Clone)]
pub struct CloseOutcome {
    pub request_id: String,
    pub result: Result<ClosedRound, BalanceError>,
}

#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub request_id: String,
    pub round_id: String,
    pub label: String,
    pub roster: Roster,
    pub history: Vec<PastAssignment>,
}

/// Any outcome, as delivered to the observer channel.
#[derive(Debug, Clone)]
pub enum RoundEvent {
    Placement(PlacementOutcome),
    Close(CloseOutcome),
    Roster(RosterSnapshot),
}

impl RoundEvent {
    pub fn request_id(&self) -> &str {
        match self {
            Self::Placement(o) => &o.request_id,
            Self::Close(o) => &o.request_id,
            Self::Roster(s) => &s.request_id,
        }
    }
}
