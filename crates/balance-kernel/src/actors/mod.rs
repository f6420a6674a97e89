//! Acton-reactive actors for serialized access to an open round.
//!
//! ```text
//! RoundClient
//!   ├─ PlaceStudent (request_id) → RoundActor (mutate_on, one at a time)
//!   ├─ CloseRound (request_id)   → RoundActor (mutate_on)
//!   └─ QueryRoster (request_id)  → RoundActor (act_on)
//!         └─ PlacementOutcome | CloseOutcome | RosterSnapshot → RoundObserver → mpsc
//! ```
//!
//! The round actor is the only writer of its round, so placements and closes
//! never interleave.

mod client;
mod observer;
mod round_actor;

pub use client::{RoundClient, RoundClientError};
pub use observer::{RoundObserver, RoundObserverState};
pub use round_actor::{RoundActor, RoundActorState};
