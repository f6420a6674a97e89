//! RoundActor: single writer for one open round.
//!
//! Placements and closes are `mutate_on` handlers, so they run one at a time
//! in mailbox order. Roster queries are read-only and use `act_on`.

use std::sync::Arc;

use acton_reactive::prelude::*;
use tracing::{debug, error, info};

use crate::directory::StudentDirectory;
use crate::messages::{
    CloseOutcome, CloseRound, PlaceStudent, PlacementOutcome, QueryRoster, RegisterRoundObserver,
    RosterSnapshot,
};
use crate::round::Round;

/// Actor state for RoundActor.
#[derive(Default, Clone)]
pub struct RoundActorState {
    round: Option<Round>,
    directory: Option<Arc<dyn StudentDirectory>>,
    observer: Option<ActorHandle>,
}

impl std::fmt::Debug for RoundActorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundActorState")
            .field("round", &self.round.as_ref().map(|r| r.id()))
            .field("directory", &self.directory.as_ref().map(|d| d.len()))
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Owns a [`Round`] and the directory used to resolve placements.
pub struct RoundActor {
    pub round: Round,
    pub directory: Arc<dyn StudentDirectory>,
}

impl RoundActor {
    pub fn new(round: Round, directory: Arc<dyn StudentDirectory>) -> Self {
        Self { round, directory }
    }

    /// Spawn this round actor in the given runtime.
    pub async fn spawn(self, runtime: &mut ActorRuntime) -> ActorHandle {
        let mut actor =
            runtime.new_actor_with_name::<RoundActorState>(format!("Round:{}", self.round.label()));

        actor.model.round = Some(self.round);
        actor.model.directory = Some(self.directory);

        configure_handlers(&mut actor);

        actor.start().await
    }
}

fn configure_handlers(actor: &mut ManagedActor<Idle, RoundActorState>) {
    actor.mutate_on::<RegisterRoundObserver>(|actor, context| {
        actor.model.observer = Some(context.message().handle.clone());
        debug!("Registered round observer");
        Reply::ready()
    });

    actor.mutate_on::<PlaceStudent>(|actor, context| {
        let msg = context.message().clone();
        let directory = actor.model.directory.clone();

        let (Some(round), Some(directory)) = (actor.model.round.as_mut(), directory) else {
            error!("RoundActor: round not initialized");
            return Reply::ready();
        };

        let result = round.place(directory.as_ref(), &msg.student, &msg.group);
        let outcome = PlacementOutcome {
            request_id: msg.request_id,
            result,
        };

        match actor.model.observer.clone() {
            Some(observer) => Reply::pending(async move {
                observer.send(outcome).await;
            }),
            None => Reply::ready(),
        }
    });

    actor.mutate_on::<CloseRound>(|actor, context| {
        let msg = context.message().clone();

        let Some(round) = actor.model.round.as_mut() else {
            error!("RoundActor: round not initialized");
            return Reply::ready();
        };

        info!(round = %round.id(), seed = msg.seed, "Closing round");
        let result = round.close(msg.seed);
        if let Err(e) = &result {
            info!(kind = e.kind(), error = %e, "Round close failed");
        }
        let outcome = CloseOutcome {
            request_id: msg.request_id,
            result,
        };

        match actor.model.observer.clone() {
            Some(observer) => Reply::pending(async move {
                observer.send(outcome).await;
            }),
            None => Reply::ready(),
        }
    });

    actor.act_on::<QueryRoster>(|actor, context| {
        let request_id = context.message().request_id.clone();

        let Some(round) = actor.model.round.as_ref() else {
            error!("RoundActor: round not initialized");
            return Reply::ready();
        };

        let snapshot = RosterSnapshot {
            request_id,
            round_id: round.id().to_string(),
            label: round.label().to_string(),
            roster: round.roster().clone(),
            history: round.history().to_records(),
        };

        match actor.model.observer.clone() {
            Some(observer) => Reply::pending(async move {
                observer.send(snapshot).await;
            }),
            None => Reply::ready(),
        }
    });
}
