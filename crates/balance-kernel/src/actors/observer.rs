//! RoundObserver: forwards round outcomes into a tokio channel.

use acton_reactive::prelude::*;
use tokio::sync::mpsc;

use crate::messages::{CloseOutcome, PlacementOutcome, RosterSnapshot, RoundEvent};

#[derive(Default, Clone, Debug)]
pub struct RoundObserverState {
    tx: Option<mpsc::Sender<RoundEvent>>,
}

pub struct RoundObserver {
    tx: mpsc::Sender<RoundEvent>,
}

impl RoundObserver {
    pub fn new(tx: mpsc::Sender<RoundEvent>) -> Self {
        Self { tx }
    }

    pub async fn spawn(self, runtime: &mut ActorRuntime) -> ActorHandle {
        let mut actor = runtime.new_actor_with_name::<RoundObserverState>("RoundObserver".to_string());
        actor.model.tx = Some(self.tx);

        actor.act_on::<PlacementOutcome>(|actor, context| {
            let event = RoundEvent::Placement(context.message().clone());
            let tx = actor.model.tx.clone();
            Reply::pending(async move {
                if let Some(tx) = tx {
                    let _ = tx.send(event).await;
                }
            })
        });

        actor.act_on::<CloseOutcome>(|actor, context| {
            let event = RoundEvent::Close(context.message().clone());
            let tx = actor.model.tx.clone();
            Reply::pending(async move {
                if let Some(tx) = tx {
                    let _ = tx.send(event).await;
                }
            })
        });

        actor.act_on::<RosterSnapshot>(|actor, context| {
            let event = RoundEvent::Roster(context.message().clone());
            let tx = actor.model.tx.clone();
            Reply::pending(async move {
                if let Some(tx) = tx {
                    let _ = tx.send(event).await;
                }
            })
        });

        actor.start().await
    }
}
