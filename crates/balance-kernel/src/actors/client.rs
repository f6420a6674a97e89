//! RoundClient: request/response calls over the round actor.

use std::sync::Arc;
use std::time::Duration;

use acton_reactive::prelude::*;
use mti::prelude::*;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

use crate::actors::{RoundActor, RoundObserver};
use crate::directory::StudentDirectory;
use crate::error::BalanceError;
use crate::messages::{CloseRound, PlaceStudent, QueryRoster, RegisterRoundObserver, RosterSnapshot, RoundEvent};
use crate::placement::PlacementReceipt;
use crate::round::{ClosedRound, Round};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug, Clone)]
pub enum RoundClientError {
    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error("round observer channel closed")]
    ChannelClosed,

    #[error("no response for request {request_id} within {timeout:?}")]
    Timeout { request_id: String, timeout: Duration },
}

/// Handle to a spawned round actor plus the channel its outcomes arrive on.
///
/// Calls take `&mut self`, so one client has at most one request in flight.
pub struct RoundClient {
    handle: ActorHandle,
    events: mpsc::Receiver<RoundEvent>,
    timeout: Duration,
}

impl RoundClient {
    /// Spawn a round actor and its observer.
    pub async fn spawn(runtime: &mut ActorRuntime, round: Round, directory: Arc<dyn StudentDirectory>) -> Self {
        let (tx, events) = mpsc::channel::<RoundEvent>(64);
        let observer = RoundObserver::new(tx).spawn(runtime).await;
        let handle = RoundActor::new(round, directory).spawn(runtime).await;
        handle.send(RegisterRoundObserver { handle: observer }).await;

        Self {
            handle,
            events,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn handle(&self) -> &ActorHandle {
        &self.handle
    }

    pub async fn place(&mut self, student: &str, group: &str) -> Result<PlacementReceipt, RoundClientError> {
        let request_id = "place".create_type_id::<V7>().to_string();
        self.handle
            .send(PlaceStudent {
                request_id: request_id.clone(),
                student: student.to_string(),
                group: group.to_string(),
            })
            .await;

        match self.wait_for(&request_id).await? {
            RoundEvent::Placement(outcome) => Ok(outcome.result?),
            _ => Err(RoundClientError::ChannelClosed),
        }
    }

    pub async fn close(&mut self, seed: u64) -> Result<ClosedRound, RoundClientError> {
        let request_id = "close".create_type_id::<V7>().to_string();
        self.handle
            .send(CloseRound {
                request_id: request_id.clone(),
                seed,
            })
            .await;

        match self.wait_for(&request_id).await? {
            RoundEvent::Close(outcome) => Ok(outcome.result?),
            _ => Err(RoundClientError::ChannelClosed),
        }
    }

    pub async fn roster(&mut self) -> Result<RosterSnapshot, RoundClientError> {
        let request_id = "roster".create_type_id::<V7>().to_string();
        self.handle
            .send(QueryRoster {
                request_id: request_id.clone(),
            })
            .await;

        match self.wait_for(&request_id).await? {
            RoundEvent::Roster(snapshot) => Ok(snapshot),
            _ => Err(RoundClientError::ChannelClosed),
        }
    }

    async fn wait_for(&mut self, request_id: &str) -> Result<RoundEvent, RoundClientError> {
        let timeout = self.timeout;
        let wait = async {
            while let Some(event) = self.events.recv().await {
                if event.request_id() == request_id {
                    return Ok(event);
                }
                trace!(expected = request_id, got = event.request_id(), "Skipping stale round event");
            }
            Err(RoundClientError::ChannelClosed)
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| RoundClientError::Timeout {
                request_id: request_id.to_string(),
                timeout,
            })?
    }
}
