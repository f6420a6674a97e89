//! Snapshot workflows driven through the round actor.
//!
//! Each call launches an actor runtime, spawns a round actor for the
//! snapshot, performs one request, reads the roster back, and shuts the
//! runtime down.

use std::sync::Arc;

use acton_reactive::prelude::*;
use anyhow::{Context, Result};
use tracing::info;

use balance_kernel::messages::RosterSnapshot;
use balance_kernel::{BalanceConfig, ClosedRound, PlacementReceipt, RoundClient, StudentDirectory};

use crate::store::RoundSnapshot;

/// Close the snapshot's round. Returns the close result and the snapshot of
/// the round that opens next.
pub async fn close_round(
    snapshot: &RoundSnapshot,
    config: BalanceConfig,
    seed: u64,
) -> Result<(ClosedRound, RoundSnapshot)> {
    let mut runtime = ActonApp::launch_async().await;
    let mut client = spawn_client(&mut runtime, snapshot, config).await;

    let outcome = client.close(seed).await;
    let next = if outcome.is_ok() {
        Some(client.roster().await)
    } else {
        None
    };
    runtime.shutdown_all().await.context("shutting down actor runtime")?;

    let closed = outcome.with_context(|| format!("closing round {}", snapshot.label))?;
    let next = next
        .transpose()
        .context("reading the next round")?
        .context("next round missing")?;
    info!(closed = %closed.closed_id, next = %closed.next_id, "Round closed through actor");

    Ok((closed, to_snapshot(next, snapshot)))
}

/// Place one student. Returns the receipt and the updated snapshot.
pub async fn place_student(
    snapshot: &RoundSnapshot,
    config: BalanceConfig,
    student: &str,
    group: &str,
) -> Result<(PlacementReceipt, RoundSnapshot)> {
    let mut runtime = ActonApp::launch_async().await;
    let mut client = spawn_client(&mut runtime, snapshot, config).await;

    let outcome = client.place(student, group).await;
    let roster = client.roster().await;
    runtime.shutdown_all().await.context("shutting down actor runtime")?;

    let receipt = outcome.with_context(|| format!("placing {student} into {group}"))?;
    let roster = roster.context("reading the roster")?;
    Ok((receipt, to_snapshot(roster, snapshot)))
}

async fn spawn_client(
    runtime: &mut ActorRuntime,
    snapshot: &RoundSnapshot,
    config: BalanceConfig,
) -> RoundClient {
    let directory: Arc<dyn StudentDirectory> = Arc::new(snapshot.to_directory());
    RoundClient::spawn(runtime, snapshot.to_round(config), directory).await
}

fn to_snapshot(roster: RosterSnapshot, previous: &RoundSnapshot) -> RoundSnapshot {
    RoundSnapshot::new(
        &roster.label,
        &roster.roster,
        roster.history,
        previous.directory.clone(),
    )
}
