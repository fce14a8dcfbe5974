//! Per-player timer subsystem: one cancellable 1-second tick task per player.
//!
//! Every viewer's displayed time stays authoritative because each tick
//! broadcasts the full room state, instead of clients counting down locally.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::debug;

use crate::{
    dto::room::RoomSnapshot,
    services::room_events,
    state::{SharedState, room::TurnHandoff},
};

/// Fixed tick cadence shared by every player timer.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Mark a player's timer running and install a fresh tick task for them.
///
/// Any pre-existing handle for the same player id is cancelled first, so at
/// most one tick source exists per player at any instant. Unknown players
/// are ignored. Returns whether a timer was started.
pub async fn start(state: &SharedState, room_id: &str, player_id: &str) -> bool {
    let marked = state
        .with_existing_room(room_id, |room| match room.player_mut(player_id) {
            Some(player) => {
                player.running = true;
                true
            }
            None => false,
        })
        .await
        .unwrap_or(false);

    if !marked {
        debug!(room_id = %room_id, player_id = %player_id, "timer start for unknown player ignored");
        return false;
    }

    cancel(state, player_id);
    install(state, player_id, spawn_tick(state, room_id, player_id));
    true
}

/// Stop a player's timer. Returns false when the player is unknown.
pub async fn pause(state: &SharedState, room_id: &str, player_id: &str) -> bool {
    cancel(state, player_id);
    state
        .with_existing_room(room_id, |room| match room.player_mut(player_id) {
            Some(player) => {
                player.running = false;
                true
            }
            None => false,
        })
        .await
        .unwrap_or(false)
}

/// Pause and zero a player's timer. Returns false when the player is unknown.
pub async fn reset(state: &SharedState, room_id: &str, player_id: &str) -> bool {
    if !pause(state, room_id, player_id).await {
        return false;
    }
    state
        .with_existing_room(room_id, |room| {
            if let Some(player) = room.player_mut(player_id) {
                player.timer = 0;
            }
        })
        .await;
    true
}

/// Swap tick ownership after a turn handoff: the outgoing player's task is
/// cancelled and a fresh one starts for the incoming player.
///
/// The running flags were already flipped by the room mutation; only the
/// handles move here.
pub fn swap(state: &SharedState, room_id: &str, handoff: &TurnHandoff) {
    cancel(state, &handoff.previous);
    install(state, &handoff.next, spawn_tick(state, room_id, &handoff.next));
}

/// Cancel the live tick task for a player, if any.
///
/// Also called when a player is removed, so no orphaned task keeps mutating
/// a stale or deleted room.
pub fn cancel(state: &SharedState, player_id: &str) {
    if let Some((_, handle)) = state.timers().remove(player_id) {
        handle.abort();
    }
}

fn install(state: &SharedState, player_id: &str, handle: JoinHandle<()>) {
    if let Some(previous) = state.timers().insert(player_id.to_string(), handle) {
        previous.abort();
    }
}

/// Spawn the periodic increment task for one player.
///
/// Each tick re-reads the player by id from the registry, so membership
/// changes and durable loads are picked up immediately; the task exits on
/// its own when the room or player disappears or the running flag clears.
fn spawn_tick(state: &SharedState, room_id: &str, player_id: &str) -> JoinHandle<()> {
    let state = state.clone();
    let room_id = room_id.to_string();
    let player_id = player_id.to_string();
    // Anchor the cadence at the start command, not at the task's first poll.
    let mut ticks = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    tokio::spawn(async move {
        loop {
            ticks.tick().await;
            let snapshot = state
                .with_existing_room(&room_id, |room| {
                    let player = room.player_mut(&player_id)?;
                    if !player.running {
                        return None;
                    }
                    player.timer += 1;
                    Some(RoomSnapshot::from(&*room))
                })
                .await
                .flatten();

            match snapshot {
                Some(snapshot) => room_events::broadcast_room_update(&state, &room_id, snapshot),
                None => break,
            }
        }
    })
}
