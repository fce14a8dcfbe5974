//! Turn/order command handling: binds inbound room commands to the registry,
//! the timer subsystem, persistence, and the fanout hub.
//!
//! Every handler follows the same sequencing: mutate under the room lock,
//! fire the durable write in the background, then broadcast the resulting
//! snapshot exactly once. Commands referencing unknown rooms or players are
//! dropped silently; clients are untrusted and may be stale.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::models::RoomRecord,
    dto::{room::RoomSnapshot, ws::PlayerInput},
    services::{room_events, timer_service},
    state::{
        SharedState,
        hub::ConnectionSender,
        room::{CrossOutcome, Room},
    },
};

/// Everything a finished mutation produces: the broadcast snapshot and the
/// record for the durable write, both taken under the same lock.
struct Mutation {
    snapshot: RoomSnapshot,
    record: RoomRecord,
}

fn mutation(room: &Room) -> Mutation {
    Mutation {
        snapshot: RoomSnapshot::from(room),
        record: RoomRecord::from(room),
    }
}

/// Enter a room: subscribe the connection, restore the room from the durable
/// store on first reference, then add or reconnect the player.
pub async fn join_room(
    state: &SharedState,
    conn: Uuid,
    sender: ConnectionSender,
    room_id: &str,
    player: PlayerInput,
) {
    state.hub().join(room_id, conn, sender);

    if !state.rooms().contains(room_id) {
        restore_room(state, room_id).await;
    }

    let name = player.name.clone();
    let (fresh, m) = state
        .with_room_mut(room_id, |room| {
            let fresh = room.join(player, conn);
            (fresh, mutation(room))
        })
        .await;

    persist_room(state, m.record);
    room_events::broadcast_room_update(state, room_id, m.snapshot);
    if fresh {
        room_events::broadcast_toast(state, room_id, format!("{name} joined the room"));
    }
}

/// Leave a room: unsubscribe the connection and remove the player.
pub async fn leave_room(state: &SharedState, conn: Uuid, room_id: &str, player_id: &str) {
    state.hub().leave(room_id, conn);
    remove_player(state, room_id, player_id).await;
}

/// Remove another participant. The kicked player's connection stays
/// subscribed, so they see the state they were removed from.
pub async fn kick_player(state: &SharedState, room_id: &str, player_id: &str) {
    remove_player(state, room_id, player_id).await;
}

/// Cross a letter off; the rotation advances and tick ownership follows.
pub async fn cross_letter(state: &SharedState, room_id: &str, letter: &str) {
    if !state.config().contains_letter(letter) {
        debug!(room_id = %room_id, letter = %letter, "cross of letter outside the alphabet ignored");
        return;
    }

    let result = state
        .with_existing_room(room_id, |room| match room.cross(letter) {
            CrossOutcome::Unchanged => None,
            CrossOutcome::Crossed => Some((None, mutation(room))),
            CrossOutcome::Advanced(handoff) => Some((Some(handoff), mutation(room))),
        })
        .await
        .flatten();

    let Some((handoff, m)) = result else {
        return;
    };

    if let Some(handoff) = &handoff {
        timer_service::swap(state, room_id, handoff);
    }
    persist_room(state, m.record);
    room_events::broadcast_room_update(state, room_id, m.snapshot);
}

/// Take a crossed letter back.
pub async fn uncross_letter(state: &SharedState, room_id: &str, letter: &str) {
    let result = state
        .with_existing_room(room_id, |room| {
            room.uncross(letter).then(|| mutation(room))
        })
        .await
        .flatten();

    let Some(m) = result else {
        return;
    };
    persist_room(state, m.record);
    room_events::broadcast_room_update(state, room_id, m.snapshot);
}

/// Hand the turn over explicitly; stale or forged requests are dropped.
pub async fn pass_turn(state: &SharedState, room_id: &str, from_id: &str, to_id: &str) {
    let result = state
        .with_existing_room(room_id, |room| {
            room.pass_turn(from_id, to_id).then(|| mutation(room))
        })
        .await
        .flatten();

    let Some(m) = result else {
        debug!(room_id = %room_id, from_id = %from_id, to_id = %to_id, "turn pass dropped");
        return;
    };
    persist_room(state, m.record);
    room_events::broadcast_room_update(state, room_id, m.snapshot);
}

/// Replace the turn rotation; sequences that are not a permutation of the
/// current member ids are dropped.
pub async fn reorder(state: &SharedState, room_id: &str, order: Vec<String>) {
    let result = state
        .with_existing_room(room_id, |room| room.reorder(order).then(|| mutation(room)))
        .await
        .flatten();

    let Some(m) = result else {
        debug!(room_id = %room_id, "reorder dropped: not a permutation of member ids");
        return;
    };
    persist_room(state, m.record);
    room_events::broadcast_room_update(state, room_id, m.snapshot);
}

/// Begin the training: start the current player's timer and announce it.
pub async fn start_training(state: &SharedState, room_id: &str) {
    let current = state
        .with_existing_room(room_id, |room| {
            if room.current.is_empty() {
                None
            } else {
                let name = room.player(&room.current).map(|p| p.name.clone());
                Some((room.current.clone(), name))
            }
        })
        .await
        .flatten();

    let Some((current, name)) = current else {
        return;
    };

    timer_service::start(state, room_id, &current).await;
    let Some(m) = state
        .with_existing_room(room_id, |room| mutation(room))
        .await
    else {
        return;
    };

    persist_room(state, m.record);
    if let Some(name) = name {
        room_events::broadcast_toast(state, room_id, format!("{name} started the training"));
    }
    room_events::broadcast_room_update(state, room_id, m.snapshot);
}

/// Start a player's timer on request.
pub async fn start_timer(state: &SharedState, room_id: &str, player_id: &str) {
    if !timer_service::start(state, room_id, player_id).await {
        return;
    }
    finish_timer_command(state, room_id).await;
}

/// Pause a player's timer on request, with a toast for the other viewers.
pub async fn pause_timer(state: &SharedState, room_id: &str, player_id: &str) {
    if !timer_service::pause(state, room_id, player_id).await {
        return;
    }
    let name = state
        .with_existing_room(room_id, |room| {
            room.player(player_id).map(|p| p.name.clone())
        })
        .await
        .flatten();
    if let Some(name) = name {
        room_events::broadcast_toast(state, room_id, format!("{name} paused their timer"));
    }
    finish_timer_command(state, room_id).await;
}

/// Pause and zero a player's timer on request.
pub async fn reset_timer(state: &SharedState, room_id: &str, player_id: &str) {
    if !timer_service::reset(state, room_id, player_id).await {
        return;
    }
    finish_timer_command(state, room_id).await;
}

/// Presence sweep after a dropped connection: every player bound to `conn`,
/// in every room, goes offline. Their timers deliberately keep accruing.
pub async fn handle_disconnect(state: &SharedState, conn: Uuid) {
    state.hub().drop_connection(conn);

    for room_id in state.rooms().ids() {
        let changed = state
            .with_existing_room(&room_id, |room| {
                room.mark_offline(conn).then(|| mutation(room))
            })
            .await
            .flatten();

        if let Some(m) = changed {
            persist_room(state, m.record);
            room_events::broadcast_room_update(state, &room_id, m.snapshot);
        }
    }
}

/// Shared removal path for `leave` and `kick`.
async fn remove_player(state: &SharedState, room_id: &str, player_id: &str) {
    let result = state
        .with_existing_room(room_id, |room| {
            if !room.remove_player(player_id) {
                return None;
            }
            let emptied = room.is_empty();
            if emptied {
                // Drop the registry entry while the room lock is still held,
                // so no command can slip into the doomed room in between.
                state.rooms().remove(room_id);
            }
            Some((emptied, mutation(room)))
        })
        .await
        .flatten();

    let Some((emptied, m)) = result else {
        debug!(room_id = %room_id, player_id = %player_id, "removal of unknown player ignored");
        return;
    };

    timer_service::cancel(state, player_id);

    if emptied {
        delete_room_record(state, room_id);
        room_events::broadcast_room_update(state, room_id, m.snapshot);
        state.hub().remove_room(room_id);
    } else {
        persist_room(state, m.record);
        room_events::broadcast_room_update(state, room_id, m.snapshot);
    }
}

/// Snapshot and announce the room after a timer command.
async fn finish_timer_command(state: &SharedState, room_id: &str) {
    let Some(m) = state
        .with_existing_room(room_id, |room| mutation(room))
        .await
    else {
        return;
    };
    persist_room(state, m.record);
    room_events::broadcast_room_update(state, room_id, m.snapshot);
}

/// Load the durable snapshot for a room into the registry, if one exists.
///
/// Only called when the registry has no entry: while the process lives, the
/// in-memory state is the source of truth and is never overwritten by disk.
async fn restore_room(state: &SharedState, room_id: &str) {
    let Some(store) = state.room_store().await else {
        return;
    };

    match store.find_room(room_id.to_string()).await {
        Ok(Some(record)) => {
            debug!(room_id = %room_id, "restored room from durable store");
            state.rooms().install(Room::from(record));
        }
        Ok(None) => {}
        Err(err) => {
            warn!(room_id = %room_id, error = %err, "failed to load room snapshot");
        }
    }
}

/// Write the room snapshot out in the background.
///
/// Broadcasting never waits on persistence; a failed write costs durability,
/// not liveness.
fn persist_room(state: &SharedState, record: RoomRecord) {
    let state = state.clone();
    tokio::spawn(async move {
        let Some(store) = state.room_store().await else {
            debug!(room_id = %record.id, "skipping persistence (degraded mode)");
            return;
        };
        let room_id = record.id.clone();
        if let Err(err) = store.save_room(record).await {
            warn!(room_id = %room_id, error = %err, "failed to persist room snapshot");
        }
    });
}

/// Remove the durable record for a deleted room in the background.
fn delete_room_record(state: &SharedState, room_id: &str) {
    let state = state.clone();
    let room_id = room_id.to_string();
    tokio::spawn(async move {
        let Some(store) = state.room_store().await else {
            return;
        };
        if let Err(err) = store.delete_room(room_id.clone()).await {
            warn!(room_id = %room_id, error = %err, "failed to delete room snapshot");
        }
    });
}
