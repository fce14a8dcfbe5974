use axum::extract::ws::Message;
use tracing::warn;

use crate::{
    dto::{room::RoomSnapshot, ws::ServerMessage},
    state::SharedState,
};

/// Push the authoritative snapshot to every subscriber of a room.
///
/// This is the single broadcast entry point: commands and timer ticks alike
/// announce state changes through here.
pub fn broadcast_room_update(state: &SharedState, room_id: &str, snapshot: RoomSnapshot) {
    send_room_event(state, room_id, &ServerMessage::RoomUpdate { room: snapshot });
}

/// Push an ephemeral toast notification; best-effort, never authoritative.
pub fn broadcast_toast(state: &SharedState, room_id: &str, message: impl Into<String>) {
    send_room_event(
        state,
        room_id,
        &ServerMessage::Toast {
            message: message.into(),
        },
    );
}

fn send_room_event(state: &SharedState, room_id: &str, payload: &ServerMessage) {
    match serde_json::to_string(payload) {
        Ok(text) => state.hub().broadcast(room_id, Message::Text(text.into())),
        Err(err) => warn!(room_id = %room_id, error = %err, "failed to serialize room event"),
    }
}
