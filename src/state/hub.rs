use std::collections::HashMap;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sender half of a connection's outbound channel.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// Per-room fanout table: the only path messages take to subscribers.
///
/// The registry never pushes to clients directly; every broadcast goes
/// through here.
#[derive(Default)]
pub struct RoomHub {
    channels: DashMap<String, HashMap<Uuid, ConnectionSender>>,
}

impl RoomHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a room's channel.
    pub fn join(&self, room_id: &str, conn: Uuid, sender: ConnectionSender) {
        self.channels
            .entry(room_id.to_string())
            .or_default()
            .insert(conn, sender);
    }

    /// Remove a connection from one room's channel.
    pub fn leave(&self, room_id: &str, conn: Uuid) {
        if let Some(mut entry) = self.channels.get_mut(room_id) {
            entry.remove(&conn);
        }
    }

    /// Remove a connection from every channel it joined.
    pub fn drop_connection(&self, conn: Uuid) {
        for mut entry in self.channels.iter_mut() {
            entry.remove(&conn);
        }
    }

    /// Drop a room's channel entirely (the room was deleted).
    pub fn remove_room(&self, room_id: &str) {
        self.channels.remove(room_id);
    }

    /// Push a message to every subscriber of a room, pruning dead senders.
    pub fn broadcast(&self, room_id: &str, message: Message) {
        if let Some(mut entry) = self.channels.get_mut(room_id) {
            entry.retain(|_, sender| sender.send(message.clone()).is_ok());
        }
    }

    /// Number of connections currently subscribed to a room.
    pub fn subscriber_count(&self, room_id: &str) -> usize {
        self.channels
            .get(room_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}
