use serde::{Deserialize, Serialize};

/// Durable snapshot of a room, written as one flat document per room.
///
/// The wire shape mirrors the broadcast snapshot: absence of the document or
/// a malformed document is treated as "no prior state", never as an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRecord {
    /// Opaque room identifier.
    pub id: String,
    /// Participants in turn-display order.
    pub players: Vec<PlayerRecord>,
    /// Letters already crossed off, in crossing order.
    pub crossed: Vec<String>,
    /// Turn rotation as a sequence of player ids.
    pub order: Vec<String>,
    /// Id of the player whose turn it is, or empty for an empty room.
    pub current: String,
}

/// Per-player slice of a durable room snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Stable identity from the external identity provider.
    pub id: String,
    /// Display name, opaque to the coordinator.
    pub name: String,
    /// Avatar reference, opaque to the coordinator.
    #[serde(default)]
    pub avatar: String,
    /// Elapsed seconds accrued so far.
    pub timer: u64,
    /// Whether the timer was running when the snapshot was taken.
    pub running: bool,
    /// Presence flag at snapshot time.
    pub online: bool,
}
