use serde::Serialize;
use utoipa::ToSchema;

use crate::state::room::{Player, Room};

/// Full authoritative room state, pushed to every subscriber after a change.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSnapshot {
    /// Opaque room identifier.
    pub id: String,
    /// Participants in insertion order.
    pub players: Vec<PlayerSnapshot>,
    /// Letters already crossed off, in crossing order.
    pub crossed: Vec<String>,
    /// Turn rotation as a sequence of player ids.
    pub order: Vec<String>,
    /// Id of the player whose turn it is, or empty for an empty room.
    pub current: String,
}

/// Per-player slice of a room snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSnapshot {
    /// Stable player identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    pub avatar: String,
    /// Elapsed seconds accrued so far.
    pub timer: u64,
    /// Whether the player's timer is currently ticking.
    pub running: bool,
    /// Whether the player has a live connection.
    pub online: bool,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            players: room.players.values().map(PlayerSnapshot::from).collect(),
            crossed: room.crossed.iter().cloned().collect(),
            order: room.order.clone(),
            current: room.current.clone(),
        }
    }
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            avatar: player.avatar.clone(),
            timer: player.timer,
            running: player.running,
            online: player.online,
        }
    }
}
