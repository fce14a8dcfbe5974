use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        room::RoomSnapshot,
        validation::{validate_player_id, validate_room_id},
    },
    error::ServiceError,
};

/// Identity payload a participant presents when joining a room.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlayerInput {
    /// Stable identity from the external identity provider.
    pub id: String,
    /// Display name shown to the other participants.
    pub name: String,
    /// Avatar reference; opaque to the coordinator.
    #[serde(default)]
    pub avatar: String,
}

impl Validate for PlayerInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_id(&self.id) {
            errors.add("id", e);
        }

        if self.name.trim().is_empty() {
            errors.add("name", validator::ValidationError::new("name_empty"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Commands accepted from room WebSocket clients.
///
/// Every command names the room it targets; field names follow the wire
/// protocol of the existing frontend (camelCase).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Enter a room (creating it on first reference) and subscribe to it.
    #[serde(rename = "join", rename_all = "camelCase")]
    Join {
        /// Target room.
        room_id: String,
        /// Identity of the joining participant.
        player: PlayerInput,
    },
    /// Leave a room; the room is deleted when its last player leaves.
    #[serde(rename = "leave", rename_all = "camelCase")]
    Leave {
        /// Target room.
        room_id: String,
        /// Player leaving the room.
        player_id: String,
    },
    /// Cross a letter off, handing the turn to the next player in order.
    #[serde(rename = "cross", rename_all = "camelCase")]
    Cross {
        /// Target room.
        room_id: String,
        /// Alphabet letter to mark.
        letter: String,
    },
    /// Take a crossed letter back; no turn side effects.
    #[serde(rename = "uncross", rename_all = "camelCase")]
    Uncross {
        /// Target room.
        room_id: String,
        /// Alphabet letter to unmark.
        letter: String,
    },
    /// Start a player's elapsed-time counter.
    #[serde(rename = "timer:start", rename_all = "camelCase")]
    TimerStart {
        /// Target room.
        room_id: String,
        /// Player whose timer starts.
        player_id: String,
    },
    /// Pause a player's elapsed-time counter.
    #[serde(rename = "timer:pause", rename_all = "camelCase")]
    TimerPause {
        /// Target room.
        room_id: String,
        /// Player whose timer pauses.
        player_id: String,
    },
    /// Pause and zero a player's elapsed-time counter.
    #[serde(rename = "timer:reset", rename_all = "camelCase")]
    TimerReset {
        /// Target room.
        room_id: String,
        /// Player whose timer resets.
        player_id: String,
    },
    /// Hand the turn from the current player to another member.
    #[serde(rename = "turn:pass", rename_all = "camelCase")]
    PassTurn {
        /// Target room.
        room_id: String,
        /// Player claiming to hold the turn.
        from_id: String,
        /// Player the turn is handed to.
        to_id: String,
    },
    /// Remove another participant from the room.
    #[serde(rename = "kick", rename_all = "camelCase")]
    Kick {
        /// Target room.
        room_id: String,
        /// Player being removed.
        player_id: String,
    },
    /// Replace the turn rotation with a reordered sequence of player ids.
    #[serde(rename = "order", rename_all = "camelCase")]
    Reorder {
        /// Target room.
        room_id: String,
        /// New rotation; must be a permutation of the current member ids.
        order: Vec<String>,
    },
    /// Begin the training: starts the current player's timer.
    #[serde(rename = "start", rename_all = "camelCase")]
    Start {
        /// Target room.
        room_id: String,
    },
    /// Anything this build does not understand; dropped after logging.
    #[serde(other)]
    Unknown,
}

impl ClientCommand {
    /// Parse a raw text frame and run payload validation where applicable.
    pub fn from_json_str(raw: &str) -> Result<Self, ServiceError> {
        let command: Self = serde_json::from_str(raw)
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

        if let Some(room_id) = command.room_id() {
            validate_room_id(room_id)
                .map_err(|err| ServiceError::InvalidInput(format!("invalid room id: {err}")))?;
        }
        if let ClientCommand::Join { player, .. } = &command {
            player.validate().map_err(|err| {
                ServiceError::InvalidInput(format!("invalid player payload: {err}"))
            })?;
        }

        Ok(command)
    }

    /// The room this command targets, if it targets one.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            Self::Join { room_id, .. }
            | Self::Leave { room_id, .. }
            | Self::Cross { room_id, .. }
            | Self::Uncross { room_id, .. }
            | Self::TimerStart { room_id, .. }
            | Self::TimerPause { room_id, .. }
            | Self::TimerReset { room_id, .. }
            | Self::PassTurn { room_id, .. }
            | Self::Kick { room_id, .. }
            | Self::Reorder { room_id, .. }
            | Self::Start { room_id } => Some(room_id),
            Self::Unknown => None,
        }
    }
}

/// Messages pushed to room subscribers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full authoritative state snapshot for a room.
    #[serde(rename = "room:update")]
    RoomUpdate {
        /// The room's complete state after the change.
        room: RoomSnapshot,
    },
    /// Ephemeral notification for transient UI feedback; not authoritative.
    #[serde(rename = "room:toast")]
    Toast {
        /// Human-readable notification text.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_with_camel_case_fields() {
        let raw = r#"{"type":"join","roomId":"R1","player":{"id":"P1","name":"Ann","avatar":"a.png"}}"#;
        let command = ClientCommand::from_json_str(raw).unwrap();
        match command {
            ClientCommand::Join { room_id, player } => {
                assert_eq!(room_id, "R1");
                assert_eq!(player.id, "P1");
                assert_eq!(player.avatar, "a.png");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_pass_turn_ids() {
        let raw = r#"{"type":"turn:pass","roomId":"R1","fromId":"P1","toId":"P2"}"#;
        let command = ClientCommand::from_json_str(raw).unwrap();
        match command {
            ClientCommand::PassTurn {
                from_id, to_id, ..
            } => {
                assert_eq!(from_id, "P1");
                assert_eq!(to_id, "P2");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_avatar_defaults_to_empty() {
        let raw = r#"{"type":"join","roomId":"R1","player":{"id":"P1","name":"Ann"}}"#;
        let command = ClientCommand::from_json_str(raw).unwrap();
        match command {
            ClientCommand::Join { player, .. } => assert_eq!(player.avatar, ""),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_player_name() {
        let raw = r#"{"type":"join","roomId":"R1","player":{"id":"P1","name":"   "}}"#;
        assert!(ClientCommand::from_json_str(raw).is_err());
    }

    #[test]
    fn rejects_whitespace_room_id() {
        let raw = r#"{"type":"cross","roomId":"R 1","letter":"А"}"#;
        assert!(ClientCommand::from_json_str(raw).is_err());
    }

    #[test]
    fn unknown_command_type_parses_as_unknown() {
        let raw = r#"{"type":"room:restart","roomId":"R1"}"#;
        let command = ClientCommand::from_json_str(raw).unwrap();
        assert!(matches!(command, ClientCommand::Unknown));
    }

    #[test]
    fn server_messages_serialize_with_wire_tags() {
        let toast = ServerMessage::Toast {
            message: "Ann joined the room".into(),
        };
        let json = serde_json::to_string(&toast).unwrap();
        assert!(json.contains(r#""type":"room:toast""#));
    }
}
