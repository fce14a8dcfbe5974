//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted room identifier.
const MAX_ROOM_ID_LENGTH: usize = 64;
/// Longest accepted player identifier.
const MAX_PLAYER_ID_LENGTH: usize = 128;

/// Validates that a room id is a non-empty, whitespace-free opaque code.
///
/// Room codes are provisioned elsewhere; the coordinator only rejects shapes
/// that could not have come from the provisioner.
pub fn validate_room_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_ROOM_ID_LENGTH {
        let mut err = ValidationError::new("room_id_length");
        err.message = Some(
            format!(
                "room id must be between 1 and {} bytes (got {})",
                MAX_ROOM_ID_LENGTH,
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("room_id_format");
        err.message = Some("room id must not contain whitespace".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a player id is a non-empty, whitespace-free identity token.
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_PLAYER_ID_LENGTH {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(
            format!(
                "player id must be between 1 and {} bytes (got {})",
                MAX_PLAYER_ID_LENGTH,
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("player_id_format");
        err.message = Some("player id must not contain whitespace".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_id_valid() {
        assert!(validate_room_id("R1").is_ok());
        assert!(validate_room_id("room-42_x").is_ok());
    }

    #[test]
    fn test_validate_room_id_invalid() {
        assert!(validate_room_id("").is_err());
        assert!(validate_room_id("has space").is_err());
        assert!(validate_room_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_player_id_valid() {
        assert!(validate_player_id("user-abc123").is_ok());
    }

    #[test]
    fn test_validate_player_id_invalid() {
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("tab\there").is_err());
        assert!(validate_player_id(&"x".repeat(129)).is_err());
    }
}
