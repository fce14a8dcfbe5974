use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::state::room::Room;

/// In-memory authoritative map of room id to live state.
///
/// Each entry carries its own lock; mutation happens synchronously while the
/// lock is held, which serializes commands and timer ticks per room and
/// reproduces the original single-event-loop semantics on a multi-threaded
/// runtime.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Mutex<Room>>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a room, creating an empty one when absent (the join path).
    pub fn get_or_create(&self, room_id: &str) -> Arc<Mutex<Room>> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new(room_id))))
            .value()
            .clone()
    }

    /// Fetch a room without creating it.
    ///
    /// Every command except join goes through here: commands addressing an
    /// unknown room are dropped, never auto-create.
    pub fn get(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Whether a room is currently live.
    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Install a freshly loaded room unless the room came alive meanwhile.
    ///
    /// Loads only run when the registry has no entry; if a concurrent join
    /// created one in the meantime, the live entry wins and the loaded copy
    /// is dropped.
    pub fn install(&self, room: Room) {
        self.rooms
            .entry(room.id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(room)));
    }

    /// Drop a room from the registry.
    pub fn remove(&self, room_id: &str) {
        self.rooms.remove(room_id);
    }

    /// Ids of every live room; used by the disconnect presence sweep.
    pub fn ids(&self) -> Vec<String> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let registry = RoomRegistry::new();
        let first = registry.get_or_create("R1");
        let second = registry.get_or_create("R1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn get_never_creates() {
        let registry = RoomRegistry::new();
        assert!(registry.get("R1").is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn install_fills_an_absent_entry() {
        let registry = RoomRegistry::new();
        let mut loaded = Room::new("R1");
        loaded.current = "P1".to_string();

        registry.install(loaded);
        let entry = registry.get("R1").unwrap();
        assert_eq!(entry.lock().await.current, "P1");
    }

    #[tokio::test]
    async fn install_never_clobbers_a_live_entry() {
        let registry = RoomRegistry::new();
        let live = registry.get_or_create("R1");
        {
            let mut room = live.lock().await;
            room.current = "P9".to_string();
        }

        registry.install(Room::new("R1"));
        let entry = registry.get("R1").unwrap();
        assert!(Arc::ptr_eq(&live, &entry));
        assert_eq!(entry.lock().await.current, "P9");
    }

    #[tokio::test]
    async fn remove_forgets_the_room() {
        let registry = RoomRegistry::new();
        registry.get_or_create("R1");
        registry.remove("R1");
        assert!(!registry.contains("R1"));
    }
}
