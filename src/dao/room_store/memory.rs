use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tracing::warn;

use crate::dao::{
    models::RoomRecord,
    room_store::{RoomStore, room_key},
    storage::{StorageError, StorageResult},
};

/// In-memory implementation of [`RoomStore`].
///
/// Documents are held as raw JSON strings so the load path exercises the same
/// decode-or-discard behavior as the networked backends.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a document is stored for the given room.
    pub fn contains(&self, room_id: &str) -> bool {
        self.entries.contains_key(&room_key(room_id))
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite the raw document stored for a room, bypassing serialization.
    pub fn put_raw(&self, room_id: &str, raw: impl Into<String>) {
        self.entries.insert(room_key(room_id), raw.into());
    }
}

impl RoomStore for MemoryRoomStore {
    fn save_room(&self, record: RoomRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let payload = serde_json::to_string(&record)
                .map_err(|source| StorageError::unavailable("serializing room record", source))?;
            store.entries.insert(room_key(&record.id), payload);
            Ok(())
        })
    }

    fn find_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            let key = room_key(&room_id);
            let Some(raw) = store.entries.get(&key).map(|entry| entry.value().clone()) else {
                return Ok(None);
            };
            match serde_json::from_str::<RoomRecord>(&raw) {
                Ok(record) => Ok(Some(record)),
                Err(err) => {
                    warn!(room_id = %room_id, error = %err, "discarding undecodable room record");
                    store.entries.remove(&key);
                    Ok(None)
                }
            }
        })
    }

    fn delete_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.entries.remove(&room_key(&room_id));
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
