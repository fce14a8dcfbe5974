/// Process-local backend used by tests and storage-less deployments.
pub mod memory;
/// Upstash-compatible Redis REST backend.
#[cfg(feature = "redis-store")]
pub mod redis;

use futures::future::BoxFuture;

use crate::dao::{models::RoomRecord, storage::StorageResult};

/// Abstraction over the persistence layer for room snapshots.
///
/// Persistence is best-effort durability for the live session: callers fire
/// saves in the background and never gate a broadcast on the result.
pub trait RoomStore: Send + Sync {
    /// Write the full snapshot for a room, replacing any previous one.
    fn save_room(&self, record: RoomRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch the stored snapshot for a room, if any.
    ///
    /// Implementations must treat an undecodable record as absent after
    /// deleting it, so one corrupt write can never wedge a room.
    fn find_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>>;
    /// Remove the stored snapshot for a room.
    fn delete_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap connectivity probe used by the supervisor and health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish the backend connection after a failed probe.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Storage key under which a room snapshot lives.
pub(crate) fn room_key(room_id: &str) -> String {
    format!("room:{room_id}")
}
