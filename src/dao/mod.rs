/// Durable record definitions for room snapshots.
pub mod models;
/// Room snapshot storage and retrieval operations.
pub mod room_store;
/// Storage abstraction layer shared by all backends.
pub mod storage;
