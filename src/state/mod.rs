pub mod hub;
pub mod registry;
pub mod room;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use crate::{config::AppConfig, dao::room_store::RoomStore, error::ServiceError};

use self::{hub::RoomHub, registry::RoomRegistry, room::Room};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: room registry, fanout hub, timer handles, and
/// the storage backend handle.
pub struct AppState {
    config: AppConfig,
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    rooms: RoomRegistry,
    hub: RoomHub,
    timers: DashMap<String, JoinHandle<()>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            room_store: RwLock::new(None),
            rooms: RoomRegistry::new(),
            hub: RoomHub::new(),
            timers: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The authoritative in-memory room registry.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Per-room fanout hub for outbound WebSocket messages.
    pub fn hub(&self) -> &RoomHub {
        &self.hub
    }

    /// Live tick-task handles keyed by player id; owned by the timer subsystem.
    pub(crate) fn timers(&self) -> &DashMap<String, JoinHandle<()>> {
        &self.timers
    }

    /// Obtain a handle to the current room store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomStore>> {
        let guard = self.room_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_room_store(&self, store: Arc<dyn RoomStore>) {
        {
            let mut guard = self.room_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_room_store(&self) {
        {
            let mut guard = self.room_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.room_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Run `f` with exclusive access to a room, creating it when absent.
    ///
    /// All mutation must happen synchronously inside the closure while the
    /// room lock is held.
    pub async fn with_room_mut<F, T>(&self, room_id: &str, f: F) -> T
    where
        F: FnOnce(&mut Room) -> T,
    {
        let slot = self.rooms.get_or_create(room_id);
        let mut room = slot.lock().await;
        f(&mut room)
    }

    /// Run `f` with exclusive access to an existing room.
    ///
    /// Returns `None` when the room is unknown; commands addressing such
    /// rooms are dropped rather than auto-creating state.
    pub async fn with_existing_room<F, T>(&self, room_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut Room) -> T,
    {
        let slot = self.rooms.get(room_id)?;
        let mut room = slot.lock().await;
        Some(f(&mut room))
    }
}
