use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{room_store::RoomStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the storage backend and keep the shared state out of degraded
/// mode for as long as the backend stays healthy.
///
/// The supervisor loops forever: connect with exponential backoff, poll the
/// health check, and on repeated failures drop back to degraded mode and
/// start over. Room commands keep working in memory the whole time.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RoomStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_room_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                supervise_store(&state, store.as_ref()).await;

                state.clear_room_store().await;
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll an installed store until it is definitively gone.
///
/// Returns once reconnect attempts are exhausted; the caller tears the store
/// down and starts a fresh connection cycle.
async fn supervise_store(state: &SharedState, store: &dyn RoomStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed; entering degraded mode");
                state.update_degraded(true).await;

                if reconnect_with_backoff(store).await {
                    state.update_degraded(false).await;
                    sleep(HEALTH_POLL_INTERVAL).await;
                } else {
                    warn!("exhausted storage reconnect attempts; dropping the backend");
                    return;
                }
            }
        }
    }
}

/// Retry `try_reconnect` a bounded number of times with exponential backoff.
async fn reconnect_with_backoff(store: &dyn RoomStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded");
                return true;
            }
            Err(err) => {
                warn!(attempt, error = %err, "storage reconnect attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}
