//! End-to-end command flows against the in-memory store backend.
//!
//! These tests drive the service layer the same way the WebSocket dispatcher
//! does, with paused tokio time wherever tick tasks are involved.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::time::advance;
use uuid::Uuid;

use alfavit_back::{
    config::AppConfig,
    dao::room_store::{RoomStore, memory::MemoryRoomStore},
    dto::{room::RoomSnapshot, ws::PlayerInput},
    services::room_service,
    state::{AppState, SharedState},
};

fn test_state() -> SharedState {
    AppState::new(AppConfig::default())
}

fn player(id: &str) -> PlayerInput {
    PlayerInput {
        id: id.to_string(),
        name: format!("Player {id}"),
        avatar: String::new(),
    }
}

/// Join a room the way the dispatcher does, returning the connection id and
/// the receiving half that keeps the subscription alive.
async fn join(
    state: &SharedState,
    room_id: &str,
    id: &str,
) -> (Uuid, mpsc::UnboundedReceiver<Message>) {
    let conn = Uuid::new_v4();
    let (tx, rx) = mpsc::unbounded_channel();
    room_service::join_room(state, conn, tx, room_id, player(id)).await;
    (conn, rx)
}

/// Attach a silent observer connection to a room's channel.
fn observe(state: &SharedState, room_id: &str) -> mpsc::UnboundedReceiver<Message> {
    let (tx, rx) = mpsc::unbounded_channel();
    state.hub().join(room_id, Uuid::new_v4(), tx);
    rx
}

/// Collect every text frame the observer has received so far.
fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let Message::Text(text) = message {
            frames.push(text.as_str().to_owned());
        }
    }
    frames
}

/// Let spawned background tasks (persistence writes, tick bookkeeping) run.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

async fn snapshot(state: &SharedState, room_id: &str) -> RoomSnapshot {
    state
        .with_existing_room(room_id, |room| RoomSnapshot::from(&*room))
        .await
        .expect("room should exist")
}

fn player_timer(snapshot: &RoomSnapshot, id: &str) -> (u64, bool, bool) {
    let player = snapshot
        .players
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| panic!("player {id} missing from snapshot"));
    (player.timer, player.running, player.online)
}

#[tokio::test]
async fn joins_assign_turn_and_order() {
    let state = test_state();

    let _p1 = join(&state, "R1", "P1").await;
    let snap = snapshot(&state, "R1").await;
    assert_eq!(snap.current, "P1");
    assert_eq!(snap.order, vec!["P1"]);

    let _p2 = join(&state, "R1", "P2").await;
    let snap = snapshot(&state, "R1").await;
    assert_eq!(snap.order, vec!["P1", "P2"]);
    assert_eq!(snap.current, "P1", "second join must not steal the turn");
}

#[tokio::test(start_paused = true)]
async fn cross_pauses_current_and_starts_next() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;
    let _p2 = join(&state, "R1", "P2").await;

    room_service::start_training(&state, "R1").await;
    room_service::cross_letter(&state, "R1", "А").await;

    let snap = snapshot(&state, "R1").await;
    assert_eq!(snap.crossed, vec!["А"]);
    assert_eq!(snap.current, "P2");
    let (_, p1_running, _) = player_timer(&snap, "P1");
    let (_, p2_running, _) = player_timer(&snap, "P2");
    assert!(!p1_running, "previous player must be paused");
    assert!(p2_running, "next player must be running");

    advance(Duration::from_secs(1)).await;
    settle().await;

    let snap = snapshot(&state, "R1").await;
    assert_eq!(player_timer(&snap, "P1").0, 0);
    assert_eq!(player_timer(&snap, "P2").0, 1);
}

#[tokio::test(start_paused = true)]
async fn crossing_twice_changes_nothing_and_broadcasts_nothing() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;
    let _p2 = join(&state, "R1", "P2").await;
    room_service::cross_letter(&state, "R1", "А").await;

    let before = snapshot(&state, "R1").await;
    let mut rx = observe(&state, "R1");

    room_service::cross_letter(&state, "R1", "А").await;
    settle().await;

    assert!(drain(&mut rx).is_empty(), "no broadcast for a no-op cross");
    let after = snapshot(&state, "R1").await;
    assert_eq!(after.crossed, before.crossed);
    assert_eq!(after.current, before.current);
}

#[tokio::test(start_paused = true)]
async fn crossing_a_letter_outside_the_alphabet_is_dropped() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;

    let mut rx = observe(&state, "R1");
    room_service::cross_letter(&state, "R1", "Q").await;
    settle().await;

    assert!(drain(&mut rx).is_empty());
    assert!(snapshot(&state, "R1").await.crossed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn double_timer_start_keeps_one_tick_source() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;

    room_service::start_timer(&state, "R1", "P1").await;
    room_service::start_timer(&state, "R1", "P1").await;

    advance(Duration::from_secs(1)).await;
    settle().await;
    let snap = snapshot(&state, "R1").await;
    assert_eq!(
        player_timer(&snap, "P1").0,
        1,
        "one second must count exactly once"
    );

    advance(Duration::from_secs(1)).await;
    settle().await;
    let snap = snapshot(&state, "R1").await;
    assert_eq!(player_timer(&snap, "P1").0, 2);
}

#[tokio::test(start_paused = true)]
async fn pause_and_reset_control_the_clock() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;

    room_service::start_timer(&state, "R1", "P1").await;
    advance(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(player_timer(&snapshot(&state, "R1").await, "P1").0, 2);

    room_service::pause_timer(&state, "R1", "P1").await;
    advance(Duration::from_secs(2)).await;
    settle().await;
    let snap = snapshot(&state, "R1").await;
    let (timer, running, _) = player_timer(&snap, "P1");
    assert_eq!(timer, 2, "a paused timer must not accrue");
    assert!(!running);

    room_service::reset_timer(&state, "R1", "P1").await;
    let snap = snapshot(&state, "R1").await;
    assert_eq!(player_timer(&snap, "P1").0, 0);
}

#[tokio::test]
async fn stale_turn_pass_is_dropped() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;
    let _p2 = join(&state, "R1", "P2").await;

    room_service::pass_turn(&state, "R1", "P2", "P1").await;
    assert_eq!(snapshot(&state, "R1").await.current, "P1");

    room_service::pass_turn(&state, "R1", "P1", "P2").await;
    assert_eq!(snapshot(&state, "R1").await.current, "P2");
}

#[tokio::test]
async fn reorder_rejects_foreign_sequences() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;
    let _p2 = join(&state, "R1", "P2").await;

    room_service::reorder(&state, "R1", vec!["P1".into(), "ghost".into()]).await;
    assert_eq!(snapshot(&state, "R1").await.order, vec!["P1", "P2"]);

    room_service::reorder(&state, "R1", vec!["P2".into(), "P1".into()]).await;
    assert_eq!(snapshot(&state, "R1").await.order, vec!["P2", "P1"]);
}

#[tokio::test]
async fn last_leave_deletes_room_and_durable_record() {
    let state = test_state();
    let store = MemoryRoomStore::new();
    state.install_room_store(Arc::new(store.clone())).await;

    let (conn, _rx) = join(&state, "R1", "P1").await;
    settle().await;
    assert!(store.contains("R1"), "join must persist the room");

    room_service::leave_room(&state, conn, "R1", "P1").await;
    settle().await;

    assert!(!state.rooms().contains("R1"));
    assert!(!store.contains("R1"), "durable record must be deleted");
}

#[tokio::test]
async fn restart_restores_room_from_store() {
    let store = MemoryRoomStore::new();

    let state = test_state();
    state.install_room_store(Arc::new(store.clone())).await;
    let _p1 = join(&state, "R1", "P1").await;
    let _p2 = join(&state, "R1", "P2").await;
    room_service::cross_letter(&state, "R1", "А").await;
    settle().await;

    // A fresh coordinator process sharing the same store.
    let restarted = test_state();
    restarted.install_room_store(Arc::new(store.clone())).await;
    let _p1_again = join(&restarted, "R1", "P1").await;

    let snap = snapshot(&restarted, "R1").await;
    assert_eq!(snap.order, vec!["P1", "P2"]);
    assert_eq!(snap.current, "P2", "turn survives the restart");
    assert_eq!(snap.crossed, vec!["А"]);
    assert_eq!(snap.players.len(), 2);
    assert!(player_timer(&snap, "P1").2, "rejoined player is online");
}

#[tokio::test]
async fn corrupt_stored_record_is_discarded_on_restore() {
    let state = test_state();
    let store = MemoryRoomStore::new();
    state.install_room_store(Arc::new(store.clone())).await;
    store.put_raw("R1", "{definitely not json");

    let _p1 = join(&state, "R1", "P1").await;
    settle().await;

    let snap = snapshot(&state, "R1").await;
    assert_eq!(snap.players.len(), 1, "room starts fresh after self-healing");
    assert_eq!(snap.current, "P1");

    // The replacement write is decodable again.
    let record = store.find_room("R1".into()).await.unwrap().unwrap();
    assert_eq!(record.current, "P1");
}

#[tokio::test(start_paused = true)]
async fn disconnect_flips_presence_but_keeps_timer_running() {
    let state = test_state();
    let (conn, _rx) = join(&state, "R1", "P1").await;
    room_service::start_timer(&state, "R1", "P1").await;

    room_service::handle_disconnect(&state, conn).await;

    let snap = snapshot(&state, "R1").await;
    let (_, running, online) = player_timer(&snap, "P1");
    assert!(!online);
    assert!(running, "disconnect must not pause the timer");

    advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(player_timer(&snapshot(&state, "R1").await, "P1").0, 1);
}

#[tokio::test(start_paused = true)]
async fn kick_cancels_the_removed_players_timer() {
    let state = test_state();
    let _p1 = join(&state, "R1", "P1").await;
    let _p2 = join(&state, "R1", "P2").await;
    room_service::start_timer(&state, "R1", "P1").await;

    room_service::kick_player(&state, "R1", "P1").await;
    let snap = snapshot(&state, "R1").await;
    assert_eq!(snap.order, vec!["P2"]);
    assert_eq!(snap.current, "P2");

    let mut rx = observe(&state, "R1");
    advance(Duration::from_secs(2)).await;
    settle().await;
    assert!(
        drain(&mut rx).is_empty(),
        "no orphaned tick task may keep broadcasting"
    );
}
