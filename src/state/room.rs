use indexmap::{IndexMap, IndexSet};
use uuid::Uuid;

use crate::{
    dao::models::{PlayerRecord, RoomRecord},
    dto::ws::PlayerInput,
};

/// A participant tracked inside a room.
#[derive(Debug, Clone)]
pub struct Player {
    /// Stable identity from the external identity provider.
    pub id: String,
    /// Display name, opaque to the coordinator.
    pub name: String,
    /// Avatar reference, opaque to the coordinator.
    pub avatar: String,
    /// Elapsed seconds accrued while the player's timer runs.
    pub timer: u64,
    /// Whether a live tick task currently increments `timer`.
    pub running: bool,
    /// Live-connection presence; deliberately independent from `running`.
    pub online: bool,
    /// Connection currently associated with this player, if any.
    pub conn: Option<Uuid>,
}

/// Authoritative state of one training room.
///
/// Mutations keep two invariants: `order` is always exactly the set of
/// player ids, and `current` is a member of `order` (or empty when the
/// room has no players).
#[derive(Debug, Clone)]
pub struct Room {
    /// Opaque room identifier, immutable once created.
    pub id: String,
    /// Participants in insertion order, keyed by player id.
    pub players: IndexMap<String, Player>,
    /// Letters already crossed off, in crossing order.
    pub crossed: IndexSet<String>,
    /// Turn rotation; a permutation of the player ids.
    pub order: Vec<String>,
    /// Id of the player whose turn it is, or empty when the room is empty.
    pub current: String,
}

/// Turn handoff produced by a crossing that advanced the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnHandoff {
    /// Player whose turn just ended.
    pub previous: String,
    /// Player whose turn begins.
    pub next: String,
}

/// What a cross attempt did to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossOutcome {
    /// Letter was already crossed: nothing changed, nothing to announce.
    Unchanged,
    /// Letter crossed; the room has no rotation to advance.
    Crossed,
    /// Letter crossed and the turn moved to the next player in order.
    Advanced(TurnHandoff),
}

impl Room {
    /// Create an empty room with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            players: IndexMap::new(),
            crossed: IndexSet::new(),
            order: Vec::new(),
            current: String::new(),
        }
    }

    /// Whether the room has no players left.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Borrow a player by id.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// Mutably borrow a player by id.
    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.get_mut(player_id)
    }

    /// Add a participant, or reconnect one that is already a member.
    ///
    /// A returning id only refreshes presence and the connection reference;
    /// a new id is appended to both `players` and `order`, and claims the
    /// turn when the room had none. Returns true for a fresh join.
    pub fn join(&mut self, input: PlayerInput, conn: Uuid) -> bool {
        match self.players.get_mut(&input.id) {
            Some(existing) => {
                existing.online = true;
                existing.conn = Some(conn);
                false
            }
            None => {
                let id = input.id.clone();
                self.players.insert(
                    id.clone(),
                    Player {
                        id: input.id,
                        name: input.name,
                        avatar: input.avatar,
                        timer: 0,
                        running: false,
                        online: true,
                        conn: Some(conn),
                    },
                );
                self.order.push(id.clone());
                if self.current.is_empty() {
                    self.current = id;
                }
                true
            }
        }
    }

    /// Remove a participant, repairing `order` and `current`.
    ///
    /// When the removed player held the turn, it passes to the new head of
    /// the rotation (or nobody, if the room emptied). Returns false when
    /// the id was not a member.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        if self.players.shift_remove(player_id).is_none() {
            return false;
        }
        self.order.retain(|id| id != player_id);
        if self.current == player_id {
            self.current = self.order.first().cloned().unwrap_or_default();
        }
        true
    }

    /// Cross a letter off and advance the rotation.
    ///
    /// Crossing a letter that is already crossed is a complete no-op. The
    /// running flags follow the handoff; the caller owns the tick tasks.
    pub fn cross(&mut self, letter: &str) -> CrossOutcome {
        if !self.crossed.insert(letter.to_string()) {
            return CrossOutcome::Unchanged;
        }
        match self.advance_turn() {
            Some(handoff) => CrossOutcome::Advanced(handoff),
            None => CrossOutcome::Crossed,
        }
    }

    /// Un-cross a letter. Returns false when it was not crossed.
    ///
    /// No turn side effects: taking a letter back does not give the turn back.
    pub fn uncross(&mut self, letter: &str) -> bool {
        self.crossed.shift_remove(letter)
    }

    /// Hand the turn over explicitly.
    ///
    /// Applied only when `from` actually holds the turn and `to` is part of
    /// the rotation; anything else is a stale or forged request and is
    /// dropped. Returns whether the turn moved.
    pub fn pass_turn(&mut self, from: &str, to: &str) -> bool {
        if self.current != from || !self.order.iter().any(|id| id == to) {
            return false;
        }
        self.current = to.to_string();
        true
    }

    /// Replace the turn rotation with a client-supplied sequence.
    ///
    /// Rejected unless the sequence is exactly a permutation of the current
    /// player ids. Returns whether the rotation was replaced.
    pub fn reorder(&mut self, new_order: Vec<String>) -> bool {
        if !self.is_permutation(&new_order) {
            return false;
        }
        self.order = new_order;
        true
    }

    /// Flip presence off for every player attached to `conn`.
    ///
    /// Timers are untouched: a dropped connection does not pause anyone.
    /// Returns whether any player changed.
    pub fn mark_offline(&mut self, conn: Uuid) -> bool {
        let mut changed = false;
        for player in self.players.values_mut() {
            if player.conn == Some(conn) {
                player.online = false;
                player.conn = None;
                changed = true;
            }
        }
        changed
    }

    /// Move `current` to the next id in the rotation, flipping running flags.
    fn advance_turn(&mut self) -> Option<TurnHandoff> {
        if self.order.is_empty() || self.current.is_empty() {
            return None;
        }
        let index = self.order.iter().position(|id| *id == self.current)?;
        let next = self.order[(index + 1) % self.order.len()].clone();
        let previous = std::mem::replace(&mut self.current, next.clone());
        if let Some(player) = self.players.get_mut(&previous) {
            player.running = false;
        }
        if let Some(player) = self.players.get_mut(&next) {
            player.running = true;
        }
        Some(TurnHandoff { previous, next })
    }

    fn is_permutation(&self, candidate: &[String]) -> bool {
        if candidate.len() != self.players.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(candidate.len());
        candidate
            .iter()
            .all(|id| self.players.contains_key(id) && seen.insert(id))
    }
}

impl From<&Room> for RoomRecord {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            players: room.players.values().map(PlayerRecord::from).collect(),
            crossed: room.crossed.iter().cloned().collect(),
            order: room.order.clone(),
            current: room.current.clone(),
        }
    }
}

impl From<&Player> for PlayerRecord {
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

impl From<RoomRecord> for Room {
    fn from(record: RoomRecord) -> Self {
        Self {
            id: record.id,
            players: record
                .players
                .into_iter()
                .map(|player| (player.id.clone(), Player::from(player)))
                .collect(),
            crossed: record.crossed.into_iter().collect(),
            order: record.order,
            current: record.current,
        }
    }
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            avatar: record.avatar,
            timer: record.timer,
            running: record.running,
            online: record.online,
            conn: None,
        }
    }
}
