//! A single room: membership, admin seat, winner and status.
//!
//! `Room` only knows identities. Per-player state lives in the registry,
//! and the rules that need both are in [`RoomManager`](crate::RoomManager).

use golfrush_protocol::{PlayerId, RoomStatus, RoomSummary, RoomView};

use crate::{Lifecycle, RoomError};

/// A named play session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    name: String,
    status: RoomStatus,
    admin: Option<PlayerId>,
    winner: Option<PlayerId>,
    /// Members in join order. The front is the next admin in line.
    members: Vec<PlayerId>,
}

impl Room {
    /// Creates a room in `lobby` with no members yet.
    ///
    /// `admin` may name a player who hasn't joined; see [`Room::add_member`].
    pub fn new(name: impl Into<String>, admin: Option<PlayerId>) -> Self {
        Self {
            name: name.into(),
            status: RoomStatus::Lobby,
            admin,
            winner: None,
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn admin(&self) -> Option<&PlayerId> {
        self.admin.as_ref()
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    /// Members in join order.
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_member(&self, player_id: &PlayerId) -> bool {
        self.members.contains(player_id)
    }

    pub fn is_admin(&self, player_id: &PlayerId) -> bool {
        self.admin.as_ref() == Some(player_id)
    }

    /// Adds a member, keeping membership unique.
    ///
    /// The joiner takes the admin seat when it is empty or held by someone
    /// who never joined. Returns `false` if the player was already a member.
    pub fn add_member(&mut self, player_id: PlayerId) -> bool {
        if self.is_member(&player_id) {
            return false;
        }
        let seat_open = self
            .admin
            .as_ref()
            .is_none_or(|admin| admin != &player_id && !self.is_member(admin));
        if seat_open {
            self.admin = Some(player_id.clone());
        }
        self.members.push(player_id);
        true
    }

    /// Removes a member. If they held the admin seat, it passes to the
    /// earliest-joined remaining member (or to nobody).
    ///
    /// Returns `false` if the player wasn't a member.
    pub fn remove_member(&mut self, player_id: &PlayerId) -> bool {
        let Some(index) = self.members.iter().position(|m| m == player_id) else {
            return false;
        };
        self.members.remove(index);
        if self.is_admin(player_id) {
            self.admin = self.members.first().cloned();
        }
        true
    }

    /// Moves to `target` along a legal edge of the state machine.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidTransition`] for any other edge.
    pub fn transition_to(&mut self, target: RoomStatus) -> Result<(), RoomError> {
        if !self.status.can_transition_to(target) {
            return Err(RoomError::InvalidTransition(
                self.name.clone(),
                self.status,
                target,
            ));
        }
        self.status = target;
        Ok(())
    }

    /// Re-derives `lobby` / `lobby-ready`. Returns `true` if it changed.
    pub(crate) fn settle(&mut self, all_ready: bool) -> bool {
        let next = self.status.settle(all_ready);
        let changed = next != self.status;
        self.status = next;
        changed
    }

    /// Records the first finisher. Returns `true` if this call set it.
    pub(crate) fn claim_winner(&mut self, player_id: &PlayerId) -> bool {
        if self.winner.is_some() {
            return false;
        }
        self.winner = Some(player_id.clone());
        true
    }

    /// Back to `lobby` with no winner.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidTransition`] while a round is running.
    pub(crate) fn restart(&mut self) -> Result<(), RoomError> {
        if self.status == RoomStatus::Start {
            return Err(RoomError::InvalidTransition(
                self.name.clone(),
                self.status,
                RoomStatus::Lobby,
            ));
        }
        self.status = RoomStatus::Lobby;
        self.winner = None;
        Ok(())
    }

    /// The `update-room` view.
    pub fn view(&self) -> RoomView {
        RoomView {
            name: self.name.clone(),
            status: self.status,
            admin: self.admin.clone(),
            winner: self.winner.clone(),
            players: self.members.clone(),
            players_count: self.members.len(),
        }
    }

    /// The `update-rooms` index entry.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            status: self.status,
            admin: self.admin.clone(),
            winner: self.winner.clone(),
            players_count: self.members.len(),
        }
    }
}
