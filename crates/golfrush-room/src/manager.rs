//! Room manager: creates, tracks, and routes players to rooms.
//!
//! Every operation either fails without touching anything, or mutates
//! rooms / player records and returns the [`RoomSync`]s the broadcaster
//! needs to bring clients up to date.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use golfrush_protocol::{PlayerId, Position, RoomStatus, RoomSummary};
use golfrush_registry::{PlayerPatch, PlayerRegistry};
use serde_json::Value;

use crate::{Room, RoomConfig, RoomError, RoomSync};

/// Manages all active rooms and tracks which player is in which room.
///
/// Rooms are keyed by name; the `BTreeMap` keeps the `update-rooms`
/// index in name order.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: BTreeMap<String, Room>,

    /// Maps each player to the room they're currently in.
    /// A player is in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, String>,

    config: RoomConfig,
}

impl RoomManager {
    /// Creates a new, empty room manager.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: BTreeMap::new(),
            player_rooms: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Creates a room with `creator` as admin.
    ///
    /// With no `initial_members` the room waits, empty, for its creator to
    /// join. Initial members are moved out of any other room first.
    ///
    /// # Errors
    /// - [`RoomError::InvalidName`]: empty or overlong name
    /// - [`RoomError::Conflict`]: the name is taken; the existing room is
    ///   left untouched
    /// - [`RoomError::CapacityExceeded`]: more initial members than fit
    pub fn create_room(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        creator: &PlayerId,
        initial_members: &[PlayerId],
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = self.validate_name(name)?;
        if self.rooms.contains_key(&name) {
            return Err(RoomError::Conflict(name));
        }

        let mut members: Vec<PlayerId> = Vec::with_capacity(initial_members.len());
        for member in initial_members {
            if !members.contains(member) {
                members.push(member.clone());
            }
        }
        if members.len() > self.config.capacity {
            return Err(RoomError::CapacityExceeded(name));
        }

        let mut syncs = Vec::new();
        for member in &members {
            syncs.extend(self.detach(registry, member));
        }

        let admin = if members.is_empty() || members.contains(creator) {
            creator.clone()
        } else {
            members[0].clone()
        };
        let mut room = Room::new(name.clone(), Some(admin));
        // The admin joins first so it keeps the seat.
        members.sort_by_key(|m| !room.is_admin(m));
        for member in members {
            registry.register(member.clone());
            self.player_rooms.insert(member.clone(), name.clone());
            room.add_member(member);
        }

        tracing::info!(
            room = %name,
            %creator,
            admin = ?room.admin(),
            players = room.len(),
            "room created"
        );
        self.rooms.insert(name.clone(), room);
        syncs.push(RoomSync::lifecycle(name));
        Ok(syncs)
    }

    /// Adds a player to a room, creating the room if it doesn't exist.
    ///
    /// A player in another room leaves it first. Joining always starts
    /// the player with a fresh record, even when re-joining the same room.
    ///
    /// # Errors
    /// - [`RoomError::InvalidName`]: empty or overlong name
    /// - [`RoomError::CapacityExceeded`]: the room is full; the player
    ///   stays wherever they were
    pub fn join_room(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = self.validate_name(name)?;

        if let Some(room) = self.rooms.get(&name) {
            if !room.is_member(player_id) && room.len() >= self.config.capacity {
                return Err(RoomError::CapacityExceeded(name));
            }
        }

        let mut syncs = Vec::new();
        if self.player_room(player_id).is_some_and(|current| current != name) {
            syncs.extend(self.detach(registry, player_id));
        }

        registry.register(player_id.clone());

        let room = self.rooms.entry(name.clone()).or_insert_with(|| {
            tracing::info!(room = %name, admin = %player_id, "room created");
            Room::new(name.clone(), None)
        });
        if room.add_member(player_id.clone()) {
            tracing::info!(
                room = %name,
                %player_id,
                players = room.len(),
                "player joined"
            );
        }
        self.player_rooms.insert(player_id.clone(), name.clone());
        self.refresh_status(registry, &name);

        syncs.push(RoomSync::lifecycle(name));
        Ok(syncs)
    }

    /// Removes a player from a room. The player's record is kept.
    ///
    /// The admin seat passes on if needed, and an emptied room is deleted.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::NotMember`]: the player isn't in it
    pub fn leave_room(
        &mut self,
        registry: &PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        self.member_room(name, player_id)?;
        self.remove_from_room(registry, name, player_id);
        Ok(vec![RoomSync::lifecycle(name)])
    }

    /// Drops everything a closed connection owned: its membership, any
    /// room it created but never joined, and its player record.
    pub fn disconnect(
        &mut self,
        registry: &mut PlayerRegistry,
        player_id: &PlayerId,
    ) -> Vec<RoomSync> {
        let mut syncs = self.detach(registry, player_id);

        let abandoned: Vec<String> = self
            .rooms
            .values()
            .filter(|room| room.is_empty() && room.is_admin(player_id))
            .map(|room| room.name().to_owned())
            .collect();
        for name in abandoned {
            self.rooms.remove(&name);
            tracing::info!(room = %name, %player_id, "unjoined room discarded");
            syncs.push(RoomSync::lifecycle(name));
        }

        registry.remove(player_id);
        syncs
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Flips the player's readiness. While the room is in the lobby, this
    /// may move it between `lobby` and `lobby-ready`.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], [`RoomError::NotMember`], or
    /// [`RoomError::Player`] if the member has no record.
    pub fn toggle_ready(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        self.member_room(name, player_id)?;
        let status = registry.get(player_id)?.status.toggled();
        registry.update(player_id, PlayerPatch::status(status))?;
        tracing::debug!(room = %name, %player_id, %status, "readiness toggled");

        self.refresh_status(registry, name);
        Ok(vec![RoomSync::lifecycle(name)])
    }

    /// Tees off: `lobby` / `lobby-ready` → `start`.
    ///
    /// Starting a room that is already in `start` changes nothing.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::NotAdmin`]: admin-only controls are on and the
    ///   issuer isn't the admin
    /// - [`RoomError::InvalidTransition`]: the room is `finished`
    pub fn start_room(
        &mut self,
        name: &str,
        issuer: &PlayerId,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        let admin_only = self.config.admin_only_controls;
        let room = self.room_mut(name)?;
        if admin_only && !room.is_admin(issuer) {
            return Err(RoomError::NotAdmin(issuer.clone(), name.to_owned()));
        }
        if room.status() == RoomStatus::Start {
            return Ok(Vec::new());
        }

        room.transition_to(RoomStatus::Start)?;
        tracing::info!(room = %name, players = room.len(), "round started");
        Ok(vec![RoomSync::lifecycle(name)])
    }

    /// Marks the player holed. The first player to hole out wins the
    /// round, and the room finishes once every member has holed.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`], [`RoomError::NotMember`]
    /// - [`RoomError::AlreadyHoled`]: the first result is kept
    pub fn record_hole(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
        time: f64,
        time_formatted: String,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        self.member_room(name, player_id)?;
        if registry.get(player_id)?.holed {
            return Err(RoomError::AlreadyHoled(player_id.clone(), name.to_owned()));
        }
        registry.update(
            player_id,
            PlayerPatch::holed(Utc::now(), time, time_formatted),
        )?;
        tracing::debug!(room = %name, %player_id, time, "player holed");

        let room = self.room_mut(name)?;
        let won = room.claim_winner(player_id);
        if won {
            tracing::info!(room = %name, winner = %player_id, "winner decided");
        }
        let finished = self.refresh_status(registry, name);

        if won || finished {
            Ok(vec![RoomSync::lifecycle(name)])
        } else {
            Ok(vec![RoomSync::roster(name)])
        }
    }

    /// Counts one stroke for the player.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], [`RoomError::NotMember`], [`RoomError::Player`].
    pub fn increment_strokes(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        self.member_room(name, player_id)?;
        let record = registry.get_mut(player_id)?;
        record.strokes = record.strokes.saturating_add(1);
        tracing::debug!(room = %name, %player_id, strokes = record.strokes, "stroke counted");
        Ok(vec![RoomSync::roster(name)])
    }

    /// Back to the lobby: clears the winner and every member's round
    /// fields and readiness. Profile data survives.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::NotAdmin`]: admin-only controls are on and the
    ///   issuer isn't the admin
    /// - [`RoomError::InvalidTransition`]: a round is still running
    pub fn restart_room(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        issuer: &PlayerId,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        let admin_only = self.config.admin_only_controls;
        let room = self.room_mut(name)?;
        if admin_only && !room.is_admin(issuer) {
            return Err(RoomError::NotAdmin(issuer.clone(), name.to_owned()));
        }

        room.restart()?;
        for member in room.members() {
            if registry.reset_round(member).is_err() {
                tracing::warn!(room = %name, player_id = %member, "member has no player record");
            }
        }
        tracing::info!(room = %name, players = room.len(), "room restarted");

        self.refresh_status(registry, name);
        Ok(vec![RoomSync::lifecycle(name)])
    }

    // -----------------------------------------------------------------
    // Per-player updates
    // -----------------------------------------------------------------

    /// Replaces the player's profile data. The last write wins.
    ///
    /// The record is updated whether or not the player is in `name`;
    /// only members trigger a roster broadcast.
    ///
    /// # Errors
    /// [`RoomError::Player`] if the player has no record yet.
    pub fn set_profile_data(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
        data: Value,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        registry.update(player_id, PlayerPatch::user_data(data))?;
        tracing::debug!(%player_id, "profile data updated");

        match self.member_room(name, player_id) {
            Ok(_) => Ok(vec![RoomSync::roster(name)]),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Moves the player's ball.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], [`RoomError::NotMember`], [`RoomError::Player`].
    pub fn update_position(
        &mut self,
        registry: &mut PlayerRegistry,
        name: &str,
        player_id: &PlayerId,
        position: Position,
    ) -> Result<Vec<RoomSync>, RoomError> {
        let name = room_key(name);
        self.member_room(name, player_id)?;
        registry.update(player_id, PlayerPatch::position(position))?;
        Ok(vec![RoomSync::roster(name)])
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// The `update-rooms` index, ordered by name.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms.values().map(Room::summary).collect()
    }

    /// Returns the name of the room a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<&str> {
        self.player_rooms.get(player_id).map(String::as_str)
    }

    /// Returns the number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if there are no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn validate_name(&self, name: &str) -> Result<String, RoomError> {
        let trimmed = room_key(name);
        if trimmed.is_empty() || trimmed.chars().count() > self.config.max_name_len {
            return Err(RoomError::InvalidName(name.to_owned()));
        }
        Ok(trimmed.to_owned())
    }

    fn room_mut(&mut self, name: &str) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(name)
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))
    }

    /// Looks up a room the player must belong to.
    fn member_room(&self, name: &str, player_id: &PlayerId) -> Result<&Room, RoomError> {
        let room = self
            .rooms
            .get(name)
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))?;
        if !room.is_member(player_id) {
            return Err(RoomError::NotMember(player_id.clone(), name.to_owned()));
        }
        Ok(room)
    }

    /// Takes the player out of whatever room they are in.
    fn detach(&mut self, registry: &PlayerRegistry, player_id: &PlayerId) -> Vec<RoomSync> {
        match self.player_rooms.get(player_id).cloned() {
            Some(name) => {
                self.remove_from_room(registry, &name, player_id);
                vec![RoomSync::lifecycle(name)]
            }
            None => Vec::new(),
        }
    }

    fn remove_from_room(&mut self, registry: &PlayerRegistry, name: &str, player_id: &PlayerId) {
        self.player_rooms.remove(player_id);
        let Some(room) = self.rooms.get_mut(name) else {
            return;
        };

        let was_admin = room.is_admin(player_id);
        if !room.remove_member(player_id) {
            return;
        }
        tracing::info!(room = %name, %player_id, players = room.len(), "player left");

        if room.is_empty() {
            self.rooms.remove(name);
            tracing::info!(room = %name, "room deleted");
            return;
        }
        if was_admin {
            if let Some(admin) = room.admin() {
                tracing::info!(room = %name, %admin, "admin handed over");
            }
        }
        self.refresh_status(registry, name);
    }

    /// Re-derives the automatic transitions from the members' records.
    ///
    /// Lobby rooms follow the readiness predicate; any other unfinished
    /// room finishes once everyone has holed. Returns `true` if the room
    /// just finished.
    fn refresh_status(&mut self, registry: &PlayerRegistry, name: &str) -> bool {
        let Some(room) = self.rooms.get_mut(name) else {
            return false;
        };
        if room.is_empty() {
            return false;
        }

        let members = room.members();
        let all_holed = members
            .iter()
            .all(|m| registry.get(m).is_ok_and(|r| r.holed));
        let all_ready = members
            .iter()
            .all(|m| registry.get(m).is_ok_and(|r| r.status.is_ready()));

        if all_holed && room.transition_to(RoomStatus::Finished).is_ok() {
            tracing::info!(room = %name, winner = ?room.winner(), "room finished");
            return true;
        }
        if room.settle(all_ready) {
            tracing::debug!(room = %name, status = %room.status(), "lobby status changed");
        }
        false
    }
}

/// The key a client-supplied room name resolves to. Names are stored
/// trimmed, so lookups must trim the same way.
fn room_key(name: &str) -> &str {
    name.trim()
}
