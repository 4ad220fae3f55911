//! Broadcast synchronization: derived views pushed to the right audience.
//!
//! Every successful operation reports which rooms it touched and how
//! (a [`RoomSync`]). The [`Broadcaster`] turns those into outbound events:
//!
//! | scope       | `players` | `update-room` | `update-rooms` |
//! |-------------|-----------|---------------|----------------|
//! | `Roster`    | members   | -             | -              |
//! | `Lifecycle` | members   | members       | everyone       |
//!
//! Views are rebuilt from the current state every time and never kept.

use std::collections::HashMap;

use golfrush_protocol::{PlayerId, ServerEvent};
use golfrush_registry::PlayerRegistry;
use tokio::sync::mpsc;

use crate::RoomManager;

/// Channel sender for delivering outbound events to one connection.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// How much of a room's state an operation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    /// Only per-player fields (position, strokes, profile).
    Roster,
    /// Membership, admin, winner or status.
    Lifecycle,
}

/// A room that needs re-broadcasting after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSync {
    pub room: String,
    pub scope: SyncScope,
}

impl RoomSync {
    pub fn roster(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            scope: SyncScope::Roster,
        }
    }

    pub fn lifecycle(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            scope: SyncScope::Lifecycle,
        }
    }
}

/// Holds every connection's outbox and fans events out to them.
#[derive(Debug, Default)]
pub struct Broadcaster {
    outboxes: HashMap<PlayerId, Outbox>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbox.
    pub fn subscribe(&mut self, player_id: PlayerId, outbox: Outbox) {
        self.outboxes.insert(player_id, outbox);
    }

    pub fn unsubscribe(&mut self, player_id: &PlayerId) {
        self.outboxes.remove(player_id);
    }

    /// Returns the number of subscribed connections.
    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }

    /// Sends an event to a single connection. Dropped with a warning if
    /// the connection has gone away.
    pub fn send_to(&self, player_id: &PlayerId, event: ServerEvent) {
        if let Some(outbox) = self.outboxes.get(player_id) {
            if outbox.send(event).is_err() {
                tracing::warn!(%player_id, "outbound channel closed");
            }
        }
    }

    /// Sends an event to every listed member.
    pub fn send_to_members(&self, members: &[PlayerId], event: &ServerEvent) {
        for player_id in members {
            self.send_to(player_id, event.clone());
        }
    }

    /// Sends an event to every connection.
    pub fn send_to_all(&self, event: &ServerEvent) {
        for player_id in self.outboxes.keys() {
            self.send_to(player_id, event.clone());
        }
    }

    /// Pushes the views a batch of operations made stale.
    ///
    /// Room-scoped events go out in order, then at most one `update-rooms`
    /// if any lifecycle change happened. A room that no longer exists
    /// only contributes to the index.
    pub fn sync(&self, rooms: &RoomManager, registry: &PlayerRegistry, syncs: &[RoomSync]) {
        let mut index_stale = false;

        for sync in syncs {
            index_stale |= sync.scope == SyncScope::Lifecycle;

            let Some(room) = rooms.room(&sync.room) else {
                continue;
            };

            let players = ServerEvent::Players(registry.views(room.members()));
            self.send_to_members(room.members(), &players);

            if sync.scope == SyncScope::Lifecycle {
                self.send_to_members(room.members(), &ServerEvent::UpdateRoom(room.view()));
            }

            tracing::debug!(
                room = %sync.room,
                scope = ?sync.scope,
                players = room.len(),
                "room synced"
            );
        }

        if index_stale {
            self.send_to_all(&ServerEvent::UpdateRooms(rooms.summaries()));
        }
    }
}
