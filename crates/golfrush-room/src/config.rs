//! Room configuration and the status state machine.

use golfrush_protocol::RoomStatus;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Maximum members per room.
    pub capacity: usize,

    /// Maximum room name length, in characters.
    pub max_name_len: usize,

    /// When set, only a room's admin may `start` or `restart-room` it.
    pub admin_only_controls: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_name_len: 64,
            admin_only_controls: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Transition rules for [`RoomStatus`].
///
/// ```text
///            (all ready)
///   lobby ◄────────────► lobby-ready
///     │ ▲                    │
///     │ └──── restart ───┐   │
///     ▼                  │   ▼
///   start ──(all holed)──► finished
/// ```
///
/// `lobby` ⇄ `lobby-ready` flips automatically with readiness, `start` is
/// explicit, `finished` is automatic once every member has holed, and
/// `restart` is the only way out of `finished`.
pub trait Lifecycle: Copy {
    /// Returns `true` if moving from `self` to `target` is a legal edge.
    fn can_transition_to(self, target: RoomStatus) -> bool;

    /// Re-derives the lobby substate from the readiness predicate.
    ///
    /// Leaves non-lobby statuses alone.
    fn settle(self, all_ready: bool) -> RoomStatus;
}

impl Lifecycle for RoomStatus {
    fn can_transition_to(self, target: RoomStatus) -> bool {
        use golfrush_protocol::RoomStatus::*;
        matches!(
            (self, target),
            (Lobby, LobbyReady)
                | (LobbyReady, Lobby)
                | (Lobby | LobbyReady, Start)
                | (Lobby | LobbyReady | Start, Finished)
                | (Finished, Lobby)
        )
    }

    fn settle(self, all_ready: bool) -> RoomStatus {
        match self {
            status if !status.is_lobby() => status,
            _ if all_ready => RoomStatus::LobbyReady,
            _ => RoomStatus::Lobby,
        }
    }
}
