//! Error types for the room layer.

use golfrush_protocol::{PlayerId, RoomStatus};
use golfrush_registry::RegistryError;

/// Errors that can occur during room operations.
///
/// None of these reach the client. The coordinator logs them and drops
/// the event without mutating or broadcasting anything.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(String),

    /// The player is not a member of this room.
    #[error("player {0} not in room {1}")]
    NotMember(PlayerId, String),

    /// The room is at capacity.
    #[error("room {0} is full")]
    CapacityExceeded(String),

    /// A room with this name already exists.
    #[error("room {0} already exists")]
    Conflict(String),

    /// The room name is empty or too long.
    #[error("invalid room name {0:?}")]
    InvalidName(String),

    /// The room's status doesn't allow this operation.
    #[error("room {0} cannot go from {1} to {2}")]
    InvalidTransition(String, RoomStatus, RoomStatus),

    /// The player already holed out this round.
    #[error("player {0} already holed in room {1}")]
    AlreadyHoled(PlayerId, String),

    /// Only the room's admin may do this.
    #[error("player {0} is not the admin of room {1}")]
    NotAdmin(PlayerId, String),

    #[error(transparent)]
    Player(#[from] RegistryError),

    /// The coordinator task has stopped.
    #[error("room coordinator is unavailable")]
    Unavailable,
}
