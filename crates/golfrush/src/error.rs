//! Unified error type for the Golf Rush server.

use golfrush_protocol::ProtocolError;
use golfrush_registry::RegistryError;
use golfrush_room::RoomError;
use golfrush_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum GolfRushError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A player record lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A room-level error (not found, full, coordinator gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
