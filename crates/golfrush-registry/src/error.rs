//! Error types for the registry.

use golfrush_protocol::PlayerId;

/// Errors that can occur while accessing player records.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No record exists for this player. Records are created on join, so
    /// this usually means the player hasn't joined a room yet.
    #[error("no player record for {0}")]
    NotFound(PlayerId),
}
