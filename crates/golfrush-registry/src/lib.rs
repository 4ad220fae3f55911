//! Connection registry for Golf Rush.
//!
//! Maps each connected player to their mutable per-round record:
//! position, readiness, hole result, stroke count and profile data.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)     ← reads records to evaluate readiness / completion
//!     ↕
//! Registry (this crate)  ← owns every PlayerRecord
//!     ↕
//! Protocol Layer (below) ← provides PlayerId, Position, PlayerView
//! ```
//!
//! The registry never broadcasts. Callers decide who needs to hear about
//! a change, so room-less updates don't need a room lookup.

mod error;
mod player;
mod registry;

pub use error::RegistryError;
pub use player::{PlayerPatch, PlayerRecord, RegistryConfig};
pub use registry::PlayerRegistry;
