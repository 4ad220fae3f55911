//! Room lifecycle management for Golf Rush.
//!
//! Rooms are named, mutually exclusive play sessions. This crate owns the
//! room state machine and everything that reacts to it.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/deletes rooms, routes players, runs the
//!   lifecycle rules
//! - [`Room`]: one room's membership, admin, winner and status
//! - [`Broadcaster`]: pushes derived views to the right audience
//! - [`CoordinatorHandle`]: the only way into the shared state at runtime
//! - [`RoomConfig`]: capacity and name limits
//!
//! # Flow of one event
//!
//! ```text
//! ClientEvent → Coordinator → RoomManager (validate + mutate)
//!                    │
//!                    └──→ Broadcaster (players / update-room / update-rooms)
//! ```

mod config;
mod coordinator;
mod error;
mod manager;
mod room;
mod sync;

pub use config::{Lifecycle, RoomConfig};
pub use coordinator::{CoordinatorHandle, spawn_coordinator};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::Room;
pub use sync::{Broadcaster, Outbox, RoomSync, SyncScope};
