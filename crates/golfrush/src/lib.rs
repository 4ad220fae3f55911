//! # Golf Rush
//!
//! Real-time room coordinator for the Golf Rush multiplayer game.
//!
//! Clients connect over WebSocket, join or create named rooms, and stream
//! their ball position, strokes and hole results. The server keeps every
//! room's membership and lifecycle consistent and pushes fresh views to
//! the players who need them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use golfrush::prelude::*;
//!
//! # async fn run() -> Result<(), GolfRushError> {
//! let server = GolfRushServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::GolfRushError;
pub use server::{GolfRushServer, GolfRushServerBuilder};

use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used (e.g. `"info"` or
/// `"golfrush_room=debug"`). Calling this again is harmless.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Everything needed to embed and run the server.
pub mod prelude {
    pub use crate::{
        GolfRushError, GolfRushServer, GolfRushServerBuilder, ServerConfig, init_tracing,
    };
    pub use golfrush_protocol::{
        ClientEvent, PlayerId, PlayerStatus, PlayerView, Position, RoomStatus, RoomSummary,
        RoomView, ServerEvent,
    };
    pub use golfrush_registry::RegistryConfig;
    pub use golfrush_room::RoomConfig;
}
