//! `GolfRushServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → coordinator.

use std::net::SocketAddr;
use std::sync::Arc;

use golfrush_protocol::{Codec, JsonCodec};
use golfrush_registry::RegistryConfig;
use golfrush_room::{CoordinatorHandle, RoomConfig, spawn_coordinator};
use golfrush_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{GolfRushError, ServerConfig};

/// Command queue depth of the coordinator.
const COORDINATOR_CHANNEL_SIZE: usize = 256;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) coordinator: CoordinatorHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Golf Rush server.
///
/// # Example
///
/// ```rust,no_run
/// use golfrush::prelude::*;
///
/// # async fn run() -> Result<(), GolfRushError> {
/// let server = GolfRushServer::builder()
///     .bind("127.0.0.1:3000")
///     .room_config(RoomConfig { capacity: 4, ..RoomConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GolfRushServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    registry_config: RegistryConfig,
}

impl GolfRushServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from a loaded [`ServerConfig`].
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind,
            room_config: config.room,
            registry_config: config.registry,
        }
    }

    /// Replaces every setting with those in `config`.
    pub fn config(self, config: ServerConfig) -> Self {
        Self::from_config(config)
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the player registry configuration.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Binds the listener and starts the coordinator.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what the
    /// browser client speaks.
    pub async fn build(self) -> Result<GolfRushServer<JsonCodec>, GolfRushError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let coordinator = spawn_coordinator(
            self.room_config,
            self.registry_config,
            COORDINATOR_CHANNEL_SIZE,
        );

        let state = Arc::new(ServerState {
            coordinator,
            codec: JsonCodec,
        });

        Ok(GolfRushServer { transport, state })
    }
}

impl Default for GolfRushServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Golf Rush server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GolfRushServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl GolfRushServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GolfRushServerBuilder {
        GolfRushServerBuilder::new()
    }
}

impl<C: Codec> GolfRushServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, GolfRushError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the coordinator, for inspecting room state.
    pub fn coordinator(&self) -> CoordinatorHandle {
        self.state.coordinator.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), GolfRushError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Golf Rush server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
