//! The coordinator actor: the single owner of all room and player state.
//!
//! One Tokio task holds the [`RoomManager`], the [`PlayerRegistry`] and the
//! [`Broadcaster`]. Connection handlers talk to it through a cloneable
//! [`CoordinatorHandle`]. Commands are processed one at a time, so every
//! event runs validate → mutate → broadcast without interleaving.

use golfrush_protocol::{ClientEvent, PlayerId, PlayerView, RoomSummary, RoomView, ServerEvent};
use golfrush_registry::{PlayerRegistry, RegistryConfig};
use tokio::sync::{mpsc, oneshot};

use crate::{Broadcaster, Outbox, RoomConfig, RoomError, RoomManager, RoomSync};

/// Commands sent to the coordinator through its channel.
///
/// Query variants carry a `oneshot::Sender` to reply on.
pub(crate) enum Command {
    /// A new connection: subscribe its outbox and greet it.
    Connect { player_id: PlayerId, outbox: Outbox },

    /// An inbound client event.
    Event {
        player_id: PlayerId,
        event: ClientEvent,
    },

    /// The connection closed.
    Disconnect { player_id: PlayerId },

    ListRooms {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },

    GetRoom {
        name: String,
        reply: oneshot::Sender<Option<RoomView>>,
    },

    GetPlayer {
        player_id: PlayerId,
        reply: oneshot::Sender<Option<PlayerView>>,
    },

    Shutdown,
}

/// Handle to the running coordinator. Cheap to clone.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Registers a connection. It receives `connected` and the current
    /// room index on `outbox`.
    pub async fn connect(&self, player_id: PlayerId, outbox: Outbox) -> Result<(), RoomError> {
        self.send(Command::Connect { player_id, outbox }).await
    }

    /// Submits a client event (fire-and-forget).
    pub async fn event(&self, player_id: PlayerId, event: ClientEvent) -> Result<(), RoomError> {
        self.send(Command::Event { player_id, event }).await
    }

    /// Reports a closed connection.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.send(Command::Disconnect { player_id }).await
    }

    /// Reports a closed connection from a synchronous context.
    ///
    /// Falls back to a spawned send when the channel is momentarily full.
    pub fn disconnect_detached(&self, player_id: PlayerId) {
        match self.sender.try_send(Command::Disconnect { player_id }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(cmd)) => {
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let _ = sender.send(cmd).await;
                });
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("coordinator gone, disconnect dropped");
            }
        }
    }

    /// Returns the room index, ordered by name.
    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ListRooms { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Returns one room's view, if it exists.
    pub async fn get_room(&self, name: impl Into<String>) -> Result<Option<RoomView>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::GetRoom {
            name: name.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Returns a player's view, if they have a record.
    pub async fn get_player(&self, player_id: PlayerId) -> Result<Option<PlayerView>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::GetPlayer { player_id, reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the coordinator to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, cmd: Command) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// The coordinator's state. Runs inside a Tokio task.
struct Coordinator {
    rooms: RoomManager,
    registry: PlayerRegistry,
    broadcaster: Broadcaster,
    receiver: mpsc::Receiver<Command>,
}

impl Coordinator {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!("room coordinator started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Connect { player_id, outbox } => {
                    self.handle_connect(player_id, outbox);
                }
                Command::Event { player_id, event } => {
                    self.handle_event(player_id, event);
                }
                Command::Disconnect { player_id } => {
                    self.handle_disconnect(player_id);
                }
                Command::ListRooms { reply } => {
                    let _ = reply.send(self.rooms.summaries());
                }
                Command::GetRoom { name, reply } => {
                    let _ = reply.send(self.rooms.room(&name).map(|room| room.view()));
                }
                Command::GetPlayer { player_id, reply } => {
                    let view = self.registry.get(&player_id).ok().map(|r| r.view());
                    let _ = reply.send(view);
                }
                Command::Shutdown => {
                    tracing::info!("room coordinator shutting down");
                    break;
                }
            }
        }

        tracing::info!("room coordinator stopped");
    }

    fn handle_connect(&mut self, player_id: PlayerId, outbox: Outbox) {
        tracing::info!(%player_id, "player connected");
        self.broadcaster.subscribe(player_id.clone(), outbox);
        self.broadcaster.send_to(
            &player_id,
            ServerEvent::Connected {
                id: player_id.clone(),
            },
        );
        self.broadcaster
            .send_to(&player_id, ServerEvent::UpdateRooms(self.rooms.summaries()));
    }

    fn handle_event(&mut self, player_id: PlayerId, event: ClientEvent) {
        let name = event.name();
        tracing::debug!(%player_id, event = name, room = event.room_name(), "client event");

        match self.apply(&player_id, event) {
            Ok(syncs) => {
                self.broadcaster.sync(&self.rooms, &self.registry, &syncs);
            }
            Err(e) => {
                tracing::debug!(%player_id, event = name, error = %e, "event rejected");
            }
        }
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) {
        self.broadcaster.unsubscribe(&player_id);
        let syncs = self.rooms.disconnect(&mut self.registry, &player_id);
        tracing::info!(%player_id, "player disconnected");
        self.broadcaster.sync(&self.rooms, &self.registry, &syncs);
    }

    /// Routes one event to the room manager.
    fn apply(&mut self, player_id: &PlayerId, event: ClientEvent) -> Result<Vec<RoomSync>, RoomError> {
        let rooms = &mut self.rooms;
        let registry = &mut self.registry;

        match event {
            ClientEvent::JoinRoom { room_name } => rooms.join_room(registry, &room_name, player_id),
            ClientEvent::CreateRoom { room_name } => {
                rooms.create_room(registry, &room_name, player_id, &[])
            }
            ClientEvent::LeaveRoom { room_name } => rooms.leave_room(registry, &room_name, player_id),
            ClientEvent::TogglePlayerRoomReady { room_name } => {
                rooms.toggle_ready(registry, &room_name, player_id)
            }
            ClientEvent::Start { room_name } => rooms.start_room(&room_name, player_id),
            ClientEvent::RestartRoom { room_name } => {
                rooms.restart_room(registry, &room_name, player_id)
            }
            ClientEvent::SetPlayerData {
                room_name,
                user_data,
            } => rooms.set_profile_data(registry, &room_name, player_id, user_data),
            ClientEvent::UpdatePlayer {
                room_name,
                position,
            } => rooms.update_position(registry, &room_name, player_id, position),
            ClientEvent::UpdatePlayerStrokes { room_name } => {
                rooms.increment_strokes(registry, &room_name, player_id)
            }
            ClientEvent::PlayerHole {
                room_name,
                player_hole,
                time,
                time_formatted,
            } => {
                if !player_hole {
                    return Ok(Vec::new());
                }
                rooms.record_hole(registry, &room_name, player_id, time, time_formatted)
            }
        }
    }
}

/// Spawns the coordinator task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_coordinator(
    room_config: RoomConfig,
    registry_config: RegistryConfig,
    channel_size: usize,
) -> CoordinatorHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let coordinator = Coordinator {
        rooms: RoomManager::new(room_config),
        registry: PlayerRegistry::new(registry_config),
        broadcaster: Broadcaster::new(),
        receiver: rx,
    };

    tokio::spawn(coordinator.run());

    CoordinatorHandle { sender: tx }
}
