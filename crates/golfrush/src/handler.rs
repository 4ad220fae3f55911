//! Per-connection handler: identity, event routing and outbound delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Assign a fresh `PlayerId` and register an outbox with the coordinator
//!   2. Loop: inbound frames → decode → coordinator,
//!      outbox events → encode → socket
//!   3. On exit (close, error or panic) the guard reports the disconnect

use std::sync::Arc;

use golfrush_protocol::{ClientEvent, Codec, PlayerId};
use golfrush_room::CoordinatorHandle;
use golfrush_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::GolfRushError;
use crate::server::ServerState;

/// Drop guard that tells the coordinator the player is gone.
///
/// `Drop` is synchronous, so the command is queued without waiting.
struct DisconnectGuard {
    player_id: PlayerId,
    coordinator: CoordinatorHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.coordinator.disconnect_detached(self.player_id.clone());
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GolfRushError> {
    let conn_id = conn.id();
    let player_id = PlayerId::generate();
    tracing::debug!(%conn_id, %player_id, "handling new connection");

    let (outbox, mut inbox) = mpsc::unbounded_channel();
    state.coordinator.connect(player_id.clone(), outbox).await?;
    let _guard = DisconnectGuard {
        player_id: player_id.clone(),
        coordinator: state.coordinator.clone(),
    };

    loop {
        tokio::select! {
            frame = conn.recv() => match frame {
                Ok(Some(data)) => dispatch(&state, &player_id, &data).await?,
                Ok(None) => {
                    tracing::info!(%player_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "recv error");
                    break;
                }
            },
            outbound = inbox.recv() => match outbound {
                Some(event) => {
                    let text = state.codec.encode(&event)?;
                    conn.send(&text).await?;
                }
                // The coordinator dropped our outbox; nothing more will come.
                None => break,
            },
        }
    }

    // _guard drops here → disconnect fires.
    Ok(())
}

/// Decodes one inbound frame and hands it to the coordinator.
///
/// Malformed frames are logged and skipped; the connection stays open.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    player_id: &PlayerId,
    data: &[u8],
) -> Result<(), GolfRushError> {
    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "failed to decode client event");
            return Ok(());
        }
    };

    state.coordinator.event(player_id.clone(), event).await?;
    Ok(())
}
