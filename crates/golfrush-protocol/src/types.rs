//! Core protocol types for Golf Rush's wire format.
//!
//! Everything here travels "on the wire": inbound [`ClientEvent`]s decoded
//! from client frames, and outbound [`ServerEvent`]s carrying derived views
//! of room and player state.
//!
//! Both directions share one JSON envelope shape:
//!
//! ```text
//! { "event": "join-room", "data": { "roomName": "R1" } }
//! ```
//!
//! Event names are kebab-case and payload fields are camelCase.

use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of a generated [`PlayerId`].
const PLAYER_ID_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque identity of a connected player.
///
/// Assigned once per connection and stable for its lifetime. Serialized as
/// a plain string, so `PlayerId("a1B2")` becomes `"a1B2"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Generates a fresh random identity (20 alphanumeric characters).
    ///
    /// Identities are visible to every member of a room, so they are random
    /// rather than sequential.
    pub fn generate() -> Self {
        let id: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(PLAYER_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Player state
// ---------------------------------------------------------------------------

/// A point in the 3D course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Whether a player has signalled they are ready to tee off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStatus {
    #[default]
    Waiting,
    Ready,
}

impl PlayerStatus {
    /// Returns the opposite readiness.
    pub fn toggled(self) -> Self {
        match self {
            Self::Waiting => Self::Ready,
            Self::Ready => Self::Waiting,
        }
    }

    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("waiting"),
            Self::Ready => f.write_str("ready"),
        }
    }
}

// ---------------------------------------------------------------------------
// Room state
// ---------------------------------------------------------------------------

/// The lifecycle status of a room.
///
/// ```text
/// lobby ⇄ lobby-ready → start → finished → lobby (restart)
/// ```
///
/// `lobby-ready` is derived: the room sits there exactly while every
/// member is ready. The transition rules live in the room crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomStatus {
    #[default]
    Lobby,
    LobbyReady,
    Start,
    Finished,
}

impl RoomStatus {
    /// Returns `true` for `lobby` and its derived `lobby-ready` substate.
    pub fn is_lobby(self) -> bool {
        matches!(self, Self::Lobby | Self::LobbyReady)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => f.write_str("lobby"),
            Self::LobbyReady => f.write_str("lobby-ready"),
            Self::Start => f.write_str("start"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Views (derived, read-only snapshots)
// ---------------------------------------------------------------------------

/// A player's full record as seen by the other members of their room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub pos: Position,
    pub status: PlayerStatus,
    pub holed: bool,
    /// Milliseconds since the Unix epoch at which the player holed out.
    pub holed_time: Option<i64>,
    /// Elapsed time reported by the client when holing out.
    pub time: f64,
    pub time_formatted: Option<String>,
    pub strokes: u32,
    pub user_data: Option<serde_json::Value>,
}

/// A room's own record, sent to its members (`update-room`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub name: String,
    pub status: RoomStatus,
    pub admin: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    /// Members in join order.
    pub players: Vec<PlayerId>,
    pub players_count: usize,
}

/// One entry of the global room index (`update-rooms`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub name: String,
    pub status: RoomStatus,
    pub admin: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub players_count: usize,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

fn default_player_hole() -> bool {
    true
}

/// Events a client sends to the server.
///
/// Disconnection is not an event; the transport reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Join a room, creating it if it doesn't exist.
    JoinRoom { room_name: String },

    /// Create an empty room owned by the sender.
    CreateRoom { room_name: String },

    LeaveRoom { room_name: String },

    /// Flip the sender's readiness.
    TogglePlayerRoomReady { room_name: String },

    /// Tee off: move the room to `start`.
    Start { room_name: String },

    /// Back to the lobby with a clean scorecard.
    RestartRoom { room_name: String },

    /// Replace the sender's opaque profile data.
    SetPlayerData {
        room_name: String,
        user_data: serde_json::Value,
    },

    /// Report the sender's ball position.
    UpdatePlayer {
        room_name: String,
        #[serde(alias = "pos")]
        position: Position,
    },

    /// Count one stroke for the sender.
    UpdatePlayerStrokes { room_name: String },

    /// The sender's ball dropped in the hole.
    PlayerHole {
        room_name: String,
        #[serde(default = "default_player_hole")]
        player_hole: bool,
        #[serde(default)]
        time: f64,
        #[serde(default)]
        time_formatted: String,
    },
}

impl ClientEvent {
    /// The room this event targets.
    pub fn room_name(&self) -> &str {
        match self {
            Self::JoinRoom { room_name }
            | Self::CreateRoom { room_name }
            | Self::LeaveRoom { room_name }
            | Self::TogglePlayerRoomReady { room_name }
            | Self::Start { room_name }
            | Self::RestartRoom { room_name }
            | Self::SetPlayerData { room_name, .. }
            | Self::UpdatePlayer { room_name, .. }
            | Self::UpdatePlayerStrokes { room_name }
            | Self::PlayerHole { room_name, .. } => room_name,
        }
    }

    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::CreateRoom { .. } => "create-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::TogglePlayerRoomReady { .. } => "toggle-player-room-ready",
            Self::Start { .. } => "start",
            Self::RestartRoom { .. } => "restart-room",
            Self::SetPlayerData { .. } => "set-player-data",
            Self::UpdatePlayer { .. } => "update-player",
            Self::UpdatePlayerStrokes { .. } => "update-player-strokes",
            Self::PlayerHole { .. } => "player-hole",
        }
    }
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once to a new connection, carrying its own identity.
    Connected { id: PlayerId },

    /// The global room index, sent to every connection.
    UpdateRooms(Vec<RoomSummary>),

    /// A room's own record, sent to its members.
    UpdateRoom(RoomView),

    /// The roster of a room, sent to its members.
    Players(Vec<PlayerView>),
}

impl ServerEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::UpdateRooms(_) => "update-rooms",
            Self::UpdateRoom(_) => "update-room",
            Self::Players(_) => "players",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact JSON shapes, so these tests pin
    //! event names, field casing and status strings.

    use super::*;
    use serde_json::json;

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    // =====================================================================
    // PlayerId
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&pid("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_player_id_generate_is_alphanumeric_and_unique() {
        let a = PlayerId::generate();
        let b = PlayerId::generate();
        assert_eq!(a.as_str().len(), PLAYER_ID_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    // =====================================================================
    // Statuses
    // =====================================================================

    #[test]
    fn test_room_status_wire_names() {
        assert_eq!(serde_json::to_value(RoomStatus::Lobby).unwrap(), "lobby");
        assert_eq!(
            serde_json::to_value(RoomStatus::LobbyReady).unwrap(),
            "lobby-ready"
        );
        assert_eq!(serde_json::to_value(RoomStatus::Start).unwrap(), "start");
        assert_eq!(
            serde_json::to_value(RoomStatus::Finished).unwrap(),
            "finished"
        );
    }

    #[test]
    fn test_room_status_display_matches_wire() {
        for status in [
            RoomStatus::Lobby,
            RoomStatus::LobbyReady,
            RoomStatus::Start,
            RoomStatus::Finished,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, status.to_string());
        }
    }

    #[test]
    fn test_room_status_is_lobby() {
        assert!(RoomStatus::Lobby.is_lobby());
        assert!(RoomStatus::LobbyReady.is_lobby());
        assert!(!RoomStatus::Start.is_lobby());
        assert!(!RoomStatus::Finished.is_lobby());
    }

    #[test]
    fn test_player_status_toggled_flips() {
        assert_eq!(PlayerStatus::Waiting.toggled(), PlayerStatus::Ready);
        assert_eq!(PlayerStatus::Ready.toggled(), PlayerStatus::Waiting);
        assert_eq!(serde_json::to_value(PlayerStatus::Ready).unwrap(), "ready");
    }

    // =====================================================================
    // ClientEvent
    // =====================================================================

    #[test]
    fn test_client_event_join_room_decodes() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "join-room",
            "data": { "roomName": "R1" }
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_name: "R1".into()
            }
        );
        assert_eq!(event.room_name(), "R1");
        assert_eq!(event.name(), "join-room");
    }

    #[test]
    fn test_client_event_toggle_ready_uses_kebab_name() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "toggle-player-room-ready",
            "data": { "roomName": "R2" }
        }))
        .unwrap();
        assert!(matches!(event, ClientEvent::TogglePlayerRoomReady { .. }));
    }

    #[test]
    fn test_client_event_update_player_accepts_pos_alias() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "update-player",
            "data": { "roomName": "R1", "pos": { "x": 1.0, "y": 2.0, "z": 3.0 } }
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::UpdatePlayer {
                room_name: "R1".into(),
                position: Position::new(1.0, 2.0, 3.0),
            }
        );
    }

    #[test]
    fn test_client_event_player_hole_fields() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "player-hole",
            "data": {
                "roomName": "R3",
                "playerHole": true,
                "time": 12.5,
                "timeFormatted": "00:12.50"
            }
        }))
        .unwrap();
        match event {
            ClientEvent::PlayerHole {
                player_hole,
                time,
                time_formatted,
                ..
            } => {
                assert!(player_hole);
                assert_eq!(time, 12.5);
                assert_eq!(time_formatted, "00:12.50");
            }
            other => panic!("expected PlayerHole, got {other:?}"),
        }
    }

    #[test]
    fn test_client_event_player_hole_defaults_flag_to_true() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "player-hole",
            "data": { "roomName": "R3" }
        }))
        .unwrap();
        assert!(matches!(
            event,
            ClientEvent::PlayerHole {
                player_hole: true,
                ..
            }
        ));
    }

    #[test]
    fn test_client_event_set_player_data_keeps_opaque_payload() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "set-player-data",
            "data": { "roomName": "R1", "userData": { "name": "Ada", "color": 3 } }
        }))
        .unwrap();
        match event {
            ClientEvent::SetPlayerData { user_data, .. } => {
                assert_eq!(user_data["name"], "Ada");
                assert_eq!(user_data["color"], 3);
            }
            other => panic!("expected SetPlayerData, got {other:?}"),
        }
    }

    #[test]
    fn test_client_event_unknown_name_is_rejected() {
        let result: Result<ClientEvent, _> = serde_json::from_value(json!({
            "event": "teleport",
            "data": { "roomName": "R1" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_missing_room_name_is_rejected() {
        let result: Result<ClientEvent, _> = serde_json::from_value(json!({
            "event": "leave-room",
            "data": {}
        }));
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_server_event_connected_carries_id() {
        let json = serde_json::to_value(ServerEvent::Connected { id: pid("me") }).unwrap();
        assert_eq!(json, json!({ "event": "connected", "data": { "id": "me" } }));
    }

    #[test]
    fn test_server_event_update_rooms_shape() {
        let event = ServerEvent::UpdateRooms(vec![RoomSummary {
            name: "R1".into(),
            status: RoomStatus::LobbyReady,
            admin: Some(pid("a")),
            winner: None,
            players_count: 2,
        }]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "update-rooms");
        assert_eq!(json["data"][0]["name"], "R1");
        assert_eq!(json["data"][0]["status"], "lobby-ready");
        assert_eq!(json["data"][0]["admin"], "a");
        assert!(json["data"][0]["winner"].is_null());
        assert_eq!(json["data"][0]["playersCount"], 2);
    }

    #[test]
    fn test_server_event_players_uses_camel_case_fields() {
        let event = ServerEvent::Players(vec![PlayerView {
            id: pid("a"),
            pos: Position::new(0.0, 10.0, 0.0),
            status: PlayerStatus::Waiting,
            holed: true,
            holed_time: Some(1_700_000_000_000),
            time: 9.0,
            time_formatted: Some("00:09.00".into()),
            strokes: 4,
            user_data: None,
        }]);
        let json = serde_json::to_value(&event).unwrap();
        let player = &json["data"][0];
        assert_eq!(json["event"], "players");
        assert_eq!(player["pos"]["y"], 10.0);
        assert_eq!(player["holedTime"], 1_700_000_000_000i64);
        assert_eq!(player["timeFormatted"], "00:09.00");
        assert_eq!(player["strokes"], 4);
        assert!(player["userData"].is_null());
    }

    #[test]
    fn test_server_event_update_room_shape() {
        let event = ServerEvent::UpdateRoom(RoomView {
            name: "R3".into(),
            status: RoomStatus::Finished,
            admin: Some(pid("a")),
            winner: Some(pid("a")),
            players: vec![pid("a"), pid("b")],
            players_count: 2,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "update-room");
        assert_eq!(json["data"]["winner"], "a");
        assert_eq!(json["data"]["players"], json!(["a", "b"]));
        assert_eq!(json["data"]["playersCount"], 2);
        assert_eq!(event.name(), "update-room");
    }
}
