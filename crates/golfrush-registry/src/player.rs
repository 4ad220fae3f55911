//! Player records: the server's copy of each player's round state.

use chrono::{DateTime, Utc};
use golfrush_protocol::{PlayerId, PlayerStatus, PlayerView, Position};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Configuration for new and reset player records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Where players are placed when they join or a round restarts.
    ///
    /// Default: `{x: 0, y: 10, z: 0}`, just above the tee.
    pub spawn_position: Position,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            spawn_position: Position::new(0.0, 10.0, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// A single player's mutable state.
///
/// Created (or fully reset) when the player joins a room and removed when
/// they disconnect. Rooms only hold the [`PlayerId`]; this is the one
/// authoritative copy of everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub position: Position,
    pub status: PlayerStatus,

    /// Whether the ball is in the hole this round.
    pub holed: bool,

    /// Server time at which the player holed out.
    pub holed_at: Option<DateTime<Utc>>,

    /// Elapsed round time as reported by the client.
    pub time: f64,
    pub time_formatted: Option<String>,

    pub strokes: u32,

    /// Opaque client profile (name, colour, ...). Never interpreted.
    pub user_data: Option<Value>,
}

impl PlayerRecord {
    /// Creates a fresh record at the spawn point.
    pub fn new(id: PlayerId, spawn: Position) -> Self {
        Self {
            id,
            position: spawn,
            status: PlayerStatus::Waiting,
            holed: false,
            holed_at: None,
            time: 0.0,
            time_formatted: None,
            strokes: 0,
            user_data: None,
        }
    }

    /// Clears all per-round fields, keeping identity and profile data.
    pub fn reset_round(&mut self, spawn: Position) {
        self.position = spawn;
        self.status = PlayerStatus::Waiting;
        self.holed = false;
        self.holed_at = None;
        self.time = 0.0;
        self.time_formatted = None;
        self.strokes = 0;
    }

    /// Applies every field set in `patch`.
    pub fn apply(&mut self, patch: PlayerPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(holed) = patch.holed {
            self.holed = holed;
        }
        if let Some(at) = patch.holed_at {
            self.holed_at = Some(at);
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(formatted) = patch.time_formatted {
            self.time_formatted = Some(formatted);
        }
        if let Some(strokes) = patch.strokes {
            self.strokes = strokes;
        }
        if let Some(data) = patch.user_data {
            self.user_data = Some(data);
        }
    }

    /// Builds the wire view sent in `players`.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            pos: self.position,
            status: self.status,
            holed: self.holed,
            holed_time: self.holed_at.map(|at| at.timestamp_millis()),
            time: self.time,
            time_formatted: self.time_formatted.clone(),
            strokes: self.strokes,
            user_data: self.user_data.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerPatch
// ---------------------------------------------------------------------------

/// A partial update to a [`PlayerRecord`]. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub position: Option<Position>,
    pub status: Option<PlayerStatus>,
    pub holed: Option<bool>,
    pub holed_at: Option<DateTime<Utc>>,
    pub time: Option<f64>,
    pub time_formatted: Option<String>,
    pub strokes: Option<u32>,
    pub user_data: Option<Value>,
}

impl PlayerPatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn status(status: PlayerStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn user_data(data: Value) -> Self {
        Self {
            user_data: Some(data),
            ..Self::default()
        }
    }

    /// Marks the player holed at `at` with the client-reported times.
    pub fn holed(at: DateTime<Utc>, time: f64, time_formatted: String) -> Self {
        Self {
            holed: Some(true),
            holed_at: Some(at),
            time: Some(time),
            time_formatted: Some(time_formatted),
            ..Self::default()
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> PlayerRecord {
        PlayerRecord::new(PlayerId::from("p1"), RegistryConfig::default().spawn_position)
    }

    #[test]
    fn test_new_starts_at_spawn_waiting_and_clean() {
        let r = record();
        assert_eq!(r.position, Position::new(0.0, 10.0, 0.0));
        assert_eq!(r.status, PlayerStatus::Waiting);
        assert!(!r.holed);
        assert!(r.holed_at.is_none());
        assert_eq!(r.strokes, 0);
        assert!(r.user_data.is_none());
    }

    #[test]
    fn test_reset_round_keeps_identity_and_profile() {
        let mut r = record();
        r.apply(PlayerPatch::holed(Utc::now(), 12.0, "00:12".into()));
        r.apply(PlayerPatch::user_data(json!({ "name": "Ada" })));
        r.strokes = 5;
        r.status = PlayerStatus::Ready;
        r.position = Position::new(4.0, 0.0, 4.0);

        r.reset_round(Position::new(0.0, 10.0, 0.0));

        assert_eq!(r.id, PlayerId::from("p1"));
        assert_eq!(r.user_data, Some(json!({ "name": "Ada" })));
        assert!(!r.holed);
        assert!(r.holed_at.is_none());
        assert_eq!(r.time, 0.0);
        assert!(r.time_formatted.is_none());
        assert_eq!(r.strokes, 0);
        assert_eq!(r.status, PlayerStatus::Waiting);
        assert_eq!(r.position, Position::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_apply_only_touches_set_fields() {
        let mut r = record();
        r.strokes = 3;
        r.apply(PlayerPatch::position(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(r.position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(r.strokes, 3);
        assert_eq!(r.status, PlayerStatus::Waiting);
    }

    #[test]
    fn test_apply_user_data_replaces_previous_payload() {
        let mut r = record();
        r.apply(PlayerPatch::user_data(json!({ "name": "Ada", "avatar": "x" })));
        r.apply(PlayerPatch::user_data(json!({ "name": "Bob" })));
        assert_eq!(r.user_data, Some(json!({ "name": "Bob" })));
    }

    #[test]
    fn test_apply_user_data_accepts_non_object() {
        let mut r = record();
        r.apply(PlayerPatch::user_data(json!({ "name": "Ada" })));
        r.apply(PlayerPatch::user_data(json!("plain")));
        assert_eq!(r.user_data, Some(json!("plain")));
    }

    #[test]
    fn test_view_reports_holed_time_in_millis() {
        let mut r = record();
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        r.apply(PlayerPatch::holed(at, 9.5, "00:09.50".into()));

        let view = r.view();
        assert!(view.holed);
        assert_eq!(view.holed_time, Some(1_700_000_000_123));
        assert_eq!(view.time, 9.5);
        assert_eq!(view.time_formatted.as_deref(), Some("00:09.50"));
    }
}
