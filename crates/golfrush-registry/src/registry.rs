//! The player registry: every live player record, keyed by identity.
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is a plain `HashMap` with no locking. It is owned by
//! the coordinator task and only ever touched from there.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use golfrush_protocol::{PlayerId, PlayerView};

use crate::{PlayerPatch, PlayerRecord, RegistryConfig, RegistryError};

/// Owns the per-player records of every connected player.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, PlayerRecord>,
    config: RegistryConfig,
}

impl PlayerRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            players: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Creates a fresh record for `player_id`, replacing any existing one.
    ///
    /// Nothing carries over from a previous record.
    pub fn register(&mut self, player_id: PlayerId) -> &PlayerRecord {
        let record = PlayerRecord::new(player_id.clone(), self.config.spawn_position);
        match self.players.entry(player_id) {
            Entry::Occupied(mut slot) => {
                tracing::debug!(player_id = %slot.key(), "player record reset");
                slot.insert(record);
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                tracing::debug!(player_id = %slot.key(), "player record created");
                slot.insert(record)
            }
        }
    }

    /// Merges `patch` into an existing record.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if the player has no record.
    pub fn update(
        &mut self,
        player_id: &PlayerId,
        patch: PlayerPatch,
    ) -> Result<&PlayerRecord, RegistryError> {
        let record = self.get_mut(player_id)?;
        record.apply(patch);
        Ok(record)
    }

    /// Resets the round fields of an existing record, keeping its profile.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if the player has no record.
    pub fn reset_round(&mut self, player_id: &PlayerId) -> Result<(), RegistryError> {
        let spawn = self.config.spawn_position;
        self.get_mut(player_id)?.reset_round(spawn);
        Ok(())
    }

    /// Deletes a record. Removing an unknown player is a no-op.
    pub fn remove(&mut self, player_id: &PlayerId) -> Option<PlayerRecord> {
        let removed = self.players.remove(player_id);
        if removed.is_some() {
            tracing::debug!(%player_id, "player record removed");
        }
        removed
    }

    /// Looks up a record.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if the player has no record.
    pub fn get(&self, player_id: &PlayerId) -> Result<&PlayerRecord, RegistryError> {
        self.players
            .get(player_id)
            .ok_or_else(|| RegistryError::NotFound(player_id.clone()))
    }

    /// Looks up a record for in-place mutation.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if the player has no record.
    pub fn get_mut(&mut self, player_id: &PlayerId) -> Result<&mut PlayerRecord, RegistryError> {
        self.players
            .get_mut(player_id)
            .ok_or_else(|| RegistryError::NotFound(player_id.clone()))
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.contains_key(player_id)
    }

    /// Builds the `players` roster for the given identities, in order.
    ///
    /// Identities without a record are skipped.
    pub fn views<'a>(&self, ids: impl IntoIterator<Item = &'a PlayerId>) -> Vec<PlayerView> {
        ids.into_iter()
            .filter_map(|id| match self.players.get(id) {
                Some(record) => Some(record.view()),
                None => {
                    tracing::warn!(player_id = %id, "member has no player record");
                    None
                }
            })
            .collect()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use golfrush_protocol::{PlayerStatus, Position};
    use serde_json::json;

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    fn registry() -> PlayerRegistry {
        PlayerRegistry::new(RegistryConfig::default())
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_new_player_returns_default_record() {
        let mut reg = registry();

        let record = reg.register(pid("a"));

        assert_eq!(record.id, pid("a"));
        assert_eq!(record.position, Position::new(0.0, 10.0, 0.0));
        assert_eq!(record.status, PlayerStatus::Waiting);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_existing_player_fully_resets() {
        let mut reg = registry();
        reg.register(pid("a"));
        reg.update(
            &pid("a"),
            PlayerPatch {
                strokes: Some(7),
                user_data: Some(json!({ "name": "Ada" })),
                ..PlayerPatch::default()
            },
        )
        .unwrap();

        let record = reg.register(pid("a"));

        assert_eq!(record.strokes, 0);
        assert!(record.user_data.is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_uses_configured_spawn() {
        let mut reg = PlayerRegistry::new(RegistryConfig {
            spawn_position: Position::new(1.0, 2.0, 3.0),
        });
        assert_eq!(reg.register(pid("a")).position, Position::new(1.0, 2.0, 3.0));
    }

    // =====================================================================
    // update()
    // =====================================================================

    #[test]
    fn test_update_merges_fields() {
        let mut reg = registry();
        reg.register(pid("a"));

        let record = reg
            .update(&pid("a"), PlayerPatch::status(PlayerStatus::Ready))
            .unwrap();

        assert_eq!(record.status, PlayerStatus::Ready);
        assert_eq!(record.strokes, 0);
    }

    #[test]
    fn test_update_unknown_player_returns_not_found() {
        let mut reg = registry();

        let result = reg.update(&pid("ghost"), PlayerPatch::default());

        assert!(matches!(result, Err(RegistryError::NotFound(p)) if p == pid("ghost")));
    }

    // =====================================================================
    // remove() / get()
    // =====================================================================

    #[test]
    fn test_remove_deletes_record() {
        let mut reg = registry();
        reg.register(pid("a"));

        assert!(reg.remove(&pid("a")).is_some());
        assert!(reg.is_empty());
        assert!(matches!(reg.get(&pid("a")), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut reg = registry();
        assert!(reg.remove(&pid("nobody")).is_none());
    }

    #[test]
    fn test_reset_round_keeps_profile() {
        let mut reg = registry();
        reg.register(pid("a"));
        reg.update(&pid("a"), PlayerPatch::user_data(json!({ "name": "Ada" })))
            .unwrap();
        reg.get_mut(&pid("a")).unwrap().strokes = 4;

        reg.reset_round(&pid("a")).unwrap();

        let record = reg.get(&pid("a")).unwrap();
        assert_eq!(record.strokes, 0);
        assert_eq!(record.user_data, Some(json!({ "name": "Ada" })));
    }

    // =====================================================================
    // views()
    // =====================================================================

    #[test]
    fn test_views_preserves_order_and_skips_missing() {
        let mut reg = registry();
        reg.register(pid("b"));
        reg.register(pid("a"));

        let ids = [pid("a"), pid("ghost"), pid("b")];
        let views = reg.views(&ids);

        let order: Vec<_> = views.iter().map(|v| v.id.clone()).collect();
        assert_eq!(order, vec![pid("a"), pid("b")]);
    }
}
