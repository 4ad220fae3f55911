//! Server configuration: TOML file plus environment overrides.
//!
//! ```toml
//! bind = "0.0.0.0:3000"
//! log_level = "info"
//!
//! [room]
//! capacity = 10
//! max_name_len = 64
//! admin_only_controls = false
//!
//! [registry]
//! spawn_position = { x = 0.0, y = 10.0, z = 0.0 }
//! ```
//!
//! Every key is optional. `GOLFRUSH_BIND` and `GOLFRUSH_ROOM_CAPACITY`
//! override the file.

use std::path::Path;

use golfrush_registry::RegistryConfig;
use golfrush_room::RoomConfig;
use serde::Deserialize;

const ENV_BIND: &str = "GOLFRUSH_BIND";
const ENV_ROOM_CAPACITY: &str = "GOLFRUSH_ROOM_CAPACITY";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid config: {key} {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind: String,

    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_level: String,

    pub room: RoomConfig,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            room: RoomConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room.capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "room.capacity",
                reason: "must be at least 1",
            });
        }
        if self.room.max_name_len == 0 {
            return Err(ConfigError::Invalid {
                key: "room.max_name_len",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Applies `GOLFRUSH_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides from an arbitrary lookup (the environment, in
    /// production).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind;
        }
        if let Some(raw) = lookup(ENV_ROOM_CAPACITY) {
            self.room.capacity = match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_ROOM_CAPACITY,
                        value: raw,
                    });
                }
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use golfrush_protocol::Position;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind, "0.0.0.0:3000");
        assert_eq!(config.room.capacity, 10);
        assert_eq!(config.registry.spawn_position, Position::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_from_toml_partial_sections() {
        let config = ServerConfig::from_toml(
            r#"
            bind = "127.0.0.1:4000"

            [room]
            capacity = 4
            admin_only_controls = true

            [registry]
            spawn_position = { x = 1.0, y = 2.0, z = 3.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:4000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.room.capacity, 4);
        assert_eq!(config.room.max_name_len, 64);
        assert!(config.room.admin_only_controls);
        assert_eq!(config.registry.spawn_position, Position::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_toml_bad_type_returns_parse_error() {
        let result = ServerConfig::from_toml("[room]\ncapacity = \"ten\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_toml_zero_capacity_is_rejected() {
        let result = ServerConfig::from_toml("[room]\ncapacity = 0");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "room.capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_from_toml_zero_name_len_is_rejected() {
        let result = ServerConfig::from_toml("[room]\nmax_name_len = 0");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_missing_file_returns_io_error() {
        let result = ServerConfig::load("/definitely/not/here/golfrush.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_with_overrides_replaces_bind_and_capacity() {
        let config = ServerConfig::default()
            .with_overrides(|var| match var {
                "GOLFRUSH_BIND" => Some("127.0.0.1:9000".into()),
                "GOLFRUSH_ROOM_CAPACITY" => Some("6".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.room.capacity, 6);
    }

    #[test]
    fn test_with_overrides_rejects_bad_capacity() {
        for bad in ["zero", "0", "-3"] {
            let result = ServerConfig::default().with_overrides(|var| {
                (var == "GOLFRUSH_ROOM_CAPACITY").then(|| bad.to_string())
            });
            assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })), "{bad}");
        }
    }

    #[test]
    fn test_with_overrides_none_set_is_identity() {
        let config = ServerConfig::default().with_overrides(no_env).unwrap();
        assert_eq!(config, ServerConfig::default());
    }
}
