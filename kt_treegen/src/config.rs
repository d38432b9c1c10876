//! Tree generator configuration management.
//!
//! Consolidates environment variable reads and command line overrides.

use kendo_tournaments::db::DatabaseConfig;
use kendo_tournaments::tree::{EntityLevel, TournamentSettings, TreeType};

/// Complete generator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct TreegenConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Entity level kept apart in the first rounds, if any
    pub group_by: Option<EntityLevel>,
    /// Create missing tables before generating
    pub init_schema: bool,
}

impl TreegenConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `group_by_override` - Optional entity level override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `TREEGEN_GROUP_BY` holds an unknown level
    pub fn from_env(
        database_url_override: Option<String>,
        group_by_override: Option<EntityLevel>,
    ) -> Result<Self, ConfigError> {
        let defaults = DatabaseConfig::development();

        let database_url = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or(defaults.database_url);

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_env_or(
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
        };

        let group_by = match group_by_override {
            Some(level) => Some(level),
            None => match std::env::var("TREEGEN_GROUP_BY") {
                Ok(value) if !value.is_empty() => {
                    Some(value.parse().map_err(|reason| ConfigError::Invalid {
                        var: "TREEGEN_GROUP_BY".to_string(),
                        reason,
                    })?)
                }
                _ => None,
            },
        };

        Ok(TreegenConfig {
            database,
            group_by,
            init_schema: parse_env_or("TREEGEN_INIT_SCHEMA", false),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Settings given on the command line, merged into the stored ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub has_preliminary: Option<bool>,
    pub preliminary_group_size: Option<usize>,
    pub tree_type: Option<TreeType>,
    pub fighting_areas: Option<usize>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Stored settings with every given override applied
    pub fn apply(&self, stored: TournamentSettings) -> TournamentSettings {
        TournamentSettings {
            has_preliminary: self.has_preliminary.unwrap_or(stored.has_preliminary),
            preliminary_group_size: self
                .preliminary_group_size
                .unwrap_or(stored.preliminary_group_size),
            tree_type: self.tree_type.unwrap_or(stored.tree_type),
            fighting_areas: self.fighting_areas.unwrap_or(stored.fighting_areas),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_connections: u32, min_connections: u32) -> TreegenConfig {
        TreegenConfig {
            database: DatabaseConfig {
                max_connections,
                min_connections,
                ..DatabaseConfig::development()
            },
            group_by: None,
            init_schema: false,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "TREEGEN_GROUP_BY".to_string(),
            reason: "unknown entity level: dojo".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TREEGEN_GROUP_BY"));
        assert!(msg.contains("dojo"));
    }

    #[test]
    fn test_config_validation() {
        assert!(config(5, 1).validate().is_ok());
        assert!(matches!(config(0, 0).validate(), Err(ConfigError::Invalid { .. })));
        assert!(matches!(config(2, 3).validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = SettingsOverrides {
            has_preliminary: Some(true),
            preliminary_group_size: Some(4),
            tree_type: None,
            fighting_areas: Some(2),
        };

        let merged = overrides.apply(TournamentSettings::default());

        assert!(merged.has_preliminary);
        assert_eq!(merged.preliminary_group_size, 4);
        assert_eq!(merged.tree_type, TreeType::DirectElimination);
        assert_eq!(merged.fighting_areas, 2);
    }

    #[test]
    fn test_empty_overrides_keep_stored_settings() {
        let overrides = SettingsOverrides::default();
        let stored = TournamentSettings {
            has_preliminary: true,
            preliminary_group_size: 5,
            tree_type: TreeType::RoundRobin,
            fighting_areas: 4,
        };

        assert!(overrides.is_empty());
        assert_eq!(overrides.apply(stored), stored);
    }

    #[test]
    fn test_group_by_override_wins() {
        let config = TreegenConfig::from_env(
            Some("postgres://localhost/other".to_string()),
            Some(EntityLevel::Federation),
        )
        .unwrap();

        assert_eq!(config.database.database_url, "postgres://localhost/other");
        assert_eq!(config.group_by, Some(EntityLevel::Federation));
    }
}
