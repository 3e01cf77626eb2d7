//! # CLI Configuration
//!
//! Layered settings for the `tripsplit` binary.
//!
//! ## Configuration Priority
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Configuration Priority                              │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     TRIPSPLIT_DATABASE_PATH, TRIPSPLIT_TRIP_NAME,                      │
//! │     TRIPSPLIT_MAX_CONNECTIONS, TRIPSPLIT_LOG_FILTER                    │
//! │                                                                         │
//! │  2. Config File                                                         │
//! │     --config <path>, or ./tripsplit.toml when present                  │
//! │                                                                         │
//! │  3. Defaults (lowest priority)                                          │
//! │     database in the platform data directory                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example `tripsplit.toml`
//! ```toml
//! database_path = "lake-weekend.db"
//! trip_name = "Lake weekend"
//! log_filter = "warn"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, Source};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tripsplit.toml";

/// Prefix for environment overrides (`TRIPSPLIT_DATABASE_PATH`, ...).
pub const ENV_PREFIX: &str = "TRIPSPLIT";

const DATABASE_FILE: &str = "tripsplit.db";

/// Default tracing filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tripsplit=debug,sqlx=warn";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// AppConfig
// =============================================================================

/// Settings for one `tripsplit` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the trip.
    pub database_path: PathBuf,

    /// Shown in report headers.
    pub trip_name: String,

    /// Pool size for the database.
    pub max_connections: u32,

    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            trip_name: "Trip".to_string(),
            max_connections: 4,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the file (if any) and the environment.
    ///
    /// An explicit `path` must exist; the default `tripsplit.toml` is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let environment = Environment::with_prefix(ENV_PREFIX).try_parsing(true);

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile(path.to_path_buf()));
                }
                Self::from_sources(File::from(path).required(true), environment)
            }
            None => Self::from_sources(
                File::with_name(DEFAULT_CONFIG_FILE).required(false),
                environment,
            ),
        }
    }

    /// Builds the config from a file source overlaid by an environment source.
    fn from_sources<S>(file: S, environment: Environment) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config: AppConfig = Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "database_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_connections".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.trip_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "trip_name".to_string(),
                message: "must not be blank".to_string(),
            });
        }

        Ok(())
    }
}

/// Platform data directory for the database.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.tripsplit.tripsplit/tripsplit.db`
/// - **Windows**: `%APPDATA%\tripsplit\tripsplit\data\tripsplit.db`
/// - **Linux**: `~/.local/share/tripsplit/tripsplit.db`
///
/// Falls back to the working directory when no home directory is known.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "tripsplit", "tripsplit")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(map))
    }

    fn toml(contents: &str) -> File<config::FileSourceString, FileFormat> {
        File::from_str(contents, FileFormat::Toml)
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_sources(toml(""), env(&[])).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.database_path.ends_with("tripsplit.db"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = AppConfig::from_sources(
            toml("database_path = \"lake.db\"\ntrip_name = \"Lake weekend\""),
            env(&[]),
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("lake.db"));
        assert_eq!(config.trip_name, "Lake weekend");
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn test_environment_overrides_file() {
        let config = AppConfig::from_sources(
            toml("database_path = \"lake.db\"\nmax_connections = 2"),
            env(&[
                ("TRIPSPLIT_DATABASE_PATH", "/tmp/other.db"),
                ("TRIPSPLIT_MAX_CONNECTIONS", "8"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_sources(toml("max_connections = 0"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "max_connections"));

        let err = AppConfig::from_sources(toml("trip_name = \"  \""), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "trip_name"));

        let err = AppConfig::from_sources(toml("max_connections = \"lots\""), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here/tripsplit.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }
}
