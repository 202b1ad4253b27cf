//! Server configuration read from the environment

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default TCP port
pub const DEFAULT_PORT: u16 = 3000;

/// File name of the SQLite database inside `DATA_DIR`
pub const DATABASE_FILE: &str = "healthtrack.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// `APP_ENV`, reported by the health check
    pub environment: String,
    /// Directory holding the SQLite database file
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ServerConfig {
    /// Load `PORT`, `APP_ENV` and `DATA_DIR`
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            port,
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
            data_dir: env::var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
        })
    }

    /// Database path used when `DB_SQLITE_PATH` is not set
    pub fn default_database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, "development");
        assert_eq!(config.default_database_path(), PathBuf::from("data").join("healthtrack.db"));
    }
}
