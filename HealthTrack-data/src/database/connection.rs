//! Database connection module for the HealthTrack application
//!
//! Connections come from an r2d2 pool of SQLite connections. The pool is
//! created once at startup and handed to every repository explicitly.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info};

use super::migrations::run_sqlite_migrations;

/// Path value that selects an in-memory database instead of a file
pub const IN_MEMORY_PATH: &str = ":memory:";

/// A connection checked out of the pool
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("SQLite connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error while preparing the database location
    #[error("Database file error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration error
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Config(String),
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, or `:memory:`
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "./data/healthtrack.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);
        if sqlite_path.trim().is_empty() {
            return Err(DatabaseError::Config("DB_SQLITE_PATH must not be empty".to_string()));
        }

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }

    /// Whether this configuration selects an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.sqlite_path == IN_MEMORY_PATH
    }
}

/// SQLite connection pool shared by all repositories
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
}

impl DatabasePool {
    /// Create a migrated in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// capped at a single connection that is never recycled. Callers must not
    /// hold a connection while asking for another one.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let manager = SqliteConnectionManager::memory().with_init(configure_connection);

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        let pool = Self { pool: Arc::new(pool) };
        pool.migrate()?;
        Ok(pool)
    }

    /// Check a connection out of the pool
    pub fn get(&self) -> Result<PooledConnection, DatabaseError> {
        Ok(self.pool.get()?)
    }

    /// Run a trivial query to prove the database answers
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Describe the database location and pool usage
    pub fn connection_info(&self) -> Result<String, DatabaseError> {
        let location = {
            let conn = self.get()?;
            conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2))?
        };

        let location = if location.is_empty() || location == IN_MEMORY_PATH {
            "SQLite in-memory database".to_string()
        } else {
            format!("SQLite database at {}", location)
        };

        let state = self.pool.state();
        Ok(format!(
            "{} (connections: active={}, idle={})",
            location,
            state.connections - state.idle_connections,
            state.idle_connections
        ))
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        run_sqlite_migrations(&conn)
    }
}

/// Initialize the database connection pool and run migrations
pub fn initialize_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    if config.is_in_memory() {
        info!("Initializing in-memory SQLite database");
        return DatabasePool::in_memory();
    }

    info!("Initializing SQLite database at: {}", config.sqlite_path);

    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(configure_connection);

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
        .map_err(|e| {
            error!("Failed to create SQLite connection pool: {}", e);
            DatabaseError::Pool(e)
        })?;

    let pool = DatabasePool { pool: Arc::new(pool) };
    pool.migrate()?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

fn configure_connection(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
}
