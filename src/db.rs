//! `SQLite` pool that backs the key-value store.
//!
//! File databases are opened in WAL mode with a busy timeout on every pooled
//! connection; the embedded migrations create the `kv_store` table.
//!
//! # Example
//!
//! ```no_run
//! use quizmatch_core::{Database, SqliteKvStore};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(Path::new("quizmatch.db")).await?;
//! let store = SqliteKvStore::new(db);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, instrument};

/// Pool size used by [`Database::new`]. `SQLite` serializes writers, so a
/// handful of connections is enough.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a connection waits on a locked database before `SQLITE_BUSY`.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

const MAX_CONNECTIONS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
const MAX_BUSY_TIMEOUT_MS: u32 = 60_000;

/// Errors opening or migrating the database.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("cannot open database: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("cannot apply schema migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Pool options are out of range.
    #[error("invalid database option `{option}`: {value}. Expected range: {expected}")]
    InvalidOption {
        option: &'static str,
        value: u32,
        expected: &'static str,
    },
}

/// Connection pool tuning for file-backed databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Maximum pooled connections (1..=20).
    pub max_connections: u32,
    /// Busy timeout in milliseconds (0..=60000).
    pub busy_timeout_ms: u32,
}

impl DatabaseOptions {
    /// Checks both options against their accepted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidOption`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), DbError> {
        if !MAX_CONNECTIONS_RANGE.contains(&self.max_connections) {
            return Err(DbError::InvalidOption {
                option: "max_connections",
                value: self.max_connections,
                expected: "1..=20",
            });
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(DbError::InvalidOption {
                option: "busy_timeout_ms",
                value: self.busy_timeout_ms,
                expected: "0..=60000",
            });
        }
        Ok(())
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Cloneable handle to a migrated `SQLite` pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

async fn migrated(pool: SqlitePool) -> Result<Database, DbError> {
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Database { pool })
}

impl Database {
    /// Opens `db_path` with [`DatabaseOptions::default`], creating the file if missing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the file cannot be opened and
    /// [`DbError::Migration`] if the schema cannot be applied.
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        Self::with_options(db_path, DatabaseOptions::default()).await
    }

    /// Opens `db_path` in WAL mode, creating the file if missing, and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidOption`] for out-of-range options,
    /// [`DbError::Connection`] if the file cannot be opened and
    /// [`DbError::Migration`] if the schema cannot be applied.
    #[instrument(skip(db_path), fields(path = %db_path.display()))]
    pub async fn with_options(db_path: &Path, options: DatabaseOptions) -> Result<Self, DbError> {
        options.validate()?;

        let connect_options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(u64::from(options.busy_timeout_ms)));

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect_with(connect_options)
            .await?;

        debug!(max_connections = options.max_connections, "Opened database");
        migrated(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds a single connection; its data disappears when the
    /// pool is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] or [`DbError::Migration`] on failure.
    #[instrument]
    pub async fn new_in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        migrated(pool).await
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Reports whether the database runs in WAL journal mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the pragma query fails.
    pub async fn is_wal_enabled(&self) -> Result<bool, DbError> {
        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&self.pool)
            .await?;
        Ok(mode.eq_ignore_ascii_case("wal"))
    }

    /// Waits for in-flight queries, then closes every connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
