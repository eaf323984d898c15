//! SQLite database management with migrations
//!
//! Provides the pooled connection backing the result store

use crate::error::{Result, ZeroError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use std::time::Duration;

/// Database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Pool sizing and lock timeout
#[derive(Debug, Clone, Copy)]
pub struct DbOptions {
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            pool_size: 16,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Database manager with migration support
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) a database with default options
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_options(db_path, DbOptions::default())
    }

    /// Open (or create) a database
    pub fn with_options(db_path: &Path, options: DbOptions) -> Result<Self> {
        // r2d2 asserts on a zero-sized pool
        if options.pool_size == 0 {
            return Err(ZeroError::InvalidConfigValue {
                path: "storage.pool_size".to_string(),
                message: "Pool size must be greater than 0".to_string(),
            });
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ZeroError::Io {
                    source: e,
                    context: format!("Failed to create database directory: {:?}", parent),
                })?;
            }
        }

        // busy_timeout is per connection, so every pooled connection gets it
        let busy_timeout = options.busy_timeout;
        let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch("PRAGMA synchronous = NORMAL;")
        });

        let pool = Pool::builder()
            .max_size(options.pool_size)
            .build(manager)?;

        {
            let conn = pool.get()?;
            // WAL lets readers proceed alongside a writer; persisted in the file
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;
        }

        let db = Self { pool };

        db.migrate()?;

        Ok(db)
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Run pending migrations; safe to call repeatedly
    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let current_version: i32 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |row| row.get(0),
        )?;

        for (version, migration) in MIGRATIONS.iter().enumerate() {
            let version = version as i32 + 1;

            if version > current_version {
                tracing::info!("Applying migration {}", version);

                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, datetime('now'))",
                    params![version],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get database statistics
    ///
    /// All counts come from one read transaction, so they share a snapshot.
    pub fn stats(&self) -> Result<DbStats> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let result_count: i64 =
            tx.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;

        let query_count: i64 = tx.query_row(
            "SELECT COUNT(DISTINCT query) FROM results",
            [],
            |row| row.get(0),
        )?;

        let relevant_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM results WHERE relevance > 0",
            [],
            |row| row.get(0),
        )?;

        tx.commit()?;

        Ok(DbStats {
            result_count: result_count as usize,
            query_count: query_count as usize,
            relevant_count: relevant_count as usize,
        })
    }
}

/// Database statistics
#[derive(Debug)]
pub struct DbStats {
    pub result_count: usize,
    pub query_count: usize,
    pub relevant_count: usize,
}

/// Database migrations (each string is one migration)
const MIGRATIONS: &[&str] = &[
    // Migration 1: results table; IF NOT EXISTS adopts databases created
    // before migrations were tracked
    r#"
    CREATE TABLE IF NOT EXISTS results (
        id INTEGER PRIMARY KEY,
        query TEXT,
        rank INTEGER,
        link TEXT,
        title TEXT,
        snippet TEXT,
        html TEXT,
        created DATETIME,
        relevance INTEGER DEFAULT 0,
        UNIQUE(query, link)
    );

    CREATE INDEX IF NOT EXISTS idx_results_query_rank ON results(query, rank);
    "#,
];
