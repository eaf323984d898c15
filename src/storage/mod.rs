//! Storage layer for zero-search
//!
//! Durable, deduplicated result rows keyed by `(query, link)`, plus the
//! relevance feedback written against them

pub mod database;

use crate::error::Result;
use crate::filtering::CandidateResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use database::{Database, DbOptions, DbPool, DbStats};

// Legacy rows may hold NULL in any column but the key
const SELECT_COLUMNS: &str = "SELECT id, COALESCE(query, ''), COALESCE(rank, 0), \
     COALESCE(link, ''), COALESCE(title, ''), COALESCE(snippet, ''), COALESCE(html, ''), \
     created, COALESCE(relevance, 0) FROM results";

/// A persisted result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub query: String,
    pub rank: i64,
    pub link: String,
    pub title: String,
    pub snippet: String,
    pub html: String,
    /// Missing on rows written without a timestamp
    pub created: Option<DateTime<Utc>>,
    /// User feedback signal, higher is more relevant
    pub relevance: i64,
}

impl StoredResult {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        // rank may hold a REAL in databases written by other tools
        let rank: f64 = row.get(2)?;
        Ok(Self {
            id: row.get(0)?,
            query: row.get(1)?,
            rank: rank.round_ties_even() as i64,
            link: row.get(3)?,
            title: row.get(4)?,
            snippet: row.get(5)?,
            html: row.get(6)?,
            created: row.get(7)?,
            relevance: row.get(8)?,
        })
    }
}

/// Values for a new result row
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub query: String,
    pub rank: i64,
    pub link: String,
    pub title: String,
    pub snippet: String,
    pub html: String,
    pub created: DateTime<Utc>,
}

impl NewResult {
    /// Row for a ranked candidate
    pub fn from_candidate(candidate: &CandidateResult, created: DateTime<Utc>) -> Self {
        Self {
            query: candidate.query.clone(),
            rank: candidate.rank.round_ties_even() as i64,
            link: candidate.link.clone(),
            title: candidate.title.clone(),
            snippet: candidate.snippet.clone(),
            html: candidate.html.clone(),
            created,
        }
    }
}

/// Whether an insert created a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// `(query, link)` already stored; the existing row was kept
    Duplicate,
}

/// Counts from persisting a ranked set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Result store backed by SQLite
///
/// Every write is a single autocommitted statement, so readers only ever
/// see a row before or after a write.
pub struct ResultStore {
    database: Database,
}

impl ResultStore {
    /// Open the store at `db_path`, creating the schema if needed
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with_options(db_path, DbOptions::default())
    }

    pub fn open_with_options(db_path: &Path, options: DbOptions) -> Result<Self> {
        let database = Database::with_options(db_path, options)?;
        tracing::info!("Result store opened at {}", db_path.display());
        Ok(Self { database })
    }

    /// Create the results table if absent; no-op otherwise
    pub fn ensure_schema(&self) -> Result<()> {
        self.database.migrate()
    }

    /// All rows for `query`, best rank first
    pub fn query_results(&self, query: &str) -> Result<Vec<StoredResult>> {
        let conn = self.database.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE query = ?1 ORDER BY rank ASC, id ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![query], StoredResult::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Single row by its dedup key
    pub fn get_result(&self, query: &str, link: &str) -> Result<Option<StoredResult>> {
        let conn = self.database.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE query = ?1 AND link = ?2", SELECT_COLUMNS),
                params![query, link],
                StoredResult::from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Insert a row unless `(query, link)` is already stored
    ///
    /// The first write wins: a duplicate leaves the stored row untouched.
    /// Failures other than the uniqueness conflict are returned.
    pub fn insert_result(&self, row: &NewResult) -> Result<InsertOutcome> {
        let conn = self.database.get_conn()?;
        let inserted = conn.execute(
            "INSERT INTO results (query, rank, link, title, snippet, html, created, relevance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
            params![
                row.query,
                row.rank,
                row.link,
                row.title,
                row.snippet,
                row.html,
                row.created
            ],
        );

        match inserted {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(query = %row.query, link = %row.link, "Result already stored");
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a ranked candidate set, one atomic insert per candidate
    pub fn insert_ranked(
        &self,
        candidates: &[CandidateResult],
        created: DateTime<Utc>,
    ) -> Result<InsertSummary> {
        let mut summary = InsertSummary::default();

        for candidate in candidates {
            match self.insert_result(&NewResult::from_candidate(candidate, created))? {
                InsertOutcome::Inserted => summary.inserted += 1,
                InsertOutcome::Duplicate => summary.duplicates += 1,
            }
        }

        Ok(summary)
    }

    /// Overwrite the relevance of `(query, link)`
    ///
    /// Returns whether a row matched; feedback for an unknown row is dropped.
    pub fn update_relevance(&self, query: &str, link: &str, relevance: i64) -> Result<bool> {
        let conn = self.database.get_conn()?;
        let updated = conn.execute(
            "UPDATE results SET relevance = ?1 WHERE query = ?2 AND link = ?3",
            params![relevance, query, link],
        )?;

        if updated == 0 {
            tracing::debug!(query, link, "Relevance feedback for unknown result dropped");
        }

        Ok(updated > 0)
    }

    pub fn stats(&self) -> Result<DbStats> {
        self.database.stats()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
