pub mod progress;
pub mod schema;
pub mod sessions;
pub mod vocabulary;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::path::Path;

use crate::domain::{ProgressRecord, SessionDelta, TrackedItem, VocabularyItem};
use crate::error::Result;
use crate::srs::Sm2Result;
use crate::store::{ProgressStore, StoreStatistics, VocabularyCatalog};

// Re-export all public items from submodules
pub use progress::*;
pub use schema::run_migrations;
pub use sessions::*;
pub use vocabulary::*;

/// SQLite-backed catalog and progress store.
///
/// Owns its connection; the engine receives the store at construction
/// instead of reaching for a global handle.
#[derive(Debug)]
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Wrap an open connection, bringing the schema up to date
  pub fn new(conn: Connection) -> rusqlite::Result<Self> {
    run_migrations(&conn)?;
    Ok(Self { conn })
  }

  pub fn open(path: &Path) -> rusqlite::Result<Self> {
    init_db(path).map(|conn| Self { conn })
  }

  pub fn conn(&self) -> &Connection {
    &self.conn
  }
}

/// Open (creating if needed) the database at `path` and run migrations
pub fn init_db(path: &Path) -> rusqlite::Result<Connection> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  // Create backup before migrations if database exists
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("Could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  tracing::info!("Opened vocabulary database at {}", path.display());
  Ok(conn)
}

impl VocabularyCatalog for SqliteStore {
  fn get_by_id(&self, id: i64) -> Result<Option<VocabularyItem>> {
    Ok(get_vocabulary_by_id(&self.conn, id)?)
  }

  fn lookup_by_level(&self, level: u8, limit: usize) -> Result<Vec<VocabularyItem>> {
    Ok(get_vocabulary_by_level(&self.conn, level, limit)?)
  }

  fn random_sample(&self, level: u8, exclude_id: i64, limit: usize) -> Result<Vec<VocabularyItem>> {
    Ok(get_random_by_level(&self.conn, level, exclude_id, limit)?)
  }

  fn random_sample_nearby(
    &self,
    level: u8,
    exclude_id: i64,
    limit: usize,
  ) -> Result<Vec<VocabularyItem>> {
    let Some((min_level, max_level)) = get_level_range(&self.conn)? else {
      return Ok(Vec::new());
    };
    let low = level.saturating_sub(1).max(min_level);
    let high = level.saturating_add(1).min(max_level);
    Ok(get_random_in_levels(&self.conn, low, high, exclude_id, limit)?)
  }

  fn search(&self, keyword: &str) -> Result<Vec<VocabularyItem>> {
    Ok(search_vocabulary(&self.conn, keyword)?)
  }

  fn level_range(&self) -> Result<Option<(u8, u8)>> {
    Ok(get_level_range(&self.conn)?)
  }
}

impl ProgressStore for SqliteStore {
  fn get_progress(&self, vocabulary_id: i64) -> Result<Option<ProgressRecord>> {
    Ok(progress::get_progress(&self.conn, vocabulary_id)?)
  }

  fn upsert_progress(
    &self,
    vocabulary_id: i64,
    schedule: &Sm2Result,
    correct: bool,
    reviewed_at: DateTime<Utc>,
  ) -> Result<()> {
    Ok(progress::upsert_progress(&self.conn, vocabulary_id, schedule, correct, reviewed_at)?)
  }

  fn get_due(&self, today: NaiveDate, limit: usize) -> Result<Vec<TrackedItem>> {
    Ok(get_due_items(&self.conn, today, limit)?)
  }

  fn get_new(&self, level: Option<u8>, limit: usize) -> Result<Vec<VocabularyItem>> {
    Ok(get_new_items(&self.conn, level, limit)?)
  }

  fn get_favorites(&self) -> Result<Vec<TrackedItem>> {
    Ok(get_favorite_items(&self.conn)?)
  }

  fn toggle_favorite(&self, vocabulary_id: i64) -> Result<bool> {
    Ok(progress::toggle_favorite(&self.conn, vocabulary_id)?)
  }

  fn record_session(&self, date: NaiveDate, delta: SessionDelta) -> Result<()> {
    Ok(sessions::record_session(&self.conn, date, delta)?)
  }

  fn get_statistics(&self, today: NaiveDate) -> Result<StoreStatistics> {
    Ok(StoreStatistics {
      total_words: count_vocabulary(&self.conn)?,
      learned_words: count_progress(&self.conn)?,
      due_words: get_due_count(&self.conn, today)?,
      favorite_words: count_favorites(&self.conn)?,
      by_level: get_level_counts(&self.conn)?,
      today: get_session(&self.conn, today)?,
      session_dates: get_session_dates(&self.conn)?,
    })
  }

  fn in_transaction<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Self) -> Result<T>,
  {
    // Already inside a transaction: join it
    if !self.conn.is_autocommit() {
      return f(self);
    }

    self.conn.execute_batch("BEGIN IMMEDIATE")?;
    match f(self) {
      Ok(value) => {
        self.conn.execute_batch("COMMIT")?;
        Ok(value)
      }
      Err(e) => {
        if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
          tracing::warn!("Rollback failed: {}", rollback);
        }
        Err(e)
      }
    }
  }
}
