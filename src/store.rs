//! Storage contracts consumed by the quiz engine and statistics.
//!
//! The engine is generic over these traits so that the catalog and the
//! progress store can be swapped (the crate ships a SQLite implementation
//! in [`crate::db::SqliteStore`]).

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{ProgressRecord, SessionDelta, StudySession, TrackedItem, VocabularyItem};
use crate::error::Result;
use crate::srs::Sm2Result;

/// Read-only access to reference vocabulary
pub trait VocabularyCatalog {
  fn get_by_id(&self, id: i64) -> Result<Option<VocabularyItem>>;

  /// Items of one level ordered by word
  fn lookup_by_level(&self, level: u8, limit: usize) -> Result<Vec<VocabularyItem>>;

  /// Random items of `level`, never including `exclude_id`
  fn random_sample(&self, level: u8, exclude_id: i64, limit: usize) -> Result<Vec<VocabularyItem>>;

  /// Random items within one level of `level`, clamped to the catalog's level range
  fn random_sample_nearby(
    &self,
    level: u8,
    exclude_id: i64,
    limit: usize,
  ) -> Result<Vec<VocabularyItem>>;

  /// Items whose word or translation contains `keyword`
  fn search(&self, keyword: &str) -> Result<Vec<VocabularyItem>>;

  /// Lowest and highest level present, None for an empty catalog
  fn level_range(&self) -> Result<Option<(u8, u8)>>;
}

/// Per-level totals as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCount {
  pub level: u8,
  pub total: i64,
  pub learned: i64,
}

/// Raw aggregates read from the progress store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStatistics {
  pub total_words: i64,
  pub learned_words: i64,
  pub due_words: i64,
  pub favorite_words: i64,
  pub by_level: Vec<LevelCount>,
  pub today: StudySession,
  /// Every recorded session date, newest first
  pub session_dates: Vec<NaiveDate>,
}

/// Durable scheduling state and daily aggregates
pub trait ProgressStore {
  fn get_progress(&self, vocabulary_id: i64) -> Result<Option<ProgressRecord>>;

  /// Write the new schedule, bump review_count, bump correct_count when
  /// `correct`, stamp `reviewed_at`. Creates the row when missing.
  fn upsert_progress(
    &self,
    vocabulary_id: i64,
    schedule: &Sm2Result,
    correct: bool,
    reviewed_at: DateTime<Utc>,
  ) -> Result<()>;

  /// Items with next review on or before `today`, oldest due first, then by level
  fn get_due(&self, today: NaiveDate, limit: usize) -> Result<Vec<TrackedItem>>;

  /// Items with no progress row, ordered by level then word
  fn get_new(&self, level: Option<u8>, limit: usize) -> Result<Vec<VocabularyItem>>;

  fn get_favorites(&self) -> Result<Vec<TrackedItem>>;

  /// Flip the favorite flag, creating a default row when missing. Returns the new flag.
  fn toggle_favorite(&self, vocabulary_id: i64) -> Result<bool>;

  /// Additive upsert of the session row for `date`
  fn record_session(&self, date: NaiveDate, delta: SessionDelta) -> Result<()>;

  fn get_statistics(&self, today: NaiveDate) -> Result<StoreStatistics>;

  /// Run `f` so that all of its writes land together or not at all
  fn in_transaction<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Self) -> Result<T>;
}
