use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// A catalog entry. Loaded once, never mutated by the quiz engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
  pub id: i64,
  pub word: String,
  pub phonetic: String,
  pub part_of_speech: String,
  /// May hold several synonyms separated by `,` `，` `;` or `；`
  pub translation: String,
  pub level: u8,
}

/// Catalog row before it has been assigned an id
#[derive(Debug, Clone)]
pub struct NewVocabulary {
  pub word: String,
  pub phonetic: String,
  pub part_of_speech: String,
  pub translation: String,
  pub level: u8,
}

impl NewVocabulary {
  pub fn new(word: &str, phonetic: &str, part_of_speech: &str, translation: &str, level: u8) -> Self {
    Self {
      word: word.to_string(),
      phonetic: phonetic.to_string(),
      part_of_speech: part_of_speech.to_string(),
      translation: translation.to_string(),
      level,
    }
  }
}

/// Per-item scheduling state. One row per vocabulary id that was ever
/// reviewed or favorited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub vocabulary_id: i64,
  pub ease_factor: f64,
  pub interval_days: i64,
  /// None for rows created by a favorite toggle before any review
  pub next_review_date: Option<NaiveDate>,
  pub review_count: i64,
  pub correct_count: i64,
  pub last_reviewed_at: Option<DateTime<Utc>>,
  pub is_favorite: bool,
}

impl ProgressRecord {
  /// State used for items that have never been reviewed
  pub fn unreviewed(vocabulary_id: i64) -> Self {
    Self {
      vocabulary_id,
      ease_factor: DEFAULT_EASE_FACTOR,
      interval_days: 0,
      next_review_date: None,
      review_count: 0,
      correct_count: 0,
      last_reviewed_at: None,
      is_favorite: false,
    }
  }
}

/// Catalog item joined with its progress row (due and favorite listings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
  pub item: VocabularyItem,
  pub progress: ProgressRecord,
}

/// Daily aggregate, one row per calendar date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
  pub date: Option<NaiveDate>,
  pub new_words: i64,
  pub reviewed_words: i64,
  pub correct_count: i64,
  pub total_count: i64,
}

/// Additive change applied to a day's [`StudySession`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionDelta {
  pub new_words: i64,
  pub reviewed_words: i64,
  pub correct: i64,
  pub total: i64,
}

impl SessionDelta {
  /// Delta for a single answered item
  pub fn single(is_new_word: bool, correct: bool) -> Self {
    Self {
      new_words: i64::from(is_new_word),
      reviewed_words: i64::from(!is_new_word),
      correct: i64::from(correct),
      total: 1,
    }
  }
}
