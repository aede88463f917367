//! Learning statistics and the daily summary

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::store::ProgressStore;

/// Completion of one level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
  pub level: u8,
  pub total: i64,
  pub learned: i64,
  /// Learned share in percent, one decimal
  pub percentage: f64,
}

/// Headline numbers for today
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
  pub today_new: i64,
  pub today_reviewed: i64,
  pub today_correct: i64,
  pub today_total: i64,
  /// Whole percent, 0 when nothing was answered
  pub today_accuracy: i64,
  pub streak_days: u32,
  pub total_learned: i64,
  pub total_words: i64,
}

/// Full statistics view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningStatistics {
  pub summary: SessionSummary,
  pub due_words: i64,
  pub favorite_words: i64,
  pub by_level: Vec<LevelProgress>,
}

/// Consecutive study days ending today.
///
/// `dates` must be newest first. A day without a session row breaks the
/// streak, and no session today means a streak of zero.
pub fn calculate_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
  let mut streak = 0;
  let mut expected = today;

  for &date in dates {
    if date != expected {
      break;
    }
    streak += 1;
    expected = expected - Duration::days(1);
  }

  streak
}

/// Whole-percent accuracy, halves rounded to even
pub fn accuracy_percent(correct: i64, total: i64) -> i64 {
  if total > 0 {
    (correct as f64 * 100.0 / total as f64).round_ties_even() as i64
  } else {
    0
  }
}

/// Learned share of a level in percent, one decimal, halves rounded to even
pub fn completion_percentage(learned: i64, total: i64) -> f64 {
  if total > 0 {
    (learned as f64 * 1000.0 / total as f64).round_ties_even() / 10.0
  } else {
    0.0
  }
}

pub fn session_summary<S>(store: &S, today: NaiveDate) -> Result<SessionSummary>
where
  S: ProgressStore + ?Sized,
{
  Ok(statistics(store, today)?.summary)
}

pub fn statistics<S>(store: &S, today: NaiveDate) -> Result<LearningStatistics>
where
  S: ProgressStore + ?Sized,
{
  let raw = store.get_statistics(today)?;

  let summary = SessionSummary {
    today_new: raw.today.new_words,
    today_reviewed: raw.today.reviewed_words,
    today_correct: raw.today.correct_count,
    today_total: raw.today.total_count,
    today_accuracy: accuracy_percent(raw.today.correct_count, raw.today.total_count),
    streak_days: calculate_streak(&raw.session_dates, today),
    total_learned: raw.learned_words,
    total_words: raw.total_words,
  };

  let by_level = raw
    .by_level
    .into_iter()
    .map(|lc| LevelProgress {
      level: lc.level,
      total: lc.total,
      learned: lc.learned,
      percentage: completion_percentage(lc.learned, lc.total),
    })
    .collect();

  Ok(LearningStatistics {
    summary,
    due_words: raw.due_words,
    favorite_words: raw.favorite_words,
    by_level,
  })
}
