use chrono::{Days, NaiveDate};

use crate::domain::{ProgressRecord, Rating};

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 3.0;

/// Fixed intervals for the first three positive binary reviews
const BINARY_INITIAL_INTERVALS: [i64; 3] = [1, 3, 7];

/// Interval granted when the learner marks an item as already known
const KNOWN_INTERVAL_DAYS: i64 = 30;

/// Longest interval ever scheduled (about a hundred years)
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// Scheduling state read from a progress record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleState {
  pub ease_factor: f64,
  pub interval_days: i64,
  pub review_count: i64,
}

impl Default for ScheduleState {
  fn default() -> Self {
    Self {
      ease_factor: crate::domain::DEFAULT_EASE_FACTOR,
      interval_days: 0,
      review_count: 0,
    }
  }
}

impl From<&ProgressRecord> for ScheduleState {
  fn from(record: &ProgressRecord) -> Self {
    Self {
      ease_factor: record.ease_factor,
      interval_days: record.interval_days,
      review_count: record.review_count,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Result {
  pub ease_factor: f64,
  pub interval_days: i64,
  pub next_review: NaiveDate,
}

fn clamp_ease(ease: f64) -> f64 {
  ease.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR)
}

fn scaled_interval(interval_days: i64, ease_factor: f64) -> i64 {
  let scaled = (interval_days as f64 * ease_factor).floor() as i64;
  scaled.clamp(0, MAX_INTERVAL_DAYS)
}

/// `today + interval_days`, saturating at the last representable date
fn review_date(today: NaiveDate, interval_days: i64) -> NaiveDate {
  let days = u64::try_from(interval_days).unwrap_or(0);
  today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Six-point SM-2 review.
///
/// Failed grades (below `Easy`) restart at one day, `Known` jumps straight
/// to thirty days, and the first two successful reviews use fixed steps
/// before the interval starts growing by the ease factor.
pub fn calculate_graded(rating: Rating, state: ScheduleState, today: NaiveDate) -> Sm2Result {
  let q = f64::from(rating.value());

  // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
  let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  let new_ease_factor = clamp_ease(state.ease_factor + ease_delta);

  let interval_days = if !rating.is_correct() {
    1
  } else if rating == Rating::Known {
    KNOWN_INTERVAL_DAYS
  } else {
    match state.review_count {
      0 => match rating {
        Rating::Easy => 1,
        Rating::Perfect => 3,
        _ => 7,
      },
      1 => 6,
      _ => scaled_interval(state.interval_days, new_ease_factor),
    }
  };

  Sm2Result {
    ease_factor: new_ease_factor,
    interval_days,
    next_review: review_date(today, interval_days),
  }
}

/// Two-button ("know" / "don't know") review
pub fn calculate_binary(know: bool, state: ScheduleState, today: NaiveDate) -> Sm2Result {
  let (new_ease_factor, interval_days) = if know {
    let ease = clamp_ease(state.ease_factor + 0.1);
    let interval = match usize::try_from(state.review_count) {
      Ok(n) if n < BINARY_INITIAL_INTERVALS.len() => BINARY_INITIAL_INTERVALS[n],
      _ => scaled_interval(state.interval_days, ease),
    };
    (ease, interval)
  } else {
    // Forgotten: back to tomorrow
    (clamp_ease(state.ease_factor - 0.2), 1)
  };

  Sm2Result {
    ease_factor: new_ease_factor,
    interval_days,
    next_review: review_date(today, interval_days),
  }
}
