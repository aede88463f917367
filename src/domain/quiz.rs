use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// SM-2 recall grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
  Again = 0,   // Total blackout
  Hard = 1,    // Wrong, recognized once shown
  Good = 2,    // Wrong, but felt close
  Easy = 3,    // Correct with effort
  Perfect = 4, // Correct
  Known = 5,   // Already known, skip ahead
}

impl Rating {
  pub fn from_u8(value: u8) -> Option<Self> {
    match value {
      0 => Some(Self::Again),
      1 => Some(Self::Hard),
      2 => Some(Self::Good),
      3 => Some(Self::Easy),
      4 => Some(Self::Perfect),
      5 => Some(Self::Known),
      _ => None,
    }
  }

  pub fn value(&self) -> u8 {
    *self as u8
  }

  pub fn is_correct(&self) -> bool {
    *self >= Self::Easy
  }

  /// Grade used when only right/wrong is known (multiple choice, typed answers)
  pub fn from_correctness(is_correct: bool) -> Self {
    if is_correct { Self::Perfect } else { Self::Hard }
  }
}

/// Which side of the item is shown as the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizDirection {
  /// Word shown, translation expected
  WordToTranslation,
  /// Translation shown, word expected
  TranslationToWord,
}

impl QuizDirection {
  /// Uniform pick between the two directions
  pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
    if rng.random_bool(0.5) {
      Self::WordToTranslation
    } else {
      Self::TranslationToWord
    }
  }
}

/// How the working set for a run is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionStrategy {
  /// Items whose next review date has arrived
  Review,
  /// Items never reviewed, optionally restricted to one level
  New { level: Option<u8> },
  /// Items marked as favorite; the limit is not applied
  Favorite,
}

impl SelectionStrategy {
  /// Answers from a `New` run are counted as new words in the daily session
  pub fn counts_as_new(&self) -> bool {
    matches!(self, Self::New { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
  pub vocabulary_id: i64,
  pub direction: QuizDirection,
  pub prompt: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  pub correct_index: usize,
}

impl MultipleChoiceQuestion {
  pub fn is_correct_choice(&self, index: usize) -> bool {
    index == self.correct_index
  }
}

/// Outcome of one submission, returned to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
  pub vocabulary_id: i64,
  pub ease_factor: f64,
  pub interval_days: i64,
  pub next_review_date: NaiveDate,
  pub is_correct: bool,
}
