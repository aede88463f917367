//! Error type shared by the quiz engine and its stores

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
  /// Storage failure, propagated unchanged to the caller
  #[error("Database error: {0}")]
  Storage(#[from] rusqlite::Error),
  /// Rating outside 0..=5
  #[error("Invalid rating: {0} (expected 0-5)")]
  InvalidRating(u8),
  /// Vocabulary id not present in the catalog
  #[error("Unknown vocabulary id: {0}")]
  UnknownVocabulary(i64),
  /// Unreadable configuration file
  #[error("Configuration error: {0}")]
  Config(String),
}

pub type Result<T> = std::result::Result<T, QuizError>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_log_warn_passes_ok_through() {
    let ok: std::result::Result<i32, QuizError> = Ok(3);
    assert_eq!(ok.log_warn("ctx"), Some(3));
  }

  #[test]
  fn test_log_warn_swallows_error() {
    let err: std::result::Result<Vec<i64>, QuizError> = Err(QuizError::UnknownVocabulary(9));
    assert_eq!(err.log_warn("ctx"), None);
  }

  #[test]
  fn test_error_messages() {
    assert_eq!(
      QuizError::InvalidRating(7).to_string(),
      "Invalid rating: 7 (expected 0-5)"
    );
    assert_eq!(
      QuizError::UnknownVocabulary(12).to_string(),
      "Unknown vocabulary id: 12"
    );
  }
}
