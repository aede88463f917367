//! Free-text answer checking.
//!
//! Typed words must match exactly (ignoring case and surrounding space).
//! Typed translations are accepted when they contain any one synonym of the
//! stored translation, so "可以" passes for "能，可以". Very short synonyms
//! can therefore match unrelated responses.

use crate::domain::QuizDirection;

/// Separators between synonyms in a stored translation
const SYNONYM_SEPARATORS: [char; 4] = [',', '，', ';', '；'];

/// Split a translation into its trimmed, non-empty synonyms
pub fn split_synonyms(translation: &str) -> impl Iterator<Item = &str> {
  translation
    .split(SYNONYM_SEPARATORS)
    .map(str::trim)
    .filter(|s| !s.is_empty())
}

pub fn evaluate_free_text(response: &str, correct_answer: &str, direction: QuizDirection) -> bool {
  let response = response.trim().to_lowercase();
  let correct = correct_answer.trim().to_lowercase();

  match direction {
    QuizDirection::TranslationToWord => response == correct,
    QuizDirection::WordToTranslation => {
      split_synonyms(&correct).any(|synonym| response.contains(synonym))
    }
  }
}
