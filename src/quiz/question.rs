//! Multiple choice question construction

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::domain::{MultipleChoiceQuestion, QuizDirection, VocabularyItem};
use crate::error::Result;
use crate::store::VocabularyCatalog;

/// Pick up to `count` distractors for `target`.
///
/// Same-level items are preferred; when the level is too small the draw
/// widens to neighbouring levels. The result never contains the target
/// and never repeats an id. Fewer than `count` items is not an error.
pub fn select_distractors<C>(catalog: &C, target: &VocabularyItem, count: usize) -> Result<Vec<VocabularyItem>>
where
  C: VocabularyCatalog + ?Sized,
{
  if count == 0 {
    return Ok(Vec::new());
  }

  // --- Phase 1: Same level ---
  let mut pool = catalog.random_sample(target.level, target.id, count)?;

  // --- Phase 2: Adjacent levels ±1 ---
  // Nearby levels include the target's own, so ask for a full set and
  // let deduplication drop repeats.
  if pool.len() < count {
    pool.extend(catalog.random_sample_nearby(target.level, target.id, count)?);
  }

  let mut seen = HashSet::from([target.id]);
  let mut distractors = Vec::with_capacity(count);
  for candidate in pool {
    if distractors.len() == count {
      break;
    }
    if seen.insert(candidate.id) {
      distractors.push(candidate);
    }
  }

  if distractors.len() < count {
    tracing::warn!(
      "Only {} of {} distractors available for vocabulary {} (level {})",
      distractors.len(),
      count,
      target.id,
      target.level
    );
  }

  Ok(distractors)
}

/// Prompt text shown for `item`
pub fn prompt_for(item: &VocabularyItem, direction: QuizDirection) -> String {
  match direction {
    QuizDirection::WordToTranslation => {
      let mut lines = vec![item.word.clone()];
      if !item.phonetic.is_empty() {
        lines.push(format!("[{}]", item.phonetic));
      }
      if !item.part_of_speech.is_empty() {
        lines.push(item.part_of_speech.clone());
      }
      lines.join("\n")
    }
    QuizDirection::TranslationToWord => item.translation.clone(),
  }
}

/// The side of `item` a learner has to pick
pub fn answer_for(item: &VocabularyItem, direction: QuizDirection) -> &str {
  match direction {
    QuizDirection::WordToTranslation => &item.translation,
    QuizDirection::TranslationToWord => &item.word,
  }
}

/// Assemble a question from already selected distractors.
///
/// Distractors whose option text equals the correct answer or another
/// option are dropped so that exactly one option is right.
pub fn build_question<R>(
  item: &VocabularyItem,
  direction: QuizDirection,
  distractors: &[VocabularyItem],
  rng: &mut R,
) -> MultipleChoiceQuestion
where
  R: Rng + ?Sized,
{
  let correct_answer = answer_for(item, direction).to_string();

  let mut options: Vec<String> = Vec::with_capacity(distractors.len() + 1);
  for distractor in distractors {
    let text = answer_for(distractor, direction);
    if text != correct_answer && !options.iter().any(|o| o == text) {
      options.push(text.to_string());
    }
  }
  options.shuffle(rng);

  let correct_index = rng.random_range(0..=options.len());
  options.insert(correct_index, correct_answer.clone());

  MultipleChoiceQuestion {
    vocabulary_id: item.id,
    direction,
    prompt: prompt_for(item, direction),
    options,
    correct_answer,
    correct_index,
  }
}
