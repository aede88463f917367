//! Quiz engine: selection, question construction and the submission pipeline.
//!
//! The engine owns a storage handle implementing both [`VocabularyCatalog`]
//! and [`ProgressStore`]. Every submission goes through one private
//! pipeline that reads the current schedule, runs SM-2 and writes the
//! progress row and the day's session counters in a single transaction.

pub mod answer;
pub mod question;

pub use answer::{evaluate_free_text, split_synonyms};
pub use question::{build_question, select_distractors};

use chrono::{Local, NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config;
use crate::domain::{
  MultipleChoiceQuestion, ProgressRecord, QuizDirection, Rating, ScheduleResult, SelectionStrategy,
  SessionDelta, VocabularyItem,
};
use crate::error::{QuizError, Result};
use crate::srs::{self, ScheduleState, StudyRun};
use crate::stats::{self, LearningStatistics, SessionSummary};
use crate::store::{ProgressStore, VocabularyCatalog};

/// How an answer reaches the scheduler
#[derive(Debug, Clone, Copy)]
enum Outcome {
  Graded(Rating),
  Binary(bool),
}

impl Outcome {
  fn is_correct(self) -> bool {
    match self {
      Outcome::Graded(rating) => rating.is_correct(),
      Outcome::Binary(know) => know,
    }
  }
}

pub struct QuizEngine<S> {
  store: S,
  rng: StdRng,
  distractor_count: usize,
  fixed_today: Option<NaiveDate>,
}

impl<S> QuizEngine<S>
where
  S: VocabularyCatalog + ProgressStore,
{
  pub fn new(store: S) -> Self {
    Self {
      store,
      rng: StdRng::from_os_rng(),
      distractor_count: config::DISTRACTOR_COUNT,
      fixed_today: None,
    }
  }

  /// Use a specific random source for directions, distractors and shuffling
  pub fn with_rng(mut self, rng: StdRng) -> Self {
    self.rng = rng;
    self
  }

  /// Pin the calendar date instead of reading the local clock
  pub fn with_today(mut self, today: NaiveDate) -> Self {
    self.fixed_today = Some(today);
    self
  }

  pub fn with_distractor_count(mut self, count: usize) -> Self {
    self.distractor_count = count;
    self
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn today(&self) -> NaiveDate {
    self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
  }

  // ==================== Selection ====================

  /// Working set for a quiz. `Favorite` returns every favorite regardless of `limit`.
  pub fn select_quiz_words(&self, strategy: SelectionStrategy, limit: usize) -> Result<Vec<VocabularyItem>> {
    let items = match strategy {
      SelectionStrategy::Review => self
        .store
        .get_due(self.today(), limit)?
        .into_iter()
        .map(|tracked| tracked.item)
        .collect(),
      SelectionStrategy::New { level } => self.store.get_new(level, limit)?,
      SelectionStrategy::Favorite => self
        .store
        .get_favorites()?
        .into_iter()
        .map(|tracked| tracked.item)
        .collect(),
    };

    tracing::debug!("Selected {} items for {:?}", items.len(), strategy);
    Ok(items)
  }

  pub fn search(&self, keyword: &str) -> Result<Vec<VocabularyItem>> {
    self.store.search(keyword)
  }

  // ==================== Questions ====================

  pub fn select_distractors(&self, target: &VocabularyItem) -> Result<Vec<VocabularyItem>> {
    select_distractors(&self.store, target, self.distractor_count)
  }

  /// Build a multiple choice question; a random direction is used when none is forced
  pub fn build_multiple_choice_question(
    &mut self,
    item: &VocabularyItem,
    direction: Option<QuizDirection>,
  ) -> Result<MultipleChoiceQuestion> {
    let direction = direction.unwrap_or_else(|| QuizDirection::random(&mut self.rng));
    let distractors = self.select_distractors(item)?;
    Ok(build_question(item, direction, &distractors, &mut self.rng))
  }

  // ==================== Submission ====================

  /// Right/wrong answer from multiple choice or typed input, graded as 4 or 1
  pub fn submit_answer(&self, vocabulary_id: i64, is_correct: bool, is_new_word: bool) -> Result<ScheduleResult> {
    self.submit(vocabulary_id, Outcome::Graded(Rating::from_correctness(is_correct)), is_new_word)
  }

  /// Flashcard "know / don't know"
  pub fn submit_binary(&self, vocabulary_id: i64, know: bool, is_new_word: bool) -> Result<ScheduleResult> {
    self.submit(vocabulary_id, Outcome::Binary(know), is_new_word)
  }

  /// Explicit 0-5 rating
  pub fn submit_graded(&self, vocabulary_id: i64, rating: u8, is_new_word: bool) -> Result<ScheduleResult> {
    let rating = Rating::from_u8(rating).ok_or(QuizError::InvalidRating(rating))?;
    self.submit(vocabulary_id, Outcome::Graded(rating), is_new_word)
  }

  fn submit(&self, vocabulary_id: i64, outcome: Outcome, is_new_word: bool) -> Result<ScheduleResult> {
    self.ensure_known(vocabulary_id)?;

    let today = self.today();
    let progress = self
      .store
      .get_progress(vocabulary_id)?
      .unwrap_or_else(|| ProgressRecord::unreviewed(vocabulary_id));
    let state = ScheduleState::from(&progress);

    let schedule = match outcome {
      Outcome::Graded(rating) => srs::calculate_graded(rating, state, today),
      Outcome::Binary(know) => srs::calculate_binary(know, state, today),
    };
    let is_correct = outcome.is_correct();

    self.store.in_transaction(|store| {
      store.upsert_progress(vocabulary_id, &schedule, is_correct, Utc::now())?;
      store.record_session(today, SessionDelta::single(is_new_word, is_correct))
    })?;

    tracing::debug!(
      "Vocabulary {} ({:?}): ease {:.2} -> {:.2}, interval {}d, next review {}",
      vocabulary_id,
      outcome,
      state.ease_factor,
      schedule.ease_factor,
      schedule.interval_days,
      schedule.next_review
    );

    Ok(ScheduleResult {
      vocabulary_id,
      ease_factor: schedule.ease_factor,
      interval_days: schedule.interval_days,
      next_review_date: schedule.next_review,
      is_correct,
    })
  }

  pub fn toggle_favorite(&self, vocabulary_id: i64) -> Result<bool> {
    self.ensure_known(vocabulary_id)?;
    let favorite = self.store.toggle_favorite(vocabulary_id)?;
    tracing::debug!("Vocabulary {} favorite: {}", vocabulary_id, favorite);
    Ok(favorite)
  }

  fn ensure_known(&self, vocabulary_id: i64) -> Result<()> {
    match self.store.get_by_id(vocabulary_id)? {
      Some(_) => Ok(()),
      None => Err(QuizError::UnknownVocabulary(vocabulary_id)),
    }
  }

  // ==================== Study runs ====================

  pub fn start_run(&self, strategy: SelectionStrategy, limit: usize) -> Result<StudyRun> {
    let items = self.select_quiz_words(strategy, limit)?;
    Ok(StudyRun::new(items, strategy.counts_as_new()))
  }

  /// Submit the revealed card of `run` in binary mode.
  ///
  /// Returns None when the run has no revealed card. On a storage error
  /// the card stays revealed so it can be answered again.
  pub fn answer_current(&self, run: &mut StudyRun, know: bool) -> Result<Option<ScheduleResult>> {
    let Some(item) = run.begin_submit() else {
      return Ok(None);
    };

    match self.submit_binary(item.id, know, run.is_new()) {
      Ok(result) => {
        run.finish_submit(know);
        Ok(Some(result))
      }
      Err(e) => {
        run.abort_submit();
        Err(e)
      }
    }
  }

  // ==================== Statistics ====================

  pub fn session_summary(&self) -> Result<SessionSummary> {
    stats::session_summary(&self.store, self.today())
  }

  pub fn statistics(&self) -> Result<LearningStatistics> {
    stats::statistics(&self.store, self.today())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::SqliteStore;
  use crate::srs::CardPhase;
  use crate::testing::TestEnv;
  use chrono::Duration;
  use std::collections::HashSet;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
  }

  /// Engine over a fresh fixture store; the TempDir is returned to keep it alive
  fn engine() -> (tempfile::TempDir, QuizEngine<SqliteStore>) {
    let TestEnv { temp, store } = TestEnv::new().unwrap();
    let engine = QuizEngine::new(store)
      .with_rng(StdRng::seed_from_u64(7))
      .with_today(today());
    (temp, engine)
  }

  fn id_of(engine: &QuizEngine<SqliteStore>, word: &str) -> i64 {
    engine
      .store()
      .conn()
      .query_row("SELECT id FROM vocabulary WHERE word = ?1", [word], |row| row.get(0))
      .unwrap()
  }

  fn item(engine: &QuizEngine<SqliteStore>, word: &str) -> VocabularyItem {
    engine.store().get_by_id(id_of(engine, word)).unwrap().unwrap()
  }

  /// Overwrite the scheduling state of an item
  fn set_state(engine: &QuizEngine<SqliteStore>, word: &str, ease: f64, interval: i64, reviews: i64) {
    let id = id_of(engine, word);
    engine.submit_binary(id, true, true).unwrap();
    engine
      .store()
      .conn()
      .execute(
        "UPDATE learning_progress SET ease_factor = ?1, interval_days = ?2, review_count = ?3 WHERE vocabulary_id = ?4",
        rusqlite::params![ease, interval, reviews, id],
      )
      .unwrap();
  }

  #[test]
  fn test_select_new_words() {
    let (_temp, engine) = engine();
    let items = engine.select_quiz_words(SelectionStrategy::New { level: None }, 3).unwrap();
    let words: Vec<&str> = items.iter().map(|i| i.word.as_str()).collect();
    assert_eq!(words, vec!["apple", "book", "cat"]);

    let level3 = engine.select_quiz_words(SelectionStrategy::New { level: Some(3) }, 10).unwrap();
    assert_eq!(level3.len(), 2);
    assert!(level3.iter().all(|i| i.level == 3));
  }

  #[test]
  fn test_reviewed_word_leaves_new_pool() {
    let (_temp, engine) = engine();
    engine.submit_answer(id_of(&engine, "apple"), true, true).unwrap();
    let items = engine.select_quiz_words(SelectionStrategy::New { level: Some(1) }, 10).unwrap();
    assert!(items.iter().all(|i| i.word != "apple"));
    assert_eq!(items.len(), 3);
  }

  #[test]
  fn test_select_review_only_due() {
    let (_temp, engine) = engine();
    // Failed items are due tomorrow
    engine.submit_binary(id_of(&engine, "cat"), false, true).unwrap();
    assert!(engine.select_quiz_words(SelectionStrategy::Review, 10).unwrap().is_empty());

    let tomorrow = engine.with_today(today() + Duration::days(1));
    let due = tomorrow.select_quiz_words(SelectionStrategy::Review, 10).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].word, "cat");
  }

  #[test]
  fn test_select_favorites_ignores_limit() {
    let (_temp, engine) = engine();
    for word in ["apple", "book", "island"] {
      assert!(engine.toggle_favorite(id_of(&engine, word)).unwrap());
    }
    let favorites = engine.select_quiz_words(SelectionStrategy::Favorite, 1).unwrap();
    assert_eq!(favorites.len(), 3);
  }

  #[test]
  fn test_toggle_favorite_twice() {
    let (_temp, engine) = engine();
    let id = id_of(&engine, "dog");
    assert!(engine.toggle_favorite(id).unwrap());
    assert!(!engine.toggle_favorite(id).unwrap());
  }

  #[test]
  fn test_toggle_favorite_unknown_id() {
    let (_temp, engine) = engine();
    assert!(matches!(engine.toggle_favorite(9999), Err(QuizError::UnknownVocabulary(9999))));
  }

  #[test]
  fn test_multiple_choice_question() {
    let (_temp, mut engine) = engine();
    let apple = item(&engine, "apple");

    let q = engine
      .build_multiple_choice_question(&apple, Some(QuizDirection::WordToTranslation))
      .unwrap();
    assert_eq!(q.options.len(), 4);
    assert_eq!(q.options[q.correct_index], "蘋果");
    assert!(q.prompt.starts_with("apple\n"));
    let unique: HashSet<&String> = q.options.iter().collect();
    assert_eq!(unique.len(), 4);
  }

  #[test]
  fn test_random_direction_uses_both() {
    let (_temp, mut engine) = engine();
    let cat = item(&engine, "cat");
    let directions: Vec<QuizDirection> = (0..30)
      .map(|_| engine.build_multiple_choice_question(&cat, None).unwrap().direction)
      .collect();
    assert!(directions.contains(&QuizDirection::WordToTranslation));
    assert!(directions.contains(&QuizDirection::TranslationToWord));
  }

  #[test]
  fn test_question_with_tiny_catalog() {
    let env = TestEnv::empty().unwrap();
    for (word, translation) in [("sun", "太陽"), ("moon", "月亮")] {
      crate::db::insert_vocabulary(
        env.store.conn(),
        &crate::domain::NewVocabulary::new(word, "", "n", translation, 1),
      )
      .unwrap();
    }
    let mut engine = QuizEngine::new(env.store).with_rng(StdRng::seed_from_u64(1));
    let sun = engine.search("sun").unwrap().remove(0);

    let q = engine
      .build_multiple_choice_question(&sun, Some(QuizDirection::TranslationToWord))
      .unwrap();
    assert_eq!(q.options.len(), 2);
    assert_eq!(q.options[q.correct_index], "sun");
  }

  #[test]
  fn test_known_new_item_jumps_to_thirty_days() {
    let (_temp, engine) = engine();
    let result = engine.submit_graded(id_of(&engine, "apple"), 5, true).unwrap();
    assert_eq!(result.interval_days, 30);
    assert!((result.ease_factor - 2.6).abs() < 1e-9);
    assert_eq!(result.next_review_date, today() + Duration::days(30));
    assert!(result.is_correct);
  }

  #[test]
  fn test_third_review_grows_interval() {
    let (_temp, engine) = engine();
    set_state(&engine, "book", 2.5, 6, 2);
    let result = engine.submit_graded(id_of(&engine, "book"), 4, false).unwrap();
    assert!((result.ease_factor - 2.5).abs() < 1e-9);
    assert_eq!(result.interval_days, 15);
  }

  #[test]
  fn test_lapse_resets_interval() {
    let (_temp, engine) = engine();
    set_state(&engine, "dog", 2.5, 15, 5);
    let result = engine.submit_graded(id_of(&engine, "dog"), 1, false).unwrap();
    assert_eq!(result.interval_days, 1);
    assert!((result.ease_factor - 1.96).abs() < 1e-9);
    assert!(!result.is_correct);
  }

  #[test]
  fn test_submit_updates_progress_counts() {
    let (_temp, engine) = engine();
    let id = id_of(&engine, "island");
    engine.submit_answer(id, true, true).unwrap();
    engine.submit_answer(id, false, false).unwrap();
    engine.submit_answer(id, true, false).unwrap();

    let progress = engine.store().get_progress(id).unwrap().unwrap();
    assert_eq!(progress.review_count, 3);
    assert_eq!(progress.correct_count, 2);
    assert!(progress.last_reviewed_at.is_some());
  }

  #[test]
  fn test_submit_answer_maps_to_ratings() {
    let (_temp, engine) = engine();
    // Correct on a new item grades as 4: three days
    let result = engine.submit_answer(id_of(&engine, "cat"), true, true).unwrap();
    assert_eq!(result.interval_days, 3);
    assert!((result.ease_factor - 2.5).abs() < 1e-9);
  }

  #[test]
  fn test_binary_first_steps() {
    let (_temp, engine) = engine();
    let id = id_of(&engine, "beautiful");
    let intervals: Vec<i64> = (0..3)
      .map(|_| engine.submit_binary(id, true, false).unwrap().interval_days)
      .collect();
    assert_eq!(intervals, vec![1, 3, 7]);
  }

  #[test]
  fn test_session_counters() {
    let (_temp, engine) = engine();
    engine.submit_binary(id_of(&engine, "apple"), true, true).unwrap();
    engine.submit_binary(id_of(&engine, "book"), false, true).unwrap();
    engine.submit_graded(id_of(&engine, "cat"), 3, false).unwrap();

    let summary = engine.session_summary().unwrap();
    assert_eq!(summary.today_new, 2);
    assert_eq!(summary.today_reviewed, 1);
    assert_eq!(summary.today_correct, 2);
    assert_eq!(summary.today_total, 3);
    assert_eq!(summary.today_accuracy, 67);
    assert_eq!(summary.streak_days, 1);
    assert_eq!(summary.total_learned, 3);
    assert_eq!(summary.total_words, 8);
  }

  #[test]
  fn test_invalid_rating_rejected() {
    let (_temp, engine) = engine();
    let id = id_of(&engine, "apple");
    assert!(matches!(engine.submit_graded(id, 6, true), Err(QuizError::InvalidRating(6))));
    assert!(engine.store().get_progress(id).unwrap().is_none());
    assert_eq!(engine.session_summary().unwrap().today_total, 0);
  }

  #[test]
  fn test_long_know_streak_stays_scheduled_ahead() {
    let (_temp, engine) = engine();
    let id = id_of(&engine, "apple");
    for _ in 0..40 {
      let result = engine.submit_binary(id, true, false).unwrap();
      assert!(result.interval_days <= srs::MAX_INTERVAL_DAYS);
      assert!(result.next_review_date > today());
    }

    let progress = engine.store().get_progress(id).unwrap().unwrap();
    assert_eq!(progress.interval_days, srs::MAX_INTERVAL_DAYS);
    assert!(engine.select_quiz_words(SelectionStrategy::Review, 10).unwrap().is_empty());
  }

  #[test]
  fn test_first_submission_starts_from_default_ease() {
    let (_temp, engine) = engine();
    let result = engine.submit_binary(id_of(&engine, "dog"), true, true).unwrap();
    assert!((result.ease_factor - 2.6).abs() < 1e-9);
    assert_eq!(result.interval_days, 1);
  }

  #[test]
  fn test_unknown_vocabulary_rejected() {
    let (_temp, engine) = engine();
    assert!(matches!(
      engine.submit_binary(424242, true, true),
      Err(QuizError::UnknownVocabulary(424242))
    ));
    assert_eq!(engine.session_summary().unwrap().today_total, 0);
  }

  #[test]
  fn test_statistics_view() {
    let (_temp, engine) = engine();
    engine.submit_binary(id_of(&engine, "improve"), false, true).unwrap();
    engine.toggle_favorite(id_of(&engine, "island")).unwrap();

    let stats = engine.statistics().unwrap();
    assert_eq!(stats.favorite_words, 1);
    assert_eq!(stats.summary.total_learned, 2);
    let level3 = stats.by_level.iter().find(|l| l.level == 3).unwrap();
    assert_eq!(level3.percentage, 100.0);
  }

  #[test]
  fn test_run_retries_missed_items() {
    let (_temp, engine) = engine();
    let mut run = engine.start_run(SelectionStrategy::New { level: Some(3) }, 10).unwrap();
    assert!(run.is_new());
    assert_eq!(run.position(), (1, 2));

    // Nothing revealed yet
    assert!(engine.answer_current(&mut run, true).unwrap().is_none());

    run.reveal();
    let first = engine.answer_current(&mut run, false).unwrap().unwrap();
    assert!(!first.is_correct);
    run.reveal();
    engine.answer_current(&mut run, true).unwrap().unwrap();

    // Missed item comes back as a second pass
    assert_eq!(run.pass(), 2);
    assert_eq!(run.current().map(|i| i.id), Some(first.vocabulary_id));
    run.reveal();
    engine.answer_current(&mut run, true).unwrap().unwrap();
    assert!(run.is_complete());
    assert_eq!(run.phase(), CardPhase::Completed);

    let summary = engine.session_summary().unwrap();
    assert_eq!(summary.today_new, 3);
    assert_eq!(summary.today_total, 3);
  }

  #[test]
  fn test_review_run_counts_as_reviewed() {
    let (_temp, engine) = engine();
    engine.submit_binary(id_of(&engine, "apple"), false, true).unwrap();
    let engine = engine.with_today(today() + Duration::days(1));

    let mut run = engine.start_run(SelectionStrategy::Review, 10).unwrap();
    assert!(!run.is_new());
    run.reveal();
    engine.answer_current(&mut run, true).unwrap().unwrap();

    let summary = engine.session_summary().unwrap();
    assert_eq!(summary.today_reviewed, 1);
    assert_eq!(summary.today_new, 0);
  }
}
