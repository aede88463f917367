use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocaboost::config;
use vocaboost::db::SqliteStore;
use vocaboost::domain::SelectionStrategy;
use vocaboost::error::LogOnError;
use vocaboost::QuizEngine;

fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocaboost=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  if let Err(e) = run() {
    tracing::error!("{}", e);
    std::process::exit(1);
  }
}

fn run() -> vocaboost::Result<()> {
  let settings = config::load_settings()?;
  let store = SqliteStore::open(&settings.database_path)?;
  let engine = QuizEngine::new(store).with_distractor_count(settings.distractor_count);

  let due = engine.select_quiz_words(SelectionStrategy::Review, settings.quiz_limit)?;
  let fresh = engine.select_quiz_words(SelectionStrategy::New { level: None }, settings.new_word_limit)?;
  let stats = engine.statistics()?;

  tracing::info!(
    "{} due for review, {} new available, streak {} days, {}/{} learned",
    due.len(),
    fresh.len(),
    stats.summary.streak_days,
    stats.summary.total_learned,
    stats.summary.total_words
  );

  if let Some(json) = serde_json::to_string_pretty(&stats).log_warn("Failed to serialize statistics") {
    println!("{}", json);
  }

  Ok(())
}
