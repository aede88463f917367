//! Application configuration.
//!
//! Values come from `config.toml`, then the environment (a `.env` file is
//! loaded first), then the defaults below.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{QuizError, Result};
use crate::paths;

// ==================== Quiz Configuration ====================

/// Number of distractor choices in multiple choice mode
pub const DISTRACTOR_COUNT: usize = 3;

/// Default working-set size for review runs
pub const DEFAULT_QUIZ_LIMIT: usize = 50;

/// Default working-set size for new-word runs
pub const DEFAULT_NEW_WORD_LIMIT: usize = 20;

/// Previous cards kept for "go back" within a run
pub const HISTORY_LIMIT: usize = 50;

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "VOCABOOST_DB_PATH";

// ==================== File Structure ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    quiz: Option<QuizConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuizConfig {
    limit: Option<usize>,
    new_word_limit: Option<usize>,
    distractor_count: Option<usize>,
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub quiz_limit: usize,
    pub new_word_limit: usize,
    pub distractor_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(paths::db_path()),
            quiz_limit: DEFAULT_QUIZ_LIMIT,
            new_word_limit: DEFAULT_NEW_WORD_LIMIT,
            distractor_count: DISTRACTOR_COUNT,
        }
    }
}

/// Load settings with priority: config.toml > environment > default
pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    let env_path = std::env::var(DB_PATH_ENV).ok();
    load_settings_from(Path::new(paths::CONFIG_FILE), env_path)
}

/// Resolve settings from an explicit config file and env override
pub fn load_settings_from(config_path: &Path, env_db_path: Option<String>) -> Result<Settings> {
    let file = match std::fs::read_to_string(config_path) {
        Ok(contents) => toml::from_str::<AppConfig>(&contents)
            .map_err(|e| QuizError::Config(format!("{}: {}", config_path.display(), e)))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => return Err(QuizError::Config(format!("{}: {}", config_path.display(), e))),
    };

    let mut settings = Settings::default();

    // Priority 1: config.toml
    if let Some(path) = file.database.and_then(|db| db.path) {
        tracing::info!("Using database from {}: {}", config_path.display(), path);
        settings.database_path = PathBuf::from(path);
    } else if let Some(path) = env_db_path {
        // Priority 2: environment
        tracing::info!("Using database from {} env: {}", DB_PATH_ENV, path);
        settings.database_path = PathBuf::from(path);
    } else {
        tracing::info!("Using default database path: {}", settings.database_path.display());
    }

    if let Some(quiz) = file.quiz {
        settings.quiz_limit = quiz.limit.unwrap_or(settings.quiz_limit);
        settings.new_word_limit = quiz.new_word_limit.unwrap_or(settings.new_word_limit);
        settings.distractor_count = quiz.distractor_count.unwrap_or(settings.distractor_count);
    }

    Ok(settings)
}
