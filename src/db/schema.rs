use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS vocabulary (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      word TEXT NOT NULL,
      phonetic TEXT,
      part_of_speech TEXT,
      translation TEXT NOT NULL,
      level INTEGER NOT NULL,
      created_at TEXT DEFAULT CURRENT_TIMESTAMP,
      UNIQUE(word, part_of_speech, level)
    );

    CREATE TABLE IF NOT EXISTS learning_progress (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      vocabulary_id INTEGER NOT NULL UNIQUE,
      last_reviewed TEXT,
      review_count INTEGER NOT NULL DEFAULT 0,
      correct_count INTEGER NOT NULL DEFAULT 0,
      ease_factor REAL NOT NULL DEFAULT 2.5,
      interval_days INTEGER NOT NULL DEFAULT 0,
      next_review TEXT,
      is_favorite INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (vocabulary_id) REFERENCES vocabulary(id)
    );

    CREATE TABLE IF NOT EXISTS study_sessions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      date TEXT NOT NULL UNIQUE,
      new_words INTEGER NOT NULL DEFAULT 0,
      reviewed_words INTEGER NOT NULL DEFAULT 0,
      correct_count INTEGER NOT NULL DEFAULT 0,
      total_count INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_vocabulary_level ON vocabulary(level);
    CREATE INDEX IF NOT EXISTS idx_vocabulary_word ON vocabulary(word);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: SM-2 scheduling columns (pre-SM-2 databases only tracked counts)
  add_column_if_missing(conn, "learning_progress", "ease_factor", "REAL NOT NULL DEFAULT 2.5")?;
  add_column_if_missing(conn, "learning_progress", "interval_days", "INTEGER NOT NULL DEFAULT 0")?;
  add_column_if_missing(conn, "learning_progress", "next_review", "TEXT")?;
  add_column_if_missing(conn, "learning_progress", "is_favorite", "INTEGER NOT NULL DEFAULT 0")?;

  // Indexes on migrated columns must come after the columns exist
  conn.execute_batch(
    r#"
    CREATE INDEX IF NOT EXISTS idx_progress_next_review ON learning_progress(next_review);
    CREATE INDEX IF NOT EXISTS idx_progress_favorite ON learning_progress(is_favorite);
    "#,
  )?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    tracing::info!("Migrating {}: adding column {}", table, column);
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
    assert!(column_exists(&conn, "learning_progress", "ease_factor"));
  }

  #[test]
  fn test_upgrades_legacy_progress_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn
      .execute_batch(
        r#"
        CREATE TABLE learning_progress (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          vocabulary_id INTEGER NOT NULL UNIQUE,
          familiarity INTEGER DEFAULT 0,
          last_reviewed TEXT,
          review_count INTEGER DEFAULT 0,
          correct_count INTEGER DEFAULT 0
        );
        INSERT INTO learning_progress (vocabulary_id, review_count, correct_count) VALUES (1, 4, 3);
        "#,
      )
      .unwrap();

    run_migrations(&conn).unwrap();

    let (ease, interval, favorite): (f64, i64, bool) = conn
      .query_row(
        "SELECT ease_factor, interval_days, is_favorite FROM learning_progress WHERE vocabulary_id = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .unwrap();
    assert!((ease - 2.5).abs() < f64::EPSILON);
    assert_eq!(interval, 0);
    assert!(!favorite);
    assert!(column_exists(&conn, "study_sessions", "total_count"));
  }
}
