//! Learning progress reads and writes

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::domain::{ProgressRecord, TrackedItem, VocabularyItem};
use crate::srs::Sm2Result;

use super::vocabulary::row_to_item;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn get_progress(conn: &Connection, vocabulary_id: i64) -> Result<Option<ProgressRecord>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT vocabulary_id, ease_factor, interval_days, next_review,
           review_count, correct_count, last_reviewed, is_favorite
    FROM learning_progress
    WHERE vocabulary_id = ?1
    "#,
    )?;

    let mut rows = stmt.query(params![vocabulary_id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_progress(row, 0)?))
    } else {
        Ok(None)
    }
}

/// Store a new schedule after a review
pub fn upsert_progress(
    conn: &Connection,
    vocabulary_id: i64,
    schedule: &Sm2Result,
    correct: bool,
    reviewed_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO learning_progress
      (vocabulary_id, ease_factor, interval_days, next_review, last_reviewed, review_count, correct_count)
    VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
    ON CONFLICT(vocabulary_id) DO UPDATE SET
      ease_factor = excluded.ease_factor,
      interval_days = excluded.interval_days,
      next_review = excluded.next_review,
      last_reviewed = excluded.last_reviewed,
      review_count = review_count + 1,
      correct_count = correct_count + excluded.correct_count
    "#,
        params![
            vocabulary_id,
            schedule.ease_factor,
            schedule.interval_days,
            schedule.next_review.format(DATE_FORMAT).to_string(),
            reviewed_at.to_rfc3339(),
            if correct { 1 } else { 0 },
        ],
    )?;
    Ok(())
}

/// Items due on or before `today`
pub fn get_due_items(conn: &Connection, today: NaiveDate, limit: usize) -> Result<Vec<TrackedItem>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT v.id, v.word, v.phonetic, v.part_of_speech, v.translation, v.level,
           lp.vocabulary_id, lp.ease_factor, lp.interval_days, lp.next_review,
           lp.review_count, lp.correct_count, lp.last_reviewed, lp.is_favorite
    FROM vocabulary v
    INNER JOIN learning_progress lp ON v.id = lp.vocabulary_id
    WHERE lp.next_review <= ?1
    ORDER BY lp.next_review ASC, v.level ASC
    LIMIT ?2
    "#,
    )?;

    let items = stmt
        .query_map(
            params![today.format(DATE_FORMAT).to_string(), limit as i64],
            row_to_tracked,
        )?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

pub fn get_due_count(conn: &Connection, today: NaiveDate) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM learning_progress WHERE next_review <= ?1",
        params![today.format(DATE_FORMAT).to_string()],
        |row| row.get(0),
    )
}

/// Items that have never been reviewed
pub fn get_new_items(conn: &Connection, level: Option<u8>, limit: usize) -> Result<Vec<VocabularyItem>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT v.id, v.word, v.phonetic, v.part_of_speech, v.translation, v.level
    FROM vocabulary v
    LEFT JOIN learning_progress lp ON v.id = lp.vocabulary_id
    WHERE lp.id IS NULL AND (?1 IS NULL OR v.level = ?1)
    ORDER BY v.level, v.word
    LIMIT ?2
    "#,
    )?;

    let items = stmt
        .query_map(params![level, limit as i64], row_to_item)?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

pub fn get_favorite_items(conn: &Connection) -> Result<Vec<TrackedItem>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT v.id, v.word, v.phonetic, v.part_of_speech, v.translation, v.level,
           lp.vocabulary_id, lp.ease_factor, lp.interval_days, lp.next_review,
           lp.review_count, lp.correct_count, lp.last_reviewed, lp.is_favorite
    FROM vocabulary v
    INNER JOIN learning_progress lp ON v.id = lp.vocabulary_id
    WHERE lp.is_favorite = 1
    ORDER BY v.level, v.word
    "#,
    )?;

    let items = stmt
        .query_map([], row_to_tracked)?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

/// Flip the favorite flag. A missing row is created already favorited.
pub fn toggle_favorite(conn: &Connection, vocabulary_id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE learning_progress SET is_favorite = 1 - is_favorite WHERE vocabulary_id = ?1",
        params![vocabulary_id],
    )?;

    if updated == 0 {
        conn.execute(
            "INSERT INTO learning_progress (vocabulary_id, is_favorite) VALUES (?1, 1)",
            params![vocabulary_id],
        )?;
        return Ok(true);
    }

    conn.query_row(
        "SELECT is_favorite FROM learning_progress WHERE vocabulary_id = ?1",
        params![vocabulary_id],
        |row| row.get(0),
    )
}

pub fn count_progress(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM learning_progress", [], |row| row.get(0))
}

pub fn count_favorites(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM learning_progress WHERE is_favorite = 1",
        [],
        |row| row.get(0),
    )
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
}

/// Accepts RFC 3339 and the `CURRENT_TIMESTAMP` format older databases wrote
fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    let s = value?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
}

/// Convert progress columns starting at `offset` to a ProgressRecord
fn row_to_progress(row: &rusqlite::Row, offset: usize) -> Result<ProgressRecord> {
    Ok(ProgressRecord {
        vocabulary_id: row.get(offset)?,
        ease_factor: row.get(offset + 1)?,
        interval_days: row.get(offset + 2)?,
        next_review_date: parse_date(row.get(offset + 3)?),
        review_count: row.get(offset + 4)?,
        correct_count: row.get(offset + 5)?,
        last_reviewed_at: parse_timestamp(row.get(offset + 6)?),
        is_favorite: row.get(offset + 7)?,
    })
}

fn row_to_tracked(row: &rusqlite::Row) -> Result<TrackedItem> {
    Ok(TrackedItem {
        item: row_to_item(row)?,
        progress: row_to_progress(row, 6)?,
    })
}
