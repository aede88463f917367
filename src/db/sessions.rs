//! Daily study session aggregates

use chrono::NaiveDate;
use rusqlite::{params, Connection, Result};

use crate::domain::{SessionDelta, StudySession};
use crate::store::LevelCount;

use super::progress::DATE_FORMAT;

/// Add `delta` to the session row for `date`, creating it if needed
pub fn record_session(conn: &Connection, date: NaiveDate, delta: SessionDelta) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO study_sessions (date, new_words, reviewed_words, correct_count, total_count)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(date) DO UPDATE SET
      new_words = new_words + excluded.new_words,
      reviewed_words = reviewed_words + excluded.reviewed_words,
      correct_count = correct_count + excluded.correct_count,
      total_count = total_count + excluded.total_count
    "#,
        params![
            date.format(DATE_FORMAT).to_string(),
            delta.new_words,
            delta.reviewed_words,
            delta.correct,
            delta.total,
        ],
    )?;
    Ok(())
}

/// Session for `date`, zeroed when nothing was studied that day
pub fn get_session(conn: &Connection, date: NaiveDate) -> Result<StudySession> {
    let mut stmt = conn.prepare(
        r#"
    SELECT new_words, reviewed_words, correct_count, total_count
    FROM study_sessions
    WHERE date = ?1
    "#,
    )?;

    let mut rows = stmt.query(params![date.format(DATE_FORMAT).to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(StudySession {
            date: Some(date),
            new_words: row.get(0)?,
            reviewed_words: row.get(1)?,
            correct_count: row.get(2)?,
            total_count: row.get(3)?,
        })
    } else {
        Ok(StudySession::default())
    }
}

/// All session dates, newest first
pub fn get_session_dates(conn: &Connection) -> Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare("SELECT date FROM study_sessions ORDER BY date DESC")?;

    let dates = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>>>()?;

    Ok(dates
        .iter()
        .filter_map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        .collect())
}

/// Catalog size and reviewed count per level
pub fn get_level_counts(conn: &Connection) -> Result<Vec<LevelCount>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT v.level,
           COUNT(DISTINCT v.id) AS total,
           COUNT(DISTINCT lp.vocabulary_id) AS learned
    FROM vocabulary v
    LEFT JOIN learning_progress lp ON v.id = lp.vocabulary_id
    GROUP BY v.level
    ORDER BY v.level
    "#,
    )?;

    let levels = stmt
        .query_map([], |row| {
            Ok(LevelCount {
                level: row.get(0)?,
                total: row.get(1)?,
                learned: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(levels)
}
