//! Catalog inserts and lookups

use rusqlite::{params, Connection, ErrorCode, Result};

use crate::domain::{NewVocabulary, VocabularyItem};

const ITEM_COLUMNS: &str = "id, word, phonetic, part_of_speech, translation, level";

/// Insert a catalog row. Returns `Ok(None)` when the same
/// (word, part of speech, level) is already present.
pub fn insert_vocabulary(conn: &Connection, item: &NewVocabulary) -> Result<Option<i64>> {
    let inserted = conn.execute(
        r#"
    INSERT INTO vocabulary (word, phonetic, part_of_speech, translation, level)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            item.word,
            item.phonetic,
            item.part_of_speech,
            item.translation,
            item.level,
        ],
    );

    match inserted {
        Ok(_) => Ok(Some(conn.last_insert_rowid())),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn get_vocabulary_by_id(conn: &Connection, id: i64) -> Result<Option<VocabularyItem>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM vocabulary WHERE id = ?1", ITEM_COLUMNS))?;

    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_item(row)?))
    } else {
        Ok(None)
    }
}

pub fn get_vocabulary_by_level(conn: &Connection, level: u8, limit: usize) -> Result<Vec<VocabularyItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM vocabulary WHERE level = ?1 ORDER BY word LIMIT ?2",
        ITEM_COLUMNS
    ))?;

    let items = stmt
        .query_map(params![level, limit as i64], row_to_item)?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

/// Random items from one level (distractor source)
pub fn get_random_by_level(
    conn: &Connection,
    level: u8,
    exclude_id: i64,
    limit: usize,
) -> Result<Vec<VocabularyItem>> {
    get_random_in_levels(conn, level, level, exclude_id, limit)
}

/// Random items with `min_level <= level <= max_level`
pub fn get_random_in_levels(
    conn: &Connection,
    min_level: u8,
    max_level: u8,
    exclude_id: i64,
    limit: usize,
) -> Result<Vec<VocabularyItem>> {
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {} FROM vocabulary
    WHERE level BETWEEN ?1 AND ?2 AND id != ?3
    ORDER BY RANDOM()
    LIMIT ?4
    "#,
        ITEM_COLUMNS
    ))?;

    let items = stmt
        .query_map(params![min_level, max_level, exclude_id, limit as i64], row_to_item)?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

/// Escape LIKE wildcards so the keyword matches literally
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn search_vocabulary(conn: &Connection, keyword: &str) -> Result<Vec<VocabularyItem>> {
    let pattern = format!("%{}%", escape_like(keyword));
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {} FROM vocabulary
    WHERE word LIKE ?1 ESCAPE '\' OR translation LIKE ?1 ESCAPE '\'
    ORDER BY level, word
    "#,
        ITEM_COLUMNS
    ))?;

    let items = stmt
        .query_map(params![pattern], row_to_item)?
        .collect::<Result<Vec<_>>>()?;
    Ok(items)
}

pub fn get_level_range(conn: &Connection) -> Result<Option<(u8, u8)>> {
    conn.query_row("SELECT MIN(level), MAX(level) FROM vocabulary", [], |row| {
        let min: Option<u8> = row.get(0)?;
        let max: Option<u8> = row.get(1)?;
        Ok(min.zip(max))
    })
}

pub fn count_vocabulary(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM vocabulary", [], |row| row.get(0))
}

/// Convert a database row to VocabularyItem. Expects [`ITEM_COLUMNS`] order.
pub(crate) fn row_to_item(row: &rusqlite::Row) -> Result<VocabularyItem> {
    let phonetic: Option<String> = row.get(2)?;
    let part_of_speech: Option<String> = row.get(3)?;

    Ok(VocabularyItem {
        id: row.get(0)?,
        word: row.get(1)?,
        phonetic: phonetic.unwrap_or_default(),
        part_of_speech: part_of_speech.unwrap_or_default(),
        translation: row.get(4)?,
        level: row.get(5)?,
    })
}
