//! Test utilities for database setup.
//!
//! Provides a temporary on-disk store built with the authoritative
//! migrations, so tests never duplicate schema definitions.

use rusqlite::Connection;
use tempfile::TempDir;

use crate::db::{self, SqliteStore};
use crate::domain::NewVocabulary;

/// Small catalog spanning three levels
const FIXTURE: &[(&str, &str, &str, &str, u8)] = &[
    ("apple", "ˈæpl", "n", "蘋果", 1),
    ("book", "bʊk", "n", "書", 1),
    ("cat", "kæt", "n", "貓", 1),
    ("dog", "dɔg", "n", "狗", 1),
    ("beautiful", "ˈbjutəfəl", "adj", "美麗的", 2),
    ("can", "kæn", "aux", "能，可以", 2),
    ("improve", "ɪmˈpruv", "v", "改善；改進", 3),
    ("island", "ˈaɪlənd", "n", "島", 3),
];

/// Test environment with a migrated learning database.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub store: SqliteStore,
}

impl TestEnv {
    /// Store seeded with the fixture catalog
    pub fn new() -> rusqlite::Result<Self> {
        let env = Self::empty()?;
        for (word, phonetic, pos, translation, level) in FIXTURE {
            db::insert_vocabulary(
                env.store.conn(),
                &NewVocabulary::new(word, phonetic, pos, translation, *level),
            )?;
        }
        Ok(env)
    }

    /// Store with the schema but no catalog rows
    pub fn empty() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let conn = Connection::open(temp.path().join("vocabulary.db"))?;
        let store = SqliteStore::new(conn)?;
        Ok(Self { temp, store })
    }

    /// Id of a fixture word. Panics on unknown words.
    pub fn id_of(&self, word: &str) -> i64 {
        self.store
            .conn()
            .query_row("SELECT id FROM vocabulary WHERE word = ?1", [word], |row| row.get(0))
            .unwrap_or_else(|_| panic!("fixture word {} missing", word))
    }
}
