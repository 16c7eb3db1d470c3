//! Phrase dictionary loader, backing the phrase filter (C6).
//!
//! Grounded on `phrases_fetch_all_into_hash` in the original source: load
//! `(phrase, root)` pairs, compute each phrase's word count, and track the
//! maximum word count across the table to size the phrase filter's ring
//! buffer.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::errors::TokenizerResult;

const TABLE_NAME: &str = "fts5_phrases";

/// One entry in the phrase table: the root to emit, and how many
/// space-separated words the phrase key itself has (used only to compute
/// `max_words` across the table; matching re-derives word boundaries from the
/// key bytes directly).
#[derive(Debug, Clone)]
pub struct PhraseEntry {
    pub root: Box<[u8]>,
    pub word_count: u32,
}

/// Snapshot of the phrase table.
#[derive(Default, Debug)]
pub struct PhraseSnapshot {
    map: HashMap<Box<[u8]>, PhraseEntry>,
    max_words: u32,
}

impl PhraseSnapshot {
    #[must_use]
    pub fn get(&self, phrase: &[u8]) -> Option<&PhraseEntry> {
        self.map.get(phrase)
    }

    #[must_use]
    pub fn max_words(&self) -> u32 {
        self.max_words
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub fn ensure_table(conn: &Connection) -> TokenizerResult<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {TABLE_NAME} (
                phrase TEXT NOT NULL,
                root TEXT NOT NULL,
                PRIMARY KEY (phrase, root)
            )"
        ),
        [],
    )?;
    Ok(())
}

pub fn load(conn: &Connection) -> TokenizerResult<PhraseSnapshot> {
    let mut stmt = conn.prepare(&format!("SELECT phrase, root FROM {TABLE_NAME} ORDER BY root"))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut map = HashMap::new();
    let mut max_words = 0u32;

    for row in rows {
        let (phrase, root) = row?;
        let word_count = 1 + phrase.bytes().filter(|b| *b == b' ').count() as u32;
        max_words = max_words.max(word_count);
        map.insert(
            phrase.into_bytes().into_boxed_slice(),
            PhraseEntry {
                root: root.into_bytes().into_boxed_slice(),
                word_count,
            },
        );
    }

    Ok(PhraseSnapshot { map, max_words })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn).unwrap();
        conn.execute(
            "INSERT INTO fts5_phrases (phrase, root) VALUES
             ('new york', 'nyc'), ('new york city', 'nyc')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn computes_max_words_across_table() {
        let snap = load(&seeded()).unwrap();
        assert_eq!(snap.max_words(), 3);
        assert_eq!(snap.get(b"new york".as_slice()).unwrap().root.as_ref(), b"nyc");
        assert_eq!(
            snap.get(b"new york city".as_slice()).unwrap().root.as_ref(),
            b"nyc"
        );
    }

    #[test]
    fn empty_table_has_zero_max_words() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn).unwrap();
        let snap = load(&conn).unwrap();
        assert_eq!(snap.max_words(), 0);
        assert!(snap.is_empty());
    }
}
