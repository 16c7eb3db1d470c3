//! Synonym dictionary loader, backing the synonym filter (C7).
//!
//! Grounded on `synonyms_fetch_all_into_hash`: a word maps to the list of all
//! its expansions, in the insertion order of `ORDER BY word` (so duplicate
//! `word` rows aggregate into one entry's expansion list, in row order).

use std::collections::HashMap;

use rusqlite::Connection;

use crate::errors::TokenizerResult;

const TABLE_NAME: &str = "fts5_synonyms";

/// Snapshot of the synonym table.
#[derive(Default, Debug)]
pub struct SynonymSnapshot {
    map: HashMap<Box<[u8]>, Vec<Box<[u8]>>>,
}

impl SynonymSnapshot {
    #[must_use]
    pub fn expansions(&self, word: &[u8]) -> &[Box<[u8]>] {
        self.map.get(word).map_or(&[], Vec::as_slice)
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
                word TEXT NOT NULL,
                expansion TEXT NOT NULL,
                PRIMARY KEY (word, expansion)
            )"
        ),
        [],
    )?;
    Ok(())
}

pub fn load(conn: &Connection) -> TokenizerResult<SynonymSnapshot> {
    let mut stmt =
        conn.prepare(&format!("SELECT word, expansion FROM {TABLE_NAME} ORDER BY word"))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut map: HashMap<Box<[u8]>, Vec<Box<[u8]>>> = HashMap::new();
    for row in rows {
        let (word, expansion) = row?;
        map.entry(word.into_bytes().into_boxed_slice())
            .or_default()
            .push(expansion.into_bytes().into_boxed_slice());
    }

    Ok(SynonymSnapshot { map })
}
