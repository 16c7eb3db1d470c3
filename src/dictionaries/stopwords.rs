//! Stopword dictionary loader, backing the stopword filter (C4).

use std::collections::HashSet;

use rusqlite::Connection;

use crate::errors::TokenizerResult;

const TABLE_NAME: &str = "fts5_stopwords";

/// Snapshot of the stopword set: raw byte sequences, no casefolding.
#[derive(Default, Debug)]
pub struct StopwordSnapshot {
    words: HashSet<Box<[u8]>>,
}

impl StopwordSnapshot {
    #[must_use]
    pub fn contains(&self, word: &[u8]) -> bool {
        self.words.contains(word)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub fn ensure_table(conn: &Connection) -> TokenizerResult<()> {
    conn.execute(
        &format!("CREATE TABLE IF NOT EXISTS {TABLE_NAME} (word TEXT PRIMARY KEY)"),
        [],
    )?;
    Ok(())
}

pub fn load(conn: &Connection) -> TokenizerResult<StopwordSnapshot> {
    let mut stmt = conn.prepare(&format!("SELECT word FROM {TABLE_NAME} ORDER BY word"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut words = HashSet::new();
    for row in rows {
        words.insert(row?.into_bytes().into_boxed_slice());
    }

    Ok(StopwordSnapshot { words })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_rows_into_set() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn).unwrap();
        conn.execute("INSERT INTO fts5_stopwords (word) VALUES ('the'), ('a')", [])
            .unwrap();

        let snap = load(&conn).unwrap();
        assert!(snap.contains(b"the"));
        assert!(snap.contains(b"a"));
        assert!(!snap.contains(b"fox"));
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn empty_table_is_empty_snapshot() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn).unwrap();
        let snap = load(&conn).unwrap();
        assert!(snap.is_empty());
    }
}
