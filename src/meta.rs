//! Meta registry (C1): tracks last-modified timestamps per named dictionary.
//!
//! Grounded on `meta.c` in the original source: `meta_needs_update` and
//! `meta_create_table` translate directly into the two functions below.

use rusqlite::{params, Connection};

use crate::errors::TokenizerResult;

const DEFAULT_TABLE_NAME: &str = "fts5_meta";

/// Idempotently creates the `fts5_meta` table.
pub fn ensure_table(conn: &Connection) -> TokenizerResult<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {DEFAULT_TABLE_NAME} (
                name TEXT NOT NULL,
                date INTEGER NOT NULL,
                PRIMARY KEY (name)
            )"
        ),
        [],
    )?;
    Ok(())
}

/// Returns the stored `date` for `name` if `last_seen < date`, else `0`.
/// A missing row also yields `0`.
pub fn needs_update(conn: &Connection, name: &str, last_seen: u32) -> TokenizerResult<u32> {
    let mut stmt = conn.prepare(&format!(
        "SELECT date FROM {DEFAULT_TABLE_NAME} WHERE name = ?1 AND date > ?2"
    ))?;
    let date: Option<u32> = stmt
        .query_row(params![name, last_seen], |row| row.get(0))
        .or_else(|err| {
            if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
                Ok(None)
            } else {
                Err(err)
            }
        })?;
    Ok(date.unwrap_or(0))
}

/// Bumps (or inserts) the meta row for `name` to `date`. Not part of the
/// filters' read path — exercised by tests and by any admin tooling the host
/// wires up to signal "dictionary `name` was edited".
pub fn bump(conn: &Connection, name: &str, date: u32) -> TokenizerResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO {DEFAULT_TABLE_NAME} (name, date) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET date = excluded.date"
        ),
        params![name, date],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        ensure_table(&c).unwrap();
        c
    }

    #[test]
    fn cold_start_missing_row_is_zero() {
        let c = conn();
        assert_eq!(needs_update(&c, "phrases", 0).unwrap(), 0);
    }

    #[test]
    fn bump_then_check_reports_new_date() {
        let c = conn();
        bump(&c, "phrases", 5).unwrap();
        assert_eq!(needs_update(&c, "phrases", 0).unwrap(), 5);
        assert_eq!(needs_update(&c, "phrases", 5).unwrap(), 0);
        assert_eq!(needs_update(&c, "phrases", 4).unwrap(), 5);
    }

    #[test]
    fn bump_is_idempotent_per_name() {
        let c = conn();
        bump(&c, "phrases", 5).unwrap();
        bump(&c, "phrases", 9).unwrap();
        assert_eq!(needs_update(&c, "phrases", 5).unwrap(), 9);
    }
}
