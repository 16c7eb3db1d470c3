//! Dictionary loaders (C2): read the `fts5_stopwords`, `fts5_phrases`, and
//! `fts5_synonyms` tables into in-memory lookup structures.
//!
//! Each loader is fully reentrant: it never mutates a live cache, it builds a
//! fresh [`Snapshot`]-shaped value and hands it back to the caller, which
//! swaps it into the filter's [`crate::context::SharedContext`]. Byte
//! sequences are treated as opaque keys — no casefolding, no NFC.

pub mod phrases;
pub mod stopwords;
pub mod synonyms;
