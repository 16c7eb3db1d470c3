//! Tokenizer pipeline errors
//!
//! This module documents the errors that can occur while loading dictionaries,
//! refreshing caches, or tokenizing text.

use thiserror::Error;

/// Errors that can occur in the tokenizer pipeline.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Error from the underlying SQLite store (meta row lookup, dictionary
    /// load, `CREATE TABLE IF NOT EXISTS`).
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// Allocation failure while rebuilding a dictionary cache or growing the
    /// phrase filter's scratch ring buffer.
    #[error("out of memory")]
    Nomem,

    /// The host connection has no registered `fts5_api` — FTS5 support is
    /// missing.
    #[error("FTS5 extension not found on this connection")]
    EngineMissing,

    /// An unknown stemmer language, or a parent filter name that could not be
    /// resolved at create time.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The downstream emit callback returned a non-OK status; the remainder
    /// of the tokenize call must stop immediately and propagate it.
    #[error("emit callback aborted with status {0}")]
    CallbackAborted(i32),
}

/// Result type used throughout the tokenizer pipeline.
pub type TokenizerResult<T> = Result<T, TokenizerError>;
