//! Unicode splitter (C3) — external collaborator with a fixed interface.
//!
//! The real word-breaker lives in the host engine (SQLite's `unicode61`
//! tokenizer); this crate only defines the seam
//! ([`TokenSource`][crate::filter::TokenSource]) it plugs into. This module
//! ships one minimal implementation so the rest of the chain is testable
//! without linking an actual FTS5 tokenizer — production embedding resolves
//! `"unicode61"` through the host's `xFindTokenizer` instead of constructing
//! this type.

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::errors::TokenizerResult;
use crate::filter::{Emit, TokenSource};
use crate::token::{Token, TokenFlags, TokenizeFlags};

/// Matches a run of ASCII alphanumerics. Full Unicode grapheme/word boundary
/// detection is out of scope (spec.md §1 Non-goals); this is the ASCII fast
/// path every caller of this stand-in actually exercises.
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9A-Za-z]+").unwrap());

/// Splits input on runs of non-alphanumeric bytes, lowercasing ASCII letters.
#[derive(Default, Clone, Copy)]
pub struct UnicodeWordSplitter;

impl TokenSource for UnicodeWordSplitter {
    fn tokenize(
        &mut self,
        text: &[u8],
        _flags: TokenizeFlags,
        emit: &mut dyn Emit,
    ) -> TokenizerResult<()> {
        for m in WORD.find_iter(text) {
            let lowered: Vec<u8> = m.as_bytes().iter().map(u8::to_ascii_lowercase).collect();
            emit.emit(Token::borrowed(&lowered, m.start() as u32, m.end() as u32, TokenFlags::empty()))?;
        }

        emit.emit(Token::borrowed(
            b"",
            text.len() as u32,
            text.len() as u32,
            TokenFlags::FINAL,
        ))
    }
}
