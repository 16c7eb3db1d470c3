//! Stemmer filter (C5, spec.md §4.4) — wraps the external Snowball stemmer.
//!
//! The real Snowball algorithm is out of scope (spec.md §1); this module
//! defines the [`Stemmer`] seam it is consumed through and ships one minimal
//! reference implementation, [`EnglishSuffixStemmer`], sufficient to exercise
//! the length-changed dispatch heuristic end-to-end.

use std::borrow::Cow;

use crate::errors::{TokenizerError, TokenizerResult};
use crate::filter::{Emit, TokenSource};
use crate::token::{Token, TokenizeFlags};

const MIN_TOKEN_LEN: usize = 3;
const MAX_TOKEN_LEN: usize = 64;

/// A single-language stemming algorithm, consumed through this trait.
pub trait Stemmer {
    /// The language name this stemmer answers to (matched case-insensitively
    /// against configured language arguments).
    fn language(&self) -> &str;

    /// Stems `token`, returning it unchanged if the algorithm has nothing to
    /// do. Implementations should only report a changed *length* when they
    /// actually transformed the token — the filter dispatches on exactly
    /// that signal.
    fn stem<'a>(&self, token: &'a [u8]) -> Cow<'a, [u8]>;
}

/// The full list of languages this crate's built-in stemmer registry
/// recognizes. A snowball binding with more languages would extend this.
#[must_use]
pub fn known_languages() -> &'static [&'static str] {
    &["english"]
}

fn is_known_language(name: &str) -> bool {
    known_languages().iter().any(|l| l.eq_ignore_ascii_case(name))
}

/// A deliberately simple Porter-lite suffix stripper, standing in for a real
/// Snowball "english" stemmer.
#[derive(Default, Clone, Copy)]
pub struct EnglishSuffixStemmer;

const SUFFIXES: &[&str] = &["ing", "edly", "ed", "ies", "es", "s"];

impl Stemmer for EnglishSuffixStemmer {
    fn language(&self) -> &str {
        "english"
    }

    fn stem<'a>(&self, token: &'a [u8]) -> Cow<'a, [u8]> {
        let Ok(s) = std::str::from_utf8(token) else {
            return Cow::Borrowed(token);
        };

        for suffix in SUFFIXES {
            if let Some(stripped) = s.strip_suffix(suffix) {
                // Keep a floor so stripping doesn't degenerate short words to
                // nothing (e.g. "is" should not stem past itself).
                if stripped.len() >= MIN_TOKEN_LEN {
                    return Cow::Owned(stripped.as_bytes().to_vec());
                }
            }
        }

        Cow::Borrowed(token)
    }
}

/// Applies a configured, ordered list of stemmers to each in-range token.
pub struct StemmerFilter<P> {
    parent: P,
    stemmers: Vec<Box<dyn Stemmer + Send>>,
}

impl<P: TokenSource> StemmerFilter<P> {
    /// `languages` defaults to `["english"]` (spec.md §4.4's default
    /// language list). The default parent, `"stopwords"`, is a separate
    /// concern handled by the registrar in `ffi.rs` via
    /// [`crate::config::default_parent_for`] — `languages` here never
    /// contains a parent name to strip out.
    pub fn new(parent: P, languages: &[String]) -> TokenizerResult<Self> {
        let default_languages = ["english".to_string()];
        let languages: &[String] = if languages.is_empty() {
            &default_languages
        } else {
            languages
        };

        let mut stemmers: Vec<Box<dyn Stemmer + Send>> = Vec::with_capacity(languages.len());
        for lang in languages {
            if !is_known_language(lang) {
                return Err(TokenizerError::InvalidArg(format!(
                    "unknown stemmer language '{lang}'"
                )));
            }
            stemmers.push(Box::new(EnglishSuffixStemmer));
        }

        Ok(Self { parent, stemmers })
    }

    fn stem_token<'a>(&self, bytes: &'a [u8]) -> Cow<'a, [u8]> {
        if bytes.len() <= MIN_TOKEN_LEN || bytes.len() > MAX_TOKEN_LEN {
            return Cow::Borrowed(bytes);
        }

        for stemmer in &self.stemmers {
            let stemmed = stemmer.stem(bytes);
            if stemmed.len() != bytes.len() {
                return stemmed;
            }
        }

        Cow::Borrowed(bytes)
    }
}

impl<P: TokenSource> TokenSource for StemmerFilter<P> {
    fn tokenize(
        &mut self,
        text: &[u8],
        flags: TokenizeFlags,
        emit: &mut dyn Emit,
    ) -> TokenizerResult<()> {
        self.parent.tokenize(text, flags, &mut |tok: Token<'_>| {
            let stemmed = self.stem_token(&tok.bytes);
            if let Cow::Owned(bytes) = stemmed {
                emit.emit(Token::owned(bytes, tok.start, tok.end, tok.flags))
            } else {
                emit.emit(tok)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::UnicodeWordSplitter;
    use crate::token::TokenFlags;

    fn run(text: &[u8], languages: &[String]) -> Vec<String> {
        let mut f = StemmerFilter::new(UnicodeWordSplitter, languages).unwrap();
        let mut out = Vec::new();
        f.tokenize(text, TokenizeFlags::empty(), &mut |t: Token<'_>| {
            if !t.flags.contains(TokenFlags::FINAL) {
                out.push(String::from_utf8_lossy(&t.bytes).into_owned());
            }
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn short_tokens_pass_through_unstemmed() {
        assert_eq!(run(b"is a", &[]), vec!["is", "a"]);
    }

    #[test]
    fn strips_known_suffix() {
        assert_eq!(run(b"running jumps", &[]), vec!["runn", "jump"]);
    }

    #[test]
    fn unchanged_length_passes_through_as_is() {
        // "quick" is long enough to reach the stemmer but matches no suffix.
        assert_eq!(run(b"quick", &[]), vec!["quick"]);
    }

    #[test]
    fn rejects_unknown_language() {
        let err = StemmerFilter::new(UnicodeWordSplitter, &["klingon".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn oversized_token_passes_through() {
        let long = "a".repeat(65);
        assert_eq!(run(long.as_bytes(), &[]), vec![long]);
    }
}
