//! Synonym expansion filter (C7, spec.md §4.6).
//!
//! Query-side only: each token is forwarded unchanged, then followed by its
//! configured expansions (if any) at the same position, flagged
//! [`TokenFlags::COLOCATED`] so the host engine's phrase matching treats them
//! as alternatives rather than a sequence. Document-side tokenize calls never
//! expand — a document should be indexed exactly as written.

use std::sync::Arc;

use crate::context::SharedContext;
use crate::dictionaries::synonyms::{self, SynonymSnapshot};
use crate::errors::TokenizerResult;
use crate::filter::{Emit, TokenSource};
use crate::token::{Token, TokenFlags, TokenizeFlags};

/// Expands query tokens into their configured synonyms at the same position.
pub struct SynonymFilter<P> {
    parent: P,
    ctx: Arc<SharedContext<SynonymSnapshot>>,
}

impl<P: TokenSource> SynonymFilter<P> {
    #[must_use]
    pub fn new(parent: P, ctx: Arc<SharedContext<SynonymSnapshot>>) -> Self {
        Self { parent, ctx }
    }
}

impl<P: TokenSource> TokenSource for SynonymFilter<P> {
    fn tokenize(&mut self, text: &[u8], flags: TokenizeFlags, emit: &mut dyn Emit) -> TokenizerResult<()> {
        self.ctx.refresh(synonyms::load)?;
        let snapshot = self.ctx.snapshot();
        let expand = flags.contains(TokenizeFlags::QUERY);

        self.parent.tokenize(text, flags, &mut |tok: Token<'_>| {
            if tok.is_empty() || tok.flags.contains(TokenFlags::FINAL) || !expand {
                return emit.emit(tok);
            }

            let expansions = snapshot.expansions(tok.key_bytes());
            if expansions.is_empty() {
                return emit.emit(tok);
            }

            let start = tok.start;
            let end = tok.end;
            emit.emit(tok)?;
            for expansion in expansions {
                emit.emit(Token::owned(expansion.to_vec(), start, end, TokenFlags::COLOCATED))?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;
    use crate::splitter::UnicodeWordSplitter;
    use parking_lot::Mutex;
    use rusqlite::Connection;

    fn filter() -> SynonymFilter<UnicodeWordSplitter> {
        let conn = Connection::open_in_memory().unwrap();
        synonyms::ensure_table(&conn).unwrap();
        meta::ensure_table(&conn).unwrap();
        conn.execute(
            "INSERT INTO fts5_synonyms (word, expansion) VALUES
             ('quick', 'fast'), ('quick', 'speedy')",
            [],
        )
        .unwrap();
        let ctx = Arc::new(SharedContext::new(Arc::new(Mutex::new(conn)), "synonyms"));
        SynonymFilter::new(UnicodeWordSplitter, ctx)
    }

    fn run(f: &mut SynonymFilter<UnicodeWordSplitter>, text: &[u8], flags: TokenizeFlags) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        f.tokenize(text, flags, &mut |t: Token<'_>| {
            if !t.flags.contains(TokenFlags::FINAL) {
                out.push((
                    String::from_utf8_lossy(&t.bytes).into_owned(),
                    t.flags.contains(TokenFlags::COLOCATED),
                ));
            }
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn query_side_expands_in_load_order_colocated() {
        let mut f = filter();
        let out = run(&mut f, b"quick fox", TokenizeFlags::QUERY);
        assert_eq!(
            out,
            vec![
                ("quick".into(), false),
                ("fast".into(), true),
                ("speedy".into(), true),
                ("fox".into(), false),
            ]
        );
    }

    #[test]
    fn document_side_never_expands() {
        let mut f = filter();
        let out = run(&mut f, b"quick fox", TokenizeFlags::empty());
        assert_eq!(out, vec![("quick".into(), false), ("fox".into(), false)]);
    }

    #[test]
    fn unknown_word_passes_through_unexpanded() {
        let mut f = filter();
        let out = run(&mut f, b"slow fox", TokenizeFlags::QUERY);
        assert_eq!(out, vec![("slow".into(), false), ("fox".into(), false)]);
    }
}
