//! Stopword filter (C4, spec.md §4.3).

use std::sync::Arc;

use crate::context::SharedContext;
use crate::dictionaries::stopwords::{self, StopwordSnapshot};
use crate::errors::TokenizerResult;
use crate::filter::{Emit, TokenSource};
use crate::token::{Token, TokenizeFlags};

/// Drops tokens whose (NUL-trimmed) bytes are a member of the stopword set.
/// Empty tokens are never dropped (§4.3).
pub struct StopwordFilter<P> {
    parent: P,
    ctx: Arc<SharedContext<StopwordSnapshot>>,
}

impl<P: TokenSource> StopwordFilter<P> {
    #[must_use]
    pub fn new(parent: P, ctx: Arc<SharedContext<StopwordSnapshot>>) -> Self {
        Self { parent, ctx }
    }
}

impl<P: TokenSource> TokenSource for StopwordFilter<P> {
    fn tokenize(
        &mut self,
        text: &[u8],
        flags: TokenizeFlags,
        emit: &mut dyn Emit,
    ) -> TokenizerResult<()> {
        self.ctx.refresh(stopwords::load)?;
        let snapshot = self.ctx.snapshot();

        self.parent.tokenize(text, flags, &mut |tok: Token<'_>| {
            if tok.is_empty() || !snapshot.contains(tok.key_bytes()) {
                emit.emit(tok)
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;
    use crate::splitter::UnicodeWordSplitter;
    use crate::token::TokenFlags;
    use parking_lot::Mutex;
    use rusqlite::Connection;

    fn filter() -> StopwordFilter<UnicodeWordSplitter> {
        let conn = Connection::open_in_memory().unwrap();
        stopwords::ensure_table(&conn).unwrap();
        meta::ensure_table(&conn).unwrap();
        conn.execute("INSERT INTO fts5_stopwords (word) VALUES ('the')", [])
            .unwrap();
        let ctx = Arc::new(SharedContext::new(Arc::new(Mutex::new(conn)), "stopwords"));
        StopwordFilter::new(UnicodeWordSplitter, ctx)
    }

    #[test]
    fn drops_stopwords_keeps_rest() {
        let mut f = filter();
        let mut out = Vec::new();
        f.tokenize(b"the quick fox", TokenizeFlags::empty(), &mut |t: Token<'_>| {
            if !t.flags.contains(TokenFlags::FINAL) {
                out.push(String::from_utf8_lossy(&t.bytes).into_owned());
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(out, vec!["quick", "fox"]);
    }

    #[test]
    fn picks_up_dictionary_edits_on_next_call() {
        let conn = Connection::open_in_memory().unwrap();
        stopwords::ensure_table(&conn).unwrap();
        meta::ensure_table(&conn).unwrap();
        let db = Arc::new(Mutex::new(conn));
        let ctx = Arc::new(SharedContext::new(db.clone(), "stopwords"));
        let mut f = StopwordFilter::new(UnicodeWordSplitter, ctx);

        let mut first = Vec::new();
        f.tokenize(b"the fox", TokenizeFlags::empty(), &mut |t: Token<'_>| {
            if !t.flags.contains(TokenFlags::FINAL) {
                first.push(String::from_utf8_lossy(&t.bytes).into_owned());
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(first, vec!["the", "fox"]);

        db.lock()
            .execute("INSERT INTO fts5_stopwords (word) VALUES ('the')", [])
            .unwrap();
        meta::bump(&db.lock(), "stopwords", 1).unwrap();

        let mut second = Vec::new();
        f.tokenize(b"the fox", TokenizeFlags::empty(), &mut |t: Token<'_>| {
            if !t.flags.contains(TokenFlags::FINAL) {
                second.push(String::from_utf8_lossy(&t.bytes).into_owned());
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(second, vec!["fox"]);
    }
}
