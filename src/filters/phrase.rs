//! Phrase-collapsing filter (C6, spec.md §4.5) — the core of this crate.
//!
//! Buffers up to `max_words + 1` tokens from the parent chain in a
//! [`RingBuffer`] and, anchored at the oldest buffered token, tries the
//! longest phrase key first: `max_words` words, then `max_words - 1`, down to
//! one. The first hit wins and its tokens are replaced by the root, split on
//! spaces into one token per word, all sharing the matched span; a miss
//! flushes just the oldest token and the window slides by one.
//! The extra `+1` slot exists purely as lookahead so a full window is always
//! available to try before anything is forced out — it is never itself part
//! of a match, since no phrase in the table is longer than `max_words`.

use std::sync::Arc;

use crate::context::SharedContext;
use crate::dictionaries::phrases::{self, PhraseSnapshot};
use crate::errors::TokenizerResult;
use crate::filter::{Emit, TokenSource};
use crate::token::{strip_trailing_nul, Token, TokenFlags, TokenizeFlags};

struct BufferedToken {
    bytes: Box<[u8]>,
    start: u32,
    end: u32,
    flags: TokenFlags,
}

impl BufferedToken {
    fn from_token(tok: &Token<'_>) -> Self {
        Self {
            bytes: strip_trailing_nul(&tok.bytes).into(),
            start: tok.start,
            end: tok.end,
            flags: tok.flags,
        }
    }
}

/// Fixed-capacity circular buffer of pending tokens, indexed from either end.
///
/// `head(k)` is the `k`-th oldest entry, `tail(k)` the `k`-th newest; both are
/// zero-based so `head(0)` and `tail(0)` name the same entry when the buffer
/// holds exactly one token.
struct RingBuffer {
    slots: Vec<Option<BufferedToken>>,
    start: usize,
    len: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, start: 0, len: 0 }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn head(&self, k: usize) -> usize {
        (self.start + k) % self.capacity()
    }

    fn tail(&self, k: usize) -> usize {
        (self.start + self.len - 1 - k) % self.capacity()
    }

    fn get_head(&self, k: usize) -> &BufferedToken {
        self.slots[self.head(k)]
            .as_ref()
            .expect("index within [0, len) is always occupied")
    }

    fn push(&mut self, tok: BufferedToken) {
        debug_assert!(self.len < self.capacity(), "caller must resolve before pushing past capacity");
        let idx = self.tail_insert_index();
        self.slots[idx] = Some(tok);
        self.len += 1;
    }

    fn tail_insert_index(&self) -> usize {
        (self.start + self.len) % self.capacity()
    }

    /// Removes and returns the oldest `n` entries in oldest-first order,
    /// freeing their slots before the buffer's logical start advances.
    fn pop_front(&mut self, n: usize) -> Vec<BufferedToken> {
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let idx = (self.start + i) % self.capacity();
            out.push(self.slots[idx].take().expect("occupied slot"));
        }
        self.start = (self.start + n) % self.capacity();
        self.len -= n;
        out
    }
}

/// Collapses configured multi-word phrases into their root, emitted as one
/// token per space-separated word in `root`, all sharing the matched span.
pub struct PhraseFilter<P> {
    parent: P,
    ctx: Arc<SharedContext<PhraseSnapshot>>,
}

impl<P: TokenSource> PhraseFilter<P> {
    #[must_use]
    pub fn new(parent: P, ctx: Arc<SharedContext<PhraseSnapshot>>) -> Self {
        Self { parent, ctx }
    }

    /// Tries the longest phrase anchored at the buffer's head first; on a
    /// hit, the span's start/end are recorded before anything is freed, the
    /// matched entries are then popped (freeing their slots and shrinking
    /// `len` before any further lookup happens), and only then is the root
    /// token emitted. Keeping that order — record offsets, free & shrink,
    /// emit — is what the original double-free-on-flush bug got backwards.
    fn resolve_one(buffer: &mut RingBuffer, snapshot: &PhraseSnapshot, emit: &mut dyn Emit) -> TokenizerResult<()> {
        let avail = buffer.len();
        let max_len = (snapshot.max_words() as usize).min(avail);

        for l in (1..=max_len).rev() {
            let mut key = Vec::new();
            for i in 0..l {
                if i > 0 {
                    key.push(b' ');
                }
                key.extend_from_slice(&buffer.get_head(i).bytes);
            }

            if let Some(entry) = snapshot.get(&key) {
                let start = buffer.get_head(0).start;
                let end = buffer.get_head(l - 1).end;
                buffer.pop_front(l);

                if entry.root.is_empty() {
                    log::warn!("phrase root for a {l}-word match is empty, eliding the match");
                    return Ok(());
                }
                for word in entry.root.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
                    emit.emit(Token::owned(word.to_vec(), start, end, TokenFlags::empty()))?;
                }
                return Ok(());
            }
        }

        let dropped = buffer.pop_front(1).into_iter().next().expect("len was just checked non-zero");
        emit.emit(Token::owned(dropped.bytes.into_vec(), dropped.start, dropped.end, dropped.flags))
    }

    fn drain(buffer: &mut RingBuffer, snapshot: &PhraseSnapshot, emit: &mut dyn Emit) -> TokenizerResult<()> {
        while !buffer.is_empty() {
            Self::resolve_one(buffer, snapshot, emit)?;
        }
        Ok(())
    }
}

impl<P: TokenSource> TokenSource for PhraseFilter<P> {
    fn tokenize(&mut self, text: &[u8], flags: TokenizeFlags, emit: &mut dyn Emit) -> TokenizerResult<()> {
        self.ctx.refresh(phrases::load)?;
        let snapshot = self.ctx.snapshot();
        let mut buffer = RingBuffer::new(snapshot.max_words() as usize + 1);

        self.parent.tokenize(text, flags, &mut |tok: Token<'_>| {
            if tok.flags.contains(TokenFlags::FINAL) {
                Self::drain(&mut buffer, &snapshot, emit)?;
                return emit.emit(tok);
            }

            buffer.push(BufferedToken::from_token(&tok));
            if buffer.len() == buffer.capacity() {
                Self::resolve_one(&mut buffer, &snapshot, emit)?;
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

    fn filter_with(rows: &[(&str, &str)]) -> PhraseFilter<UnicodeWordSplitter> {
        let conn = Connection::open_in_memory().unwrap();
        phrases::ensure_table(&conn).unwrap();
        meta::ensure_table(&conn).unwrap();
        for (phrase, root) in rows {
            conn.execute(
                "INSERT INTO fts5_phrases (phrase, root) VALUES (?1, ?2)",
                rusqlite::params![phrase, root],
            )
            .unwrap();
        }
        let ctx = Arc::new(SharedContext::new(Arc::new(Mutex::new(conn)), "phrases"));
        PhraseFilter::new(UnicodeWordSplitter, ctx)
    }

    fn run(f: &mut PhraseFilter<UnicodeWordSplitter>, text: &[u8]) -> Vec<String> {
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

    fn run_with_spans(f: &mut PhraseFilter<UnicodeWordSplitter>, text: &[u8]) -> Vec<(String, u32, u32)> {
        let mut out = Vec::new();
        f.tokenize(text, TokenizeFlags::empty(), &mut |t: Token<'_>| {
            if !t.flags.contains(TokenFlags::FINAL) {
                out.push((String::from_utf8_lossy(&t.bytes).into_owned(), t.start, t.end));
            }
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn collapses_matched_phrase_into_root() {
        let mut f = filter_with(&[("new york", "nyc")]);
        assert_eq!(run(&mut f, b"i live in new york today"), vec!["i", "live", "in", "nyc", "today"]);
    }

    #[test]
    fn longest_match_wins_over_shorter_prefix() {
        let mut f = filter_with(&[("new york", "nyc"), ("new york city", "nyc")]);
        assert_eq!(run(&mut f, b"new york city hall"), vec!["nyc", "hall"]);
    }

    #[test]
    fn zero_word_root_elides_match_silently() {
        let mut f = filter_with(&[("new york", "")]);
        assert_eq!(run(&mut f, b"i visited new york once"), vec!["i", "visited", "once"]);
    }

    #[test]
    fn phrase_longer_than_stream_falls_back_to_pass_through() {
        let mut f = filter_with(&[("new york city", "nyc")]);
        assert_eq!(run(&mut f, b"new york"), vec!["new", "york"]);
    }

    #[test]
    fn empty_phrase_table_is_pure_pass_through() {
        let mut f = filter_with(&[]);
        assert_eq!(run(&mut f, b"the quick fox"), vec!["the", "quick", "fox"]);
    }

    #[test]
    fn multi_word_root_emits_one_token_per_word_sharing_the_match_span() {
        let mut f = filter_with(&[("old city", "big apple")]);
        let out = run_with_spans(&mut f, b"i visited old city once");
        let (big_start, big_end) = (10, 18);
        assert_eq!(
            out,
            vec![
                ("i".into(), 0, 1),
                ("visited".into(), 2, 9),
                ("big".into(), big_start, big_end),
                ("apple".into(), big_start, big_end),
                ("once".into(), 19, 23),
            ]
        );
    }

    #[test]
    fn non_matching_tokens_preserve_order() {
        let mut f = filter_with(&[("new york", "nyc")]);
        assert_eq!(run(&mut f, b"old new york too"), vec!["old", "nyc", "too"]);
    }
}
