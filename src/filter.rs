//! Core filter-chain abstraction.
//!
//! Every stage in the pipeline — the Unicode splitter, the stopword filter,
//! the stemmer, the phrase filter, the synonym filter — implements
//! [`TokenSource`]. A stage consumes tokens from its parent (another
//! `TokenSource`) and forwards zero, one, or many tokens to an [`Emit`]
//! continuation. This mirrors the host engine's C ABI directly: there is no
//! buffering/pull interface at the boundary, only a push-style callback, so
//! the Rust types stay push-style all the way through instead of wrapping a
//! pull-style `Iterator` around a push-style FFI.

use crate::errors::TokenizerResult;
use crate::token::{Token, TokenizeFlags};

/// A continuation that accepts one token at a time.
///
/// Implemented for any `FnMut` closure with the right signature, so call
/// sites can pass `&mut |tok| ...` directly instead of naming a type.
pub trait Emit {
    fn emit(&mut self, token: Token<'_>) -> TokenizerResult<()>;
}

impl<F> Emit for F
where
    F: FnMut(Token<'_>) -> TokenizerResult<()>,
{
    fn emit(&mut self, token: Token<'_>) -> TokenizerResult<()> {
        self(token)
    }
}

/// A stage in the tokenizer chain.
///
/// `tokenize` is called once per host `tokenize` invocation. Implementations
/// must not retain `emit` beyond the call, and must stop forwarding tokens as
/// soon as `emit` returns an error (§7: "Emit-callback non-OK: stop
/// tokenizing immediately, propagate the status").
pub trait TokenSource {
    fn tokenize(
        &mut self,
        text: &[u8],
        flags: TokenizeFlags,
        emit: &mut dyn Emit,
    ) -> TokenizerResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenFlags;

    struct Constant(&'static [u8]);

    impl TokenSource for Constant {
        fn tokenize(
            &mut self,
            _text: &[u8],
            _flags: TokenizeFlags,
            emit: &mut dyn Emit,
        ) -> TokenizerResult<()> {
            emit.emit(Token::borrowed(self.0, 0, self.0.len() as u32, TokenFlags::empty()))
        }
    }

    #[test]
    fn emit_closure_forwards_tokens() {
        let mut seen = Vec::new();
        let mut src = Constant(b"hello");
        src.tokenize(b"hello", TokenizeFlags::empty(), &mut |t: Token<'_>| {
            seen.push(t.bytes.into_owned());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![b"hello".to_vec()]);
    }
}
