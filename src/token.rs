//! The token type threaded through every stage of the pipeline.
//!
//! A token is a byte span of the original input plus a small flags word. See
//! the host engine ABI in `ffi.rs` for how this maps onto the C callback
//! signature `(ctx, flags, bytes, n_bytes, start, end) -> status`.

use std::borrow::Cow;

use bitflags::bitflags;

bitflags! {
    /// Flags carried on a token as it moves through the chain.
    ///
    /// `QUERY` is set on the invocation as a whole (not per-token) to mark a
    /// query-side tokenize call rather than a document-side one; it is
    /// re-exported here because filters branch on it via `TokenizeFlags`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u32 {
        /// Emitted token shares a position with the token emitted immediately
        /// before it (synonym expansions, phrase-root words).
        const COLOCATED = 0x01;
        /// Incoming sentinel: this call closes the token stream. Never set on
        /// an emitted token.
        const FINAL = 0x02;
    }
}

bitflags! {
    /// Flags passed into a `tokenize` call, distinct from per-token flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenizeFlags: u32 {
        /// Set only on query-side invocations (as opposed to document
        /// indexing). The synonym filter only expands on `QUERY`.
        const QUERY = 0x01;
    }
}

/// A lexical token: a byte span of the original input, plus flags.
///
/// `bytes` borrows from the original input on the fast path. Buffered stages
/// (the phrase filter's ring buffer) hold an owned copy and hand out a
/// borrowed view of it; `Cow` makes both cases the same type.
#[derive(Clone, Debug)]
pub struct Token<'a> {
    pub bytes: Cow<'a, [u8]>,
    pub start: u32,
    pub end: u32,
    pub flags: TokenFlags,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn borrowed(bytes: &'a [u8], start: u32, end: u32, flags: TokenFlags) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
            start,
            end,
            flags,
        }
    }

    #[must_use]
    pub fn owned(bytes: Vec<u8>, start: u32, end: u32, flags: TokenFlags) -> Token<'static> {
        Token {
            bytes: Cow::Owned(bytes),
            start,
            end,
            flags,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The token's byte slice, excluding a single trailing `'\0'` if present.
    ///
    /// Several of the host's upstream tokenizers (and test fixtures) pass
    /// NUL-terminated buffers through the callback; the spec requires keys to
    /// be compared without that terminator.
    #[must_use]
    pub fn key_bytes(&self) -> &[u8] {
        strip_trailing_nul(&self.bytes)
    }

    #[must_use]
    pub fn into_owned(self) -> Token<'static> {
        Token {
            bytes: Cow::Owned(self.bytes.into_owned()),
            start: self.start,
            end: self.end,
            flags: self.flags,
        }
    }
}

#[must_use]
pub fn strip_trailing_nul(bytes: &[u8]) -> &[u8] {
    match bytes.split_last() {
        Some((0, rest)) => rest,
        _ => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bytes_strips_single_trailing_nul() {
        let t = Token::borrowed(b"quick\0", 0, 6, TokenFlags::empty());
        assert_eq!(t.key_bytes(), b"quick");
    }

    #[test]
    fn key_bytes_keeps_bytes_without_nul() {
        let t = Token::borrowed(b"quick", 0, 5, TokenFlags::empty());
        assert_eq!(t.key_bytes(), b"quick");
    }
}
