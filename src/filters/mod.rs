//! Tokenizer filters: stopword removal, stemming, phrase collapsing, and
//! synonym expansion — each drawing rules from a dictionary cached in a
//! [`crate::context::SharedContext`].

pub mod phrase;
pub mod stemmer;
pub mod stopwords;
pub mod synonym;
