#![warn(missing_docs)]
//! A composable full-text tokenization pipeline for a SQLite FTS5-style host
//! engine.
//!
//! # Overview
//!
//! This crate implements four cooperating tokenizer filters, each of which
//! wraps a parent tokenizer and forwards a transformed token stream:
//!
//! - **stopwords** — drops tokens found in a configured stopword set
//! - **snowball** — stems tokens via a pluggable per-language [`Stemmer`]
//! - **phrases** — collapses configured multi-word phrases into one root
//!   token
//! - **synonyms** — expands query-side tokens into their configured
//!   synonyms, colocated at the same position
//!
//! [`Stemmer`]: filters::stemmer::Stemmer
//!
//! Filters chain onto one another by name (see [`config`]), bottoming out at
//! the host's own word splitter (usually `unicode61`; [`splitter`] ships a
//! minimal stand-in so the chain is testable without a live host). Each
//! filter's dictionary is loaded from SQLite tables (see [`dictionaries`])
//! and cached process-wide in a [`context::SharedContext`], refreshed lazily
//! against a [`meta`] staleness registry.
//!
//! # Architecture
//!
//! - [`token`] — the [`Token`](token::Token) type and its flags, threaded
//!   through every stage
//! - [`filter`] — the [`TokenSource`](filter::TokenSource) chain abstraction
//!   every stage implements
//! - [`meta`], [`dictionaries`], [`context`] — the dictionary-caching layer
//! - [`filters`] — the four filters themselves
//! - [`config`] — parent-chain defaults used when a filter is created
//!   without an explicit parent argument
//! - [`ffi`] — the C ABI this crate is registered under by a host FTS5
//!   engine
//!
//! # Safety
//!
//! The core library (everything except [`ffi`]) is safe Rust. `ffi` contains
//! `unsafe extern "C"` entry points for the host engine to call; see its
//! module documentation for the ownership rules those functions require.

/// Error types for the tokenizer pipeline.
pub mod errors;

/// The [`Token`](token::Token) type and its flags.
pub mod token;

/// The [`TokenSource`](filter::TokenSource) chain abstraction.
pub mod filter;

/// Staleness registry shared by every dictionary.
pub mod meta;

/// Dictionary loaders backing each filter's cache.
pub mod dictionaries;

/// Process-wide cached dictionary state and the refresh protocol.
pub mod context;

/// Minimal stand-in for the host's own word splitter.
pub mod splitter;

/// The stopword, stemmer, phrase, and synonym filters.
pub mod filters;

/// Parent-chain defaults for filter construction.
pub mod config;

/// C ABI bindings for registration with a host FTS5 engine.
#[cfg(feature = "ffi")]
pub mod ffi;
