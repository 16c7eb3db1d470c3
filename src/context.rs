//! Shared cache/context (C9) and the cache-refresh protocol (§5).
//!
//! Each filter owns one long-lived, process-wide [`SharedContext`]: a handle
//! to the dictionary database, an atomically-swapped dictionary snapshot, and
//! a staleness cursor. Refresh builds a replacement snapshot off to the side
//! and publishes it with a single `ArcSwap::store` — in-flight tokenizations
//! that already loaded the old snapshot keep reading a consistent view.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rusqlite::Connection;

use crate::errors::TokenizerResult;
use crate::meta;

/// Process-wide state shared by every tokenizer instance created for one
/// registered filter name.
pub struct SharedContext<S> {
    db: Arc<Mutex<Connection>>,
    name: &'static str,
    cache: ArcSwap<S>,
    last_seen: AtomicU32,
}

impl<S: Default> SharedContext<S> {
    #[must_use]
    pub fn new(db: Arc<Mutex<Connection>>, name: &'static str) -> Self {
        Self {
            db,
            name,
            cache: ArcSwap::from_pointee(S::default()),
            last_seen: AtomicU32::new(0),
        }
    }

    /// The current dictionary snapshot. Cheap: an `Arc` clone off the swap.
    #[must_use]
    pub fn snapshot(&self) -> Arc<S> {
        self.cache.load_full()
    }

    /// Refreshes the cache if `fts5_meta` reports the dictionary changed
    /// since the last refresh (or this is the cold-start call). Returns
    /// whether a refresh occurred.
    ///
    /// On load failure the previous snapshot is retained and `last_seen` is
    /// not advanced (§7: "retain previous cache, return the error to the
    /// caller, do not advance `last_seen`"), so the next call retries.
    pub fn refresh(
        &self,
        loader: impl FnOnce(&Connection) -> TokenizerResult<S>,
    ) -> TokenizerResult<bool> {
        let conn = self.db.lock();
        let last_seen = self.last_seen.load(Ordering::Acquire);
        let date = meta::needs_update(&conn, self.name, last_seen)?;

        if last_seen == 0 || date > 0 {
            log::debug!("rebuilding '{}' dictionary cache (last_seen={last_seen}, date={date})", self.name);
            let fresh = loader(&conn).inspect_err(|err| {
                log::error!("failed to rebuild '{}' dictionary cache: {err}", self.name);
            })?;
            self.cache.store(Arc::new(fresh));
            self.last_seen.store(date, Ordering::Release);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// The database connection, for loaders that need to run an arbitrary
    /// query (the phrase filter re-derives `max_words` from the snapshot
    /// instead of querying again, but `ensure_table` calls go through here).
    pub fn with_db<R>(&self, f: impl FnOnce(&Connection) -> R) -> R {
        f(&self.db.lock())
    }
}
