//! Listing Cache
//!
//! Holds the last aggregated listing with the time it was stored. The entry
//! is replaced wholesale on refresh, never patched. Freshness is measured
//! against an injected [`Clock`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::Token;
use crate::ports::Clock;

/// Cache entry with insertion time
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub tokens: Arc<Vec<Token>>,
    pub stored_at: DateTime<Utc>,
}

/// Single-entry listing cache
pub struct ListingCache {
    entry: Option<CacheEntry>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl ListingCache {
    /// Default freshness window in seconds
    pub const DEFAULT_WINDOW_SECS: i64 = 45;

    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_window(clock, Duration::seconds(Self::DEFAULT_WINDOW_SECS))
    }

    pub fn with_window(clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            entry: None,
            window,
            clock,
        }
    }

    /// Last stored listing, fresh or not
    pub fn get(&self) -> Option<Arc<Vec<Token>>> {
        self.entry.as_ref().map(|e| Arc::clone(&e.tokens))
    }

    /// Replace the entry, stamped with the current clock time
    pub fn set(&mut self, tokens: Arc<Vec<Token>>) {
        self.entry = Some(CacheEntry {
            tokens,
            stored_at: self.clock.now(),
        });
    }

    /// A non-empty listing stored less than one window ago
    pub fn is_fresh(&self) -> bool {
        match &self.entry {
            Some(entry) => !entry.tokens.is_empty() && self.clock.now() - entry.stored_at < self.window,
            None => false,
        }
    }

    /// Listing if fresh
    pub fn fresh(&self) -> Option<Arc<Vec<Token>>> {
        if self.is_fresh() {
            self.get()
        } else {
            None
        }
    }

    /// Time since the entry was stored
    pub fn age(&self) -> Option<Duration> {
        self.entry.as_ref().map(|e| self.clock.now() - e.stored_at)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

impl std::fmt::Debug for ListingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingCache")
            .field("entries", &self.entry.as_ref().map(|e| e.tokens.len()))
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Normalizer;
    use crate::ports::ManualClock;
    use chrono::TimeZone;
    use serde_json::json;

    fn setup() -> (Arc<ManualClock>, ListingCache) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let cache = ListingCache::new(clock.clone());
        (clock, cache)
    }

    fn listing() -> Arc<Vec<Token>> {
        let token = Normalizer::new().normalize(&json!({ "mint": "MintA" }), Utc::now());
        Arc::new(vec![token])
    }

    #[test]
    fn test_empty_cache_is_stale() {
        let (_, cache) = setup();
        assert!(!cache.is_fresh());
        assert!(cache.get().is_none());
        assert!(cache.age().is_none());
    }

    #[test]
    fn test_fresh_within_window() {
        let (clock, mut cache) = setup();
        let tokens = listing();
        cache.set(tokens.clone());

        clock.advance(Duration::seconds(44));
        assert!(cache.is_fresh());
        assert!(Arc::ptr_eq(&cache.fresh().unwrap(), &tokens));

        clock.advance(Duration::seconds(1));
        assert!(!cache.is_fresh());
        assert!(cache.fresh().is_none());
        // stale entries are still readable
        assert!(cache.get().is_some());
        assert_eq!(cache.age(), Some(Duration::seconds(45)));
    }

    #[test]
    fn test_empty_listing_never_fresh() {
        let (_, mut cache) = setup();
        cache.set(Arc::new(Vec::new()));
        assert!(!cache.is_fresh());
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let (clock, mut cache) = setup();
        cache.set(listing());
        clock.advance(Duration::seconds(60));
        let replacement = listing();
        cache.set(replacement.clone());
        assert!(cache.is_fresh());
        assert!(Arc::ptr_eq(&cache.get().unwrap(), &replacement));

        cache.clear();
        assert!(cache.get().is_none());
    }
}
