//! Token Aggregator
//!
//! Fans out to the three listing sub-feeds, merges the records in feed order,
//! drops records without an identifier, deduplicates (first seen wins),
//! sorts newest first and memoizes the result for the freshness window.
//!
//! The freshness check and the refresh run under one async mutex, so
//! concurrent callers inside a window share a single upstream round trip.
//! Sub-feed requests are settled together: one failing feed never aborts
//! the others. If every feed fails, the previous listing (or an empty one)
//! is returned and the cache is left untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::cache::ListingCache;
use super::endpoints::Endpoints;
use crate::domain::{sort_by_recency, FeedKind, Normalizer, Token};
use crate::ports::{Clock, JsonFetcher};

/// Which sub-feeds answered during a fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub succeeded: Vec<FeedKind>,
    pub failed: Vec<FeedKind>,
}

impl FanOutReport {
    /// Every sub-feed answered
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// No sub-feed answered
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }
}

/// Where an aggregation result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrigin {
    /// Served from a fresh cache entry, no upstream calls
    Cache,
    /// Rebuilt from at least one sub-feed
    Refreshed,
    /// Every sub-feed failed; previous listing (possibly empty) returned
    Fallback,
}

/// Aggregation result with partial-failure status
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub tokens: Arc<Vec<Token>>,
    pub origin: ListingOrigin,
    /// Present when a fan-out actually happened
    pub report: Option<FanOutReport>,
}

impl Aggregation {
    /// Some sub-feeds failed, so the listing may be incomplete
    pub fn is_partial(&self) -> bool {
        self.report.as_ref().map_or(false, |r| !r.is_complete())
    }
}

/// Raw record tagged with its sub-feed
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub feed: FeedKind,
    pub record: Value,
}

/// Listing aggregator with an owned cache
pub struct TokenAggregator {
    fetcher: Arc<dyn JsonFetcher>,
    endpoints: Endpoints,
    normalizer: Normalizer,
    clock: Arc<dyn Clock>,
    cache: Mutex<ListingCache>,
}

impl TokenAggregator {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, endpoints: Endpoints, cache: ListingCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            endpoints,
            normalizer: Normalizer::new(),
            clock,
            cache: Mutex::new(cache),
        }
    }

    /// Replace the normalizer rule table
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Current listing, served from cache inside the freshness window.
    /// Never fails; an empty list means "no data now".
    pub async fn get_tokens(&self) -> Arc<Vec<Token>> {
        self.aggregate(false).await.tokens
    }

    /// Like [`get_tokens`](Self::get_tokens) but with origin and per-feed status
    pub async fn get_tokens_detailed(&self) -> Aggregation {
        self.aggregate(false).await
    }

    /// Refresh regardless of cache freshness
    pub async fn refresh(&self) -> Aggregation {
        self.aggregate(true).await
    }

    /// Last cached listing without touching upstream, fresh or not
    pub async fn cached_tokens(&self) -> Arc<Vec<Token>> {
        self.cache.lock().await.get().unwrap_or_default()
    }

    async fn aggregate(&self, force: bool) -> Aggregation {
        let mut cache = self.cache.lock().await;

        if !force {
            if let Some(tokens) = cache.fresh() {
                debug!("Serving {} cached tokens (age {:?})", tokens.len(), cache.age());
                return Aggregation {
                    tokens,
                    origin: ListingOrigin::Cache,
                    report: None,
                };
            }
        }

        let (raw, report) = self.fan_out().await;

        if report.all_failed() {
            warn!("All {} listing feeds failed, keeping previous listing", FeedKind::ALL.len());
            return Aggregation {
                tokens: cache.get().unwrap_or_default(),
                origin: ListingOrigin::Fallback,
                report: Some(report),
            };
        }

        let tokens = Arc::new(merge_records(&self.normalizer, raw, self.clock.now()));
        info!(
            "Aggregated {} tokens ({} of {} feeds)",
            tokens.len(),
            report.succeeded.len(),
            FeedKind::ALL.len()
        );
        cache.set(Arc::clone(&tokens));

        Aggregation {
            tokens,
            origin: ListingOrigin::Refreshed,
            report: Some(report),
        }
    }

    /// One concurrent request per sub-feed, settled together
    async fn fan_out(&self) -> (Vec<RawRecord>, FanOutReport) {
        let [new_url, bonding_url, graduated_url] =
            FeedKind::ALL.map(|feed| self.endpoints.listing_url(feed));

        let (new, bonding, graduated) = tokio::join!(
            self.fetcher.fetch_json(&new_url),
            self.fetcher.fetch_json(&bonding_url),
            self.fetcher.fetch_json(&graduated_url),
        );

        let mut raw = Vec::new();
        let mut report = FanOutReport::default();

        for (feed, payload) in FeedKind::ALL.into_iter().zip([new, bonding, graduated]) {
            match payload {
                Some(body) => {
                    let records = listing_items(body);
                    debug!("Feed {} returned {} records", feed, records.len());
                    raw.extend(records.into_iter().map(|record| RawRecord { feed, record }));
                    report.succeeded.push(feed);
                }
                None => {
                    warn!("Endpoint failed: {}", self.endpoints.listing_url(feed));
                    report.failed.push(feed);
                }
            }
        }

        (raw, report)
    }
}

impl std::fmt::Debug for TokenAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAggregator")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Records of a listing payload: `{ "result": [...] }` or a bare list
pub fn listing_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Normalize, drop identifier-less records, deduplicate and sort.
///
/// `raw` must be in feed order; the first record per identifier is kept.
pub fn merge_records(normalizer: &Normalizer, raw: Vec<RawRecord>, now: DateTime<Utc>) -> Vec<Token> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::with_capacity(raw.len());

    for RawRecord { feed, record } in raw {
        let mut token = normalizer.normalize(&record, now);
        if !token.has_identifier() {
            debug!("Dropping {} record without identifier", feed);
            continue;
        }
        if !seen.insert(token.identifier.clone()) {
            continue;
        }
        token.source = Some(feed);
        tokens.push(token);
    }

    sort_by_recency(&mut tokens);
    tokens
}
