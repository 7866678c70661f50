//! Address Resolver
//!
//! Turns a search query into a token:
//! 1. Address-shaped queries go to the DexScreener pair lookup; the first
//!    pair's base token is normalized like any listing record.
//! 2. Otherwise, or when the lookup misses, the cached listing is searched
//!    by identifier, symbol or name (case-insensitive).
//! 3. Still nothing: one forced listing refresh, then one more local search.
//!
//! Steps run sequentially since each depends on the previous outcome.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::aggregator::TokenAggregator;
use super::endpoints::Endpoints;
use crate::domain::{is_maybe_address, Normalizer, Token};
use crate::ports::{Clock, JsonFetcher};

/// Outcome of a search
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Found through the pair lookup
    Pair(Token),
    /// Found in the aggregated listing
    Listing(Token),
    NotFound,
}

impl Resolution {
    pub fn token(&self) -> Option<&Token> {
        match self {
            Resolution::Pair(t) | Resolution::Listing(t) => Some(t),
            Resolution::NotFound => None,
        }
    }

    pub fn into_token(self) -> Option<Token> {
        match self {
            Resolution::Pair(t) | Resolution::Listing(t) => Some(t),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Query resolver over the pair lookup and the shared aggregator
pub struct AddressResolver {
    pair_fetcher: Arc<dyn JsonFetcher>,
    endpoints: Endpoints,
    normalizer: Normalizer,
    aggregator: Arc<TokenAggregator>,
    clock: Arc<dyn Clock>,
}

impl AddressResolver {
    pub fn new(
        pair_fetcher: Arc<dyn JsonFetcher>,
        endpoints: Endpoints,
        aggregator: Arc<TokenAggregator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pair_fetcher,
            endpoints,
            normalizer: aggregator.normalizer().clone(),
            aggregator,
            clock,
        }
    }

    /// Resolve a search query
    pub async fn resolve(&self, query: &str) -> Resolution {
        let query = query.trim();
        if query.is_empty() {
            return Resolution::NotFound;
        }

        if is_maybe_address(query) {
            if let Some(token) = self.lookup_pair(query).await {
                return Resolution::Pair(token);
            }
            debug!("Pair lookup missed for {}, searching listing", query);
        }

        if let Some(token) = find_in(&self.aggregator.cached_tokens().await, query) {
            return Resolution::Listing(token);
        }

        info!("{} not in cached listing, forcing refresh", query);
        let fresh = self.aggregator.refresh().await;
        match find_in(&fresh.tokens, query) {
            Some(token) => Resolution::Listing(token),
            None => Resolution::NotFound,
        }
    }

    /// Single pair lookup; `None` when no pair (or no usable base token) comes back
    pub async fn lookup_pair(&self, address: &str) -> Option<Token> {
        let body = self.pair_fetcher.fetch_json(&self.endpoints.pair_url(address)).await?;
        let pair = body.get("pairs")?.as_array()?.first()?;
        let record = flatten_pair(pair);
        let token = self.normalizer.normalize(&record, self.clock.now());
        token.has_identifier().then_some(token)
    }
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn find_in(tokens: &[Token], query: &str) -> Option<Token> {
    tokens.iter().find(|t| t.matches_query(query)).cloned()
}

/// Lift a DexScreener pair into a listing-shaped record.
///
/// Base-token fields become top-level fields, `liquidity.usd` becomes
/// `liquidity`, and `pairCreatedAt` stands in for `createdAt`.
pub fn flatten_pair(pair: &Value) -> Value {
    let base = pair.get("baseToken").cloned().unwrap_or_else(|| json!({}));
    let field = |v: &Value, key: &str| v.get(key).cloned().unwrap_or(Value::Null);

    let mut record = Map::new();
    record.insert("tokenAddress".into(), field(&base, "address"));
    record.insert("logo".into(), field(&base, "tokenImageUrl"));
    record.insert("name".into(), field(&base, "name"));
    record.insert("symbol".into(), field(&base, "symbol"));
    record.insert("priceUsd".into(), field(pair, "priceUsd"));
    record.insert(
        "liquidity".into(),
        pair.get("liquidity").map(|l| field(l, "usd")).unwrap_or(Value::Null),
    );
    record.insert("fullyDilutedValuation".into(), field(pair, "fdv"));
    record.insert("marketCap".into(), field(pair, "marketCap"));
    record.insert("createdAt".into(), field(pair, "pairCreatedAt"));
    record.insert("baseToken".into(), base);
    Value::Object(record)
}
