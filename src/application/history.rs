//! Price History
//!
//! Recent close prices per token from the gateway OHLCV endpoint. A series
//! with fewer than the minimum number of positive closes is rejected so the
//! caller renders a placeholder instead of a two-point "chart".

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::endpoints::Endpoints;
use crate::config::Config;
use crate::domain::{is_present, Token};
use crate::ports::JsonFetcher;

/// Price used for placeholder series when the token has none
const PLACEHOLDER_BASE_PRICE: f64 = 0.01;
/// Placeholder jitter, ±5%
const PLACEHOLDER_JITTER: f64 = 0.1;

/// A price series and whether it was synthesized
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub points: Vec<f64>,
    pub synthetic: bool,
}

/// Price history lookups with a per-token memo
pub struct PriceHistoryService {
    fetcher: Arc<dyn JsonFetcher>,
    endpoints: Endpoints,
    max_points: usize,
    min_points: usize,
    memo: RwLock<HashMap<String, PriceSeries>>,
}

impl PriceHistoryService {
    /// Default cap on returned closes
    pub const DEFAULT_MAX_POINTS: usize = 120;
    /// Default minimum of valid closes
    pub const DEFAULT_MIN_POINTS: usize = 6;

    pub fn new(fetcher: Arc<dyn JsonFetcher>, endpoints: Endpoints) -> Self {
        Self::with_limits(fetcher, endpoints, Self::DEFAULT_MAX_POINTS, Self::DEFAULT_MIN_POINTS)
    }

    pub fn with_limits(
        fetcher: Arc<dyn JsonFetcher>,
        endpoints: Endpoints,
        max_points: usize,
        min_points: usize,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            max_points,
            min_points,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(fetcher: Arc<dyn JsonFetcher>, config: &Config) -> Self {
        Self::with_limits(
            fetcher,
            Endpoints::from(config),
            config.history.max_points,
            config.history.min_points,
        )
    }

    /// Recent closes, oldest first as delivered, or `None` when fewer than
    /// the minimum valid points came back.
    pub async fn get_price_history(&self, identifier: &str) -> Option<Vec<f64>> {
        if identifier.is_empty() {
            return None;
        }

        if let Some(series) = self.memo.read().await.get(identifier) {
            if !series.synthetic {
                return Some(series.points.clone());
            }
        }

        let body = self.fetcher.fetch_json(&self.endpoints.history_url(identifier)).await?;
        let closes = extract_closes(&body, self.max_points);

        if closes.len() < self.min_points {
            debug!(
                "History for {} too sparse: {} of {} points",
                identifier,
                closes.len(),
                self.min_points
            );
            return None;
        }

        self.memo.write().await.insert(
            identifier.to_string(),
            PriceSeries {
                points: closes.clone(),
                synthetic: false,
            },
        );
        Some(closes)
    }

    /// Real history when available, otherwise a placeholder around the
    /// token's price. Either result is memoized per identifier.
    pub async fn series_for(&self, token: &Token, placeholder_len: usize) -> PriceSeries {
        if let Some(series) = self.memo.read().await.get(&token.identifier) {
            return series.clone();
        }

        let series = match self.get_price_history(&token.identifier).await {
            Some(points) => PriceSeries {
                points,
                synthetic: false,
            },
            None => PriceSeries {
                points: synthesize_placeholder(token.price_usd, placeholder_len, &mut rand::thread_rng()),
                synthetic: true,
            },
        };

        if !token.identifier.is_empty() {
            self.memo
                .write()
                .await
                .insert(token.identifier.clone(), series.clone());
        }
        series
    }

    /// Number of memoized series
    pub async fn memo_len(&self) -> usize {
        self.memo.read().await.len()
    }
}

/// Positive closes from `{ result: [...] }` or a bare list, capped at
/// `max_points`. Each point reads the first truthy of `close` and `c`.
pub fn extract_closes(body: &Value, max_points: usize) -> Vec<f64> {
    let items: &[Value] = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("result") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| close_of(item))
        .filter(|v| v.is_finite() && *v > 0.0)
        .take(max_points)
        .collect()
}

fn close_of(item: &Value) -> Option<f64> {
    let field = ["close", "c"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find(|v| is_present(v))?;
    match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flat series jittered ±5% around `price` (or 0.01 when unpriced)
pub fn synthesize_placeholder<R: Rng + ?Sized>(price: f64, len: usize, rng: &mut R) -> Vec<f64> {
    let base = if price > 0.0 { price } else { PLACEHOLDER_BASE_PRICE };
    (0..len)
        .map(|_| base * (1.0 + (rng.gen::<f64>() - 0.5) * PLACEHOLDER_JITTER))
        .collect()
}
