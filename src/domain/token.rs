//! Canonical Token Record
//!
//! Every upstream record (three listing sub-feeds and the DexScreener pair
//! lookup) is normalized into this one shape before anything else sees it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bundled placeholder image, used whenever an upstream image is missing or broken
pub const PLACEHOLDER_IMAGE: &str = "./image/QmeSzchzEPqCU1jwTnsipwcBAeH7S4bmVvFGfF65iA1BY1.png";

/// Description used when a record carries neither description nor name
pub const DEFAULT_DESCRIPTION: &str = "Pump.fun token";

/// One of the three listing sub-feeds, in aggregation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    New,
    Bonding,
    Graduated,
}

impl FeedKind {
    /// All feeds in the order their records are merged.
    /// Earlier feeds win deduplication ties.
    pub const ALL: [FeedKind; 3] = [FeedKind::New, FeedKind::Bonding, FeedKind::Graduated];

    /// Path segment on the gateway listing endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::New => "new",
            FeedKind::Bonding => "bonding",
            FeedKind::Graduated => "graduated",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical token record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Image URL (never empty)
    pub image: String,
    /// Mint / contract address, the deduplication key
    pub identifier: String,
    /// Fully diluted valuation, or market cap when FDV is absent
    pub market_value: f64,
    /// Price in USD
    pub price_usd: f64,
    /// Liquidity, or volume when liquidity is absent
    pub liquidity: f64,
    /// Creation (or graduation) timestamp as delivered upstream
    pub created_at: String,
    pub description: String,

    /// Shortened identifier shown as the creator handle
    pub creator_display: String,
    pub avatar: String,
    pub change_percent: f64,
    pub comment_count: u32,
    pub nsfw: bool,

    /// Sub-feed the record came from, diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FeedKind>,
}

impl Token {
    /// Parse `created_at` as an RFC 3339 timestamp
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Case-insensitive match on identifier, symbol or name
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.identifier.to_lowercase() == q
            || self.symbol.to_lowercase() == q
            || self.name.to_lowercase() == q
    }

    /// Check if the record can be surfaced by the aggregator
    pub fn has_identifier(&self) -> bool {
        !self.identifier.is_empty()
    }
}
