//! Upstream URL construction

use crate::config::Config;
use crate::domain::FeedKind;

/// Base URLs and limits for every upstream call
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub gateway_base: String,
    pub listing_limit: u32,
    pub pair_lookup_base: String,
    pub history_limit: usize,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl Endpoints {
    /// Listing sub-feed, e.g. `.../exchange/pumpfun/new?limit=50`
    pub fn listing_url(&self, feed: FeedKind) -> String {
        format!(
            "{}/token/mainnet/exchange/pumpfun/{}?limit={}",
            self.gateway_base.trim_end_matches('/'),
            feed.as_str(),
            self.listing_limit
        )
    }

    /// Historical OHLCV series for one token
    pub fn history_url(&self, identifier: &str) -> String {
        format!(
            "{}/token/mainnet/ohlcv/{}?limit={}",
            self.gateway_base.trim_end_matches('/'),
            identifier,
            self.history_limit
        )
    }

    /// Pair lookup keyed by contract address
    pub fn pair_url(&self, address: &str) -> String {
        format!("{}/{}", self.pair_lookup_base.trim_end_matches('/'), address)
    }
}

impl From<&Config> for Endpoints {
    fn from(config: &Config) -> Self {
        Self {
            gateway_base: config.gateway.base_url.clone(),
            listing_limit: config.gateway.listing_limit,
            pair_lookup_base: config.pair_lookup.base_url.clone(),
            history_limit: config.history.max_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.listing_url(FeedKind::Bonding),
            "https://solana-gateway.moralis.io/token/mainnet/exchange/pumpfun/bonding?limit=50"
        );
        assert_eq!(
            endpoints.history_url("Mint111"),
            "https://solana-gateway.moralis.io/token/mainnet/ohlcv/Mint111?limit=120"
        );
        assert_eq!(
            endpoints.pair_url("0xabc"),
            "https://api.dexscreener.com/latest/dex/tokens/0xabc"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let endpoints = Endpoints {
            gateway_base: "http://localhost:8080/".to_string(),
            listing_limit: 5,
            pair_lookup_base: "http://localhost:8081/tokens/".to_string(),
            history_limit: 10,
        };
        assert_eq!(
            endpoints.listing_url(FeedKind::New),
            "http://localhost:8080/token/mainnet/exchange/pumpfun/new?limit=5"
        );
        assert_eq!(endpoints.pair_url("X"), "http://localhost:8081/tokens/X");
    }
}
