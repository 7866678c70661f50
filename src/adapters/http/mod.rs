//! HTTP Adapter
//!
//! Bounded-timeout JSON fetching for the Moralis gateway (with `X-API-Key`)
//! and DexScreener (no key).
//!
//! # Example
//!
//! ```rust,ignore
//! use pump_feed::adapters::http::{HttpFetcher, HttpFetcherConfig};
//! use pump_feed::ports::JsonFetcher;
//!
//! let fetcher = HttpFetcher::with_config(HttpFetcherConfig::with_api_key("key"))?;
//! let body = fetcher.fetch_json("https://solana-gateway.moralis.io/token/mainnet/exchange/pumpfun/new?limit=50").await;
//! ```

mod client;

pub use client::{FetchError, HttpFetcher, HttpFetcherConfig};
