//! Adapters Layer - External System Implementations
//!
//! - HTTP: reqwest-backed JsonFetcher for the gateway and DexScreener
//! - CLI: Command-line parsing and terminal rendering

pub mod http;
pub mod cli;

pub use http::{FetchError, HttpFetcher, HttpFetcherConfig};
pub use cli::CliApp;
