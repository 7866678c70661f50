//! Pump Feed - Pump.fun Listing Aggregator Library
//!
//! Fetches pump.fun token listings from the Moralis gateway, normalizes the
//! heterogeneous records into one canonical shape, and serves them from a
//! short-lived cache. Contract addresses are resolved through DexScreener.
//!
//! # Modules
//!
//! - `domain`: Core types and pure logic (Token, Normalizer, address heuristic, ordering)
//! - `ports`: Trait abstractions (JsonFetcher, Clock) and test doubles
//! - `adapters`: External implementations (HTTP fetcher, CLI)
//! - `application`: Aggregator, listing cache, address resolver, price history
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;
pub mod config;
