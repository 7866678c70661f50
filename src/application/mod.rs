//! Application Layer - Listing pipeline services
//!
//! Wires the ports into the user-facing operations:
//! - TokenAggregator: fan-out over the three pump.fun feeds with a shared cache
//! - AddressResolver: query to token via pair lookup or the listing
//! - PriceHistoryService: recent closes for sparklines

pub mod endpoints;
pub mod cache;
pub mod aggregator;
pub mod resolver;
pub mod history;

pub use endpoints::Endpoints;
pub use cache::{CacheEntry, ListingCache};
pub use aggregator::{
    listing_items, merge_records, Aggregation, FanOutReport, ListingOrigin, RawRecord,
    TokenAggregator,
};
pub use resolver::{flatten_pair, AddressResolver, Resolution};
pub use history::{extract_closes, synthesize_placeholder, PriceHistoryService, PriceSeries};
