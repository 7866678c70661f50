//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - JSON fetching from the listing gateway and DexScreener
//! - Time, so cache freshness can be driven by tests

pub mod fetch;
pub mod clock;
pub mod mocks;

pub use fetch::JsonFetcher;
pub use clock::{Clock, ManualClock, SystemClock};
pub use mocks::RecordingFetcher;
