//! Domain Layer - Core types and pure logic
//!
//! No I/O happens here. Everything that talks to the network goes through
//! the ports layer.
//!
//! - `token`: canonical Token record and the listing sub-feeds
//! - `normalizer`: ordered field-extraction rules for upstream records
//! - `address`: address-shaped query heuristic
//! - `ordering`: canonical recency order, view sort modes, paging
//! - `format`: market cap, short address, age and sparkline helpers

pub mod token;
pub mod normalizer;
pub mod address;
pub mod ordering;
pub mod format;

pub use token::{FeedKind, Token, DEFAULT_DESCRIPTION, PLACEHOLDER_IMAGE};
pub use normalizer::{is_present, sanitize_image_url, FieldPath, FieldRule, Normalizer, NormalizerRules};
pub use address::{is_maybe_address, LOOSE_ADDRESS_MIN_LEN};
pub use ordering::{arrange, compare_recency, paginate, sort_by_recency, SortMode, PAGE_COUNT};
pub use format::{format_market_cap, short_address, sparkline, time_ago, Sparkline};
