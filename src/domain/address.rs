//! Address-shaped query detection
//!
//! A search query is routed to the pair lookup when it looks like a contract
//! address. The check is loose on purpose: anything longer than
//! [`LOOSE_ADDRESS_MIN_LEN`] characters qualifies, so base58 Solana mints pass
//! alongside `0x` hex addresses. Long free-text queries can false-positive;
//! they then miss the remote lookup and fall back to the local listing.

use std::sync::OnceLock;

use regex::Regex;

/// Queries strictly longer than this are treated as addresses
pub const LOOSE_ADDRESS_MIN_LEN: usize = 24;

/// `0x` followed by 20 to 64 hex digits
pub const HEX_ADDRESS_PATTERN: &str = r"^0x[0-9a-fA-F]{20,64}$";

fn hex_address() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HEX_ADDRESS_PATTERN).expect("hex address pattern is valid"))
}

/// Check if a query should be sent to the pair lookup
pub fn is_maybe_address(query: &str) -> bool {
    if query.is_empty() {
        return false;
    }
    hex_address().is_match(query) || query.chars().count() > LOOSE_ADDRESS_MIN_LEN
}
