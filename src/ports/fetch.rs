//! JSON fetch port
//!
//! Every upstream call in the pipeline goes through this one contract:
//! a URL in, a parsed JSON document or `None` out. Implementations log and
//! swallow transport failures (timeouts, connection errors, non-2xx
//! statuses, undecodable bodies) so callers can treat every source the
//! same way.

use async_trait::async_trait;
use serde_json::Value;

/// Fetch port trait
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch `url` and parse the body as JSON.
    ///
    /// Returns `None` on any failure. Never panics past this boundary.
    async fn fetch_json(&self, url: &str) -> Option<Value>;
}
