use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::fetch::JsonFetcher;

/// Mock fetcher that records calls and serves canned responses.
///
/// Responses are matched by URL substring, first registered match wins.
/// Unmatched URLs and registered failures return `None`.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    calls: Arc<Mutex<Vec<String>>>,
    responses: Arc<Mutex<Vec<(String, Option<Value>)>>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve `body` for URLs containing `fragment`
    pub fn with_response(self, fragment: &str, body: Value) -> Self {
        self.responses.lock().unwrap().push((fragment.to_string(), Some(body)));
        self
    }

    /// Builder method to fail URLs containing `fragment`
    pub fn with_failure(self, fragment: &str) -> Self {
        self.responses.lock().unwrap().push((fragment.to_string(), None));
        self
    }

    /// Builder method to hold every response for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace or add the response for `fragment` after construction
    pub fn set_response(&self, fragment: &str, body: Option<Value>) {
        let mut responses = self.responses.lock().unwrap();
        responses.retain(|(f, _)| f != fragment);
        responses.insert(0, (fragment.to_string(), body));
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of recorded calls whose URL contains `fragment`
    pub fn calls_matching(&self, fragment: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.contains(fragment)).count()
    }

    /// Highest number of requests observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonFetcher for RecordingFetcher {
    async fn fetch_json(&self, url: &str) -> Option<Value> {
        self.calls.lock().unwrap().push(url.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .and_then(|(_, body)| body.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
