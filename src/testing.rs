//! In-memory [`Fetcher`] for tests.
//!
//! ```rust,ignore
//! use lotorrent::testing::MockFetcher;
//!
//! let fetcher = MockFetcher::new()
//!     .with_page("http://mirror/lo/stable", "<a href=\"7.1.0/\">7.1.0/</a>")
//!     .with_transport_error("http://mirror/lo/testing");
//!
//! // ... run the crawler ...
//!
//! assert_eq!(fetcher.request_count(), 2);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::fetch::{FetchError, Fetcher};

#[derive(Debug, Clone)]
enum Response {
    Body(Vec<u8>),
    Status(u16),
    Transport(String),
}

/// Serves canned bodies by exact URL and records every request in order.
/// URLs without a canned response answer with a 404.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, Response>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.to_string(), Response::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), Response::Status(status));
        self
    }

    pub fn with_transport_error(mut self, url: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Response::Transport("connection reset by peer".to_string()),
        );
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requested_urls().len()
    }

    pub fn times_requested(&self, url: &str) -> usize {
        self.requested_urls().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        match self.responses.get(url) {
            Some(Response::Body(body)) => Ok(body.clone()),
            Some(Response::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(Response::Transport(message)) => Err(FetchError::Transport {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
