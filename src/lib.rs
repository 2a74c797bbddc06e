pub mod config;
pub mod crawler;
pub mod fetch;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types for easier access in tests
pub use config::CrawlConfig;
pub use crawler::{Crawler, RunSummary, ScanReport, scan_and_download};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
