pub mod file_fetcher;
pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;

pub use file_fetcher::FileFetcher;
pub use http_fetcher::HttpFetcher;
pub use parallel::{ParallelFetcher, DEFAULT_WORKERS};

/// Settings for fetching feeds over HTTP and for batch runs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Concurrent fetches in batch mode (default: 10)
    pub workers: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("unifeed/{}", env!("CARGO_PKG_VERSION")),
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Loads the raw bytes of a feed from some location.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Dispatches on the location: `http://` and `https://` go over the network,
/// anything else is read as a local path.
pub struct LocationFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl LocationFetcher {
    pub fn new(http: HttpFetcher, file: FileFetcher) -> Self {
        Self { http, file }
    }
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl Fetcher for LocationFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if is_remote(location) {
            self.http.fetch(location).await
        } else {
            self.file.fetch(location).await
        }
    }
}
