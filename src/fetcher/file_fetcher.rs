use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::app::{Result, UnifeedError};
use crate::fetcher::Fetcher;

/// Reads feeds from the local filesystem.
pub struct FileFetcher {
    max_bytes: usize,
}

impl FileFetcher {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));

        let size = fs::metadata(path).await?.len();
        if size > self.max_bytes as u64 {
            return Err(UnifeedError::InputTooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                limit: self.max_bytes,
            });
        }

        let body = fs::read(path).await?;
        tracing::debug!(path = %path.display(), bytes = body.len(), "Read feed file");
        Ok(body)
    }
}
