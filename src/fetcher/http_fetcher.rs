use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{Result, UnifeedError};
use crate::fetcher::{Fetcher, FetcherConfig};

pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig, max_body_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let url = Url::parse(location.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UnifeedError::Other(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let mut response = self.client.get(url.clone()).send().await?;
        response.error_for_status_ref()?;

        let limit = self.max_body_bytes;
        if let Some(len) = response.content_length() {
            if len > limit as u64 {
                return Err(UnifeedError::InputTooLarge {
                    size: usize::try_from(len).unwrap_or(usize::MAX),
                    limit,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let size = body.len().saturating_add(chunk.len());
            if size > limit {
                return Err(UnifeedError::InputTooLarge { size, limit });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::info!(url = %url, bytes = body.len(), "Fetched feed");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetcherConfig::default(), 1024).unwrap()
    }

    #[test]
    fn test_invalid_url() {
        let err = tokio_test::block_on(fetcher().fetch("not a url")).unwrap_err();
        assert!(matches!(err, UnifeedError::InvalidUrl(_)));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = tokio_test::block_on(fetcher().fetch("ftp://example.com/feed.xml")).unwrap_err();
        assert!(matches!(err, UnifeedError::Other(_)));
    }
}
