use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::{Feed, FeedType};
use crate::fetcher::{FileFetcher, Fetcher, HttpFetcher, LocationFetcher, ParallelFetcher};
use crate::parser::Parser;

pub struct AppContext {
    pub config: Config,
    pub parser: Parser,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let workers = config.fetcher.workers;
        Self::with_workers(config, workers)
    }

    pub fn with_workers(config: Config, workers: usize) -> Result<Self> {
        let max_bytes = config.parser.max_input_bytes;
        let http = HttpFetcher::new(&config.fetcher, max_bytes)?;
        let file = FileFetcher::new(max_bytes);

        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(LocationFetcher::new(http, file));
        let parallel_fetcher = ParallelFetcher::with_workers(fetcher.clone(), workers);
        let parser = Parser::with_config(config.parser.clone());

        Ok(Self {
            config,
            parser,
            fetcher,
            parallel_fetcher,
        })
    }

    /// Load the raw bytes at `location`, a URL or a local path.
    pub async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.fetcher.fetch(location).await
    }

    /// Fetch and parse, sniffing the dialect unless one is given.
    pub async fn fetch_feed(&self, location: &str, feed_type: Option<FeedType>) -> Result<Feed> {
        let body = self.fetch(location).await?;
        match feed_type {
            Some(feed_type) => self.parser.parse_as(feed_type, &body),
            None => self.parser.parse(&body),
        }
    }

    pub async fn fetch_all(&self, locations: Vec<String>) -> Vec<(String, Result<Feed>)> {
        self.parallel_fetcher.fetch_all(locations, &self.parser).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::UnifeedError;
    use std::io::Write;

    const ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>T</title><entry><id>x</id><title>E</title></entry></feed>"#;

    fn atom_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ATOM.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_fetch_feed_from_file() {
        let file = atom_file();
        let ctx = AppContext::new(Config::default()).unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let feed = ctx.fetch_feed(&path, None).await.unwrap();
        assert_eq!(feed.feed_type, FeedType::Atom);
        assert_eq!(feed.items[0].display_title(), "E");

        let err = ctx.fetch_feed(&path, Some(FeedType::Rss)).await.unwrap_err();
        assert!(matches!(err, UnifeedError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_respects_size_limit() {
        let file = atom_file();
        let mut config = Config::default();
        config.parser.max_input_bytes = 8;
        let ctx = AppContext::new(config).unwrap();

        let err = ctx
            .fetch(&file.path().to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, UnifeedError::InputTooLarge { limit: 8, .. }));
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let file = atom_file();
        let ctx = AppContext::with_workers(Config::default(), 2).unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let results = ctx.fetch_all(vec![path.clone(), path]).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
