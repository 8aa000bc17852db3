use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::app::{Result, UnifeedError};
use crate::domain::Feed;
use crate::fetcher::Fetcher;
use crate::parser::Parser;

pub const DEFAULT_WORKERS: usize = 10;

/// Fetches and parses many feeds at once, at most `workers` at a time.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Results come back in input order, one per location.
    pub async fn fetch_all(
        &self,
        locations: Vec<String>,
        parser: &Parser,
    ) -> Vec<(String, Result<Feed>)> {
        let mut handles = Vec::new();

        for location in locations {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let parser = parser.clone();
            let task_location = location.clone();

            let handle = tokio::spawn(async move {
                match semaphore.acquire().await {
                    Ok(_permit) => {
                        fetch_single_feed(fetcher.as_ref(), &task_location, &parser).await
                    }
                    Err(e) => Err(UnifeedError::Other(e.to_string())),
                }
            });

            handles.push((location, handle));
        }

        let (locations, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();

        let mut results = Vec::new();
        for (location, joined) in locations.into_iter().zip(join_all(handles).await) {
            let result = joined.unwrap_or_else(|e| {
                tracing::error!("Task join error for {}: {}", location, e);
                Err(UnifeedError::Other(format!("Task failed: {}", e)))
            });
            results.push((location, result));
        }

        results
    }
}

async fn fetch_single_feed(
    fetcher: &(dyn Fetcher + Send + Sync),
    location: &str,
    parser: &Parser,
) -> Result<Feed> {
    let body = fetcher.fetch(location).await?;

    // Parsing is CPU-bound; keep it off the async workers.
    let parser = parser.clone();
    let feed = tokio::task::spawn_blocking(move || parser.parse(&body))
        .await
        .map_err(|e| UnifeedError::Other(format!("Parse task failed: {}", e)))??;

    tracing::info!(
        location,
        feed_type = %feed.feed_type,
        items = feed.len(),
        "Parsed feed"
    );
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedType;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticFetcher {
        bodies: HashMap<&'static str, &'static str>,
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
            self.bodies
                .get(location)
                .map(|body| body.as_bytes().to_vec())
                .ok_or_else(|| UnifeedError::Other(format!("no such feed: {}", location)))
        }
    }

    fn fetcher() -> Arc<dyn Fetcher + Send + Sync> {
        Arc::new(StaticFetcher {
            bodies: HashMap::from([
                (
                    "rss",
                    r#"<rss version="2.0"><channel><title>R</title><item><title>a</title></item></channel></rss>"#,
                ),
                (
                    "atom",
                    r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>A</title><entry><id>1</id></entry><entry><id>2</id></entry></feed>"#,
                ),
                ("json", r#"{"version": "https://jsonfeed.org/version/1.1", "items": []}"#),
                ("html", "<html><body></body></html>"),
            ]),
        })
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order_and_errors() {
        let parallel = ParallelFetcher::with_workers(fetcher(), 2);
        let locations = ["rss", "missing", "atom", "html", "json"]
            .map(String::from)
            .to_vec();

        let results = parallel.fetch_all(locations, &Parser::new()).await;
        let names: Vec<_> = results.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(names, vec!["rss", "missing", "atom", "html", "json"]);

        assert_eq!(results[0].1.as_ref().unwrap().feed_type, FeedType::Rss);
        assert!(matches!(results[1].1, Err(UnifeedError::Other(_))));
        assert_eq!(results[2].1.as_ref().unwrap().len(), 2);
        assert!(matches!(results[3].1, Err(UnifeedError::UnknownFeedType)));
        assert!(results[4].1.as_ref().unwrap().is_empty());
    }

    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
            if location == "boom" {
                panic!("fetcher crashed");
            }
            Ok(br#"{"items": []}"#.to_vec())
        }
    }

    #[tokio::test]
    async fn test_failed_task_keeps_its_location() {
        let parallel = ParallelFetcher::with_workers(Arc::new(PanickingFetcher), 2);
        let locations = vec!["ok".to_string(), "boom".to_string()];

        let results = parallel.fetch_all(locations, &Parser::new()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "ok");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "boom");
        assert!(matches!(results[1].1, Err(UnifeedError::Other(_))));
    }

    #[tokio::test]
    async fn test_zero_workers_still_runs() {
        let parallel = ParallelFetcher::with_workers(fetcher(), 0);
        let results = parallel
            .fetch_all(vec!["json".to_string()], &Parser::new())
            .await;
        assert!(results[0].1.is_ok());
    }
}
