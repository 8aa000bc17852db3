//! # Unifeed
//!
//! Parse RSS, Atom and JSON Feed documents into one canonical model.
//!
//! ## Architecture
//!
//! Every document goes through the same pipeline:
//!
//! ```text
//! bytes → Sniffer → Dialect parser → Normalizer → Feed
//! ```
//!
//! - [`detector`]: classifies a document from a bounded prefix
//! - [`parser`]: RSS 0.9x/1.0/2.0, Atom 0.3/1.0 and JSON Feed 1.0/1.1 parsers
//! - [`normalizer`]: maps each dialect's record onto [`Feed`]/[`Item`]
//! - [`fetcher`]: loads documents from URLs or local paths
//!
//! ## Quick Start
//!
//! ```bash
//! # Which dialect is this?
//! unifeed detect https://blog.rust-lang.org/feed.xml
//!
//! # Items with their enclosures, oldest first
//! unifeed parse podcast.xml --sort
//!
//! # Several feeds at once
//! unifeed batch --workers 4 a.xml b.json https://example.com/atom.xml
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Configuration file loading
//! - [`domain`]: Canonical models (Feed, Item, Enclosure)
//! - [`fetcher`]: HTTP and file fetching
//! - [`normalizer`]: Dialect records to canonical models
//! - [`parser`]: The universal parser and the dialect parsers

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the parser and
/// the fetchers.
pub mod app;

/// Command-line interface using clap.
///
/// - `detect <location>` - Print the detected feed type
/// - `parse <location>` - Print items, or the whole feed as JSON
/// - `batch <location>...` - Parse many feeds concurrently
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/unifeed/config.toml`, supporting parser limits and
/// fetcher settings.
pub mod config;

/// Feed format sniffing.
pub mod detector;

/// Canonical domain models.
///
/// - [`Feed`](domain::Feed): Feed metadata plus its items
/// - [`Item`](domain::Item): Individual entries with stable identifiers
/// - [`Enclosure`](domain::Enclosure): Attached media
pub mod domain;

/// Fetching feeds from URLs and files.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for loading feed bytes
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::ParallelFetcher): Concurrent fetch and parse with semaphore
pub mod fetcher;

/// Dialect records to the canonical model.
pub mod normalizer;

/// The universal parser and one parser per dialect.
pub mod parser;

pub use app::{Result, UnifeedError};
pub use detector::detect_feed_type;
pub use domain::{Enclosure, Feed, FeedType, Item};
pub use parser::{parse, parse_str, Parser};
