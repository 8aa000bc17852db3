//! Universal feed parsing.
//!
//! [`Parser`] sniffs the input, hands it to the matching dialect parser and
//! normalizes the result. Each call either returns a complete [`Feed`] or an
//! error; nothing is retried and no partial feed escapes.
//!
//! ```
//! let feed = unifeed::parse_str(r#"{"version": "https://jsonfeed.org/version/1.1", "items": []}"#).unwrap();
//! assert_eq!(feed.feed_type, unifeed::FeedType::Json);
//! ```

pub mod atom;
pub mod config;
pub mod json;
pub mod rss;
pub mod xml;

use std::io::Read;

use crate::app::{Result, UnifeedError};
use crate::detector::detect_feed_type_with_limit;
use crate::domain::{Feed, FeedType};
use crate::normalizer::Normalize;

pub use atom::AtomParser;
pub use config::ParserConfig;
pub use json::JsonParser;
pub use rss::RssParser;

/// One concrete feed syntax, parsed into its own native record.
pub trait DialectParser {
    type Native: Normalize;

    const FEED_TYPE: FeedType;

    fn parse_native(&self, input: &[u8]) -> Result<Self::Native>;
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Detect the dialect and parse `input` into the canonical model.
    pub fn parse(&self, input: &[u8]) -> Result<Feed> {
        self.check_size(input.len())?;

        let feed_type = detect_feed_type_with_limit(input, self.config.sniff_limit);
        tracing::debug!(feed_type = %feed_type, bytes = input.len(), "Sniffed feed");

        match feed_type {
            FeedType::Unknown => Err(UnifeedError::UnknownFeedType),
            dialect => self.parse_as(dialect, input),
        }
    }

    pub fn parse_str(&self, input: &str) -> Result<Feed> {
        self.parse(input.as_bytes())
    }

    /// Read at most one byte past the size limit, then parse.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Feed> {
        let mut input = Vec::new();
        reader
            .take((self.config.max_input_bytes as u64).saturating_add(1))
            .read_to_end(&mut input)?;
        self.parse(&input)
    }

    pub fn parse_rss(&self, input: &[u8]) -> Result<Feed> {
        self.parse_with(&RssParser::new(self.config.max_depth), input)
    }

    pub fn parse_atom(&self, input: &[u8]) -> Result<Feed> {
        self.parse_with(&AtomParser::new(self.config.max_depth), input)
    }

    pub fn parse_json(&self, input: &[u8]) -> Result<Feed> {
        self.parse_with(&JsonParser::new(), input)
    }

    /// Parse as the given dialect without sniffing.
    pub fn parse_as(&self, feed_type: FeedType, input: &[u8]) -> Result<Feed> {
        match feed_type {
            FeedType::Rss => self.parse_rss(input),
            FeedType::Atom => self.parse_atom(input),
            FeedType::Json => self.parse_json(input),
            FeedType::Unknown => Err(UnifeedError::UnknownFeedType),
        }
    }

    pub fn parse_with<D: DialectParser>(&self, dialect: &D, input: &[u8]) -> Result<Feed> {
        self.check_size(input.len())?;

        let native = dialect.parse_native(input).inspect_err(|e| {
            tracing::debug!(dialect = %D::FEED_TYPE, error = %e, "Dialect parser rejected input");
        })?;
        let feed = native.normalize();

        tracing::debug!(
            feed_type = %feed.feed_type,
            items = feed.items.len(),
            "Normalized feed"
        );
        Ok(feed)
    }

    fn check_size(&self, size: usize) -> Result<()> {
        let limit = self.config.max_input_bytes;
        if size > limit {
            return Err(UnifeedError::InputTooLarge { size, limit });
        }
        Ok(())
    }
}

/// Parse with the default configuration.
pub fn parse(input: &[u8]) -> Result<Feed> {
    Parser::new().parse(input)
}

/// Parse a string with the default configuration.
pub fn parse_str(input: &str) -> Result<Feed> {
    Parser::new().parse_str(input)
}
