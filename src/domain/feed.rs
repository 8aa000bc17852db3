use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// The coarse dialect classification produced by the sniffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Rss,
    Atom,
    Json,
    #[default]
    Unknown,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Rss => "rss",
            FeedType::Atom => "atom",
            FeedType::Json => "json",
            FeedType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub title: Option<String>,
}

/// A feed in canonical, dialect-independent form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub feed_link: Option<String>,
    pub updated: Option<String>,
    pub updated_parsed: Option<DateTime<Utc>>,
    pub published: Option<String>,
    pub published_parsed: Option<DateTime<Utc>>,
    pub authors: Vec<Person>,
    pub language: Option<String>,
    pub image: Option<Image>,
    pub copyright: Option<String>,
    pub generator: Option<String>,
    pub categories: Vec<String>,
    pub feed_type: FeedType,
    pub feed_version: Option<String>,
    pub items: Vec<Item>,
}

impl Feed {
    pub fn new(feed_type: FeedType) -> Self {
        Self {
            feed_type,
            ..Default::default()
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn display_link(&self) -> &str {
        self.link.as_deref().unwrap_or("")
    }

    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sort items oldest first by `published_parsed`.
    ///
    /// Undated items sort before every dated one. The sort is stable, so
    /// items with equal dates keep their document order.
    pub fn sort(&mut self) {
        self.items.sort_by(Item::cmp_published);
    }

    pub fn is_sorted(&self) -> bool {
        self.items
            .windows(2)
            .all(|pair| pair[0].cmp_published(&pair[1]).is_le())
    }
}
