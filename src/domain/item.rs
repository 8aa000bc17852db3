use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Image, Person};

/// A media attachment referenced by an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
    /// Size in bytes, `0` when the feed omits it or it does not parse.
    pub length: u64,
}

impl Enclosure {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>, length: u64) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
            length,
        }
    }
}

/// A single feed entry in canonical form.
///
/// Fields the source document omits, or that fail to parse (dates in
/// particular), are left at `None`/empty instead of failing the whole feed.
/// The raw date strings are kept next to their parsed values so callers can
/// see what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub guid: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published: Option<String>,
    pub published_parsed: Option<DateTime<Utc>>,
    pub updated: Option<String>,
    pub updated_parsed: Option<DateTime<Utc>>,
    pub authors: Vec<Person>,
    pub image: Option<Image>,
    pub categories: Vec<String>,
    pub enclosures: Vec<Enclosure>,
}

impl Item {
    /// Generate a deterministic ID from the given parts
    pub fn generate_id(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    pub fn display_link(&self) -> &str {
        self.link.as_deref().unwrap_or("")
    }

    /// The item body: full content when present, otherwise the summary.
    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }

    /// Chronological comparison on `published_parsed`; undated items come first.
    pub fn cmp_published(&self, other: &Self) -> Ordering {
        self.published_parsed.cmp(&other.published_parsed)
    }
}
