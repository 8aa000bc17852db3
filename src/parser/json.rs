//! JSON Feed 1.0 and 1.1.
//!
//! Unknown members are ignored so later versions still parse. Every member is
//! optional: one of the wrong type reads as absent instead of failing the
//! document. Arrays keep only the elements of the expected shape, item ids may
//! be strings or numbers, and a bare string `author` is taken as its name.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::app::{Result, UnifeedError};
use crate::detector::skip_preamble;
use crate::domain::FeedType;
use crate::parser::DialectParser;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonFeed {
    #[serde(deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub home_page_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub feed_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub icon: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub favicon: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub expired: Option<bool>,
    /// JSON Feed 1.0 single author.
    #[serde(deserialize_with = "lenient_author")]
    pub author: Option<JsonAuthor>,
    #[serde(deserialize_with = "lenient_list")]
    pub authors: Option<Vec<JsonAuthor>>,
    #[serde(deserialize_with = "lenient_list")]
    pub items: Option<Vec<JsonItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonItem {
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub external_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub content_html: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub content_text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub banner_image: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub date_published: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub date_modified: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient_author")]
    pub author: Option<JsonAuthor>,
    #[serde(deserialize_with = "lenient_list")]
    pub authors: Option<Vec<JsonAuthor>>,
    #[serde(deserialize_with = "lenient_list")]
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    pub attachments: Option<Vec<JsonAttachment>>,
}

impl JsonItem {
    /// The item id as text, whether the feed wrote it as a string or a number.
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonAuthor {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonAttachment {
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub mime_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    pub size_in_bytes: Option<Value>,
    pub duration_in_seconds: Option<Value>,
}

impl JsonAttachment {
    /// Size in bytes, accepting integral floats and numeric strings.
    pub fn size(&self) -> Option<u64> {
        match self.size_in_bytes.as_ref()? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Any value that does not fit `T` reads as `None`.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the array elements that fit `T`; a non-array reads as `None`.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(values) => Ok(Some(
            values
                .into_iter()
                .filter_map(|value| serde_json::from_value(value).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

fn lenient_author<'de, D>(deserializer: D) -> std::result::Result<Option<JsonAuthor>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(name) => Ok(Some(JsonAuthor {
            name: Some(name),
            ..Default::default()
        })),
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl DialectParser for JsonParser {
    type Native = JsonFeed;

    const FEED_TYPE: FeedType = FeedType::Json;

    fn parse_native(&self, input: &[u8]) -> Result<JsonFeed> {
        let value: Value = serde_json::from_slice(skip_preamble(input))
            .map_err(|e| UnifeedError::malformed(FeedType::Json, e.to_string()))?;
        if !value.is_object() {
            return Err(UnifeedError::malformed(
                FeedType::Json,
                "expected an object at the top level",
            ));
        }

        let feed: JsonFeed = serde_json::from_value(value)
            .map_err(|e| UnifeedError::malformed(FeedType::Json, e.to_string()))?;

        tracing::debug!(
            version = feed.version.as_deref().unwrap_or("unknown"),
            items = feed.items.as_ref().map_or(0, Vec::len),
            "Parsed JSON Feed document"
        );
        Ok(feed)
    }
}
