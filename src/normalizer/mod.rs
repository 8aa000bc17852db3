//! Maps dialect-native records onto the canonical [`Feed`] model.
//!
//! Each dialect's record implements [`Normalize`]. The mapping is lossy by
//! contract: an unparseable date or a missing optional field leaves that field
//! unset and normalization carries on. Normalization itself cannot fail; any
//! error belongs to the dialect parser that built the record.

pub mod atom;
pub mod date;
pub mod json;
pub mod rss;

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;

use crate::domain::{Feed, Item, Person};

pub use date::{parse_date, DateStyle};

pub trait Normalize {
    fn normalize(self) -> Feed;
}

/// Trim a value and drop it when nothing is left.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Titles are plain text, but feeds often escape them twice.
pub(crate) fn clean_title(value: Option<String>) -> Option<String> {
    clean(value.map(|t| decode_html_entities(&t).into_owned()))
}

/// Raw date plus its parsed value.
pub(crate) fn dated(raw: Option<String>, style: DateStyle) -> (Option<String>, Option<DateTime<Utc>>) {
    let raw = clean(raw);
    let parsed = raw.as_deref().and_then(|r| parse_date(r, style));
    (raw, parsed)
}

/// Enclosure sizes are advisory; anything but a plain integer reads as `0`.
pub(crate) fn enclosure_length(raw: Option<&str>) -> u64 {
    raw.and_then(|r| r.trim().parse().ok()).unwrap_or(0)
}

/// Resolve an item identifier: the explicit id, else the link, else a digest
/// of the item's own content. The same item always gets the same id.
pub(crate) fn resolve_guid(explicit: Option<String>, item: &Item) -> String {
    if let Some(id) = clean(explicit) {
        return id;
    }
    if let Some(link) = &item.link {
        return link.clone();
    }

    Item::generate_id(&[
        item.title.as_deref().unwrap_or(""),
        item.body(),
        item.published.as_deref().unwrap_or(""),
        item.enclosures.first().map_or("", |e| e.url.as_str()),
    ])
}

/// Parse an RSS person string: `email (Name)`, `Name <email>`, a bare
/// address or a bare name.
pub(crate) fn parse_person(raw: &str) -> Option<Person> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some((email, rest)) = raw.split_once('(') {
        if let Some(name) = rest.strip_suffix(')') {
            return Some(Person {
                name: clean(Some(name.to_string())),
                email: clean(Some(email.to_string())),
            });
        }
    }

    if let Some((name, rest)) = raw.split_once('<') {
        if let Some(email) = rest.strip_suffix('>') {
            return Some(Person {
                name: clean(Some(name.trim().trim_matches('"').to_string())),
                email: clean(Some(email.to_string())),
            });
        }
    }

    if raw.contains('@') && !raw.contains(' ') {
        return Some(Person {
            name: None,
            email: Some(raw.to_string()),
        });
    }

    Some(Person {
        name: Some(raw.to_string()),
        email: None,
    })
}

/// Append `extra` to `values`, skipping duplicates.
pub(crate) fn merge_unique(values: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    for value in extra {
        if !values.contains(&value) {
            values.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Enclosure;

    #[test]
    fn test_clean() {
        assert_eq!(clean(Some("  x ".into())), Some("x".into()));
        assert_eq!(clean(Some(" \n ".into())), None);
        assert_eq!(clean(None), None);
    }

    #[test]
    fn test_clean_title_decodes_double_escaping() {
        assert_eq!(clean_title(Some("Tom &amp; Jerry".into())), Some("Tom & Jerry".into()));
    }

    #[test]
    fn test_enclosure_length() {
        assert_eq!(enclosure_length(Some("123")), 123);
        assert_eq!(enclosure_length(Some(" 42 ")), 42);
        assert_eq!(enclosure_length(Some("12MB")), 0);
        assert_eq!(enclosure_length(Some("-5")), 0);
        assert_eq!(enclosure_length(None), 0);
    }

    #[test]
    fn test_guid_prefers_explicit_id() {
        let item = Item {
            link: Some("https://example.com/a".into()),
            ..Default::default()
        };
        assert_eq!(resolve_guid(Some(" id-1 ".into()), &item), "id-1");
    }

    #[test]
    fn test_guid_falls_back_to_link() {
        let item = Item {
            link: Some("https://example.com/a".into()),
            ..Default::default()
        };
        assert_eq!(resolve_guid(None, &item), "https://example.com/a");
        assert_eq!(resolve_guid(Some("   ".into()), &item), "https://example.com/a");
    }

    #[test]
    fn test_guid_digest_is_idempotent() {
        let item = Item {
            title: Some("Episode".into()),
            enclosures: vec![Enclosure::new("https://example.com/e.mp3", "audio/mpeg", 1)],
            ..Default::default()
        };
        let first = resolve_guid(None, &item);
        let second = resolve_guid(None, &item);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let other = Item {
            title: Some("Other".into()),
            ..item.clone()
        };
        assert_ne!(resolve_guid(None, &other), first);
    }

    #[test]
    fn test_parse_person_forms() {
        assert_eq!(
            parse_person("editor@example.com (Ed Itor)"),
            Some(Person {
                name: Some("Ed Itor".into()),
                email: Some("editor@example.com".into())
            })
        );
        assert_eq!(
            parse_person("\"Ed Itor\" <editor@example.com>"),
            Some(Person {
                name: Some("Ed Itor".into()),
                email: Some("editor@example.com".into())
            })
        );
        assert_eq!(
            parse_person("editor@example.com"),
            Some(Person {
                name: None,
                email: Some("editor@example.com".into())
            })
        );
        assert_eq!(
            parse_person("Ed Itor"),
            Some(Person {
                name: Some("Ed Itor".into()),
                email: None
            })
        );
        assert_eq!(parse_person("  "), None);
    }

    #[test]
    fn test_merge_unique() {
        let mut values = vec!["a".to_string()];
        merge_unique(&mut values, vec!["a".to_string(), "b".to_string(), "b".to_string()]);
        assert_eq!(values, vec!["a", "b"]);
    }
}
