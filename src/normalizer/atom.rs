use crate::domain::{Enclosure, Feed, FeedType, Image, Item, Person};
use crate::normalizer::{
    clean, clean_title, dated, enclosure_length, resolve_guid, DateStyle, Normalize,
};
use crate::parser::atom::{AtomEntry, AtomFeed, AtomLink, AtomPerson};

impl Normalize for AtomFeed {
    fn normalize(self) -> Feed {
        let mut feed = Feed::new(FeedType::Atom);

        let (updated, updated_parsed) = dated(self.updated, DateStyle::Rfc3339First);
        let authors = people(self.authors);

        feed.title = clean_title(self.title);
        feed.description = clean(self.subtitle);
        feed.link = alternate_link(&self.links);
        feed.feed_link = self
            .links
            .iter()
            .find(|link| link.rel == "self")
            .map(|link| link.href.clone());
        feed.updated = updated;
        feed.updated_parsed = updated_parsed;
        feed.language = clean(self.language);
        feed.image = clean(self.logo)
            .or(clean(self.icon))
            .map(|url| Image { url, title: None });
        feed.copyright = clean(self.rights);
        feed.generator = clean(self.generator);
        feed.categories = self.categories;
        feed.feed_version = Some(self.version);

        feed.items = self
            .entries
            .into_iter()
            .map(|entry| normalize_entry(entry, &authors))
            .collect();
        feed.authors = authors;
        feed
    }
}

/// Entries without their own authors inherit the feed's.
fn normalize_entry(entry: AtomEntry, feed_authors: &[Person]) -> Item {
    // Atom 1.0 only requires <updated>; use it when <published> is absent.
    let (published, published_parsed) = dated(
        entry.published.or_else(|| entry.updated.clone()),
        DateStyle::Rfc3339First,
    );
    let (updated, updated_parsed) = dated(entry.updated, DateStyle::Rfc3339First);

    let mut authors = people(entry.authors);
    if authors.is_empty() {
        authors = feed_authors.to_vec();
    }

    let mut item = Item {
        title: clean_title(entry.title),
        link: alternate_link(&entry.links),
        description: clean(entry.summary),
        content: entry.content.and_then(|content| clean(content.value)),
        published,
        published_parsed,
        updated,
        updated_parsed,
        authors,
        categories: entry.categories,
        enclosures: entry
            .links
            .iter()
            .filter(|link| link.rel == "enclosure")
            .map(|link| Enclosure {
                url: link.href.clone(),
                mime_type: link.mime_type.clone().unwrap_or_default(),
                length: enclosure_length(link.length.as_deref()),
            })
            .collect(),
        ..Default::default()
    };

    item.guid = resolve_guid(entry.id, &item);
    item
}

/// The `alternate` link, else the first link that is neither `self` nor an
/// enclosure.
fn alternate_link(links: &[AtomLink]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "alternate")
        .or_else(|| {
            links
                .iter()
                .find(|link| link.rel != "self" && link.rel != "enclosure")
        })
        .map(|link| link.href.clone())
}

fn people(authors: Vec<AtomPerson>) -> Vec<Person> {
    authors
        .into_iter()
        .map(|author| Person {
            name: clean(author.name),
            email: clean(author.email),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::atom::AtomContent;
    use chrono::{TimeZone, Utc};

    fn link(rel: &str, href: &str) -> AtomLink {
        AtomLink {
            href: href.into(),
            rel: rel.into(),
            ..Default::default()
        }
    }

    fn entry() -> AtomEntry {
        AtomEntry {
            id: Some("urn:uuid:1".into()),
            title: Some("Entry".into()),
            summary: Some("Summary".into()),
            content: Some(AtomContent {
                kind: Some("html".into()),
                src: None,
                value: Some("<p>Full content</p>".into()),
            }),
            links: vec![link("alternate", "http://example.org/1")],
            updated: Some("2024-01-02T00:00:00Z".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_preferred_over_summary() {
        let item = normalize_entry(entry(), &[]);
        assert_eq!(item.body(), "<p>Full content</p>");
        assert_eq!(item.description.as_deref(), Some("Summary"));
    }

    #[test]
    fn test_summary_only() {
        let item = normalize_entry(
            AtomEntry {
                content: None,
                ..entry()
            },
            &[],
        );
        assert_eq!(item.body(), "Summary");
    }

    #[test]
    fn test_published_falls_back_to_updated() {
        let item = normalize_entry(entry(), &[]);
        assert_eq!(
            item.published_parsed,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );

        let item = normalize_entry(
            AtomEntry {
                published: Some("2024-01-01T00:00:00Z".into()),
                ..entry()
            },
            &[],
        );
        assert_eq!(
            item.published_parsed,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            item.updated_parsed,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_enclosure_links() {
        let item = normalize_entry(
            AtomEntry {
                links: vec![
                    AtomLink {
                        mime_type: Some("audio/mpeg".into()),
                        length: Some("1337".into()),
                        ..link("enclosure", "http://example.org/a.mp3")
                    },
                    link("alternate", "http://example.org/1"),
                ],
                ..entry()
            },
            &[],
        );
        assert_eq!(item.link.as_deref(), Some("http://example.org/1"));
        assert_eq!(
            item.enclosures,
            vec![Enclosure::new("http://example.org/a.mp3", "audio/mpeg", 1337)]
        );
    }

    #[test]
    fn test_guid_falls_back_to_link() {
        let item = normalize_entry(AtomEntry { id: None, ..entry() }, &[]);
        assert_eq!(item.guid, "http://example.org/1");
    }

    #[test]
    fn test_inherits_feed_authors() {
        let feed_authors = vec![Person {
            name: Some("Feed Author".into()),
            email: None,
        }];
        let item = normalize_entry(entry(), &feed_authors);
        assert_eq!(item.authors, feed_authors);
    }

    #[test]
    fn test_alternate_link_selection() {
        assert_eq!(
            alternate_link(&[link("self", "s"), link("related", "r")]),
            Some("r".into())
        );
        assert_eq!(alternate_link(&[link("self", "s")]), None);
    }

    #[test]
    fn test_feed_metadata() {
        let feed = AtomFeed {
            version: "1.0".into(),
            title: Some("Example Feed".into()),
            subtitle: Some("Sub".into()),
            links: vec![link("alternate", "http://example.org/"), link("self", "http://example.org/feed")],
            icon: Some("http://example.org/icon.png".into()),
            authors: vec![AtomPerson {
                name: Some("John".into()),
                email: Some("john@example.org".into()),
                uri: None,
            }],
            entries: vec![entry()],
            ..Default::default()
        }
        .normalize();

        assert_eq!(feed.feed_type, FeedType::Atom);
        assert_eq!(feed.feed_version.as_deref(), Some("1.0"));
        assert_eq!(feed.display_description(), "Sub");
        assert_eq!(feed.link.as_deref(), Some("http://example.org/"));
        assert_eq!(feed.feed_link.as_deref(), Some("http://example.org/feed"));
        assert_eq!(feed.image.unwrap().url, "http://example.org/icon.png");
        assert_eq!(feed.items[0].authors, feed.authors);
    }
}
