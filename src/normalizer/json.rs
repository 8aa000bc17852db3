use crate::domain::{Enclosure, Feed, FeedType, Image, Item, Person};
use crate::normalizer::{clean, clean_title, dated, resolve_guid, DateStyle, Normalize};
use crate::parser::json::{JsonAuthor, JsonFeed, JsonItem};

const VERSION_PREFIX: &str = "https://jsonfeed.org/version/";

impl Normalize for JsonFeed {
    fn normalize(self) -> Feed {
        let mut feed = Feed::new(FeedType::Json);

        let authors = people(self.authors, self.author);

        feed.title = clean_title(self.title);
        feed.description = clean(self.description);
        feed.link = clean(self.home_page_url);
        feed.feed_link = clean(self.feed_url);
        feed.language = clean(self.language);
        feed.image = clean(self.icon)
            .or(clean(self.favicon))
            .map(|url| Image { url, title: None });
        feed.feed_version = clean(self.version).map(|version| {
            version
                .strip_prefix(VERSION_PREFIX)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(version)
        });

        feed.items = self
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| normalize_item(item, &authors))
            .collect();
        feed.authors = authors;
        feed
    }
}

fn normalize_item(item: JsonItem, feed_authors: &[Person]) -> Item {
    let explicit = item.id_text();

    let (published, published_parsed) = dated(item.date_published, DateStyle::Rfc3339First);
    let (updated, updated_parsed) = dated(item.date_modified, DateStyle::Rfc3339First);

    let mut authors = people(item.authors, item.author);
    if authors.is_empty() {
        authors = feed_authors.to_vec();
    }

    let mut normalized = Item {
        title: clean_title(item.title),
        link: clean(item.url).or(clean(item.external_url)),
        description: clean(item.summary),
        content: clean(item.content_html).or(clean(item.content_text)),
        published,
        published_parsed,
        updated,
        updated_parsed,
        authors,
        image: clean(item.image)
            .or(clean(item.banner_image))
            .map(|url| Image { url, title: None }),
        categories: item.tags.unwrap_or_default(),
        enclosures: item
            .attachments
            .unwrap_or_default()
            .into_iter()
            .filter_map(|attachment| {
                let length = attachment.size().unwrap_or(0);
                Some(Enclosure {
                    url: clean(attachment.url)?,
                    mime_type: attachment.mime_type.unwrap_or_default(),
                    length,
                })
            })
            .collect(),
        ..Default::default()
    };

    normalized.guid = resolve_guid(explicit, &normalized);
    normalized
}

/// JSON Feed 1.1 `authors`, else the 1.0 single `author`.
fn people(authors: Option<Vec<JsonAuthor>>, author: Option<JsonAuthor>) -> Vec<Person> {
    authors
        .filter(|authors| !authors.is_empty())
        .or_else(|| author.map(|a| vec![a]))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|author| {
            clean(author.name).map(|name| Person {
                name: Some(name),
                email: None,
            })
        })
        .collect()
}
