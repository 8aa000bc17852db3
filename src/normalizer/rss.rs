use crate::domain::{Enclosure, Feed, FeedType, Image, Item, Person};
use crate::normalizer::{
    clean, clean_title, dated, enclosure_length, merge_unique, parse_person, resolve_guid,
    DateStyle, Normalize,
};
use crate::parser::rss::{RssFeed, RssItem};

impl Normalize for RssFeed {
    fn normalize(self) -> Feed {
        let mut feed = Feed::new(FeedType::Rss);

        let (published, published_parsed) = dated(self.pub_date, DateStyle::Rfc2822First);
        let (updated, updated_parsed) = dated(
            self.last_build_date.or(self.dublin_core.date),
            DateStyle::Rfc2822First,
        );

        feed.title = clean_title(self.title.or(self.dublin_core.title));
        feed.link = clean(self.link);
        feed.description = clean(self.description);
        feed.feed_link = clean(self.self_link);
        feed.published = published;
        feed.published_parsed = published_parsed;
        feed.updated = updated;
        feed.updated_parsed = updated_parsed;
        feed.language = clean(self.language.or(self.dublin_core.language));
        feed.copyright = clean(self.copyright.or(self.dublin_core.rights));
        feed.generator = clean(self.generator);
        feed.feed_version = self.version;

        feed.authors = self
            .managing_editor
            .or(self.web_master)
            .or(self.dublin_core.creator)
            .as_deref()
            .and_then(parse_person)
            .or_else(|| name_only(self.itunes.author))
            .into_iter()
            .collect();

        feed.image = self
            .image
            .and_then(|image| {
                Some(Image {
                    url: clean(image.url)?,
                    title: clean(image.title),
                })
            })
            .or_else(|| image_from_url(self.itunes.image));

        merge_unique(&mut feed.categories, self.categories);
        merge_unique(&mut feed.categories, self.dublin_core.subjects);
        merge_unique(&mut feed.categories, self.itunes.categories);

        feed.items = self.items.into_iter().map(normalize_item).collect();
        feed
    }
}

fn normalize_item(item: RssItem) -> Item {
    let (published, published_parsed) =
        dated(item.pub_date.or(item.dublin_core.date), DateStyle::Rfc2822First);

    // A permalink guid doubles as the link when <link> is missing.
    let permalink = item
        .guid
        .as_ref()
        .filter(|guid| guid.is_perma_link && guid.value.starts_with("http"))
        .map(|guid| guid.value.clone());

    let mut categories = Vec::new();
    merge_unique(&mut categories, item.categories);
    merge_unique(&mut categories, item.dublin_core.subjects);

    let mut normalized = Item {
        title: clean_title(item.title.or(item.dublin_core.title)),
        link: clean(item.link).or(permalink),
        description: clean(item.description),
        content: clean(item.content_encoded),
        published,
        published_parsed,
        authors: item
            .author
            .or(item.dublin_core.creator)
            .as_deref()
            .and_then(parse_person)
            .or_else(|| name_only(item.itunes.author))
            .into_iter()
            .collect(),
        image: image_from_url(item.itunes.image),
        categories,
        enclosures: item
            .enclosures
            .into_iter()
            .filter_map(|enclosure| {
                Some(Enclosure {
                    length: enclosure_length(enclosure.length.as_deref()),
                    mime_type: enclosure.mime_type.unwrap_or_default(),
                    url: enclosure.url?,
                })
            })
            .collect(),
        ..Default::default()
    };

    let explicit = item.guid.map(|guid| guid.value).or(item.about);
    normalized.guid = resolve_guid(explicit, &normalized);
    normalized
}

fn name_only(name: Option<String>) -> Option<Person> {
    clean(name).map(|name| Person {
        name: Some(name),
        email: None,
    })
}

fn image_from_url(url: Option<String>) -> Option<Image> {
    clean(url).map(|url| Image { url, title: None })
}
