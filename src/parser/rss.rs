//! RSS 0.9x, RSS 1.0 (RDF) and RSS 2.0.
//!
//! The three share element names but not structure: RSS 2.0 nests `item`
//! inside `channel`, while RDF and RSS 0.90 list items (and the image) as
//! siblings of `channel`. Channel metadata and the item list are therefore
//! looked up independently, in both places.

use crate::app::{Result, UnifeedError};
use crate::domain::FeedType;
use crate::parser::xml::{self, Element, ATOM, CONTENT, DUBLIN_CORE, ITUNES};
use crate::parser::DialectParser;

pub const RSS_10_NAMESPACE: &str = "http://purl.org/rss/1.0/";
pub const RSS_090_NAMESPACE: &str = "http://my.netscape.com/rdf/simple/0.9/";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RssFeed {
    pub version: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub managing_editor: Option<String>,
    pub web_master: Option<String>,
    pub pub_date: Option<String>,
    pub last_build_date: Option<String>,
    pub generator: Option<String>,
    pub categories: Vec<String>,
    pub image: Option<RssImage>,
    pub self_link: Option<String>,
    pub dublin_core: DublinCore,
    pub itunes: ITunes,
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RssImage {
    pub url: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RssItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content_encoded: Option<String>,
    pub author: Option<String>,
    pub comments: Option<String>,
    pub pub_date: Option<String>,
    pub guid: Option<RssGuid>,
    /// `rdf:about` of an RSS 1.0 item.
    pub about: Option<String>,
    pub categories: Vec<String>,
    pub enclosures: Vec<RssEnclosure>,
    pub dublin_core: DublinCore,
    pub itunes: ITunes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssGuid {
    pub value: String,
    pub is_perma_link: bool,
}

/// Attribute values exactly as written; the normalizer interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssEnclosure {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub length: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DublinCore {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub date: Option<String>,
    pub rights: Option<String>,
    pub language: Option<String>,
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ITunes {
    pub author: Option<String>,
    pub image: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RssParser {
    max_depth: usize,
}

impl RssParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl DialectParser for RssParser {
    type Native = RssFeed;

    const FEED_TYPE: FeedType = FeedType::Rss;

    fn parse_native(&self, input: &[u8]) -> Result<RssFeed> {
        let root = xml::parse_document(input, self.max_depth)
            .map_err(|e| UnifeedError::malformed(FeedType::Rss, e.to_string()))?;

        let root_name = root.name.to_ascii_lowercase();
        if !matches!(root_name.as_str(), "rss" | "rdf" | "channel") {
            return Err(UnifeedError::malformed(
                FeedType::Rss,
                format!(
                    "expected <rss>, <rdf:RDF> or <channel> root, found <{}>",
                    root.qualified_name()
                ),
            ));
        }

        let channel = if root_name == "channel" {
            Some(&root)
        } else {
            core_child(&root, "channel")
        };
        let outside = (root_name != "channel").then_some(&root);
        if channel.is_none() {
            tracing::warn!(root = %root.qualified_name(), "RSS document has no <channel>");
        }

        let mut feed = channel.map(parse_channel).unwrap_or_default();
        feed.version = detect_version(&root, channel);

        // RDF and RSS 0.90 put the image and items next to the channel.
        feed.image = channel
            .into_iter()
            .chain(outside)
            .flat_map(|parent| core_children(parent, "image"))
            .find(|image| core_text(image, "url").is_some())
            .map(parse_image);

        feed.items = channel
            .into_iter()
            .chain(outside)
            .flat_map(|parent| core_children(parent, "item"))
            .map(parse_item)
            .collect();

        tracing::debug!(
            version = feed.version.as_deref().unwrap_or("unknown"),
            items = feed.items.len(),
            "Parsed RSS document"
        );
        Ok(feed)
    }
}

fn detect_version(root: &Element, channel: Option<&Element>) -> Option<String> {
    if root.name.eq_ignore_ascii_case("rss") {
        return root.attr("version").map(str::to_string);
    }

    let namespace = channel
        .and_then(|c| c.namespace.as_deref())
        .or_else(|| root.children().find_map(|c| c.namespace.as_deref()));
    match namespace {
        Some(RSS_090_NAMESPACE) => Some("0.9".to_string()),
        Some(RSS_10_NAMESPACE) => Some("1.0".to_string()),
        _ if root.name.eq_ignore_ascii_case("rdf") => Some("1.0".to_string()),
        _ => None,
    }
}

fn parse_channel(channel: &Element) -> RssFeed {
    RssFeed {
        title: core_text(channel, "title"),
        link: core_text(channel, "link"),
        description: core_text(channel, "description"),
        language: core_text(channel, "language"),
        copyright: core_text(channel, "copyright"),
        managing_editor: core_text(channel, "managingEditor"),
        web_master: core_text(channel, "webMaster"),
        pub_date: core_text(channel, "pubDate"),
        last_build_date: core_text(channel, "lastBuildDate"),
        generator: core_text(channel, "generator"),
        categories: core_children(channel, "category")
            .filter_map(Element::text_opt)
            .collect(),
        self_link: channel
            .ext_children(&ATOM, "link")
            .find(|link| link.attr("rel") == Some("self"))
            .and_then(|link| attr_text(link, "href")),
        dublin_core: parse_dublin_core(channel),
        itunes: parse_itunes(channel),
        ..Default::default()
    }
}

fn parse_image(image: &Element) -> RssImage {
    RssImage {
        url: core_text(image, "url"),
        title: core_text(image, "title"),
        link: core_text(image, "link"),
    }
}

fn parse_item(item: &Element) -> RssItem {
    RssItem {
        title: core_text(item, "title"),
        link: core_text(item, "link"),
        description: core_text(item, "description"),
        content_encoded: item.ext_text(&CONTENT, "encoded"),
        author: core_text(item, "author"),
        comments: core_text(item, "comments"),
        pub_date: core_text(item, "pubDate"),
        guid: core_child(item, "guid").and_then(|guid| {
            guid.text_opt().map(|value| RssGuid {
                value,
                is_perma_link: guid
                    .attr("isPermaLink")
                    .map_or(true, |v| !v.trim().eq_ignore_ascii_case("false")),
            })
        }),
        about: attr_text(item, "rdf:about"),
        categories: core_children(item, "category")
            .filter_map(Element::text_opt)
            .collect(),
        enclosures: core_children(item, "enclosure")
            .map(|enclosure| RssEnclosure {
                url: attr_text(enclosure, "url"),
                mime_type: attr_text(enclosure, "type"),
                length: attr_text(enclosure, "length"),
            })
            .collect(),
        dublin_core: parse_dublin_core(item),
        itunes: parse_itunes(item),
    }
}

fn parse_dublin_core(element: &Element) -> DublinCore {
    DublinCore {
        title: element.ext_text(&DUBLIN_CORE, "title"),
        creator: element.ext_text(&DUBLIN_CORE, "creator"),
        date: element.ext_text(&DUBLIN_CORE, "date"),
        rights: element.ext_text(&DUBLIN_CORE, "rights"),
        language: element.ext_text(&DUBLIN_CORE, "language"),
        subjects: element
            .ext_children(&DUBLIN_CORE, "subject")
            .filter_map(Element::text_opt)
            .collect(),
    }
}

fn parse_itunes(element: &Element) -> ITunes {
    let mut categories = Vec::new();
    for category in element.ext_children(&ITUNES, "category") {
        categories.extend(attr_text(category, "text"));
        categories.extend(
            category
                .ext_children(&ITUNES, "category")
                .filter_map(|sub| attr_text(sub, "text")),
        );
    }

    ITunes {
        author: element.ext_text(&ITUNES, "author"),
        image: element
            .ext_child(&ITUNES, "image")
            .and_then(|image| attr_text(image, "href")),
        categories,
    }
}

/// RSS core elements: unprefixed with no namespace (0.9x/2.0) or in one of the
/// RDF-era RSS namespaces under any prefix.
fn is_core(element: &Element, name: &str) -> bool {
    element.name == name
        && match element.namespace.as_deref() {
            None => element.prefix.is_none(),
            Some(ns) => ns == RSS_10_NAMESPACE || ns == RSS_090_NAMESPACE || element.prefix.is_none(),
        }
}

fn core_children<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    parent.children().filter(move |e| is_core(e, name))
}

fn core_child<'a>(parent: &'a Element, name: &'a str) -> Option<&'a Element> {
    core_children(parent, name).next()
}

fn core_text(parent: &Element, name: &str) -> Option<String> {
    core_child(parent, name).and_then(Element::text_opt)
}

fn attr_text(element: &Element, name: &str) -> Option<String> {
    element
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
