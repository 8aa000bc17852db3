//! Atom 1.0 and Atom 0.3.
//!
//! Both versions produce the same [`AtomFeed`] record. Elements are matched in
//! the namespace of the root `feed` element, so prefixed documents and the 0.3
//! namespace work the same way; 0.3-only element names are read as their 1.0
//! counterparts.

use crate::app::{Result, UnifeedError};
use crate::domain::FeedType;
use crate::parser::xml::{self, Element};
use crate::parser::DialectParser;

pub const ATOM_10_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const ATOM_03_NAMESPACE: &str = "http://purl.org/atom/ns#";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomFeed {
    pub version: String,
    pub id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub updated: Option<String>,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AtomPerson>,
    pub categories: Vec<String>,
    pub generator: Option<String>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub rights: Option<String>,
    pub language: Option<String>,
    pub entries: Vec<AtomEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<AtomContent>,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AtomPerson>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomLink {
    pub href: String,
    /// `alternate` when the document omits it.
    pub rel: String,
    pub mime_type: Option<String>,
    pub length: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomPerson {
    pub name: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomContent {
    pub kind: Option<String>,
    /// Out-of-line content reference; `value` is then usually empty.
    pub src: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AtomParser {
    max_depth: usize,
}

impl AtomParser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl DialectParser for AtomParser {
    type Native = AtomFeed;

    const FEED_TYPE: FeedType = FeedType::Atom;

    fn parse_native(&self, input: &[u8]) -> Result<AtomFeed> {
        let root = xml::parse_document(input, self.max_depth)
            .map_err(|e| UnifeedError::malformed(FeedType::Atom, e.to_string()))?;

        if !root.name.eq_ignore_ascii_case("feed") {
            return Err(UnifeedError::malformed(
                FeedType::Atom,
                format!("expected <feed> root, found <{}>", root.qualified_name()),
            ));
        }

        let atom = Atom {
            ns: root.namespace.as_deref(),
        };
        let version = if atom.ns == Some(ATOM_03_NAMESPACE) || root.attr("version") == Some("0.3")
        {
            "0.3"
        } else {
            "1.0"
        };

        let feed = AtomFeed {
            version: version.to_string(),
            id: atom.text(&root, &["id"]),
            title: atom.text(&root, &["title"]),
            subtitle: atom.text(&root, &["subtitle", "tagline"]),
            updated: atom.text(&root, &["updated", "modified"]),
            links: atom.links(&root),
            authors: atom.people(&root),
            categories: atom.categories(&root),
            generator: atom.text(&root, &["generator"]),
            icon: atom.text(&root, &["icon"]),
            logo: atom.text(&root, &["logo"]),
            rights: atom.text(&root, &["rights", "copyright"]),
            language: root.attr("xml:lang").map(str::to_string),
            entries: root
                .children_in(atom.ns, "entry")
                .map(|entry| atom.entry(entry))
                .collect(),
        };

        tracing::debug!(
            version = %feed.version,
            entries = feed.entries.len(),
            "Parsed Atom document"
        );
        Ok(feed)
    }
}

/// Element lookup scoped to the document's Atom namespace.
struct Atom<'a> {
    ns: Option<&'a str>,
}

impl Atom<'_> {
    fn first<'e>(&self, parent: &'e Element, names: &[&str]) -> Option<&'e Element> {
        names
            .iter()
            .find_map(|name| parent.child_in(self.ns, name))
    }

    fn text(&self, parent: &Element, names: &[&str]) -> Option<String> {
        self.first(parent, names).and_then(text_construct)
    }

    fn entry(&self, entry: &Element) -> AtomEntry {
        AtomEntry {
            id: self.text(entry, &["id"]),
            title: self.text(entry, &["title"]),
            summary: self.text(entry, &["summary"]),
            content: self.first(entry, &["content"]).map(|content| AtomContent {
                kind: content.attr("type").map(str::to_string),
                src: content.attr("src").map(str::to_string),
                value: text_construct(content),
            }),
            links: self.links(entry),
            authors: self.people(entry),
            published: self.text(entry, &["published", "issued", "created"]),
            updated: self.text(entry, &["updated", "modified"]),
            categories: self.categories(entry),
        }
    }

    fn links(&self, parent: &Element) -> Vec<AtomLink> {
        parent
            .children_in(self.ns, "link")
            .filter_map(|link| {
                let href = link.attr("href").map(str::trim).filter(|h| !h.is_empty())?;
                Some(AtomLink {
                    href: href.to_string(),
                    rel: link.attr("rel").unwrap_or("alternate").to_string(),
                    mime_type: link.attr("type").map(str::to_string),
                    length: link.attr("length").map(str::to_string),
                    title: link.attr("title").map(str::to_string),
                })
            })
            .collect()
    }

    fn people(&self, parent: &Element) -> Vec<AtomPerson> {
        parent
            .children_in(self.ns, "author")
            .map(|author| AtomPerson {
                name: self.text(author, &["name"]),
                email: self.text(author, &["email"]),
                uri: self.text(author, &["uri", "url"]),
            })
            .filter(|person| person.name.is_some() || person.email.is_some())
            .collect()
    }

    fn categories(&self, parent: &Element) -> Vec<String> {
        parent
            .children_in(self.ns, "category")
            .filter_map(|category| {
                category
                    .attr("term")
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .or_else(|| category.text_opt())
            })
            .collect()
    }
}

/// Text of an Atom text construct. XHTML (and 0.3 `mode="xml"`) content keeps
/// its markup; the wrapping `div` is dropped.
fn text_construct(element: &Element) -> Option<String> {
    let is_markup = matches!(
        element.attr("type"),
        Some("xhtml") | Some("application/xhtml+xml")
    ) || element.attr("mode") == Some("xml");

    if !is_markup {
        return element.text_opt();
    }

    let markup = match element.children().next() {
        Some(div) if div.name == "div" && element.children().count() == 1 => div.inner_xml(),
        _ => element.inner_xml(),
    };
    Some(markup).filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM_10: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en">
  <title>Example Feed</title>
  <subtitle type="html">A &lt;em&gt;subtitle&lt;/em&gt;</subtitle>
  <link href="http://example.org/"/>
  <link rel="self" href="http://example.org/feed.atom"/>
  <updated>2003-12-13T18:30:02Z</updated>
  <author><name>John Doe</name><email>john@example.org</email></author>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <generator uri="https://example.org/gen">Gen</generator>
  <logo>http://example.org/logo.png</logo>
  <category term="tech"/>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <link rel="enclosure" type="audio/mpeg" length="1337" href="http://example.org/audio.mp3"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <published>2003-12-13T08:29:29-04:00</published>
    <updated>2003-12-13T18:30:02Z</updated>
    <summary>Some text.</summary>
    <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p>Full <b>text</b>.</p></div></content>
  </entry>
</feed>"#;

    const ATOM_03: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed version="0.3" xmlns="http://purl.org/atom/ns#">
  <title>dive into mark</title>
  <tagline>A lot of effort went into making this effortless</tagline>
  <link rel="alternate" type="text/html" href="http://diveintomark.org/"/>
  <modified>2003-12-13T18:30:02Z</modified>
  <copyright>Copyright (c) 2003</copyright>
  <author><name>Mark Pilgrim</name><url>http://diveintomark.org/</url></author>
  <entry>
    <title>Atom 0.3 snapshot</title>
    <link rel="alternate" type="text/html" href="http://diveintomark.org/2003/12/13/atom03"/>
    <id>tag:diveintomark.org,2003:3.2397</id>
    <issued>2003-12-13T08:29:29-04:00</issued>
    <modified>2003-12-13T18:30:02Z</modified>
    <content type="text/html" mode="escaped">&lt;p&gt;Escaped&lt;/p&gt;</content>
  </entry>
</feed>"#;

    fn parse(input: &str) -> Result<AtomFeed> {
        AtomParser::new(64).parse_native(input.as_bytes())
    }

    #[test]
    fn test_parse_atom_10_feed() {
        let feed = parse(ATOM_10).unwrap();
        assert_eq!(feed.version, "1.0");
        assert_eq!(feed.title.as_deref(), Some("Example Feed"));
        assert_eq!(feed.subtitle.as_deref(), Some("A <em>subtitle</em>"));
        assert_eq!(feed.language.as_deref(), Some("en"));
        assert_eq!(feed.links.len(), 2);
        assert_eq!(feed.links[0].rel, "alternate");
        assert_eq!(feed.links[1].rel, "self");
        assert_eq!(feed.authors[0].name.as_deref(), Some("John Doe"));
        assert_eq!(feed.generator.as_deref(), Some("Gen"));
        assert_eq!(feed.categories, vec!["tech"]);
    }

    #[test]
    fn test_parse_atom_10_entry() {
        let feed = parse(ATOM_10).unwrap();
        assert_eq!(feed.entries.len(), 1);
        let entry = &feed.entries[0];
        assert_eq!(entry.summary.as_deref(), Some("Some text."));
        let content = entry.content.as_ref().unwrap();
        assert_eq!(content.kind.as_deref(), Some("xhtml"));
        assert_eq!(content.value.as_deref(), Some("<p>Full <b>text</b>.</p>"));
        assert_eq!(entry.published.as_deref(), Some("2003-12-13T08:29:29-04:00"));
        assert_eq!(entry.links[1].rel, "enclosure");
        assert_eq!(entry.links[1].length.as_deref(), Some("1337"));
    }

    #[test]
    fn test_parse_atom_03_maps_to_same_shape() {
        let feed = parse(ATOM_03).unwrap();
        assert_eq!(feed.version, "0.3");
        assert_eq!(
            feed.subtitle.as_deref(),
            Some("A lot of effort went into making this effortless")
        );
        assert_eq!(feed.updated.as_deref(), Some("2003-12-13T18:30:02Z"));
        assert_eq!(feed.rights.as_deref(), Some("Copyright (c) 2003"));
        assert_eq!(feed.authors[0].uri.as_deref(), Some("http://diveintomark.org/"));

        let entry = &feed.entries[0];
        assert_eq!(entry.published.as_deref(), Some("2003-12-13T08:29:29-04:00"));
        assert_eq!(entry.updated.as_deref(), Some("2003-12-13T18:30:02Z"));
        assert_eq!(
            entry.content.as_ref().unwrap().value.as_deref(),
            Some("<p>Escaped</p>")
        );
    }

    #[test]
    fn test_prefixed_atom_elements() {
        let input = r#"<a:feed xmlns:a="http://www.w3.org/2005/Atom">
  <a:title>Prefixed</a:title>
  <a:entry><a:id>1</a:id><a:title>One</a:title></a:entry>
</a:feed>"#;
        let feed = parse(input).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Prefixed"));
        assert_eq!(feed.entries[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn test_out_of_line_content() {
        let input = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><id>x</id><content type="video/mp4" src="http://example.org/v.mp4"/></entry>
</feed>"#;
        let feed = parse(input).unwrap();
        let content = feed.entries[0].content.as_ref().unwrap();
        assert_eq!(content.src.as_deref(), Some("http://example.org/v.mp4"));
        assert_eq!(content.value, None);
    }

    #[test]
    fn test_rejects_rss_document() {
        let err = parse("<rss version=\"2.0\"><channel/></rss>").unwrap_err();
        assert!(matches!(err, UnifeedError::Malformed { dialect: FeedType::Atom, .. }));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        let err = parse("<feed><entry><title>x</entry></feed>").unwrap_err();
        assert!(matches!(err, UnifeedError::Malformed { dialect: FeedType::Atom, .. }));
    }
}
