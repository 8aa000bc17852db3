//! Format sniffing.
//!
//! Classifies raw bytes as one of the [`FeedType`] dialects by looking at a
//! bounded prefix only. The input is borrowed, so the same buffer can be handed
//! to a parser afterwards. Detection never fails: anything unrecognized,
//! including empty input, is [`FeedType::Unknown`].

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::FeedType;

/// Default number of leading bytes inspected by [`detect_feed_type`].
pub const DEFAULT_SNIFF_LIMIT: usize = 4096;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the feed dialect of `input`, inspecting at most
/// [`DEFAULT_SNIFF_LIMIT`] bytes.
pub fn detect_feed_type(input: &[u8]) -> FeedType {
    detect_feed_type_with_limit(input, DEFAULT_SNIFF_LIMIT)
}

/// Detect the feed dialect of `input`, inspecting at most `limit` bytes.
pub fn detect_feed_type_with_limit(input: &[u8], limit: usize) -> FeedType {
    let window = skip_preamble(&input[..input.len().min(limit)]);

    let feed_type = match window.first() {
        Some(b'{') | Some(b'[') => FeedType::Json,
        Some(b'<') => sniff_xml_root(window),
        _ => FeedType::Unknown,
    };

    tracing::debug!(%feed_type, "Detected feed type");
    feed_type
}

/// Strip a UTF-8 byte-order mark and leading whitespace.
pub(crate) fn skip_preamble(input: &[u8]) -> &[u8] {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(input.len());
    &input[start..]
}

fn sniff_xml_root(window: &[u8]) -> FeedType {
    let mut reader = Reader::from_reader(window);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return classify_root(e.local_name().as_ref());
            }
            Ok(Event::Eof) | Err(_) => {
                return truncated_root_name(window).map_or(FeedType::Unknown, classify_root);
            }
            Ok(_) => {}
        }
        buf.clear();
    }
}

/// Name of the first element when the window ends inside its start tag.
///
/// Declarations, comments and doctypes before it must be complete; a window
/// that ends inside one of them has no root to name.
fn truncated_root_name(window: &[u8]) -> Option<&[u8]> {
    let mut rest = window;
    loop {
        rest = &rest[rest.iter().position(|&b| b == b'<')?..];

        let terminator: &[u8] = if rest.starts_with(b"<?") {
            b"?>"
        } else if rest.starts_with(b"<!--") {
            b"-->"
        } else if rest.starts_with(b"<!") {
            b">"
        } else {
            let name = &rest[1..];
            let end = name
                .iter()
                .position(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
                .unwrap_or(name.len());
            let name = &name[..end];
            return match name.iter().rposition(|&b| b == b':') {
                Some(colon) => Some(&name[colon + 1..]),
                None => Some(name).filter(|n| !n.is_empty()),
            };
        };

        let end = rest
            .windows(terminator.len())
            .position(|w| w == terminator)?;
        rest = &rest[end + terminator.len()..];
    }
}

fn classify_root(local_name: &[u8]) -> FeedType {
    match local_name.to_ascii_lowercase().as_slice() {
        b"rss" | b"rdf" | b"channel" => FeedType::Rss,
        b"feed" => FeedType::Atom,
        _ => FeedType::Unknown,
    }
}
