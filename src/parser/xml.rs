//! A small owned XML element tree shared by the RSS and Atom parsers.
//!
//! Built with `quick-xml` in a single pass. Namespace prefixes are resolved to
//! URIs, entity references and CDATA sections are decoded into plain text, and
//! the nesting depth is bounded. Nothing in the tree borrows from the input.

use html_escape::{decode_html_entities, encode_double_quoted_attribute, encode_text};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::detector::skip_preamble;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A well-known extension namespace together with the prefix feeds
/// conventionally bind it to. The prefix is used when a document forgets to
/// declare the namespace.
#[derive(Debug, Clone, Copy)]
pub struct Namespace {
    pub uri: &'static str,
    pub prefix: &'static str,
}

pub const CONTENT: Namespace = Namespace {
    uri: "http://purl.org/rss/1.0/modules/content/",
    prefix: "content",
};
pub const DUBLIN_CORE: Namespace = Namespace {
    uri: "http://purl.org/dc/elements/1.1/",
    prefix: "dc",
};
pub const ITUNES: Namespace = Namespace {
    uri: "http://www.itunes.com/dtds/podcast-1.0.dtd",
    prefix: "itunes",
};
pub const ATOM: Namespace = Namespace {
    uri: "http://www.w3.org/2005/Atom",
    prefix: "atom",
};

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("unexpected end of document, <{0}> is not closed")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("element nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("unexpected element <{0}> after the root element")]
    TrailingElement(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written, e.g. `rdf:about`.
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
    pub nodes: Vec<Node>,
}

impl Element {
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First unprefixed child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children()
            .find(|e| e.prefix.is_none() && e.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(Element::text_opt)
    }

    /// Children with the given local name in namespace `namespace`
    /// (`None` matches elements in no namespace).
    pub fn children_in<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.children()
            .filter(move |e| e.name == name && e.namespace.as_deref() == namespace)
    }

    pub fn child_in(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.children()
            .find(|e| e.name == name && e.namespace.as_deref() == namespace)
    }

    pub fn is_ext(&self, ns: &Namespace, name: &str) -> bool {
        if self.name != name {
            return false;
        }
        match &self.namespace {
            Some(uri) => uri == ns.uri,
            None => self.prefix.as_deref() == Some(ns.prefix),
        }
    }

    pub fn ext_children<'a>(
        &'a self,
        ns: &'a Namespace,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.children().filter(move |e| e.is_ext(ns, name))
    }

    pub fn ext_child(&self, ns: &Namespace, name: &str) -> Option<&Element> {
        self.children().find(|e| e.is_ext(ns, name))
    }

    pub fn ext_text(&self, ns: &Namespace, name: &str) -> Option<String> {
        self.ext_child(ns, name).and_then(Element::text_opt)
    }

    /// Attribute value by qualified name, falling back to the local part.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|a| a.name.rsplit(':').next() == Some(name))
            })
            .map(|a| a.value.as_str())
    }

    /// Direct text content, trimmed.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes {
            if let Node::Text(t) = node {
                text.push_str(t);
            }
        }
        text.trim().to_string()
    }

    pub fn text_opt(&self) -> Option<String> {
        Some(self.text()).filter(|t| !t.is_empty())
    }

    /// Serialized markup of this element's children.
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out.trim().to_string()
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&encode_text(text)),
        Node::Element(element) => {
            let name = element.qualified_name();
            out.push('<');
            out.push_str(&name);
            for attr in &element.attributes {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&encode_double_quoted_attribute(&attr.value));
                out.push('"');
            }
            if element.nodes.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &element.nodes {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
    }
}

type Scope = Vec<(Option<String>, String)>;

/// Parse `input` into its root element.
pub fn parse_document(input: &[u8], max_depth: usize) -> Result<Element, XmlError> {
    let mut reader = Reader::from_reader(skip_preamble(input));
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XmlError::Syntax {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;

        match event {
            Event::Start(e) | Event::Empty(e) if root.is_some() => {
                return Err(XmlError::TrailingElement(lossy(e.name().as_ref())));
            }
            Event::Start(e) => {
                if stack.len() >= max_depth {
                    return Err(XmlError::TooDeep(max_depth));
                }
                let (element, scope) = open_element(&e, &scopes);
                scopes.push(scope);
                stack.push(element);
            }
            Event::Empty(e) => {
                if stack.len() >= max_depth {
                    return Err(XmlError::TooDeep(max_depth));
                }
                let (element, _) = open_element(&e, &scopes);
                attach(element, &mut stack, &mut root);
            }
            Event::End(e) => {
                scopes.pop();
                let element = stack.pop().ok_or_else(|| XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    message: format!("unmatched end tag </{}>", lossy(e.name().as_ref())),
                })?;
                attach(element, &mut stack, &mut root);
            }
            Event::Text(t) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&t);
                    parent
                        .nodes
                        .push(Node::Text(decode_html_entities(&raw).into_owned()));
                }
            }
            Event::CData(c) => {
                if let Some(parent) = stack.last_mut() {
                    parent.nodes.push(Node::Text(lossy(&c)));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unclosed(open.qualified_name()));
    }
    root.ok_or(XmlError::NoRoot)
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn open_element(start: &BytesStart<'_>, scopes: &[Scope]) -> (Element, Scope) {
    let mut scope = Scope::new();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed XML attribute");
                continue;
            }
        };
        let name = lossy(attr.key.as_ref());
        let value = decode_html_entities(&String::from_utf8_lossy(&attr.value)).into_owned();

        if name == "xmlns" {
            scope.push((None, value.clone()));
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            scope.push((Some(prefix.to_string()), value.clone()));
        }
        attributes.push(Attribute { name, value });
    }

    let qname = start.name();
    let name = lossy(qname.local_name().as_ref());
    let prefix = qname.prefix().map(|p| lossy(p.as_ref()));
    let namespace = resolve(prefix.as_deref(), &scope, scopes);

    let element = Element {
        name,
        prefix,
        namespace,
        attributes,
        nodes: Vec::new(),
    };
    (element, scope)
}

fn resolve(prefix: Option<&str>, own: &Scope, scopes: &[Scope]) -> Option<String> {
    if prefix == Some("xml") {
        return Some(XML_NAMESPACE.to_string());
    }
    std::iter::once(own)
        .chain(scopes.iter().rev())
        .flat_map(|scope| scope.iter().rev())
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
