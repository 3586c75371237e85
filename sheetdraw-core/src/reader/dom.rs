//! Owned element tree built from quick-xml events
//!
//! The renderer queries the document by qualified tag name (`table:table-row`,
//! `style:style`, ...) the same way the files spell them, so namespace prefixes
//! are kept as part of the tag and never resolved.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use thiserror::Error;

/// Deepest element nesting accepted by [`parse`]. Tree walks recurse per
/// level, so deeper input is rejected instead of exhausting the stack.
pub const MAX_DEPTH: usize = 512;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("XML parsing error at position {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

/// A child of an element, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    attributes: HashMap<String, String>,
    nodes: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Child elements in document order; text nodes are skipped
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Children including text nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn first_child_by_tag(&self, tag: &str) -> Option<&Element> {
        self.children().find(|e| e.tag == tag)
    }

    /// First child element, whatever its tag
    pub fn first_child(&self) -> Option<&Element> {
        self.children().next()
    }

    /// All descendants (and self) with the given tag, in document order
    pub fn find_all_by_tag<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_by_tag(tag, &mut found);
        found
    }

    fn collect_by_tag<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in self.children() {
            child.collect_by_tag(tag, found);
        }
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tag == tag || self.children().any(|c| c.contains_tag(tag))
    }

    /// Concatenated text of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn push_child(&mut self, child: Element) {
        self.nodes.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        // Adjacent text and entity events merge into one node
        if let Some(Node::Text(last)) = self.nodes.last_mut() {
            last.push_str(&text);
        } else {
            self.nodes.push(Node::Text(text));
        }
    }
}

/// Parse raw bytes into a tree. Only UTF-8 is accepted.
pub fn parse_bytes(bytes: &[u8]) -> Result<Element, MarkupError> {
    let xml = std::str::from_utf8(bytes)?;
    parse(xml)
}

/// Parse an XML string and return its root element
pub fn parse(xml: &str) -> Result<Element, MarkupError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e))?;
        match event {
            Event::Start(e) => {
                check_depth(&stack)?;
                let element = element_from_start(&reader, &e)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                check_depth(&stack)?;
                let element = element_from_start(&reader, &e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // quick-xml already checks that end names match
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| xml_error(&reader, err))?;
                    parent.push_text(text.as_ref());
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed(open.tag));
    }
    root.ok_or(MarkupError::NoRoot)
}

fn check_depth(stack: &[Element]) -> Result<(), MarkupError> {
    if stack.len() >= MAX_DEPTH {
        return Err(MarkupError::TooDeep(MAX_DEPTH));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn element_from_start(reader: &Reader<&[u8]>, e: &BytesStart) -> Result<Element, MarkupError> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(reader, err))?
            .to_string();
        element.set_attribute(key, value);
    }
    Ok(element)
}

fn xml_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> MarkupError {
    MarkupError::Xml {
        position: reader.buffer_position() as u64,
        message: err.to_string(),
    }
}
