//! @ai:module:intent Owned XML tree that round-trips PMD ruleset files
//! @ai:module:layer infrastructure
//! @ai:module:public_api Document, Element, Node, Attribute, with_original_declaration
//! @ai:module:stateless true
//!
//! Text and attribute values are stored in their escaped source form so that a
//! parse/serialize cycle leaves untouched content byte-for-byte identical.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::borrow::Cow;

static XML_DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<\?xml[^>]*\?>").unwrap());

/// @ai:intent A node in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Raw (escaped) character data
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// @ai:intent An attribute with its value kept in escaped form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub raw_value: String,
}

/// @ai:intent An XML element and its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
}

/// @ai:intent A parsed XML document without its declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Element {
    /// @ai:intent Create an empty element
    /// @ai:effects pure
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// @ai:intent Element name without namespace prefix
    /// @ai:effects pure
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// @ai:intent Look up an attribute value, unescaped
    /// @ai:effects pure
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| unescape_lossy(&a.raw_value).into_owned())
    }

    /// @ai:intent Iterate over direct element children
    /// @ai:effects pure
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// @ai:intent First direct child element with the given local name
    /// @ai:effects pure
    pub fn find_child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.local_name() == local)
    }

    /// @ai:intent All descendant elements with the given local name, in document order
    /// @ai:effects pure
    pub fn descendants(&self, local: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_descendants(&self.children, local, &mut found);
        found
    }

    /// @ai:intent Concatenated unescaped text of all descendants
    /// @ai:effects pure
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        append_text(&self.children, &mut text);
        text
    }

    /// @ai:intent Replace all children with a single text node
    /// @ai:effects mutation
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(partial_escape(text).into_owned())];
        self.self_closing = false;
    }

    /// @ai:intent Apply a function to every descendant element with the given local name
    /// @ai:effects mutation
    pub fn visit_mut<F: FnMut(&mut Element)>(&mut self, local: &str, f: &mut F) {
        for node in &mut self.children {
            if let Node::Element(child) = node {
                if child.local_name() == local {
                    f(child);
                }
                child.visit_mut(local, f);
            }
        }
    }

    /// @ai:intent Serialize this element and its subtree
    /// @ai:effects pure
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

impl Document {
    /// @ai:intent Parse XML text into a document tree
    /// @ai:pre content is well-formed XML
    /// @ai:effects pure
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut document = Document::default();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| Error::XmlParse {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

            let node = match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start, &reader)?);
                    continue;
                }
                Event::Empty(start) => {
                    let mut element = element_from_start(&start, &reader)?;
                    element.self_closing = true;
                    Node::Element(element)
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    match stack.pop() {
                        Some(element) if element.name == name => Node::Element(element),
                        Some(element) => {
                            return Err(Error::XmlParse {
                                position: reader.buffer_position(),
                                message: format!(
                                    "expected </{}>, found </{}>",
                                    element.name, name
                                ),
                            })
                        }
                        None => {
                            return Err(Error::XmlParse {
                                position: reader.buffer_position(),
                                message: format!("unexpected closing tag </{}>", name),
                            })
                        }
                    }
                }
                Event::Text(text) => Node::Text(bytes_to_string(text.into_inner())),
                Event::CData(cdata) => Node::CData(bytes_to_string(cdata.into_inner())),
                Event::Comment(comment) => Node::Comment(bytes_to_string(comment.into_inner())),
                Event::PI(pi) => Node::ProcessingInstruction(bytes_to_string(pi.into_inner())),
                Event::DocType(doctype) => Node::DocType(bytes_to_string(doctype.into_inner())),
                Event::Decl(_) => continue,
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => document.nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::XmlParse {
                position: content.len(),
                message: format!("unclosed element <{}>", open.name),
            });
        }

        if document.root().is_none() {
            return Err(Error::XmlParse {
                position: content.len(),
                message: "document has no root element".to_string(),
            });
        }

        Ok(document)
    }

    /// @ai:intent The document element
    /// @ai:effects pure
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// @ai:intent All elements with the given local name, including the root
    /// @ai:effects pure
    pub fn elements(&self, local: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_descendants(&self.nodes, local, &mut found);
        found
    }

    /// @ai:intent Apply a function to every element with the given local name
    /// @ai:effects mutation
    pub fn visit_mut<F: FnMut(&mut Element)>(&mut self, local: &str, mut f: F) {
        for node in &mut self.nodes {
            if let Node::Element(element) = node {
                if element.local_name() == local {
                    f(element);
                }
                element.visit_mut(local, &mut f);
            }
        }
    }

    /// @ai:intent Serialize the document body (no XML declaration)
    /// @ai:effects pure
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }
}

/// @ai:intent Prefix serialized output with the declaration of the original source
/// @ai:effects pure
pub fn with_original_declaration(original: &str, serialized: &str) -> String {
    match XML_DECLARATION.find(original) {
        Some(decl) => {
            let body = XML_DECLARATION.replace(serialized, "");
            format!("{}\n{}", decl.as_str(), body.trim_start())
        }
        None => serialized.to_string(),
    }
}

/// @ai:intent Remove any XML declarations from a fragment
/// @ai:effects pure
pub fn strip_declarations(xml: &str) -> String {
    static ANY_DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\?xml[^>]*\?>").unwrap());
    ANY_DECLARATION.replace_all(xml, "").into_owned()
}

fn element_from_start(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::XmlParse {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        element.attributes.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            raw_value: String::from_utf8_lossy(attr.value.as_ref()).into_owned(),
        });
    }

    Ok(element)
}

fn bytes_to_string(bytes: Cow<'_, [u8]>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn unescape_lossy(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

fn collect_descendants<'a>(nodes: &'a [Node], local: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.local_name() == local {
                found.push(element);
            }
            collect_descendants(&element.children, local, found);
        }
    }
}

fn append_text(nodes: &[Node], text: &mut String) {
    for node in nodes {
        match node {
            Node::Text(raw) => text.push_str(&unescape_lossy(raw)),
            Node::CData(data) => text.push_str(data),
            Node::Element(element) => append_text(&element.children, text),
            _ => {}
        }
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(raw) => out.push_str(raw),
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(pi) => {
            out.push_str("<?");
            out.push_str(pi);
            out.push_str("?>");
        }
        Node::DocType(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype);
            out.push('>');
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attributes {
        let quote = if attr.raw_value.contains('"') { '\'' } else { '"' };
        out.push(' ');
        out.push_str(&attr.name);
        out.push('=');
        out.push(quote);
        out.push_str(&attr.raw_value);
        out.push(quote);
    }

    if element.children.is_empty() && element.self_closing {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
