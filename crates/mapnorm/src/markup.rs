//! Markup reading and writing.
//!
//! Parsing builds a [`Document`] from SVG text with quick-xml; rendering
//! writes it back. Attribute values, text, comments and other non-element
//! nodes are kept in their raw (still escaped) form, so untouched content
//! survives a round trip unchanged. Elements without children are written
//! in self-closing form.

use std::{borrow::Cow, io, str};

use log::trace;
use quick_xml::{
    Reader, Writer,
    events::{
        BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event,
        attributes::Attribute,
    },
    name::QName,
};
use thiserror::Error;

use mapnorm_core::document::{Document, Element, Node};

/// A markup syntax error with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MarkupError {
    message: String,
    offset: usize,
}

impl MarkupError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the byte offset into the source.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

fn position(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}

fn utf8(bytes: &[u8], offset: usize) -> Result<String, MarkupError> {
    str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| MarkupError::new(format!("invalid UTF-8: {err}"), offset))
}

fn element(start: &BytesStart<'_>, offset: usize) -> Result<Element, MarkupError> {
    let mut element = Element::new(utf8(start.name().as_ref(), offset)?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| MarkupError::new(err.to_string(), offset))?;
        element.set_attribute(
            utf8(attribute.key.as_ref(), offset)?,
            utf8(&attribute.value, offset)?,
        );
    }
    Ok(element)
}

/// Accumulates parsed nodes into the open element or the document level.
#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn push(&mut self, node: Node, offset: usize) -> Result<(), MarkupError> {
        if let Some(parent) = self.open.last_mut() {
            parent.push_child(node);
            return Ok(());
        }

        match node {
            Node::Element(element) if self.root.is_none() => self.root = Some(element),
            Node::Element(element) => {
                return Err(MarkupError::new(
                    format!("unexpected second root element <{}>", element.name()),
                    offset,
                ));
            }
            node if self.root.is_none() => self.prolog.push(node),
            node => self.epilog.push(node),
        }
        Ok(())
    }

    fn close(&mut self, offset: usize) -> Result<(), MarkupError> {
        let element = self
            .open
            .pop()
            .ok_or_else(|| MarkupError::new("closing tag without an open element", offset))?;
        self.push(Node::Element(element), offset)
    }

    fn finish(mut self, offset: usize) -> Result<Document, MarkupError> {
        if let Some(element) = self.open.pop() {
            return Err(MarkupError::new(
                format!("unclosed element <{}>", element.name()),
                offset,
            ));
        }
        let root = self
            .root
            .ok_or_else(|| MarkupError::new("document has no root element", offset))?;
        Ok(Document::with_prolog_and_epilog(self.prolog, root, self.epilog))
    }
}

/// Parses SVG markup into a [`Document`].
///
/// # Errors
///
/// Returns [`MarkupError`] for malformed markup, mismatched or unclosed
/// tags, a missing root element, or more than one root element.
pub fn parse(source: &str) -> Result<Document, MarkupError> {
    let mut reader = Reader::from_str(source);
    let mut builder = TreeBuilder::default();

    loop {
        let offset = position(reader.buffer_position());
        let event = reader
            .read_event()
            .map_err(|err| MarkupError::new(err.to_string(), position(reader.error_position())))?;

        match event {
            Event::Start(start) => builder.open.push(element(&start, offset)?),
            Event::Empty(start) => builder.push(Node::Element(element(&start, offset)?), offset)?,
            Event::End(_) => builder.close(offset)?,
            Event::Text(text) => builder.push(Node::Text(utf8(&text, offset)?), offset)?,
            Event::GeneralRef(reference) => {
                let name = utf8(&reference, offset)?;
                builder.push(Node::Text(format!("&{name};")), offset)?;
            }
            Event::CData(data) => builder.push(Node::CData(utf8(&data, offset)?), offset)?,
            Event::Comment(comment) => {
                builder.push(Node::Comment(utf8(&comment, offset)?), offset)?;
            }
            Event::Decl(decl) => builder.push(Node::Declaration(utf8(&decl, offset)?), offset)?,
            Event::PI(instruction) => {
                builder.push(Node::Instruction(utf8(&instruction, offset)?), offset)?;
            }
            Event::DocType(doctype) => {
                builder.push(Node::DocType(utf8(&doctype, offset)?), offset)?;
            }
            Event::Eof => break,
        }
    }

    let document = builder.finish(source.len())?;
    trace!(root = document.root().name(); "Markup parsed");
    Ok(document)
}

/// Writes `document` back to markup text.
///
/// # Errors
///
/// Writing goes to memory, so errors are not expected in practice; they are
/// reported as [`io::Error`].
pub fn render(document: &Document) -> io::Result<String> {
    let mut writer = Writer::new(Vec::new());
    for node in document.prolog() {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, document.root())?;
    for node in document.epilog() {
        write_node(&mut writer, node)?;
    }
    into_string(writer)
}

/// Writes a single element subtree to markup text.
///
/// # Errors
///
/// See [`render`].
pub fn render_element(element: &Element) -> io::Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element)?;
    into_string(writer)
}

fn into_string(writer: Writer<Vec<u8>>) -> io::Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> io::Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => writer.write_event(Event::Text(BytesText::from_escaped(text.as_str()))),
        Node::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
        }
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str()))),
        Node::Declaration(decl) => {
            // The declaration content starts with its 3-byte `xml` target.
            let start = BytesStart::from_content(decl.as_str(), 3);
            writer.write_event(Event::Decl(BytesDecl::from_start(start)))
        }
        Node::Instruction(instruction) => {
            writer.write_event(Event::PI(BytesPI::new(instruction.as_str())))
        }
        Node::DocType(doctype) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> io::Result<()> {
    let mut start = BytesStart::new(element.name());
    for (name, value) in element.attributes() {
        // Values are stored raw; only a bare `"` would break the quoting.
        let value = if value.contains('"') {
            Cow::Owned(value.replace('"', "&quot;").into_bytes())
        } else {
            Cow::Borrowed(value.as_bytes())
        };
        start.push_attribute(Attribute {
            key: QName(name.as_bytes()),
            value,
        });
    }

    if element.children().is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))
}
