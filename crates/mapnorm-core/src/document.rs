//! Owned document tree for floor-plan markup.
//!
//! The tree does not depend on any markup parser: the `mapnorm`
//! crate reads and writes it with quick-xml, while everything in this crate
//! only walks and mutates it.
//!
//! # Overview
//!
//! - [`Document`] - Prolog, a single root [`Element`], and epilog.
//! - [`Node`] - An element or one of the verbatim non-element node kinds.
//! - [`Element`] - Name, ordered attributes and children.
//! - [`ElementKind`] - Classification of the element names the core cares about.
//! - [`ElementPath`] - Child-index path used as a flat element index.
//!
//! Text-like nodes hold their *raw* markup (entities still escaped), so they
//! round-trip unchanged. Attribute values are raw as well.

use std::fmt;

use indexmap::IndexMap;

/// Element names the normalization passes distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// The `svg` viewport element.
    Svg,
    /// A `rect` element.
    Rect,
    /// A `line` element.
    Line,
    /// A `polyline` element.
    Polyline,
    /// A `polygon` element.
    Polygon,
    /// A `g` group.
    Group,
    /// A `defs` block holding presentation-only definitions.
    Defs,
    /// Any other element.
    Other,
}

impl ElementKind {
    /// Classifies an element name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "svg" => Self::Svg,
            "rect" => Self::Rect,
            "line" => Self::Line,
            "polyline" => Self::Polyline,
            "polygon" => Self::Polygon,
            "g" => Self::Group,
            "defs" => Self::Defs,
            _ => Self::Other,
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, raw (still escaped).
    Text(String),
    /// Comment body without the `<!--` / `-->` delimiters.
    Comment(String),
    /// CDATA body without the `<![CDATA[` / `]]>` delimiters.
    CData(String),
    /// XML declaration content, e.g. `xml version="1.0"`.
    Declaration(String),
    /// Processing instruction content without `<?` / `?>`.
    Instruction(String),
    /// Doctype content without `<!DOCTYPE` / `>`.
    DocType(String),
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the element mutably if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// An element with ordered attributes and children.
///
/// # Examples
///
/// ```
/// # use mapnorm_core::document::{Element, ElementKind};
/// let rect = Element::new("rect")
///     .with_attribute("x", "10")
///     .with_attribute("id", "area");
///
/// assert_eq!(rect.kind(), ElementKind::Rect);
/// assert_eq!(rect.attribute("x"), Some("10"));
/// assert!(rect.has_attribute_value("id", "area"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute (builder style).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Appends a child node (builder style).
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Returns the element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the classified element kind.
    pub fn kind(&self) -> ElementKind {
        ElementKind::from_name(&self.name)
    }

    /// Returns the raw value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Checks whether an attribute is present with exactly `value`.
    pub fn has_attribute_value(&self, name: &str, value: &str) -> bool {
        self.attribute(name) == Some(value)
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Removes an attribute, keeping the order of the remaining ones.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Iterates over attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns all child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns all child nodes mutably.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Iterates over child elements, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns the first child element.
    pub fn first_child_element(&self) -> Option<&Element> {
        self.child_elements().next()
    }

    /// Appends a child node.
    pub fn push_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Inserts elements at the front of the children, in the given order.
    pub fn prepend_elements(&mut self, elements: Vec<Element>) {
        let tail = std::mem::take(&mut self.children);
        self.children = elements.into_iter().map(Node::Element).collect();
        self.children.extend(tail);
    }

    /// Moves child elements matching `predicate` in front of all other
    /// children, keeping the relative order inside both groups.
    ///
    /// Returns the number of matching children. Applying the same predicate
    /// twice leaves the order unchanged.
    pub fn hoist_children<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let (hoisted, rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.children)
            .into_iter()
            .partition(|node| node.as_element().is_some_and(&mut predicate));
        let count = hoisted.len();
        self.children = hoisted;
        self.children.extend(rest);
        count
    }

    /// Recursively removes descendant elements matching `predicate`.
    ///
    /// Matching elements are removed together with their subtree and are
    /// not descended into. Returns the number of removed elements.
    pub fn remove_descendants<F>(&mut self, predicate: &mut F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let before = self.children.len();
        self.children
            .retain(|node| !node.as_element().is_some_and(|element| predicate(element)));
        let mut removed = before - self.children.len();

        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            removed += child.remove_descendants(predicate);
        }
        removed
    }

    /// Visits this element and all descendant elements in pre-order.
    pub fn walk_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Element),
    {
        visit(self);
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            child.walk_mut(visit);
        }
    }

    fn collect_paths<F>(&self, path: &mut Vec<usize>, predicate: &mut F, out: &mut Vec<ElementPath>)
    where
        F: FnMut(&Element) -> bool,
    {
        if predicate(self) {
            out.push(ElementPath(path.clone()));
        }
        for (index, node) in self.children.iter().enumerate() {
            if let Node::Element(child) = node {
                path.push(index);
                child.collect_paths(path, predicate, out);
                path.pop();
            }
        }
    }
}

/// Child-index path from the root element to a descendant.
///
/// The empty path addresses the root itself. Paths are only valid until the
/// tree is restructured; passes that move elements select first, then detach
/// in reverse document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    /// The path of the root element.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Creates a path from child indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Returns the child indices of this path.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ElementPath> {
        let (_, parent) = self.0.split_last()?;
        Some(ElementPath(parent.to_vec()))
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// A parsed markup document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    /// Creates a document around a root element.
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Creates a document with the nodes found before and after the root.
    pub fn with_prolog_and_epilog(prolog: Vec<Node>, root: Element, epilog: Vec<Node>) -> Self {
        Self {
            prolog,
            root,
            epilog,
        }
    }

    /// Nodes before the root element (declaration, comments, doctype).
    pub fn prolog(&self) -> &[Node] {
        &self.prolog
    }

    /// Nodes after the root element.
    pub fn epilog(&self) -> &[Node] {
        &self.epilog
    }

    /// Returns the root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the root element mutably.
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Builds a flat index of all elements matching `predicate`, in
    /// document pre-order (the root comes first if it matches).
    pub fn select<F>(&self, mut predicate: F) -> Vec<ElementPath>
    where
        F: FnMut(&Element) -> bool,
    {
        let mut out = Vec::new();
        self.root
            .collect_paths(&mut Vec::new(), &mut predicate, &mut out);
        out
    }

    /// Returns the first element in document order matching `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<&Element>
    where
        F: FnMut(&Element) -> bool,
    {
        let path = self.select(predicate).into_iter().next()?;
        self.get(&path)
    }

    /// Resolves a path to an element.
    pub fn get(&self, path: &ElementPath) -> Option<&Element> {
        path.indices().iter().try_fold(&self.root, |element, &index| {
            element.children.get(index).and_then(Node::as_element)
        })
    }

    /// Resolves a path to an element, mutably.
    pub fn get_mut(&mut self, path: &ElementPath) -> Option<&mut Element> {
        path.indices()
            .iter()
            .try_fold(&mut self.root, |element, &index| {
                element.children.get_mut(index).and_then(Node::as_element_mut)
            })
    }

    /// Removes the element at `path` from its parent and returns it.
    ///
    /// The root cannot be detached.
    pub fn detach(&mut self, path: &ElementPath) -> Option<Element> {
        let (&index, _) = path.indices().split_last()?;
        let parent = self.get_mut(&path.parent()?)?;
        if !matches!(parent.children.get(index), Some(Node::Element(_))) {
            return None;
        }
        match parent.children.remove(index) {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Removes every element (below the root) matching `predicate`.
    pub fn remove_elements<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        self.root.remove_descendants(&mut predicate)
    }

    /// Visits every element in document pre-order.
    pub fn walk_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut Element),
    {
        self.root.walk_mut(&mut visit);
    }

    /// Returns the `svg` viewport element: the root when it is one,
    /// otherwise the first `svg` element in document order.
    pub fn viewport_path(&self) -> Option<ElementPath> {
        self.select(|element| element.kind() == ElementKind::Svg)
            .into_iter()
            .next()
    }
}
