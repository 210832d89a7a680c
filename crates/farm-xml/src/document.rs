//! In-memory XML document tree.
//!
//! Nodes live in an arena owned by the [`Document`] and are addressed by
//! [`NodeId`]. Removing a node detaches it from its parent; detached nodes
//! are unreachable from the document node and are never serialized.

use crate::{Result, XmlError};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// Deepest element nesting a document may have.
pub const MAX_DEPTH: usize = 256;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Pi {
        target: String,
        data: String,
    },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A node an XPath query can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// A document, element, text, comment or processing-instruction node.
    Tree(NodeId),
    /// The attribute at the given index of an element.
    Attr(NodeId, usize),
}

/// An XML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with no root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Creates a document holding a single empty root element.
    pub fn with_root(name: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        doc.nodes[root.0].children.push(NodeId(1));
        doc.nodes.push(NodeData {
            kind: NodeKind::Element {
                name: name.to_string(),
                attrs: Vec::new(),
            },
            parent: Some(root),
            children: Vec::new(),
        });
        doc
    }

    /// Parses a document from its textual form.
    ///
    /// Whitespace-only text between nodes is dropped; spaces that are the
    /// only content of an element are kept, line breaks are indentation.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut doc = Self::new();
        let mut stack = vec![doc.root()];
        let mut blank: Option<(NodeId, String)> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::Parse(format!("at {}: {e}", reader.buffer_position())))?;
            let parent = *stack.last().unwrap_or(&NodeId(0));
            let pending = blank.take();
            match event {
                Event::Start(start) => {
                    let (name, attrs) = Self::read_start(&start)?;
                    let id = doc.append_element(parent, &name)?;
                    doc.set_attrs(id, attrs);
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let (name, attrs) = Self::read_start(&start)?;
                    let id = doc.append_element(parent, &name)?;
                    doc.set_attrs(id, attrs);
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        return Err(XmlError::Parse("unexpected closing tag".into()));
                    }
                    if let Some((owner, text)) = pending {
                        if owner == parent && doc.children(parent).is_empty() {
                            doc.append_text(parent, &text)?;
                        }
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| XmlError::Parse(e.to_string()))?;
                    if !text.trim().is_empty() {
                        if parent == doc.root() {
                            return Err(XmlError::Parse("text outside of root element".into()));
                        }
                        doc.append_text(parent, &text)?;
                    } else if parent != doc.root() && !text.contains('\n') {
                        blank = Some((parent, text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let raw = data.into_inner();
                    doc.append_text(parent, &String::from_utf8_lossy(&raw))?;
                }
                Event::Comment(comment) => {
                    let raw = comment.into_inner();
                    doc.append_comment(parent, &String::from_utf8_lossy(&raw))?;
                }
                Event::PI(pi) => {
                    let target = String::from_utf8_lossy(pi.target()).into_owned();
                    let data = String::from_utf8_lossy(pi.content()).trim().to_string();
                    doc.append_pi(parent, &target, &data)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(XmlError::Parse("unclosed element at end of input".into()));
        }
        if doc.root_element().is_none() {
            return Err(XmlError::Parse("document has no root element".into()));
        }
        Ok(doc)
    }

    fn read_start(start: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>)> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Parse(e.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok((name, attrs))
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The single top-level element, if any.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    pub(crate) fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Is this node an element?
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    /// Is this node a text node?
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Element name, `None` for other node kinds.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attributes of an element in document order.
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Value of a named attribute.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Children in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent node, `None` for the document node and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All descendants of a node in document order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::Pi { data, .. } => data.clone(),
            _ => self
                .descendants(id)
                .into_iter()
                .filter_map(|n| match self.kind(n) {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// XPath string-value of a selected node.
    pub fn string_value(&self, node: Node) -> String {
        match node {
            Node::Tree(id) => self.text_content(id),
            Node::Attr(id, idx) => self
                .attrs(id)
                .get(idx)
                .map(|(_, value)| value.clone())
                .unwrap_or_default(),
        }
    }

    fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Number of elements from the document node down to `id`.
    fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(node) = current {
            depth += 1;
            current = self.parent(node);
        }
        depth
    }

    /// Appends a new empty element as the last child of `parent`.
    ///
    /// Fails if the element would be nested deeper than [`MAX_DEPTH`].
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        if self.depth(parent) >= MAX_DEPTH {
            return Err(XmlError::Parse(format!(
                "can't add <{name}>, elements are nested deeper than {MAX_DEPTH} levels"
            )));
        }
        match self.kind(parent) {
            NodeKind::Document if self.root_element().is_some() => Err(XmlError::Parse(format!(
                "can't add <{name}>, the document already has a root element"
            ))),
            NodeKind::Document | NodeKind::Element { .. } => Ok(self.push_child(
                parent,
                NodeKind::Element {
                    name: name.to_string(),
                    attrs: Vec::new(),
                },
            )),
            _ => Err(XmlError::Parse(format!(
                "can't add <{name}> under a non-element node"
            ))),
        }
    }

    /// Appends a text node as the last child of an element.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        if !self.is_element(parent) {
            return Err(XmlError::Parse("text can only be added to an element".into()));
        }
        Ok(self.push_child(parent, NodeKind::Text(text.to_string())))
    }

    /// Appends a comment to an element or to the document prolog.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        match self.kind(parent) {
            NodeKind::Document | NodeKind::Element { .. } => {
                Ok(self.push_child(parent, NodeKind::Comment(text.to_string())))
            }
            _ => Err(XmlError::Parse(
                "comment needs an element or the document".into(),
            )),
        }
    }

    /// Appends a processing instruction to an element or to the document prolog.
    pub fn append_pi(&mut self, parent: NodeId, target: &str, data: &str) -> Result<NodeId> {
        match self.kind(parent) {
            NodeKind::Document | NodeKind::Element { .. } => Ok(self.push_child(
                parent,
                NodeKind::Pi {
                    target: target.to_string(),
                    data: data.to_string(),
                },
            )),
            _ => Err(XmlError::Parse(
                "processing instruction needs an element or the document".into(),
            )),
        }
    }

    /// Replaces all children of an element with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        if !self.is_element(id) {
            return Err(XmlError::Parse("only elements can hold text".into()));
        }
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.push_child(id, NodeKind::Text(text.to_string()));
        }
        Ok(())
    }

    /// Sets an attribute, replacing an existing value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => {
                match attrs.iter_mut().find(|(key, _)| key == name) {
                    Some(slot) => slot.1 = value.to_string(),
                    None => attrs.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            _ => Err(XmlError::Parse(format!(
                "attribute '{name}' can only be set on an element"
            ))),
        }
    }

    fn set_attrs(&mut self, id: NodeId, attrs: Vec<(String, String)>) {
        if let NodeKind::Element { attrs: slot, .. } = &mut self.nodes[id.0].kind {
            *slot = attrs;
        }
    }

    /// Detaches a node from its parent. Returns the former parent.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent.take()?;
        self.nodes[parent.0].children.retain(|&child| child != id);
        Some(parent)
    }

    /// Number of nodes held, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A copy of the document without the nodes detached by edits.
    pub fn compacted(&self) -> Self {
        let mut out = Self::new();
        let mut stack = vec![(self.root(), out.root())];
        while let Some((from, to)) = stack.pop() {
            for &child in self.children(from) {
                let id = out.push_child(to, self.kind(child).clone());
                stack.push((child, id));
            }
        }
        out
    }

    fn write_pretty(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self.kind(id) {
            NodeKind::Element { name, .. } => {
                let children = self.children(id);
                let mixed = children.iter().any(|&c| self.is_text(c));
                if children.is_empty() || mixed {
                    write!(f, "{pad}")?;
                    self.write_compact(f, id)?;
                    return writeln!(f);
                }
                write!(f, "{pad}")?;
                self.write_open(f, id)?;
                writeln!(f, ">")?;
                for &child in children {
                    self.write_pretty(f, child, depth + 1)?;
                }
                writeln!(f, "{pad}</{name}>")
            }
            _ => {
                write!(f, "{pad}")?;
                self.write_compact(f, id)?;
                writeln!(f)
            }
        }
    }

    fn write_open(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        if let NodeKind::Element { name, attrs } = self.kind(id) {
            write!(f, "<{name}")?;
            for (key, value) in attrs {
                write!(f, " {key}=\"{}\"", escape(value.as_str()))?;
            }
        }
        Ok(())
    }

    fn write_compact(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        match self.kind(id) {
            NodeKind::Element { name, .. } => {
                self.write_open(f, id)?;
                let children = self.children(id);
                if children.is_empty() {
                    return write!(f, "/>");
                }
                write!(f, ">")?;
                for &child in children {
                    self.write_compact(f, child)?;
                }
                write!(f, "</{name}>")
            }
            NodeKind::Text(text) => write!(f, "{}", escape(text.as_str())),
            NodeKind::Comment(text) => write!(f, "<!--{text}-->"),
            NodeKind::Pi { target, data } if data.is_empty() => write!(f, "<?{target}?>"),
            NodeKind::Pi { target, data } => write!(f, "<?{target} {data}?>"),
            NodeKind::Document => Ok(()),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        for &child in self.children(self.root()) {
            self.write_pretty(f, child, 0)?;
        }
        Ok(())
    }
}
