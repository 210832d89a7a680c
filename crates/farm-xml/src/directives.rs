//! Declarative edit programs for [`Document`]s.
//!
//! A [`Directives`] list moves a cursor (a set of nodes) through the
//! document and edits whatever the cursor points at. The cursor starts at
//! the document node. Directives applied to an empty cursor are no-ops,
//! which is how conditional inserts are expressed:
//!
//! ```
//! use farm_xml::{Directives, Document};
//!
//! let mut doc = Document::with_root("people");
//! let dirs = Directives::new()
//!     .xpath("/people[not(person[@id='bob'])]")
//!     .add("person")
//!     .attr("id", "bob")
//!     .xpath("/people/person[@id='bob']")
//!     .strict(1);
//! doc.apply(&dirs).unwrap();
//! doc.apply(&dirs).unwrap();
//! assert_eq!(doc.xpath("count(/people/person)").unwrap(), vec!["1"]);
//! ```

use crate::document::{Document, Node, NodeId};
use crate::xpath::XPath;
use crate::{Result, XmlError};
use std::collections::HashSet;
use std::fmt;

/// One step of an edit program.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Moves the cursor to the nodes matched by an expression.
    XPath(String),
    /// Appends a child element to every cursor node and moves onto them.
    Add(String),
    /// Like [`Directive::Add`], but reuses the first existing child with that name.
    AddIf(String),
    /// Replaces the content of every cursor node with text.
    Set(String),
    /// Sets an attribute on every cursor node.
    Attr(String, String),
    /// Moves the cursor to the parents of its nodes.
    Up,
    /// Removes the cursor nodes and moves onto their parents.
    Remove,
    /// Fails unless the cursor holds exactly this many nodes.
    Strict(usize),
    /// Saves the cursor on a stack.
    Push,
    /// Restores the cursor saved by the matching [`Directive::Push`].
    Pop,
    /// Appends a processing instruction to every cursor node.
    Pi(String, String),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XPath(expr) => write!(f, "XPATH \"{expr}\""),
            Self::Add(name) => write!(f, "ADD \"{name}\""),
            Self::AddIf(name) => write!(f, "ADDIF \"{name}\""),
            Self::Set(text) => write!(f, "SET \"{text}\""),
            Self::Attr(name, value) => write!(f, "ATTR \"{name}\", \"{value}\""),
            Self::Up => f.write_str("UP"),
            Self::Remove => f.write_str("REMOVE"),
            Self::Strict(count) => write!(f, "STRICT \"{count}\""),
            Self::Push => f.write_str("PUSH"),
            Self::Pop => f.write_str("POP"),
            Self::Pi(target, data) => write!(f, "PI \"{target}\" \"{data}\""),
        }
    }
}

/// An ordered list of [`Directive`]s, built fluently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    items: Vec<Directive>,
}

impl Directives {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    fn push_directive(mut self, directive: Directive) -> Self {
        self.items.push(directive);
        self
    }

    /// Moves the cursor to the nodes matched by `expr`.
    pub fn xpath(self, expr: impl Into<String>) -> Self {
        self.push_directive(Directive::XPath(expr.into()))
    }

    /// Adds a child element to each cursor node.
    pub fn add(self, name: impl Into<String>) -> Self {
        self.push_directive(Directive::Add(name.into()))
    }

    /// Adds a child element unless one with that name exists.
    pub fn add_if(self, name: impl Into<String>) -> Self {
        self.push_directive(Directive::AddIf(name.into()))
    }

    /// Sets the text of each cursor node.
    pub fn set(self, text: impl fmt::Display) -> Self {
        self.push_directive(Directive::Set(text.to_string()))
    }

    /// Sets an attribute on each cursor node.
    pub fn attr(self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push_directive(Directive::Attr(name.into(), value.to_string()))
    }

    /// Moves the cursor one level up.
    pub fn up(self) -> Self {
        self.push_directive(Directive::Up)
    }

    /// Removes the cursor nodes.
    pub fn remove(self) -> Self {
        self.push_directive(Directive::Remove)
    }

    /// Requires the cursor to hold exactly `count` nodes.
    pub fn strict(self, count: usize) -> Self {
        self.push_directive(Directive::Strict(count))
    }

    /// Saves the cursor.
    pub fn push(self) -> Self {
        self.push_directive(Directive::Push)
    }

    /// Restores the last saved cursor.
    pub fn pop(self) -> Self {
        self.push_directive(Directive::Pop)
    }

    /// Adds a processing instruction.
    pub fn pi(self, target: impl Into<String>, data: impl Into<String>) -> Self {
        self.push_directive(Directive::Pi(target.into(), data.into()))
    }

    /// Appends all directives of another program.
    pub fn append(mut self, other: impl IntoIterator<Item = Directive>) -> Self {
        self.items.extend(other);
        self
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Is the program empty?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the directives in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.items.iter()
    }
}

impl IntoIterator for Directives {
    type Item = Directive;
    type IntoIter = std::vec::IntoIter<Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Directives {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Directive> for Directives {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Directives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for directive in &self.items {
            writeln!(f, "{directive};")?;
        }
        Ok(())
    }
}

fn dedup(nodes: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    nodes.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl Document {
    /// Applies an edit program to this document.
    ///
    /// The document is edited in place; on error it may be left partially
    /// modified, so callers that persist documents should discard it.
    pub fn apply(&mut self, dirs: &Directives) -> Result<()> {
        let mut cursor = vec![self.root()];
        let mut stack: Vec<Vec<NodeId>> = Vec::new();
        for (index, directive) in dirs.iter().enumerate() {
            let fail = |reason: String| XmlError::Directive {
                index,
                directive: directive.to_string(),
                reason,
            };
            cursor = match directive {
                Directive::XPath(expr) => {
                    let xpath = XPath::compile(expr)?;
                    let contexts = if xpath.is_absolute() {
                        vec![self.root()]
                    } else {
                        cursor.clone()
                    };
                    let mut found = Vec::new();
                    for context in contexts {
                        for node in self.select(Node::Tree(context), &xpath)? {
                            match node {
                                Node::Tree(id) => found.push(id),
                                Node::Attr(..) => {
                                    return Err(fail("cursor can't point at an attribute".into()))
                                }
                            }
                        }
                    }
                    dedup(found)
                }
                Directive::Add(name) => {
                    let mut added = Vec::with_capacity(cursor.len());
                    for &node in &cursor {
                        added.push(self.append_element(node, name).map_err(|e| fail(e.to_string()))?);
                    }
                    added
                }
                Directive::AddIf(name) => {
                    let mut targets = Vec::with_capacity(cursor.len());
                    for &node in &cursor {
                        let existing = self
                            .children(node)
                            .iter()
                            .copied()
                            .find(|&child| self.name(child) == Some(name.as_str()));
                        let target = match existing {
                            Some(child) => child,
                            None => self.append_element(node, name).map_err(|e| fail(e.to_string()))?,
                        };
                        targets.push(target);
                    }
                    targets
                }
                Directive::Set(text) => {
                    for &node in &cursor {
                        self.set_text(node, text).map_err(|e| fail(e.to_string()))?;
                    }
                    cursor
                }
                Directive::Attr(name, value) => {
                    for &node in &cursor {
                        self.set_attr(node, name, value).map_err(|e| fail(e.to_string()))?;
                    }
                    cursor
                }
                Directive::Up => dedup(cursor.iter().filter_map(|&node| self.parent(node))),
                Directive::Remove => {
                    let parents: Vec<NodeId> =
                        cursor.iter().filter_map(|&node| self.detach(node)).collect();
                    dedup(parents)
                }
                Directive::Strict(expected) => {
                    if cursor.len() != *expected {
                        return Err(fail(format!(
                            "expected {expected} node(s) under the cursor, found {}",
                            cursor.len()
                        )));
                    }
                    cursor
                }
                Directive::Push => {
                    stack.push(cursor.clone());
                    cursor
                }
                Directive::Pop => stack
                    .pop()
                    .ok_or_else(|| fail("nothing to pop, the stack is empty".into()))?,
                Directive::Pi(target, data) => {
                    for &node in &cursor {
                        self.append_pi(node, target, data).map_err(|e| fail(e.to_string()))?;
                    }
                    cursor
                }
            };
        }
        Ok(())
    }
}
