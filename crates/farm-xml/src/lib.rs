//! XML documents for Farm.
//!
//! This crate provides the document store every farm component is built on:
//! - **Documents**: an in-memory XML tree with parsing and serialization
//! - **XPath**: read queries over a document
//! - **Directives**: declarative edit programs applied to a document
//! - **Items**: named documents loaded from and saved to a file or memory
//!
//! # Example
//!
//! ```
//! use farm_xml::{Directives, Item, MemoryItem};
//!
//! let item = MemoryItem::new("people");
//! item.modify(
//!     &Directives::new()
//!         .xpath("/people")
//!         .add("person")
//!         .attr("id", "yegor256")
//!         .add("reputation")
//!         .set(0),
//! )
//! .unwrap();
//!
//! assert_eq!(item.xpath("/people/person/@id").unwrap(), vec!["yegor256"]);
//! ```

mod directives;
mod document;
mod error;
mod item;
pub mod xpath;

pub use directives::{Directive, Directives};
pub use document::{Document, Node, NodeId, MAX_DEPTH};
pub use error::{Result, XmlError};
pub use item::{FileItem, Item, MemoryItem};
pub use xpath::{literal, XPath};
