//! Error types for XML documents.

use thiserror::Error;

/// Errors that can occur while reading, querying or modifying a document.
#[derive(Debug, Error)]
pub enum XmlError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document text is not well-formed XML.
    #[error("malformed XML: {0}")]
    Parse(String),

    /// The XPath expression could not be parsed.
    #[error("invalid XPath '{expr}': {reason}")]
    XPath {
        /// The offending expression.
        expr: String,
        /// What went wrong.
        reason: String,
    },

    /// A directive could not be applied to the document.
    #[error("directive #{index} ({directive}) failed: {reason}")]
    Directive {
        /// Position of the directive in its list.
        index: usize,
        /// Short rendering of the directive.
        directive: String,
        /// What went wrong.
        reason: String,
    },
}

impl XmlError {
    pub(crate) fn xpath(expr: &str, reason: impl Into<String>) -> Self {
        Self::XPath {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for document operations.
pub type Result<T> = std::result::Result<T, XmlError>;
