//! Error types for the PMO crate.

use farm_xml::XmlError;
use thiserror::Error;

/// Errors that can occur in people registry operations.
#[derive(Debug, Error)]
pub enum PmoError {
    /// A business rule rejected the request. The message is meant for the user.
    #[error("{0}")]
    Soft(String),

    /// The caller broke a precondition, e.g. operated on a nonexistent person.
    #[error("contract violation: {0}")]
    Contract(String),

    /// The person has no link with the requested rel.
    #[error("no such link '{rel}' for '{uid}'")]
    NoLink {
        /// Person id.
        uid: String,
        /// Link relation, e.g. "github".
        rel: String,
    },

    /// The person has more than one link with the requested rel.
    #[error("too many links '{rel}' for '{uid}'")]
    TooManyLinks {
        /// Person id.
        uid: String,
        /// Link relation, e.g. "github".
        rel: String,
    },

    /// A currency amount could not be parsed.
    #[error("invalid cash amount: {0}")]
    InvalidCash(String),

    /// The policy could not be loaded.
    #[error("policy error: {0}")]
    Policy(#[from] config::ConfigError),

    /// The policy was loaded but its bounds are inconsistent.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// The underlying document failed.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

impl PmoError {
    /// Creates a user-facing soft error.
    pub fn soft(message: impl Into<String>) -> Self {
        Self::Soft(message.into())
    }

    /// Creates a contract violation.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract(message.into())
    }

    /// Is this a user-facing rejection rather than a fault?
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Soft(_))
    }
}

/// Result type for PMO operations.
pub type Result<T> = std::result::Result<T, PmoError>;
