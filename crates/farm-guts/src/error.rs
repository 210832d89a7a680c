//! Error types for the guts report.

use farm_xml::XmlError;
use thiserror::Error;

/// Errors that can occur while building the report.
#[derive(Debug, Error)]
pub enum GutsError {
    /// The snapshot or a stored document could not be built or read.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// A stored document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for guts operations.
pub type Result<T> = std::result::Result<T, GutsError>;
