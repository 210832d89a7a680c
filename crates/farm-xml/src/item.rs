//! Named documents that can be loaded, queried and rewritten.
//!
//! Defines the interface every document accessor implements, so that
//! callers don't care whether a document lives on disk or in memory.

use crate::{Directives, Document, Result};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

/// A document accessor.
pub trait Item: Send + Sync {
    /// Loads the current document.
    fn load(&self) -> Result<Document>;

    /// Replaces the stored document.
    fn save(&self, doc: &Document) -> Result<()>;

    /// Runs a query against the current document.
    fn xpath(&self, query: &str) -> Result<Vec<String>> {
        self.load()?.xpath(query)
    }

    /// Applies an edit program and stores the result.
    ///
    /// Nothing is stored if any directive fails.
    fn modify(&self, dirs: &Directives) -> Result<()> {
        let mut doc = self.load()?;
        doc.apply(dirs)?;
        self.save(&doc)
    }
}

impl<T: Item + ?Sized> Item for Box<T> {
    fn load(&self) -> Result<Document> {
        (**self).load()
    }

    fn save(&self, doc: &Document) -> Result<()> {
        (**self).save(doc)
    }
}

/// A document stored in a file.
///
/// A missing or empty file reads as a document with an empty root element.
#[derive(Debug, Clone)]
pub struct FileItem {
    path: PathBuf,
    root: String,
}

impl FileItem {
    /// Creates an accessor for `path` whose root element is `root`.
    pub fn new(path: impl Into<PathBuf>, root: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
        }
    }

    /// Creates an accessor whose root element is named after the file stem,
    /// e.g. `people.xml` holds `<people/>`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());
        Self { path, root }
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Item for FileItem {
    fn load(&self) -> Result<Document> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            tracing::debug!(path = %self.path.display(), root = %self.root, "Starting empty document");
            return Ok(Document::with_root(&self.root));
        }
        Document::parse(&text)
    }

    fn save(&self, doc: &Document) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, doc.to_string())?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Document saved");
        Ok(())
    }
}

/// A document held in memory.
#[derive(Debug, Default)]
pub struct MemoryItem {
    doc: RwLock<Document>,
}

impl MemoryItem {
    /// Creates an item holding a document with an empty root element.
    pub fn new(root: &str) -> Self {
        Self::from_document(Document::with_root(root))
    }

    /// Creates an item holding the given document.
    pub fn from_document(doc: Document) -> Self {
        Self {
            doc: RwLock::new(doc),
        }
    }

    /// Serialized form of the current document.
    pub fn to_xml(&self) -> String {
        self.doc.read().to_string()
    }
}

impl Item for MemoryItem {
    fn load(&self) -> Result<Document> {
        Ok(self.doc.read().clone())
    }

    fn save(&self, doc: &Document) -> Result<()> {
        *self.doc.write() = doc.compacted();
        Ok(())
    }
}
