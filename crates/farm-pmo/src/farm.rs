//! On-disk layout of a farm: one directory per project, one XML file per item.

use crate::policy::Policy;
use farm_xml::FileItem;
use std::fs;
use std::path::{Path, PathBuf};

/// Id of the project that holds farm-wide documents such as `people.xml`.
pub const PMO: &str = "PMO";

/// A farm rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Farm {
    root: PathBuf,
    policy: Policy,
}

impl Farm {
    /// Creates a farm stored under `root`.
    pub fn new(root: impl Into<PathBuf>, policy: Policy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Policy every project of this farm follows.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The management project.
    pub fn pmo(&self) -> Project {
        self.project(PMO)
    }

    /// A project by id, whether or not anything was stored for it yet.
    pub fn project(&self, pid: &str) -> Project {
        Project {
            pid: pid.to_string(),
            dir: self.root.join(pid),
        }
    }

    /// A project by id, if its directory exists.
    pub fn find(&self, pid: &str) -> Option<Project> {
        let project = self.project(pid);
        project.dir.is_dir().then_some(project)
    }

    /// Ids of all projects with a directory, sorted.
    pub fn projects(&self) -> std::io::Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut pids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                pids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        pids.sort();
        Ok(pids)
    }
}

/// A project of the farm.
#[derive(Debug, Clone)]
pub struct Project {
    pid: String,
    dir: PathBuf,
}

impl Project {
    /// Project id.
    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// Directory holding the project's documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Accessor for one of the project's documents, e.g. `people.xml`.
    pub fn acq(&self, file: &str) -> FileItem {
        FileItem::from_path(self.dir.join(file))
    }
}
