//! A read-only project that serves the runtime report.

use crate::error::Result;
use crate::stats::RuntimeStats;
use farm_pmo::Farm;
use farm_xml::{Directives, Document, MemoryItem};
use std::fs;

/// Project whose documents are runtime snapshots, optionally seeded from a
/// stored document of a real project.
#[derive(Debug, Clone)]
pub struct GutsProject {
    farm: Farm,
    pid: Option<String>,
    extra: Directives,
}

impl GutsProject {
    /// Creates a project that seeds documents from project `pid`, if given,
    /// and applies `extra` on top.
    pub fn new(farm: &Farm, pid: Option<&str>, extra: Directives) -> Self {
        Self {
            farm: farm.clone(),
            pid: pid.map(str::to_string),
            extra,
        }
    }

    /// The report has no project id of its own.
    pub fn pid(&self) -> &str {
        ""
    }

    /// Builds the document named `file` from fresh runtime statistics.
    pub fn acq(&self, file: &str) -> Result<MemoryItem> {
        self.acq_with(file, &RuntimeStats::collect())
    }

    /// Builds the document named `file` from the given statistics.
    ///
    /// A stored, non-empty document of the seeding project wins over the
    /// snapshot. Extra directives that fail to apply are skipped.
    pub fn acq_with(&self, file: &str, stats: &RuntimeStats) -> Result<MemoryItem> {
        let mut start = Document::new();
        start.apply(&stats.directives())?;
        let stored = self.pid.as_deref().and_then(|pid| self.farm.find(pid));
        let before = match stored {
            Some(project) => {
                let path = project.dir().join(file);
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_file() && meta.len() > 0 => {
                        Document::parse(&fs::read_to_string(&path)?)?
                    }
                    _ => start,
                }
            }
            None => start,
        };
        let mut doc = before.clone();
        let doc = match doc.apply(&self.extra) {
            Ok(()) => doc,
            Err(e) => {
                tracing::warn!(file, error = %e, "Extra directives skipped");
                before
            }
        };
        Ok(MemoryItem::from_document(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ThreadInfo, ThreadState};
    use farm_pmo::Policy;
    use farm_xml::Item;

    fn stats() -> RuntimeStats {
        RuntimeStats {
            available_processors: 2,
            free_memory: 10,
            max_memory: 20,
            total_memory: 5,
            virtual_memory: 7,
            pid: None,
            threads: vec![ThreadInfo {
                name: "main".into(),
                state: ThreadState::Runnable,
                daemon: false,
                alive: true,
            }],
        }
    }

    #[test]
    fn test_snapshot_when_no_project() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(dir.path(), Policy::default());
        let guts = GutsProject::new(&farm, None, Directives::new());
        let item = guts.acq_with("guts.xml", &stats()).unwrap();
        assert_eq!(
            item.xpath("/guts/jvm/attrs/attr[@id='maxMemory']/text()").unwrap(),
            vec!["20"]
        );
        assert_eq!(guts.pid(), "");
    }

    #[test]
    fn test_extra_directives_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(dir.path(), Policy::default());
        let extra = Directives::new().xpath("/guts").add("farm").attr("id", "local");
        let guts = GutsProject::new(&farm, Some("absent"), extra);
        let item = guts.acq_with("guts.xml", &stats()).unwrap();
        assert_eq!(item.xpath("/guts/farm/@id").unwrap(), vec!["local"]);
    }

    #[test]
    fn test_failing_extra_directives_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(dir.path(), Policy::default());
        let extra = Directives::new().xpath("/guts").add("broken").strict(5);
        let guts = GutsProject::new(&farm, None, extra);
        let item = guts.acq_with("guts.xml", &stats()).unwrap();
        assert!(item.xpath("/guts/broken").unwrap().is_empty());
        assert_eq!(item.xpath("/guts/jvm/threads/thread/@id").unwrap(), vec!["main"]);
    }

    #[test]
    fn test_stored_document_wins() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(dir.path(), Policy::default());
        let project = dir.path().join("C00000001");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join("guts.xml"), "<guts><stored/></guts>").unwrap();
        std::fs::write(project.join("empty.xml"), "").unwrap();
        let guts = GutsProject::new(&farm, Some("C00000001"), Directives::new());

        let item = guts.acq_with("guts.xml", &stats()).unwrap();
        assert_eq!(item.xpath("count(/guts/stored)").unwrap(), vec!["1"]);
        assert!(item.xpath("/guts/jvm").unwrap().is_empty());

        let item = guts.acq_with("empty.xml", &stats()).unwrap();
        assert_eq!(item.xpath("count(/guts/jvm)").unwrap(), vec!["1"]);
    }
}
