//! Runtime statistics of the current process.

use farm_xml::Directives;
use std::fmt;
use std::fs;
use std::path::Path;
use sysinfo::System;

/// Scheduling state of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Running or ready to run.
    Runnable,
    /// Sleeping until woken up.
    Waiting,
    /// In uninterruptible wait, usually on I/O.
    Blocked,
    /// Stopped by a signal or a tracer.
    Stopped,
    /// Exited but not yet reaped.
    Terminated,
}

impl ThreadState {
    /// Maps the state letter of `/proc/<pid>/task/<tid>/stat`.
    fn from_proc(code: char) -> Self {
        match code {
            'R' => Self::Runnable,
            'D' => Self::Blocked,
            'T' | 't' => Self::Stopped,
            'Z' | 'X' | 'x' => Self::Terminated,
            _ => Self::Waiting,
        }
    }

    /// Is the thread still alive in this state?
    pub fn is_alive(self) -> bool {
        self != Self::Terminated
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Runnable => "RUNNABLE",
            Self::Waiting => "WAITING",
            Self::Blocked => "BLOCKED",
            Self::Stopped => "STOPPED",
            Self::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}

/// One live thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    /// Thread name.
    pub name: String,
    /// Scheduling state.
    pub state: ThreadState,
    /// Background thread; only the main thread is not.
    pub daemon: bool,
    /// Still running.
    pub alive: bool,
}

/// A snapshot of process statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Logical CPUs available to the process.
    pub available_processors: usize,
    /// Memory the system can still hand out, in bytes.
    pub free_memory: u64,
    /// Total memory of the system, in bytes.
    pub max_memory: u64,
    /// Resident memory of the process, in bytes.
    pub total_memory: u64,
    /// Virtual memory of the process, in bytes.
    pub virtual_memory: u64,
    /// Process id, if known.
    pub pid: Option<u32>,
    /// Live threads.
    pub threads: Vec<ThreadInfo>,
}

impl RuntimeStats {
    /// Collects statistics of the current process.
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let pid = sysinfo::get_current_pid().ok();
        let (total_memory, virtual_memory) = match pid {
            Some(pid) if system.refresh_process(pid) => system
                .process(pid)
                .map(|p| (p.memory(), p.virtual_memory()))
                .unwrap_or_default(),
            _ => (0, 0),
        };
        let pid = pid.map(|p| p.as_u32());
        let threads = pid
            .and_then(|pid| read_threads(Path::new("/proc/self/task"), pid))
            .unwrap_or_else(current_thread);
        let stats = Self {
            available_processors: num_cpus::get(),
            free_memory: system.available_memory(),
            max_memory: system.total_memory(),
            total_memory,
            virtual_memory,
            pid,
            threads,
        };
        tracing::debug!(
            pid = ?stats.pid,
            threads = stats.threads.len(),
            rss = stats.total_memory,
            "Runtime stats collected"
        );
        stats
    }

    /// Attributes in report order.
    pub fn attrs(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("availableProcessors", self.available_processors.to_string()),
            ("freeMemory", self.free_memory.to_string()),
            ("maxMemory", self.max_memory.to_string()),
            ("totalMemory", self.total_memory.to_string()),
            ("virtualMemory", self.virtual_memory.to_string()),
            ("totalThreads", self.threads.len().to_string()),
        ];
        if let Some(pid) = self.pid {
            attrs.push(("pid", pid.to_string()));
        }
        attrs
    }

    /// Directives that build the report document from scratch.
    pub fn directives(&self) -> Directives {
        let mut dirs = Directives::new()
            .pi("xml-stylesheet", "href='/xsl/guts.xsl' type='text/xsl'")
            .add("guts")
            .add("jvm")
            .add("attrs");
        for (id, value) in self.attrs() {
            dirs = dirs.add("attr").attr("id", id).set(value).up();
        }
        dirs = dirs.up().add("threads");
        for thread in &self.threads {
            dirs = dirs
                .add("thread")
                .attr("id", &thread.name)
                .attr("state", thread.state)
                .attr("daemon", thread.daemon)
                .attr("alive", thread.alive)
                .up();
        }
        dirs.up().up()
    }
}

/// Reads the threads of the process from a procfs task directory.
fn read_threads(dir: &Path, pid: u32) -> Option<Vec<ThreadInfo>> {
    let entries = fs::read_dir(dir).ok()?;
    let mut threads = Vec::new();
    for entry in entries.flatten() {
        let tid: u32 = match entry.file_name().to_str().and_then(|s| s.parse().ok()) {
            Some(tid) => tid,
            None => continue,
        };
        let path = entry.path();
        // The thread may exit between listing and reading.
        let Ok(stat) = fs::read_to_string(path.join("stat")) else {
            continue;
        };
        let name = fs::read_to_string(path.join("comm"))
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| tid.to_string());
        let state = parse_state(&stat).unwrap_or(ThreadState::Waiting);
        threads.push((
            tid,
            ThreadInfo {
                name,
                state,
                daemon: tid != pid,
                alive: state.is_alive(),
            },
        ));
    }
    if threads.is_empty() {
        return None;
    }
    threads.sort_by_key(|(tid, _)| *tid);
    Some(threads.into_iter().map(|(_, info)| info).collect())
}

/// State letter follows the parenthesized command name, which may itself
/// contain spaces or parentheses.
fn parse_state(stat: &str) -> Option<ThreadState> {
    let (_, rest) = stat.rsplit_once(')')?;
    rest.trim_start().chars().next().map(ThreadState::from_proc)
}

fn current_thread() -> Vec<ThreadInfo> {
    vec![ThreadInfo {
        name: std::thread::current().name().unwrap_or("main").to_string(),
        state: ThreadState::Runnable,
        daemon: false,
        alive: true,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_xml::Document;

    fn sample() -> RuntimeStats {
        RuntimeStats {
            available_processors: 4,
            free_memory: 1024,
            max_memory: 4096,
            total_memory: 512,
            virtual_memory: 2048,
            pid: Some(42),
            threads: vec![
                ThreadInfo {
                    name: "main".into(),
                    state: ThreadState::Runnable,
                    daemon: false,
                    alive: true,
                },
                ThreadInfo {
                    name: "worker".into(),
                    state: ThreadState::Waiting,
                    daemon: true,
                    alive: true,
                },
            ],
        }
    }

    #[test]
    fn test_directives_build_report() {
        let mut doc = Document::new();
        doc.apply(&sample().directives()).unwrap();
        assert_eq!(
            doc.xpath("/guts/jvm/attrs/attr[@id='availableProcessors']/text()")
                .unwrap(),
            vec!["4"]
        );
        assert_eq!(
            doc.xpath("/guts/jvm/attrs/attr[@id='pid']/text()").unwrap(),
            vec!["42"]
        );
        assert_eq!(
            doc.xpath("/guts/jvm/attrs/attr[@id='totalThreads']/text()")
                .unwrap(),
            vec!["2"]
        );
        assert_eq!(
            doc.xpath("/guts/jvm/threads/thread[@daemon='true']/@id").unwrap(),
            vec!["worker"]
        );
        assert_eq!(
            doc.xpath("/guts/jvm/threads/thread[@id='main']/@state").unwrap(),
            vec!["RUNNABLE"]
        );
        assert!(doc
            .to_string()
            .contains("<?xml-stylesheet href='/xsl/guts.xsl' type='text/xsl'?>"));
    }

    #[test]
    fn test_pid_is_omitted_when_unknown() {
        let stats = RuntimeStats {
            pid: None,
            ..sample()
        };
        assert!(stats.attrs().iter().all(|(id, _)| *id != "pid"));
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(
            parse_state("123 (tokio (rt)) S 1 2 3"),
            Some(ThreadState::Waiting)
        );
        assert_eq!(parse_state("7 (main) R 0"), Some(ThreadState::Runnable));
        assert_eq!(parse_state("7 (gone) Z 0"), Some(ThreadState::Terminated));
        assert_eq!(parse_state("garbage"), None);
    }

    #[test]
    fn test_read_threads_from_task_dir() {
        let dir = tempfile::tempdir().unwrap();
        for (tid, comm, state) in [(10, "farm", 'R'), (11, "worker", 'S')] {
            let task = dir.path().join(tid.to_string());
            std::fs::create_dir(&task).unwrap();
            std::fs::write(task.join("comm"), format!("{comm}\n")).unwrap();
            std::fs::write(task.join("stat"), format!("{tid} ({comm}) {state} 1")).unwrap();
        }
        let threads = read_threads(dir.path(), 10).unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].name, "farm");
        assert!(!threads[0].daemon);
        assert_eq!(threads[1].state, ThreadState::Waiting);
        assert!(threads[1].daemon);
    }

    #[test]
    fn test_read_threads_of_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_threads(&dir.path().join("absent"), 1).is_none());
    }

    #[test]
    fn test_collect_has_at_least_one_thread() {
        let stats = RuntimeStats::collect();
        assert!(stats.available_processors >= 1);
        assert!(!stats.threads.is_empty());
    }
}
