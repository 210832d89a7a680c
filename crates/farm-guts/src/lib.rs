//! Runtime diagnostics report for Farm.
//!
//! The report is an XML document with the process' memory, CPU and thread
//! statistics, rendered with a stylesheet processing instruction so a
//! browser can show it directly.
//!
//! # Example
//!
//! ```
//! use farm_guts::GutsProject;
//! use farm_pmo::{Farm, Policy};
//! use farm_xml::{Directives, Item};
//!
//! let farm = Farm::new(std::env::temp_dir().join("farm-guts-doc"), Policy::default());
//! let guts = GutsProject::new(&farm, None, Directives::new());
//! let report = guts.acq("guts.xml").unwrap();
//!
//! let cpus = report.xpath("/guts/jvm/attrs/attr[@id='availableProcessors']/text()").unwrap();
//! assert_eq!(cpus.len(), 1);
//! ```

mod error;
mod project;
mod stats;

pub use error::{GutsError, Result};
pub use project::GutsProject;
pub use stats::{RuntimeStats, ThreadInfo, ThreadState};
