//! People registry for Farm.
//!
//! This crate provides:
//! - **Farm**: the on-disk layout of projects and their documents
//! - **People**: mentors, students, reputation, rates, skills, links and flags
//! - **Policy**: configurable limits such as the number of students per mentor
//! - **Cash**: dollar amounts used for hourly rates
//!
//! # Example
//!
//! ```
//! use farm_pmo::{Cash, People, Policy};
//! use farm_xml::MemoryItem;
//!
//! let people = People::with_item(MemoryItem::new("people"), Policy::default());
//!
//! // Create a mentor and invite a student
//! people.touch("yegor256").unwrap();
//! people.invite("jeff", "yegor256", false).unwrap();
//! assert_eq!(people.mentor("jeff").unwrap(), "yegor256");
//!
//! // Rates above the policy limit are rejected softly
//! people.set_rate("jeff", Cash::dollars(64)).unwrap();
//! assert!(people.set_rate("jeff", Cash::dollars(1000)).unwrap_err().is_soft());
//! ```

mod cash;
mod error;
mod farm;
mod people;
mod person;
mod policy;

pub use cash::Cash;
pub use error::{PmoError, Result};
pub use farm::{Farm, Project, PMO};
pub use people::{People, GRADUATE_MENTOR, PEOPLE_XML};
pub use person::{Link, Person};
pub use policy::{Policy, ENV_PREFIX};
