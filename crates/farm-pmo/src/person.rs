//! Read-only view of one person's record.

use crate::cash::Cash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A link to the person's identity in another system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Relation, e.g. "github" or "email".
    pub rel: String,
    /// Identifier in that system, e.g. "yegor256".
    pub href: String,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rel, self.href)
    }
}

/// Everything the registry knows about a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique id (login).
    pub id: String,
    /// Id of the mentor, if invited.
    pub mentor: Option<String>,
    /// Reputation score.
    pub reputation: u64,
    /// Jobs in the person's agenda.
    pub jobs: u64,
    /// Projects the person participates in.
    pub projects: u64,
    /// Average speed.
    pub speed: f64,
    /// Hourly rate.
    pub rate: Cash,
    /// Skills in the order they were declared.
    pub skills: Vec<String>,
    /// When the skills were last replaced.
    pub skills_updated: Option<DateTime<Utc>>,
    /// Aliases in other systems.
    pub links: Vec<Link>,
    /// Is the person active?
    pub active: bool,
    /// Is the person on vacation?
    pub vacation: bool,
    /// Free-text details about the person.
    pub details: Option<String>,
    /// When the person applied.
    pub applied: Option<DateTime<Utc>>,
}

impl Person {
    /// Is the person visible, i.e. mentored with positive reputation?
    pub fn is_visible(&self) -> bool {
        self.mentor.is_some() && self.reputation > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_display() {
        let link = Link {
            rel: "github".into(),
            href: "yegor256".into(),
        };
        assert_eq!(link.to_string(), "github:yegor256");
    }
}
