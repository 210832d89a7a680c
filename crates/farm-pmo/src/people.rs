//! The people registry.
//!
//! Every operation is a single read or a single guarded update of
//! `people.xml`. A person's record is created implicitly the first time it
//! is touched, invited, rated, linked or sent on vacation.

use crate::cash::Cash;
use crate::error::{PmoError, Result};
use crate::farm::Farm;
use crate::person::{Link, Person};
use crate::policy::Policy;
use chrono::{DateTime, SecondsFormat, Utc};
use farm_xml::{literal, Directives, Document, Item};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

/// Mentor assigned to people who graduated.
pub const GRADUATE_MENTOR: &str = "0crat";

/// Document holding the registry inside the PMO project.
pub const PEOPLE_XML: &str = "people.xml";

/// Data about people.
pub struct People {
    item: Box<dyn Item>,
    policy: Policy,
}

impl People {
    /// Opens the registry of a farm.
    pub fn new(farm: &Farm) -> Self {
        Self::with_item(farm.pmo().acq(PEOPLE_XML), farm.policy().clone())
    }

    /// Opens a registry stored in the given item.
    pub fn with_item(item: impl Item + 'static, policy: Policy) -> Self {
        Self {
            item: Box::new(item),
            policy,
        }
    }

    /// Policy this registry enforces.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Makes sure the document exists.
    pub fn bootstrap(&self) -> Result<()> {
        self.update(|_| Ok(()))
    }

    // ==================== Membership ====================

    /// Ids of everybody in the registry.
    pub fn iterate(&self) -> Result<Vec<String>> {
        Ok(self.item.xpath("/people/person/@id")?)
    }

    /// Discards the whole record of a person.
    pub fn remove(&self, uid: &str) -> Result<()> {
        self.modify(Directives::new().xpath(person(uid)).remove())?;
        tracing::info!(uid, "Person removed");
        Ok(())
    }

    /// Creates the record with defaults, unless it's already there.
    pub fn touch(&self, uid: &str) -> Result<()> {
        self.modify(start(uid))
    }

    /// Does the person exist?
    pub fn exists(&self, uid: &str) -> Result<bool> {
        self.read(|doc| exists_in(doc, uid))
    }

    /// Invites a person and sets their mentor.
    ///
    /// Fails softly if the person already has a mentor, if the mentor is not
    /// in the registry, or if the mentor already has the maximum number of
    /// students allowed by the policy, unless `force` is set.
    pub fn invite(&self, uid: &str, mentor: &str, force: bool) -> Result<()> {
        self.update(|doc| {
            if has_mentor_in(doc, uid)? {
                return Err(PmoError::soft(format!(
                    "@{uid} is already with us, no need to invite again"
                )));
            }
            if uid == mentor {
                return Err(PmoError::soft(format!("@{uid} can't be their own mentor")));
            }
            if mentor != GRADUATE_MENTOR && !exists_in(doc, mentor)? {
                return Err(PmoError::soft(format!(
                    "@{mentor} is not with us, can't be a mentor"
                )));
            }
            let max = self.policy.max_students;
            let current = doc
                .nodes(&format!(
                    "/people/person[mentor/text()={}]",
                    literal(mentor)
                ))?
                .len();
            if !force && current >= max {
                return Err(PmoError::soft(format!(
                    "You can not invite more than {max} students; you already have {current}, see §1"
                )));
            }
            doc.apply(
                &start(uid)
                    .push()
                    .xpath("mentor")
                    .strict(0)
                    .pop()
                    .add("mentor")
                    .set(mentor),
            )?;
            tracing::info!(uid, mentor, force, students = current + 1, "Person invited");
            Ok(())
        })
    }

    /// Does the person have a mentor?
    pub fn has_mentor(&self, uid: &str) -> Result<bool> {
        self.read(|doc| has_mentor_in(doc, uid))
    }

    /// The person's mentor.
    pub fn mentor(&self, uid: &str) -> Result<String> {
        self.read(|doc| {
            doc.xpath(&format!("{}/mentor/text()", person(uid)))?
                .into_iter()
                .next()
                .ok_or_else(|| PmoError::contract(format!("Person @{uid} doesn't have a mentor")))
        })
    }

    /// Removes the person's mentor.
    pub fn breakup(&self, uid: &str) -> Result<()> {
        self.modify(
            Directives::new()
                .xpath(format!("{}/mentor", person(uid)))
                .remove(),
        )?;
        tracing::info!(uid, "Mentor relationship ended");
        Ok(())
    }

    /// Moves a mentored person under the system mentor.
    pub fn graduate(&self, uid: &str) -> Result<()> {
        self.update(|doc| {
            require_mentor(doc, uid)?;
            doc.apply(&start(uid).add_if("mentor").set(GRADUATE_MENTOR))?;
            tracing::info!(uid, "Person graduated");
            Ok(())
        })
    }

    /// Students of a mentor.
    pub fn students(&self, uid: &str) -> Result<Vec<String>> {
        Ok(self.item.xpath(&format!(
            "/people/person[mentor/text()={}]/@id",
            literal(uid)
        ))?)
    }

    // ==================== Details ====================

    /// Saves free-text details about a mentored person.
    pub fn set_details(&self, uid: &str, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(PmoError::soft(format!("User @{uid} details can't be empty")));
        }
        self.update(|doc| {
            require_mentor(doc, uid)?;
            doc.apply(&start(uid).add_if("details").set(text))?;
            Ok(())
        })
    }

    /// Details of a person, empty if never set.
    pub fn details(&self, uid: &str) -> Result<String> {
        self.read(|doc| Ok(doc.xpath_or(&format!("{}/details/text()", person(uid)), "")?))
    }

    // ==================== Rate ====================

    /// Sets the hourly rate, which must lie within the policy bounds (§16).
    pub fn set_rate(&self, uid: &str, rate: Cash) -> Result<()> {
        let max = self.policy.max_rate;
        if rate > max {
            return Err(PmoError::soft(format!(
                "This is too high ({rate}), we do not work with rates higher than {max}, see §16"
            )));
        }
        let min = self.policy.min_rate;
        if rate < min {
            return Err(PmoError::soft(format!(
                "This is too low ({rate}), we do not work with rates lower than {min}, see §16"
            )));
        }
        self.modify(start(uid).add_if("rate").set(rate))?;
        tracing::debug!(uid, %rate, "Rate set");
        Ok(())
    }

    /// Hourly rate, zero if never set.
    pub fn rate(&self, uid: &str) -> Result<Cash> {
        self.read(|doc| doc.xpath_or(&format!("{}/rate/text()", person(uid)), "$0")?.parse())
    }

    // ==================== Links ====================

    /// Adds an alias of the person in another system, e.g. ("github", "yegor256").
    ///
    /// A person may have several aliases, even with the same rel. Adding an
    /// identical alias twice keeps one copy.
    pub fn link(&self, uid: &str, rel: &str, alias: &str) -> Result<()> {
        self.modify(
            start(uid)
                .add_if("links")
                .xpath(format!(
                    "{}/links[not(link[@rel={} and @href={}])]",
                    person(uid),
                    literal(rel),
                    literal(alias)
                ))
                .add("link")
                .attr("rel", rel)
                .attr("href", alias),
        )
    }

    /// Ids of people who have the given alias.
    pub fn find(&self, rel: &str, alias: &str) -> Result<Vec<String>> {
        Ok(self.item.xpath(&format!(
            "/people/person[links/link[@rel={} and @href={}]]/@id",
            literal(rel),
            literal(alias)
        ))?)
    }

    /// All aliases of a person as `rel:href` strings.
    pub fn links(&self, uid: &str) -> Result<Vec<String>> {
        self.read(|doc| Ok(links_in(doc, uid)?.iter().map(Link::to_string).collect()))
    }

    /// All hrefs of a person for one rel.
    pub fn links_of(&self, uid: &str, rel: &str) -> Result<Vec<String>> {
        Ok(self.item.xpath(&format!(
            "{}/links/link[@rel={}]/@href",
            person(uid),
            literal(rel)
        ))?)
    }

    /// The only href of a person for one rel.
    pub fn single_link(&self, uid: &str, rel: &str) -> Result<String> {
        let mut links = self.links_of(uid, rel)?.into_iter();
        let link = links.next().ok_or_else(|| PmoError::NoLink {
            uid: uid.to_string(),
            rel: rel.to_string(),
        })?;
        if links.next().is_some() {
            return Err(PmoError::TooManyLinks {
                uid: uid.to_string(),
                rel: rel.to_string(),
            });
        }
        Ok(link)
    }

    // ==================== Flags ====================

    /// Turns vacation mode on or off.
    pub fn set_vacation(&self, uid: &str, mode: bool) -> Result<()> {
        self.modify(start(uid).add_if("vacation").set(mode))
    }

    /// Is the person on vacation?
    pub fn vacation(&self, uid: &str) -> Result<bool> {
        self.read(|doc| {
            Ok(parse_flag(&doc.xpath_or(
                &format!("{}/vacation/text()", person(uid)),
                "false",
            )?))
        })
    }

    /// Sets the active flag of an existing person; unknown ids are ignored.
    pub fn activate(&self, uid: &str, active: bool) -> Result<()> {
        self.modify(
            Directives::new()
                .xpath(person(uid))
                .add_if("active")
                .set(active),
        )
    }

    /// Is the person active? False when unknown.
    pub fn active(&self, uid: &str) -> Result<bool> {
        self.read(|doc| {
            Ok(parse_flag(&doc.xpath_or(
                &format!("{}/active/text()", person(uid)),
                "false",
            )?))
        })
    }

    // ==================== Counters ====================

    /// Updates the reputation of an existing person.
    pub fn set_reputation(&self, uid: &str, rep: u64) -> Result<()> {
        self.set_field(uid, "reputation", rep)
    }

    /// Reputation of an existing person.
    pub fn reputation(&self, uid: &str) -> Result<u64> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            field(doc, uid, "reputation", "0")
        })
    }

    /// Updates the number of jobs in an existing person's agenda.
    pub fn set_jobs(&self, uid: &str, jobs: u64) -> Result<()> {
        self.set_field(uid, "jobs", jobs)
    }

    /// Number of jobs in an existing person's agenda.
    pub fn jobs(&self, uid: &str) -> Result<u64> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            field(doc, uid, "jobs", "0")
        })
    }

    /// Updates the speed of an existing person.
    pub fn set_speed(&self, uid: &str, speed: f64) -> Result<()> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(PmoError::soft(format!(
                "Speed of @{uid} must be a non-negative number, got {speed}"
            )));
        }
        self.set_field(uid, "speed", speed)
    }

    /// Speed of an existing person.
    pub fn speed(&self, uid: &str) -> Result<f64> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            field(doc, uid, "speed", "0.0")
        })
    }

    /// Sets the number of projects, creating the person if needed.
    pub fn set_projects(&self, uid: &str, count: u64) -> Result<()> {
        self.modify(start(uid).add_if("projects").set(count))
    }

    /// Number of projects of an existing person.
    pub fn projects(&self, uid: &str) -> Result<u64> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            field(doc, uid, "projects", "0")
        })
    }

    fn set_field(&self, uid: &str, name: &str, value: impl Display) -> Result<()> {
        self.update(|doc| {
            check_existing(doc, uid)?;
            doc.apply(
                &Directives::new()
                    .xpath(person(uid))
                    .add_if(name)
                    .set(value),
            )?;
            Ok(())
        })
    }

    // ==================== Applications ====================

    /// Records when an existing person applied.
    pub fn apply(&self, uid: &str, when: DateTime<Utc>) -> Result<()> {
        self.set_field(uid, "applied", timestamp(when))
    }

    /// Has an existing person applied?
    pub fn applied(&self, uid: &str) -> Result<bool> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            Ok(!doc.nodes(&format!("{}/applied", person(uid)))?.is_empty())
        })
    }

    /// When an existing person applied.
    pub fn applied_time(&self, uid: &str) -> Result<DateTime<Utc>> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            let text = doc
                .xpath(&format!("{}/applied/text()", person(uid)))?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    PmoError::contract(format!("Person @{uid} doesn't have apply-time"))
                })?;
            parse_timestamp(&text).ok_or_else(|| {
                PmoError::contract(format!("Person @{uid} has malformed apply-time '{text}'"))
            })
        })
    }

    // ==================== Skills ====================

    /// Skills of a person in declaration order.
    pub fn skills(&self, uid: &str) -> Result<Vec<String>> {
        self.read(|doc| skills_in(doc, uid))
    }

    /// Replaces the skills of an existing person and stamps the update time.
    pub fn set_skills<I, S>(&self, uid: &str, skills: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dirs = Directives::new()
            .xpath(person(uid))
            .push()
            .xpath("skills")
            .remove()
            .pop()
            .add("skills")
            .attr("updated", timestamp(Utc::now()));
        for skill in skills {
            dirs = dirs.add("skill").set(skill.as_ref()).up();
        }
        self.update(|doc| {
            check_existing(doc, uid)?;
            doc.apply(&dirs)?;
            Ok(())
        })
    }

    // ==================== Aggregates ====================

    /// Ids of people with reputation above the policy threshold.
    pub fn hirep(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .item
            .xpath(&format!(
                "/people/person[reputation > {}]/@id",
                self.policy.high_reputation
            ))?
            .into_iter()
            .collect())
    }

    /// Ids of visible people: mentored, with positive reputation.
    pub fn visible(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .item
            .xpath("/people/person[mentor and reputation > 0]/@id")?
            .into_iter()
            .collect())
    }

    /// Total reputation of all visible people.
    pub fn total_reputation(&self) -> Result<u64> {
        self.read(|doc| {
            let total = doc.xpath_or(
                "sum(/people/person[mentor and reputation > 0]/reputation)",
                "0",
            )?;
            let total: f64 = total
                .parse()
                .map_err(|_| PmoError::contract(format!("malformed reputation total '{total}'")))?;
            if total.is_finite() {
                Ok(total as u64)
            } else {
                Ok(0)
            }
        })
    }

    /// The whole record of an existing person.
    pub fn person(&self, uid: &str) -> Result<Person> {
        self.read(|doc| {
            check_existing(doc, uid)?;
            let path = person(uid);
            let text = |name: &str| -> Result<Option<String>> {
                Ok(doc
                    .xpath(&format!("{path}/{name}/text()"))?
                    .into_iter()
                    .next())
            };
            Ok(Person {
                id: uid.to_string(),
                mentor: text("mentor")?,
                reputation: field(doc, uid, "reputation", "0")?,
                jobs: field(doc, uid, "jobs", "0")?,
                projects: field(doc, uid, "projects", "0")?,
                speed: field(doc, uid, "speed", "0.0")?,
                rate: text("rate")?.as_deref().unwrap_or("$0").parse()?,
                skills: skills_in(doc, uid)?,
                skills_updated: doc
                    .xpath(&format!("{path}/skills/@updated"))?
                    .first()
                    .and_then(|t| parse_timestamp(t)),
                links: links_in(doc, uid)?,
                active: text("active")?.is_some_and(|t| parse_flag(&t)),
                vacation: text("vacation")?.is_some_and(|t| parse_flag(&t)),
                details: text("details")?,
                applied: text("applied")?.as_deref().and_then(parse_timestamp),
            })
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Document) -> Result<T>) -> Result<T> {
        let doc = self.item.load()?;
        f(&doc)
    }

    fn update<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut doc = self.item.load()?;
        let out = f(&mut doc)?;
        self.item.save(&doc)?;
        Ok(out)
    }

    fn modify(&self, dirs: Directives) -> Result<()> {
        self.item.modify(&dirs)?;
        Ok(())
    }
}

fn person(uid: &str) -> String {
    format!("/people/person[@id={}]", literal(uid))
}

/// Directives that make sure the person's record exists and leave the
/// cursor on it.
fn start(uid: &str) -> Directives {
    Directives::new()
        .xpath(format!("/people[not(person[@id={}])]", literal(uid)))
        .add("person")
        .attr("id", uid)
        .add("reputation")
        .set(0)
        .up()
        .add("jobs")
        .set(0)
        .up()
        .add("projects")
        .set(0)
        .up()
        .add("speed")
        .set("0.0")
        .up()
        .add("skills")
        .attr("updated", timestamp(Utc::now()))
        .up()
        .add("active")
        .set(true)
        .up()
        .add("links")
        .add("link")
        .attr("rel", "github")
        .attr("href", uid)
        .xpath(person(uid))
        .strict(1)
}

fn exists_in(doc: &Document, uid: &str) -> Result<bool> {
    Ok(!doc.nodes(&person(uid))?.is_empty())
}

fn check_existing(doc: &Document, uid: &str) -> Result<()> {
    if exists_in(doc, uid)? {
        Ok(())
    } else {
        Err(PmoError::contract(format!("Person @{uid} doesn't exist")))
    }
}

fn has_mentor_in(doc: &Document, uid: &str) -> Result<bool> {
    Ok(!doc.nodes(&format!("{}/mentor", person(uid)))?.is_empty())
}

fn require_mentor(doc: &Document, uid: &str) -> Result<()> {
    if has_mentor_in(doc, uid)? {
        Ok(())
    } else {
        Err(PmoError::soft(format!("User @{uid} is not with us yet")))
    }
}

fn field<T: FromStr>(doc: &Document, uid: &str, name: &str, default: &str) -> Result<T> {
    let text = doc.xpath_or(&format!("{}/{name}/text()", person(uid)), default)?;
    text.trim().parse().map_err(|_| {
        PmoError::contract(format!("Person @{uid} has malformed {name} '{text}'"))
    })
}

fn skills_in(doc: &Document, uid: &str) -> Result<Vec<String>> {
    Ok(doc.xpath(&format!("{}/skills/skill", person(uid)))?)
}

fn links_in(doc: &Document, uid: &str) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    for node in doc.nodes(&format!("{}/links/link", person(uid)))? {
        links.push(Link {
            rel: doc.xpath_at(node, "@rel")?.into_iter().next().unwrap_or_default(),
            href: doc.xpath_at(node, "@href")?.into_iter().next().unwrap_or_default(),
        });
    }
    Ok(links)
}

fn timestamp(when: DateTime<Utc>) -> String {
    when.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn parse_flag(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use farm_xml::MemoryItem;

    fn people() -> People {
        People::with_item(MemoryItem::new("people"), Policy::default())
    }

    fn people_with(policy: Policy) -> People {
        People::with_item(MemoryItem::new("people"), policy)
    }

    #[test]
    fn test_touch_creates_defaults_once() {
        let people = people();
        people.touch("yegor256").unwrap();
        people.touch("yegor256").unwrap();
        assert_eq!(people.iterate().unwrap(), vec!["yegor256"]);
        assert_eq!(people.reputation("yegor256").unwrap(), 0);
        assert_eq!(people.jobs("yegor256").unwrap(), 0);
        assert_eq!(people.projects("yegor256").unwrap(), 0);
        assert_eq!(people.speed("yegor256").unwrap(), 0.0);
        assert!(people.active("yegor256").unwrap());
        assert_eq!(people.links("yegor256").unwrap(), vec!["github:yegor256"]);
    }

    #[test]
    fn test_invite_sets_mentor() {
        let people = people();
        people.touch("yegor256").unwrap();
        people.invite("jeff", "yegor256", false).unwrap();
        assert!(people.has_mentor("jeff").unwrap());
        assert_eq!(people.mentor("jeff").unwrap(), "yegor256");
        assert_eq!(people.students("yegor256").unwrap(), vec!["jeff"]);
    }

    #[test]
    fn test_invite_twice_fails() {
        let people = people();
        people.touch("yegor256").unwrap();
        people.invite("jeff", "yegor256", false).unwrap();
        let err = people.invite("jeff", "yegor256", false).unwrap_err();
        assert!(err.is_soft());
        assert!(err.to_string().contains("already with us"));
    }

    #[test]
    fn test_invite_requires_known_mentor() {
        let people = people();
        let err = people.invite("jeff", "ghost", false).unwrap_err();
        assert!(err.is_soft());
        assert!(!people.exists("jeff").unwrap());
    }

    #[test]
    fn test_self_invite_is_rejected() {
        let people = people();
        people.touch("boss").unwrap();
        let err = people.invite("boss", "boss", false).unwrap_err();
        assert!(err.is_soft());
        assert!(!people.has_mentor("boss").unwrap());
    }

    #[test]
    fn test_invite_by_system_mentor() {
        let people = people();
        people.invite("jeff", GRADUATE_MENTOR, false).unwrap();
        assert_eq!(people.mentor("jeff").unwrap(), GRADUATE_MENTOR);
    }

    #[test]
    fn test_mentor_capacity() {
        let policy = Policy {
            max_students: 2,
            ..Policy::default()
        };
        let people = people_with(policy);
        people.touch("boss").unwrap();
        people.invite("a", "boss", false).unwrap();
        people.invite("b", "boss", false).unwrap();
        let err = people.invite("c", "boss", false).unwrap_err();
        assert!(err.is_soft());
        assert!(err.to_string().contains("more than 2 students"));
        people.invite("c", "boss", true).unwrap();
        assert_eq!(people.students("boss").unwrap().len(), 3);
    }

    #[test]
    fn test_breakup_and_graduate() {
        let people = people();
        people.touch("boss").unwrap();
        people.invite("jeff", "boss", false).unwrap();
        people.graduate("jeff").unwrap();
        assert_eq!(people.mentor("jeff").unwrap(), GRADUATE_MENTOR);
        people.breakup("jeff").unwrap();
        assert!(!people.has_mentor("jeff").unwrap());
        assert!(people.mentor("jeff").is_err());
        assert!(people.graduate("jeff").unwrap_err().is_soft());
    }

    #[test]
    fn test_details_require_mentor_and_text() {
        let people = people();
        people.touch("jeff").unwrap();
        assert!(people.set_details("jeff", "").unwrap_err().is_soft());
        assert!(people.set_details("jeff", " \n ").unwrap_err().is_soft());
        assert!(people.set_details("jeff", "Java dev").unwrap_err().is_soft());
        people.invite("jeff", GRADUATE_MENTOR, false).unwrap();
        people.set_details("jeff", "Java dev").unwrap();
        assert_eq!(people.details("jeff").unwrap(), "Java dev");
        assert_eq!(people.details("nobody").unwrap(), "");
    }

    #[test]
    fn test_rate_bounds() {
        let people = people();
        people.set_rate("jeff", Cash::dollars(64)).unwrap();
        assert_eq!(people.rate("jeff").unwrap(), Cash::dollars(64));
        let err = people.set_rate("jeff", Cash::dollars(512)).unwrap_err();
        assert!(err.is_soft());
        assert!(err.to_string().contains("too high ($512.00)"));
        let err = people.set_rate("jeff", Cash::from_cents(-1)).unwrap_err();
        assert!(err.to_string().contains("too low"));
        assert_eq!(people.rate("jeff").unwrap(), Cash::dollars(64));
        assert_eq!(people.rate("nobody").unwrap(), Cash::ZERO);
    }

    #[test]
    fn test_links() {
        let people = people();
        people.link("jeff", "email", "jeff@example.com").unwrap();
        people.link("jeff", "email", "jeff@example.com").unwrap();
        people.link("jeff", "jira", "j1").unwrap();
        people.link("jeff", "jira", "j2").unwrap();
        assert_eq!(
            people.links("jeff").unwrap(),
            vec!["github:jeff", "email:jeff@example.com", "jira:j1", "jira:j2"]
        );
        assert_eq!(people.find("email", "jeff@example.com").unwrap(), vec!["jeff"]);
        assert!(people.find("email", "nobody@example.com").unwrap().is_empty());
        assert_eq!(people.single_link("jeff", "github").unwrap(), "jeff");
        assert!(matches!(
            people.single_link("jeff", "jira"),
            Err(PmoError::TooManyLinks { .. })
        ));
        assert!(matches!(
            people.single_link("jeff", "twitter"),
            Err(PmoError::NoLink { .. })
        ));
    }

    #[test]
    fn test_vacation_and_active() {
        let people = people();
        assert!(!people.vacation("jeff").unwrap());
        people.set_vacation("jeff", true).unwrap();
        assert!(people.vacation("jeff").unwrap());
        people.set_vacation("jeff", false).unwrap();
        assert!(!people.vacation("jeff").unwrap());
        people.activate("jeff", false).unwrap();
        assert!(!people.active("jeff").unwrap());
        people.activate("ghost", true).unwrap();
        assert!(!people.exists("ghost").unwrap());
    }

    #[test]
    fn test_counters_need_existing_person() {
        let people = people();
        assert!(matches!(
            people.set_reputation("ghost", 5),
            Err(PmoError::Contract(_))
        ));
        assert!(matches!(people.reputation("ghost"), Err(PmoError::Contract(_))));
        people.touch("jeff").unwrap();
        people.set_reputation("jeff", 300).unwrap();
        people.set_jobs("jeff", 7).unwrap();
        people.set_speed("jeff", 2.5).unwrap();
        people.set_projects("jeff", 3).unwrap();
        assert_eq!(people.reputation("jeff").unwrap(), 300);
        assert_eq!(people.jobs("jeff").unwrap(), 7);
        assert_eq!(people.speed("jeff").unwrap(), 2.5);
        assert_eq!(people.projects("jeff").unwrap(), 3);
        assert!(people.set_speed("jeff", -1.0).unwrap_err().is_soft());
        assert!(people.set_speed("jeff", f64::NAN).unwrap_err().is_soft());
    }

    #[test]
    fn test_apply_time() {
        let people = people();
        people.touch("jeff").unwrap();
        assert!(!people.applied("jeff").unwrap());
        assert!(matches!(
            people.applied_time("jeff"),
            Err(PmoError::Contract(_))
        ));
        let when = Utc.with_ymd_and_hms(2018, 1, 23, 10, 0, 0).unwrap();
        people.apply("jeff", when).unwrap();
        assert!(people.applied("jeff").unwrap());
        assert_eq!(people.applied_time("jeff").unwrap(), when);
        assert!(people.apply("ghost", when).is_err());
    }

    #[test]
    fn test_skills_are_replaced_in_order() {
        let people = people();
        people.touch("jeff").unwrap();
        assert!(people.skills("jeff").unwrap().is_empty());
        people.set_skills("jeff", ["java", "rust"]).unwrap();
        people.set_skills("jeff", vec!["go".to_string(), "c".to_string()]).unwrap();
        assert_eq!(people.skills("jeff").unwrap(), vec!["go", "c"]);
        assert!(people.set_skills("ghost", ["x"]).is_err());
    }

    #[test]
    fn test_aggregates() {
        let people = people();
        people.touch("boss").unwrap();
        people.set_reputation("boss", 1000).unwrap();
        people.invite("a", "boss", false).unwrap();
        people.set_reputation("a", 300).unwrap();
        people.invite("b", "boss", false).unwrap();
        people.set_reputation("b", 20).unwrap();
        people.invite("c", "boss", false).unwrap();
        assert_eq!(
            people.hirep().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["a", "boss"]
        );
        assert_eq!(
            people.visible().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(people.total_reputation().unwrap(), 320);
    }

    #[test]
    fn test_remove_discards_record() {
        let people = people();
        people.touch("jeff").unwrap();
        people.remove("jeff").unwrap();
        assert!(!people.exists("jeff").unwrap());
        assert!(people.iterate().unwrap().is_empty());
    }

    #[test]
    fn test_person_view() {
        let people = people();
        people.invite("jeff", GRADUATE_MENTOR, false).unwrap();
        people.set_rate("jeff", Cash::dollars(32)).unwrap();
        people.set_skills("jeff", ["rust"]).unwrap();
        let jeff = people.person("jeff").unwrap();
        assert_eq!(jeff.mentor.as_deref(), Some(GRADUATE_MENTOR));
        assert_eq!(jeff.rate, Cash::dollars(32));
        assert_eq!(jeff.skills, vec!["rust"]);
        assert!(jeff.skills_updated.is_some());
        assert!(jeff.active);
        assert!(!jeff.is_visible());
        assert!(people.person("ghost").is_err());
    }

    #[test]
    fn test_ids_with_quotes_are_safe() {
        let people = people();
        people.touch("o'neil").unwrap();
        people.touch("o'neil").unwrap();
        assert_eq!(people.iterate().unwrap(), vec!["o'neil"]);
        assert_eq!(people.reputation("o'neil").unwrap(), 0);
    }
}
