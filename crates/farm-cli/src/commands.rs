//! CLI command implementations.

use crate::PeopleCommands;
use chrono::{SecondsFormat, Utc};
use farm_guts::{GutsError, GutsProject};
use farm_pmo::{Farm, People, PmoError, Policy};
use farm_xml::Directives;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    People(#[from] PmoError),

    #[error(transparent)]
    Guts(#[from] GutsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Opens the farm under `data_dir` with the loaded policy.
pub fn farm(data_dir: &Path, policy: Option<&Path>) -> Result<Farm> {
    let policy = Policy::load(policy)?;
    tracing::debug!(data_dir = %data_dir.display(), "Opening farm");
    Ok(Farm::new(data_dir, policy))
}

/// Runs one registry command.
pub fn people(farm: &Farm, command: PeopleCommands) -> Result<()> {
    let people = People::new(farm);
    match command {
        PeopleCommands::Bootstrap => people.bootstrap()?,
        PeopleCommands::List => print_all(people.iterate()?),
        PeopleCommands::Show { uid } => {
            println!("{}", serde_json::to_string_pretty(&people.person(&uid)?)?);
        }
        PeopleCommands::Exists { uid } => println!("{}", people.exists(&uid)?),
        PeopleCommands::Touch { uid } => people.touch(&uid)?,
        PeopleCommands::Remove { uid } => people.remove(&uid)?,
        PeopleCommands::Invite { uid, mentor, force } => {
            people.invite(&uid, &mentor, force)?;
            println!("@{uid} invited by @{mentor}");
        }
        PeopleCommands::Mentor { uid } => println!("{}", people.mentor(&uid)?),
        PeopleCommands::Breakup { uid } => people.breakup(&uid)?,
        PeopleCommands::Graduate { uid } => people.graduate(&uid)?,
        PeopleCommands::Students { uid } => print_all(people.students(&uid)?),
        PeopleCommands::Details { uid, text } => match text {
            Some(text) => people.set_details(&uid, &text)?,
            None => println!("{}", people.details(&uid)?),
        },
        PeopleCommands::Rate { uid, rate } => match rate {
            Some(rate) => people.set_rate(&uid, rate)?,
            None => println!("{}", people.rate(&uid)?),
        },
        PeopleCommands::Link { uid, rel, alias } => people.link(&uid, &rel, &alias)?,
        PeopleCommands::Find { rel, alias } => print_all(people.find(&rel, &alias)?),
        PeopleCommands::Links { uid, rel, single } => match rel {
            Some(rel) if single => println!("{}", people.single_link(&uid, &rel)?),
            Some(rel) => print_all(people.links_of(&uid, &rel)?),
            None => print_all(people.links(&uid)?),
        },
        PeopleCommands::Vacation { uid, on } => match on {
            Some(on) => people.set_vacation(&uid, on)?,
            None => println!("{}", people.vacation(&uid)?),
        },
        PeopleCommands::Active { uid, on } => match on {
            Some(on) => people.activate(&uid, on)?,
            None => println!("{}", people.active(&uid)?),
        },
        PeopleCommands::Reputation { uid, value } => match value {
            Some(value) => people.set_reputation(&uid, value)?,
            None => println!("{}", people.reputation(&uid)?),
        },
        PeopleCommands::Jobs { uid, value } => match value {
            Some(value) => people.set_jobs(&uid, value)?,
            None => println!("{}", people.jobs(&uid)?),
        },
        PeopleCommands::Speed { uid, value } => match value {
            Some(value) => people.set_speed(&uid, value)?,
            None => println!("{}", people.speed(&uid)?),
        },
        PeopleCommands::Projects { uid, value } => match value {
            Some(value) => people.set_projects(&uid, value)?,
            None => println!("{}", people.projects(&uid)?),
        },
        PeopleCommands::Apply { uid, when } => people.apply(&uid, when.unwrap_or_else(Utc::now))?,
        PeopleCommands::Applied { uid } => {
            if people.applied(&uid)? {
                let when = people.applied_time(&uid)?;
                println!("{}", when.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            } else {
                println!("@{uid} hasn't applied");
            }
        }
        PeopleCommands::Skills { uid, set } => match set {
            Some(skills) => people.set_skills(&uid, skills)?,
            None => print_all(people.skills(&uid)?),
        },
        PeopleCommands::Hirep => print_all(people.hirep()?),
        PeopleCommands::Visible => print_all(people.visible()?),
        PeopleCommands::TotalReputation => println!("{}", people.total_reputation()?),
    }
    Ok(())
}

/// Prints the runtime report.
pub fn guts(farm: &Farm, project: Option<&str>) -> Result<()> {
    let report = GutsProject::new(farm, project, Directives::new()).acq("guts.xml")?;
    print!("{}", report.to_xml());
    Ok(())
}

fn print_all<T: Display>(items: impl IntoIterator<Item = T>) {
    for item in items {
        println!("{item}");
    }
}
