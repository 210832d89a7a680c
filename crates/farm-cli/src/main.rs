//! Farm CLI - Command-line interface for the people registry and runtime report.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use farm_pmo::Cash;
use std::path::PathBuf;

mod commands;
mod logging;

use logging::LogFormat;

/// Farm - people registry and runtime diagnostics
#[derive(Parser, Debug)]
#[command(name = "farm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Directory holding the farm's projects
    #[arg(short, long, default_value = ".farm")]
    data_dir: PathBuf,

    /// Policy file (TOML, YAML or JSON); FARM_POLICY_* variables override it
    #[arg(short, long)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage people
    People {
        #[command(subcommand)]
        command: PeopleCommands,
    },

    /// Print the runtime report
    Guts {
        /// Seed the report from this project's stored document
        #[arg(long)]
        project: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
pub(crate) enum PeopleCommands {
    /// Create the registry document if it's missing
    Bootstrap,
    /// List everybody
    List,
    /// Show everything known about a person
    Show { uid: String },
    /// Does the person exist?
    Exists { uid: String },
    /// Create a person with default values
    Touch { uid: String },
    /// Delete a person
    Remove { uid: String },
    /// Invite a person and set their mentor
    Invite {
        uid: String,
        mentor: String,
        /// Ignore the students limit
        #[arg(long)]
        force: bool,
    },
    /// Show the mentor of a person
    Mentor { uid: String },
    /// Remove the mentor of a person
    Breakup { uid: String },
    /// Move a person under the system mentor
    Graduate { uid: String },
    /// List the students of a mentor
    Students { uid: String },
    /// Show or set details
    Details { uid: String, text: Option<String> },
    /// Show or set the hourly rate, e.g. "$64"
    Rate { uid: String, rate: Option<Cash> },
    /// Add an alias, e.g. "email jeff@example.com"
    Link {
        uid: String,
        rel: String,
        alias: String,
    },
    /// Find people by alias
    Find { rel: String, alias: String },
    /// List aliases of a person, optionally of one rel
    Links {
        uid: String,
        rel: Option<String>,
        /// Require exactly one alias
        #[arg(long, requires = "rel")]
        single: bool,
    },
    /// Show or set vacation mode
    Vacation { uid: String, on: Option<bool> },
    /// Show or set the active flag
    Active { uid: String, on: Option<bool> },
    /// Show or set reputation
    Reputation { uid: String, value: Option<u64> },
    /// Show or set the number of jobs
    Jobs { uid: String, value: Option<u64> },
    /// Show or set speed
    Speed { uid: String, value: Option<f64> },
    /// Show or set the number of projects
    Projects { uid: String, value: Option<u64> },
    /// Record an application (now, unless a time is given)
    Apply {
        uid: String,
        when: Option<DateTime<Utc>>,
    },
    /// Show when a person applied
    Applied { uid: String },
    /// Show or replace skills
    Skills {
        uid: String,
        /// Comma-separated list replacing the current skills
        #[arg(long, value_delimiter = ',')]
        set: Option<Vec<String>>,
    },
    /// List people with high reputation
    Hirep,
    /// List visible people
    Visible,
    /// Show the total reputation of visible people
    TotalReputation,
}

fn main() {
    let cli = Cli::parse();

    logging::init_logging(logging::level(cli.verbose), cli.log_format);

    let result = match cli.command {
        Commands::People { command } => commands::farm(&cli.data_dir, cli.policy.as_deref())
            .and_then(|farm| commands::people(&farm, command)),
        Commands::Guts { project } => commands::farm(&cli.data_dir, cli.policy.as_deref())
            .and_then(|farm| commands::guts(&farm, project.as_deref())),
        Commands::Version => {
            println!("farm {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
