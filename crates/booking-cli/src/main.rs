//! `scheduler` CLI - book rooms, instructors and equipment against events
//! without double-booking, and report how busy each resource is.
//!
//! ## Usage
//!
//! ```sh
//! # Load the sample data set into ./scheduler.json
//! scheduler seed
//!
//! # Create an event (local time in $SCHEDULER_TIMEZONE, default UTC)
//! scheduler event add --title "Rust Workshop" --start 2030-01-10T09:00 --end 2030-01-10T12:00
//!
//! # Book resources 1 and 3 for event 5 (all or nothing)
//! scheduler allocation add --event 5 --resources 1,3
//!
//! # Utilization between two dates, as JSON
//! scheduler --json report --from 2025-12-20 --to 2025-12-21
//! ```
//!
//! Blocked allocations and edits print the conflicting bookings and exit with
//! status 2.

mod config;
mod render;
mod seed;
mod time;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use booking_engine::{
    AllocationOutcome, EditOutcome, EventUpdate, MemoryStore, NewEvent, NewResource, ResourceType,
    Scheduler,
};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::debug;
use serde::Serialize;

use crate::config::Config;
use crate::time::parse_datetime;

/// Exit status when a booking or time change was refused because of conflicts.
const EXIT_BLOCKED: u8 = 2;

#[derive(Parser)]
#[command(
    name = "scheduler",
    version,
    about = "Book shared resources against events without double-booking"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// JSON data file [env: SCHEDULER_DATA_FILE] [default: scheduler.json]
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// IANA timezone for reading and printing local times [env: SCHEDULER_TIMEZONE] [default: UTC]
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage events
    #[command(subcommand)]
    Event(EventCommand),
    /// Manage resources
    #[command(subcommand)]
    Resource(ResourceCommand),
    /// Bind resources to events
    #[command(subcommand)]
    Allocation(AllocationCommand),
    /// List the bookings that would block allocating resources to an event
    Conflicts {
        #[arg(long)]
        event: u64,
        /// Comma-separated resource ids
        #[arg(long, value_delimiter = ',', required = true)]
        resources: Vec<u64>,
    },
    /// Booked hours per resource within a time window
    Report {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Record counts and the next upcoming events
    Overview,
    /// Load the sample data set into an empty data file
    Seed,
}

#[derive(Subcommand)]
enum EventCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change an event; omitted fields keep their current value
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event together with its allocations
    Delete { id: u64 },
    List {
        /// Only events that have not ended yet, earliest first
        #[arg(long)]
        allocatable: bool,
    },
}

#[derive(Subcommand)]
enum ResourceCommand {
    Add {
        #[arg(long)]
        name: String,
        /// room, instructor, equipment or other
        #[arg(long = "type")]
        kind: ResourceType,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        kind: Option<ResourceType>,
    },
    /// Delete a resource together with its allocations
    Delete { id: u64 },
    List,
}

#[derive(Subcommand)]
enum AllocationCommand {
    Add {
        #[arg(long)]
        event: u64,
        /// Comma-separated resource ids
        #[arg(long, value_delimiter = ',', required = true)]
        resources: Vec<u64>,
    },
    Delete { id: u64 },
    List,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let dotenv_result = dotenvy::dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match cli.global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        debug!("No .env file loaded: {}", e);
    }

    let config = Config::load(cli.global.data_file.clone(), cli.global.timezone.clone())?;
    debug!(
        "data file {}, timezone {}",
        config.data_file.display(),
        config.timezone
    );

    let mut store = load_store(&config.data_file)?;
    let seeded = matches!(cli.command, Commands::Seed);
    if seeded {
        seed::seed(&mut store, config.timezone)?;
    }
    let mut app = App {
        scheduler: Scheduler::new(store),
        config,
        json: cli.global.json,
        dirty: seeded,
    };
    let code = app.run(cli.command)?;
    if app.dirty {
        save_store(&app.config.data_file, &app.scheduler.into_inner())?;
    }
    Ok(code)
}

struct App {
    scheduler: Scheduler<MemoryStore>,
    config: Config,
    json: bool,
    /// Set by commands that changed the store.
    dirty: bool,
}

impl App {
    fn run(&mut self, command: Commands) -> Result<ExitCode> {
        let tz = self.config.timezone;
        let now = Utc::now();

        match command {
            Commands::Event(cmd) => return self.run_event(cmd),
            Commands::Resource(cmd) => return self.run_resource(cmd),
            Commands::Allocation(cmd) => return self.run_allocation(cmd),
            Commands::Conflicts { event, resources } => {
                let conflicts = self.scheduler.conflicts_for_event(event, &resources)?;
                self.emit(&conflicts, || render::conflicts(&conflicts, tz))?;
            }
            Commands::Report { from, to } => {
                let from = parse_datetime(&from, tz).context("Invalid --from")?;
                let to = parse_datetime(&to, tz).context("Invalid --to")?;
                let rows = self.scheduler.utilization_report(from, to, now)?;
                self.emit(&rows, || render::report(&rows, tz))?;
            }
            // Seeding happens before the store is handed to the scheduler.
            Commands::Overview | Commands::Seed => {
                let overview = self.scheduler.overview(now);
                self.emit(&overview, || render::overview(&overview, tz))?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn run_event(&mut self, command: EventCommand) -> Result<ExitCode> {
        let tz = self.config.timezone;

        match command {
            EventCommand::Add {
                title,
                start,
                end,
                description,
            } => {
                let event = NewEvent {
                    title,
                    start: parse_datetime(&start, tz).context("Invalid --start")?,
                    end: parse_datetime(&end, tz).context("Invalid --end")?,
                    description,
                };
                let created = self.scheduler.add_event(event, Utc::now())?;
                self.dirty = true;
                self.emit(&created, || render::event(&created, tz))?;
            }
            EventCommand::Edit {
                id,
                title,
                start,
                end,
                description,
            } => {
                let current = self.scheduler.event(id)?;
                let update = EventUpdate {
                    title: title.unwrap_or(current.title),
                    start: match start {
                        Some(s) => parse_datetime(&s, tz).context("Invalid --start")?,
                        None => current.start,
                    },
                    end: match end {
                        Some(s) => parse_datetime(&s, tz).context("Invalid --end")?,
                        None => current.end,
                    },
                    description: description.or(current.description),
                };
                let outcome = self.scheduler.edit_event(id, update)?;
                match &outcome {
                    EditOutcome::Updated { event } => {
                        self.dirty = true;
                        self.emit(event, || render::event(event, tz))?;
                    }
                    EditOutcome::Blocked { conflicts } => {
                        self.emit(&outcome, || {
                            format!(
                                "Time change would create resource conflicts!\n{}",
                                render::conflicts(conflicts, tz)
                            )
                        })?;
                        return Ok(ExitCode::from(EXIT_BLOCKED));
                    }
                }
            }
            EventCommand::Delete { id } => {
                let released = self.scheduler.delete_event(id)?;
                self.dirty = true;
                let summary = serde_json::json!({ "deleted": id, "allocations_removed": released });
                self.emit(&summary, || {
                    format!("Deleted event #{} ({} allocation(s) removed)", id, released)
                })?;
            }
            EventCommand::List { allocatable } => {
                let events = if allocatable {
                    self.scheduler.allocatable_events(Utc::now())
                } else {
                    self.scheduler.list_events()
                };
                self.emit(&events, || render::events(&events, tz))?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn run_resource(&mut self, command: ResourceCommand) -> Result<ExitCode> {
        match command {
            ResourceCommand::Add { name, kind } => {
                let created = self.scheduler.add_resource(NewResource { name, kind })?;
                self.dirty = true;
                self.emit(&created, || render::resource(&created))?;
            }
            ResourceCommand::Edit { id, name, kind } => {
                let current = self.scheduler.resource(id)?;
                let updated = self.scheduler.edit_resource(
                    id,
                    NewResource {
                        name: name.unwrap_or(current.name),
                        kind: kind.unwrap_or(current.kind),
                    },
                )?;
                self.dirty = true;
                self.emit(&updated, || render::resource(&updated))?;
            }
            ResourceCommand::Delete { id } => {
                let released = self.scheduler.delete_resource(id)?;
                self.dirty = true;
                let summary = serde_json::json!({ "deleted": id, "allocations_removed": released });
                self.emit(&summary, || {
                    format!("Deleted resource #{} ({} allocation(s) removed)", id, released)
                })?;
            }
            ResourceCommand::List => {
                let resources = self.scheduler.list_resources();
                self.emit(&resources, || render::resources(&resources))?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn run_allocation(&mut self, command: AllocationCommand) -> Result<ExitCode> {
        let tz = self.config.timezone;

        match command {
            AllocationCommand::Add { event, resources } => {
                let outcome = self.scheduler.allocate(event, &resources, Utc::now())?;
                match &outcome {
                    AllocationOutcome::Allocated {
                        created,
                        already_present,
                    } => {
                        self.dirty = !created.is_empty();
                        self.emit(&outcome, || {
                            format!(
                                "Resources allocated successfully! ({} new, {} already allocated)",
                                created.len(),
                                already_present.len()
                            )
                        })?;
                    }
                    AllocationOutcome::Blocked { conflicts } => {
                        self.emit(&outcome, || {
                            format!(
                                "Cannot allocate: Resource conflicts detected!\n{}",
                                render::conflicts(conflicts, tz)
                            )
                        })?;
                        return Ok(ExitCode::from(EXIT_BLOCKED));
                    }
                }
            }
            AllocationCommand::Delete { id } => {
                let removed = self.scheduler.deallocate(id)?;
                self.dirty = true;
                self.emit(&removed, || format!("Removed allocation #{}", removed.id))?;
            }
            AllocationCommand::List => {
                let allocations = self.scheduler.list_allocations()?;
                self.emit(&allocations, || render::allocations(&allocations, tz))?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Print `value` as pretty JSON in `--json` mode, otherwise the text form.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        debug!("{} does not exist yet, starting empty", path.display());
        return Ok(MemoryStore::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    MemoryStore::from_json(&json)
        .with_context(|| format!("Failed to load data file: {}", path.display()))
}

/// Write the store next to the target first so a crash cannot truncate the file.
fn save_store(path: &Path, store: &MemoryStore) -> Result<()> {
    let json = store.to_json()?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace data file: {}", path.display()))?;
    debug!("saved {}", path.display());
    Ok(())
}
