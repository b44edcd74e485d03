//! # App Switcher CLI Entry Point
//!
//! Command-line host for the usage tracker. Each invocation loads the
//! persisted records, applies one event, saves, and prints the result.
//!
//! ## Usage
//!
//! ```bash
//! # Record a launch
//! appswitch start org.example.mail/.Inbox
//!
//! # Show the most used and recent lists
//! appswitch show
//!
//! # Seed the tracker from a usage-stats dump
//! appswitch import ./usage-stats.json
//!
//! # Forget everything belonging to uninstalled packages
//! appswitch uninstall org.example.mail org.example.maps
//! ```
//!
//! Set `RUST_LOG=debug` to see every recorded event and view rebuild on stderr.

use appswitch::config::Config;
use appswitch::switcher::AppSwitcher;
use appswitch::usage::{
    AppAge, AppIdentity, JsonFileStore, JsonStatsSource, UsageRecord, UsageTracker,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// App Switcher - track the apps you use most and most recently
#[derive(Parser, Debug)]
#[command(name = "appswitch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track most used and recently used applications", long_about = None)]
struct Args {
    /// Directory holding the persisted usage records
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a launch of an application
    Start { identity: AppIdentity },
    /// Record a fresh install
    Install { identity: AppIdentity },
    /// Record an update
    Update { identity: AppIdentity },
    /// Forget one application
    Remove { identity: AppIdentity },
    /// Toggle the pinned flag of an application
    Pin { identity: AppIdentity },
    /// Forget every application belonging to the given packages
    Uninstall {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Replace all records with a usage-stats dump
    Import { file: PathBuf },
    /// Show the most used and recent lists
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show a single application record
    Info { identity: AppIdentity },
    /// Forget all applications
    Reset,
    /// Print the effective configuration
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        save: bool,
    },
}

/// A listed application with its age at display time
#[derive(Debug, Serialize)]
struct ListedApp<'a> {
    #[serde(flatten)]
    record: &'a UsageRecord,
    age: AppAge,
}

#[derive(Debug, Serialize)]
struct ListedViews<'a> {
    most_used: Vec<ListedApp<'a>>,
    recent: Vec<ListedApp<'a>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    if let Command::Config { save } = args.command {
        if save {
            config.save_to(&config_path)?;
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?
        );
        return Ok(());
    }

    let tracker = config
        .build_tracker()
        .with_context(|| format!("Invalid configuration: {}", config_path.display()))?;
    let store = match args.data_dir {
        Some(dir) => JsonFileStore::in_dir(&dir),
        None => JsonFileStore::new()?,
    };

    let mut switcher = AppSwitcher::new(tracker, store);
    switcher.load();

    let now = Utc::now();
    match args.command {
        Command::Start { identity } => {
            let count = switcher.application_started(identity.clone(), now)?;
            println!("{identity}: {count} launch(es)");
        }
        Command::Install { identity } => {
            switcher.application_installed(&identity, now)?;
            println!("{identity}: installed");
        }
        Command::Update { identity } => {
            switcher.application_updated(&identity, now)?;
            println!("{identity}: updated");
        }
        Command::Remove { identity } => match switcher.application_removed(&identity)? {
            Some(_) => println!("{identity}: removed"),
            None => println!("{identity}: not tracked"),
        },
        Command::Pin { identity } => {
            let pinned = switcher.application_pinned(&identity)?;
            let state = if pinned { "pinned" } else { "unpinned" };
            println!("{identity}: {state}");
        }
        Command::Uninstall { packages } => {
            for identity in switcher.packages_removed(packages.as_slice())? {
                println!("{identity}: removed");
            }
        }
        Command::Import { file } => {
            switcher.load_from_stats(&JsonStatsSource::new(file))?;
            println!("Loaded {} application(s)", switcher.tracker().len());
        }
        Command::Show { json } => print_views(switcher.tracker(), now, json)?,
        Command::Info { identity } => match switcher.get(&identity) {
            Some(aged) => print_record(aged.record, aged.age),
            None => println!("{identity}: not tracked"),
        },
        Command::Reset => {
            switcher.reset()?;
            println!("All usage records cleared");
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

fn listed<'a>(
    records: Vec<&'a UsageRecord>,
    tracker: &UsageTracker,
    now: DateTime<Utc>,
) -> Vec<ListedApp<'a>> {
    let window = tracker.settings().frequent_window;
    records
        .into_iter()
        .map(|record| ListedApp {
            record,
            age: record.age_at(now, window),
        })
        .collect()
}

fn print_views(tracker: &UsageTracker, now: DateTime<Utc>, json: bool) -> Result<()> {
    let views = ListedViews {
        most_used: listed(tracker.most_used(), tracker, now),
        recent: listed(tracker.recent(), tracker, now),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&views).context("Failed to serialize views")?
        );
        return Ok(());
    }

    for (title, apps) in [("Most used", &views.most_used), ("Recent", &views.recent)] {
        println!("{title}:");
        if apps.is_empty() {
            println!("  (none)");
        }
        for (idx, app) in apps.iter().enumerate() {
            let pin = if app.record.is_pinned { ", pinned" } else { "" };
            println!(
                "  {}. {} ({} launch(es), {}{})",
                idx + 1,
                app.record.identity,
                app.record.use_count,
                app.age,
                pin
            );
        }
    }
    Ok(())
}

fn print_record(record: &UsageRecord, age: AppAge) {
    println!("{}", record.identity);
    println!("  launches:       {}", record.use_count);
    println!("  last execution: {}", record.last_execution.to_rfc3339());
    println!("  age:            {age}");
    println!("  new:            {}", record.is_new);
    println!("  updated:        {}", record.is_updated);
    println!("  pinned:         {}", record.is_pinned);
}
