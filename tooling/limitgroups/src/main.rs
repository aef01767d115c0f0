//! Limit group CLI tool
//!
//! Adds a worker to the allow or deny list of one or more limit groups.

use anyhow::{Context, Result};
use clap::Parser;
use farm_repository::JsonFileRepository;
use limitgroups::{GroupUpdate, LimitGroupUpdater, Membership};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "farm-limitgroups")]
#[command(about = "Add a worker to limit group allow/deny lists", long_about = None)]
struct Cli {
    /// One or more limit groups separated by a space
    #[arg(long, num_args = 1.., required = true)]
    limitgroups: Vec<String>,

    /// The worker name
    #[arg(long)]
    slave: String,

    /// Add the worker to the exclusion list instead of the inclusion list
    #[arg(long)]
    exclude: bool,

    /// Path to the repository snapshot holding the limit groups
    #[arg(long, env = "FARM_REPOSITORY_FILE", default_value = ".farm/repository.json")]
    repository: PathBuf,

    /// Output logs in JSON format
    #[arg(long, env)]
    log_json: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let store = JsonFileRepository::new(cli.repository.clone());
    let updater = LimitGroupUpdater::new(&store);
    let results = updater
        .add_worker(
            &cli.slave,
            &cli.limitgroups,
            Membership::from_exclude_flag(cli.exclude),
        )
        .with_context(|| format!("Failed to update limit groups in {}", store.path().display()))?;

    let list = if cli.exclude { "excluded" } else { "listed" };
    for result in results {
        match result {
            GroupUpdate::Added(group) => {
                println!("Added {} to {} workers of {}", cli.slave, list, group)
            }
            GroupUpdate::AlreadyPresent(group) => {
                println!("{} already {} in {}", cli.slave, list, group)
            }
            GroupUpdate::NotFound(_) => {}
        }
    }

    Ok(())
}
