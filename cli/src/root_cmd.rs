//! `statdesk root`: configure where the registry lives.
//!
//! ## Commands
//!
//! - `statdesk root set <PATH>`
//! - `statdesk root show`

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use statdesk_core::ConfigStore;

/// Root subcommand group.
#[derive(Debug, Parser)]
pub struct RootCli {
    #[command(subcommand)]
    pub command: RootSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum RootSubcommand {
    /// Record an existing directory as the storage root.
    Set(SetArgs),
    /// Print the configured storage root.
    Show(ShowArgs),
}

#[derive(Debug, Parser)]
pub struct SetArgs {
    /// Directory that holds (or will hold) the project registry.
    pub path: PathBuf,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RootOutcome {
    box_root: PathBuf,
}

impl RootCli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            RootSubcommand::Set(args) => cmd_set(args),
            RootSubcommand::Show(args) => cmd_show(args),
        }
    }
}

fn cmd_set(args: SetArgs) -> anyhow::Result<()> {
    let store = ConfigStore::new()?;
    let root = store.set_root(&args.path)?;
    if args.json {
        crate::print_json(&RootOutcome { box_root: root })?;
    } else {
        println!("storage root set to {}", root.display());
    }
    Ok(())
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let root = ConfigStore::new()?.get_root()?;
    if args.json {
        crate::print_json(&RootOutcome { box_root: root })?;
    } else {
        println!("{}", root.display());
    }
    Ok(())
}
