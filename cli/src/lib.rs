//! `statdesk` command-line interface.
//!
//! Thin dispatch layer over `statdesk-core`: every subcommand resolves
//! the configured storage root, calls one core operation and prints
//! its outcome (one-liner, or the outcome struct as JSON with
//! `--json`).

pub mod project_cmd;
pub mod registry_cmd;
pub mod root_cmd;
pub mod template_cmd;

use clap::Parser;
use clap::Subcommand;
use statdesk_core::ConfigStore;
use statdesk_core::RegistryStore;

/// Project registry tooling for a statistical consulting center.
#[derive(Debug, Parser)]
#[command(name = "statdesk", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure or inspect the storage root.
    Root(root_cmd::RootCli),
    /// Create, update, complete and inspect project records.
    Project(project_cmd::ProjectCli),
    /// Compile the registry CSV snapshot.
    Registry(registry_cmd::RegistryCli),
    /// Generate report and presentation skeletons.
    Template(template_cmd::TemplateCli),
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Root(cmd) => cmd.run(),
            Command::Project(cmd) => cmd.run(),
            Command::Registry(cmd) => cmd.run(),
            Command::Template(cmd) => cmd.run(),
        }
    }
}

/// Open the registry store at the configured root.
pub(crate) fn configured_store() -> anyhow::Result<RegistryStore> {
    let root = ConfigStore::new()?.get_root()?;
    Ok(RegistryStore::new(root))
}

/// Print an outcome struct as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(outcome: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
