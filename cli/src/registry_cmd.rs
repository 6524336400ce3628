//! `statdesk registry`: compile the per-project records into the CSV
//! snapshot at the storage root.

use clap::Parser;
use clap::Subcommand;
use statdesk_core::ConfigStore;
use statdesk_core::RegistryCompiler;

/// Registry subcommand group.
#[derive(Debug, Parser)]
pub struct RegistryCli {
    #[command(subcommand)]
    pub command: RegistrySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum RegistrySubcommand {
    /// Rebuild project_registry.csv from the record files.
    Build(BuildArgs),
}

#[derive(Debug, Parser)]
pub struct BuildArgs {
    /// Replace an existing snapshot.
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Output the whole table as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

impl RegistryCli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            RegistrySubcommand::Build(args) => cmd_build(args),
        }
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let root = ConfigStore::new()?.get_root()?;
    let table = RegistryCompiler::new(root).compile(args.overwrite)?;

    if args.json {
        crate::print_json(&table)?;
    } else {
        println!(
            "compiled {} records into {}",
            table.rows.len(),
            table.csv_path.display()
        );
    }
    Ok(())
}
