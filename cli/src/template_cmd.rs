//! `statdesk template`: drop Quarto skeletons into a project folder.

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use statdesk_core::TemplateMeta;
use statdesk_core::templates;

/// Template subcommand group.
#[derive(Debug, Parser)]
pub struct TemplateCli {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum TemplateSubcommand {
    /// Write a report skeleton (report.qmd).
    Report(TemplateArgs),
    /// Write a presentation skeleton (presentation.qmd).
    Presentation(TemplateArgs),
}

#[derive(Debug, Parser)]
pub struct TemplateArgs {
    /// Folder the file is written into. Created when missing.
    #[arg(long = "dir")]
    pub dir: PathBuf,

    /// Project name for the document title.
    #[arg(long = "name")]
    pub project_name: String,

    /// Client contact person.
    #[arg(long = "contact")]
    pub contact: Option<String>,

    /// Client department.
    #[arg(long = "department")]
    pub department: Option<String>,

    /// Document author. May be given multiple times.
    #[arg(long = "consultant")]
    pub consultants: Vec<String>,

    /// Front-matter date as YYYY-MM-DD. Defaults to today.
    #[arg(long = "date")]
    pub date: Option<String>,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TemplateOutcome {
    path: PathBuf,
}

impl TemplateCli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            TemplateSubcommand::Report(args) => {
                let (meta, dir, json) = split_args(args);
                finish(templates::write_report(&dir, &meta)?, json)
            }
            TemplateSubcommand::Presentation(args) => {
                let (meta, dir, json) = split_args(args);
                finish(templates::write_presentation(&dir, &meta)?, json)
            }
        }
    }
}

fn split_args(args: TemplateArgs) -> (TemplateMeta, PathBuf, bool) {
    let meta = TemplateMeta {
        project_name: args.project_name,
        contact: args.contact.unwrap_or_default(),
        department: args.department.unwrap_or_default(),
        consultants: args.consultants,
        date: args.date.unwrap_or_else(|| {
            chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
        }),
    };
    (meta, args.dir, args.json)
}

fn finish(path: PathBuf, json: bool) -> anyhow::Result<()> {
    if json {
        crate::print_json(&TemplateOutcome { path })?;
    } else {
        println!("wrote {}", path.display());
    }
    Ok(())
}
