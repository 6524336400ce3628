//! `statdesk project`: record lifecycle subcommands.
//!
//! ## Commands
//!
//! - `statdesk project create --name <NAME> --contact <C> --department <D>`
//! - `statdesk project update --id <ID> [field flags] [--append]`
//! - `statdesk project complete --id <ID> [--end-date <YYYY-MM-DD>]`
//! - `statdesk project show --id <ID>`
//! - `statdesk project list`

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use statdesk_core::CompleteOptions;
use statdesk_core::NewProject;
use statdesk_core::ProjectRecord;
use statdesk_core::RecordPatch;
use statdesk_core::UpdateOptions;

/// Project subcommand group.
#[derive(Debug, Parser)]
pub struct ProjectCli {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectSubcommand {
    /// Register a new project and create its working folder.
    Create(CreateArgs),
    /// Change fields on an existing record.
    Update(UpdateArgs),
    /// Close out a project: stamp the end date, require methods.
    Complete(CompleteArgs),
    /// Print one record.
    Show(ShowArgs),
    /// List all record ids.
    List(ListArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
pub struct CreateArgs {
    /// Project name shown in the registry.
    #[arg(long = "name")]
    pub project_name: String,

    /// Client contact person.
    #[arg(long = "contact")]
    pub contact: String,

    /// Client department.
    #[arg(long = "department")]
    pub department: String,

    /// Academic term label, e.g. 2026SP. Inferred from today when omitted.
    #[arg(long = "term")]
    pub term: Option<String>,

    /// Engagement category.
    #[arg(long = "category")]
    pub category: Option<String>,

    /// Client organization, when not just a department.
    #[arg(long = "organization")]
    pub organization: Option<String>,

    /// Assigned consultant. May be given multiple times.
    #[arg(long = "consultant")]
    pub consultants: Vec<String>,

    /// Project folder, relative to the storage root or absolute inside
    /// it. Defaults to projects/<id>.
    #[arg(long = "path")]
    pub project_path: Option<PathBuf>,

    /// Free-form notes.
    #[arg(long = "notes")]
    pub notes: Option<String>,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct UpdateArgs {
    /// Record id, e.g. 2026sp_biology_jane_doe.
    #[arg(long = "id")]
    pub id: String,

    /// New project name.
    #[arg(long = "name")]
    pub project_name: Option<String>,

    /// New term label.
    #[arg(long = "term")]
    pub term: Option<String>,

    /// New category. An empty value clears the field.
    #[arg(long = "category")]
    pub category: Option<String>,

    /// New contact person.
    #[arg(long = "contact")]
    pub contact: Option<String>,

    /// New department.
    #[arg(long = "department")]
    pub department: Option<String>,

    /// New organization. An empty value clears the field.
    #[arg(long = "organization")]
    pub organization: Option<String>,

    /// New lifecycle status label.
    #[arg(long = "status")]
    pub status: Option<String>,

    /// Replacement consultant list. May be given multiple times.
    #[arg(long = "consultant")]
    pub consultants: Option<Vec<String>>,

    /// Topic tag. May be given multiple times; always replaces.
    #[arg(long = "topic")]
    pub topics: Option<Vec<String>>,

    /// Statistical method. May be given multiple times.
    #[arg(long = "method")]
    pub methods: Option<Vec<String>>,

    /// Keyword. May be given multiple times.
    #[arg(long = "keyword")]
    pub keywords: Option<Vec<String>>,

    /// Project abstract. An empty value clears the field.
    #[arg(long = "abstract")]
    pub abstract_text: Option<String>,

    /// New project folder (must stay inside the storage root).
    #[arg(long = "path")]
    pub project_path: Option<PathBuf>,

    /// New notes. An empty value clears the field.
    #[arg(long = "notes")]
    pub notes: Option<String>,

    /// Merge keywords/methods into the stored lists instead of
    /// replacing them.
    #[arg(long = "append")]
    pub append: bool,

    /// Write even if the record changed on disk since it was read.
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CompleteArgs {
    /// Record id.
    #[arg(long = "id")]
    pub id: String,

    /// Completion date as YYYY-MM-DD. Defaults to today.
    #[arg(long = "end-date")]
    pub end_date: Option<String>,

    /// Method used, merged into the record. May be given multiple times.
    #[arg(long = "method")]
    pub methods: Vec<String>,

    /// Write even if the record changed on disk since it was read.
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Record id.
    #[arg(long = "id")]
    pub id: String,

    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Output as JSON.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

impl ProjectCli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            ProjectSubcommand::Create(args) => cmd_create(args),
            ProjectSubcommand::Update(args) => cmd_update(args),
            ProjectSubcommand::Complete(args) => cmd_complete(args),
            ProjectSubcommand::Show(args) => cmd_show(args),
            ProjectSubcommand::List(args) => cmd_list(args),
        }
    }
}

fn cmd_create(args: CreateArgs) -> anyhow::Result<()> {
    let store = crate::configured_store()?;
    let outcome = store.create(NewProject {
        term: args.term,
        project_name: args.project_name,
        contact: args.contact,
        department: args.department,
        organization: args.organization,
        category: args.category,
        consultants: args.consultants,
        project_path: args.project_path,
        notes: args.notes,
    })?;

    if args.json {
        crate::print_json(&outcome)?;
    } else {
        println!(
            "registered {} (folder: {})",
            outcome.id, outcome.project_path
        );
    }
    Ok(())
}

fn cmd_update(args: UpdateArgs) -> anyhow::Result<()> {
    let store = crate::configured_store()?;
    let patch = RecordPatch {
        term: args.term,
        category: args.category,
        project_name: args.project_name,
        contact: args.contact,
        department: args.department,
        organization: args.organization,
        status: args.status,
        consultants: args.consultants,
        topics: args.topics,
        methods: args.methods,
        keywords: args.keywords,
        abstract_text: args.abstract_text,
        project_path: args.project_path,
        notes: args.notes,
    };
    let opts = UpdateOptions {
        append: args.append,
        overwrite: args.overwrite,
    };
    let outcome = store.update(&args.id, patch, opts)?;

    if args.json {
        crate::print_json(&outcome)?;
    } else {
        println!(
            "updated {}: {}",
            outcome.id,
            outcome.updated_fields.join(", ")
        );
    }
    Ok(())
}

fn cmd_complete(args: CompleteArgs) -> anyhow::Result<()> {
    let store = crate::configured_store()?;
    let outcome = store.complete(
        &args.id,
        CompleteOptions {
            end_date: args.end_date,
            methods: args.methods,
            overwrite: args.overwrite,
        },
    )?;

    if args.json {
        crate::print_json(&outcome)?;
    } else {
        println!(
            "completed {} on {} (methods: {})",
            outcome.id,
            outcome.end_date,
            outcome.methods.join(", ")
        );
    }
    Ok(())
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let store = crate::configured_store()?;
    let record = store.load(&args.id)?;

    if args.json {
        crate::print_json(&record)?;
    } else {
        print_record(&record);
    }
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let store = crate::configured_store()?;
    let ids = store.list_ids()?;

    if args.json {
        crate::print_json(&ids)?;
    } else if ids.is_empty() {
        println!("no projects registered");
    } else {
        for id in ids {
            println!("{id}");
        }
    }
    Ok(())
}

fn print_record(record: &ProjectRecord) {
    println!("{} ({})", record.id, record.project_name);
    println!("  term:        {}", record.term);
    println!("  status:      {}", record.status);
    println!(
        "  contact:     {} ({})",
        record.contact, record.department
    );
    if let Some(org) = &record.organization {
        println!("  organization: {org}");
    }
    println!("  started:     {}", record.start_date);
    if let Some(end) = &record.end_date {
        println!("  ended:       {end}");
    }
    if !record.consultants.is_empty() {
        println!("  consultants: {}", record.consultants.join(", "));
    }
    if !record.topics.is_empty() {
        println!("  topics:      {}", record.topics.join(", "));
    }
    if !record.methods.is_empty() {
        println!("  methods:     {}", record.methods.join(", "));
    }
    if !record.keywords.is_empty() {
        println!("  keywords:    {}", record.keywords.join(", "));
    }
    if let Some(path) = &record.project_path {
        println!("  folder:      {path}");
    }
    if let Some(notes) = &record.notes {
        println!("  notes:       {notes}");
    }
}
