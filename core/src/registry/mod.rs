//! Flat-file project registry: one JSON document per engagement.
//!
//! ## Layout
//!
//! ```text
//! <box_root>/
//!   project_registry/
//!     2026sp_biology_jane_doe.json     one record per project
//!   project_registry.csv               compiled snapshot (see `compile`)
//!   projects/
//!     2026sp_biology_jane_doe/         working folder, created at intake
//! ```
//!
//! Records are read and written whole. Every write goes through a temp
//! file and rename, and `update`/`complete` compare the file's mtime
//! against the value captured at load so an interleaved writer is
//! detected rather than silently clobbered.

pub mod compile;

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::NaiveDate;
use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::error::StatdeskError;
use crate::fsio;
use crate::ident;
use crate::record::ProjectRecord;
use crate::record::RecordPatch;
use crate::record::STATUS_COMPLETE;
use crate::record::STATUS_INTAKE;
use crate::record::merge_terms;
use crate::record::normalize_terms;

/// Directory under the storage root holding the per-project JSON records.
pub const REGISTRY_DIR_NAME: &str = "project_registry";

/// Intake fields for a new engagement. `project_name`, `contact` and
/// `department` are required. Topics, methods, keywords and the
/// abstract always start empty and are filled in later through
/// [`RegistryStore::update`].
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    /// Academic term label, e.g. `2026SP`. Inferred from today when absent.
    pub term: Option<String>,
    pub project_name: String,
    pub contact: String,
    pub department: String,
    pub organization: Option<String>,
    pub category: Option<String>,
    pub consultants: Vec<String>,
    /// Working folder for the project. Defaults to `projects/<id>` under
    /// the storage root; explicit paths must resolve inside the root.
    pub project_path: Option<PathBuf>,
    pub notes: Option<String>,
}

/// Knobs for [`RegistryStore::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Merge supplied keywords/methods into the stored lists instead of
    /// replacing them. Topics always replace.
    pub append: bool,
    /// Skip the concurrent-modification check.
    pub overwrite: bool,
}

/// Knobs for [`RegistryStore::complete`].
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    /// Completion date as `YYYY-MM-DD`. Defaults to today.
    pub end_date: Option<String>,
    /// Methods to merge into the record before closing it out.
    pub methods: Vec<String>,
    /// Skip the concurrent-modification check.
    pub overwrite: bool,
}

/// What `create` produced, for display or `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    pub id: String,
    /// Project folder relative to the storage root, `/`-separated.
    pub project_path: String,
    pub registry_file: PathBuf,
}

/// What `update` changed.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub id: String,
    pub updated_fields: Vec<String>,
    pub registry_file: PathBuf,
}

/// What `complete` recorded.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteOutcome {
    pub id: String,
    pub end_date: String,
    pub methods: Vec<String>,
    pub registry_file: PathBuf,
}

/// Store rooted at a validated storage root (see `ConfigStore::get_root`).
pub struct RegistryStore {
    root: PathBuf,
}

impl RegistryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root this store operates under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/project_registry`.
    pub fn registry_dir(&self) -> PathBuf {
        self.root.join(REGISTRY_DIR_NAME)
    }

    /// `<root>/project_registry/<id>.json`.
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.registry_dir().join(format!("{id}.json"))
    }

    // ── Lifecycle operations ─────────────────────────────────────────────

    /// Register a new project: derive its id, refuse duplicates, create
    /// the working folder and write the intake record.
    pub fn create(&self, intake: NewProject) -> Result<CreateOutcome> {
        require_non_blank("project_name", &intake.project_name)?;
        require_non_blank("contact", &intake.contact)?;
        require_non_blank("department", &intake.department)?;
        require_sluggable("contact", &intake.contact)?;
        require_sluggable("department", &intake.department)?;

        let today = Utc::now().date_naive();
        let term = ident::effective_term(intake.term.as_deref(), today);
        require_sluggable("term", &term)?;
        let id = ident::project_id(Some(&term), &intake.department, &intake.contact, today);

        let path = self.record_path(&id);
        if path.exists() {
            return Err(StatdeskError::DuplicateRecord { id, path });
        }

        let project_path = match &intake.project_path {
            Some(explicit) => self.relative_inside_root(explicit)?,
            None => format!("projects/{id}"),
        };
        let project_dir = self.root.join(&project_path);
        std::fs::create_dir_all(&project_dir)
            .map_err(|e| StatdeskError::io(&project_dir, e))?;

        let record = ProjectRecord {
            id: id.clone(),
            term,
            start_date: today.format("%Y-%m-%d").to_string(),
            end_date: None,
            category: intake.category.and_then(non_blank),
            project_name: intake.project_name.trim().to_string(),
            contact: intake.contact.trim().to_string(),
            department: intake.department.trim().to_string(),
            organization: intake.organization.and_then(non_blank),
            status: STATUS_INTAKE.to_string(),
            consultants: tidy_names(intake.consultants),
            topics: Vec::new(),
            methods: Vec::new(),
            keywords: Vec::new(),
            abstract_text: None,
            project_path: Some(project_path.clone()),
            notes: intake.notes.and_then(non_blank),
            updated_at: Utc::now().to_rfc3339(),
        };
        let registry_file = self.write_record(&record)?;
        tracing::info!(id = %record.id, "registered project");

        Ok(CreateOutcome {
            id: record.id,
            project_path,
            registry_file,
        })
    }

    /// Apply a partial patch to an existing record. Only fields carried
    /// by the patch change; the id never does.
    pub fn update(
        &self,
        id: &str,
        patch: RecordPatch,
        opts: UpdateOptions,
    ) -> Result<UpdateOutcome> {
        let (mut record, read_at) = self.load_with_mtime(id)?;
        if patch.is_empty() {
            return Err(StatdeskError::NoOp);
        }

        let mut updated: Vec<String> = Vec::new();
        let mut touch = |field: &str| updated.push(field.to_string());

        if let Some(term) = patch.term {
            require_non_blank("term", &term)?;
            record.term = term.trim().to_string();
            touch("term");
        }
        if let Some(category) = patch.category {
            record.category = non_blank(category);
            touch("category");
        }
        if let Some(project_name) = patch.project_name {
            require_non_blank("project_name", &project_name)?;
            record.project_name = project_name.trim().to_string();
            touch("project_name");
        }
        if let Some(contact) = patch.contact {
            require_non_blank("contact", &contact)?;
            record.contact = contact.trim().to_string();
            touch("contact");
        }
        if let Some(department) = patch.department {
            require_non_blank("department", &department)?;
            record.department = department.trim().to_string();
            touch("department");
        }
        if let Some(organization) = patch.organization {
            record.organization = non_blank(organization);
            touch("organization");
        }
        if let Some(status) = patch.status {
            // Free-form lifecycle label; `complete` is normally set via
            // `complete`, but the store does not police intermediate states.
            require_non_blank("status", &status)?;
            record.status = status.trim().to_string();
            touch("status");
        }
        if let Some(consultants) = patch.consultants {
            record.consultants = tidy_names(consultants);
            touch("consultants");
        }
        if let Some(topics) = patch.topics {
            // Topics replace wholesale regardless of append mode.
            record.topics = normalize_terms(&topics);
            touch("topics");
        }
        if let Some(methods) = patch.methods {
            record.methods = if opts.append {
                merge_terms(&record.methods, &methods)
            } else {
                normalize_terms(&methods)
            };
            touch("methods");
        }
        if let Some(keywords) = patch.keywords {
            record.keywords = if opts.append {
                merge_terms(&record.keywords, &keywords)
            } else {
                normalize_terms(&keywords)
            };
            touch("keywords");
        }
        if let Some(abstract_text) = patch.abstract_text {
            record.abstract_text = non_blank(abstract_text);
            touch("abstract");
        }
        if let Some(project_path) = patch.project_path {
            record.project_path = Some(self.relative_inside_root(&project_path)?);
            touch("project_path");
        }
        if let Some(notes) = patch.notes {
            record.notes = non_blank(notes);
            touch("notes");
        }

        record.updated_at = Utc::now().to_rfc3339();
        if !opts.overwrite {
            self.check_unmodified(id, read_at)?;
        }
        let registry_file = self.write_record(&record)?;
        tracing::info!(id = %record.id, fields = ?updated, "updated project record");

        Ok(UpdateOutcome {
            id: record.id,
            updated_fields: updated,
            registry_file,
        })
    }

    /// Close out a project: merge any supplied methods, stamp the end
    /// date and flip the status to `complete`.
    pub fn complete(&self, id: &str, opts: CompleteOptions) -> Result<CompleteOutcome> {
        let (mut record, read_at) = self.load_with_mtime(id)?;

        let methods = merge_terms(&record.methods, &opts.methods);
        if methods.is_empty() {
            return Err(StatdeskError::MissingMethods { id: id.to_string() });
        }
        let end_date = match opts.end_date.as_deref() {
            Some(raw) => parse_iso_date(raw)?,
            None => Utc::now().date_naive(),
        }
        .format("%Y-%m-%d")
        .to_string();

        record.methods = methods.clone();
        record.end_date = Some(end_date.clone());
        record.status = STATUS_COMPLETE.to_string();
        record.updated_at = Utc::now().to_rfc3339();

        if !opts.overwrite {
            self.check_unmodified(id, read_at)?;
        }
        let registry_file = self.write_record(&record)?;
        tracing::info!(id = %record.id, end_date = %end_date, "completed project");

        Ok(CompleteOutcome {
            id: record.id,
            end_date,
            methods,
            registry_file,
        })
    }

    // ── Read operations ──────────────────────────────────────────────────

    /// Load a record by id.
    pub fn load(&self, id: &str) -> Result<ProjectRecord> {
        self.load_with_mtime(id).map(|(record, _)| record)
    }

    /// Ids of all records on disk, sorted. Missing registry directory
    /// reads as empty.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let dir = self.registry_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StatdeskError::io(&dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StatdeskError::io(&dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Read a record and the file mtime observed while reading. The
    /// mtime is the guard token for [`Self::check_unmodified`].
    fn load_with_mtime(&self, id: &str) -> Result<(ProjectRecord, SystemTime)> {
        let path = self.record_path(id);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StatdeskError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(StatdeskError::io(&path, e)),
        };
        let record: ProjectRecord =
            serde_json::from_str(&data).map_err(|e| StatdeskError::Corrupted {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let read_at = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|e| StatdeskError::io(&path, e))?;
        Ok((record, read_at))
    }

    /// Fail with `ConcurrentModification` when the record file changed
    /// (or vanished) since `read_at` was captured.
    fn check_unmodified(&self, id: &str, read_at: SystemTime) -> Result<()> {
        let path = self.record_path(id);
        let current = match std::fs::metadata(&path) {
            Ok(meta) => meta.modified().map_err(|e| StatdeskError::io(&path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StatdeskError::ConcurrentModification { id: id.to_string() });
            }
            Err(e) => return Err(StatdeskError::io(&path, e)),
        };
        if current != read_at {
            return Err(StatdeskError::ConcurrentModification { id: id.to_string() });
        }
        Ok(())
    }

    fn write_record(&self, record: &ProjectRecord) -> Result<PathBuf> {
        let dir = self.registry_dir();
        std::fs::create_dir_all(&dir).map_err(|e| StatdeskError::io(&dir, e))?;
        let path = self.record_path(&record.id);
        let json = serde_json::to_string_pretty(record)?;
        fsio::write_atomic(&path, json.as_bytes())?;
        Ok(path)
    }

    /// Express `path` relative to the storage root, `/`-separated.
    /// Relative inputs are taken as already root-relative; absolute
    /// inputs must land inside the root once `.`/`..` are resolved.
    fn relative_inside_root(&self, path: &Path) -> Result<String> {
        let root = self
            .root
            .canonicalize()
            .map_err(|e| StatdeskError::io(&self.root, e))?;
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        let normalized = lexical_normalize(&joined);
        // Resolve symlinks for targets that already exist; a path yet to
        // be created keeps its lexical form.
        let resolved = normalized.canonicalize().unwrap_or(normalized);
        let rel = resolved
            .strip_prefix(&root)
            .map_err(|_| StatdeskError::PathOutsideRoot {
                path: resolved.clone(),
                root: root.clone(),
            })?;

        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            return Ok(".".to_string());
        }
        Ok(parts.join("/"))
    }
}

/// Drop `.` components and resolve `..` against what came before,
/// without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| StatdeskError::InvalidDate {
        value: raw.trim().to_string(),
    })
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StatdeskError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// The id is built from slugs; a value whose slug is empty (no letters
/// or digits at all) would leave a hole in it.
fn require_sluggable(field: &str, value: &str) -> Result<()> {
    if ident::slug(value).is_empty() {
        return Err(StatdeskError::validation(
            field,
            "must contain at least one letter or digit",
        ));
    }
    Ok(())
}

/// `Some(value)` trimmed, or `None` when the value is blank. An empty
/// string in a patch clears the field.
fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim entries and drop blanks, preserving order and case. Used for
/// consultant names, which are display text rather than index terms.
fn tidy_names(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
