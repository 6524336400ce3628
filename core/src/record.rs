//! Project record model.
//!
//! One record describes one consulting project and is stored as one
//! JSON file under `project_registry/`. Field order in the struct is
//! the on-disk field order; absent optional scalars serialize as
//! `null` and empty multi-valued fields as `[]`, so records diff
//! cleanly and hand inspection stays predictable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status value set at creation.
pub const STATUS_INTAKE: &str = "intake";

/// Lifecycle status value set by completion.
pub const STATUS_COMPLETE: &str = "complete";

/// One consulting project, as persisted in the registry.
///
/// `status` is free-form between the `intake`/`complete` lifecycle
/// endpoints; centers track their own intermediate stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Unique key, derived from term/department/contact; also the
    /// record's filename stem.
    pub id: String,

    /// Academic term label, e.g. `2026FA`.
    pub term: String,

    /// ISO date set at creation.
    pub start_date: String,

    /// ISO date set only by completion.
    #[serde(default)]
    pub end_date: Option<String>,

    /// Project category, free-form.
    #[serde(default)]
    pub category: Option<String>,

    /// Short human-readable project name.
    pub project_name: String,

    /// Primary client contact.
    pub contact: String,

    /// Client department.
    pub department: String,

    /// Client organization, when distinct from the department.
    #[serde(default)]
    pub organization: Option<String>,

    /// Lifecycle status; `intake` at creation, `complete` at the end.
    pub status: String,

    /// Assigned consultants, in assignment order (not deduplicated).
    #[serde(default)]
    pub consultants: Vec<String>,

    /// Normalized topic set (order carries no meaning).
    #[serde(default)]
    pub topics: Vec<String>,

    /// Normalized statistical-method set.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Normalized keyword set.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Project abstract.
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,

    /// Project directory, relative to the storage root with `/`
    /// separators, so the registry stays portable across machines.
    #[serde(default)]
    pub project_path: Option<String>,

    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,

    /// RFC3339 UTC timestamp; stamped at creation and refreshed on
    /// every mutation.
    pub updated_at: String,
}

/// Partial update for a record: only populated fields change.
///
/// `id` and `start_date` are immutable after creation; `end_date` is
/// owned by the completion operation.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub term: Option<String>,
    pub category: Option<String>,
    pub project_name: Option<String>,
    pub contact: Option<String>,
    pub department: Option<String>,
    pub organization: Option<String>,
    pub status: Option<String>,
    pub consultants: Option<Vec<String>>,
    pub topics: Option<Vec<String>>,
    pub methods: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub abstract_text: Option<String>,
    /// May be absolute or root-relative on input; the store validates
    /// containment and persists it relative.
    pub project_path: Option<PathBuf>,
    pub notes: Option<String>,
}

impl RecordPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.term.is_none()
            && self.category.is_none()
            && self.project_name.is_none()
            && self.contact.is_none()
            && self.department.is_none()
            && self.organization.is_none()
            && self.status.is_none()
            && self.consultants.is_none()
            && self.topics.is_none()
            && self.methods.is_none()
            && self.keywords.is_none()
            && self.abstract_text.is_none()
            && self.project_path.is_none()
            && self.notes.is_none()
    }
}

/// Normalize a term set: trim, lowercase, drop empties, deduplicate
/// preserving first-seen order.
///
/// Applied to topics, methods, and keywords on every write so the
/// registry never accumulates case or whitespace variants.
pub fn normalize_terms<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        let v = value.as_ref().trim().to_lowercase();
        if !v.is_empty() && !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen
}

/// Union of two term sets under [`normalize_terms`], existing values
/// first, preserving first-seen order.
pub fn merge_terms<S: AsRef<str>, T: AsRef<str>>(existing: &[S], incoming: &[T]) -> Vec<String> {
    let mut merged = normalize_terms(existing);
    for value in normalize_terms(incoming) {
        if !merged.contains(&value) {
            merged.push(value);
        }
    }
    merged
}
