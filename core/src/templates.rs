//! Quarto skeletons for consulting deliverables.
//!
//! Two generators: a written report and a revealjs slide deck. Both
//! take the project facts as explicit inputs and refuse to clobber an
//! existing file; the choice of output directory belongs to the
//! caller.

use std::path::Path;
use std::path::PathBuf;

use crate::error::Result;
use crate::error::StatdeskError;
use crate::fsio;

/// Report skeleton file name.
pub const REPORT_FILENAME: &str = "report.qmd";
/// Presentation skeleton file name.
pub const PRESENTATION_FILENAME: &str = "presentation.qmd";

/// Facts stamped into a generated document.
#[derive(Debug, Clone, Default)]
pub struct TemplateMeta {
    pub project_name: String,
    pub contact: String,
    pub department: String,
    /// Listed as document authors, joined with `", "`.
    pub consultants: Vec<String>,
    /// ISO date shown in the front matter.
    pub date: String,
}

impl TemplateMeta {
    fn author_line(&self) -> String {
        self.consultants.join(", ")
    }
}

/// Write the consulting-report skeleton into `dir` as `report.qmd`.
pub fn write_report(dir: &Path, meta: &TemplateMeta) -> Result<PathBuf> {
    require_name(meta)?;
    let mut doc = front_matter(meta);
    doc.push_str("format:\n");
    doc.push_str("  html:\n");
    doc.push_str("    toc: true\n");
    doc.push_str("    embed-resources: true\n");
    doc.push_str("---\n\n");
    doc.push_str("## Background\n\n");
    doc.push_str(&format!(
        "*Client:* {} ({})\n\n",
        meta.contact, meta.department
    ));
    doc.push_str("<!-- What question is the client trying to answer? -->\n\n");
    doc.push_str("## Data\n\n");
    doc.push_str("<!-- Source, collection period, unit of observation, cleaning steps. -->\n\n");
    doc.push_str("## Methods\n\n");
    doc.push_str("<!-- Models fitted, assumptions checked, software used. -->\n\n");
    doc.push_str("## Results\n\n");
    doc.push_str("## Recommendations\n\n");
    doc.push_str("## References\n");

    write_fresh(dir, REPORT_FILENAME, &doc)
}

/// Write the revealjs presentation skeleton into `dir` as
/// `presentation.qmd`.
pub fn write_presentation(dir: &Path, meta: &TemplateMeta) -> Result<PathBuf> {
    require_name(meta)?;
    let mut doc = front_matter(meta);
    doc.push_str("format:\n");
    doc.push_str("  revealjs:\n");
    doc.push_str("    slide-number: true\n");
    doc.push_str("---\n\n");
    doc.push_str("## Background\n\n");
    doc.push_str(&format!(
        "- Client: {}, {}\n\n",
        meta.contact, meta.department
    ));
    doc.push_str("## Data\n\n");
    doc.push_str("## Methods\n\n");
    doc.push_str("## Results\n\n");
    doc.push_str("## Recommendations\n\n");
    doc.push_str("## Questions?\n");

    write_fresh(dir, PRESENTATION_FILENAME, &doc)
}

fn front_matter(meta: &TemplateMeta) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", yaml_quote(&meta.project_name)));
    out.push_str(&format!("author: {}\n", yaml_quote(&meta.author_line())));
    out.push_str(&format!("date: {}\n", yaml_quote(&meta.date)));
    out
}

fn require_name(meta: &TemplateMeta) -> Result<()> {
    if meta.project_name.trim().is_empty() {
        return Err(StatdeskError::validation(
            "project_name",
            "must not be empty",
        ));
    }
    Ok(())
}

/// Double-quoted YAML scalar.
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn write_fresh(dir: &Path, filename: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(filename);
    if path.exists() {
        return Err(StatdeskError::AlreadyExists { path });
    }
    std::fs::create_dir_all(dir).map_err(|e| StatdeskError::io(dir, e))?;
    fsio::write_atomic(&path, body.as_bytes())?;
    tracing::info!(path = %path.display(), "wrote template");
    Ok(path)
}
