//! Project identifier derivation.
//!
//! Identifiers are built from free-text intake fields and double as
//! record filenames, so they must be filesystem-safe and stable:
//! identical inputs on the same calendar day always produce the same
//! id. Term inference is the only time-dependent input, and the date
//! is an explicit parameter so callers (and tests) control it.

use chrono::{Datelike, NaiveDate};

/// Normalize free text into a lowercase, underscore-delimited token.
///
/// Trims the input, lowercases it, collapses every run of
/// non-ASCII-alphanumeric characters to a single `_`, and strips
/// leading/trailing underscores.
///
/// # Examples
///
/// ```
/// use statdesk_core::ident::slug;
///
/// assert_eq!(slug("Biostatistics & Data Science"), "biostatistics_data_science");
/// assert_eq!(slug("  Jane Q. Doe "), "jane_q_doe");
/// assert_eq!(slug("???"), "");
/// ```
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Academic term label for a calendar date.
///
/// Buckets: months 1–5 → `<year>SP`, 6–8 → `<year>SU`,
/// 9–12 → `<year>FA`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use statdesk_core::ident::term_for_date;
///
/// let d = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
/// assert_eq!(term_for_date(d), "2026SU");
/// ```
pub fn term_for_date(date: NaiveDate) -> String {
    let season = match date.month() {
        1..=5 => "SP",
        6..=8 => "SU",
        _ => "FA",
    };
    format!("{}{season}", date.year())
}

/// The term to record: the supplied label when non-blank, otherwise
/// inferred from `today` via [`term_for_date`].
pub fn effective_term(term: Option<&str>, today: NaiveDate) -> String {
    match term {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => term_for_date(today),
    }
}

/// Derive the project id: `slug(term)_slug(department)_slug(contact)`.
///
/// When `term` is absent or blank it is inferred from `today` via
/// [`term_for_date`].
pub fn project_id(term: Option<&str>, department: &str, contact: &str, today: NaiveDate) -> String {
    let term = effective_term(term, today);
    format!("{}_{}_{}", slug(&term), slug(department), slug(contact))
}
