//! Registry compiler: flatten every record into one CSV snapshot.
//!
//! Field extraction is deliberately schema-bound rather than general:
//! a scalar column takes a JSON string, an array column takes an array
//! of strings, and any other shape reads as a missing value instead of
//! an error. Hand-edited or partially-populated records therefore
//! degrade to blank cells, never to a failed build. Unknown top-level
//! keys become extra columns after the schema ones, in first-seen
//! order.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::error::StatdeskError;
use crate::fsio;

use super::REGISTRY_DIR_NAME;

/// Snapshot file name, directly under the storage root.
pub const SNAPSHOT_FILENAME: &str = "project_registry.csv";

/// Schema columns in output order. Extra keys found in records follow.
const PREFERRED_COLUMNS: [&str; 18] = [
    "id",
    "term",
    "start_date",
    "end_date",
    "category",
    "project_name",
    "contact",
    "department",
    "organization",
    "status",
    "consultants",
    "topics",
    "methods",
    "keywords",
    "abstract",
    "project_path",
    "notes",
    "updated_at",
];

/// Schema columns whose JSON shape is an array of strings.
const ARRAY_COLUMNS: [&str; 4] = ["consultants", "topics", "methods", "keywords"];

/// The compiled snapshot: header, rows in record-file order, and where
/// the CSV landed.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub csv_path: PathBuf,
}

/// Builds the CSV snapshot from the per-project records.
pub struct RegistryCompiler {
    root: PathBuf,
}

impl RegistryCompiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/project_registry.csv`.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILENAME)
    }

    /// Compile every record into one table and write it as CSV.
    ///
    /// Fails with `EmptyRegistry` when there are no records at all and
    /// with `AlreadyExists` when the snapshot is present and
    /// `overwrite` is false.
    pub fn compile(&self, overwrite: bool) -> Result<RegistryTable> {
        let files = self.record_files()?;

        let mut extra_columns: Vec<String> = Vec::new();
        let mut cell_maps: Vec<HashMap<String, String>> = Vec::new();
        for path in &files {
            cell_maps.push(extract_record(path, &mut extra_columns)?);
        }

        let mut columns: Vec<String> = PREFERRED_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        columns.extend(extra_columns);

        let rows: Vec<Vec<String>> = cell_maps
            .into_iter()
            .map(|cells| {
                columns
                    .iter()
                    .map(|column| cells.get(column).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        let csv_path = self.snapshot_path();
        if csv_path.exists() && !overwrite {
            return Err(StatdeskError::AlreadyExists { path: csv_path });
        }
        let csv = render_csv(&columns, &rows);
        fsio::write_atomic(&csv_path, csv.as_bytes())?;
        tracing::info!(
            rows = rows.len(),
            columns = columns.len(),
            path = %csv_path.display(),
            "compiled registry snapshot"
        );

        Ok(RegistryTable {
            columns,
            rows,
            csv_path,
        })
    }

    /// `*.json` files directly under the registry directory, sorted by
    /// filename. No recursion.
    fn record_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(REGISTRY_DIR_NAME);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StatdeskError::EmptyRegistry { dir });
            }
            Err(e) => return Err(StatdeskError::io(&dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StatdeskError::io(&dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(StatdeskError::EmptyRegistry { dir });
        }
        files.sort();
        Ok(files)
    }
}

/// Pull one record file into a column → cell map, registering unknown
/// keys into `extra_columns` as they are first seen. A file that does
/// not hold a JSON object contributes only its filename-stem id.
fn extract_record(path: &Path, extra_columns: &mut Vec<String>) -> Result<HashMap<String, String>> {
    let data = std::fs::read_to_string(path).map_err(|e| StatdeskError::io(path, e))?;
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut cells = HashMap::new();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&data) {
        for (key, value) in &map {
            if !PREFERRED_COLUMNS.contains(&key.as_str())
                && !extra_columns.iter().any(|c| c == key)
            {
                extra_columns.push(key.clone());
            }
            if let Some(cell) = extract_cell(key, value) {
                cells.insert(key.clone(), cell);
            }
        }
    }
    if cells.get("id").is_none_or(|id| id.is_empty()) {
        cells.insert("id".to_string(), stem);
    }
    Ok(cells)
}

/// Schema-bound cell extraction. `None` means the value's shape is not
/// understood for this key and the cell reads blank.
fn extract_cell(key: &str, value: &Value) -> Option<String> {
    let known_scalar = PREFERRED_COLUMNS.contains(&key) && !ARRAY_COLUMNS.contains(&key);
    let known_array = ARRAY_COLUMNS.contains(&key);
    match value {
        Value::String(s) if !known_array => Some(s.clone()),
        Value::Array(items) if !known_scalar => Some(flatten(items)),
        _ => None,
    }
}

/// One display string per multi-valued cell: string elements only,
/// exact duplicates dropped, joined `"; "`.
fn flatten(items: &[Value]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for item in items {
        if let Value::String(s) = item
            && !seen.contains(&s.as_str())
        {
            seen.push(s);
        }
    }
    seen.join("; ")
}

fn render_csv(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| csv_field(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            row.iter()
                .map(|cell| csv_field(cell))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// RFC-4180-style quoting: quote when the value carries a comma, quote
/// or line break, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn write_record(root: &Path, name: &str, value: Value) {
        let dir = root.join(REGISTRY_DIR_NAME);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{name}.json")),
            serde_json::to_string_pretty(&value).unwrap(),
        )
        .unwrap();
    }

    fn col(table: &RegistryTable, name: &str) -> usize {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .unwrap_or_else(|| panic!("missing column {name}"))
    }

    #[test]
    fn compile_flattens_multi_valued_fields() {
        let tmp = TempDir::new().unwrap();
        write_record(
            tmp.path(),
            "a",
            json!({"id": "a", "keywords": ["x", "x", "y"]}),
        );
        write_record(tmp.path(), "b", json!({"id": "b", "keywords": ["z"]}));
        write_record(tmp.path(), "c", json!({"id": "c"}));

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        let kw = col(&table, "keywords");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][kw], "x; y");
        assert_eq!(table.rows[1][kw], "z");
        assert_eq!(table.rows[2][kw], "");
        // never ragged: every declared column in every row
        for row in &table.rows {
            assert_eq!(row.len(), table.columns.len());
        }
        for name in PREFERRED_COLUMNS {
            col(&table, name);
        }
    }

    #[test]
    fn compile_missing_or_empty_dir_is_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let err = RegistryCompiler::new(tmp.path()).compile(false).unwrap_err();
        assert!(matches!(err, StatdeskError::EmptyRegistry { .. }));

        std::fs::create_dir_all(tmp.path().join(REGISTRY_DIR_NAME)).unwrap();
        let err = RegistryCompiler::new(tmp.path()).compile(false).unwrap_err();
        assert!(matches!(err, StatdeskError::EmptyRegistry { .. }));
    }

    #[test]
    fn compile_refuses_existing_snapshot_unless_overwrite() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "a", json!({"id": "a"}));
        let compiler = RegistryCompiler::new(tmp.path());
        compiler.compile(false).unwrap();

        let err = compiler.compile(false).unwrap_err();
        assert!(matches!(err, StatdeskError::AlreadyExists { .. }));
        compiler.compile(true).unwrap();
    }

    #[test]
    fn compile_blanks_unsupported_shapes() {
        let tmp = TempDir::new().unwrap();
        write_record(
            tmp.path(),
            "odd",
            json!({
                "id": "odd",
                "category": 5,
                "notes": {"nested": true},
                "topics": "not-an-array",
                "status": ["not-a-scalar"],
                "methods": ["anova", 7, "glm"],
            }),
        );

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        let row = &table.rows[0];
        assert_eq!(row[col(&table, "category")], "");
        assert_eq!(row[col(&table, "notes")], "");
        assert_eq!(row[col(&table, "topics")], "");
        assert_eq!(row[col(&table, "status")], "");
        // non-string elements are skipped, not fatal
        assert_eq!(row[col(&table, "methods")], "anova; glm");
    }

    #[test]
    fn compile_unparseable_file_contributes_stub_row() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(REGISTRY_DIR_NAME);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("2026sp_broken_file.json"), "not json {{{").unwrap();

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        let row = &table.rows[0];
        assert_eq!(row[col(&table, "id")], "2026sp_broken_file");
        assert_eq!(row[col(&table, "term")], "");
        assert_eq!(row[col(&table, "project_name")], "");
    }

    #[test]
    fn compile_id_falls_back_to_filename_stem() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "stemmed", json!({"term": "2026SP"}));

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        assert_eq!(table.rows[0][col(&table, "id")], "stemmed");
    }

    #[test]
    fn compile_appends_extra_columns_in_first_seen_order() {
        let tmp = TempDir::new().unwrap();
        write_record(
            tmp.path(),
            "a",
            json!({"id": "a", "grant": "NSF-1234", "irb": "exempt"}),
        );
        write_record(tmp.path(), "b", json!({"id": "b", "cohort": ["fall", "spring"]}));

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        let n = PREFERRED_COLUMNS.len();
        assert_eq!(&table.columns[n..], &["grant", "irb", "cohort"]);
        assert_eq!(table.rows[0][col(&table, "grant")], "NSF-1234");
        assert_eq!(table.rows[1][col(&table, "cohort")], "fall; spring");
        assert_eq!(table.rows[1][col(&table, "grant")], "");
    }

    #[test]
    fn compile_orders_rows_by_filename() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), "zzz", json!({"id": "zzz"}));
        write_record(tmp.path(), "aaa", json!({"id": "aaa"}));

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        let id = col(&table, "id");
        assert_eq!(table.rows[0][id], "aaa");
        assert_eq!(table.rows[1][id], "zzz");
    }

    #[test]
    fn csv_quoting_escapes_commas_and_quotes() {
        let tmp = TempDir::new().unwrap();
        write_record(
            tmp.path(),
            "q",
            json!({"id": "q", "project_name": "Cells, \"quoted\""}),
        );

        let table = RegistryCompiler::new(tmp.path()).compile(false).unwrap();
        let csv = std::fs::read_to_string(&table.csv_path).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,term,start_date,"));
        assert!(csv.contains("\"Cells, \"\"quoted\"\"\""));
        assert!(csv.ends_with('\n'));
    }
}
