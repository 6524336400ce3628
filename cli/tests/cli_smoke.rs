//! End-to-end tests for the `statdesk` binary.
//!
//! Each test gets its own config file (via `STATDESK_CONFIG`) and its
//! own storage root, so tests never see each other's records.

use std::fs;
use std::path::Path;

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

/// Create a statdesk command with an isolated config file.
fn statdesk_command(config: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("statdesk")?;
    cmd.env("STATDESK_CONFIG", config);
    Ok(cmd)
}

/// Point the config at `root`, creating the directory first.
fn set_root(config: &Path, root: &Path) -> Result<()> {
    fs::create_dir_all(root)?;
    let output = statdesk_command(config)?
        .args(["root", "set"])
        .arg(root)
        .output()?;
    assert!(
        output.status.success(),
        "root set failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

/// Register a fixed sample project and return its id.
fn create_sample_project(config: &Path) -> Result<String> {
    let output = statdesk_command(config)?
        .args([
            "project",
            "create",
            "--term",
            "2026SP",
            "--name",
            "Pollinator Decline Study",
            "--contact",
            "Jane Doe",
            "--department",
            "Biology",
        ])
        .output()?;
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok("2026sp_biology_jane_doe".to_string())
}

#[test]
fn root_set_then_show_roundtrips() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    let root = home.path().join("box");
    set_root(&config, &root)?;

    let output = statdesk_command(&config)?.args(["root", "show"]).output()?;
    assert!(
        output.status.success(),
        "root show failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let shown = String::from_utf8_lossy(&output.stdout);
    assert_eq!(shown.trim(), root.canonicalize()?.display().to_string());
    Ok(())
}

#[test]
fn project_lifecycle_end_to_end() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    let root = home.path().join("box");
    set_root(&config, &root)?;

    let id = create_sample_project(&config)?;
    assert!(
        root.join("project_registry")
            .join(format!("{id}.json"))
            .exists()
    );

    let output = statdesk_command(&config)?
        .args([
            "project",
            "update",
            "--id",
            &id,
            "--topic",
            "ecology",
            "--keyword",
            "bees",
            "--status",
            "analysis",
        ])
        .output()?;
    assert!(
        output.status.success(),
        "update failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = statdesk_command(&config)?
        .args([
            "project",
            "complete",
            "--id",
            &id,
            "--end-date",
            "2026-05-15",
            "--method",
            "ANOVA",
        ])
        .output()?;
    assert!(
        output.status.success(),
        "complete failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = statdesk_command(&config)?
        .args(["project", "show", "--id", &id, "--json"])
        .output()?;
    assert!(output.status.success());
    let record: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(record["status"], "complete");
    assert_eq!(record["end_date"], "2026-05-15");
    assert_eq!(record["methods"][0], "anova");
    assert_eq!(record["keywords"][0], "bees");
    Ok(())
}

#[test]
fn create_reports_outcome_as_json() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    set_root(&config, &home.path().join("box"))?;

    let output = statdesk_command(&config)?
        .args([
            "project",
            "create",
            "--term",
            "2026FA",
            "--name",
            "Sleep Survey",
            "--contact",
            "Ana Ruiz",
            "--department",
            "Psychology",
            "--json",
        ])
        .output()?;
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let outcome: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(outcome["id"], "2026fa_psychology_ana_ruiz");
    assert_eq!(outcome["project_path"], "projects/2026fa_psychology_ana_ruiz");
    Ok(())
}

#[test]
fn create_without_required_flags_fails() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    set_root(&config, &home.path().join("box"))?;

    statdesk_command(&config)?
        .args(["project", "create", "--name", "Orphan"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--contact"));
    Ok(())
}

#[test]
fn unconfigured_root_is_a_clear_error() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");

    let output = statdesk_command(&config)?
        .args(["project", "list"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("no storage root configured"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

#[test]
fn update_with_no_fields_is_rejected() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    set_root(&config, &home.path().join("box"))?;
    let id = create_sample_project(&config)?;

    let output = statdesk_command(&config)?
        .args(["project", "update", "--id", &id])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("no fields"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

#[test]
fn complete_with_bad_date_is_rejected() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    set_root(&config, &home.path().join("box"))?;
    let id = create_sample_project(&config)?;

    let output = statdesk_command(&config)?
        .args([
            "project",
            "complete",
            "--id",
            &id,
            "--end-date",
            "2026-13-99",
            "--method",
            "anova",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("invalid date"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

#[test]
fn registry_build_respects_existing_snapshot() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    let root = home.path().join("box");
    set_root(&config, &root)?;
    create_sample_project(&config)?;

    let output = statdesk_command(&config)?
        .args(["registry", "build"])
        .output()?;
    assert!(
        output.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let csv = fs::read_to_string(root.join("project_registry.csv"))?;
    assert!(csv.starts_with("id,term,start_date"), "header: {csv}");
    assert!(csv.contains("2026sp_biology_jane_doe"));

    // A second build must refuse to clobber the snapshot.
    let output = statdesk_command(&config)?
        .args(["registry", "build"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("already exists"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    statdesk_command(&config)?
        .args(["registry", "build", "--overwrite"])
        .assert()
        .success()
        .stdout(predicates::str::contains("compiled 1 records"));
    Ok(())
}

#[test]
fn template_report_lands_in_the_folder() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("config.json");
    let dir = home.path().join("proj");

    let output = statdesk_command(&config)?
        .args([
            "template",
            "report",
            "--name",
            "Pollinator Decline Study",
            "--contact",
            "Jane Doe",
            "--department",
            "Biology",
            "--consultant",
            "Mae Park",
        ])
        .arg("--dir")
        .arg(&dir)
        .output()?;
    assert!(
        output.status.success(),
        "template failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let doc = fs::read_to_string(dir.join("report.qmd"))?;
    assert!(doc.contains("title: \"Pollinator Decline Study\""));
    assert!(doc.contains("Mae Park"));

    // Re-running must not clobber a report someone may have edited.
    let output = statdesk_command(&config)?
        .args(["template", "report", "--name", "Pollinator Decline Study"])
        .arg("--dir")
        .arg(&dir)
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("already exists"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}
