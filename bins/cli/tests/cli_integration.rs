//! CLI integration tests.

use hwt_testkit::fixtures::{LEGACY_COLLAPSE_KEY, export_document};
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> Result<PathBuf, Box<dyn Error>> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    Ok(std::env::temp_dir().join(format!("hwt-cli-{label}-{nanos}.json")))
}

fn command(storage: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_hwt"));
    command
        .arg("--storage")
        .arg(storage)
        .env_remove("HWT_STORAGE_PATH")
        .env_remove("HWT_STORAGE_READONLY")
        .env_remove("HWT_LOG")
        .env_remove("RUST_LOG");
    command
}

fn run_cli(storage: &Path, args: &[&str]) -> std::io::Result<Output> {
    command(storage).args(args).output()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn cli_version_runs() -> Result<(), Box<dyn Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_hwt"))
        .arg("--version")
        .output()?;
    assert!(output.status.success(), "--version failed: {}", stderr(&output));
    assert!(stdout(&output).starts_with("hwt "));
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn set_get_reset_round_trip() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("set-get")?;

    let output = run_cli(&storage, &["config", "set", "thresholds", "lowScoreThreshold", "-12"])?;
    assert!(output.status.success(), "set failed: {}", stderr(&output));

    let output = run_cli(&storage, &["config", "get", "thresholds", "lowScoreThreshold"])?;
    assert_eq!(stdout(&output), "-12\n");

    let output = run_cli(&storage, &["config", "export"])?;
    let exported: serde_json::Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(exported, serde_json::json!({"thresholds": {"lowScoreThreshold": -12}}));

    let output = run_cli(&storage, &["config", "reset", "thresholds", "lowScoreThreshold"])?;
    assert!(output.status.success(), "reset failed: {}", stderr(&output));
    let output = run_cli(&storage, &["config", "export"])?;
    assert_eq!(stdout(&output), "{}\n");

    std::fs::remove_file(&storage)?;
    Ok(())
}

#[test]
fn invalid_input_exits_with_two() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("invalid")?;
    for args in [
        &["config", "get", "colors", "collapse"][..],
        &["config", "set", "features", "collapse", "1"][..],
        &["config", "set", "features", "collapse", "not-json"][..],
        &["feature", "collapse", "--site", "reddit"][..],
        &["state", "show", "history"][..],
    ] {
        let output = run_cli(&storage, args)?;
        assert_eq!(output.status.code(), Some(2), "{args:?}: {}", stderr(&output));
        assert!(stderr(&output).contains("invalid input"));
    }
    assert!(!storage.exists());
    Ok(())
}

#[test]
fn feature_resolution_honors_disabled_sites() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("feature")?;
    let output = run_cli(&storage, &["config", "set", "sites", "hn", r#"{"enabled": false}"#])?;
    assert!(output.status.success(), "set failed: {}", stderr(&output));

    let output = run_cli(&storage, &["feature", "collapse", "--site", "hn"])?;
    assert_eq!(stdout(&output), "false\n");
    let output = run_cli(&storage, &["feature", "collapse"])?;
    assert_eq!(stdout(&output), "true\n");

    let output = run_cli(&storage, &["--output", "json", "feature", "collapse", "--site", "hackerweb"])?;
    let payload: serde_json::Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(payload["site"], "hackerweb");
    assert_eq!(payload["enabled"], true);

    std::fs::remove_file(&storage)?;
    Ok(())
}

#[test]
fn import_from_stdin_then_show() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("import")?;
    let mut child = command(&storage)
        .args(["config", "import", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .ok_or("stdin not piped")?
        .write_all(export_document().to_string().as_bytes())?;
    let output = child.wait_with_output()?;
    assert!(output.status.success(), "import failed: {}", stderr(&output));

    let output = run_cli(&storage, &["config", "show"])?;
    let resolved: serde_json::Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(resolved["features"]["readingProgress"], true);
    assert_eq!(resolved["display"]["newCommentColor"], "#ccffcc");
    assert_eq!(resolved["display"]["maxContentWidth"], "900px");

    std::fs::remove_file(&storage)?;
    Ok(())
}

#[test]
fn rejected_import_leaves_storage_untouched() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("bad-import")?;
    let document = temp_path("bad-import-doc")?;
    std::fs::write(&document, r#"{"colors": {"accent": "red"}}"#)?;

    let output = run_cli(&storage, &["config", "import", &document.to_string_lossy()])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("unknown config section"));
    assert!(!storage.exists());

    let missing = temp_path("missing-doc")?;
    let output = run_cli(&storage, &["config", "import", &missing.to_string_lossy()])?;
    assert_eq!(output.status.code(), Some(3));

    std::fs::remove_file(&document)?;
    Ok(())
}

#[test]
fn migrate_moves_legacy_collapse_ids() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("migrate")?;
    let seeded: serde_json::Map<String, serde_json::Value> = [(
        LEGACY_COLLAPSE_KEY.to_owned(),
        serde_json::Value::from(r#"["123","abc","456"]"#),
    )]
    .into_iter()
    .collect();
    std::fs::write(&storage, serde_json::Value::Object(seeded).to_string())?;

    let output = run_cli(&storage, &["--output", "json", "migrate"])?;
    assert!(output.status.success(), "migrate failed: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(report["legacyFound"], true);
    assert_eq!(report["legacyRemaining"], false);
    assert_eq!(report["collapsed"], 2);

    let output = run_cli(&storage, &["state", "show", "collapse"])?;
    assert_eq!(stdout(&output), "[\"123\",\"456\"]\n");

    std::fs::remove_file(&storage)?;
    Ok(())
}

#[test]
fn read_only_env_keeps_disk_untouched() -> Result<(), Box<dyn Error>> {
    let storage = temp_path("read-only")?;
    let output = command(&storage)
        .env("HWT_STORAGE_READONLY", "1")
        .args(["config", "set", "features", "keyboardNav", "true"])
        .output()?;
    assert!(output.status.success(), "set failed: {}", stderr(&output));
    assert!(stderr(&output).contains("failed to save config"));
    assert!(!storage.exists());

    let output = command(&storage)
        .env("HWT_STORAGE_READONLY", "perhaps")
        .args(["config", "show"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
