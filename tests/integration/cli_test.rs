//! Tests for the fix-imports binary

use fix_imports::TransformPayload;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/foo.js", "export default function foo() {}\n");
    write(dir.path(), "src/app.js", "import foo from './foo.coffee';\n");
    write(dir.path(), "src/legacy.coffee", "foo = require('./foo.coffee')\n");
    dir
}

/// Run the binary inside `dir` with a clean environment
fn fix_imports(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fix-imports"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("FIX_IMPORTS_SEARCH_PATH")
        .env_remove("FIX_IMPORTS_DRY_RUN")
        .output()
        .expect("failed to run fix-imports")
}

#[test]
fn test_run_rewrites_and_prints_summary() {
    let dir = fixture();
    let output = fix_imports(dir.path(), &["run", "--no-colors", "--no-progress", "src/foo.js"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Import Rewrite Summary"));
    assert!(stdout.contains("Rewrote 2 file(s)"));

    assert_eq!(
        fs::read_to_string(dir.path().join("src/app.js")).unwrap(),
        "import foo from './foo';\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("src/legacy.coffee")).unwrap(),
        "foo = require('./foo').default\n"
    );
}

#[test]
fn test_run_json_dry_run() {
    let dir = fixture();
    let output = fix_imports(
        dir.path(),
        &["run", "--dry-run", "--no-progress", "-o", "json", "src/foo.js"],
    );

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["converted_files"], 1);
    assert_eq!(report["default_exports"], 1);
    assert_eq!(report["structural_rewrites"].as_array().unwrap().len(), 1);
    assert_eq!(report["legacy_rewrites"].as_array().unwrap().len(), 1);

    assert_eq!(
        fs::read_to_string(dir.path().join("src/app.js")).unwrap(),
        "import foo from './foo.coffee';\n"
    );
}

#[test]
fn test_quiet_prints_only_paths() {
    let dir = fixture();
    let output = fix_imports(dir.path(), &["run", "-q", "--no-progress", "src/foo.js"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|line| line.ends_with("app.js")));
    assert!(lines.iter().any(|line| line.ends_with("legacy.coffee")));
}

#[test]
fn test_parse_failure_exits_with_one() {
    let dir = fixture();
    write(dir.path(), "src/broken.js", "import foo from './foo.coffee'\nlet = ;\n");

    let output = fix_imports(dir.path(), &["run", "--no-colors", "--no-progress", "src/foo.js"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/app.js")).unwrap(),
        "import foo from './foo';\n"
    );
}

#[test]
fn test_invalid_configuration_exits_with_two() {
    let dir = fixture();
    let output = fix_imports(
        dir.path(),
        &["run", "--no-progress", "--search-path", "does/not/exist", "src/foo.js"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(!output.stderr.is_empty());

    let output = fix_imports(dir.path(), &["run", "--config", "missing.toml", "src/foo.js"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_file_in_working_directory_is_used() {
    let dir = fixture();
    write(dir.path(), ".fix-imports.toml", "dry_run = true\noutput_format = \"json\"\n");

    let output = fix_imports(dir.path(), &["run", "--no-progress", "src/foo.js"]);

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
}

#[cfg(unix)]
#[test]
fn test_external_pass_output_goes_to_stderr() {
    use std::os::unix::fs::PermissionsExt;

    let dir = fixture();
    write(dir.path(), "tools/chatty-pass", "#!/bin/sh\necho 'chatty pass output'\n");
    let tool = dir.path().join("tools/chatty-pass");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let output = fix_imports(
        dir.path(),
        &["run", "--no-progress", "-o", "json", "--pass", "tools/chatty-pass", "src/foo.js"],
    );

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["pass_failures"].as_array().unwrap().len(), 0);
    assert!(String::from_utf8_lossy(&output.stderr).contains("chatty pass output"));
}

#[test]
fn test_apply_transform_subcommand() {
    let dir = fixture();
    write(dir.path(), "src/other.js", "import bar from './bar.coffee';\n");

    let payload = TransformPayload {
        converted_files: vec![dir.path().join("src/foo.js")],
        absolute_import_paths: vec![],
    };
    let encoded = payload.encode().unwrap();
    let option = format!("--encoded-options={}", encoded);

    let output = fix_imports(
        dir.path(),
        &["apply-transform", &option, "src/app.js", "src/other.js"],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.trim_end().ends_with("app.js"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/other.js")).unwrap(),
        "import bar from './bar.coffee';\n"
    );
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();
    let output = fix_imports(dir.path(), &["init"]);

    assert_eq!(output.status.code(), Some(0));
    let created = dir.path().join(".fix-imports.toml");
    assert!(created.exists());
    assert!(fix_imports::config::parse_config_file(&created).is_ok());
}
