//! Configuration loading feeding a real rewrite pass

use fix_imports::config::{self, CliArgs, CliConfig, EnvConfig, ENV_PREFIX};
use fix_imports::models::config::OutputFormat;
use fix_imports::{FixImportsError, RewriteOrchestrator};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn no_env() -> EnvConfig {
    EnvConfig::from_vars(ENV_PREFIX, HashMap::new())
}

#[test]
fn test_camel_case_config_drives_rewrite() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("lib/shared")).unwrap();
    fs::create_dir_all(root.join("web")).unwrap();
    fs::write(root.join("lib/shared/money.js"), "export default class Money {}\n").unwrap();
    fs::write(root.join("web/cart.js"), "import Money from 'shared/money.coffee';\n").unwrap();

    let config_path = root.join("fix.toml");
    fs::write(
        &config_path,
        format!(
            "searchPath = {:?}\nabsoluteImportPaths = [{:?}]\nnamedTransformPasses = []\nshow_progress = false\n",
            root.display().to_string(),
            root.join("lib").display().to_string()
        ),
    )
    .unwrap();

    let cli_config = CliConfig::new(CliArgs {
        config: Some(config_path),
        ..Default::default()
    });
    let settings = config::load_config_with_env(&cli_config, &no_env()).unwrap();
    assert_eq!(settings.absolute_import_paths, vec![root.join("lib")]);

    let report = RewriteOrchestrator::new(settings)
        .unwrap()
        .run(&[root.join("lib/shared/money.js")])
        .unwrap();

    assert_eq!(report.structural_rewrites, vec![root.join("web/cart.js")]);
    assert_eq!(
        fs::read_to_string(root.join("web/cart.js")).unwrap(),
        "import Money from 'shared/money';\n"
    );
}

#[test]
fn test_environment_overrides_file_and_cli_overrides_environment() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("fix.toml");
    fs::write(
        &config_path,
        format!(
            "search_path = {:?}\noutput_format = \"text\"\nexclude_patterns = [\"vendor\"]\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let env_config = EnvConfig::from_vars(
        ENV_PREFIX,
        HashMap::from([
            ("FIX_IMPORTS_OUTPUT_FORMAT".to_string(), "json".to_string()),
            ("FIX_IMPORTS_EXCLUDE".to_string(), "dist".to_string()),
        ]),
    );
    let cli_config = CliConfig::new(CliArgs {
        config: Some(config_path),
        exclude: Some(vec!["build".to_string()]),
        ..Default::default()
    });

    let settings = config::load_config_with_env(&cli_config, &env_config).unwrap();
    assert_eq!(settings.output_format, OutputFormat::Json);
    assert_eq!(settings.exclude_patterns, vec!["build".to_string()]);
}

#[test]
fn test_default_template_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".fix-imports.toml");
    config::create_default_config(&path).unwrap();

    let partial = config::parse_config_file(&path).unwrap();
    assert_eq!(
        partial.exclude_patterns,
        Some(vec!["node_modules".to_string(), ".git".to_string()])
    );
    assert_eq!(partial.dry_run, Some(false));
}

#[test]
fn test_unknown_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fix.toml");
    fs::write(&path, "searchPaths = [\"a\"]\n").unwrap();

    let cli_config = CliConfig::new(CliArgs {
        config: Some(path),
        ..Default::default()
    });
    let err = config::load_config_with_env(&cli_config, &no_env()).unwrap_err();
    assert!(matches!(err, FixImportsError::ConfigParse { .. }));
    assert!(err.is_critical());
}

#[test]
fn test_missing_search_path_is_invalid() {
    let dir = TempDir::new().unwrap();
    let cli_config = CliConfig::new(CliArgs {
        config: None,
        search_path: Some(dir.path().join("gone")),
        ..Default::default()
    });
    let err = config::load_config_with_env(&cli_config, &no_env()).unwrap_err();
    assert!(matches!(err, FixImportsError::InvalidPath { .. }));
}
