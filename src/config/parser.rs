//! Configuration file parsing utilities

use std::fs;
use std::path::{Path, PathBuf};

use super::file::DEFAULT_CONFIG_FILE;
use crate::error::{FixImportsError, Result};
use crate::models::config::PartialSettings;

/// Embedded template written by `fix-imports init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

/// Parse a TOML configuration file into PartialSettings
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FixImportsError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| FixImportsError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config_content(&content, path)
}

/// Parse TOML configuration content into PartialSettings
pub fn parse_config_content<P: AsRef<Path>>(content: &str, path: P) -> Result<PartialSettings> {
    let path = path.as_ref();

    let settings: PartialSettings = toml::from_str(content).map_err(|e| FixImportsError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate_partial_settings(&settings, path)?;

    Ok(settings)
}

/// Validate partial settings for obvious errors
pub fn validate_partial_settings<P: AsRef<Path>>(settings: &PartialSettings, path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(search_path) = &settings.search_path {
        if search_path.as_os_str().is_empty() {
            return Err(FixImportsError::config_error(format!(
                "Invalid empty search_path in config file: {}",
                path.display()
            )));
        }
    }

    if let Some(roots) = &settings.absolute_import_paths {
        if roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err(FixImportsError::config_error(format!(
                "Empty absolute import path in config file: {}",
                path.display()
            )));
        }
    }

    if let Some(passes) = &settings.named_transform_passes {
        if passes.iter().any(|pass| pass.trim().is_empty()) {
            return Err(FixImportsError::config_error(format!(
                "Empty transform pass name in config file: {}",
                path.display()
            )));
        }
    }

    if let Some(patterns) = &settings.exclude_patterns {
        for pattern in patterns {
            if pattern.is_empty() {
                return Err(FixImportsError::config_error(format!(
                    "Empty exclude pattern in config file: {}",
                    path.display()
                )));
            }

            glob::Pattern::new(pattern).map_err(|e| {
                FixImportsError::config_error(format!(
                    "Invalid exclude pattern '{}' in config file: {}: {}",
                    pattern,
                    path.display(),
                    e
                ))
            })?;
        }
    }

    if settings.concurrency == Some(0) {
        return Err(FixImportsError::config_error(format!(
            "Invalid concurrency 0 in config file: {}. Must be at least 1.",
            path.display()
        )));
    }

    if let Some(output_file) = &settings.output_file {
        if output_file.as_os_str().is_empty() {
            return Err(FixImportsError::config_error(format!(
                "Invalid empty output_file in config file: {}",
                path.display()
            )));
        }
    }

    Ok(())
}

/// Candidate locations for the default configuration file, in lookup order
pub fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(home_dir) = dirs::home_dir() {
        locations.push(home_dir.join(DEFAULT_CONFIG_FILE));
    }
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join("fix-imports").join("config.toml"));
    }
    locations
}

/// Find and load configuration from default locations
pub fn find_default_config() -> Result<Option<PartialSettings>> {
    find_config_in(&default_config_locations())
}

/// Load the first existing file among `locations`
pub fn find_config_in(locations: &[PathBuf]) -> Result<Option<PartialSettings>> {
    for location in locations {
        if location.is_file() {
            tracing::debug!(path = %location.display(), "loading config file");
            return Ok(Some(parse_config_file(location)?));
        }
    }
    Ok(None)
}

/// Create a default configuration file at the specified path
pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| FixImportsError::write_error(parent, e))?;
        }
    }

    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(|e| FixImportsError::write_error(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let config_content = r#"
            search_path = "/test/path"
            absolute_import_paths = ["/test/path/lib"]
            exclude_patterns = ["node_modules", "dist"]
            output_format = "json"
        "#;

        fs::write(&config_path, config_content).unwrap();

        let settings = parse_config_file(&config_path).unwrap();

        assert_eq!(settings.search_path, Some(PathBuf::from("/test/path")));
        assert_eq!(settings.absolute_import_paths, Some(vec![PathBuf::from("/test/path/lib")]));
        assert_eq!(
            settings.exclude_patterns,
            Some(vec!["node_modules".to_string(), "dist".to_string()])
        );
    }

    #[test]
    fn test_parse_camel_case_keys() {
        let config_content = r#"
            searchPath = "/proj"
            absoluteImportPaths = ["/proj/app", "/proj/lib"]
            namedTransformPasses = ["remove-coffee-from-imports"]
        "#;

        let settings = parse_config_content(config_content, "virtual.toml").unwrap();

        assert_eq!(settings.search_path, Some(PathBuf::from("/proj")));
        assert_eq!(
            settings.absolute_import_paths,
            Some(vec![PathBuf::from("/proj/app"), PathBuf::from("/proj/lib")])
        );
        assert_eq!(
            settings.named_transform_passes,
            Some(vec!["remove-coffee-from-imports".to_string()])
        );
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let err = parse_config_content("max_depth = 3", "virtual.toml").unwrap_err();
        assert!(matches!(err, FixImportsError::ConfigParse { .. }));
        assert!(err.is_critical());
    }

    #[test]
    fn test_validate_partial_settings() {
        let valid = PartialSettings {
            search_path: Some(PathBuf::from("/test/path")),
            exclude_patterns: Some(vec!["node_modules".to_string()]),
            concurrency: Some(2),
            ..Default::default()
        };
        assert!(validate_partial_settings(&valid, "test.toml").is_ok());

        let zero_workers = PartialSettings {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(validate_partial_settings(&zero_workers, "test.toml").is_err());

        let empty_pattern = PartialSettings {
            exclude_patterns: Some(vec!["".to_string()]),
            ..Default::default()
        };
        assert!(validate_partial_settings(&empty_pattern, "test.toml").is_err());

        let bad_glob = PartialSettings {
            exclude_patterns: Some(vec!["[".to_string()]),
            ..Default::default()
        };
        assert!(validate_partial_settings(&bad_glob, "test.toml").is_err());

        let empty_pass = PartialSettings {
            named_transform_passes: Some(vec![" ".to_string()]),
            ..Default::default()
        };
        assert!(validate_partial_settings(&empty_pass, "test.toml").is_err());
    }

    #[test]
    fn test_create_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested/config.toml");

        create_default_config(&config_path).unwrap();
        assert!(config_path.exists());

        let settings = parse_config_file(&config_path).unwrap();
        assert!(settings.search_path.is_none());
        assert_eq!(
            settings.exclude_patterns,
            Some(vec!["node_modules".to_string(), ".git".to_string()])
        );
    }

    #[test]
    fn test_find_config_in_order() {
        let temp_dir = tempdir().unwrap();
        let first = temp_dir.path().join("missing.toml");
        let second = temp_dir.path().join("second.toml");
        let third = temp_dir.path().join("third.toml");
        fs::write(&second, "search_path = \"/second\"").unwrap();
        fs::write(&third, "search_path = \"/third\"").unwrap();

        let settings = find_config_in(&[first, second, third]).unwrap().unwrap();
        assert_eq!(settings.search_path, Some(PathBuf::from("/second")));

        assert!(find_config_in(&[temp_dir.path().join("nope.toml")]).unwrap().is_none());
    }

    #[test]
    fn test_default_locations_start_with_current_directory() {
        let locations = default_config_locations();
        assert_eq!(locations[0], PathBuf::from(DEFAULT_CONFIG_FILE));
    }
}
