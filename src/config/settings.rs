//! Settings validation

use crate::error::{FixImportsError, Result};
use crate::models::config::Settings;
use std::path::Path;

/// Settings validator for ensuring configuration is valid
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate settings and return errors if invalid
    pub fn validate(settings: &Settings) -> Result<()> {
        if !settings.search_path.is_dir() {
            return Err(FixImportsError::InvalidPath {
                path: settings.search_path.clone(),
            });
        }

        for pattern in &settings.exclude_patterns {
            glob::Pattern::new(pattern)?;
        }

        if settings.concurrency == Some(0) {
            return Err(FixImportsError::config_error("concurrency must be at least 1"));
        }

        if settings.transform_timeout_secs == Some(0) {
            return Err(FixImportsError::config_error("transform_timeout_secs must be at least 1"));
        }

        for root in &settings.absolute_import_paths {
            if !root.is_dir() {
                tracing::warn!(root = %root.display(), "absolute import path does not exist");
            }
        }

        if let Some(path) = &settings.output_file {
            Self::validate_output_path(path)?;
        }

        Ok(())
    }

    /// Validate that the output file's directory exists
    fn validate_output_path(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                Err(FixImportsError::OutputDirectoryNotFound {
                    path: parent.to_path_buf(),
                })
            }
            _ => Ok(()),
        }
    }
}
