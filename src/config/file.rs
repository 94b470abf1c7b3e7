//! Configuration file and environment sources

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{parser, ConfigSource};
use crate::error::{FixImportsError, Result};
use crate::models::config::PartialSettings;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".fix-imports.toml";

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "FIX_IMPORTS";

/// Configuration file source
pub struct FileConfig {
    path: PathBuf,
    name: String,
    priority: u8,
}

impl FileConfig {
    /// Create a new file configuration source with the default path
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            name: "default config file".to_string(),
            priority: 10,
        }
    }

    /// Create a new file configuration source with a custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            name: format!("config file ({})", path.as_ref().display()),
            priority: 10,
        }
    }

    /// Get the path of this configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a default configuration file at this location
    pub fn create_default(&self) -> Result<()> {
        parser::create_default_config(&self.path)
    }
}

impl ConfigSource for FileConfig {
    fn load(&self) -> Result<PartialSettings> {
        if !self.is_available() {
            return Err(FixImportsError::ConfigNotFound {
                path: self.path.clone(),
            });
        }

        parser::parse_config_file(&self.path)
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::new()
    }
}

const ENV_KEYS: &[&str] = &[
    "SEARCH_PATH",
    "ABSOLUTE_IMPORT_PATHS",
    "NAMED_TRANSFORM_PASSES",
    "EXCLUDE",
    "CONCURRENCY",
    "TRANSFORM_TIMEOUT_SECS",
    "DRY_RUN",
    "FOLLOW_LINKS",
    "OUTPUT_FORMAT",
    "NO_COLOR",
];

/// Environment variable configuration source
///
/// Reads `<PREFIX>_SEARCH_PATH`, `<PREFIX>_ABSOLUTE_IMPORT_PATHS` (platform
/// path-list separator), comma-separated `<PREFIX>_NAMED_TRANSFORM_PASSES`
/// and `<PREFIX>_EXCLUDE`, plus the scalar options.
pub struct EnvConfig {
    prefix: String,
    name: String,
    priority: u8,
    vars: Option<HashMap<String, String>>,
}

impl EnvConfig {
    /// Create a new environment variable configuration source
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            name: format!("{} environment variables", &prefix),
            prefix,
            priority: 20,
            vars: None,
        }
    }

    /// Read from a fixed map instead of the process environment
    pub fn from_vars(prefix: impl Into<String>, vars: HashMap<String, String>) -> Self {
        Self {
            vars: Some(vars),
            ..Self::new(prefix)
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        let name = format!("{}_{}", self.prefix, key);
        match &self.vars {
            Some(vars) => vars.get(&name).cloned(),
            None => std::env::var(name).ok(),
        }
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        match self.var(key) {
            Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
                FixImportsError::config_error(format!("{}_{}: invalid value '{}': {}", self.prefix, key, raw, e))
            }),
            None => Ok(None),
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.var(key).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

impl ConfigSource for EnvConfig {
    fn load(&self) -> Result<PartialSettings> {
        Ok(PartialSettings {
            search_path: self.var("SEARCH_PATH").map(PathBuf::from),
            absolute_import_paths: self
                .var("ABSOLUTE_IMPORT_PATHS")
                .map(|raw| std::env::split_paths(&raw).collect()),
            named_transform_passes: self.list("NAMED_TRANSFORM_PASSES"),
            exclude_patterns: self.list("EXCLUDE"),
            concurrency: self.parsed("CONCURRENCY")?,
            transform_timeout_secs: self.parsed("TRANSFORM_TIMEOUT_SECS")?,
            dry_run: self.parsed("DRY_RUN")?,
            follow_links: self.parsed("FOLLOW_LINKS")?,
            output_format: self.parsed("OUTPUT_FORMAT")?,
            use_colors: self.var("NO_COLOR").map(|_| false),
            ..PartialSettings::default()
        })
    }

    fn is_available(&self) -> bool {
        ENV_KEYS.iter().any(|key| self.var(key).is_some())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}
