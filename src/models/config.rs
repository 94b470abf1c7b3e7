//! Configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration settings for a rewrite pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the tree searched for files that reference converted files
    pub search_path: PathBuf,

    /// Ordered roots used to resolve non-relative specifiers
    pub absolute_import_paths: Vec<PathBuf>,

    /// Extra structural transform passes run over the same candidate set
    pub named_transform_passes: Vec<String>,

    /// Glob patterns for file and directory names skipped while scanning
    pub exclude_patterns: Vec<String>,

    /// Worker threads for scanning and structural rewriting
    pub concurrency: Option<usize>,

    /// Deadline for each external transform pass
    pub transform_timeout_secs: Option<u64>,

    /// Compute rewrites without writing anything back
    pub dry_run: bool,

    /// Whether to follow symbolic links while scanning
    pub follow_links: bool,

    /// Report format (text, json)
    pub output_format: OutputFormat,

    /// Report file path (if not specified, output to stdout)
    pub output_file: Option<PathBuf>,

    /// Whether to suppress non-essential output
    pub quiet: bool,

    /// Whether to show detailed progress and debug information
    pub verbose: bool,

    /// Whether to use colors in text output
    pub use_colors: bool,

    /// Whether to show progress bars
    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_path: PathBuf::from("."),
            absolute_import_paths: Vec::new(),
            named_transform_passes: Vec::new(),
            exclude_patterns: vec!["node_modules".to_string(), ".git".to_string()],
            concurrency: None,
            transform_timeout_secs: None,
            dry_run: false,
            follow_links: false,
            output_format: OutputFormat::Text,
            output_file: None,
            quiet: false,
            verbose: false,
            use_colors: true,
            show_progress: true,
        }
    }
}

impl Settings {
    /// Number of workers to use for bounded-parallel stages
    pub fn worker_count(&self) -> usize {
        self.concurrency.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Timeout applied to external transform passes
    pub fn transform_timeout(&self) -> Option<std::time::Duration> {
        self.transform_timeout_secs.map(std::time::Duration::from_secs)
    }
}

/// Supported report formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for programmatic consumption
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Partial settings for configuration merging
///
/// Config files may use either snake_case keys or the camelCase names
/// (`searchPath`, `absoluteImportPaths`, `namedTransformPasses`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialSettings {
    #[serde(alias = "searchPath")]
    pub search_path: Option<PathBuf>,
    #[serde(alias = "absoluteImportPaths")]
    pub absolute_import_paths: Option<Vec<PathBuf>>,
    #[serde(alias = "namedTransformPasses")]
    pub named_transform_passes: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub transform_timeout_secs: Option<u64>,
    pub dry_run: Option<bool>,
    pub follow_links: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub use_colors: Option<bool>,
    pub show_progress: Option<bool>,
}

impl PartialSettings {
    /// Merge another PartialSettings into this one
    /// Fields from `other` take precedence over existing fields
    pub fn merge_from(&mut self, other: PartialSettings) {
        if other.search_path.is_some() {
            self.search_path = other.search_path;
        }
        if other.absolute_import_paths.is_some() {
            self.absolute_import_paths = other.absolute_import_paths;
        }
        if other.named_transform_passes.is_some() {
            self.named_transform_passes = other.named_transform_passes;
        }
        if other.exclude_patterns.is_some() {
            self.exclude_patterns = other.exclude_patterns;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.transform_timeout_secs.is_some() {
            self.transform_timeout_secs = other.transform_timeout_secs;
        }
        if other.dry_run.is_some() {
            self.dry_run = other.dry_run;
        }
        if other.follow_links.is_some() {
            self.follow_links = other.follow_links;
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.output_file.is_some() {
            self.output_file = other.output_file;
        }
        if other.quiet.is_some() {
            self.quiet = other.quiet;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.use_colors.is_some() {
            self.use_colors = other.use_colors;
        }
        if other.show_progress.is_some() {
            self.show_progress = other.show_progress;
        }
    }

    /// Convert partial settings to full settings
    /// Uses defaults for any fields that are None
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(search_path) = &self.search_path {
            settings.search_path = search_path.clone();
        }
        if let Some(roots) = &self.absolute_import_paths {
            settings.absolute_import_paths = roots.clone();
        }
        if let Some(passes) = &self.named_transform_passes {
            settings.named_transform_passes = passes.clone();
        }
        if let Some(exclude_patterns) = &self.exclude_patterns {
            settings.exclude_patterns = exclude_patterns.clone();
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = Some(concurrency);
        }
        if let Some(timeout) = self.transform_timeout_secs {
            settings.transform_timeout_secs = Some(timeout);
        }
        if let Some(dry_run) = self.dry_run {
            settings.dry_run = dry_run;
        }
        if let Some(follow_links) = self.follow_links {
            settings.follow_links = follow_links;
        }
        if let Some(output_format) = &self.output_format {
            settings.output_format = output_format.clone();
        }
        if let Some(output_file) = &self.output_file {
            settings.output_file = Some(output_file.clone());
        }
        if let Some(quiet) = self.quiet {
            settings.quiet = quiet;
        }
        if let Some(verbose) = self.verbose {
            settings.verbose = verbose;
        }
        if let Some(use_colors) = self.use_colors {
            settings.use_colors = use_colors;
        }
        if let Some(show_progress) = self.show_progress {
            settings.show_progress = show_progress;
        }

        settings
    }
}
