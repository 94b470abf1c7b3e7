//! Command-line argument configuration source

use std::path::PathBuf;

use super::ConfigSource;
use crate::cli::args::{OutputFormat as CliOutputFormat, RunArgs};
use crate::error::Result;
use crate::models::config::{OutputFormat, PartialSettings};

/// Command-line argument configuration source
#[derive(Debug)]
pub struct CliConfig {
    args: CliArgs,
    name: String,
    priority: u8,
}

/// Command-line settings, decoupled from clap
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub search_path: Option<PathBuf>,
    pub absolute_import_paths: Option<Vec<PathBuf>>,
    pub named_transform_passes: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub transform_timeout_secs: Option<u64>,
    pub dry_run: bool,
    pub follow_links: bool,
    pub output_format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
    pub no_colors: bool,
    pub no_progress: bool,
    pub config: Option<PathBuf>,
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

impl CliConfig {
    /// Create a new CLI configuration source
    pub fn new(args: CliArgs) -> Self {
        Self {
            args,
            name: "command-line arguments".to_string(),
            priority: 30,
        }
    }

    /// Create a CLI configuration source from parsed `run` arguments
    pub fn from_args(args: &RunArgs) -> Self {
        let cli_args = CliArgs {
            search_path: args.search_path.clone(),
            absolute_import_paths: non_empty(&args.absolute_import_paths),
            named_transform_passes: non_empty(&args.passes),
            exclude: non_empty(&args.exclude),
            concurrency: args.concurrency,
            transform_timeout_secs: args.transform_timeout,
            dry_run: args.dry_run,
            follow_links: args.follow_links,
            output_format: args.output.map(|format| match format {
                CliOutputFormat::Text => OutputFormat::Text,
                CliOutputFormat::Json => OutputFormat::Json,
            }),
            output_file: args.output_file.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
            no_colors: args.no_colors,
            no_progress: args.no_progress,
            config: args.config.clone(),
        };

        Self::new(cli_args)
    }

    /// Get the config file path if specified
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.args.config.as_ref()
    }
}

impl ConfigSource for CliConfig {
    fn load(&self) -> Result<PartialSettings> {
        let mut settings = PartialSettings {
            search_path: self.args.search_path.clone(),
            absolute_import_paths: self.args.absolute_import_paths.clone(),
            named_transform_passes: self.args.named_transform_passes.clone(),
            exclude_patterns: self.args.exclude.clone(),
            concurrency: self.args.concurrency,
            transform_timeout_secs: self.args.transform_timeout_secs,
            output_format: self.args.output_format.clone(),
            output_file: self.args.output_file.clone(),
            ..PartialSettings::default()
        };

        // flags only override when set
        if self.args.dry_run {
            settings.dry_run = Some(true);
        }
        if self.args.follow_links {
            settings.follow_links = Some(true);
        }
        if self.args.quiet {
            settings.quiet = Some(true);
        }
        if self.args.verbose {
            settings.verbose = Some(true);
        }
        if self.args.no_colors {
            settings.use_colors = Some(false);
        }
        if self.args.no_progress {
            settings.show_progress = Some(false);
        }

        Ok(settings)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}
