//! Command-line argument parsing

use crate::core::transform::FIX_IMPORTS_PASS;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// fix-imports - rewrite references to files converted from CoffeeScript
#[derive(Parser, Debug)]
#[command(name = "fix-imports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rewrite import references after converting CoffeeScript files to JavaScript")]
#[command(long_about = "fix-imports updates every file that refers to a freshly converted module. \
Parseable JavaScript files have their import, re-export and require specifiers rewritten structurally; \
legacy CoffeeScript files have their requires rewritten by pattern, gaining a `.default` accessor when \
the converted module now uses a default export.")]
#[command(after_help = "EXAMPLES:

    # Fix references to two converted files under the current directory
    fix-imports run src/models/user.js src/views/page.js

    # Search a specific tree and resolve bare specifiers against app/lib
    fix-imports run --search-path ./app --absolute-import-path ./app/lib src/user.js

    # Preview the changes without writing anything
    fix-imports run --dry-run --output json src/user.js

    # Run an extra pass over the same candidate files
    fix-imports run --pass remove-coffee-from-imports src/user.js

    # Create a default configuration file
    fix-imports init
")]
pub struct Args {
    #[command(subcommand)]
    pub command: CommandArgs,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum CommandArgs {
    /// Rewrite references to the given converted files
    Run(RunArgs),
    /// Apply a built-in structural pass to files, as an external pass would
    ApplyTransform(ApplyTransformArgs),
    /// Create a default configuration file
    Init(InitArgs),
}

/// Options for `fix-imports run`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Converted files whose references should be rewritten
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[arg(short = 'p', long, value_name = "PATH", help = "Root of the tree searched for referencing files (defaults to the current directory)")]
    pub search_path: Option<PathBuf>,

    #[arg(short = 'r', long = "absolute-import-path", value_name = "PATH", help = "Root for resolving non-relative specifiers (repeatable, tried in order)")]
    pub absolute_import_paths: Vec<PathBuf>,

    #[arg(long = "pass", value_name = "NAME", help = "Extra named transform pass to run (repeatable; built-in name or executable path)")]
    pub passes: Vec<String>,

    #[arg(short, long, value_name = "PATTERN", help = "Glob for file or directory names to skip while scanning (repeatable)")]
    pub exclude: Vec<String>,

    #[arg(short = 'j', long, value_name = "N", help = "Number of worker threads (defaults to the number of CPUs)")]
    pub concurrency: Option<usize>,

    #[arg(long, value_name = "SECS", help = "Timeout for each external transform pass")]
    pub transform_timeout: Option<u64>,

    #[arg(long, help = "Report what would change without writing any file")]
    pub dry_run: bool,

    #[arg(long, help = "Follow symbolic links while scanning")]
    pub follow_links: bool,

    #[arg(short, long, value_enum, help = "Report format: 'text' for people, 'json' for tools")]
    pub output: Option<OutputFormat>,

    #[arg(long, value_name = "FILE", help = "File to write the report to (stdout if not specified)")]
    pub output_file: Option<PathBuf>,

    #[arg(short, long, help = "Only print the rewritten paths")]
    pub quiet: bool,

    #[arg(short, long, help = "Show per-stage counts and debug logging")]
    pub verbose: bool,

    #[arg(long, help = "Disable colored output")]
    pub no_colors: bool,

    #[arg(long, help = "Disable progress bars")]
    pub no_progress: bool,

    #[arg(short, long, value_name = "FILE", help = "Configuration file (defaults to .fix-imports.toml lookup)")]
    pub config: Option<PathBuf>,
}

/// Options for `fix-imports apply-transform`
#[derive(clap::Args, Debug, Clone)]
pub struct ApplyTransformArgs {
    /// Files to transform in place
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[arg(long, value_name = "PAYLOAD", help = "Encoded converted-file context")]
    pub encoded_options: String,

    #[arg(long, value_name = "NAME", default_value = FIX_IMPORTS_PASS, help = "Built-in pass to apply")]
    pub pass: String,

    #[arg(long, help = "Report what would change without writing any file")]
    pub dry_run: bool,
}

/// Options for `fix-imports init`
#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, value_name = "FILE", default_value = ".fix-imports.toml", help = "Where to write the configuration file")]
    pub path: PathBuf,

    #[arg(long, help = "Overwrite an existing file")]
    pub force: bool,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for programmatic consumption
    Json,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Default log filter implied by the verbosity flags
    pub fn default_log_level(&self) -> &'static str {
        match &self.command {
            CommandArgs::Run(run) if run.verbose => "debug",
            CommandArgs::Run(run) if run.quiet => "warn",
            _ => "info",
        }
    }
}
