//! Command implementations

use super::args::{ApplyTransformArgs, Args, CommandArgs, InitArgs, RunArgs};
use crate::config::{self, CliConfig};
use crate::core::transform::{BuiltinPass, StructuralContext, TransformPayload};
use crate::core::RewriteOrchestrator;
use crate::error::{ErrorSeverity, FixImportsError, Result};
use crate::output::{create_formatter, create_progress_callback, create_writer, ProgressReporter};
use crate::utils::path_resolver::absolutize;
use std::path::PathBuf;
use std::sync::Arc;

/// Exit code when every file was handled
pub const EXIT_OK: i32 = 0;
/// Exit code when some files or passes failed
pub const EXIT_FAILURES: i32 = 1;
/// Exit code for configuration and other critical errors
pub const EXIT_CRITICAL: i32 = 2;

/// Available commands
#[derive(Debug)]
pub enum Command {
    /// Rewrite references to converted files
    Run(RunArgs),
    /// Apply a built-in pass to files
    ApplyTransform(ApplyTransformArgs),
    /// Initialize a default configuration file
    Init(InitArgs),
}

impl Command {
    /// Create a command from parsed arguments
    pub fn from_args(args: Args) -> Self {
        match args.command {
            CommandArgs::Run(run) => Command::Run(run),
            CommandArgs::ApplyTransform(apply) => Command::ApplyTransform(apply),
            CommandArgs::Init(init) => Command::Init(init),
        }
    }

    /// Execute the command, returning the process exit code
    pub fn execute(&self) -> Result<i32> {
        match self {
            Command::Run(args) => execute_run(args),
            Command::ApplyTransform(args) => execute_apply_transform(args),
            Command::Init(args) => execute_init(args),
        }
    }

    /// Run the command and handle errors
    pub fn run(&self) -> i32 {
        match self.execute() {
            Ok(code) => code,
            Err(err) => {
                tracing::error!("{}", err);
                eprintln!("{}: {}", err.severity(), err.user_message());
                exit_code_for(&err)
            }
        }
    }
}

/// Exit code for an error that aborted a command
pub fn exit_code_for(err: &FixImportsError) -> i32 {
    match err.severity() {
        ErrorSeverity::Warning | ErrorSeverity::Error => EXIT_FAILURES,
        ErrorSeverity::Critical => EXIT_CRITICAL,
    }
}

fn execute_run(args: &RunArgs) -> Result<i32> {
    let cli_config = CliConfig::from_args(args);
    let settings = config::load_config(&cli_config)?;
    tracing::debug!(?settings, "resolved settings");

    let reporter = Arc::new(ProgressReporter::new(settings.show_progress && !settings.quiet));
    reporter.start("Rewriting imports");

    let orchestrator = RewriteOrchestrator::new(settings.clone())?
        .with_progress(Arc::new(create_progress_callback(reporter.clone())));
    let report = orchestrator.run(&args.files)?;

    reporter.finish(&format!("{} file(s) rewritten", report.rewritten_files().len()));

    let formatter = create_formatter(
        &settings.output_format,
        settings.use_colors && settings.output_file.is_none(),
        settings.verbose,
        settings.quiet,
    );
    create_writer(settings.output_file.as_ref()).write(&formatter.format(&report)?)?;

    Ok(if report.has_failures() { EXIT_FAILURES } else { EXIT_OK })
}

fn execute_apply_transform(args: &ApplyTransformArgs) -> Result<i32> {
    let payload = TransformPayload::decode(&args.encoded_options)?;
    let pass = BuiltinPass::from_name(&args.pass)
        .ok_or_else(|| FixImportsError::config_error(format!("unknown built-in pass '{}'", args.pass)))?;

    let context = StructuralContext::from_payload(&payload);
    let files: Vec<PathBuf> = args.files.iter().map(|f| absolutize(f)).collect();
    tracing::info!(pass = pass.name(), files = files.len(), "applying transform");

    let outcome = context.apply(pass, &files, args.dry_run, |_| {});

    let listing: String = outcome
        .rewritten
        .iter()
        .map(|path| format!("{}\n", path.display()))
        .collect();
    create_writer(None::<PathBuf>).write(&listing)?;

    for failure in &outcome.failures {
        eprintln!("warning: {}", failure.message);
    }
    Ok(if outcome.failures.is_empty() { EXIT_OK } else { EXIT_FAILURES })
}

fn execute_init(args: &InitArgs) -> Result<i32> {
    if args.path.exists() && !args.force {
        eprintln!(
            "Configuration file already exists at: {} (use --force to overwrite)",
            args.path.display()
        );
        return Ok(EXIT_OK);
    }

    config::create_default_config(&args.path)?;
    println!("Created default configuration file at: {}", args.path.display());
    Ok(EXIT_OK)
}
