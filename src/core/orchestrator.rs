//! Rewrite orchestration
//!
//! Runs one full pass for a batch of converted files: classify export
//! shapes, scan for candidates, rewrite parseable files structurally, run
//! the configured named passes, then rewrite legacy files. Shared inputs are
//! built up front and only read by the workers.

use crate::core::parallel::{build_pool, ProgressUpdate};
use crate::core::scanner::{CandidateFileScanner, ExtensionFilter, ScanOutcome};
use crate::core::transform::{
    BuiltinPass, ExternalTransform, StructuralContext, TransformPass, TransformPayload,
};
use crate::error::Result;
use crate::models::config::Settings;
use crate::models::rewrite::{
    ConvertedFileSet, ExportShapeTable, PassRewrites, RewriteReport,
};
use crate::parsers::{ExportShapeClassifier, LegacyRequireRewriter};
use crate::utils::fs::rewrite_in_place;
use crate::utils::path_resolver::PathResolver;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Callback receiving progress for the current stage
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Drives a rewrite pass over the search tree
pub struct RewriteOrchestrator {
    settings: Settings,
    pool: ThreadPool,
    progress: Option<ProgressCallback>,
}

impl RewriteOrchestrator {
    /// Create an orchestrator with a worker pool sized from the settings
    pub fn new(settings: Settings) -> Result<Self> {
        let pool = build_pool(settings.worker_count())?;
        Ok(Self {
            settings,
            pool,
            progress: None,
        })
    }

    /// Report per-file progress through `callback`
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Rewrite every reference to `converted_files` under the search path
    pub fn run<P: AsRef<Path>>(&self, converted_files: &[P]) -> Result<RewriteReport> {
        let started = Instant::now();
        let mut report = RewriteReport::new(self.settings.dry_run);

        let converted = ConvertedFileSet::from_paths(converted_files);
        report.converted_files = converted.len();
        if converted.is_empty() {
            tracing::info!("no converted files given; nothing to rewrite");
            report.duration = started.elapsed();
            return Ok(report);
        }

        let (shapes, failures) = self.pool.install(|| ExportShapeClassifier::classify_files(&converted));
        report.default_exports = shapes.default_export_count();
        report.failures.extend(failures);
        tracing::info!(
            converted = converted.len(),
            default_exports = report.default_exports,
            "classified converted files"
        );

        let scanner = CandidateFileScanner::new(
            &converted,
            &self.settings.exclude_patterns,
            self.settings.follow_links,
        )?;
        let mut parseable = self.scan(&scanner, ExtensionFilter::parseable(), "Scanning parseable files")?;
        let mut legacy = self.scan(&scanner, ExtensionFilter::legacy(), "Scanning legacy files")?;
        report.parseable_candidates = parseable.candidates.len();
        report.legacy_candidates = legacy.candidates.len();
        report.failures.append(&mut parseable.traversal_errors);
        report.failures.append(&mut legacy.traversal_errors);

        let candidates = parseable.candidates.to_vec();
        let context = StructuralContext::new(
            converted.clone(),
            PathResolver::new(&self.settings.absolute_import_paths),
        );

        let outcome = self.pool.install(|| {
            context.apply(
                BuiltinPass::FixImports,
                &candidates,
                self.settings.dry_run,
                self.stage_progress("Rewriting imports"),
            )
        });
        tracing::info!(rewritten = outcome.rewritten.len(), "structural rewrite complete");
        report.structural_rewrites = outcome.rewritten;
        report.failures.extend(outcome.failures);

        if !self.settings.named_transform_passes.is_empty() {
            let payload = TransformPayload::new(&converted, &self.settings.absolute_import_paths);
            for name in &self.settings.named_transform_passes {
                self.run_named_pass(name, &payload, &context, &candidates, &mut report);
            }
        }

        self.rewrite_legacy(&converted, &shapes, &legacy, &mut report)?;

        report.duration = started.elapsed();
        tracing::info!(
            rewritten = report.rewritten_files().len(),
            failures = report.failures.len() + report.pass_failures.len(),
            dry_run = report.dry_run,
            "rewrite pass finished"
        );
        Ok(report)
    }

    fn scan(&self, scanner: &CandidateFileScanner<'_>, filter: ExtensionFilter, stage: &str) -> Result<ScanOutcome> {
        self.pool
            .install(|| scanner.scan(&self.settings.search_path, filter, self.stage_progress(stage)))
    }

    fn run_named_pass(
        &self,
        name: &str,
        payload: &TransformPayload,
        context: &StructuralContext,
        candidates: &[PathBuf],
        report: &mut RewriteReport,
    ) {
        let span = tracing::info_span!("named_pass", pass = name);
        let _guard = span.enter();

        match TransformPass::resolve(name) {
            TransformPass::Builtin(pass) => {
                let outcome = self.pool.install(|| {
                    context.apply(
                        pass,
                        candidates,
                        self.settings.dry_run,
                        self.stage_progress(&format!("Running {}", pass.name())),
                    )
                });
                tracing::info!(rewritten = outcome.rewritten.len(), "built-in pass complete");
                report.failures.extend(outcome.failures);
                report.pass_rewrites.push(PassRewrites {
                    pass: name.to_string(),
                    files: outcome.rewritten,
                });
            }
            TransformPass::External(program) => {
                if self.settings.dry_run {
                    tracing::warn!("dry run: skipping external pass");
                    return;
                }
                let result = payload.encode().and_then(|encoded| {
                    ExternalTransform::new(program, self.settings.transform_timeout()).run(&encoded, candidates)
                });
                match result {
                    Ok(files) => {
                        tracing::info!(rewritten = files.len(), "external pass complete");
                        report.pass_rewrites.push(PassRewrites {
                            pass: name.to_string(),
                            files,
                        });
                    }
                    Err(err) => {
                        tracing::error!("external pass failed: {}", err);
                        report.add_pass_failure(name, &err);
                    }
                }
            }
        }
    }

    /// Legacy files are rewritten one at a time
    fn rewrite_legacy(
        &self,
        converted: &ConvertedFileSet,
        shapes: &ExportShapeTable,
        legacy: &ScanOutcome,
        report: &mut RewriteReport,
    ) -> Result<()> {
        let rewriter = LegacyRequireRewriter::new(converted, shapes)?;
        let total = legacy.candidates.len();
        let progress = self.stage_progress("Rewriting legacy requires");

        for (index, path) in legacy.candidates.iter().enumerate() {
            let result = rewrite_in_place(path, self.settings.dry_run, |source| {
                Ok(rewriter.rewrite(source, path))
            });
            match result {
                Ok(true) => {
                    tracing::debug!(path = %path.display(), "rewrote legacy file");
                    report.legacy_rewrites.push(path.clone());
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), "{}", err);
                    report.add_failure(path, &err);
                }
            }
            progress(ProgressUpdate::new(index + 1, total, path.display().to_string()));
        }

        tracing::info!(rewritten = report.legacy_rewrites.len(), "legacy rewrite complete");
        Ok(())
    }

    fn stage_progress(&self, stage: &str) -> impl Fn(ProgressUpdate) + Send + Sync {
        let callback = self.progress.clone();
        let stage = stage.to_string();
        move |update: ProgressUpdate| {
            if let Some(callback) = &callback {
                callback(ProgressUpdate::new(
                    update.current,
                    update.total,
                    format!("{} ({}/{})", stage, update.current, update.total),
                ));
            }
        }
    }
}
