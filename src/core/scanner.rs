//! Candidate file discovery
//!
//! A cheap textual pre-filter in front of the resolver-backed rewriters. A
//! file is a candidate when it is itself a converted file or when its text
//! mentions the basename of any converted file. The filter may over-select
//! but never drops a file that could hold a reference.

use crate::core::parallel::{parallel_process_with_progress, ProgressUpdate};
use crate::error::{FixImportsError, Result};
use crate::models::rewrite::{ConvertedFileSet, FileFailure, RewriteCandidateSet};
use crate::utils::fs::read_source;
use crate::utils::path_resolver::{absolutize, CANONICAL_EXTENSION, LEGACY_EXTENSION};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Which file extensions a scan considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: &'static [&'static str],
}

impl ExtensionFilter {
    /// Files the structural rewriter can parse
    pub const fn parseable() -> Self {
        Self {
            extensions: &[CANONICAL_EXTENSION, "jsx"],
        }
    }

    /// Files still written in the legacy dialect
    pub const fn legacy() -> Self {
        Self {
            extensions: &[LEGACY_EXTENSION],
        }
    }

    pub fn extensions(&self) -> &[&'static str] {
        self.extensions
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

/// Result of one scan
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: RewriteCandidateSet,
    /// Files that passed the extension filter
    pub files_seen: usize,
    /// Candidates kept only because their text could not be read
    pub unreadable: Vec<PathBuf>,
    /// Directory entries the walk could not visit
    pub traversal_errors: Vec<FileFailure>,
}

/// Walks a search root and selects rewrite candidates
pub struct CandidateFileScanner<'a> {
    converted: &'a ConvertedFileSet,
    basenames: Vec<String>,
    exclude_patterns: Vec<Pattern>,
    follow_links: bool,
}

impl<'a> CandidateFileScanner<'a> {
    /// Create a scanner, compiling the exclude globs
    pub fn new(converted: &'a ConvertedFileSet, exclude_patterns: &[String], follow_links: bool) -> Result<Self> {
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(FixImportsError::from))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            converted,
            basenames: converted.basenames(),
            exclude_patterns,
            follow_links,
        })
    }

    /// Enumerate candidate files under `root` that pass `filter`
    pub fn scan<P>(&self, root: &Path, filter: ExtensionFilter, progress: P) -> Result<ScanOutcome>
    where
        P: Fn(ProgressUpdate) + Send + Sync,
    {
        let root = absolutize(root);
        if !root.is_dir() {
            return Err(FixImportsError::InvalidPath { path: root });
        }

        let (files, traversal_errors) = self.list_files(&root, filter);
        let files_seen = files.len();
        tracing::debug!(
            root = %root.display(),
            extensions = ?filter.extensions(),
            files = files_seen,
            "scanning for candidates"
        );

        let checked = parallel_process_with_progress(
            files,
            |path| {
                let verdict = self.check(&path);
                (path, verdict)
            },
            progress,
        );

        let mut outcome = ScanOutcome {
            files_seen,
            traversal_errors,
            ..ScanOutcome::default()
        };
        for (path, verdict) in checked {
            match verdict {
                Verdict::Skip => {}
                Verdict::Candidate => {
                    outcome.candidates.insert(path);
                }
                Verdict::Unreadable => {
                    outcome.unreadable.push(path.clone());
                    outcome.candidates.insert(path);
                }
            }
        }

        tracing::info!(
            extensions = ?filter.extensions(),
            candidates = outcome.candidates.len(),
            seen = files_seen,
            "scan complete"
        );
        Ok(outcome)
    }

    /// Whether a file with the given text could reference a converted file
    pub fn is_candidate(&self, path: &Path, text: &str) -> bool {
        self.converted.contains(path) || self.basenames.iter().any(|name| text.contains(name.as_str()))
    }

    fn check(&self, path: &Path) -> Verdict {
        if self.converted.contains(path) {
            return Verdict::Candidate;
        }
        match read_source(path) {
            Ok(source) if self.is_candidate(path, &source.text) => Verdict::Candidate,
            Ok(_) => Verdict::Skip,
            Err(err) => {
                tracing::warn!(path = %path.display(), "keeping unreadable file as candidate: {}", err);
                Verdict::Unreadable
            }
        }
    }

    fn list_files(&self, root: &Path, filter: ExtensionFilter) -> (Vec<PathBuf>, Vec<FileFailure>) {
        let mut files = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && filter.matches(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    tracing::warn!(path = %path.display(), "skipping entry: {}", err);
                    errors.push(FileFailure::new(path, err.to_string()));
                }
            }
        }

        (files, errors)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&name) || pattern.matches_path(entry.path()))
    }
}

enum Verdict {
    Skip,
    Candidate,
    Unreadable,
}
