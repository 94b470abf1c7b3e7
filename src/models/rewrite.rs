//! Data model shared by the resolver, scanner and rewriters

use crate::error::FixImportsError;
use crate::utils::path_resolver::{absolutize, strip_legacy_extension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Absolute paths of the files produced by the conversion step
///
/// Built once per pass and never mutated afterwards. Membership is the only
/// thing that decides whether a reference gets rewritten.
#[derive(Debug, Clone, Default)]
pub struct ConvertedFileSet {
    members: HashSet<PathBuf>,
    ordered: Vec<PathBuf>,
}

impl ConvertedFileSet {
    /// Build the set from (possibly relative) paths, absolutizing each one
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut members = HashSet::new();
        let mut ordered = Vec::new();
        for path in paths {
            let path = absolutize(path.as_ref());
            if members.insert(path.clone()) {
                ordered.push(path);
            }
        }
        Self { members, ordered }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.members.contains(path)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Members in the order they were supplied
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.ordered.iter()
    }

    /// Extension-stripped basenames of every member, deduplicated
    pub fn basenames(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        for path in &self.ordered {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                let stem = strip_legacy_extension(name);
                let stem = Path::new(stem)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(stem);
                if !stem.is_empty() {
                    seen.insert(stem.to_string());
                }
            }
        }
        seen.into_iter().collect()
    }
}

/// Outcome of resolving a module specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    Resolved(PathBuf),
    /// No file on disk matches; the reference is left alone
    Unresolved,
}

impl ResolvedPath {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ResolvedPath::Resolved(path) => Some(path),
            ResolvedPath::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedPath::Resolved(_))
    }

    /// True when the specifier resolves into the converted set
    pub fn is_converted(&self, converted: &ConvertedFileSet) -> bool {
        self.as_path().is_some_and(|path| converted.contains(path))
    }
}

/// How a converted module now exposes its primary value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportShape {
    /// Value is still the module-level export object
    CommonJS,
    /// Value moved behind a default export; consumers need `.default`
    ESDefault,
}

impl ExportShape {
    /// Property accessor legacy consumers must append to their require call
    pub fn accessor(self) -> Option<&'static str> {
        match self {
            ExportShape::CommonJS => None,
            ExportShape::ESDefault => Some(".default"),
        }
    }
}

/// Export shape of every converted file, computed once per pass
#[derive(Debug, Clone, Default)]
pub struct ExportShapeTable {
    shapes: HashMap<PathBuf, ExportShape>,
}

impl ExportShapeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, shape: ExportShape) {
        self.shapes.insert(path, shape);
    }

    /// Shape of a converted file; files never classified count as CommonJS
    pub fn shape_of(&self, path: &Path) -> ExportShape {
        self.shapes.get(path).copied().unwrap_or(ExportShape::CommonJS)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of files that need a `.default` accessor
    pub fn default_export_count(&self) -> usize {
        self.shapes
            .values()
            .filter(|shape| **shape == ExportShape::ESDefault)
            .count()
    }
}

/// Files the scanner flagged as possibly referencing a converted file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteCandidateSet {
    files: BTreeSet<PathBuf>,
}

impl RewriteCandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.files.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Candidates in sorted path order
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.files.iter().cloned().collect()
    }
}

impl FromIterator<PathBuf> for RewriteCandidateSet {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// A single file whose rewrite was abandoned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Record an error, falling back to `path` when the error carries none
    pub fn from_error(path: &Path, err: &FixImportsError) -> Self {
        let path = err.file_path().unwrap_or(path);
        Self::new(path, err.user_message())
    }
}

/// A transform pass that failed as a whole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassFailure {
    pub pass: String,
    pub message: String,
}

/// Files touched by one named transform pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassRewrites {
    pub pass: String,
    pub files: Vec<PathBuf>,
}

/// Everything a rewrite pass did, for reporting to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteReport {
    pub converted_files: usize,
    pub default_exports: usize,
    pub parseable_candidates: usize,
    pub legacy_candidates: usize,
    pub structural_rewrites: Vec<PathBuf>,
    pub pass_rewrites: Vec<PassRewrites>,
    pub legacy_rewrites: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub pass_failures: Vec<PassFailure>,
    pub dry_run: bool,
    pub duration: Duration,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl RewriteReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            converted_files: 0,
            default_exports: 0,
            parseable_candidates: 0,
            legacy_candidates: 0,
            structural_rewrites: Vec::new(),
            pass_rewrites: Vec::new(),
            legacy_rewrites: Vec::new(),
            failures: Vec::new(),
            pass_failures: Vec::new(),
            dry_run,
            duration: Duration::default(),
            generated_at: chrono::Utc::now(),
        }
    }

    /// Union of every file touched by any stage, sorted and deduplicated
    pub fn rewritten_files(&self) -> Vec<PathBuf> {
        let mut files: BTreeSet<PathBuf> = self.structural_rewrites.iter().cloned().collect();
        for pass in &self.pass_rewrites {
            files.extend(pass.files.iter().cloned());
        }
        files.extend(self.legacy_rewrites.iter().cloned());
        files.into_iter().collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.pass_failures.is_empty()
    }

    pub fn add_failure(&mut self, path: &Path, err: &FixImportsError) {
        self.failures.push(FileFailure::from_error(path, err));
    }

    pub fn add_pass_failure(&mut self, pass: impl Into<String>, err: &FixImportsError) {
        self.pass_failures.push(PassFailure {
            pass: pass.into(),
            message: err.user_message(),
        });
    }
}
