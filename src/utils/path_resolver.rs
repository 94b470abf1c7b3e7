//! Module path resolution utilities
//!
//! Every converted file is assumed to live under the canonical `.js`
//! extension now, whatever extension the specifier still mentions. A
//! specifier is normalized by dropping a trailing legacy extension and then
//! appending `.js` when it is missing.

use crate::models::rewrite::ResolvedPath;
use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};

/// Extension every converted file now carries
pub const CANONICAL_EXTENSION: &str = "js";

/// Extension of the files that were converted away
pub const LEGACY_EXTENSION: &str = "coffee";

const LEGACY_SUFFIX: &str = ".coffee";
const DOUBLE_LEGACY_SUFFIX: &str = ".js.coffee";
const CANONICAL_SUFFIX: &str = ".js";

/// Strip a trailing `.js.coffee` or `.coffee` from a specifier
///
/// `bar.js.coffee` and `bar.coffee` both become `bar`; anything else is
/// returned unchanged.
pub fn strip_legacy_extension(specifier: &str) -> &str {
    if let Some(stripped) = specifier.strip_suffix(DOUBLE_LEGACY_SUFFIX) {
        return stripped;
    }
    specifier.strip_suffix(LEGACY_SUFFIX).unwrap_or(specifier)
}

/// Normalize a specifier to the canonical extension
pub fn normalize_specifier(specifier: &str) -> String {
    let stripped = strip_legacy_extension(specifier);
    if stripped.ends_with(CANONICAL_SUFFIX) {
        stripped.to_string()
    } else {
        format!("{}{}", stripped, CANONICAL_SUFFIX)
    }
}

/// Whether a specifier is resolved against the importing file's directory
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Lexically collapse `.` and `..` components without touching the disk
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Make a path absolute against the current directory and normalize it
pub fn absolutize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    normalize_path(&absolute)
}

/// Resolves module specifiers to files on disk
///
/// Relative specifiers resolve against the importer's directory; bare
/// specifiers are tried against each import root in order. There is no
/// directory-index fallback.
#[derive(Debug, Default)]
pub struct PathResolver {
    roots: Vec<PathBuf>,
    file_exists_cache: DashMap<PathBuf, bool>,
}

impl PathResolver {
    /// Create a resolver for the given ordered import roots
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            roots: roots.into_iter().map(|root| absolutize(root.as_ref())).collect(),
            file_exists_cache: DashMap::new(),
        }
    }

    /// A resolver that only understands relative specifiers
    pub fn relative_only() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve a module specifier to an absolute path
    pub fn resolve(&self, specifier: &str, importing_file: &Path) -> ResolvedPath {
        if specifier.is_empty() {
            return ResolvedPath::Unresolved;
        }

        if is_relative_specifier(specifier) {
            self.resolve_relative(specifier, importing_file)
        } else {
            self.resolve_absolute(specifier)
        }
    }

    /// Resolve against the importing file's directory only
    pub fn resolve_relative(&self, specifier: &str, importing_file: &Path) -> ResolvedPath {
        if !is_relative_specifier(specifier) {
            return ResolvedPath::Unresolved;
        }

        let importing_file = absolutize(importing_file);
        let base = importing_file.parent().unwrap_or(&importing_file);
        let candidate = normalize_path(&base.join(normalize_specifier(specifier)));

        if self.check_file_exists(&candidate) {
            ResolvedPath::Resolved(candidate)
        } else {
            ResolvedPath::Unresolved
        }
    }

    /// Resolve a bare specifier against the import roots, first hit wins
    fn resolve_absolute(&self, specifier: &str) -> ResolvedPath {
        let normalized = normalize_specifier(specifier);
        for root in &self.roots {
            let candidate = normalize_path(&root.join(&normalized));
            if self.check_file_exists(&candidate) {
                return ResolvedPath::Resolved(candidate);
            }
        }
        ResolvedPath::Unresolved
    }

    /// Check if file exists with caching
    fn check_file_exists(&self, path: &Path) -> bool {
        if let Some(cached) = self.file_exists_cache.get(path) {
            return *cached;
        }

        let exists = path.exists();
        self.file_exists_cache.insert(path.to_path_buf(), exists);
        exists
    }
}
