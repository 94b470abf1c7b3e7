//! Pattern-based require rewriting for legacy source files
//!
//! Legacy files cannot be parsed, so references are found with one regular
//! expression per converted basename. Only the first match per basename is
//! considered; later requires of the same module are left as they are.

use crate::error::{FixImportsError, Result};
use crate::models::rewrite::{ConvertedFileSet, ExportShapeTable};
use crate::utils::path_resolver::{strip_legacy_extension, PathResolver};
use regex::Regex;
use std::path::Path;

const DEFAULT_ACCESSOR: &str = ".default";

/// Compiled matcher for `name = require("…/basename[.js].coffee")`
#[derive(Debug)]
struct BasenamePattern {
    basename: String,
    regex: Regex,
}

impl BasenamePattern {
    fn new(basename: &str) -> Result<Self> {
        let pattern = format!(
            r#"\w+\s*=\s*require\(\s*["']((?:[\w\-.]+/)*{}(?:(?:\.js)?\.coffee)?)["']\s*\)"#,
            regex::escape(basename)
        );
        let regex = Regex::new(&pattern).map_err(|e| {
            FixImportsError::config_error(format!("invalid pattern for '{}': {}", basename, e))
        })?;
        Ok(Self {
            basename: basename.to_string(),
            regex,
        })
    }
}

/// Rewrites assignment-style requires of converted modules in legacy files
pub struct LegacyRequireRewriter<'a> {
    converted: &'a ConvertedFileSet,
    shapes: &'a ExportShapeTable,
    resolver: PathResolver,
    patterns: Vec<BasenamePattern>,
}

impl<'a> LegacyRequireRewriter<'a> {
    /// Compile one pattern per converted basename
    pub fn new(converted: &'a ConvertedFileSet, shapes: &'a ExportShapeTable) -> Result<Self> {
        let patterns = converted
            .basenames()
            .iter()
            .map(|name| BasenamePattern::new(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            converted,
            shapes,
            resolver: PathResolver::relative_only(),
            patterns,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Return `source` with the first matching require per basename rewritten
    pub fn rewrite(&self, source: &str, importing_file: &Path) -> String {
        let mut text = source.to_string();
        for pattern in &self.patterns {
            if let Some(updated) = self.rewrite_first(&text, importing_file, pattern) {
                text = updated;
            }
        }
        text
    }

    fn rewrite_first(&self, text: &str, importing_file: &Path, pattern: &BasenamePattern) -> Option<String> {
        let caps = pattern.regex.captures(text)?;
        let whole = caps.get(0)?;
        let path = caps.get(1)?;

        let resolved = self.resolver.resolve_relative(path.as_str(), importing_file);
        let target = resolved.as_path().filter(|p| self.converted.contains(p))?;

        let stripped = strip_legacy_extension(path.as_str());
        let rest = &text[whole.end()..];
        let accessor = match self.shapes.shape_of(target).accessor() {
            Some(accessor) if !rest.starts_with(DEFAULT_ACCESSOR) => accessor,
            _ => "",
        };

        if stripped == path.as_str() && accessor.is_empty() {
            return None;
        }

        tracing::debug!(
            file = %importing_file.display(),
            basename = %pattern.basename,
            target = %target.display(),
            "rewriting legacy require"
        );

        let mut out = String::with_capacity(text.len() + accessor.len());
        out.push_str(&text[..path.start()]);
        out.push_str(stripped);
        out.push_str(&text[path.end()..whole.end()]);
        out.push_str(accessor);
        out.push_str(rest);
        Some(out)
    }
}
