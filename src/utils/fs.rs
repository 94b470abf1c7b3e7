//! File reading and atomic write-back for rewritten sources

use crate::error::{FixImportsError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Text of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    /// Invalid UTF-8 sequences were replaced while decoding
    pub lossy: bool,
}

/// Read a source file, replacing invalid UTF-8 instead of failing
///
/// Only real I/O failures are errors.
pub fn read_source(path: &Path) -> Result<SourceText> {
    let bytes = fs::read(path).map_err(|e| FixImportsError::read_error(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => SourceText { text, lossy: false },
        Err(err) => SourceText {
            text: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            lossy: true,
        },
    })
}

/// Read `path`, apply `rewrite` and write the result back if it changed
///
/// A lossily decoded file is only ever left alone: if `rewrite` would
/// change it, the file is reported as a write failure instead.
pub fn rewrite_in_place<F>(path: &Path, dry_run: bool, rewrite: F) -> Result<bool>
where
    F: FnOnce(&str) -> Result<String>,
{
    let source = read_source(path)?;
    let updated = rewrite(&source.text)?;
    if source.lossy && updated != source.text {
        return Err(FixImportsError::write_error(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "file is not valid UTF-8"),
        ));
    }
    write_if_changed(path, &source.text, &updated, dry_run)
}

/// Write `updated` over `path` when it differs from `original`
///
/// The new content goes to a temporary file in the same directory which is
/// then renamed over the original, so readers never see a half-written file.
/// Returns whether the content changed. In dry-run mode nothing is written
/// but the change is still reported.
pub fn write_if_changed(path: &Path, original: &str, updated: &str, dry_run: bool) -> Result<bool> {
    if original == updated {
        return Ok(false);
    }
    if dry_run {
        return Ok(true);
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| FixImportsError::write_error(path, e))?;
    temp.write_all(updated.as_bytes())
        .map_err(|e| FixImportsError::write_error(path, e))?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|e| FixImportsError::write_error(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| FixImportsError::write_error(path, e.error))?;
    Ok(true)
}
