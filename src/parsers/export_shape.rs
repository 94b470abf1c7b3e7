//! Export shape classification for converted files
//!
//! Decides whether a converted module's value now sits behind a default
//! export. This is a text heuristic rather than a parse: the only question
//! downstream rewriters ask is whether consumers need an extra `.default`.

use crate::models::rewrite::{ConvertedFileSet, ExportShape, ExportShapeTable, FileFailure};
use crate::utils::fs::read_source;
use rayon::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

/// Top-level statements in converted output start at column zero
static DEFAULT_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^export\s+default\b").expect("static pattern compiles"));

/// Classifier for converted-file export shapes
pub struct ExportShapeClassifier;

impl ExportShapeClassifier {
    /// Classify one converted file from its post-conversion text
    pub fn classify(text: &str) -> ExportShape {
        if DEFAULT_EXPORT.is_match(text) {
            ExportShape::ESDefault
        } else {
            ExportShape::CommonJS
        }
    }

    /// Classify every converted file, reading them in parallel
    ///
    /// Unreadable files are treated as CommonJS (no accessor is added for
    /// them) and returned as failures.
    pub fn classify_files(converted: &ConvertedFileSet) -> (ExportShapeTable, Vec<FileFailure>) {
        let outcomes: Vec<_> = converted
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|path| (path.clone(), read_source(path).map(|source| Self::classify(&source.text))))
            .collect();

        let mut table = ExportShapeTable::new();
        let mut failures = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(shape) => {
                    tracing::debug!(path = %path.display(), ?shape, "classified export shape");
                    table.insert(path, shape);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), "could not classify: {}", err);
                    failures.push(FileFailure::from_error(&path, &err));
                    table.insert(path, ExportShape::CommonJS);
                }
            }
        }
        (table, failures)
    }
}
