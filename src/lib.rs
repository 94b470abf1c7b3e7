//! fix-imports - rewrite import references after a CoffeeScript to JavaScript conversion
//!
//! Given the files that were just converted, this library finds every file
//! under a search root that refers to one of them and rewrites the
//! reference: parseable JavaScript files through the OXC AST, legacy
//! CoffeeScript files through per-module patterns that also add a
//! `.default` accessor when the converted module now has a default export.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{CandidateFileScanner, RewriteOrchestrator, TransformPayload};
pub use error::{ErrorSeverity, FixImportsError, Result};
pub use models::{
    config::Settings,
    rewrite::{ConvertedFileSet, ExportShape, ExportShapeTable, ResolvedPath, RewriteReport},
};
pub use parsers::{ASTImportRewriter, ExportShapeClassifier, LegacyRequireRewriter};
pub use utils::PathResolver;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
