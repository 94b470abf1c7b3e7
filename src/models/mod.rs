//! Data models and structures for fix-imports

pub mod config;
pub mod rewrite;

pub use config::{OutputFormat, PartialSettings, Settings};
pub use rewrite::{
    ConvertedFileSet, ExportShape, ExportShapeTable, FileFailure, PassFailure, PassRewrites,
    ResolvedPath, RewriteCandidateSet, RewriteReport,
};
