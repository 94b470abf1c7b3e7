//! Source rewriting for consumer files
//!
//! Parseable files are rewritten structurally through the OXC AST, legacy
//! files through per-basename patterns. Export shapes of converted files are
//! classified here as well since both rewriters depend on them.

pub mod ast_rewriter;
pub mod export_shape;
pub mod legacy_require;

pub use ast_rewriter::ASTImportRewriter;
pub use export_shape::ExportShapeClassifier;
pub use legacy_require::LegacyRequireRewriter;
