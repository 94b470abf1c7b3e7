//! Core functionality for scanning the search tree and driving rewrite passes

pub mod orchestrator;
pub mod parallel;
pub mod scanner;
pub mod transform;

pub use orchestrator::RewriteOrchestrator;
pub use scanner::{CandidateFileScanner, ExtensionFilter, ScanOutcome};
pub use transform::{BuiltinPass, StructuralContext, TransformPass, TransformPayload};
