//! Error handling for fix-imports
//!
//! Error types and the crate-wide result alias.

pub mod types;

pub use types::{ErrorSeverity, FixImportsError, Result};
