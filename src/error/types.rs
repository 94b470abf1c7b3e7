//! Error types and definitions for fix-imports
//!
//! Every failure the rewrite pass can hit is a variant of [`FixImportsError`].
//! Each variant carries a severity so callers can decide whether a failure
//! abandons one file, one sub-pass, or the whole run.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Error severity levels for different error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Warning level errors - operation can continue
    Warning,
    /// Error level - current operation fails but overall process can continue
    Error,
    /// Critical level - process should terminate
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARNING"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Main error type for fix-imports operations
#[derive(Debug, Error)]
pub enum FixImportsError {
    /// Standard IO errors
    #[error("IO error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// A candidate or converted file could not be read
    #[error("Error reading {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rewritten file could not be written back
    #[error("Error writing {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source text could not be parsed structurally
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Permission denied errors
    #[error("Permission denied accessing {path}")]
    PermissionDenied { path: PathBuf },

    /// Invalid path errors
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Glob pattern errors
    #[error("Glob pattern error: {source}")]
    GlobPattern {
        #[source]
        source: glob::PatternError,
    },

    /// Configuration file not found
    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file read errors
    #[error("Error reading configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file parse errors
    #[error("Error parsing configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The encoded transform payload could not be decoded
    #[error("Invalid transform payload: {message}")]
    PayloadDecode { message: String },

    /// An external transform pass exited abnormally
    #[error("Transform pass '{pass}' failed: {message}")]
    ExternalTool { pass: String, message: String },

    /// An external transform pass ran past its deadline
    #[error("Transform pass '{pass}' timed out after {timeout:?}")]
    ExternalToolTimeout { pass: String, timeout: Duration },

    /// Output file write errors
    #[error("Error writing to output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stdout write errors
    #[error("Error writing to stdout: {source}")]
    StdoutWrite {
        #[source]
        source: std::io::Error,
    },

    /// Parallel execution error
    #[error("Parallel execution error: {message}")]
    ParallelExecution { message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    /// Output directory not found
    #[error("Output directory not found: {path}")]
    OutputDirectoryNotFound { path: PathBuf },
}

impl FixImportsError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Per-file failures: the file is abandoned, the pass continues
            FixImportsError::FileRead { .. } => ErrorSeverity::Warning,
            FixImportsError::FileWrite { .. } => ErrorSeverity::Warning,
            FixImportsError::Parse { .. } => ErrorSeverity::Warning,
            FixImportsError::PermissionDenied { .. } => ErrorSeverity::Warning,

            FixImportsError::Config { .. } => ErrorSeverity::Critical,
            FixImportsError::ConfigNotFound { .. } => ErrorSeverity::Critical,
            FixImportsError::ConfigRead { .. } => ErrorSeverity::Critical,
            FixImportsError::ConfigParse { .. } => ErrorSeverity::Critical,
            FixImportsError::PayloadDecode { .. } => ErrorSeverity::Critical,
            FixImportsError::InvalidPath { .. } => ErrorSeverity::Critical,
            FixImportsError::GlobPattern { .. } => ErrorSeverity::Critical,
            FixImportsError::StdoutWrite { .. } => ErrorSeverity::Critical,
            FixImportsError::OutputDirectoryNotFound { .. } => ErrorSeverity::Critical,

            _ => ErrorSeverity::Error,
        }
    }

    /// Check if this is a critical error that should terminate the process
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            FixImportsError::PermissionDenied { path } => {
                format!("Cannot access '{}' due to permission denied. Check file permissions.", path.display())
            }
            FixImportsError::FileRead { path, source } => {
                format!("Could not read '{}': {}. The file was left unchanged.", path.display(), source)
            }
            FixImportsError::FileWrite { path, source } => {
                format!("Could not write '{}': {}. The file was left unchanged.", path.display(), source)
            }
            FixImportsError::Parse { path, message } => {
                format!("Could not parse '{}': {}. Its imports were not updated.", path.display(), message)
            }
            FixImportsError::InvalidPath { path } => {
                format!("Invalid path: '{}'. Please provide an existing path.", path.display())
            }
            FixImportsError::ConfigNotFound { path } => {
                format!("Configuration file not found at '{}'. Create one with `fix-imports init` or use command line options.", path.display())
            }
            FixImportsError::PayloadDecode { message } => {
                format!("The encoded transform options could not be decoded: {}.", message)
            }
            FixImportsError::ExternalToolTimeout { pass, timeout } => {
                format!("Transform pass '{}' did not finish within {}s. Raise transform_timeout_secs or check the script.", pass, timeout.as_secs())
            }
            FixImportsError::OutputDirectoryNotFound { path } => {
                format!("Output directory '{}' does not exist. Please create the directory or specify a different output path.", path.display())
            }
            _ => self.to_string(),
        }
    }

    /// Path of the file this error concerns, if it is a per-file failure
    pub fn file_path(&self) -> Option<&std::path::Path> {
        match self {
            FixImportsError::FileRead { path, .. }
            | FixImportsError::FileWrite { path, .. }
            | FixImportsError::Parse { path, .. }
            | FixImportsError::PermissionDenied { path } => Some(path),
            _ => None,
        }
    }

    /// Create an IO error with context
    pub fn io_error(source: std::io::Error) -> Self {
        FixImportsError::Io { source }
    }

    /// Create a file read error, mapping permission failures
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return FixImportsError::PermissionDenied { path };
        }
        FixImportsError::FileRead { path, source }
    }

    /// Create a file write error
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixImportsError::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a file
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FixImportsError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        FixImportsError::Config {
            message: message.into(),
        }
    }

    /// Create a payload decoding error
    pub fn payload_error(message: impl Into<String>) -> Self {
        FixImportsError::PayloadDecode {
            message: message.into(),
        }
    }

    /// Create an external tool failure for a named pass
    pub fn external_tool_error(pass: impl Into<String>, message: impl Into<String>) -> Self {
        FixImportsError::ExternalTool {
            pass: pass.into(),
            message: message.into(),
        }
    }
}

// Implement From for common error types
impl From<std::io::Error> for FixImportsError {
    fn from(err: std::io::Error) -> Self {
        FixImportsError::io_error(err)
    }
}

impl From<glob::PatternError> for FixImportsError {
    fn from(err: glob::PatternError) -> Self {
        FixImportsError::GlobPattern { source: err }
    }
}

impl From<serde_json::Error> for FixImportsError {
    fn from(err: serde_json::Error) -> Self {
        FixImportsError::JsonSerialize { source: err }
    }
}

/// Result type alias for fix-imports operations
pub type Result<T> = std::result::Result<T, FixImportsError>;
