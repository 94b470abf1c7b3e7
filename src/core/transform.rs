//! Named structural transform passes
//!
//! Two passes are built in and run in process. Any other pass name is taken
//! to be an executable that receives the encoded payload and the candidate
//! files on its command line, and rewrites those files in place.

use crate::core::parallel::{parallel_process_with_progress, ProgressUpdate};
use crate::error::{FixImportsError, Result};
use crate::models::rewrite::{ConvertedFileSet, FileFailure};
use crate::parsers::ASTImportRewriter;
use crate::utils::fs::rewrite_in_place;
use crate::utils::path_resolver::{absolutize, PathResolver};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Built-in pass that strips legacy extensions from references to converted files
pub const FIX_IMPORTS_PASS: &str = "remove-coffee-from-all-modified-imports";

/// Built-in pass that strips legacy extensions from every specifier
pub const STRIP_ALL_PASS: &str = "remove-coffee-from-imports";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Context handed to structural transforms running out of process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformPayload {
    pub converted_files: Vec<PathBuf>,
    pub absolute_import_paths: Vec<PathBuf>,
}

impl TransformPayload {
    /// Every path in the payload is absolute, so an external pass may run anywhere
    pub fn new(converted: &ConvertedFileSet, absolute_import_paths: &[PathBuf]) -> Self {
        Self {
            converted_files: converted.iter().cloned().collect(),
            absolute_import_paths: absolute_import_paths.iter().map(|root| absolutize(root)).collect(),
        }
    }

    /// JSON, zlib-compressed, base64 text
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;
        Ok(STANDARD.encode(compressed))
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        let compressed = STANDARD
            .decode(encoded.trim())
            .map_err(|e| FixImportsError::payload_error(format!("invalid base64: {}", e)))?;

        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| FixImportsError::payload_error(format!("invalid compressed data: {}", e)))?;

        serde_json::from_slice(&json)
            .map_err(|e| FixImportsError::payload_error(format!("invalid payload JSON: {}", e)))
    }

    pub fn converted_set(&self) -> ConvertedFileSet {
        ConvertedFileSet::from_paths(&self.converted_files)
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(&self.absolute_import_paths)
    }
}

/// Passes implemented in process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinPass {
    /// Rewrite only specifiers that resolve into the converted set
    FixImports,
    /// Strip the legacy extension from every specifier
    StripAll,
}

impl BuiltinPass {
    /// Look up a built-in by name; a trailing `.js` is ignored
    pub fn from_name(name: &str) -> Option<Self> {
        match name.strip_suffix(".js").unwrap_or(name) {
            FIX_IMPORTS_PASS => Some(BuiltinPass::FixImports),
            STRIP_ALL_PASS => Some(BuiltinPass::StripAll),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinPass::FixImports => FIX_IMPORTS_PASS,
            BuiltinPass::StripAll => STRIP_ALL_PASS,
        }
    }
}

/// A configured pass, resolved from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformPass {
    Builtin(BuiltinPass),
    External(PathBuf),
}

impl TransformPass {
    pub fn resolve(name: &str) -> Self {
        match BuiltinPass::from_name(name) {
            Some(pass) => TransformPass::Builtin(pass),
            None => TransformPass::External(PathBuf::from(name)),
        }
    }
}

/// What a pass did to a batch of files
#[derive(Debug, Default)]
pub struct PassOutcome {
    pub rewritten: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Shared, read-only inputs of the structural passes
pub struct StructuralContext {
    pub converted: ConvertedFileSet,
    pub resolver: PathResolver,
    rewriter: ASTImportRewriter,
}

impl StructuralContext {
    pub fn new(converted: ConvertedFileSet, resolver: PathResolver) -> Self {
        Self {
            converted,
            resolver,
            rewriter: ASTImportRewriter::new(),
        }
    }

    pub fn from_payload(payload: &TransformPayload) -> Self {
        Self::new(payload.converted_set(), payload.resolver())
    }

    /// Compute the rewritten text of one file
    pub fn rewrite_source(&self, pass: BuiltinPass, source: &str, path: &Path) -> Result<String> {
        match pass {
            BuiltinPass::FixImports => {
                self.rewriter.rewrite(source, path, &self.converted, &self.resolver)
            }
            BuiltinPass::StripAll => self.rewriter.rewrite_with(source, path, |_| true),
        }
    }

    /// Read, rewrite and write back one file; returns whether it changed
    pub fn rewrite_file(&self, pass: BuiltinPass, path: &Path, dry_run: bool) -> Result<bool> {
        rewrite_in_place(path, dry_run, |source| self.rewrite_source(pass, source, path))
    }

    /// Apply a built-in pass to every file in parallel on the current pool
    pub fn apply<P>(&self, pass: BuiltinPass, files: &[PathBuf], dry_run: bool, progress: P) -> PassOutcome
    where
        P: Fn(ProgressUpdate) + Send + Sync,
    {
        let results = parallel_process_with_progress(
            files.to_vec(),
            |path| {
                let result = self.rewrite_file(pass, &path, dry_run);
                (path, result)
            },
            progress,
        );

        let mut outcome = PassOutcome::default();
        for (path, result) in results {
            match result {
                Ok(true) => {
                    tracing::debug!(pass = pass.name(), path = %path.display(), "rewrote file");
                    outcome.rewritten.push(path);
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(pass = pass.name(), path = %path.display(), "{}", err);
                    outcome.failures.push(FileFailure::from_error(&path, &err));
                }
            }
        }
        outcome
    }
}

/// An external transform executable
pub struct ExternalTransform {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalTransform {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn pass_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Run the executable over `files` and report which files it changed
    pub fn run(&self, encoded_payload: &str, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let before: Vec<Option<Vec<u8>>> = files.iter().map(|f| fs::read(f).ok()).collect();

        let mut child = Command::new(&self.program)
            .arg(format!("--encoded-options={}", encoded_payload))
            .args(files)
            .stdin(Stdio::null())
            .stdout(std::io::stderr())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FixImportsError::external_tool_error(self.pass_name(), format!("failed to start: {}", e)))?;

        // the tool's output is echoed to our stderr; stderr is also kept for the failure message
        let stderr_reader = child.stderr.take().map(|stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                for line in BufReader::new(stderr).lines().map_while(|line| line.ok()) {
                    eprintln!("{}", line);
                    buf.push_str(&line);
                    buf.push('\n');
                }
                buf
            })
        });

        let started = Instant::now();
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None => {
                    if let Some(timeout) = self.timeout {
                        if started.elapsed() >= timeout {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(FixImportsError::ExternalToolTimeout {
                                pass: self.pass_name(),
                                timeout,
                            });
                        }
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let detail = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(FixImportsError::external_tool_error(
                self.pass_name(),
                format!("exited with {}{}{}", status, if detail.is_empty() { "" } else { ": " }, detail),
            ));
        }

        let changed = files
            .iter()
            .zip(before)
            .filter(|(file, before)| fs::read(file).ok() != *before)
            .map(|(file, _)| file.clone())
            .collect();
        Ok(changed)
    }
}
