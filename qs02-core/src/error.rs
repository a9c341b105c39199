// ============================================================================
// qs02-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for qs02-core
//
// This module defines the error taxonomy shared by the classification engine
// and its collaborators. The three domain failures (probe unavailable, missing
// required stream, unsupported container) are per-file conditions: a batch
// driver reports them and moves on to the next file.
//
// KEY COMPONENTS:
// - CoreError: Main error enum for all qs02-core operations
// - CoreResult: Convenience alias for Result<T, CoreError>
// - Helper constructors for command execution failures

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Kind of stream a plan or evaluation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredStream {
    Video,
    Audio,
}

impl fmt::Display for RequiredStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredStream::Video => write!(f, "video"),
            RequiredStream::Audio => write!(f, "audio"),
        }
    }
}

/// Errors produced by qs02-core.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- Domain Errors ----
    /// The probe collaborator could not describe the file.
    #[error("Probe unavailable for {}: {reason}", path.display())]
    ProbeUnavailable { path: PathBuf, reason: String },

    #[error("Missing required {kind} stream")]
    MissingRequiredStream { kind: RequiredStream },

    #[error("Unsupported container extension: {0}")]
    UnsupportedContainerExtension(String),

    // ---- I/O and Parsing ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No processable video files found")]
    NoFilesFound,

    #[error("Directory traversal error: {0}")]
    Walkdir(#[from] walkdir::Error),

    // ---- External Commands ----
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("Command '{0}' failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Encoder '{0}' is not available in this ffmpeg build")]
    EncoderUnavailable(String),

    // ---- Configuration ----
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// Returns true when the error only affects the file being processed and
    /// a batch should continue with its siblings.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            CoreError::ProbeUnavailable { .. }
                | CoreError::MissingRequiredStream { .. }
                | CoreError::UnsupportedContainerExtension(_)
                | CoreError::CommandFailed(..)
        )
    }
}

/// Result type for qs02-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a `CommandStart` error for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a `CommandFailed` error for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}
