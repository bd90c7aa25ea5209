//! Error types for the patching pipeline

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for patching operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for patching operations
///
/// Every variant is terminal for a run. Recoverable per-rule conditions
/// (missing overlay source, unmapped memory address) are logged as warnings
/// and never surface as an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// An expected directory or file is missing
    #[error("{0}")]
    Environment(String),

    /// The manifest could not be read or has the wrong shape
    #[error("Failed to parse manifest {}: {reason}", .path.display())]
    Parse {
        /// Manifest path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The selected patches contain no applicable rules
    #[error("No patches with folders, files or memory found")]
    EmptySelection,

    /// The external disc tool failed
    #[error("Command failed: {command}{}", render_status(*.code))]
    ExternalTool {
        /// The command line that was run
        command: String,
        /// Exit code, `None` when the process could not be spawned or was killed
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The user declined to continue
    #[error("{0}")]
    UserAbort(String),

    /// The interactive terminal could not be used
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn render_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {code})"),
        None => String::new(),
    }
}

impl Error {
    /// Create a new Environment error
    pub fn environment<S: Into<String>>(msg: S) -> Self {
        Error::Environment(msg.into())
    }

    /// Create a new Parse error
    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Error::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new UserAbort error
    pub fn user_abort<S: Into<String>>(msg: S) -> Self {
        Error::UserAbort(msg.into())
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::UserAbort(_) | Error::Prompt(_) | Error::Io(_) => 1,
            Error::Environment(_) => 2,
            Error::Parse { .. } => 3,
            Error::EmptySelection => 4,
            Error::ExternalTool { .. } => 5,
        }
    }
}
