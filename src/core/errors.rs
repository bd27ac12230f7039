/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been killed or never existed. Check PID validity.")
    )]
    NotFound(Pid),

    #[error("Invalid process state: {0}")]
    #[diagnostic(
        code(process::invalid_state),
        help("Operation cannot be performed in current process state.")
    )]
    InvalidState(String),

    #[error("Process run failed: {0}")]
    #[diagnostic(
        code(process::run_failed),
        help("The workload reported a failure. View logs for details.")
    )]
    Failed(String),
}

impl From<serde_json::Error> for ProcessError {
    fn from(err: serde_json::Error) -> Self {
        ProcessError::Failed(format!("memory codec: {}", err))
    }
}

/// Persistent store errors
#[derive(Error, Debug, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(store::io_error),
        help("Check that the state directory exists and is writable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed state document {path}: {source}")]
    #[diagnostic(
        code(store::json_error),
        help("The state file is not a JSON object. Run `kernel reset` to start over.")
    )]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Invalid configuration. Review KERNEL_* environment variables.")
    )]
    Configuration(String),
}

/// Result type for process operations
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;
