use std::path::PathBuf;
use thiserror::Error;

use crate::lock::LockError;

#[derive(Error, Debug)]
pub enum GobinError {
    // Input errors
    #[error("INVALID_REFERENCE: {reason}: '{reference}'")]
    InvalidReference { reference: String, reason: String },

    // Resolution errors
    #[error("RESOLUTION_FAILED: failed to parse import path '{import_path}': {reason}")]
    ResolutionFailed { import_path: String, reason: String },

    // Toolchain errors
    #[error("TOOLCHAIN_DETECTION: failed to detect go version: {0}")]
    ToolchainDetection(String),

    // Fetch errors
    #[error("FETCH_FAILED: failed to check out {repository} at {revision}: {reason}")]
    FetchFailed {
        repository: String,
        revision: String,
        reason: String,
    },

    // Build errors
    #[error("BUILD_FAILED: `{command}` failed (compiler output above)")]
    BuildFailed { command: String, output: String },

    #[error("CANCELED: operation was canceled")]
    Canceled,

    #[error("COMMAND_FAILED: failed to run '{program}': {reason}")]
    CommandFailed { program: String, reason: String },

    #[error("UNSAFE_PATH: {what} '{value}' would escape {base}")]
    UnsafePath {
        what: String,
        value: String,
        base: PathBuf,
    },

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParseError(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    #[error("LOCK_ERROR: {0}")]
    Lock(#[from] LockError),

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Generic(String),
}

impl GobinError {
    /// Whether this error represents caller-initiated cancellation
    pub fn is_canceled(&self) -> bool {
        matches!(self, GobinError::Canceled)
    }

    /// Replaces this error with `f(self)` unless it is a cancellation, which
    /// is always propagated as-is.
    pub fn wrap_unless_canceled<F>(self, f: F) -> GobinError
    where
        F: FnOnce(GobinError) -> GobinError,
    {
        if self.is_canceled() { self } else { f(self) }
    }
}

pub type Result<T> = std::result::Result<T, GobinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reference_message_names_expected_form() {
        let err = GobinError::InvalidReference {
            reference: "example.org/org/tool".to_string(),
            reason: "missing version, expected example.org/org/tool@vX.X.X".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("INVALID_REFERENCE"));
        assert!(msg.contains("example.org/org/tool@vX.X.X"));
    }

    #[test]
    fn test_wrap_unless_canceled_keeps_cancellation() {
        let wrapped = GobinError::Canceled.wrap_unless_canceled(|e| GobinError::FetchFailed {
            repository: "r".to_string(),
            revision: "v1".to_string(),
            reason: e.to_string(),
        });
        assert!(wrapped.is_canceled());
    }

    #[test]
    fn test_wrap_unless_canceled_wraps_other_errors() {
        let wrapped = GobinError::Generic("boom".to_string())
            .wrap_unless_canceled(|e| GobinError::ToolchainDetection(e.to_string()));
        assert!(matches!(wrapped, GobinError::ToolchainDetection(ref m) if m == "boom"));
    }
}
