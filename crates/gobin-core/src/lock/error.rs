//! Lock failures

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    /// Another invocation held the lock past the timeout
    #[error("timed out waiting for {} ({description})", .path.display())]
    Timeout { path: PathBuf, description: String },

    /// The caller gave up while waiting
    #[error("stopped waiting for {} ({description})", .path.display())]
    Canceled { path: PathBuf, description: String },

    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: &'static str,
    },
}

impl LockError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, LockError::Canceled { .. })
    }
}
