//! RAII lock guard

use std::fs::File;
use std::path::{Path, PathBuf};

/// Holds an exclusive lock until dropped.
///
/// fs2 advisory locks are released when the file descriptor closes, so
/// dropping the `File` is the unlock.
#[derive(Debug)]
pub struct LockGuard {
    #[allow(dead_code)]
    pub(crate) file: File,
    pub(crate) path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "releasing lock");
    }
}
