//! Advisory file locks serializing builds of the same cache entry
//!
//! Two invocations resolving to the same binary path would otherwise race to
//! check out and build into it. The lock is taken on a sibling lock file via
//! fs2, so it also holds across processes.

use std::path::Path;
use std::time::Duration;

mod acquire;
mod error;
mod guard;

pub use error::LockError;
pub use guard::LockGuard;


/// Acquires an exclusive lock on `lock_path`, waiting at most `timeout`.
///
/// Parent directories are created as needed. The lock is released when the
/// returned guard is dropped.
///
/// # Examples
///
/// ```no_run
/// use gobin_core::lock::acquire_lock;
/// use std::time::Duration;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let lock_path = Path::new("/tmp/.tool.lock");
/// let guard = acquire_lock(lock_path, Duration::from_secs(30), "build tool")?;
/// // build into the cache here
/// drop(guard);
/// # Ok(())
/// # }
/// ```
pub fn acquire_lock(
    lock_path: &Path,
    timeout: Duration,
    description: &str,
) -> Result<LockGuard, LockError> {
    acquire::acquire_until(lock_path, timeout, description, &|| false)
}

/// Like [`acquire_lock`], but gives up with [`LockError::Canceled`] as soon
/// as `is_canceled` returns true between attempts.
pub fn acquire_lock_cancellable(
    lock_path: &Path,
    timeout: Duration,
    description: &str,
    is_canceled: impl Fn() -> bool,
) -> Result<LockGuard, LockError> {
    acquire::acquire_until(lock_path, timeout, description, &is_canceled)
}
