//! Polling acquisition of an fs2 exclusive lock

use super::{LockError, LockGuard};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::time::{Duration, Instant};

/// Poll interval doubles from `FIRST` up to `MAX`
struct Backoff {
    next: Duration,
}

impl Backoff {
    const FIRST: Duration = Duration::from_millis(10);
    const MAX: Duration = Duration::from_millis(250);

    fn new() -> Self {
        Self { next: Self::FIRST }
    }

    fn step(&mut self) -> Duration {
        let current = self.next;
        self.next = (self.next * 2).min(Self::MAX);
        current
    }
}

/// Announce waiting once a build elsewhere has held the lock this long
const ANNOUNCE_AFTER: Duration = Duration::from_secs(2);

pub(crate) fn acquire_until(
    lock_path: &Path,
    timeout: Duration,
    description: &str,
    is_canceled: &dyn Fn() -> bool,
) -> Result<LockGuard, LockError> {
    let io_error = |operation: &'static str| {
        move |source: std::io::Error| LockError::Io {
            source,
            path: lock_path.to_path_buf(),
            operation,
        }
    };

    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent).map_err(io_error("create the directory of"))?;
    }
    let file = open_lock_file(lock_path).map_err(io_error("open"))?;

    let deadline = Instant::now() + timeout;
    let announce_at = Instant::now() + ANNOUNCE_AFTER;
    let mut announced = false;
    let mut backoff = Backoff::new();

    loop {
        match file.try_lock_exclusive() {
            Ok(()) => {
                return Ok(LockGuard {
                    file,
                    path: lock_path.to_path_buf(),
                });
            }
            Err(e) if e.kind() != std::io::ErrorKind::WouldBlock => {
                return Err(io_error("lock")(e));
            }
            Err(_) => {}
        }

        if is_canceled() {
            return Err(LockError::Canceled {
                path: lock_path.to_path_buf(),
                description: description.to_string(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(LockError::Timeout {
                path: lock_path.to_path_buf(),
                description: description.to_string(),
            });
        }
        if !announced && now >= announce_at {
            tracing::info!("Waiting for another {description} to finish...");
            announced = true;
        }

        std::thread::sleep(backoff.step().min(deadline - now));
    }
}

fn open_lock_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}
