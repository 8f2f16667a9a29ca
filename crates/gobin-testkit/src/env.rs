//! Environment isolation utilities for testing

use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Static mutex to serialize tests that modify environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 3] = ["HOME", "GOBIN_CACHE_DIR", "GOBIN_CONFIG"];

/// Run a test with an isolated HOME and cache root
///
/// Sets `HOME` to a fresh temporary directory, points `GOBIN_CACHE_DIR` at
/// `<home>/.cache/gobin` and clears `GOBIN_CONFIG`. The closure receives the
/// cache root. Everything is restored afterwards.
///
/// ```no_run
/// use gobin_testkit::with_isolated_gobin_env;
///
/// with_isolated_gobin_env(|cache_root| {
///     assert!(cache_root.ends_with(".cache/gobin"));
/// });
/// ```
pub fn with_isolated_gobin_env<F, R>(f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let original: Vec<(&str, Option<std::ffi::OsString>)> = ISOLATED_VARS
        .iter()
        .map(|name| (*name, std::env::var_os(name)))
        .collect();

    let fake_home = TempDir::new().expect("Failed to create fake HOME");
    let fake_cache = fake_home.path().join(".cache").join("gobin");
    std::fs::create_dir_all(&fake_cache).expect("Failed to create fake cache root");

    // SAFETY: ENV_LOCK serializes every test that touches these variables.
    unsafe {
        std::env::set_var("HOME", fake_home.path());
        std::env::set_var("GOBIN_CACHE_DIR", &fake_cache);
        std::env::remove_var("GOBIN_CONFIG");
    }

    let result = f(fake_cache.as_path());

    // SAFETY: still holding ENV_LOCK.
    unsafe {
        for (name, value) in original {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    result
}
