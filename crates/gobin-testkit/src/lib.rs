//! Test utilities for gobin
//!
//! Shared helpers for the workspace's tests: temporary directories under the
//! workspace `.tmp/`, environment isolation for the cache root, and fake
//! `go`/`git`/`asdf` executables for end-to-end runs without a toolchain.

pub mod env;
pub mod fake_bin;

pub use env::{ENV_LOCK, with_isolated_gobin_env};
pub use fake_bin::{
    install_fake_asdf, install_fake_git, install_fake_go, invocation_count, isolated_path,
    write_fake_executable,
};

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the current directory
///
/// # Panics
///
/// Panics if the directory cannot be created.
///
/// # Examples
///
/// ```rust
/// use gobin_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// std::fs::write(temp.path().join("go.mod"), "module example.org/tool\n").unwrap();
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Path of a compiled example binary of the crate under test
///
/// Integration test binaries live in `target/<profile>/deps/`; examples are
/// built next to them in `target/<profile>/examples/`.
///
/// # Panics
///
/// Panics if unable to determine the current executable path
pub fn example_bin(name: &str) -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to get current executable path");

    path.pop();
    path.pop();
    path.push("examples");
    path.push(name);

    if cfg!(target_os = "windows") {
        path.set_extension("exe");
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_in_workspace_creates_in_tmp() {
        let temp = temp_dir_in_workspace();
        let path = temp.path();

        assert!(
            path.to_string_lossy().contains(".tmp"),
            "Path should contain .tmp, got: {}",
            path.display()
        );
        assert!(path.is_dir());
    }

    #[test]
    fn test_temp_dir_auto_cleanup() {
        let path = {
            let temp = temp_dir_in_workspace();
            temp.path().to_path_buf()
        };

        assert!(!path.exists(), "Directory should not exist after drop");
    }

    #[test]
    fn test_example_bin_points_at_examples_dir() {
        let path = example_bin("build_lock_holder");
        let parent = path.parent().unwrap();
        assert!(parent.ends_with("examples"), "{}", path.display());
    }

    #[test]
    fn test_multiple_temp_dirs_unique() {
        let temp1 = temp_dir_in_workspace();
        let temp2 = temp_dir_in_workspace();
        assert_ne!(temp1.path(), temp2.path());
    }
}
