//! Path validation for cache keys and build directories
//!
//! Module paths, versions and command paths end up as directory names under
//! the cache root, and `--build-dir` is joined onto a checkout. None of them
//! may reach outside their base.
//!
//! `Path::components()` silently drops inner `.` elements (`a/./b`), so the
//! checks here split on `/` themselves instead of relying on it.

use std::path::{Component, Path, PathBuf};

use crate::error::{GobinError, Result};

/// Check if path is absolute OR rooted (cross-platform)
///
/// Unlike `Path::is_absolute()`, this also catches Windows rooted paths such
/// as `/tmp`, which are not absolute there.
///
/// ```rust
/// use std::path::Path;
/// use gobin_core::path::has_absolute_or_rooted_component;
///
/// assert!(has_absolute_or_rooted_component(Path::new("/etc/passwd")));
/// assert!(!has_absolute_or_rooted_component(Path::new("cmd/tool")));
/// ```
pub fn has_absolute_or_rooted_component(path: &Path) -> bool {
    if path.is_absolute() {
        return true;
    }

    path.components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

/// Validates a `/`-separated relative value used as cache directory names.
///
/// Rejects empty values, empty elements, `.` and `..` elements, backslashes,
/// and anything rooted. `what` names the value in the error.
pub fn validate_cache_segment(what: &str, value: &str, base: &Path) -> Result<()> {
    let unsafe_path = || GobinError::UnsafePath {
        what: what.to_string(),
        value: value.to_string(),
        base: base.to_path_buf(),
    };

    if value.is_empty() || value.contains('\\') || value.contains('\0') {
        return Err(unsafe_path());
    }
    if has_absolute_or_rooted_component(Path::new(value)) {
        return Err(unsafe_path());
    }
    if value
        .split('/')
        .any(|element| element.is_empty() || element == "." || element == "..")
    {
        return Err(unsafe_path());
    }

    Ok(())
}

/// Joins a caller-supplied relative directory onto `base`.
///
/// Leading separators are trimmed, so `/sub` means `<base>/sub`. An empty
/// value yields `base` itself. `..` elements are rejected.
pub fn join_within(base: &Path, what: &str, relative: &str) -> Result<PathBuf> {
    let trimmed = relative.trim_start_matches(['/', '\\']);
    if trimmed.is_empty() {
        return Ok(base.to_path_buf());
    }

    let escapes = trimmed.split(['/', '\\']).any(|element| element == "..")
        || has_absolute_or_rooted_component(Path::new(trimmed));
    if escapes {
        return Err(GobinError::UnsafePath {
            what: what.to_string(),
            value: relative.to_string(),
            base: base.to_path_buf(),
        });
    }

    Ok(base.join(trimmed))
}
