//! Module references (`importPath@version`)

use gobin_core::{GobinError, Result};

use crate::resolve::RepoRoot;

/// Splits `reference` into `(import_path, version)` on the first `@`.
///
/// ```rust
/// use gobin_build::reference::parse_reference;
///
/// let (path, version) = parse_reference("github.com/org/tool@v1.2.3").unwrap();
/// assert_eq!(path, "github.com/org/tool");
/// assert_eq!(version, "v1.2.3");
///
/// assert!(parse_reference("github.com/org/tool").is_err());
/// ```
pub fn parse_reference(reference: &str) -> Result<(String, String)> {
    let invalid = |reason: String| GobinError::InvalidReference {
        reference: reference.to_string(),
        reason,
    };

    let reference_trimmed = reference.trim();
    let (import_path, version) = match reference_trimmed.split_once('@') {
        Some((path, version)) => (path, version),
        None => (reference_trimmed, ""),
    };

    if import_path.is_empty() {
        return Err(invalid("missing import path".to_string()));
    }
    if version.is_empty() {
        return Err(invalid(format!(
            "missing version, expected {import_path}@vX.X.X"
        )));
    }
    // Would be read as an option by git
    if version.starts_with('-') {
        return Err(invalid(format!("version '{version}' must not start with '-'")));
    }

    Ok((import_path.to_string(), version.to_string()))
}

/// Whether `element` is a major-version path element such as `v2`
pub fn is_major_version(element: &str) -> bool {
    element
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Removes a leading `/vN` element from a sub-path.
///
/// `/v2/cmd/tool` becomes `/cmd/tool` and a lone `/v2` becomes the empty
/// module-root path. Anything else is returned unchanged.
pub fn strip_major_version(sub_path: &str) -> &str {
    let Some(rest) = sub_path.strip_prefix('/') else {
        return sub_path;
    };
    match rest.split_once('/') {
        Some((first, _)) if is_major_version(first) => &sub_path[first.len() + 1..],
        None if is_major_version(rest) => "",
        _ => sub_path,
    }
}

/// A resolved module reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Import path as given, including any command suffix
    pub original_import: String,
    /// Root module path
    pub path: String,
    /// Fetchable repository location for `path`
    pub repo: String,
    /// Requested revision
    pub version: String,
}

impl Module {
    pub fn new(original_import: &str, root: RepoRoot, version: &str) -> Result<Self> {
        let inside_root = original_import
            .strip_prefix(root.root.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if !inside_root {
            return Err(GobinError::ResolutionFailed {
                import_path: original_import.to_string(),
                reason: format!("resolved module root '{}' is not a prefix", root.root),
            });
        }
        if version.is_empty() {
            return Err(GobinError::InvalidReference {
                reference: original_import.to_string(),
                reason: format!("missing version, expected {original_import}@vX.X.X"),
            });
        }

        Ok(Self {
            original_import: original_import.to_string(),
            path: root.root,
            repo: root.repo,
            version: version.to_string(),
        })
    }

    /// Import-path remainder below the module root, major version removed.
    ///
    /// Empty for the module root, otherwise starts with `/`.
    pub fn command_path(&self) -> &str {
        let remainder = &self.original_import[self.path.len()..];
        strip_major_version(remainder)
    }

    /// File name of the built executable
    pub fn binary_name(&self) -> String {
        let name = self
            .original_import
            .rsplit('/')
            .find(|element| !element.is_empty() && !is_major_version(element))
            .unwrap_or(self.original_import.as_str());
        format!("{name}{}", std::env::consts::EXE_SUFFIX)
    }
}
