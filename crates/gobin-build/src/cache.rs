//! On-disk layout of built binaries and persistent checkouts
//!
//! ```text
//! <root>/binaries/<toolchain>/<module>/@v/<version>/<command path>/<name>
//! <root>/source/<toolchain>/<module>/<version>
//! ```

use std::path::{Path, PathBuf};

use gobin_core::config::consts::layout;
use gobin_core::path::validate_cache_segment;
use gobin_core::{GobinError, Result};

use crate::reference::Module;

/// Cache of built executables rooted at a configured directory
#[derive(Debug, Clone)]
pub struct BinaryCache {
    root: PathBuf,
}

impl BinaryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the executable for `module` built with `toolchain_version`
    pub fn binary_path(&self, module: &Module, toolchain_version: &str) -> Result<PathBuf> {
        self.validate(module, toolchain_version)?;

        let mut path = self
            .root
            .join(layout::BINARIES_DIR)
            .join(toolchain_version)
            .join(&module.path)
            .join(layout::VERSION_MARKER)
            .join(&module.version);

        let command_path = module.command_path().trim_start_matches('/');
        if !command_path.is_empty() {
            validate_cache_segment("command path", command_path, &self.root)?;
            path.push(command_path);
        }

        let name = module.binary_name();
        validate_cache_segment("binary name", &name, &self.root)?;

        Ok(path.join(name))
    }

    /// Checkout directory used by the persistent fetch strategy
    pub fn source_dir(&self, module: &Module, toolchain_version: &str) -> Result<PathBuf> {
        self.validate(module, toolchain_version)?;

        Ok(self
            .root
            .join(layout::SOURCE_DIR)
            .join(toolchain_version)
            .join(&module.path)
            .join(&module.version))
    }

    /// Lock guarding the shared persistent checkout, `<source_dir>.lock`
    ///
    /// Every command of one module version builds from the same source dir,
    /// so the per-binary lock alone does not serialize them.
    pub fn source_lock_path(&self, module: &Module, toolchain_version: &str) -> Result<PathBuf> {
        let mut path = self.source_dir(module, toolchain_version)?.into_os_string();
        path.push(".lock");
        Ok(PathBuf::from(path))
    }

    /// Cache hit test; nothing beyond existence is checked
    pub fn exists(&self, binary_path: &Path) -> bool {
        binary_path.exists()
    }

    /// Advisory lock file guarding the build of `binary_path`
    pub fn lock_path(&self, binary_path: &Path) -> Result<PathBuf> {
        let name = binary_path
            .file_name()
            .ok_or_else(|| {
                GobinError::Generic(format!(
                    "binary path has no file name: {}",
                    binary_path.display()
                ))
            })?;

        let mut lock_name = std::ffi::OsString::from(".");
        lock_name.push(name);
        lock_name.push(".lock");
        Ok(binary_path.with_file_name(lock_name))
    }

    fn validate(&self, module: &Module, toolchain_version: &str) -> Result<()> {
        validate_cache_segment("toolchain version", toolchain_version, &self.root)?;
        validate_cache_segment("module path", &module.path, &self.root)?;
        validate_cache_segment("version", &module.version, &self.root)
    }
}
