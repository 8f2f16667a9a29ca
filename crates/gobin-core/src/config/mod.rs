//! Runtime configuration
//!
//! Precedence, lowest to highest: built-in defaults, the optional TOML file
//! (`$GOBIN_CONFIG` or `<config_dir>/gobin/config.toml`), the
//! `GOBIN_CACHE_DIR` environment variable, then the explicit override passed
//! by the caller (the CLI's `--cache-dir`).

pub mod consts;
mod model;

pub use model::{ConfigFile, FetchStrategy, GobinConfig, ToolVersionsStrategy};

use crate::error::{GobinError, Result};
use std::path::PathBuf;

/// Default cache root: `~/.outreach/.cache/gobin`
pub fn default_cache_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".outreach").join(".cache").join("gobin"))
}

/// Location of the config file, if one should be read
fn config_file_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(consts::ENV_CONFIG) {
        return Some(PathBuf::from(explicit));
    }

    let path = dirs::config_dir()?.join("gobin").join("config.toml");
    path.is_file().then_some(path)
}

impl GobinConfig {
    /// Loads configuration from the environment and the optional config file
    pub fn load(cache_dir_override: Option<PathBuf>) -> Result<Self> {
        let file = config_file_path().map(ConfigFile::from_file).transpose()?;
        let env_cache_dir = std::env::var_os(consts::ENV_CACHE_DIR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self::resolve(file, env_cache_dir, cache_dir_override, default_cache_root())
    }

    /// Applies the precedence rules to already-gathered inputs
    pub fn resolve(
        file: Option<ConfigFile>,
        env_cache_dir: Option<PathBuf>,
        cache_dir_override: Option<PathBuf>,
        default_root: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Self::with_cache_root(default_root.unwrap_or_default());

        if let Some(file) = file {
            config = config.merge(file)?;
        }
        if let Some(dir) = env_cache_dir {
            config.cache_root = dir;
        }
        if let Some(dir) = cache_dir_override {
            config.cache_root = dir;
        }

        if config.cache_root.as_os_str().is_empty() {
            return Err(GobinError::ConfigInvalidValue {
                field: "cache_root".to_string(),
                reason: format!(
                    "could not determine home directory; set {}",
                    consts::ENV_CACHE_DIR
                ),
            });
        }

        config.cache_root = std::path::absolute(&config.cache_root)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_root_under_home() {
        if let Some(root) = default_cache_root() {
            assert!(root.ends_with(".outreach/.cache/gobin"));
        }
    }

    #[test]
    fn test_resolve_uses_default_root() {
        let config = GobinConfig::resolve(None, None, None, Some(PathBuf::from("/home/u/.c"))).unwrap();
        assert_eq!(config.cache_root, PathBuf::from("/home/u/.c"));
    }

    #[test]
    fn test_resolve_precedence() {
        let file = ConfigFile::parse("cache_root = \"/from-file\"\n").unwrap();

        let config =
            GobinConfig::resolve(Some(file.clone()), None, None, Some(PathBuf::from("/d"))).unwrap();
        assert_eq!(config.cache_root, PathBuf::from("/from-file"));

        let config = GobinConfig::resolve(
            Some(file.clone()),
            Some(PathBuf::from("/from-env")),
            None,
            Some(PathBuf::from("/d")),
        )
        .unwrap();
        assert_eq!(config.cache_root, PathBuf::from("/from-env"));

        let config = GobinConfig::resolve(
            Some(file),
            Some(PathBuf::from("/from-env")),
            Some(PathBuf::from("/from-cli")),
            Some(PathBuf::from("/d")),
        )
        .unwrap();
        assert_eq!(config.cache_root, PathBuf::from("/from-cli"));
    }

    #[test]
    fn test_resolve_makes_relative_root_absolute() {
        let config =
            GobinConfig::resolve(None, None, Some(PathBuf::from("cache")), None).unwrap();

        assert!(config.cache_root.is_absolute());
        assert_eq!(config.cache_root, std::env::current_dir().unwrap().join("cache"));
    }

    #[test]
    fn test_resolve_without_any_root_fails() {
        let result = GobinConfig::resolve(None, None, None, None);
        assert!(matches!(
            result,
            Err(GobinError::ConfigInvalidValue { ref field, .. }) if field == "cache_root"
        ));
    }
}
