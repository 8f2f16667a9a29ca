use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::{DEFAULT_ASDF, DEFAULT_GIT, DEFAULT_GO, DEFAULT_LOCK_TIMEOUT_SECS};
use crate::error::{GobinError, Result};

/// Where the repository is checked out before building
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Fresh uniquely named directory under the system temp dir
    #[default]
    Ephemeral,
    /// Deterministic directory under `<cache_root>/source`, wiped before each checkout
    Persistent,
}

/// How `.tool-versions` ends up in the build workspace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolVersionsStrategy {
    /// Regenerate from `asdf current`
    #[default]
    Regenerate,
    /// Copy the invoking directory's `.tool-versions`
    Copy,
}

/// config.toml schema, every key optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
    #[serde(default)]
    pub go: Option<String>,
    #[serde(default)]
    pub git: Option<String>,
    #[serde(default)]
    pub asdf: Option<String>,
    #[serde(default)]
    pub fetch_strategy: Option<FetchStrategy>,
    #[serde(default)]
    pub tool_versions: Option<ToolVersionsStrategy>,
    #[serde(default)]
    pub lock_timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GobinError::ConfigParseError(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GobinError::ConfigParseError(e.to_string()))
    }
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GobinConfig {
    pub cache_root: PathBuf,
    pub go: String,
    pub git: String,
    pub asdf: String,
    pub fetch_strategy: FetchStrategy,
    pub tool_versions: ToolVersionsStrategy,
    pub lock_timeout_secs: u64,
}

impl GobinConfig {
    /// Defaults rooted at the given cache directory
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            go: DEFAULT_GO.to_string(),
            git: DEFAULT_GIT.to_string(),
            asdf: DEFAULT_ASDF.to_string(),
            fetch_strategy: FetchStrategy::default(),
            tool_versions: ToolVersionsStrategy::default(),
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }

    /// Overlays the keys present in `file`
    pub fn merge(mut self, file: ConfigFile) -> Result<Self> {
        if let Some(root) = file.cache_root {
            self.cache_root = root;
        }
        if let Some(go) = file.go {
            self.go = non_empty("go", go)?;
        }
        if let Some(git) = file.git {
            self.git = non_empty("git", git)?;
        }
        if let Some(asdf) = file.asdf {
            self.asdf = non_empty("asdf", asdf)?;
        }
        if let Some(strategy) = file.fetch_strategy {
            self.fetch_strategy = strategy;
        }
        if let Some(strategy) = file.tool_versions {
            self.tool_versions = strategy;
        }
        if let Some(secs) = file.lock_timeout_secs {
            if secs == 0 {
                return Err(GobinError::ConfigInvalidValue {
                    field: "lock_timeout_secs".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            self.lock_timeout_secs = secs;
        }
        Ok(self)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(GobinError::ConfigInvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}
