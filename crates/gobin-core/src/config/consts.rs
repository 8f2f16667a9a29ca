//! Names and defaults shared across the workspace

/// Environment variable overriding the cache root
pub const ENV_CACHE_DIR: &str = "GOBIN_CACHE_DIR";

/// Environment variable pointing at an explicit config file
pub const ENV_CONFIG: &str = "GOBIN_CONFIG";

/// Default compiler program
pub const DEFAULT_GO: &str = "go";

/// Default VCS program used for checkouts
pub const DEFAULT_GIT: &str = "git";

/// Default secondary version manager program
pub const DEFAULT_ASDF: &str = "asdf";

/// Default time to wait for another invocation building the same binary
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 600;

/// Pin file consulted by asdf
pub const TOOL_VERSIONS_FILE: &str = ".tool-versions";

/// Cache layout below the cache root
pub mod layout {
    pub const BINARIES_DIR: &str = "binaries";
    pub const SOURCE_DIR: &str = "source";
    pub const VERSION_MARKER: &str = "@v";
}
