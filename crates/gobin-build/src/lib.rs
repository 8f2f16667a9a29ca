//! Build-and-cache pipeline for versioned Go command-line tools.
//!
//! Given `importPath@version`, this crate makes sure an executable built from
//! exactly that revision exists in the local cache and reports where it is.
//!
//! # Architecture
//!
//! - [`reference`]: `importPath@version` parsing and derived names
//! - [`resolve`]: import path → repository root
//! - [`toolchain`]: host `go` version detection
//! - [`cache`]: deterministic on-disk layout of built binaries
//! - [`fetch`]: isolated checkout of the pinned revision
//! - [`toolversions`]: `.tool-versions` propagation into the checkout
//! - [`build`]: `go build` invocation
//! - [`exec`]: external command capability shared by all of the above
//! - [`run`]: orchestration
//!
//! # Pipeline
//!
//! ```text
//! run()
//!     ↓
//! 1. Parse reference (version is mandatory)
//!     ↓
//! 2. Resolve repository root
//!     ↓
//! 3. Detect go version
//!     ↓
//! 4. Cache path: <root>/binaries/<go>/<module>/@v/<version>/<cmd>/<name>
//!     → exists: done
//!     ↓
//! 5. Lock cache entry, re-check
//!     ↓
//! 6. Check out into a workspace
//!     ↓
//! 7. Propagate .tool-versions
//!     ↓
//! 8. go build, rename into place
//!     ↓
//! 9. Remove workspace (kept on failure)
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use gobin_build::Runner;
//! use gobin_core::GobinConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> gobin_core::Result<()> {
//! let runner = Runner::from_config(GobinConfig::load(None)?)?;
//! let binary = runner
//!     .ensure(&CancellationToken::new(), "github.com/org/tool@v1.2.3", "", "")
//!     .await?;
//! println!("{}", binary.display());
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod cache;
pub mod exec;
pub mod fetch;
pub mod reference;
pub mod resolve;
pub mod run;
pub mod toolchain;
pub mod toolversions;

// Re-export commonly used types
pub use cache::BinaryCache;
pub use exec::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use fetch::{Checkout, Fetcher, GitCheckout, Workspace};
pub use reference::{Module, parse_reference};
pub use resolve::{RepoResolver, RepoRoot, VcsResolver};
pub use run::{Runner, run};

pub type Result<T> = gobin_core::Result<T>;
