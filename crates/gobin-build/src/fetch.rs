//! Isolated checkouts of a module at a pinned revision

use std::future::Future;
use std::path::{Path, PathBuf};

use gobin_core::{FetchStrategy, GobinError, Result};
use tokio_util::sync::CancellationToken;

use crate::cache::BinaryCache;
use crate::exec::{CommandRunner, CommandSpec};
use crate::reference::Module;
use crate::toolchain::exit_description;

/// Directory holding one checkout, owned by a single run
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the checkout
    pub fn cleanup(self) -> Result<()> {
        tracing::debug!(path = %self.path.display(), "removing workspace");
        std::fs::remove_dir_all(&self.path)?;
        Ok(())
    }
}

/// Materializes `repo` at `revision` in an empty `dest` directory
pub trait Checkout: Sync {
    fn checkout(
        &self,
        repo: &str,
        revision: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`Checkout`] through the `git` command line
pub struct GitCheckout<'a, R> {
    runner: &'a R,
    git: &'a str,
}

impl<'a, R: CommandRunner> GitCheckout<'a, R> {
    pub fn new(runner: &'a R, git: &'a str) -> Self {
        Self { runner, git }
    }

    async fn git(&self, spec: CommandSpec, cancel: &CancellationToken) -> Result<()> {
        let output = self.runner.run(&spec, cancel).await?;
        if output.success() {
            return Ok(());
        }

        Err(GobinError::Generic(format!(
            "`{}` exited with {}\n{}",
            spec.display(),
            exit_description(output.exit_code),
            output.combined.trim_end()
        )))
    }
}

impl<R: CommandRunner> Checkout for GitCheckout<'_, R> {
    async fn checkout(
        &self,
        repo: &str,
        revision: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let clone = CommandSpec::new(self.git)
            .args(["clone", "--", repo])
            .arg(dest.to_string_lossy());
        self.git(clone, cancel).await?;

        let checkout = CommandSpec::new(self.git)
            .args(["-c", "advice.detachedHead=false", "checkout", revision])
            .current_dir(dest);
        self.git(checkout, cancel).await
    }
}

/// Creates a workspace and checks the module out into it
pub struct Fetcher<'a, C> {
    checkout: C,
    strategy: FetchStrategy,
    cache: &'a BinaryCache,
    temp_root: PathBuf,
}

impl<'a, C: Checkout> Fetcher<'a, C> {
    /// `temp_root` is the parent of ephemeral workspaces, normally
    /// [`std::env::temp_dir`]
    pub fn new(
        checkout: C,
        strategy: FetchStrategy,
        cache: &'a BinaryCache,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            checkout,
            strategy,
            cache,
            temp_root: temp_root.into(),
        }
    }

    pub async fn fetch(
        &self,
        module: &Module,
        toolchain_version: &str,
        cancel: &CancellationToken,
    ) -> Result<Workspace> {
        let dir = self.prepare(module, toolchain_version)?;
        tracing::debug!(
            repo = %module.repo,
            version = %module.version,
            dir = %dir.display(),
            "checking out"
        );

        if let Err(e) = self
            .checkout
            .checkout(&module.repo, &module.version, &dir, cancel)
            .await
        {
            tracing::warn!("Checkout failed, workspace kept at {}", dir.display());
            return Err(e.wrap_unless_canceled(|e| GobinError::FetchFailed {
                repository: module.repo.clone(),
                revision: module.version.clone(),
                reason: e.to_string(),
            }));
        }

        tracing::info!("Downloaded repository at {}", dir.display());
        Ok(Workspace::new(dir))
    }

    /// Empty directory to check out into
    fn prepare(&self, module: &Module, toolchain_version: &str) -> Result<PathBuf> {
        match self.strategy {
            FetchStrategy::Ephemeral => create_unique_dir(&self.temp_root.join("gobin")),
            FetchStrategy::Persistent => {
                let dir = self.cache.source_dir(module, toolchain_version)?;
                if dir.exists() {
                    tracing::debug!(dir = %dir.display(), "wiping previous checkout");
                    std::fs::remove_dir_all(&dir)?;
                }
                std::fs::create_dir_all(&dir)?;
                Ok(dir)
            }
        }
    }
}

/// Creates `<parent>/<timestamp>-<pid>`, suffixed with a counter on collision
fn create_unique_dir(parent: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(parent)?;

    let base = ephemeral_name();
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => base.clone(),
            n => format!("{base}-{n}"),
        };
        let dir = parent.join(name);
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 100 => {
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// UTC timestamp with nanoseconds plus the process id
fn ephemeral_name() -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().format("%Y%m%dT%H%M%S%.9fZ"),
        std::process::id()
    )
}
