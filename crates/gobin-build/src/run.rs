//! Resolve → cache → fetch → build orchestration

use std::io::Write;
use std::path::{Path, PathBuf};

use gobin_core::lock::{LockGuard, acquire_lock_cancellable};
use gobin_core::{FetchStrategy, GobinConfig, GobinError, Result};
use tokio_util::sync::CancellationToken;

use crate::build::{self, BuildRequest};
use crate::cache::BinaryCache;
use crate::exec::{CommandRunner, SystemRunner};
use crate::fetch::{Fetcher, GitCheckout};
use crate::reference::{Module, parse_reference};
use crate::resolve::{RepoResolver, VcsResolver};
use crate::toolchain;
use crate::toolversions;

/// Runs the pipeline with injected capabilities
pub struct Runner<R, V> {
    runner: R,
    resolver: V,
    config: GobinConfig,
    invoking_dir: PathBuf,
    temp_root: PathBuf,
}

impl Runner<SystemRunner, VcsResolver> {
    /// Real processes and network resolution
    pub fn from_config(config: GobinConfig) -> Result<Self> {
        Ok(Self::new(SystemRunner, VcsResolver::new()?, config))
    }
}

impl<R: CommandRunner, V: RepoResolver> Runner<R, V> {
    pub fn new(runner: R, resolver: V, config: GobinConfig) -> Self {
        Self {
            runner,
            resolver,
            config,
            invoking_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            temp_root: std::env::temp_dir(),
        }
    }

    /// Directory whose `.tool-versions` is propagated (default: cwd)
    pub fn with_invoking_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.invoking_dir = dir.into();
        self
    }

    /// Parent of ephemeral workspaces (default: the system temp dir)
    pub fn with_temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = dir.into();
        self
    }

    pub fn config(&self) -> &GobinConfig {
        &self.config
    }

    /// Ensures the binary for `reference` is built and, with `print_path`,
    /// writes its path to stdout
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        reference: &str,
        build_dir: &str,
        build_path: &str,
        print_path: bool,
    ) -> Result<()> {
        let binary = self.ensure(cancel, reference, build_dir, build_path).await?;
        if print_path {
            print_binary_path(&mut std::io::stdout().lock(), &binary)?;
        }
        Ok(())
    }

    /// [`Runner::run`] writing the path to `out` instead of stdout
    pub async fn run_to<W: Write>(
        &self,
        cancel: &CancellationToken,
        reference: &str,
        build_dir: &str,
        build_path: &str,
        print_path: bool,
        out: &mut W,
    ) -> Result<()> {
        let binary = self.ensure(cancel, reference, build_dir, build_path).await?;
        if print_path {
            print_binary_path(out, &binary)?;
        }
        Ok(())
    }

    /// Returns the cached binary for `reference`, building it first if needed
    pub async fn ensure(
        &self,
        cancel: &CancellationToken,
        reference: &str,
        build_dir: &str,
        build_path: &str,
    ) -> Result<PathBuf> {
        let (import_path, version) = parse_reference(reference)?;

        let root = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GobinError::Canceled),
            root = self.resolver.resolve_root(&import_path) => root?,
        };
        let module = Module::new(&import_path, root, &version)?;
        tracing::debug!(
            module = %module.path,
            repo = %module.repo,
            command_path = module.command_path(),
            "resolved module"
        );
        note_mutable_ref(&module.version);

        let toolchain_version =
            toolchain::detect_version(&self.runner, &self.config.go, cancel).await?;

        let cache = BinaryCache::new(&self.config.cache_root);
        let binary = cache.binary_path(&module, &toolchain_version)?;
        if cache.exists(&binary) {
            tracing::debug!(path = %binary.display(), "using cached binary");
            return Ok(binary);
        }

        let _guard = self
            .lock(cache.lock_path(&binary)?, format!("build {}", binary.display()), cancel)
            .await?;
        if cache.exists(&binary) {
            tracing::debug!(path = %binary.display(), "built by a concurrent run");
            return Ok(binary);
        }

        tracing::info!("Building {}@{}", module.original_import, module.version);

        // Sibling commands share the persistent checkout; taken after the
        // binary lock, always in that order
        let _source_guard = match self.config.fetch_strategy {
            FetchStrategy::Persistent => Some(
                self.lock(
                    cache.source_lock_path(&module, &toolchain_version)?,
                    format!("checkout of {}@{}", module.path, module.version),
                    cancel,
                )
                .await?,
            ),
            FetchStrategy::Ephemeral => None,
        };

        let fetcher = Fetcher::new(
            GitCheckout::new(&self.runner, &self.config.git),
            self.config.fetch_strategy,
            &cache,
            &self.temp_root,
        );
        let workspace = fetcher.fetch(&module, &toolchain_version, cancel).await?;

        toolversions::propagate(
            &self.runner,
            self.config.tool_versions,
            &self.config.asdf,
            &self.invoking_dir,
            workspace.path(),
            cancel,
        )
        .await?;

        let request = BuildRequest {
            workspace: workspace.path(),
            build_dir,
            build_path,
            command_path: module.command_path(),
            output: &binary,
        };
        if let Err(e) = build::build(&self.runner, &self.config.go, request, cancel).await {
            tracing::warn!("Build failed, workspace kept at {}", workspace.path().display());
            return Err(e);
        }

        let workspace_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.cleanup() {
            tracing::warn!(
                "Failed to remove workspace {}: {e}",
                workspace_path.display()
            );
        }

        Ok(binary)
    }

    /// Takes an advisory lock on a blocking thread
    async fn lock(
        &self,
        lock_path: PathBuf,
        description: String,
        cancel: &CancellationToken,
    ) -> Result<LockGuard> {
        let timeout = self.config.lock_timeout();

        // Polled between attempts; the blocking wait ends soon after cancellation
        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            acquire_lock_cancellable(&lock_path, timeout, &description, || token.is_cancelled())
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GobinError::Canceled),
            joined = task => {
                let acquired = joined
                    .map_err(|e| GobinError::Generic(format!("lock task failed: {e}")))?;
                match acquired {
                    Ok(guard) => Ok(guard),
                    Err(e) if e.is_canceled() => Err(GobinError::Canceled),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

/// Runs the pipeline with configuration loaded from the environment
pub async fn run(
    cancel: &CancellationToken,
    reference: &str,
    build_dir: &str,
    build_path: &str,
    print_path: bool,
) -> Result<()> {
    parse_reference(reference)?;
    let config = GobinConfig::load(None)?;
    Runner::from_config(config)?
        .run(cancel, reference, build_dir, build_path, print_path)
        .await
}

fn print_binary_path<W: Write>(out: &mut W, binary: &Path) -> Result<()> {
    writeln!(out, "{}", binary.display())?;
    out.flush()?;
    Ok(())
}

/// Cache entries are keyed by the ref name alone, so a branch that moves
/// keeps resolving to the first binary built from it
fn note_mutable_ref(version: &str) {
    let is_release = version
        .strip_prefix('v')
        .is_some_and(|v| semver::Version::parse(v).is_ok());
    let is_commit = (7..=40).contains(&version.len())
        && version.bytes().all(|b| b.is_ascii_hexdigit());

    if !is_release && !is_commit {
        tracing::debug!(
            %version,
            "not a release tag or commit; a cached build is reused even if the ref moves"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandOutput;
    use crate::exec::fake::FakeRunner;
    use crate::resolve::RepoRoot;
    use tempfile::TempDir;

    struct StaticResolver;

    impl RepoResolver for StaticResolver {
        async fn resolve_root(&self, _import_path: &str) -> Result<RepoRoot> {
            Ok(RepoRoot {
                root: "example.org/org/tool".to_string(),
                repo: "https://example.org/org/tool".to_string(),
                vcs: "git".to_string(),
            })
        }
    }

    /// Toolchain 1.21.0; builds succeed unless `fail_build`
    fn toolchain(fail_build: bool) -> FakeRunner {
        FakeRunner::new(move |spec| match spec.args.first().map(String::as_str) {
            Some("version") => Ok(CommandOutput::ok("go version go1.21.0 linux/amd64\n")),
            Some("build") if fail_build => Ok(CommandOutput::failed(1, "syntax error\n")),
            Some("build") => {
                std::fs::write(&spec.args[2], b"binary").unwrap();
                Ok(CommandOutput::ok(""))
            }
            _ => Ok(CommandOutput::ok("")),
        })
    }

    struct Fixture {
        _temp: TempDir,
        cache_root: PathBuf,
        temp_root: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let cache_root = temp.path().join("cache");
            let temp_root = temp.path().join("tmp");
            Self {
                _temp: temp,
                cache_root,
                temp_root,
            }
        }

        fn runner(&self, fake: FakeRunner) -> Runner<FakeRunner, StaticResolver> {
            Runner::new(fake, StaticResolver, GobinConfig::with_cache_root(&self.cache_root))
                .with_invoking_dir(&self.temp_root)
                .with_temp_root(&self.temp_root)
        }

        fn workspaces(&self) -> usize {
            std::fs::read_dir(self.temp_root.join("gobin"))
                .map(|dir| dir.count())
                .unwrap_or(0)
        }
    }

    fn count(runner: &Runner<FakeRunner, StaticResolver>, program: &str, first_arg: &str) -> usize {
        runner
            .runner
            .calls()
            .iter()
            .filter(|c| c.program == program && c.args.first().map(String::as_str) == Some(first_arg))
            .count()
    }

    #[tokio::test]
    async fn test_print_path_scenario() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));
        let mut out = Vec::new();

        runner
            .run_to(
                &CancellationToken::new(),
                "example.org/org/tool@v1.2.3",
                "",
                "",
                true,
                &mut out,
            )
            .await
            .unwrap();

        let expected = fixture
            .cache_root
            .join("binaries/1.21.0/example.org/org/tool/@v/v1.2.3")
            .join(format!("tool{}", std::env::consts::EXE_SUFFIX));
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", expected.display()));
        assert!(expected.is_file());
    }

    #[tokio::test]
    async fn test_without_print_path_writes_nothing() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));
        let mut out = Vec::new();

        runner
            .run_to(
                &CancellationToken::new(),
                "example.org/org/tool@v1.2.3",
                "",
                "",
                false,
                &mut out,
            )
            .await
            .unwrap();

        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_second_run_is_cache_hit() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));
        let cancel = CancellationToken::new();

        let first = runner
            .ensure(&cancel, "example.org/org/tool@v1.2.3", "", "")
            .await
            .unwrap();
        let second = runner
            .ensure(&cancel, "example.org/org/tool@v1.2.3", "", "")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&runner, "git", "clone"), 1);
        assert_eq!(count(&runner, "go", "build"), 1);
        assert_eq!(count(&runner, "go", "version"), 2);
    }

    #[tokio::test]
    async fn test_existing_binary_skips_fetch_and_build() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));
        let prebuilt = fixture
            .cache_root
            .join("binaries/1.21.0/example.org/org/tool/@v/v1.0.0/cmd/sub")
            .join(format!("sub{}", std::env::consts::EXE_SUFFIX));
        std::fs::create_dir_all(prebuilt.parent().unwrap()).unwrap();
        std::fs::write(&prebuilt, b"cached").unwrap();

        let path = runner
            .ensure(
                &CancellationToken::new(),
                "example.org/org/tool/cmd/sub@v1.0.0",
                "",
                "",
            )
            .await
            .unwrap();

        assert_eq!(path, prebuilt);
        assert_eq!(count(&runner, "git", "clone"), 0);
        assert_eq!(count(&runner, "go", "build"), 0);
        assert_eq!(fixture.workspaces(), 0);
    }

    #[tokio::test]
    async fn test_missing_version_runs_nothing() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));

        let err = runner
            .ensure(&CancellationToken::new(), "example.org/org/tool", "", "")
            .await
            .unwrap_err();

        assert!(matches!(err, GobinError::InvalidReference { .. }));
        assert!(runner.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_workspace_removed_after_success() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));

        runner
            .ensure(&CancellationToken::new(), "example.org/org/tool@v1.2.3", "", "")
            .await
            .unwrap();

        assert_eq!(fixture.workspaces(), 0);
    }

    #[tokio::test]
    async fn test_workspace_kept_after_build_failure() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(true));

        let err = runner
            .ensure(&CancellationToken::new(), "example.org/org/tool@v1.2.3", "", "")
            .await
            .unwrap_err();

        assert!(matches!(err, GobinError::BuildFailed { .. }));
        assert_eq!(fixture.workspaces(), 1);
        let binary = fixture
            .cache_root
            .join("binaries/1.21.0/example.org/org/tool/@v/v1.2.3")
            .join(format!("tool{}", std::env::consts::EXE_SUFFIX));
        assert!(!binary.exists());
    }

    #[tokio::test]
    async fn test_canceled_before_start() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = runner
            .ensure(&cancel, "example.org/org/tool@v1.2.3", "", "")
            .await
            .unwrap_err();

        assert!(err.is_canceled());
        assert!(runner.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_build_path_and_dir_forwarded() {
        let fixture = Fixture::new();
        let runner = fixture.runner(toolchain(false));

        runner
            .ensure(
                &CancellationToken::new(),
                "example.org/org/tool@v1.2.3",
                "tools",
                "./gen",
            )
            .await
            .unwrap();

        let calls = runner.runner.calls();
        let build = calls
            .iter()
            .find(|c| c.args.first().map(String::as_str) == Some("build"))
            .unwrap();
        assert_eq!(build.args[3], "./gen");
        assert!(build.cwd.as_ref().unwrap().ends_with("tools"));
    }
}
