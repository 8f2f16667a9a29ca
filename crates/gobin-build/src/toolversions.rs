//! `.tool-versions` propagation into the build workspace
//!
//! Builds happen outside the caller's directory, so version-manager shims
//! would otherwise pick a different toolchain than the one the caller pinned.
//! Problems here are only warnings: a build without the pin file is still a
//! valid build.

use std::path::Path;

use gobin_core::config::consts::TOOL_VERSIONS_FILE;
use gobin_core::{GobinError, Result, ToolVersionsStrategy};
use tokio_util::sync::CancellationToken;

use crate::exec::{CommandRunner, CommandSpec};

/// Converts `asdf current` output into `.tool-versions` contents.
///
/// Lines with exactly three fields (`tool version source`) become
/// `tool version`; anything else is skipped.
///
/// ```rust
/// use gobin_build::toolversions::parse_asdf_current;
///
/// let out = "golang 1.21.0 /home/u/.tool-versions\nnodejs ______ No version is set\n";
/// assert_eq!(parse_asdf_current(out), "golang 1.21.0\n");
/// ```
pub fn parse_asdf_current(output: &str) -> String {
    output
        .lines()
        .filter_map(|line| match line.split_whitespace().collect::<Vec<_>>()[..] {
            [tool, version, _source] => Some(format!("{tool} {version}\n")),
            _ => None,
        })
        .collect()
}

/// Writes `<workspace>/.tool-versions` according to `strategy`.
///
/// Only cancellation is returned as an error.
pub async fn propagate<R: CommandRunner>(
    runner: &R,
    strategy: ToolVersionsStrategy,
    asdf: &str,
    invoking_dir: &Path,
    workspace: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = match strategy {
        ToolVersionsStrategy::Regenerate => regenerate(runner, asdf, workspace, cancel).await,
        ToolVersionsStrategy::Copy => copy(invoking_dir, workspace),
    };

    match result {
        Err(e) if e.is_canceled() => Err(e),
        Err(e) => {
            tracing::warn!("Skipping {TOOL_VERSIONS_FILE} propagation: {e}");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

async fn regenerate<R: CommandRunner>(
    runner: &R,
    asdf: &str,
    workspace: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    if runner.locate(asdf).is_none() {
        tracing::debug!(program = asdf, "version manager not installed");
        return Ok(());
    }

    let spec = CommandSpec::new(asdf).arg("current");
    let output = runner.run(&spec, cancel).await?;
    if !output.success() {
        return Err(GobinError::Generic(format!(
            "`{}` failed: {}",
            spec.display(),
            output.combined.trim()
        )));
    }

    let contents = parse_asdf_current(&output.stdout);
    std::fs::write(workspace.join(TOOL_VERSIONS_FILE), contents)?;
    tracing::debug!("regenerated {TOOL_VERSIONS_FILE}");
    Ok(())
}

fn copy(invoking_dir: &Path, workspace: &Path) -> Result<()> {
    let source = invoking_dir.join(TOOL_VERSIONS_FILE);
    if !source.is_file() {
        return Ok(());
    }

    std::fs::copy(&source, workspace.join(TOOL_VERSIONS_FILE))?;
    tracing::debug!(from = %source.display(), "copied {TOOL_VERSIONS_FILE}");
    Ok(())
}
