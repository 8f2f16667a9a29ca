//! `go build` invocation

use std::path::Path;

use gobin_core::path::join_within;
use gobin_core::{GobinError, Result};
use tokio_util::sync::CancellationToken;

use crate::exec::{CommandRunner, CommandSpec};

/// Package argument for `go build`
///
/// ```rust
/// use gobin_build::build::package_path;
///
/// assert_eq!(package_path("", ""), "./");
/// assert_eq!(package_path("", "/cmd/tool"), "./cmd/tool");
/// assert_eq!(package_path("./tools/gen", "/cmd/tool"), "./tools/gen");
/// ```
pub fn package_path(build_path: &str, command_path: &str) -> String {
    if !build_path.is_empty() {
        return build_path.to_string();
    }
    format!("./{}", command_path.trim_start_matches('/'))
}

/// Inputs of one compiler invocation
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub workspace: &'a Path,
    /// Working directory relative to the workspace
    pub build_dir: &'a str,
    /// Explicit package path, overrides `command_path`
    pub build_path: &'a str,
    pub command_path: &'a str,
    pub output: &'a Path,
}

/// Compiles into `request.output`.
///
/// The compiler writes a `<output>.tmp-<pid>` sibling which is renamed into
/// place once the build succeeded, so `output` never holds a partial file.
pub async fn build<R: CommandRunner>(
    runner: &R,
    go: &str,
    request: BuildRequest<'_>,
    cancel: &CancellationToken,
) -> Result<()> {
    let cwd = join_within(request.workspace, "build directory", request.build_dir)?;
    let package = package_path(request.build_path, request.command_path);

    // The compiler runs inside the workspace, so a relative output would land there
    let output_path = std::path::absolute(request.output)?;
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut staging = output_path.as_os_str().to_owned();
    staging.push(format!(".tmp-{}", std::process::id()));
    let staging = std::path::PathBuf::from(staging);

    let spec = CommandSpec::new(go)
        .args(["build", "-o"])
        .arg(staging.to_string_lossy())
        .arg(package.as_str())
        .current_dir(&cwd);

    tracing::debug!(command = %spec.display(), cwd = %cwd.display(), "building");

    let output = match runner.run(&spec, cancel).await {
        Ok(output) => output,
        Err(e) if e.is_canceled() => {
            remove_staging(&staging);
            return Err(e);
        }
        Err(e) => {
            remove_staging(&staging);
            return Err(report_failure(&spec, e.to_string()));
        }
    };

    if !output.success() {
        remove_staging(&staging);
        return Err(report_failure(&spec, output.combined));
    }

    std::fs::rename(&staging, &output_path)?;
    tracing::debug!(output = %output_path.display(), "build complete");
    Ok(())
}

/// Writes the command and its output to stderr; the error only names the command
fn report_failure(spec: &CommandSpec, output: String) -> GobinError {
    eprintln!("{}", spec.display());
    eprintln!("{}", output.trim_end());
    GobinError::BuildFailed {
        command: spec.display(),
        output,
    }
}

fn remove_staging(staging: &Path) {
    if staging.exists() {
        if let Err(e) = std::fs::remove_file(staging) {
            tracing::warn!("Failed to remove {}: {e}", staging.display());
        }
    }
}
