//! Host compiler version detection

use gobin_core::{GobinError, Result};
use tokio_util::sync::CancellationToken;

use crate::exec::{CommandRunner, CommandSpec};

/// Extracts the version from `go version` output
///
/// ```rust
/// use gobin_build::toolchain::parse_go_version;
///
/// assert_eq!(
///     parse_go_version("go version go1.21.0 linux/amd64").as_deref(),
///     Some("1.21.0")
/// );
/// assert_eq!(parse_go_version("command not found"), None);
/// ```
pub fn parse_go_version(output: &str) -> Option<String> {
    output.match_indices(" go").find_map(|(i, marker)| {
        let rest = &output[i + marker.len()..];
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let end = rest.find(' ')?;
        Some(rest[..end].to_string())
    })
}

/// Runs `<go> version` and returns the parsed version string
pub async fn detect_version<R: CommandRunner>(
    runner: &R,
    go: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    let spec = CommandSpec::new(go).arg("version");
    let output = runner
        .run(&spec, cancel)
        .await
        .map_err(|e| e.wrap_unless_canceled(|e| GobinError::ToolchainDetection(e.to_string())))?;

    if !output.success() {
        eprintln!("{}", output.combined.trim_end());
        return Err(GobinError::ToolchainDetection(format!(
            "`{}` exited with {}",
            spec.display(),
            exit_description(output.exit_code)
        )));
    }

    let version = parse_go_version(&output.combined).ok_or_else(|| {
        GobinError::ToolchainDetection(format!(
            "unrecognized output from `{}`: {}",
            spec.display(),
            output.combined.trim()
        ))
    })?;

    tracing::debug!(%version, "detected go toolchain");
    Ok(version)
}

pub(crate) fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}
