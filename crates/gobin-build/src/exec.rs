//! External command capability
//!
//! Every process the pipeline starts (`go version`, `git clone`, `go build`,
//! `asdf current`) goes through [`CommandRunner`], so tests can substitute a
//! deterministic implementation and cancellation is handled in one place.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use gobin_core::{GobinError, Result};
use tokio_util::sync::CancellationToken;

/// A command to run: program, arguments and optional working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Shell-like rendering for messages, e.g. `go build -o /c/tool ./cmd/tool`
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    /// stdout followed by stderr
    pub combined: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn ok(stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        Self {
            exit_code: Some(0),
            combined: stdout.clone(),
            stdout,
        }
    }

    pub fn failed(exit_code: i32, combined: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            combined: combined.into(),
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let mut combined = stdout.clone();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Self {
            exit_code: output.status.code(),
            stdout,
            combined,
        }
    }
}

/// Runs external commands on behalf of the pipeline
///
/// `run` returns `Ok` for any command that started and finished, whatever
/// its exit code; callers decide what a non-zero exit means. It returns
/// [`GobinError::CommandFailed`] when the program could not be started and
/// [`GobinError::Canceled`] when `cancel` fired first, in which case the
/// child process has been killed.
pub trait CommandRunner: Sync {
    fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<CommandOutput>> + Send;

    /// Looks `program` up on the search path
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// [`CommandRunner`] backed by real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec, cancel: &CancellationToken) -> Result<CommandOutput> {
        if cancel.is_cancelled() {
            return Err(GobinError::Canceled);
        }

        let mut command = tokio::process::Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        tracing::debug!(command = %spec.display(), cwd = ?spec.cwd, "running");

        let child = command.spawn().map_err(|e| GobinError::CommandFailed {
            program: spec.program.clone(),
            reason: if e.kind() == std::io::ErrorKind::NotFound {
                "not found on PATH".to_string()
            } else {
                e.to_string()
            },
        })?;

        // Dropping the wait future drops the child, and kill_on_drop kills it.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(command = %spec.display(), "canceled");
                Err(GobinError::Canceled)
            }
            output = child.wait_with_output() => Ok(CommandOutput::from(output?)),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
