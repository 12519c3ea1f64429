use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::CommandSpec;

/// Result of running one external command to completion.
#[derive(Debug)]
pub struct CommandOutcome {
    /// Exit code returned by the command (if it exited normally).
    pub exit_code: Option<i32>,

    /// Did the command succeed (exit status 0)?
    pub success: bool,

    /// Captured standard output of the command.
    pub stdout: String,

    /// Captured standard error of the command.
    pub stderr: String,

    /// How long the command ran.
    pub duration: Duration,
}

impl CommandOutcome {
    /// Best-effort diagnostics text: stderr, falling back to stdout.
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Run `spec` with `extra_args` appended, capturing output.
///
/// A non-zero exit is reported through [`CommandOutcome::success`], not as an
/// error; `Err` means the command could not be executed at all.
pub fn run_command<S: AsRef<OsStr>>(
    spec: &CommandSpec,
    extra_args: &[S],
    cwd: Option<&Path>,
) -> Result<CommandOutcome> {
    let start = std::time::Instant::now();

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .args(extra_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    let output = command
        .output()
        .with_context(|| format!("failed to run `{}`", spec.program))?;

    let duration = start.elapsed();

    Ok(CommandOutcome {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration,
    })
}
