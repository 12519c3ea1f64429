use anyhow::{Context, Result};

use crate::config::CommandSpec;
use crate::exec::run_command;

/// Probe an external tool's version via `<program> --version`.
///
/// Returns the first reported line, preferring stdout over stderr.
pub fn command_version(program: &str) -> Result<String> {
    let spec = CommandSpec {
        program: program.to_string(),
        args: Vec::new(),
    };

    let out = run_command(&spec, &["--version"], None)
        .with_context(|| format!("failed to execute `{program} --version`"))?;

    let text = if out.stdout.is_empty() {
        out.stderr
    } else {
        out.stdout
    };

    let one_line = text.trim().replace('\n', " ");
    if !out.success {
        anyhow::bail!("`{program} --version` failed: {one_line}");
    }

    Ok(one_line)
}
