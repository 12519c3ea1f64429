use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::mutant::VerdictKind;
use crate::project::Project;
use crate::report::format_record_with_location;
use crate::run_report::{MutantRecord, VerificationRunReport};

/// Write `outcomes.json` containing the full machine-readable run report.
pub fn write_outcomes_json(out_dir: &Path, report: &VerificationRunReport) -> Result<()> {
    let path = out_dir.join("outcomes.json");
    write_pretty_json(&path, report)
}

/// Write per-verdict outcome lists:
/// - killed.txt
/// - survived.txt
/// - compile_failed.txt
pub fn write_outcome_txts(
    out_dir: &Path,
    project: &Project,
    records: &[MutantRecord],
) -> Result<()> {
    write_txt_for(
        out_dir.join("killed.txt"),
        project,
        records,
        VerdictKind::Killed,
    )?;
    write_txt_for(
        out_dir.join("survived.txt"),
        project,
        records,
        VerdictKind::Survived,
    )?;
    write_txt_for(
        out_dir.join("compile_failed.txt"),
        project,
        records,
        VerdictKind::CompileFailed,
    )?;
    Ok(())
}

/// Write a stable `log` file (no timestamps) with baseline + summary + error.
pub fn write_log(out_dir: &Path, report: &VerificationRunReport) -> Result<()> {
    let path = out_dir.join("log");

    let mut lines = Vec::new();
    lines.push(format!("tool: {}", report.tool));
    lines.push(format!("version: {}", report.version));
    lines.push(format!("project_root: {}", report.project_root.display()));
    lines.push(format!("executed: {}", report.executed));
    lines.push(format!(
        "baseline: success={} exit_code={:?} duration_ms={}",
        report.baseline.success, report.baseline.exit_code, report.baseline.duration_ms
    ));
    lines.push(format!(
        "summary: killed={} survived={} compile_failed={} no_applicable_tests={}",
        report.summary.killed,
        report.summary.survived,
        report.summary.compile_failed,
        report.summary.no_applicable_tests
    ));
    if let Some(err) = &report.error {
        lines.push(format!("error: {err}"));
    }

    let content = lines.join("\n") + "\n";
    fs::write(&path, content).with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

fn write_txt_for(
    path: PathBuf,
    project: &Project,
    records: &[MutantRecord],
    want: VerdictKind,
) -> Result<()> {
    let mut ordered: Vec<&MutantRecord> =
        records.iter().filter(|r| r.outcome == want).collect();
    ordered.sort_by_key(|r| r.id);

    // The file is created even when the list is empty.
    let mut out = String::new();
    for record in ordered {
        out.push_str(&format_record_with_location(project, record));
        out.push('\n');
    }

    fs::write(&path, out).with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

// `?Sized` allows passing unsized values such as slices.
fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize json")?;
    fs::write(path, json).with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}
