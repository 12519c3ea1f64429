use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::exec::CommandOutcome;
use crate::mutant::{MutatedUnit, SurvivingMutant, VerdictKind};

/// Summary counts for one verification run.
///
/// `no_applicable_tests` mutants are inconclusive: they are excluded from
/// the killed/survived totals and surfaced here only as a diagnostic count.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Mutants whose covering tests failed.
    pub killed: usize,

    /// Mutants that compiled and passed every covering test.
    pub survived: usize,

    /// Mutants whose mutated source did not compile.
    pub compile_failed: usize,

    /// Mutants with no covering tests in any configured assembly.
    pub no_applicable_tests: usize,
}

impl RunSummary {
    pub fn record(&mut self, kind: VerdictKind) {
        match kind {
            VerdictKind::Killed => self.killed += 1,
            VerdictKind::Survived => self.survived += 1,
            VerdictKind::CompileFailed => self.compile_failed += 1,
            VerdictKind::NoApplicableTests => self.no_applicable_tests += 1,
        }
    }
}

/// Baseline suite metadata: the pre-mutation run over the original
/// assemblies.
#[derive(Debug, Clone, Serialize)]
pub struct BaselineReport {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl BaselineReport {
    pub fn from_run(result: &CommandOutcome) -> Self {
        Self {
            success: result.success,
            exit_code: result.exit_code,
            duration_ms: result.duration.as_millis() as u64,
        }
    }

    pub fn not_run() -> Self {
        Self {
            success: false,
            exit_code: None,
            duration_ms: 0,
        }
    }
}

/// Outcome row for one verified mutant.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MutantRecord {
    pub id: u64,
    pub file: PathBuf,
    pub start: u32,
    pub end: u32,
    pub method: String,
    pub original_snippet: String,
    pub mutated_snippet: String,
    pub outcome: VerdictKind,
    pub duration_ms: u64,
}

impl MutantRecord {
    pub fn new(unit: &MutatedUnit, outcome: VerdictKind, duration: Duration) -> Self {
        Self {
            id: unit.id,
            file: unit.span.file.clone(),
            start: unit.span.start,
            end: unit.span.end,
            method: unit.method.clone(),
            original_snippet: unit.original_snippet.clone(),
            mutated_snippet: unit.mutated_snippet.clone(),
            outcome,
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Machine-readable report for a verification run.
///
/// In `--json` mode this is printed to stdout as pretty JSON.
#[derive(Debug, Serialize)]
pub struct VerificationRunReport {
    /// Tool name, stable across versions.
    pub tool: &'static str,

    /// Current crate version.
    pub version: &'static str,

    /// The project root used for this run.
    pub project_root: PathBuf,

    /// Number of mutants actually verified (after `--limit`).
    pub executed: usize,

    /// Baseline suite result.
    pub baseline: BaselineReport,

    /// Summary of verdicts.
    pub summary: RunSummary,

    /// Per-mutant outcome rows, in verification order.
    pub mutants: Vec<MutantRecord>,

    /// Surviving-mutant records: the findings of the run.
    pub survivors: Vec<SurvivingMutant>,

    /// Optional high-level error message (for example baseline failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationRunReport {
    pub fn success(
        project_root: PathBuf,
        baseline: BaselineReport,
        summary: RunSummary,
        mutants: Vec<MutantRecord>,
        survivors: Vec<SurvivingMutant>,
    ) -> Self {
        Self {
            tool: "mutvet",
            version: env!("CARGO_PKG_VERSION"),
            project_root,
            executed: mutants.len(),
            baseline,
            summary,
            mutants,
            survivors,
            error: None,
        }
    }

    pub fn failure(project_root: PathBuf, baseline: BaselineReport, error: String) -> Self {
        Self {
            tool: "mutvet",
            version: env!("CARGO_PKG_VERSION"),
            project_root,
            executed: 0,
            baseline,
            summary: RunSummary::default(),
            mutants: Vec::new(),
            survivors: Vec::new(),
            error: Some(error),
        }
    }
}
