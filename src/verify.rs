use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::compile::Compiler;
use crate::config::Config;
use crate::coverage::CoverageAnalysisResult;
use crate::mutant::{MutatedUnit, SurvivingMutant, Verdict};
use crate::stage::{StagedAssemblies, stage_test_assemblies};
use crate::testrun::{TestRunStatus, TestRunner};

/// Verify one mutated unit end to end: compile it, stage the test
/// environments, run the covering tests, and classify the outcome.
///
/// The pipeline is stateless. All collaborators and the scratch root are
/// supplied by the caller, and nothing is shared between trials; concurrent
/// verifications are safe as long as each call gets a distinct
/// `scratch_root` (staging overwrites rather than appends). There is no
/// cancellation and no retry: compile and test failures are terminal
/// classifications, and only environment faults return `Err`.
///
/// `coverage` is `None` when no coverage analysis was performed for this
/// run; that switches the orchestrator into the run-everything mode. A
/// present-but-empty coverage result instead means "no tests cover this
/// method anywhere" and yields [`Verdict::NoApplicableTests`].
pub fn verify_mutant(
    unit: &MutatedUnit,
    config: &Config,
    compiler: &dyn Compiler,
    runner: &dyn TestRunner,
    coverage: Option<&CoverageAnalysisResult>,
    scratch_root: &Path,
) -> Result<Verdict> {
    // Exactly one compilation attempt per verification call.
    let build_dir = scratch_root.join("build");
    fs::create_dir_all(&build_dir)
        .with_context(|| format!("failed to create build dir {:?}", build_dir))?;

    let outcome = compiler.compile(unit, &build_dir)?;
    if !outcome.success {
        return Ok(Verdict::CompileFailed {
            diagnostics: outcome.diagnostics,
        });
    }

    let artifact = outcome
        .artifact
        .context("compiler reported success without an artifact path")?;

    // Staging only happens on compile success.
    let stage_root = scratch_root.join("stage");
    fs::create_dir_all(&stage_root)
        .with_context(|| format!("failed to create stage dir {:?}", stage_root))?;
    let staged = stage_test_assemblies(&artifact, config.test_assemblies(), &stage_root)?;

    match coverage {
        Some(coverage) => {
            run_covered_tests(unit, runner, coverage, config.test_assemblies(), &staged)
        }
        None => run_entire_suite(unit, runner, &staged),
    }
}

/// Selective mode: per configured assembly, in order, run exactly the tests
/// that cover the mutated method. Staged counterparts are found through the
/// keyed association, never by position.
fn run_covered_tests(
    unit: &MutatedUnit,
    runner: &dyn TestRunner,
    coverage: &CoverageAnalysisResult,
    assemblies: &[std::path::PathBuf],
    staged: &StagedAssemblies,
) -> Result<Verdict> {
    let mut ran_any_tests = false;

    for original in assemblies {
        let tests = coverage.tests_covering_method(&unit.method, original);
        if tests.is_empty() {
            // Nothing in this assembly reaches the mutated method.
            continue;
        }

        let staged_assembly = staged
            .staged_for(original)
            .with_context(|| format!("no staged copy for test assembly {:?}", original))?;

        ran_any_tests = true;

        let status = runner.run_selected(std::slice::from_ref(staged_assembly), tests)?;
        if status == TestRunStatus::SomeFailed {
            // One failing test is sufficient evidence; remaining assemblies
            // are never invoked.
            return Ok(Verdict::Killed);
        }
    }

    if ran_any_tests {
        Ok(Verdict::Survived(SurvivingMutant::from_unit(unit)))
    } else {
        Ok(Verdict::NoApplicableTests)
    }
}

/// Degenerate mode: no coverage metadata exists, so no individual test ids
/// can be enumerated. The whole suite of every staged assembly runs in a
/// single invocation.
fn run_entire_suite(
    unit: &MutatedUnit,
    runner: &dyn TestRunner,
    staged: &StagedAssemblies,
) -> Result<Verdict> {
    if staged.is_empty() {
        return Ok(Verdict::NoApplicableTests);
    }

    let staged_paths: Vec<_> = staged.iter().map(|e| e.staged.clone()).collect();
    match runner.run_all(&staged_paths)? {
        TestRunStatus::SomeFailed => Ok(Verdict::Killed),
        TestRunStatus::AllPassed => Ok(Verdict::Survived(SurvivingMutant::from_unit(unit))),
    }
}
