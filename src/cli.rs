use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::bundle::load_bundle;
use crate::compile::CommandCompiler;
use crate::config::Config;
use crate::coverage::CoverageAnalysisResult;
use crate::mutant::Verdict;
use crate::out;
use crate::project::Project;
use crate::report::{format_record_with_location, print_surviving_mutants};
use crate::run_report::{BaselineReport, MutantRecord, RunSummary, VerificationRunReport};
use crate::testrun::{CommandTestRunner, run_baseline};
use crate::toolchain::command_version;
use crate::ui::Ui;
use crate::verify::verify_mutant;

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_SURVIVORS: i32 = 2;

/// Top-level CLI arguments for the `mutvet` binary.
#[derive(Debug, Parser)]
#[command(
    name = "mutvet",
    version,
    about = "Coverage-guided mutant verification for compiled test suites"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands supported by `mutvet`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the configuration and probe the external toolchain.
    Check {
        /// Path to the run configuration file.
        #[arg(long)]
        config: PathBuf,
    },

    /// Verify a bundle of generated mutants against the test suite.
    Verify {
        /// Path to the run configuration file.
        #[arg(long)]
        config: PathBuf,

        /// Path to the JSON bundle of generated mutant specs.
        #[arg(long)]
        mutants: PathBuf,

        /// Path to the precomputed coverage analysis. When omitted, the
        /// entire suite runs for every mutant.
        #[arg(long)]
        coverage: Option<PathBuf>,

        /// Print a detailed list of all mutants and their outcomes.
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Verify only the first N mutants (deterministic order).
        #[arg(long)]
        limit: Option<usize>,

        /// Emit a machine-readable JSON report to stdout.
        #[arg(long)]
        json: bool,

        /// Write outcome artifacts (outcomes.json, verdict lists, log) to
        /// this directory.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Exit with code 2 if any mutants survive (useful for CI).
        #[arg(long)]
        fail_on_survivors: bool,
    },
}

fn print_json_and_exit(report: VerificationRunReport, exit_code: i32) -> ! {
    let json = serde_json::to_string_pretty(&report).expect("serialize report to json");
    println!("{json}");
    std::process::exit(exit_code);
}

/// In `--json` mode, emit a failure report on stdout and exit; otherwise
/// propagate the error.
fn fail_json_or(
    json: bool,
    project_root: PathBuf,
    baseline: BaselineReport,
    err: anyhow::Error,
) -> Result<()> {
    if json {
        let report = VerificationRunReport::failure(project_root, baseline, format!("{err:#}"));
        print_json_and_exit(report, EXIT_ERROR);
    }
    Err(err)
}

/// Parse CLI arguments and dispatch the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { config } => run_check(&config),

        Command::Verify {
            config,
            mutants,
            coverage,
            verbose,
            limit,
            json,
            out,
            fail_on_survivors,
        } => run_verify(VerifyArgs {
            config,
            mutants,
            coverage,
            verbose,
            limit,
            json,
            out,
            fail_on_survivors,
        }),
    }
}

fn run_check(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let project = Project::from_root(config.project_root.clone())?;

    println!("mutvet: check");
    println!("project: {:?}", project.root());

    match command_version(&config.build.command.program) {
        Ok(version) => println!("build tool: {version}"),
        Err(e) => eprintln!("build tool probe failed: {e}"),
    }

    match command_version(&config.tests.command.program) {
        Ok(version) => println!("test tool: {version}"),
        Err(e) => eprintln!("test tool probe failed: {e}"),
    }

    println!("test assemblies: {}", config.test_assemblies().len());
    for assembly in config.test_assemblies() {
        if assembly.is_file() {
            println!("  {:?}", assembly);
        } else {
            eprintln!("  {:?} (missing)", assembly);
        }
    }

    Ok(())
}

struct VerifyArgs {
    config: PathBuf,
    mutants: PathBuf,
    coverage: Option<PathBuf>,
    verbose: bool,
    limit: Option<usize>,
    json: bool,
    out: Option<PathBuf>,
    fail_on_survivors: bool,
}

fn run_verify(args: VerifyArgs) -> Result<()> {
    let json = args.json;
    let mut ui = Ui::new(json);

    ui.title("mutvet: verify");

    let config = match Config::load(&args.config) {
        Ok(c) => c,
        Err(e) => return fail_json_or(json, PathBuf::new(), BaselineReport::not_run(), e),
    };
    let project_root = config.project_root.clone();

    let project = match Project::from_root(project_root.clone()) {
        Ok(p) => p,
        Err(e) => return fail_json_or(json, project_root, BaselineReport::not_run(), e),
    };

    ui.line(format!("project: {:?}", project.root()));

    // Baseline suite over the original assemblies: mutation results are
    // meaningless against a suite that is already failing.
    let baseline_run = match run_baseline(&config.tests) {
        Ok(r) => r,
        Err(e) => return fail_json_or(json, project_root, BaselineReport::not_run(), e),
    };
    let baseline = BaselineReport::from_run(&baseline_run);

    ui.line(format!(
        "baseline suite finished in {:?} (exit code: {:?}, success: {})",
        baseline_run.duration, baseline_run.exit_code, baseline_run.success
    ));

    if !baseline_run.success {
        if json {
            let report = VerificationRunReport::failure(
                project_root,
                baseline,
                "baseline test suite failed".to_string(),
            );
            print_json_and_exit(report, EXIT_ERROR);
        }

        ui.error("baseline test suite failed");
        if !baseline_run.stdout.is_empty() {
            ui.error(format!("stdout from test runner:\n{}", baseline_run.stdout));
        }
        if !baseline_run.stderr.is_empty() {
            ui.error(format!("stderr from test runner:\n{}", baseline_run.stderr));
        }

        anyhow::bail!("baseline test suite failed");
    }

    let mut units = match load_bundle(&args.mutants, &project) {
        Ok(u) => u,
        Err(e) => return fail_json_or(json, project_root, baseline, e),
    };
    let loaded = units.len();
    ui.line(format!("loaded {} mutants", loaded));

    let coverage = match &args.coverage {
        Some(path) => match CoverageAnalysisResult::from_file(path) {
            Ok(c) => Some(c),
            Err(e) => return fail_json_or(json, project_root, baseline, e),
        },
        None => {
            ui.line("no coverage analysis supplied, running the entire suite per mutant");
            None
        }
    };

    if let Some(limit) = args.limit {
        if units.len() > limit {
            units.truncate(limit);
        }
        ui.line(format!("verifying {} mutants (of {})", units.len(), loaded));
    }

    let compiler = CommandCompiler::new(&project, &config.build);
    let runner = CommandTestRunner::new(&config.tests);

    let mut summary = RunSummary::default();
    let mut records: Vec<MutantRecord> = Vec::with_capacity(units.len());
    let mut survivors = Vec::new();

    for unit in &units {
        // One isolated scratch root per mutant trial, removed on drop.
        let scratch = match tempfile::TempDir::new()
            .context("failed to create scratch directory")
        {
            Ok(t) => t,
            Err(e) => return fail_json_or(json, project_root.clone(), baseline.clone(), e),
        };

        let started = Instant::now();
        let verdict = match verify_mutant(
            unit,
            &config,
            &compiler,
            &runner,
            coverage.as_ref(),
            scratch.path(),
        ) {
            Ok(v) => v,
            Err(e) => {
                let e = e.context(format!("fatal failure while verifying mutant {}", unit.id));
                return fail_json_or(json, project_root.clone(), baseline.clone(), e);
            }
        };

        if args.verbose {
            if let Verdict::CompileFailed { diagnostics } = &verdict {
                if !diagnostics.trim().is_empty() {
                    ui.line(format!(
                        "mutant {} compiler diagnostics:\n{}",
                        unit.id,
                        diagnostics.trim_end()
                    ));
                }
            }
        }

        let record = MutantRecord::new(unit, verdict.kind(), started.elapsed());
        if let Verdict::Survived(survivor) = verdict {
            survivors.push(survivor);
        }

        summary.record(record.outcome);
        ui.mutant_progress(&record);
        records.push(record);
    }

    // CI policy
    let wants_ci_fail = args.fail_on_survivors && summary.survived > 0;
    let exit_code = if wants_ci_fail { EXIT_SURVIVORS } else { EXIT_OK };

    let report =
        VerificationRunReport::success(project_root, baseline, summary, records, survivors);

    if let Some(out_dir) = &args.out {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output dir {:?}", out_dir))?;
        out::write_outcomes_json(out_dir, &report)?;
        out::write_outcome_txts(out_dir, &project, &report.mutants)?;
        out::write_log(out_dir, &report)?;
    }

    if json {
        print_json_and_exit(report, exit_code);
    }

    println!("--- verification summary ---");
    println!("mutants verified:    {}", report.executed);
    println!("killed:              {}", report.summary.killed);
    println!("survived:            {}", report.summary.survived);
    println!("compile failed:      {}", report.summary.compile_failed);
    println!("no applicable tests: {}", report.summary.no_applicable_tests);

    if args.verbose && !report.mutants.is_empty() {
        println!("--- mutants (detailed) ---");
        for record in &report.mutants {
            println!(
                "{:>19} {:>7} {}",
                record.outcome.label(),
                format!("{}ms", record.duration_ms),
                format_record_with_location(&project, record)
            );
        }
    }

    print_surviving_mutants(&project, &report.mutants);

    if wants_ci_fail {
        eprintln!(
            "verification failed policy: {} mutant(s) survived (--fail-on-survivors)",
            report.summary.survived
        );
        std::process::exit(EXIT_SURVIVORS);
    }

    Ok(())
}
