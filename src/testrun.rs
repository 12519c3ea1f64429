use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;

use crate::config::TestConfig;
use crate::exec::{CommandOutcome, run_command};

/// Aggregate status reported by the test runner for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRunStatus {
    AllPassed,
    SomeFailed,
}

/// Capability interface over the external test runner.
///
/// Both operations must be safe to call repeatedly and must not have side
/// effects outside the given assembly paths. `run_all` exists as a distinct
/// operation because without coverage metadata there are no test ids to
/// enumerate for a selective run.
pub trait TestRunner {
    /// Run exactly the given tests within the given staged assemblies.
    fn run_selected(&self, assemblies: &[PathBuf], tests: &[String]) -> Result<TestRunStatus>;

    /// Run every test in the given staged assemblies.
    fn run_all(&self, assemblies: &[PathBuf]) -> Result<TestRunStatus>;
}

/// Process-backed runner driving the configured test command.
///
/// Assembly paths are passed as arguments; selected tests are passed as
/// repeated `select_flag <id>` pairs. Exit status 0 maps to
/// [`TestRunStatus::AllPassed`] and anything else to
/// [`TestRunStatus::SomeFailed`]; failure to spawn the command at all is an
/// error. A runner that can distinguish its own crashes from test failures
/// should surface crashes as errors instead.
#[derive(Debug)]
pub struct CommandTestRunner<'a> {
    tests: &'a TestConfig,
}

impl<'a> CommandTestRunner<'a> {
    pub fn new(tests: &'a TestConfig) -> Self {
        Self { tests }
    }

    fn invoke(&self, args: Vec<OsString>) -> Result<TestRunStatus> {
        let result = run_command(&self.tests.command, &args, None)?;
        Ok(if result.success {
            TestRunStatus::AllPassed
        } else {
            TestRunStatus::SomeFailed
        })
    }
}

impl TestRunner for CommandTestRunner<'_> {
    fn run_selected(&self, assemblies: &[PathBuf], tests: &[String]) -> Result<TestRunStatus> {
        let mut args: Vec<OsString> =
            assemblies.iter().map(|p| p.clone().into_os_string()).collect();
        for test in tests {
            args.push(self.tests.select_flag.clone().into());
            args.push(test.clone().into());
        }
        self.invoke(args)
    }

    fn run_all(&self, assemblies: &[PathBuf]) -> Result<TestRunStatus> {
        let args = assemblies.iter().map(|p| p.clone().into_os_string()).collect();
        self.invoke(args)
    }
}

/// Run the configured suite over the original (unstaged) assemblies.
///
/// Used as the baseline check before any mutants are verified; mutation
/// results are meaningless against a suite that is already failing. Captured
/// output and timing are kept for the run report.
pub fn run_baseline(tests: &TestConfig) -> Result<CommandOutcome> {
    let args: Vec<OsString> = tests
        .assemblies
        .iter()
        .map(|p| p.clone().into_os_string())
        .collect();
    run_command(&tests.command, &args, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandSpec;

    fn test_config(program: &str, args: &[&str]) -> TestConfig {
        TestConfig {
            command: CommandSpec {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
            select_flag: "--test".to_string(),
            assemblies: vec![PathBuf::from("bins/core_tests.bin")],
        }
    }

    #[cfg(unix)]
    #[test]
    fn exit_zero_is_all_passed() {
        let config = test_config("true", &[]);
        let runner = CommandTestRunner::new(&config);

        let status = runner
            .run_selected(&[PathBuf::from("staged.bin")], &["t1".to_string()])
            .unwrap();
        assert_eq!(status, TestRunStatus::AllPassed);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_some_failed() {
        let config = test_config("false", &[]);
        let runner = CommandTestRunner::new(&config);

        let status = runner.run_all(&[PathBuf::from("staged.bin")]).unwrap();
        assert_eq!(status, TestRunStatus::SomeFailed);
    }

    #[cfg(unix)]
    #[test]
    fn selection_args_are_passed_per_test() {
        // The shell script fails unless it sees both select pairs.
        let config = test_config(
            "sh",
            &[
                "-c",
                r#"[ "$1" = "staged.bin" ] && [ "$2" = "--test" ] && [ "$3" = "t1" ] && [ "$4" = "--test" ] && [ "$5" = "t2" ]"#,
                "argv0",
            ],
        );
        let runner = CommandTestRunner::new(&config);

        let status = runner
            .run_selected(
                &[PathBuf::from("staged.bin")],
                &["t1".to_string(), "t2".to_string()],
            )
            .unwrap();
        assert_eq!(status, TestRunStatus::AllPassed);
    }

    #[test]
    fn missing_runner_is_fatal() {
        let config = test_config("mutvet-no-such-runner", &[]);
        let runner = CommandTestRunner::new(&config);

        assert!(runner.run_all(&[PathBuf::from("staged.bin")]).is_err());
    }
}
