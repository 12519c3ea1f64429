use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::BuildConfig;
use crate::exec::run_command;
use crate::mutant::MutatedUnit;
use crate::project::Project;

/// Result of one compilation attempt for a mutated unit.
#[derive(Debug)]
pub struct CompileOutcome {
    /// Did the build accept the mutated source?
    pub success: bool,

    /// Path of the produced artifact, present on success.
    pub artifact: Option<PathBuf>,

    /// Captured build diagnostics, for reporting compile failures.
    pub diagnostics: String,
}

/// Capability interface over the external build toolchain.
///
/// Ordinary compile failure of a mutant is a normal result, reported through
/// [`CompileOutcome::success`]; `Err` is reserved for environment faults
/// (spawn failure, missing output) that invalidate the whole trial.
pub trait Compiler {
    /// Compile the owning project with `unit`'s document replaced by its
    /// mutated source, placing all build state under `out_dir`.
    fn compile(&self, unit: &MutatedUnit, out_dir: &Path) -> Result<CompileOutcome>;
}

/// Directory names never copied into a build tree.
///
/// Version control and dependency/build caches are both large and irrelevant
/// to the mutated build.
const SKIP_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "target",
    "node_modules",
    "__pycache__",
    ".venv",
];

/// Process-backed compiler: materializes the project into a scratch tree
/// with the mutated document swapped in, then shells out to the configured
/// build command.
#[derive(Debug)]
pub struct CommandCompiler<'a> {
    project: &'a Project,
    build: &'a BuildConfig,
}

impl<'a> CommandCompiler<'a> {
    pub fn new(project: &'a Project, build: &'a BuildConfig) -> Self {
        Self { project, build }
    }
}

impl Compiler for CommandCompiler<'_> {
    fn compile(&self, unit: &MutatedUnit, out_dir: &Path) -> Result<CompileOutcome> {
        let tree = out_dir.join("tree");
        copy_dir_filtered(self.project.root(), &tree).with_context(|| {
            format!(
                "failed to copy project from {:?} to {:?}",
                self.project.root(),
                tree
            )
        })?;

        // Swap the original document for the mutated one.
        let target = tree.join(unit.document.relative_path());
        fs::write(&target, &unit.mutated_source)
            .with_context(|| format!("failed to write mutated document {:?}", target))?;

        let result = run_command::<&str>(&self.build.command, &[], Some(&tree))?;

        if !result.success {
            // Not every mutation yields a valid program. E.g. `a + b` -> `a - b`
            // is ill-typed when the `+` resolves to a non-numeric overload.
            return Ok(CompileOutcome {
                success: false,
                artifact: None,
                diagnostics: result.diagnostics().to_string(),
            });
        }

        let artifact = tree.join(&self.build.artifact);
        if !artifact.is_file() {
            anyhow::bail!(
                "build reported success but artifact {:?} does not exist",
                artifact
            );
        }

        Ok(CompileOutcome {
            success: true,
            artifact: Some(artifact),
            diagnostics: result.diagnostics().to_string(),
        })
    }
}

/// Recursively copy `src` into `dst`, skipping [`SKIP_NAMES`] directories
/// and symlinks.
fn copy_dir_filtered(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("failed to create dir {:?}", dst))?;

    for entry in fs::read_dir(src).with_context(|| format!("failed to read dir {:?}", src))? {
        let entry = entry?;
        let name = entry.file_name();
        if SKIP_NAMES.iter().any(|skip| name == *skip) {
            continue;
        }

        let path = entry.path();
        let target = dst.join(&name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_dir_filtered(&path, &target)?;
        } else if file_type.is_file() {
            fs::copy(&path, &target)
                .with_context(|| format!("failed to copy file {:?} to {:?}", path, target))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandSpec;
    use crate::source::SourceDocument;
    use crate::span::SourceSpan;

    fn fixture_project() -> (tempfile::TempDir, Project) {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/calc.src"), "return a + b;").unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/stale.bin"), "stale").unwrap();
        let project = Project::from_root(dir.path().to_path_buf()).unwrap();
        (dir, project)
    }

    fn unit_for(project: &Project) -> MutatedUnit {
        MutatedUnit {
            id: 1,
            document: SourceDocument::from_relative(project.root(), Path::new("src/calc.src")),
            mutated_source: "return a - b;".to_string(),
            span: SourceSpan {
                file: PathBuf::from("src/calc.src"),
                start: 9,
                end: 10,
            },
            original_snippet: "+".to_string(),
            mutated_snippet: "-".to_string(),
            method: "calc::add".to_string(),
        }
    }

    fn build_config(program: &str, args: &[&str], artifact: &str) -> BuildConfig {
        BuildConfig {
            command: CommandSpec {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
            artifact: PathBuf::from(artifact),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_build_yields_artifact_from_mutated_tree() {
        let (_dir, project) = fixture_project();
        let build = build_config("sh", &["-c", "cp src/calc.src app.bin"], "app.bin");
        let compiler = CommandCompiler::new(&project, &build);
        let out = tempfile::TempDir::new().unwrap();

        let outcome = compiler.compile(&unit_for(&project), out.path()).unwrap();

        assert!(outcome.success);
        let artifact = outcome.artifact.unwrap();
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "return a - b;");

        // The original project is untouched.
        assert_eq!(
            fs::read_to_string(project.root().join("src/calc.src")).unwrap(),
            "return a + b;"
        );
    }

    #[cfg(unix)]
    #[test]
    fn compile_failure_is_a_value_not_an_error() {
        let (_dir, project) = fixture_project();
        let build = build_config("sh", &["-c", "echo 'syntax error' >&2; exit 1"], "app.bin");
        let compiler = CommandCompiler::new(&project, &build);
        let out = tempfile::TempDir::new().unwrap();

        let outcome = compiler.compile(&unit_for(&project), out.path()).unwrap();

        assert!(!outcome.success);
        assert!(outcome.artifact.is_none());
        assert!(outcome.diagnostics.contains("syntax error"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_artifact_after_reported_success_is_fatal() {
        let (_dir, project) = fixture_project();
        let build = build_config("true", &[], "app.bin");
        let compiler = CommandCompiler::new(&project, &build);
        let out = tempfile::TempDir::new().unwrap();

        let err = compiler.compile(&unit_for(&project), out.path()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn build_tree_skips_caches() {
        let (_dir, project) = fixture_project();
        let build = build_config("sh", &["-c", "cp src/calc.src app.bin"], "app.bin");
        let compiler = CommandCompiler::new(&project, &build);
        let out = tempfile::TempDir::new().unwrap();

        compiler.compile(&unit_for(&project), out.path()).unwrap();

        assert!(!out.path().join("tree/target").exists());
    }
}
