use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// External command with fixed leading arguments.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path, resolved through `PATH` when bare.
    pub program: String,

    /// Arguments always passed before any per-invocation arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Build side of the configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
    /// Command that compiles the project tree it is invoked in.
    pub command: CommandSpec,

    /// Artifact path the build produces, relative to the built tree.
    pub artifact: PathBuf,
}

/// Test side of the configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TestConfig {
    /// Command that runs tests in the given assemblies.
    pub command: CommandSpec,

    /// Flag used to select an individual test by id, repeated per test.
    #[serde(default = "default_select_flag")]
    pub select_flag: String,

    /// Ordered list of original test-assembly file paths.
    ///
    /// Order is significant: assemblies are staged and executed in this
    /// order, and the first one to report a failure decides the verdict.
    pub assemblies: Vec<PathBuf>,
}

fn default_select_flag() -> String {
    "--test".to_string()
}

/// Run configuration, loaded from a JSON file.
///
/// Relative paths (`project_root`, test assemblies) are resolved against the
/// directory containing the config file, so a run does not depend on the
/// working directory it was started from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Root directory of the project under test.
    pub project_root: PathBuf,

    /// Build command and artifact location.
    pub build: BuildConfig,

    /// Test command and assembly list.
    pub tests: TestConfig,
}

impl Config {
    /// Load and resolve a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;

        let mut config: Config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {:?}", path))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        Ok(config)
    }

    /// Ordered list of original test-assembly file paths.
    pub fn test_assemblies(&self) -> &[PathBuf] {
        &self.tests.assemblies
    }

    fn resolve_paths(&mut self, base: &Path) {
        self.project_root = resolve(base, &self.project_root);
        for assembly in &mut self.tests.assemblies {
            *assembly = resolve(base, assembly);
        }
    }
}

/// Join `path` onto `base` unless it is already absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{
        "project_root": ".",
        "build": {
            "command": { "program": "make", "args": ["artifact"] },
            "artifact": "out/app.bin"
        },
        "tests": {
            "command": { "program": "testdrv" },
            "assemblies": ["bins/core_tests.bin", "bins/util_tests.bin"]
        }
    }"#;

    #[test]
    fn parse_fills_defaults() {
        let config: Config = serde_json::from_str(CONFIG_JSON).unwrap();

        assert_eq!(config.build.command.program, "make");
        assert_eq!(config.build.command.args, vec!["artifact".to_string()]);
        assert_eq!(config.tests.command.args, Vec::<String>::new());
        assert_eq!(config.tests.select_flag, "--test");
        assert_eq!(config.tests.assemblies.len(), 2);
    }

    #[test]
    fn load_resolves_paths_against_config_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mutvet.json");
        fs::write(&path, CONFIG_JSON).unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.project_root, dir.path().join("."));
        assert_eq!(
            config.test_assemblies()[0],
            dir.path().join("bins/core_tests.bin")
        );
        assert_eq!(
            config.test_assemblies()[1],
            dir.path().join("bins/util_tests.bin")
        );
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mutvet.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn absolute_paths_are_kept_as_is() {
        let abs = if cfg!(windows) { "C:\\x\\a.bin" } else { "/x/a.bin" };
        assert_eq!(
            resolve(Path::new("base"), Path::new(abs)),
            PathBuf::from(abs)
        );
        assert_eq!(
            resolve(Path::new("base"), Path::new("a.bin")),
            PathBuf::from("base/a.bin")
        );
    }
}
