use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::resolve;

/// Precomputed coverage analysis: which tests exercise which methods.
///
/// Queryable by (method identity, original test-assembly path). A missing
/// entry and an empty entry mean the same thing: no tests in that assembly
/// reach the method. Whether the analysis was performed *at all* is a
/// property of the caller holding `Option<&CoverageAnalysisResult>`, not of
/// this type.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CoverageAnalysisResult {
    /// method identity -> original assembly path -> covering test ids.
    methods: HashMap<String, HashMap<PathBuf, Vec<String>>>,
}

impl CoverageAnalysisResult {
    /// Load a coverage file produced by an upstream analysis run.
    ///
    /// Relative assembly paths in the file are resolved against the file's
    /// directory, matching how [`crate::config::Config`] resolves its
    /// assembly list.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read coverage file {:?}", path))?;

        let mut result: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse coverage file {:?}", path))?;

        if let Some(base) = path.parent() {
            result.resolve_paths(base);
        }

        Ok(result)
    }

    /// Test ids covering `method` within the given original assembly.
    ///
    /// Returns an empty slice when the method or assembly is unknown.
    pub fn tests_covering_method(&self, method: &str, assembly: &Path) -> &[String] {
        self.methods
            .get(method)
            .and_then(|per_assembly| per_assembly.get(assembly))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn resolve_paths(&mut self, base: &Path) {
        for per_assembly in self.methods.values_mut() {
            let entries = std::mem::take(per_assembly);
            *per_assembly = entries
                .into_iter()
                .map(|(assembly, tests)| (resolve(base, &assembly), tests))
                .collect();
        }
    }

    #[cfg(test)]
    pub fn insert(&mut self, method: &str, assembly: &Path, tests: &[&str]) {
        self.methods
            .entry(method.to_string())
            .or_default()
            .insert(
                assembly.to_path_buf(),
                tests.iter().map(|t| t.to_string()).collect(),
            );
    }
}
