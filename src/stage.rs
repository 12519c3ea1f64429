use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One staged test assembly: the original path paired with its isolated,
/// mutant-injected counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAssembly {
    /// Original test-assembly path, as configured.
    pub original: PathBuf,

    /// Copy of the assembly inside its staging directory.
    pub staged: PathBuf,
}

/// Staged assemblies in configuration order, with keyed lookup by original
/// path so pairing never depends on positional indices.
#[derive(Debug, Default)]
pub struct StagedAssemblies {
    entries: Vec<StagedAssembly>,
    by_original: HashMap<PathBuf, usize>,
}

impl StagedAssemblies {
    /// Iterate in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &StagedAssembly> {
        self.entries.iter()
    }

    /// Staged counterpart of the given original assembly path.
    pub fn staged_for(&self, original: &Path) -> Option<&PathBuf> {
        self.by_original
            .get(original)
            .map(|&idx| &self.entries[idx].staged)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Materialize an isolated test environment per configured assembly.
///
/// For each original assembly `.../name.ext` this creates
/// `{stage_root}/name/` containing a copy of the freshly built mutant
/// artifact and a copy of the original assembly file. Copies overwrite, so
/// re-staging into the same root replaces stale artifacts instead of
/// accumulating them.
///
/// The result preserves the order and 1:1 cardinality of `assemblies`.
/// Any filesystem error aborts the current mutant's verification.
pub fn stage_test_assemblies(
    artifact: &Path,
    assemblies: &[PathBuf],
    stage_root: &Path,
) -> Result<StagedAssemblies> {
    let artifact_name = artifact
        .file_name()
        .with_context(|| format!("artifact path {:?} has no file name", artifact))?;

    let mut entries = Vec::with_capacity(assemblies.len());

    for original in assemblies {
        let assembly_name = original
            .file_name()
            .with_context(|| format!("test assembly path {:?} has no file name", original))?;
        let stem = original
            .file_stem()
            .with_context(|| format!("test assembly path {:?} has no file stem", original))?;

        let dir = stage_root.join(stem);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create staging dir {:?}", dir))?;

        let staged_artifact = dir.join(artifact_name);
        fs::copy(artifact, &staged_artifact).with_context(|| {
            format!("failed to copy artifact {:?} to {:?}", artifact, staged_artifact)
        })?;

        let staged_assembly = dir.join(assembly_name);
        fs::copy(original, &staged_assembly).with_context(|| {
            format!(
                "failed to copy test assembly {:?} to {:?}",
                original, staged_assembly
            )
        })?;

        entries.push(StagedAssembly {
            original: original.clone(),
            staged: staged_assembly,
        });
    }

    let by_original = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| (entry.original.clone(), idx))
        .collect();

    Ok(StagedAssemblies {
        entries,
        by_original,
    })
}
