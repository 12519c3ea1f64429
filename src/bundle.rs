use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::mutant::MutatedUnit;
use crate::patch::apply_checked_patch;
use crate::project::Project;
use crate::span::SourceSpan;

/// One externally generated mutant spec, as it appears in the bundle file.
///
/// The generator that enumerates candidate mutations is a separate tool;
/// this side only consumes its output.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MutantSpec {
    /// Mutated document, relative to the project root.
    pub file: PathBuf,

    /// Start byte offset of the replaced node.
    pub start: u32,

    /// End byte offset of the replaced node.
    pub end: u32,

    /// Identity of the enclosing method, as keyed by the coverage analysis.
    pub method: String,

    /// Expected original snippet at the span.
    pub original: String,

    /// Replacement snippet.
    pub replacement: String,
}

/// Load a bundle of mutant specs and hydrate each into a [`MutatedUnit`].
///
/// Specs are sorted by (file, start offset) and assigned 1-based ids in that
/// order, so ids are stable across runs regardless of generator ordering.
/// Hydration validates each spec's original snippet against the document on
/// disk before building the mutated source.
pub fn load_bundle(path: &Path, project: &Project) -> Result<Vec<MutatedUnit>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read bundle {:?}", path))?;

    let mut specs: Vec<MutantSpec> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse bundle {:?}", path))?;

    specs.sort_by(|a, b| (&a.file, a.start).cmp(&(&b.file, b.start)));

    let mut units = Vec::with_capacity(specs.len());
    for (idx, spec) in specs.iter().enumerate() {
        units.push(hydrate(spec, idx as u64 + 1, project)?);
    }

    Ok(units)
}

fn hydrate(spec: &MutantSpec, id: u64, project: &Project) -> Result<MutatedUnit> {
    let document = project.document(&spec.file);
    let code = document.read_to_string()?;

    let span = SourceSpan {
        file: spec.file.clone(),
        start: spec.start,
        end: spec.end,
    };

    let mutated_source = apply_checked_patch(&code, &span, &spec.original, &spec.replacement)
        .with_context(|| format!("mutant spec does not match document {:?}", spec.file))?;

    Ok(MutatedUnit {
        id,
        document,
        mutated_source,
        span,
        original_snippet: spec.original.clone(),
        mutated_snippet: spec.replacement.clone(),
        method: spec.method.clone(),
    })
}
