use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Source document within the project under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path relative to the project root (for example `src/calc.c`).
    pub root_relative: PathBuf,

    /// Absolute path on disk.
    pub absolute_path: PathBuf,
}

impl SourceDocument {
    /// Construct a `SourceDocument` from a project root and a relative path.
    pub fn from_relative(root: &Path, rel: &Path) -> Self {
        let absolute_path = root.join(rel);
        Self {
            root_relative: rel.to_path_buf(),
            absolute_path,
        }
    }

    /// Absolute path on disk.
    pub fn path(&self) -> &Path {
        &self.absolute_path
    }

    /// Path relative to the project root.
    pub fn relative_path(&self) -> &Path {
        &self.root_relative
    }

    /// Load the full document contents as UTF-8 text.
    pub fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(&self.absolute_path)
            .with_context(|| format!("failed to read source document {:?}", self.absolute_path))
    }
}
