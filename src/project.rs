use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::source::SourceDocument;

/// Project under test: the build context that owns the mutated documents.
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project.
    pub root: PathBuf,
}

impl Project {
    /// Open the project rooted at `root`.
    ///
    /// The root must exist; everything else about the project (sources,
    /// build outputs) is resolved lazily relative to it.
    pub fn from_root(root: PathBuf) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("project root {:?} is not a directory", root);
        }
        Ok(Self { root })
    }

    /// Root directory as a `Path`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a root-relative path into a `SourceDocument`.
    pub fn document(&self, rel: &Path) -> SourceDocument {
        SourceDocument::from_relative(&self.root, rel)
    }
}
