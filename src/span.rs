use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Byte span inside a source document.
///
/// Offsets are byte indices into the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceSpan {
    /// Path to the source document, relative to the project root.
    pub file: PathBuf,

    /// Start byte offset (inclusive).
    pub start: u32,

    /// End byte offset (exclusive).
    pub end: u32,
}
