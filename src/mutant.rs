use std::path::PathBuf;

use serde::Serialize;

use crate::source::SourceDocument;
use crate::span::SourceSpan;

/// One candidate mutation, hydrated and ready for verification.
///
/// Immutable once constructed. A unit is owned exclusively by the
/// verification call that receives it and is discarded after the verdict;
/// the pipeline never mutates it and keeps no state between trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutatedUnit {
    /// Stable 1-based id within the bundle.
    pub id: u64,

    /// The owning source document (references the containing project).
    pub document: SourceDocument,

    /// Full source of the document with the mutation applied.
    pub mutated_source: String,

    /// Location of the replaced node inside the original document.
    pub span: SourceSpan,

    /// Original source snippet (before mutation).
    pub original_snippet: String,

    /// Mutated source snippet (after mutation).
    pub mutated_snippet: String,

    /// Identity of the method containing the mutation, as keyed by the
    /// coverage analysis.
    pub method: String,
}

/// Final classification of one verified mutant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The mutated source does not compile. Expected for some mutations;
    /// the mutant is excluded from further consideration.
    CompileFailed {
        /// Captured compiler diagnostics.
        diagnostics: String,
    },

    /// No test across any configured assembly covers the mutated method.
    /// Inconclusive: neither killed nor surviving, and no record is produced.
    NoApplicableTests,

    /// At least one executed test set failed.
    Killed,

    /// Tests ran and all passed; the record is the reportable finding.
    Survived(SurvivingMutant),
}

impl Verdict {
    /// Data-only classification of this verdict.
    pub fn kind(&self) -> VerdictKind {
        match self {
            Verdict::CompileFailed { .. } => VerdictKind::CompileFailed,
            Verdict::NoApplicableTests => VerdictKind::NoApplicableTests,
            Verdict::Killed => VerdictKind::Killed,
            Verdict::Survived(_) => VerdictKind::Survived,
        }
    }
}

/// Serializable verdict classification.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    CompileFailed,
    NoApplicableTests,
    Killed,
    Survived,
}

impl VerdictKind {
    pub fn label(self) -> &'static str {
        match self {
            VerdictKind::CompileFailed => "compile_failed",
            VerdictKind::NoApplicableTests => "no_applicable_tests",
            VerdictKind::Killed => "killed",
            VerdictKind::Survived => "survived",
        }
    }
}

/// Record of a mutant that compiled and passed every covering test.
///
/// This is the finding a mutation-testing run exists to surface: it captures
/// the location and nature of the mutation so the gap can be reported.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SurvivingMutant {
    /// Bundle id of the surviving mutant.
    pub id: u64,

    /// Mutated document, relative to the project root.
    pub file: PathBuf,

    /// Start byte offset of the replaced node.
    pub start: u32,

    /// End byte offset of the replaced node.
    pub end: u32,

    /// Identity of the mutated method.
    pub method: String,

    /// Original source snippet.
    pub original_snippet: String,

    /// Mutated source snippet.
    pub mutated_snippet: String,
}

impl SurvivingMutant {
    /// Build the record from the unit that survived verification.
    pub fn from_unit(unit: &MutatedUnit) -> Self {
        Self {
            id: unit.id,
            file: unit.span.file.clone(),
            start: unit.span.start,
            end: unit.span.end,
            method: unit.method.clone(),
            original_snippet: unit.original_snippet.clone(),
            mutated_snippet: unit.mutated_snippet.clone(),
        }
    }
}
