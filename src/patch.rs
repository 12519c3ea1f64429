use anyhow::Context;

use crate::span::SourceSpan;

/// Apply a single textual replacement to `code` based on `span`.
///
/// The `span` offsets are byte indices into `code`.
pub fn apply_span_patch(code: &str, span: &SourceSpan, replacement: &str) -> String {
    let start = span.start as usize;
    let end = span.end as usize;

    debug_assert!(
        start <= end && end <= code.len(),
        "span [{start}, {end}) is out of bounds for code length {}",
        code.len()
    );

    let mut out = String::with_capacity(
        code.len() + replacement.len().saturating_sub(end.saturating_sub(start)),
    );

    out.push_str(&code[..start]);
    out.push_str(replacement);
    out.push_str(&code[end..]);

    out
}

/// Apply a replacement after verifying that the original slice matches `expected_original`.
///
/// Mutant specs arrive from an external generator, so the span is validated against
/// the document on disk before the mutated source is built from it.
pub fn apply_checked_patch(
    code: &str,
    span: &SourceSpan,
    expected_original: &str,
    replacement: &str,
) -> anyhow::Result<String> {
    let start = span.start as usize;
    let end = span.end as usize;

    if end < start || end > code.len() {
        anyhow::bail!(
            "span [{start}, {end}) is out of bounds for {:?} (length {})",
            span.file,
            code.len()
        );
    }

    // `get` also rejects offsets that fall inside a multi-byte character.
    let actual = code.get(start..end).with_context(|| {
        format!(
            "span [{start}, {end}) does not fall on character boundaries in {:?}",
            span.file
        )
    })?;

    if actual != expected_original {
        anyhow::bail!(
            "span [{start}, {end}) of {:?} contains {:?}, expected {:?}",
            span.file,
            actual,
            expected_original
        );
    }

    Ok(apply_span_patch(code, span, replacement))
}
