use crate::mutant::VerdictKind;
use crate::project::Project;
use crate::run_report::MutantRecord;

/// Print a short list of surviving mutants.
///
/// The output includes file path, line/column range, method identity, and
/// the textual replacement (original -> mutated).
pub fn print_surviving_mutants(project: &Project, records: &[MutantRecord]) {
    let survivors: Vec<&MutantRecord> = records
        .iter()
        .filter(|r| r.outcome == VerdictKind::Survived)
        .collect();

    if survivors.is_empty() {
        return;
    }

    println!(
        "--- surviving mutants ({} of {}) ---",
        survivors.len(),
        records.len()
    );

    for record in survivors {
        println!("{}", format_record_with_location(project, record));
    }
}

/// Format one mutant record as a single, readable line using line/column
/// positions when possible.
///
/// Falls back to byte spans when the source document cannot be read.
pub fn format_record_with_location(project: &Project, record: &MutantRecord) -> String {
    let document = project.document(&record.file);

    let code = match document.read_to_string() {
        Ok(c) => c,
        Err(_) => return format_record_short(record),
    };

    let start = record.start as usize;
    let end = record.end as usize;

    let Some((sl, sc)) = byte_offset_to_line_col(&code, start) else {
        return format_record_short(record);
    };

    let Some((el, ec)) = byte_offset_to_line_col(&code, end) else {
        return format_record_short(record);
    };

    let file = record.file.display();

    format!(
        "#{id} {file}:{sl}:{sc}-{el}:{ec} {method}: {orig:?} -> {mutated:?}",
        id = record.id,
        method = record.method,
        orig = record.original_snippet,
        mutated = record.mutated_snippet,
    )
}

/// Format one mutant record as a single, readable line.
pub fn format_record_short(record: &MutantRecord) -> String {
    let file = record.file.display();
    let start = record.start;
    let end = record.end;

    format!(
        "#{id} {file} [{start}..{end}] {method}: {orig:?} -> {mutated:?}",
        id = record.id,
        method = record.method,
        orig = record.original_snippet,
        mutated = record.mutated_snippet,
    )
}

/// Convert a byte offset into a 1-based (line, column) location.
///
/// Column counts Unicode scalar values on the line segment.
fn byte_offset_to_line_col(code: &str, offset: usize) -> Option<(usize, usize)> {
    if offset > code.len() {
        return None;
    }

    let prefix = &code[..offset];

    let line = prefix.as_bytes().iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|pos| pos + 1).unwrap_or(0);
    let col = code[line_start..offset].chars().count() + 1;

    Some((line, col))
}
