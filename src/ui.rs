use console::{Term, style};
use std::{env, fmt::Display};

use crate::mutant::VerdictKind;
use crate::run_report::MutantRecord;

/// Small UI helper:
/// - normal mode: human output to stdout, errors to stderr
/// - `--json` mode: ALL human output to stderr (stdout stays machine-readable JSON)
/// - fancy styling only on a real TTY and when NO_COLOR/CI are not set
#[derive(Debug, Clone)]
pub struct Ui {
    out: Term,
    err: Term,
    fancy: bool,
    enabled: bool,

    // Outcome counters, observable in unit tests.
    progress_killed: u64,
    progress_survived: u64,
    progress_compile_failed: u64,
    progress_no_applicable: u64,
}

impl Ui {
    pub fn new(json: bool) -> Self {
        // In --json mode, keep stdout clean for JSON and send all human output to stderr.
        let out = if json { Term::stderr() } else { Term::stdout() };
        let err = Term::stderr();

        // Fancy output must only activate when the actual stream used for human output is a TTY.
        let out_is_tty = out.is_term();

        let no_color = env::var_os("NO_COLOR").is_some();
        let in_ci = env::var_os("CI").is_some();

        let fancy = out_is_tty && !no_color && !in_ci;

        Self {
            out,
            err,
            fancy,
            enabled: true,
            progress_killed: 0,
            progress_survived: 0,
            progress_compile_failed: 0,
            progress_no_applicable: 0,
        }
    }

    /// Useful for unit tests to avoid noisy output.
    #[cfg(test)]
    pub fn silent() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            fancy: false,
            enabled: false,
            progress_killed: 0,
            progress_survived: 0,
            progress_compile_failed: 0,
            progress_no_applicable: 0,
        }
    }

    fn write_out(&self, s: &str) {
        if self.enabled {
            let _ = self.out.write_line(s);
        }
    }

    fn write_err(&self, s: &str) {
        if self.enabled {
            let _ = self.err.write_line(s);
        }
    }

    pub fn line(&self, msg: impl Display) {
        self.write_out(&msg.to_string());
    }

    pub fn title(&self, msg: impl Display) {
        let s = msg.to_string();
        if self.fancy {
            self.write_out(&style(s).bold().to_string());
        } else {
            self.write_out(&s);
        }
    }

    pub fn error(&self, msg: impl Display) {
        let s = msg.to_string();
        if self.fancy {
            self.write_err(&style(s).red().bold().to_string());
        } else {
            self.write_err(&s);
        }
    }

    /// Per-mutant progress line.
    ///
    /// In non-fancy mode this prints plain stable lines so output stays
    /// greppable in CI logs.
    pub fn mutant_progress(&mut self, record: &MutantRecord) {
        match record.outcome {
            VerdictKind::Killed => {
                self.progress_killed = self.progress_killed.saturating_add(1)
            }
            VerdictKind::Survived => {
                self.progress_survived = self.progress_survived.saturating_add(1)
            }
            VerdictKind::CompileFailed => {
                self.progress_compile_failed = self.progress_compile_failed.saturating_add(1)
            }
            VerdictKind::NoApplicableTests => {
                self.progress_no_applicable = self.progress_no_applicable.saturating_add(1)
            }
        }

        if !self.fancy {
            match record.outcome {
                VerdictKind::Survived => {
                    self.line(format!("mutant {} survived (tests still pass)", record.id));
                }
                VerdictKind::Killed => {
                    self.line(format!(
                        "mutant {} killed (tests failed under mutation)",
                        record.id
                    ));
                }
                VerdictKind::CompileFailed => {
                    self.line(format!("mutant {} failed to compile", record.id));
                }
                VerdictKind::NoApplicableTests => {
                    self.line(format!("mutant {} has no covering tests", record.id));
                }
            }
            return;
        }

        let tag = match record.outcome {
            VerdictKind::Killed => style("KILLED").red().bold(),
            VerdictKind::Survived => style("SURVIVED").green().bold(),
            VerdictKind::CompileFailed => style("NO-COMPILE").yellow().bold(),
            VerdictKind::NoApplicableTests => style("NO-TESTS").dim().bold(),
        };

        let file = record.file.display();
        let change = format!(
            "{:?} -> {:?}",
            record.original_snippet, record.mutated_snippet
        );

        self.line(format!(
            "{tag} {dur:>6}  #{id} {file} [{start}..{end}] {method}: {change}",
            tag = tag,
            dur = format!("{}ms", record.duration_ms),
            id = record.id,
            start = record.start,
            end = record.end,
            method = record.method,
        ));
    }

    #[allow(dead_code)]
    pub fn is_fancy(&self) -> bool {
        self.fancy && self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use crate::mutant::MutatedUnit;
    use crate::source::SourceDocument;
    use crate::span::SourceSpan;

    fn record(outcome: VerdictKind) -> MutantRecord {
        let unit = MutatedUnit {
            id: 1,
            document: SourceDocument::from_relative(
                Path::new("/proj"),
                Path::new("src/calc.src"),
            ),
            mutated_source: String::new(),
            span: SourceSpan {
                file: PathBuf::from("src/calc.src"),
                start: 0,
                end: 1,
            },
            original_snippet: "+".to_string(),
            mutated_snippet: "-".to_string(),
            method: "calc::add".to_string(),
        };
        MutantRecord::new(&unit, outcome, Duration::from_millis(10))
    }

    #[test]
    fn is_fancy_requires_fancy_and_enabled() {
        let base = Ui::silent();

        let mut a = base.clone();
        a.fancy = false;
        a.enabled = false;
        assert!(!a.is_fancy());

        let mut b = base.clone();
        b.fancy = true;
        b.enabled = false;
        assert!(!b.is_fancy());

        let mut c = base.clone();
        c.fancy = false;
        c.enabled = true;
        assert!(!c.is_fancy());

        let mut d = base.clone();
        d.fancy = true;
        d.enabled = true;
        assert!(d.is_fancy());
    }

    #[test]
    fn mutant_progress_tracks_every_outcome() {
        let mut ui = Ui::silent();

        ui.mutant_progress(&record(VerdictKind::Killed));
        assert_eq!(ui.progress_killed, 1);

        ui.mutant_progress(&record(VerdictKind::Survived));
        ui.mutant_progress(&record(VerdictKind::Survived));
        assert_eq!(ui.progress_survived, 2);

        ui.mutant_progress(&record(VerdictKind::CompileFailed));
        assert_eq!(ui.progress_compile_failed, 1);

        ui.mutant_progress(&record(VerdictKind::NoApplicableTests));
        assert_eq!(ui.progress_no_applicable, 1);

        assert_eq!(ui.progress_killed, 1);
    }
}
