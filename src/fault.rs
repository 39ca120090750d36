//! User-facing diagnostic reporting.
//!
//! A [`Position`] is a deep-copied `(file, line, column)` triple so stored
//! diagnostics remain valid after the compile cursor moves on. [`Severity`]
//! distinguishes informational notes from warnings and hard failures; a
//! `FAIL` does not itself unwind anything, it only marks the enclosing
//! [`Faults`] accumulator as failed, exactly as in the source material's
//! "print and keep going" fault model.

use std::fmt;

use crate::compst::Cursor;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational; does not fail the compile.
    Note,
    /// Reserved for truncation/overflow warnings; does not fail the compile.
    Warn,
    /// Marks the enclosing pass as failed.
    Fail,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Note => "Note ..",
            Severity::Warn => "Warning",
            Severity::Fail => "Error .",
        };
        write!(f, "{}", s)
    }
}

/// A deep-copied source position, safe to store past the lifetime of the
/// [`Cursor`] it was captured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Captures the current position of `cursor`.
    pub fn capture(cursor: &Cursor) -> Self {
        Position {
            file: cursor.file().to_string(),
            line: cursor.line(),
            column: cursor.column(),
        }
    }

    /// A position with no associated source, used when a fault cannot be
    /// attributed to a specific file/line (prefer [`Position::capture`]
    /// wherever a cursor is available).
    pub fn none() -> Self {
        Position {
            file: "<no file>".to_string(),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File ..: {}", self.file)?;
        write!(f, "At ....: Line {}, Character {}", self.line, self.column)
    }
}

/// A single rendered diagnostic.
#[derive(Debug, Clone)]
pub struct Fault {
    pub severity: Severity,
    pub message: String,
    pub position: Position,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.severity, self.message)?;
        write!(f, "{}", self.position)
    }
}

/// Accumulates diagnostics for a compile session and tracks whether any
/// `FAIL`-severity fault has been raised. The driver consults
/// [`Faults::failed`] before deciding whether to proceed to the next pass.
#[derive(Debug, Default)]
pub struct Faults {
    log: Vec<Fault>,
    failed: bool,
}

impl Faults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic at the given position and prints it immediately
    /// (the three-line `Severity: message / File / At` format), matching
    /// the source's immediate-print-at-fault-time behavior.
    pub fn report(&mut self, severity: Severity, message: impl Into<String>, position: Position) {
        let fault = Fault {
            severity,
            message: message.into(),
            position,
        };
        println!("{}", fault);
        if severity == Severity::Fail {
            self.failed = true;
            log::debug!("fault raised: {}", fault.message);
        }
        self.log.push(fault);
    }

    /// Convenience: reports a fault anchored at the cursor's current
    /// position.
    pub fn report_at(&mut self, severity: Severity, message: impl Into<String>, cursor: &Cursor) {
        self.report(severity, message, Position::capture(cursor));
    }

    /// `true` once at least one `FAIL` has been reported.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// All diagnostics reported so far, in report order.
    pub fn log(&self) -> &[Fault] {
        &self.log
    }

    /// Count of `FAIL`-severity diagnostics.
    pub fn fail_count(&self) -> usize {
        self.log
            .iter()
            .filter(|f| f.severity == Severity::Fail)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_sets_sticky_flag() {
        let mut faults = Faults::new();
        assert!(!faults.failed());
        faults.report(Severity::Note, "just a note", Position::none());
        assert!(!faults.failed());
        faults.report(Severity::Fail, "boom", Position::none());
        assert!(faults.failed());
        assert_eq!(faults.fail_count(), 1);
    }

    #[test]
    fn display_matches_three_line_shape() {
        let fault = Fault {
            severity: Severity::Fail,
            message: "Undefined symbol: foo".to_string(),
            position: Position {
                file: "main.asm".to_string(),
                line: 3,
                column: 7,
            },
        };
        let rendered = fault.to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next().unwrap(), "Error .: Undefined symbol: foo");
        assert_eq!(lines.next().unwrap(), "File ..: main.asm");
        assert_eq!(lines.next().unwrap(), "At ....: Line 3, Character 7");
    }
}
