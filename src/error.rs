//! The crate's public error boundary.
//!
//! Mirrors how a build/rewrite tool sitting atop a lower-level parsing crate
//! wraps that crate's own error type alongside its own I/O failures: callers
//! get one `Error` to match on, regardless of whether the failure came from
//! the filesystem or from the assembler pipeline itself.

use std::fmt;

use crate::fault::{Faults, Severity};

/// Top-level error returned by [`crate::assemble`].
#[derive(Debug)]
pub enum Error {
    /// Opening a source file or writing the output file failed.
    Io(std::io::Error),
    /// One or more faults were raised during assembly.
    Compile {
        /// Number of `FAIL`-severity diagnostics raised.
        count: usize,
        /// The worst severity seen (always `Fail` in practice, since only
        /// `Fail` stops the compile, but kept general).
        severity: Severity,
        /// The diagnostics, already rendered as they were printed during
        /// the pass.
        rendered_text: String,
    },
}

impl Error {
    /// Builds an [`Error::Compile`] from an accumulated [`Faults`] log.
    /// Panics if called on a [`Faults`] that never failed — callers are
    /// expected to check [`Faults::failed`] first.
    pub fn from_faults(faults: &Faults) -> Self {
        debug_assert!(faults.failed(), "Error::from_faults called without a FAIL-severity fault");
        let severity = faults
            .log()
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Fail);
        let rendered_text = faults
            .log()
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Error::Compile {
            count: faults.fail_count(),
            severity,
            rendered_text,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Compile { count, .. } => {
                write!(f, "compilation failed with {} error(s)", count)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Compile { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Position;

    #[test]
    fn compile_error_carries_fail_count_and_rendered_text() {
        let mut faults = Faults::new();
        faults.report(Severity::Fail, "Undefined symbol: foo", Position::none());
        let err = Error::from_faults(&faults);
        match err {
            Error::Compile { count, severity, rendered_text } => {
                assert_eq!(count, 1);
                assert_eq!(severity, Severity::Fail);
                assert!(rendered_text.contains("Undefined symbol: foo"));
            }
            Error::Io(_) => panic!("expected Compile variant"),
        }
    }

    #[test]
    fn io_error_displays_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
