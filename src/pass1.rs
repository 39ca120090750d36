//! Pass-1 driver: reads the root source (and any transitively included
//! files) line by line, offering each line to the fixed parser chain
//! (symbol definition, directive, bindata, instruction) before advancing.
//!
//! Diverges from the original driver's abort-on-first-error behavior: a
//! fault on one line only stops that line's processing, not the whole pass.
//! Every line is always attempted so every diagnostic is reported; the
//! caller checks `faults.failed()` before proceeding to pass 2.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

use crate::bindata;
use crate::compst::Cursor;
use crate::fault::{Faults, Severity};
use crate::incstk::IncludeStack;
use crate::litpr::{self, DefOutcome};
use crate::opcode;
use crate::ps1sup;
use crate::section::SectionStore;
use crate::strpr;
use crate::symtab::SymbolTable;

/// Source lines longer than this are truncated with a NOTE.
const LINE_MAX: usize = 256;

/// A fully buffered source file plus a read cursor into it.
struct Source {
    bytes: Vec<u8>,
    pos: usize,
}

impl Source {
    fn open(path: &str) -> std::io::Result<Self> {
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Source { bytes, pos: 0 })
    }

    /// Reads the next line into `cursor`, advancing the line number.
    fn read_line(&mut self, cursor: &mut Cursor, faults: &mut Faults) {
        cursor.set_line(cursor.line() + 1);
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        let raw = &self.bytes[start..self.pos];
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
        let (line, truncated) = strpr::bounded_copy(raw, LINE_MAX);
        if truncated {
            faults.report_at(Severity::Note, "Source line too long", cursor);
        }
        cursor.set_source_line(&line);
    }

    /// `true` once every byte of the file has been consumed.
    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

fn open_source(path: &str, cursor: &mut Cursor, faults: &mut Faults) -> Result<Source, ()> {
    cursor.set_file(path);
    match Source::open(path) {
        Ok(source) => Ok(source),
        Err(e) => {
            faults.report_at(Severity::Fail, format!("Failed to open {}: {}", path, e), cursor);
            Err(())
        }
    }
}

enum IncludeLine {
    /// Not an `include` directive; try the regular parser chain.
    NotInclude,
    /// Parsed `include "<path>"`; the directive has already fully consumed
    /// the line one way or another (queued, deduplicated, or faulted).
    Handled(String),
}

/// Recognizes `include "<path>"` at the cursor's current position.
fn check_include(cursor: &mut Cursor, faults: &mut Faults) -> Result<IncludeLine, ()> {
    let col0 = cursor.column();
    let s = cursor.remaining().to_vec();
    let beg = strpr::skip_whitespace(&s, 0);

    let keyword = b"include";
    if s.len() < beg + keyword.len()
        || &s[beg..beg + keyword.len()] != keyword
        || strpr::is_symbol_char(*s.get(beg + keyword.len()).unwrap_or(&0))
    {
        return Ok(IncludeLine::NotInclude);
    }

    let name_start = strpr::skip_whitespace(&s, beg + keyword.len());
    let (path_bytes, consumed) = match strpr::extract_string(&s[name_start..]) {
        Some(r) => r,
        None => {
            cursor.set_column(col0 + beg as u32);
            faults.report_at(Severity::Fail, "Malformed include", cursor);
            return Err(());
        }
    };
    let end = strpr::skip_whitespace(&s, name_start + consumed);
    if !strpr::is_line_end(*s.get(end).unwrap_or(&0)) {
        cursor.set_column(col0 + beg as u32);
        faults.report_at(Severity::Fail, "Malformed include", cursor);
        return Err(());
    }
    cursor.set_column(col0 + end as u32);

    Ok(IncludeLine::Handled(String::from_utf8_lossy(&path_bytes).into_owned()))
}

/// Runs the fixed per-line parser chain: symbol definition, then directive,
/// then bindata, then instruction, each only tried once the previous stage
/// declined the line.
fn process_chain(cursor: &mut Cursor, sections: &mut SectionStore, table: &mut SymbolTable, faults: &mut Faults) {
    match litpr::parse_symbol_definition(cursor, sections, table, faults) {
        Ok(DefOutcome::Equ) => return,
        Ok(DefOutcome::Label) | Ok(DefOutcome::None) => {}
        Err(()) => return,
    }

    match ps1sup::parse_directive(cursor, sections, table, faults) {
        Ok(ps1sup::Outcome::Handled) => return,
        Ok(ps1sup::Outcome::NotHandled) => {}
        Err(()) => return,
    }

    match bindata::parse_directive(cursor, sections, faults) {
        Ok(bindata::Outcome::Handled) => return,
        Ok(bindata::Outcome::NotHandled) => {}
        Err(()) => return,
    }

    let _ = opcode::process(cursor, sections, table, faults);
}

/// Runs pass 1 against the root file `path`. Leaves `faults.failed()` set
/// if any line-level fault was reported; the caller decides whether to
/// continue to pass 2.
pub fn run(
    path: &str,
    cursor: &mut Cursor,
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<(), ()> {
    log::debug!("pass1: opening root source {}", path);

    let mut current = open_source(path, cursor, faults)?;
    let mut stack = IncludeStack::new();
    let mut frames: Vec<Source> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(path.to_string());

    cursor.set_line(0);
    current.read_line(cursor, faults);

    loop {
        match check_include(cursor, faults) {
            Ok(IncludeLine::NotInclude) => {
                process_chain(cursor, sections, table, faults);
            }
            Ok(IncludeLine::Handled(inc_path)) => {
                if seen.insert(inc_path.clone()) {
                    if stack.push(cursor.file(), cursor.line()).is_err() {
                        faults.report_at(Severity::Fail, "Include stack size exceed", cursor);
                    } else {
                        match open_source(&inc_path, cursor, faults) {
                            Ok(mut new_source) => {
                                cursor.set_line(0);
                                new_source.read_line(cursor, faults);
                                frames.push(std::mem::replace(&mut current, new_source));
                                continue;
                            }
                            Err(()) => {
                                stack.pop();
                            }
                        }
                    }
                }
                // Already included, or the include could not be honored:
                // nothing more happens on this line.
            }
            Err(()) => {
                // Malformed include; fault already reported.
            }
        }

        current.read_line(cursor, faults);
        if current.at_eof() && cursor.at_blank_line() {
            match stack.pop() {
                Some((file, line)) => {
                    current = frames.pop().expect("source stack tracks the include stack 1:1");
                    cursor.set_file(&file);
                    cursor.set_line(line);
                }
                None => break,
            }
        }
    }

    log::debug!("pass1: complete, failed={}", faults.failed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionId;

    fn run_source(src: &str) -> (SectionStore, SymbolTable, Faults) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.asm");
        std::fs::write(&path, src).unwrap();

        let mut cursor = Cursor::new();
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        run(
            path.to_str().unwrap(),
            &mut cursor,
            &mut sections,
            &mut table,
            &mut faults,
        )
        .unwrap();
        (sections, table, faults)
    }

    #[test]
    fn single_nop_in_code_section() {
        let (mut sections, mut table, mut faults) = run_source("section code\nnop\n");
        assert!(!faults.failed());
        table.resolve_all(&mut sections, &mut faults).unwrap();
        assert_eq!(sections.data(SectionId::Code), &[0xC000]);
    }

    #[test]
    fn label_then_forward_reference_resolves() {
        let (mut sections, mut table, mut faults) =
            run_source("section code\nmain: mov a, 5\n      jms main\n");
        assert!(!faults.failed());
        table.resolve_all(&mut sections, &mut faults).unwrap();
        assert_eq!(sections.size(SectionId::Code), 2);
    }

    #[test]
    fn undefined_mnemonic_reports_and_continues() {
        let (mut sections, mut table, mut faults) =
            run_source("section code\nbogusinstr a, b\nnop\n");
        assert!(faults.failed());
        // The next line still gets processed despite the earlier fault.
        table.resolve_all(&mut sections, &mut faults).unwrap();
        assert_eq!(sections.size(SectionId::Code), 1);
    }

    #[test]
    fn include_is_only_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let inc = dir.path().join("shared.asm");
        std::fs::write(&inc, "value equ 9\n").unwrap();

        let src = format!(
            "section code\ninclude \"{}\"\ninclude \"{}\"\nmov a, value\n",
            inc.display(),
            inc.display()
        );
        let (mut sections, mut table, mut faults) = run_source(&src);
        assert!(!faults.failed());
        table.resolve_all(&mut sections, &mut faults).unwrap();
    }
}
