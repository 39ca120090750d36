//! `bindata` directive handling: includes the contents of an external file
//! into the current section.
//!
//! Outside the `FILE` section the include happens immediately, streaming
//! the named file's bytes straight into the active section buffer. Inside
//! `FILE`, the directive instead records a deferred blob reference for pass
//! 3 to stream once the section's base address is known.

use std::fs;
use std::io::Read;

use crate::compst::Cursor;
use crate::fault::{Faults, Severity};
use crate::section::{SectionId, SectionStore};
use crate::strpr;

/// Outcome of attempting to parse the rest of the line as a `bindata`
/// directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not a `bindata` line; the caller should try the next parser.
    NotHandled,
    /// Fully handled; nothing else remains to parse on this line.
    Handled,
}

/// Parses `bindata "<path>"` at the cursor's current position.
pub fn parse_directive(
    cursor: &mut Cursor,
    sections: &mut SectionStore,
    faults: &mut Faults,
) -> Result<Outcome, ()> {
    let col0 = cursor.column();
    let s = cursor.remaining().to_vec();
    let beg = strpr::skip_whitespace(&s, 0);

    let keyword = b"bindata";
    if s.len() < beg + keyword.len()
        || &s[beg..beg + keyword.len()] != keyword
        || strpr::is_symbol_char(*s.get(beg + keyword.len()).unwrap_or(&0))
    {
        return Ok(Outcome::NotHandled);
    }

    let fail = |cursor: &mut Cursor, faults: &mut Faults, at: usize, message: &str| -> Result<Outcome, ()> {
        cursor.set_column(col0 + at as u32);
        faults.report_at(Severity::Fail, message, cursor);
        Err(())
    };

    let name_start = strpr::skip_whitespace(&s, beg + keyword.len());
    let (path_bytes, consumed) = match strpr::extract_string(&s[name_start..]) {
        Some(r) => r,
        None => return fail(cursor, faults, beg, "Malformed bindata"),
    };
    let end = strpr::skip_whitespace(&s, name_start + consumed);
    if !strpr::is_line_end(*s.get(end).unwrap_or(&0)) {
        return fail(cursor, faults, beg, "Malformed bindata");
    }
    cursor.set_column(col0 + end as u32);

    let path = String::from_utf8_lossy(&path_bytes).into_owned();

    if sections.current() == SectionId::File {
        sections.push_blob(path);
        return Ok(Outcome::Handled);
    }

    if sections.current() == SectionId::Zero {
        return fail(cursor, faults, beg, "Bindata in ZERO section");
    }

    let mut file = match fs::File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            return fail(cursor, faults, beg, &format!("Unable to open {}: {}", path, e));
        }
    };
    let mut bytes = Vec::new();
    if let Err(e) = file.read_to_end(&mut bytes) {
        return fail(cursor, faults, beg, &format!("Unable to read {}: {}", path, e));
    }
    for byte in bytes {
        if sections.push_byte(byte).is_err() {
            return fail(cursor, faults, beg, "Overlap or out of section encountered");
        }
    }

    Ok(Outcome::Handled)
}
