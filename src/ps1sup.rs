//! Pass-1 directive handling: `section`, `org`, `ds`/`db`/`dw`, and the
//! application-header field aliases (`AppAuth`, `AppName`, `Version`,
//! `EngSpec`, `License`).
//!
//! Runs after [`crate::litpr::parse_symbol_definition`] has already
//! consumed any leading label, starting from wherever the cursor's column
//! currently sits.

use crate::compst::Cursor;
use crate::fault::{Faults, Position, Severity};
use crate::litpr::{self, Literal};
use crate::section::{SectionId, SectionStore};
use crate::strpr;
use crate::symtab::SymbolTable;
use crate::valwr::Shape;

/// Outcome of attempting to parse the rest of the line as one of the
/// directives this module understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing recognized; the line should be tried as an instruction.
    NotHandled,
    /// Fully handled; nothing else remains to parse on this line.
    Handled,
}

fn keyword_at(s: &[u8], pos: usize, word: &[u8]) -> bool {
    s.len() >= pos + word.len()
        && &s[pos..pos + word.len()] == word
        && !strpr::is_symbol_char(*s.get(pos + word.len()).unwrap_or(&0))
}

/// Parses `AppAuth`/`AppName`/`Version`/`EngSpec`/`License`, `section`,
/// `org`, `ds`, `db` and `dw` at the cursor's current position.
pub fn parse_directive(
    cursor: &mut Cursor,
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<Outcome, ()> {
    let col0 = cursor.column();
    let s = cursor.remaining().to_vec();
    let mut beg = strpr::skip_whitespace(&s, 0);

    if strpr::is_line_end(*s.get(beg).unwrap_or(&0)) {
        return Ok(Outcome::Handled);
    }

    for (keyword, header_offset) in [
        (&b"AppAuth"[..], 0x0007usize),
        (&b"AppName"[..], 0x0014),
        (&b"Version"[..], 0x002A),
        (&b"EngSpec"[..], 0x0034),
        (&b"License"[..], 0x0045),
    ] {
        if keyword_at(&s, beg, keyword) {
            sections.select(SectionId::Head);
            sections.set_offset_words(header_offset);
            beg = strpr::skip_whitespace(&s, beg + keyword.len());
            break;
        }
    }

    let fail = |cursor: &mut Cursor, faults: &mut Faults, beg: usize, message: &str| -> Result<Outcome, ()> {
        cursor.set_column(col0 + beg as u32);
        faults.report_at(Severity::Fail, message, cursor);
        Err(())
    };

    if keyword_at(&s, beg, b"section") {
        let name_start = strpr::skip_whitespace(&s, beg + 7);
        let mut end = name_start;
        while strpr::is_symbol_char(*s.get(end).unwrap_or(&0)) {
            end += 1;
        }
        let id = match SectionId::from_directive(&s[name_start..end]) {
            Some(id) => id,
            None => return fail(cursor, faults, beg, "Malformed section specification"),
        };
        sections.select(id);
        let after = strpr::skip_whitespace(&s, end);
        if !strpr::is_line_end(*s.get(after).unwrap_or(&0)) {
            return fail(cursor, faults, beg, "Malformed section specification");
        }
        return Ok(Outcome::Handled);
    }

    if keyword_at(&s, beg, b"org") {
        let after_kw = strpr::skip_whitespace(&s, beg + 3);
        cursor.set_column(col0 + after_kw as u32);
        let parsed = match litpr::parse(&s[after_kw..], table, cursor, faults) {
            Some(p) => p,
            None => return Err(()),
        };
        let value = match parsed.literal {
            Some(Literal::Value(v)) if !parsed.is_string && v <= 0xFFFF => v,
            _ => return fail(cursor, faults, beg, "Malformed origin"),
        };
        sections.set_offset_words(value as usize);
        let end = after_kw + parsed.consumed;
        if !strpr::is_line_end(*s.get(end).unwrap_or(&0)) {
            return fail(cursor, faults, beg, "Malformed section specification");
        }
        return Ok(Outcome::Handled);
    }

    if keyword_at(&s, beg, b"ds") {
        if sections.current() != SectionId::Zero {
            return fail(cursor, faults, beg, "'ds' is only allowed in zero section");
        }
        let after_kw = strpr::skip_whitespace(&s, beg + 2);
        cursor.set_column(col0 + after_kw as u32);
        let parsed = match litpr::parse(&s[after_kw..], table, cursor, faults) {
            Some(p) => p,
            None => return Err(()),
        };
        let value = match parsed.literal {
            Some(Literal::Value(v)) if !parsed.is_string && v <= 0xFFFF => v,
            _ => return fail(cursor, faults, beg, "Malformed 'ds'"),
        };
        for _ in 0..value {
            if sections.push_word(0).is_err() {
                return fail(cursor, faults, beg, "Overlap or out of section encountered");
            }
        }
        let end = after_kw + parsed.consumed;
        if !strpr::is_line_end(*s.get(end).unwrap_or(&0)) {
            return fail(cursor, faults, beg, "Malformed 'ds'");
        }
        return Ok(Outcome::Handled);
    }

    if keyword_at(&s, beg, b"db") || keyword_at(&s, beg, b"dw") {
        let is_word = s.get(beg + 1) == Some(&b'w');
        let id = sections.current();
        if id == SectionId::Zero || id == SectionId::File {
            return fail(
                cursor,
                faults,
                beg,
                "'db' or 'dw' is only allowed in code, data, head or desc",
            );
        }

        let mut pos = strpr::skip_whitespace(&s, beg + 2);
        loop {
            cursor.set_column(col0 + pos as u32);
            let position = Position::capture(cursor);
            let parsed = match litpr::parse(&s[pos..], table, cursor, faults) {
                Some(p) => p,
                None => return Err(()),
            };

            if parsed.is_string && !is_word {
                let bytes = parsed.string_bytes.as_deref().unwrap_or(&[]);
                for &byte in bytes {
                    if sections.push_byte(byte).is_err() {
                        return fail(cursor, faults, beg, "Overlap or out of section encountered");
                    }
                }
            } else if parsed.is_string && is_word {
                // A bare string inside 'dw' is malformed in the source material;
                // fall through to the literal-value branch below which will
                // reject it for lacking a usable numeric value.
                match parsed.literal {
                    Some(Literal::Value(v)) => {
                        if sections.push_word(v as u16).is_err() {
                            return fail(cursor, faults, beg, "Overlap or out of section encountered");
                        }
                    }
                    _ => return fail(cursor, faults, beg, "Malformed 'db' or 'dw'"),
                }
            } else {
                match parsed.literal {
                    Some(Literal::Value(v)) => {
                        let pushed = if is_word {
                            sections.push_word(v as u16)
                        } else {
                            sections.push_byte(v as u8)
                        };
                        if pushed.is_err() {
                            return fail(cursor, faults, beg, "Overlap or out of section encountered");
                        }
                    }
                    Some(Literal::Symbol(def)) => {
                        let offset_bytes = sections.offset_bytes();
                        let offset_words = sections.offset_words();
                        let pushed = if is_word {
                            sections.push_word(0)
                        } else {
                            sections.push_byte(0)
                        };
                        if pushed.is_err() {
                            return fail(cursor, faults, beg, "Overlap or out of section encountered");
                        }
                        let shape = if is_word {
                            Shape::C16
                        } else if offset_bytes & 1 == 0 {
                            Shape::C8H
                        } else {
                            Shape::C8L
                        };
                        let use_offset = if is_word { offset_words } else { offset_bytes >> 1 };
                        table.add_use(def, id, use_offset, shape, position);
                    }
                    None => return fail(cursor, faults, beg, "Malformed 'db' or 'dw'"),
                }
            }

            pos += parsed.consumed;
            let c = *s.get(pos).unwrap_or(&0);
            if strpr::is_line_end(c) {
                break;
            }
            if c != b',' {
                return fail(cursor, faults, beg, "Malformed 'db' or 'dw'");
            }
            pos = strpr::skip_whitespace(&s, pos + 1);
        }

        return Ok(Outcome::Handled);
    }

    Ok(Outcome::NotHandled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_with_line(line: &str) -> Cursor {
        let mut cursor = Cursor::new();
        cursor.set_file("test.asm");
        cursor.set_line(1);
        cursor.set_source_line(line.as_bytes());
        cursor
    }

    #[test]
    fn section_directive_switches_active_section() {
        let mut cursor = cursor_with_line("section data\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let outcome = parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(sections.current(), SectionId::Data);
    }

    #[test]
    fn org_sets_the_section_cursor() {
        let mut cursor = cursor_with_line("org 0x100\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(sections.offset_words(), 0x100);
    }

    #[test]
    fn ds_rejected_outside_zero_section() {
        let mut cursor = cursor_with_line("ds 4\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        assert!(parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).is_err());
    }

    #[test]
    fn ds_reserves_words_in_zero_section() {
        let mut cursor = cursor_with_line("ds 4\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Zero);
        parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(sections.size(SectionId::Zero), 4);
    }

    #[test]
    fn db_pushes_bytes_and_string_contents() {
        let mut cursor = cursor_with_line("db 1, 2, \"AB\"\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(sections.data(SectionId::Code), &[0x0102, 0x4142]);
    }

    #[test]
    fn dw_pushes_words_and_defers_forward_references() {
        let mut cursor = cursor_with_line("dw 1, later\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(sections.size(SectionId::Code), 2);
        let literal = table.add_value(0x55, Position::none());
        table.bind("later", literal, &Position::none(), &mut faults).unwrap();
        table.resolve_all(&mut sections, &mut faults).unwrap();
        assert_eq!(sections.data(SectionId::Code), &[1, 0x55]);
    }

    #[test]
    fn apphead_alias_selects_head_section_and_offset() {
        let mut cursor = cursor_with_line("AppName db \"demo\"\n");
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        let outcome = parse_directive(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(sections.current(), SectionId::Head);
        assert_eq!(sections.offset_words(), 0x0014 + 2);
    }
}
