//! Literal and symbol-definition parsing: turns the text following a label,
//! `equ`, or instruction operand into either an immediate value or a
//! (possibly forward) reference into the symbol table.

use crate::compst::Cursor;
use crate::fault::{Faults, Position, Severity};
use crate::section::SectionStore;
use crate::strpr;
use crate::symtab::{self, DefId, SymbolTable};

/// The value side of a parsed literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    /// Already known, e.g. a decimal/hex/binary constant or a symbol that
    /// happened to pre-resolve.
    Value(u32),
    /// Not yet resolvable; this id must be fed through [`SymbolTable`]
    /// resolution before it has a value.
    Symbol(DefId),
}

/// The result of successfully parsing one literal.
#[derive(Debug, Clone)]
pub struct ParsedLiteral {
    /// `None` only for a quoted string longer than 4 characters: the
    /// string was recognized but carries no usable value, matching a
    /// location that needs a value unable to bind to it.
    pub literal: Option<Literal>,
    /// Set when the literal was a quoted string (regardless of whether it
    /// was short enough to also carry a packed [`Literal::Value`]).
    pub is_string: bool,
    /// The decoded bytes of a quoted string, of any length. `Some` exactly
    /// when `is_string` is set; callers that need the whole string (e.g.
    /// `db "text"`) use this instead of the packed [`Literal::Value`],
    /// which only ever covers the first four bytes.
    pub string_bytes: Option<Vec<u8>>,
    /// Offset within `src` parsing stopped at (the separator, bracket or
    /// line end that follows the literal).
    pub consumed: usize,
}

fn parse_decimal(src: &[u8]) -> Option<(u32, usize)> {
    let mut u: u64 = 0;
    let mut e = 0;
    while e < src.len() && src[e].is_ascii_digit() {
        if u > u64::from(u32::MAX) / 10 {
            return None;
        }
        u = u * 10 + u64::from(src[e] - b'0');
        e += 1;
    }
    if e != 0 && !strpr::is_symbol_char(*src.get(e).unwrap_or(&0)) {
        Some((u as u32, e))
    } else {
        None
    }
}

fn parse_hex(src: &[u8]) -> Option<(u32, usize)> {
    if src.first() != Some(&b'0') || src.get(1) != Some(&b'x') {
        return None;
    }
    let mut u: u64 = 0;
    let mut e = 2;
    while let Some(&c) = src.get(e) {
        let digit = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => break,
        };
        if u > (u64::from(u32::MAX) >> 4) {
            return None;
        }
        u = (u << 4) + u64::from(digit);
        e += 1;
    }
    if e != 2 && !strpr::is_symbol_char(*src.get(e).unwrap_or(&0)) {
        Some((u as u32, e))
    } else {
        None
    }
}

fn parse_binary(src: &[u8]) -> Option<(u32, usize)> {
    if src.first() != Some(&b'0') || src.get(1) != Some(&b'b') {
        return None;
    }
    let mut u: u64 = 0;
    let mut e = 2;
    while let Some(&c) = src.get(e) {
        if c != b'0' && c != b'1' {
            break;
        }
        if u > (u64::from(u32::MAX) >> 1) {
            return None;
        }
        u = (u << 1) + u64::from(c - b'0');
        e += 1;
    }
    if e != 2 && !strpr::is_symbol_char(*src.get(e).unwrap_or(&0)) {
        Some((u as u32, e))
    } else {
        None
    }
}

fn finish(src: &[u8], e: usize) -> Result<usize, ()> {
    let e = strpr::skip_whitespace(src, e);
    let c = *src.get(e).unwrap_or(&0);
    if strpr::is_line_end(c) || c == b',' || c == b'{' || c == b'}' || c == b']' {
        Ok(e)
    } else {
        Err(())
    }
}

/// Parses one literal starting at `src`. `src` must include the trailing
/// NUL sentinel a [`Cursor`] line buffer always carries. Returns `None`
/// (fault already reported) on a malformed literal.
pub fn parse(
    src: &[u8],
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
) -> Option<ParsedLiteral> {
    if let Some((bytes, e)) = strpr::extract_string(src) {
        let fits = bytes.len() < 5;
        let mut u: u32 = 0;
        for &b in bytes.iter().take(5) {
            u = (u << 8) | u32::from(b);
        }
        let consumed = match finish(src, e) {
            Ok(c) => c,
            Err(()) => {
                faults.report_at(Severity::Fail, "Improperly formatted literal", cursor);
                return None;
            }
        };
        return Some(ParsedLiteral {
            literal: fits.then_some(Literal::Value(u)),
            is_string: true,
            string_bytes: Some(bytes),
            consumed,
        });
    }

    if let Some((value, e)) = parse_decimal(src)
        .or_else(|| parse_hex(src))
        .or_else(|| parse_binary(src))
    {
        let consumed = match finish(src, e) {
            Ok(c) => c,
            Err(()) => {
                faults.report_at(Severity::Fail, "Improperly formatted literal", cursor);
                return None;
            }
        };
        return Some(ParsedLiteral {
            literal: Some(Literal::Value(value)),
            is_string: false,
            string_bytes: None,
            consumed,
        });
    }

    if strpr::is_symbol_char(*src.first().unwrap_or(&0)) {
        let mut e = 0;
        while strpr::is_symbol_char(*src.get(e).unwrap_or(&0)) {
            e += 1;
        }
        let (name, _) = cursor.copy_symbol(src);
        let def = table.get_or_create_by_name(&name, Position::capture(cursor));
        let literal = match table.try_resolve(def, faults) {
            Some(v) => Literal::Value(v),
            None => Literal::Symbol(def),
        };
        let consumed = match finish(src, e) {
            Ok(c) => c,
            Err(()) => {
                faults.report_at(Severity::Fail, "Improperly formatted literal", cursor);
                return None;
            }
        };
        return Some(ParsedLiteral {
            literal: Some(literal),
            is_string: false,
            string_bytes: None,
            consumed,
        });
    }

    faults.report_at(Severity::Fail, "Improperly formatted literal", cursor);
    None
}

/// What, if anything, [`parse_symbol_definition`] found at the start of the
/// current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefOutcome {
    /// No label or `equ` here; the caller should continue parsing the line
    /// as an instruction or directive.
    None,
    /// A line label (`name:`) was bound to the current section offset. The
    /// cursor has been advanced past it; the rest of the line may still
    /// hold an instruction.
    Label,
    /// An `equ` definition consumed the rest of the line.
    Equ,
}

fn is_equ_keyword(s: &[u8]) -> bool {
    s.len() >= 3 && &s[0..3] == b"equ" && !strpr::is_symbol_char(*s.get(3).unwrap_or(&0))
}

/// Checks for a symbol definition (`label:` or `name equ value`) at the
/// start of the cursor's current line, binding it into `table` if found.
pub fn parse_symbol_definition(
    cursor: &mut Cursor,
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<DefOutcome, ()> {
    let s = cursor.remaining().to_vec();

    let mut i = 0;
    while i < s.len() && strpr::is_symbol_char(s[i]) {
        i += 1;
    }
    if i == 0 {
        return Ok(DefOutcome::None);
    }
    i = strpr::skip_whitespace(&s, i);

    if s.get(i) == Some(&b':') {
        cursor.set_global_symbol(&s);
        let position = Position::capture(cursor);
        let (name, _) = cursor.copy_symbol(&s);
        let offset = sections.offset_words();
        let id = table.add_definition(
            symtab::Op::Add,
            symtab::Source::Value(offset as u32),
            symtab::Source::ByName(sections.current().base_symbol().to_string()),
            position.clone(),
        );
        table.bind(&name, id, &position, faults)?;
        cursor.advance_column((i + 1) as u32);
        return Ok(DefOutcome::Label);
    }

    if is_equ_keyword(&s[i..]) {
        let after = strpr::skip_whitespace(&s, i + 3);
        let position = Position::capture(cursor);
        if let Some(parsed) = parse(&s[after..], table, cursor, faults) {
            if let Some(literal) = parsed.literal {
                let (name, _) = cursor.copy_symbol(&s);
                let id = match literal {
                    Literal::Value(v) => table.add_value(v, position.clone()),
                    Literal::Symbol(id) => id,
                };
                table.bind(&name, id, &position, faults)?;
                return Ok(DefOutcome::Equ);
            }
        }
    }

    Ok(DefOutcome::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionId;

    fn cursor_with_line(line: &str) -> Cursor {
        let mut cursor = Cursor::new();
        cursor.set_file("test.asm");
        cursor.set_line(1);
        cursor.set_source_line(line.as_bytes());
        cursor
    }

    #[test]
    fn parses_decimal() {
        let cursor = cursor_with_line("1234\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let parsed = parse(cursor.source_line(), &mut table, &cursor, &mut faults).unwrap();
        assert_eq!(parsed.literal, Some(Literal::Value(1234)));
    }

    #[test]
    fn parses_hex() {
        let cursor = cursor_with_line("0x1F\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let parsed = parse(cursor.source_line(), &mut table, &cursor, &mut faults).unwrap();
        assert_eq!(parsed.literal, Some(Literal::Value(0x1F)));
    }

    #[test]
    fn parses_binary() {
        let cursor = cursor_with_line("0b101\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let parsed = parse(cursor.source_line(), &mut table, &cursor, &mut faults).unwrap();
        assert_eq!(parsed.literal, Some(Literal::Value(0b101)));
    }

    #[test]
    fn parses_short_string_as_packed_value() {
        let cursor = cursor_with_line("\"AB\"\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let parsed = parse(cursor.source_line(), &mut table, &cursor, &mut faults).unwrap();
        assert_eq!(parsed.literal, Some(Literal::Value(0x4142)));
        assert!(parsed.is_string);
    }

    #[test]
    fn decimal_followed_by_letter_is_a_symbol() {
        let cursor = cursor_with_line("123abc\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let parsed = parse(cursor.source_line(), &mut table, &cursor, &mut faults).unwrap();
        assert!(matches!(parsed.literal, Some(Literal::Symbol(_))));
    }

    #[test]
    fn label_binds_to_current_section_offset() {
        let mut cursor = cursor_with_line("start: mov a, 0\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let mut sections = SectionStore::new();
        sections.select(SectionId::Code);
        sections.push_word(0).unwrap();
        sections.push_word(0).unwrap();
        let outcome = parse_symbol_definition(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(outcome, DefOutcome::Label);
        assert_eq!(cursor.remaining(), b" mov a, 0\n\0");
    }

    #[test]
    fn equ_binds_an_immediate_value() {
        let mut cursor = cursor_with_line("width equ 320\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let mut sections = SectionStore::new();
        let outcome = parse_symbol_definition(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(outcome, DefOutcome::Equ);
        let mut faults = Faults::new();
        let position = Position::none();
        let def = table.get_or_create_by_name("width", position);
        assert_eq!(table.try_resolve(def, &mut faults), Some(320));
    }

    #[test]
    fn non_label_line_reports_none() {
        let mut cursor = cursor_with_line("mov a, 0\n");
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        let mut sections = SectionStore::new();
        let outcome = parse_symbol_definition(&mut cursor, &mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(outcome, DefOutcome::None);
    }
}
