//! Instruction decoding: turns the text following a label/directive check
//! into a mnemonic, its operands and (for function-call instructions) its
//! parameter list. Pure syntax and register-name recognition; encoding the
//! decoded pieces into instruction words happens in [`super::encode`].

use crate::compst::Cursor;
use crate::fault::{Faults, Severity};
use crate::litpr::{self, Literal};
use crate::section::{SectionId, SectionStore};
use crate::strpr;
use crate::symtab::{DefId, SymbolTable};

/// The operation an opcode mnemonic selects, with just enough information
/// for [`super::encode`] to produce the right instruction word(s). Mnemonics
/// sharing an encoding family (`Regular`/`RegularBit`/`RegularSymmetric`)
/// carry their fixed opcode bits as `mask`.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// Plain two-operand ALU form; `allow_carry` permits a `c:` target.
    Regular { mask: u16, allow_carry: bool },
    /// Bit set/clear/skip form: address operand plus a 4-bit select.
    RegularBit { mask: u16 },
    /// Two-operand form with no fixed operand order (some skip opcodes).
    RegularSymmetric { mask: u16 },
    Nop,
    Mov,
    Jms,
    Jmr,
    Jma,
    Jfr,
    Jfa,
    Jsv,
    Rfn,
    Xeq,
    Xne,
    Xug,
    Jnz,
    Psh,
    Pop,
}

/// An immediate operand's value: already known, or a reference still
/// awaiting resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imm {
    Value(u32),
    Symbol(DefId),
}

/// One of the special registers nameable only by keyword, never through the
/// general addressing-mode syntax. `Xb`'s mnemonic text is `xh` (an
/// internal-name/spelling mismatch carried over from the register's own
/// naming), `Xm`'s is `xm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    Sp,
    Bp,
    Xm,
    Xb,
    Xm0,
    Xm1,
    Xm2,
    Xm3,
    Xb0,
    Xb1,
    Xb2,
    Xb3,
}

impl Special {
    /// The 3-bit register encoding used wherever this special register can
    /// be placed in an instruction word.
    pub fn encoding(self) -> u8 {
        match self {
            Special::Sp => 2,
            Special::Bp => 3,
            Special::Xm | Special::Xm0 => 0,
            Special::Xb | Special::Xm1 => 1,
            Special::Xm2 => 2,
            Special::Xm3 => 3,
            Special::Xb0 => 4,
            Special::Xb1 => 5,
            Special::Xb2 => 6,
            Special::Xb3 => 7,
        }
    }

    pub fn is_sp(self) -> bool {
        matches!(self, Special::Sp)
    }

    pub fn is_xm_or_xb(self) -> bool {
        matches!(self, Special::Xm | Special::Xb)
    }

    pub fn is_xm_or_xb_part(self) -> bool {
        matches!(
            self,
            Special::Xm0
                | Special::Xm1
                | Special::Xm2
                | Special::Xm3
                | Special::Xb0
                | Special::Xb1
                | Special::Xb2
                | Special::Xb3
        )
    }
}

/// A decoded addressing-mode operand: a register, pointer or immediate
/// form, expressed the same way it ends up in an instruction word's `adr`
/// field (register forms `0x30..=0x3F`, immediate/memory forms
/// `0x20`/`0x24`/`0x28`/`0x2C`).
#[derive(Debug, Clone, Copy)]
pub struct Mode {
    pub adr: u8,
    pub imm: Option<Imm>,
}

/// One decoded operand: either an addressing-mode [`Mode`], or a special
/// register nameable only by keyword (`sp`, `xm`, `xh`, and their halves).
#[derive(Debug, Clone, Copy)]
pub enum Operand {
    Special(Special),
    Mode(Mode),
}

impl Operand {
    pub fn as_mode(&self) -> Option<&Mode> {
        match self {
            Operand::Mode(m) => Some(m),
            Operand::Special(_) => None,
        }
    }

    /// The 3-bit encoding of this operand if it names a plain register
    /// (`a`..`d`, `x0`..`x3`); `None` for special registers and addressing
    /// modes that are not a bare register.
    pub fn register_encoding(&self) -> Option<u8> {
        match self {
            Operand::Mode(Mode { adr, .. }) if (adr & 0x38) == 0x30 => Some(adr & 0x7),
            _ => None,
        }
    }
}

/// A fully decoded instruction: its kind, whether a `c:` carry target was
/// requested, its (up to two) operands, and (for function-call forms) its
/// parameter list.
#[derive(Debug)]
pub struct Instruction {
    pub kind: Kind,
    pub carry: bool,
    pub operands: Vec<Operand>,
    pub params: Vec<Mode>,
}

type Mnemonic = (&'static [u8], Kind, bool);

const MNEMONICS: &[Mnemonic] = &[
    (b"add", Kind::Regular { mask: 0x0800, allow_carry: true }, false),
    (b"adc", Kind::Regular { mask: 0x1800, allow_carry: true }, false),
    (b"and", Kind::Regular { mask: 0x8800, allow_carry: false }, false),
    (b"asr", Kind::Regular { mask: 0x3000, allow_carry: true }, false),
    (b"btc", Kind::RegularBit { mask: 0xA000 }, false),
    (b"bts", Kind::RegularBit { mask: 0xA800 }, false),
    (b"div", Kind::Regular { mask: 0x1400, allow_carry: true }, false),
    (b"jfr", Kind::Jfr, false),
    (b"jfa", Kind::Jfa, false),
    (b"jmr", Kind::Jmr, false),
    (b"jma", Kind::Jma, false),
    (b"jms", Kind::Jms, false),
    (b"jnz", Kind::Jnz, false),
    (b"jsv", Kind::Jsv, false),
    (b"mac", Kind::Regular { mask: 0x3400, allow_carry: true }, false),
    (b"mov", Kind::Mov, false),
    (b"mul", Kind::Regular { mask: 0x2400, allow_carry: true }, false),
    (b"neg", Kind::Regular { mask: 0x6000, allow_carry: false }, false),
    (b"nop", Kind::Nop, false),
    (b"not", Kind::Regular { mask: 0x2000, allow_carry: false }, false),
    (b"or", Kind::Regular { mask: 0x1000, allow_carry: false }, false),
    (b"pop", Kind::Pop, false),
    (b"psh", Kind::Psh, false),
    (b"rfn", Kind::Rfn, false),
    (b"sbc", Kind::Regular { mask: 0x1C00, allow_carry: true }, false),
    (b"shl", Kind::Regular { mask: 0x2C00, allow_carry: true }, false),
    (b"shr", Kind::Regular { mask: 0x2800, allow_carry: true }, false),
    (b"slc", Kind::Regular { mask: 0x3C00, allow_carry: true }, false),
    (b"src", Kind::Regular { mask: 0x3800, allow_carry: true }, false),
    (b"sub", Kind::Regular { mask: 0x0C00, allow_carry: true }, false),
    (b"xbc", Kind::RegularBit { mask: 0xA400 }, false),
    (b"xbs", Kind::RegularBit { mask: 0xAC00 }, false),
    (b"xch", Kind::RegularSymmetric { mask: 0x0400 }, false),
    (b"xeq", Kind::Xeq, false),
    (b"xne", Kind::Xne, false),
    (b"xor", Kind::Regular { mask: 0x5000, allow_carry: false }, false),
    (b"xsg", Kind::Regular { mask: 0xB400, allow_carry: false }, false),
    (b"xsl", Kind::Regular { mask: 0xB400, allow_carry: false }, true),
    (b"xug", Kind::Xug, false),
    (b"xul", Kind::Xug, true),
];

fn keyword_at(s: &[u8], pos: usize, word: &[u8]) -> bool {
    s.len() >= pos + word.len()
        && &s[pos..pos + word.len()] == word
        && !strpr::is_symbol_char(*s.get(pos + word.len()).unwrap_or(&0))
}

fn decode_rp(s: &[u8], pos: usize) -> Option<(usize, u8)> {
    let beg = strpr::skip_whitespace(s, pos);
    if s.get(beg) != Some(&b'x') {
        return None;
    }
    let digit = *s.get(beg + 1)?;
    if !(b'0'..=b'3').contains(&digit) || strpr::is_symbol_char(*s.get(beg + 2).unwrap_or(&0)) {
        return None;
    }
    Some((strpr::skip_whitespace(s, beg + 2), digit - b'0'))
}

fn decode_rx(s: &[u8], pos: usize) -> Option<(usize, u8)> {
    if let Some((end, enc)) = decode_rp(s, pos) {
        return Some((end, enc + 4));
    }
    let beg = strpr::skip_whitespace(s, pos);
    let c = *s.get(beg)?;
    if (b'a'..=b'd').contains(&c) && !strpr::is_symbol_char(*s.get(beg + 1).unwrap_or(&0)) {
        return Some((strpr::skip_whitespace(s, beg + 1), c - b'a'));
    }
    None
}

fn decode_bp(s: &[u8], pos: usize) -> Option<usize> {
    let beg = strpr::skip_whitespace(s, pos);
    if s.get(beg) == Some(&b'b') && s.get(beg + 1) == Some(&b'p') {
        let after = strpr::skip_whitespace(s, beg + 2);
        if s.get(after) == Some(&b'+') {
            return Some(strpr::skip_whitespace(s, after + 1));
        }
        return None;
    }
    if s.get(beg) == Some(&b'$') {
        return Some(strpr::skip_whitespace(s, beg + 1));
    }
    None
}

fn decode_sp(s: &[u8], pos: usize) -> Option<usize> {
    let beg = strpr::skip_whitespace(s, pos);
    if s.get(beg) == Some(&b's')
        && s.get(beg + 1) == Some(&b'p')
        && !strpr::is_symbol_char(*s.get(beg + 2).unwrap_or(&0))
    {
        return Some(strpr::skip_whitespace(s, beg + 2));
    }
    None
}

fn decode_xm(s: &[u8], pos: usize) -> Option<(usize, Special)> {
    let beg = strpr::skip_whitespace(s, pos);
    if s.get(beg) != Some(&b'x') {
        return None;
    }
    let special = match s.get(beg + 1) {
        Some(&b'm') => Special::Xm,
        Some(&b'h') => Special::Xb,
        _ => return None,
    };
    if strpr::is_symbol_char(*s.get(beg + 2).unwrap_or(&0)) {
        return None;
    }
    Some((strpr::skip_whitespace(s, beg + 2), special))
}

fn decode_x4(s: &[u8], pos: usize) -> Option<(usize, Special)> {
    let beg = strpr::skip_whitespace(s, pos);
    if s.get(beg) != Some(&b'x') {
        return None;
    }
    let is_xb = match s.get(beg + 1) {
        Some(&b'm') => false,
        Some(&b'h') => true,
        _ => return None,
    };
    let digit = *s.get(beg + 2)?;
    if !(b'0'..=b'3').contains(&digit) || strpr::is_symbol_char(*s.get(beg + 3).unwrap_or(&0)) {
        return None;
    }
    let special = match (is_xb, digit - b'0') {
        (false, 0) => Special::Xm0,
        (false, 1) => Special::Xm1,
        (false, 2) => Special::Xm2,
        (false, 3) => Special::Xm3,
        (true, 0) => Special::Xb0,
        (true, 1) => Special::Xb1,
        (true, 2) => Special::Xb2,
        (true, 3) => Special::Xb3,
        _ => unreachable!(),
    };
    Some((strpr::skip_whitespace(s, beg + 3), special))
}

fn decode_addrimm(
    src: &[u8],
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
) -> Result<(usize, Imm), ()> {
    let parsed = litpr::parse(src, table, cursor, faults).ok_or(())?;
    if parsed.is_string {
        faults.report_at(Severity::Fail, "Invalid literal in addressing mode", cursor);
        return Err(());
    }
    let imm = match parsed.literal {
        Some(Literal::Value(v)) => Imm::Value(v & 0xFFFF),
        Some(Literal::Symbol(id)) => Imm::Symbol(id),
        None => unreachable!("a non-string literal always carries a value"),
    };
    Ok((parsed.consumed, imm))
}

fn finish_nonbracket(
    s: &[u8],
    end: usize,
    mode: Mode,
    col0: u32,
    cursor: &mut Cursor,
    faults: &mut Faults,
) -> Result<(usize, Mode), ()> {
    if s.get(end) == Some(&b']') {
        cursor.set_column(col0 + end as u32);
        faults.report_at(Severity::Fail, "Invalid ']' in addressing mode", cursor);
        return Err(());
    }
    Ok((end, mode))
}

fn finish_bracket(
    s: &[u8],
    end: usize,
    mode: Mode,
    col0: u32,
    cursor: &mut Cursor,
    faults: &mut Faults,
) -> Result<(usize, Mode), ()> {
    if s.get(end) != Some(&b']') {
        cursor.set_column(col0 + end as u32);
        faults.report_at(Severity::Fail, "Excepted ']' in addressing mode", cursor);
        return Err(());
    }
    Ok((strpr::skip_whitespace(s, end + 1), mode))
}

fn decode_addr(
    s: &[u8],
    pos: usize,
    col0: u32,
    cursor: &mut Cursor,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<(usize, Mode), ()> {
    let beg = strpr::skip_whitespace(s, pos);

    if s.get(beg) != Some(&b'[') {
        if let Some((next, enc)) = decode_rx(s, beg) {
            return finish_nonbracket(s, next, Mode { adr: 0x30 | enc, imm: None }, col0, cursor, faults);
        }
        let (adr_base, imm_pos) = match decode_bp(s, beg) {
            Some(next) => (0x24u8, next),
            None => (0x20u8, beg),
        };
        cursor.set_column(col0 + imm_pos as u32);
        let (consumed, imm) = decode_addrimm(&s[imm_pos..], table, cursor, faults)?;
        let end = strpr::skip_whitespace(s, imm_pos + consumed);
        return finish_nonbracket(s, end, Mode { adr: adr_base, imm: Some(imm) }, col0, cursor, faults);
    }

    let inner = beg + 1;
    if let Some(after_bp) = decode_bp(s, inner) {
        if let Some((next, enc)) = decode_rp(s, after_bp) {
            return finish_bracket(s, next, Mode { adr: 0x3C | enc, imm: None }, col0, cursor, faults);
        }
        cursor.set_column(col0 + after_bp as u32);
        let (consumed, imm) = decode_addrimm(&s[after_bp..], table, cursor, faults)?;
        let end = strpr::skip_whitespace(s, after_bp + consumed);
        return finish_bracket(s, end, Mode { adr: 0x2C, imm: Some(imm) }, col0, cursor, faults);
    }
    if let Some((next, enc)) = decode_rp(s, inner) {
        return finish_bracket(s, next, Mode { adr: 0x38 | enc, imm: None }, col0, cursor, faults);
    }
    cursor.set_column(col0 + inner as u32);
    let (consumed, imm) = decode_addrimm(&s[inner..], table, cursor, faults)?;
    let end = strpr::skip_whitespace(s, inner + consumed);
    finish_bracket(s, end, Mode { adr: 0x28, imm: Some(imm) }, col0, cursor, faults)
}

fn decode_addrx(
    s: &[u8],
    pos: usize,
    col0: u32,
    cursor: &mut Cursor,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<(usize, Operand), ()> {
    let beg = strpr::skip_whitespace(s, pos);
    if let Some((next, special)) = decode_xm(s, beg) {
        return Ok((next, Operand::Special(special)));
    }
    if let Some((next, special)) = decode_x4(s, beg) {
        return Ok((next, Operand::Special(special)));
    }
    if let Some(next) = decode_sp(s, beg) {
        return Ok((next, Operand::Special(Special::Sp)));
    }
    let (end, mode) = decode_addr(s, beg, col0, cursor, table, faults)?;
    Ok((end, Operand::Mode(mode)))
}

fn decode_oplist(
    s: &[u8],
    pos: usize,
    col0: u32,
    cursor: &mut Cursor,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<(Vec<Operand>, Vec<Mode>), ()> {
    let mut pos = strpr::skip_whitespace(s, pos);
    let mut operands = Vec::new();

    if !strpr::is_line_end(*s.get(pos).unwrap_or(&0)) && s.get(pos) != Some(&b'{') {
        loop {
            let (next, operand) = decode_addrx(s, pos, col0, cursor, table, faults)?;
            operands.push(operand);
            pos = next;
            if strpr::is_line_end(*s.get(pos).unwrap_or(&0)) || s.get(pos) == Some(&b'{') {
                break;
            }
            if s.get(pos) != Some(&b',') {
                cursor.set_column(col0 + pos as u32);
                faults.report_at(Severity::Fail, "Excepted ','", cursor);
                return Err(());
            }
            if operands.len() >= 2 {
                cursor.set_column(col0 + pos as u32);
                faults.report_at(Severity::Fail, "Too many operands", cursor);
                return Err(());
            }
            pos = strpr::skip_whitespace(s, pos + 1);
        }
    }

    let mut params = Vec::new();
    if s.get(pos) == Some(&b'{') {
        pos = strpr::skip_whitespace(s, pos + 1);
        if s.get(pos) != Some(&b'}') {
            loop {
                let (next, mode) = decode_addr(s, pos, col0, cursor, table, faults)?;
                params.push(mode);
                pos = next;
                if s.get(pos) == Some(&b'}') {
                    break;
                }
                if s.get(pos) != Some(&b',') {
                    cursor.set_column(col0 + pos as u32);
                    faults.report_at(Severity::Fail, "Excepted ','", cursor);
                    return Err(());
                }
                if params.len() >= 16 {
                    cursor.set_column(col0 + pos as u32);
                    faults.report_at(Severity::Fail, "Too many parameters", cursor);
                    return Err(());
                }
                pos = strpr::skip_whitespace(s, pos + 1);
            }
        }
        pos = strpr::skip_whitespace(s, pos + 1);
    }

    if !strpr::is_line_end(*s.get(pos).unwrap_or(&0)) {
        cursor.set_column(col0 + pos as u32);
        faults.report_at(Severity::Fail, "Excess content in instruction", cursor);
        return Err(());
    }

    Ok((operands, params))
}

/// Attempts to decode an instruction at the cursor's current position.
/// Returns `Ok(None)` for a blank line, `Err(())` once a fault has been
/// reported for malformed syntax.
pub fn decode_instruction(
    cursor: &mut Cursor,
    sections: &SectionStore,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<Option<Instruction>, ()> {
    if sections.current() != SectionId::Code {
        faults.report_at(Severity::Fail, "Probable code in non code section", cursor);
        return Err(());
    }

    let col0 = cursor.column();
    let s = cursor.remaining().to_vec();
    let beg = strpr::skip_whitespace(&s, 0);
    if strpr::is_line_end(*s.get(beg).unwrap_or(&0)) {
        return Ok(None);
    }

    let found = MNEMONICS.iter().find(|(name, _, _)| keyword_at(&s, beg, name));
    let (mnemonic_end, kind, swap) = match found {
        Some((name, kind, swap)) => (beg + name.len(), *kind, *swap),
        None => {
            cursor.set_column(col0 + beg as u32);
            faults.report_at(Severity::Fail, "Invalid opcode", cursor);
            return Err(());
        }
    };

    let mut pos = strpr::skip_whitespace(&s, mnemonic_end);
    let mut carry = false;
    if s.get(pos) == Some(&b'c') {
        let after_c = strpr::skip_whitespace(&s, pos + 1);
        if s.get(after_c) == Some(&b':') {
            carry = true;
            pos = strpr::skip_whitespace(&s, after_c + 1);
        }
    }

    let (mut operands, params) = decode_oplist(&s, pos, col0, cursor, table, faults)?;
    if swap && operands.len() == 2 {
        operands.swap(0, 1);
    }

    Ok(Some(Instruction { kind, carry, operands, params }))
}
