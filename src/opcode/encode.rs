//! Instruction encoding: turns a decoded [`super::decode::Instruction`]
//! into instruction words pushed onto the code section, deferring any
//! operand that names an unresolved symbol to [`crate::symtab`].

use super::decode::{Imm, Instruction, Kind, Mode, Operand, Special};
use super::tables;
use crate::compst::Cursor;
use crate::fault::{Faults, Position, Severity};
use crate::section::{SectionId, SectionStore};
use crate::symtab::SymbolTable;
use crate::valwr::{self, Shape};

fn push_word(sections: &mut SectionStore, cursor: &Cursor, faults: &mut Faults, value: u16) -> Result<(), ()> {
    if sections.push_word(value).is_err() {
        faults.report_at(Severity::Fail, "No space for opcode", cursor);
        return Err(());
    }
    Ok(())
}

fn require_no_params(instr: &Instruction, cursor: &Cursor, faults: &mut Faults) -> Result<(), ()> {
    if instr.params.is_empty() {
        Ok(())
    } else {
        faults.report_at(Severity::Fail, "Instruction is not a function call", cursor);
        Err(())
    }
}

fn require_operand_count(instr: &Instruction, n: usize, cursor: &Cursor, faults: &mut Faults) -> Result<(), ()> {
    if instr.operands.len() == n {
        Ok(())
    } else {
        faults.report_at(Severity::Fail, "Wrong number of operands", cursor);
        Err(())
    }
}

fn require_no_carry(instr: &Instruction, cursor: &Cursor, faults: &mut Faults) -> Result<(), ()> {
    if instr.carry {
        faults.report_at(Severity::Fail, "Instruction can not produce carry", cursor);
        Err(())
    } else {
        Ok(())
    }
}

/// Writes the addressing-mode operand just reserved by the most recently
/// pushed opcode word: patches its `adr` bits in place for short forms,
/// otherwise appends a placeholder word and defers or writes the value into
/// it.
fn write_addr(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    mode: &Mode,
    shape: Shape,
    position: &Position,
) -> Result<(), ()> {
    let off = sections.offset_words() - 1;
    let adr = mode.adr;

    if (adr == 0x20 || adr == 0x2C) && !matches!(shape, Shape::R16) {
        if let Some(Imm::Value(v)) = mode.imm {
            if v < 0x10 {
                let short = (if adr == 0x20 { 0x00u16 } else { 0x10u16 }) | (v as u16 & 0xF);
                sections.set_word(SectionId::Code, off, short);
                return Ok(());
            }
        }
    }

    if (adr & 0x30) != 0x20 {
        sections.set_word(SectionId::Code, off, adr as u16);
        return Ok(());
    }

    sections.set_word(SectionId::Code, off, adr as u16);
    push_word(sections, cursor, faults, 0xC000)?;
    match mode.imm {
        Some(Imm::Symbol(def)) => {
            table.add_use(def, SectionId::Code, off, shape, position.clone());
        }
        Some(Imm::Value(v)) => {
            valwr::write(sections, SectionId::Code, v, off, shape, position, faults)?;
        }
        None => unreachable!("long-immediate address mode always carries a value"),
    }
    Ok(())
}

fn encode_two_operands(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    operands: &[Operand],
    allow_swap: bool,
) -> Result<(), ()> {
    if operands.len() != 2 {
        faults.report_at(Severity::Fail, "Instruction requires 2 operands", cursor);
        return Err(());
    }
    let off = sections.offset_words() - 1;

    let (reg_operand, addr_operand) = if operands[1].register_encoding().is_some() {
        (&operands[1], &operands[0])
    } else {
        if allow_swap {
            sections.set_word(SectionId::Code, off, 0x0200);
        }
        if operands[0].register_encoding().is_none() {
            faults.report_at(Severity::Fail, "One of the operands must be register", cursor);
            return Err(());
        }
        (&operands[0], &operands[1])
    };

    let reg_enc = reg_operand.register_encoding().unwrap();
    sections.set_word(SectionId::Code, off, (reg_enc as u16) << 6);

    let mode = match addr_operand.as_mode() {
        Some(m) => m,
        None => {
            faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
            return Err(());
        }
    };
    write_addr(sections, table, cursor, faults, mode, Shape::A16, position)
}

fn encode_regular(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
    mask: u16,
    allow_carry: bool,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    if !allow_carry {
        require_no_carry(instr, cursor, faults)?;
    }
    push_word(sections, cursor, faults, mask)?;
    if instr.carry {
        let off = sections.offset_words() - 1;
        sections.set_word(SectionId::Code, off, 0x4000);
    }
    encode_two_operands(sections, table, cursor, faults, position, &instr.operands, true)
}

fn encode_regular_symmetric(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
    mask: u16,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;
    push_word(sections, cursor, faults, mask)?;
    encode_two_operands(sections, table, cursor, faults, position, &instr.operands, false)
}

fn encode_regular_bit(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
    mask: u16,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_operand_count(instr, 2, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    push_word(sections, cursor, faults, mask)?;
    let off = sections.offset_words() - 1;

    match &instr.operands[1] {
        Operand::Mode(Mode { imm: Some(Imm::Symbol(def)), .. }) => {
            table.add_use(*def, SectionId::Code, off, Shape::B4, position.clone());
        }
        Operand::Mode(Mode { adr: 0x20, imm: Some(Imm::Value(v)) }) => {
            valwr::write(sections, SectionId::Code, *v, off, Shape::B4, position, faults)?;
        }
        _ => {
            faults.report_at(Severity::Fail, "Invalid operand for bit select", cursor);
            return Err(());
        }
    }

    let mode = match instr.operands[0].as_mode() {
        Some(m) => m,
        None => {
            faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
            return Err(());
        }
    };
    write_addr(sections, table, cursor, faults, mode, Shape::A16, position)
}

fn encode_nop(sections: &mut SectionStore, cursor: &Cursor, faults: &mut Faults, instr: &Instruction) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_operand_count(instr, 0, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;
    push_word(sections, cursor, faults, 0xC000)
}

fn encode_mov(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_operand_count(instr, 2, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    push_word(sections, cursor, faults, 0x0000)?;
    let off = sections.offset_words() - 1;

    let adr_is_special = matches!(instr.operands[0], Operand::Special(_));
    let reg_is_special = matches!(instr.operands[1], Operand::Special(_));
    let reg_is_register = instr.operands[1].register_encoding().is_some();

    let (reg, adr) = if adr_is_special || (!reg_is_special && !reg_is_register) {
        sections.set_word(SectionId::Code, off, 0x0200);
        (&instr.operands[0], &instr.operands[1])
    } else {
        if let Operand::Mode(Mode { adr: a, .. }) = &instr.operands[0] {
            if (a & 0x38) == 0x20 {
                faults.report_at(Severity::Fail, "Immediate as target in MOV is not supported", cursor);
                return Err(());
            }
        }
        (&instr.operands[1], &instr.operands[0])
    };

    if matches!(adr, Operand::Special(_)) {
        faults.report_at(Severity::Fail, "Both operands can not be special registers", cursor);
        return Err(());
    }
    if !matches!(reg, Operand::Special(_)) && reg.register_encoding().is_none() {
        faults.report_at(Severity::Fail, "One of the operands must be register", cursor);
        return Err(());
    }
    let adr_mode = adr.as_mode().expect("validated to be an addressing-mode operand above");

    if let Some(enc) = reg.register_encoding() {
        if let Mode { adr: a, imm: Some(Imm::Value(v)) } = adr_mode {
            if (*a & 0x38) == 0x20 {
                let v16 = *v as u16;
                if *v >= 0xFFF0 {
                    sections.set_word(SectionId::Code, off, 0x2000 | ((enc as u16) << 6) | !v16);
                    return Ok(());
                }
                for (i, &entry) in tables::MOV_TB0.iter().enumerate() {
                    if entry == v16 {
                        sections.set_word(SectionId::Code, off, 0x0600 | ((enc as u16) << 6) | i as u16);
                        return Ok(());
                    }
                }
                for (i, &entry) in tables::MOV_TB1.iter().enumerate() {
                    if entry == v16 {
                        sections.set_word(SectionId::Code, off, 0x4600 | ((enc as u16) << 6) | i as u16);
                        return Ok(());
                    }
                }
                for (i, &entry) in tables::MOV_TB2.iter().enumerate() {
                    if entry == v16 {
                        sections.set_word(SectionId::Code, off, 0x8600 | ((enc as u16) << 6) | i as u16);
                        return Ok(());
                    }
                }
            }
        }

        sections.set_word(SectionId::Code, off, (enc as u16) << 6);
        return write_addr(sections, table, cursor, faults, adr_mode, Shape::A16, position);
    }

    let special = match reg {
        Operand::Special(s) => *s,
        Operand::Mode(_) => unreachable!("validated to be a register or special above"),
    };

    if special.is_sp() {
        if let Mode { adr: a, imm: Some(Imm::Value(v)) } = adr_mode {
            if (*a & 0x38) == 0x20 && *v < 128 {
                sections.set_word(SectionId::Code, off, 0x8380 | (*v as u16));
                return Ok(());
            }
        }
    }

    if special.is_sp() || special.is_xm_or_xb() {
        sections.set_word(SectionId::Code, off, 0x8000 | ((special.encoding() as u16) << 6));
        return write_addr(sections, table, cursor, faults, adr_mode, Shape::A16, position);
    }

    if special.is_xm_or_xb_part() {
        sections.set_word(SectionId::Code, off, 0x4000 | ((special.encoding() as u16) << 6));
        return write_addr(sections, table, cursor, faults, adr_mode, Shape::A16, position);
    }

    faults.report_at(Severity::Fail, "Invalid MOV", cursor);
    Err(())
}

fn encode_jms(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_operand_count(instr, 1, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    let mode = match &instr.operands[0] {
        Operand::Mode(m) if (m.adr & 0x38) == 0x20 => m,
        _ => {
            faults.report_at(Severity::Fail, "Operand must be immediate", cursor);
            return Err(());
        }
    };

    push_word(sections, cursor, faults, 0x8C00)?;
    let off = sections.offset_words() - 1;
    match mode.imm {
        Some(Imm::Symbol(def)) => table.add_use(def, SectionId::Code, off, Shape::R10, position.clone()),
        Some(Imm::Value(v)) => valwr::write(sections, SectionId::Code, v, off, Shape::R10, position, faults)?,
        None => unreachable!("immediate address mode always carries a value"),
    }
    Ok(())
}

fn encode_jnz(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_operand_count(instr, 2, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    let reg_enc = match instr.operands[0].register_encoding() {
        Some(enc) => enc,
        None => {
            faults.report_at(Severity::Fail, "First operand must be register", cursor);
            return Err(());
        }
    };
    let mode = match &instr.operands[1] {
        Operand::Mode(m) if (m.adr & 0x38) == 0x20 => m,
        _ => {
            faults.report_at(Severity::Fail, "Second operand must be immediate", cursor);
            return Err(());
        }
    };

    push_word(sections, cursor, faults, 0x8800 | ((reg_enc as u16) << 6))?;
    let off = sections.offset_words() - 1;
    match mode.imm {
        Some(Imm::Symbol(def)) => table.add_use(def, SectionId::Code, off, Shape::R7, position.clone()),
        Some(Imm::Value(v)) => valwr::write(sections, SectionId::Code, v, off, Shape::R7, position, faults)?,
        None => unreachable!("immediate address mode always carries a value"),
    }
    Ok(())
}

fn encode_jmp(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
    mask: u16,
    shape: Shape,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    if instr.operands.len() == 1 {
        push_word(sections, cursor, faults, mask)?;
        let mode = match instr.operands[0].as_mode() {
            Some(m) => m,
            None => {
                faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
                return Err(());
            }
        };
        return write_addr(sections, table, cursor, faults, mode, shape, position);
    }

    require_operand_count(instr, 2, cursor, faults)?;
    let rt = match &instr.operands[0] {
        Operand::Mode(Mode { adr, .. }) if matches!(adr & 0x3F, 0x31 | 0x32 | 0x33) => adr & 0x3,
        _ => {
            faults.report_at(Severity::Fail, "Target must be B, C or D", cursor);
            return Err(());
        }
    };
    push_word(sections, cursor, faults, mask | ((rt as u16) << 6))?;
    let mode = match instr.operands[1].as_mode() {
        Some(m) => m,
        None => {
            faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
            return Err(());
        }
    };
    write_addr(sections, table, cursor, faults, mode, shape, position)
}

fn encode_fnpar(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    params: &[Mode],
) -> Result<(), ()> {
    for param in params {
        push_word(sections, cursor, faults, 0xC000)?;
        let off = sections.offset_words() - 1;

        let compact_value = if (param.adr & 0x38) == 0x20 {
            match param.imm {
                Some(Imm::Value(v)) => Some(v & 0xFFFF),
                _ => None,
            }
        } else {
            None
        };

        let word = compact_value.and_then(|v| {
            if v < 0x1000 {
                Some(0x2000 | ((v & 0x0FC0) << 1) | (v & 0x003F))
            } else if v >= 0xFC00 {
                Some(0x0800 | ((v & 0x03C0) << 1) | (v & 0x003F))
            } else if (v & 0x3F) == 0x3F {
                Some(0x1800 | ((v & 0xF000) >> 5) | ((v & 0x0FC0) >> 6))
            } else if (v & 0x3F) == 0x00 {
                Some(0x1000 | ((v & 0xF000) >> 5) | ((v & 0x0FC0) >> 6))
            } else if (v & 0xFF) == (v >> 8) {
                Some(0x0400 | ((v & 0x00C0) << 1) | (v & 0x003F))
            } else {
                None
            }
        });

        match word {
            Some(w) => sections.set_word(SectionId::Code, off, w as u16),
            None => write_addr(sections, table, cursor, faults, param, Shape::A16, position)?,
        }
    }

    let off = sections.offset_words();
    push_word(sections, cursor, faults, 0xC000)?;
    sections.set_word(SectionId::Code, off, 0x0040);
    Ok(())
}

fn encode_jfn(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
    mask: u16,
    shape: Shape,
) -> Result<(), ()> {
    require_operand_count(instr, 1, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    push_word(sections, cursor, faults, mask)?;
    let mode = match instr.operands[0].as_mode() {
        Some(m) => m,
        None => {
            faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
            return Err(());
        }
    };
    write_addr(sections, table, cursor, faults, mode, shape, position)?;
    encode_fnpar(sections, table, cursor, faults, position, &instr.params)
}

fn encode_jsv(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
) -> Result<(), ()> {
    require_operand_count(instr, 1, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    push_word(sections, cursor, faults, 0x4480)?;
    let off = sections.offset_words() - 1;
    match &instr.operands[0] {
        Operand::Mode(Mode { imm: Some(Imm::Symbol(def)), .. }) => {
            table.add_use(*def, SectionId::Code, off, Shape::S6, position.clone());
        }
        Operand::Mode(Mode { adr: 0x20, imm: Some(Imm::Value(v)) }) => {
            valwr::write(sections, SectionId::Code, *v, off, Shape::S6, position, faults)?;
        }
        _ => {
            faults.report_at(Severity::Fail, "Invalid operand for JSV", cursor);
            return Err(());
        }
    }
    encode_fnpar(sections, table, cursor, faults, position, &instr.params)
}

fn encode_rfn(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;

    if instr.operands.is_empty() {
        return push_word(sections, cursor, faults, 0x45B7);
    }

    require_operand_count(instr, 2, cursor, faults)?;
    match &instr.operands[0] {
        Operand::Mode(Mode { adr: 0x37, .. }) => {}
        _ => {
            faults.report_at(Severity::Fail, "Target must be X3", cursor);
            return Err(());
        }
    }

    push_word(sections, cursor, faults, 0x4580)?;
    let off = sections.offset_words() - 1;
    if instr.carry {
        sections.set_word(SectionId::Code, off, 0x0040);
    }

    let mode = match instr.operands[1].as_mode() {
        Some(m) => m,
        None => {
            faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
            return Err(());
        }
    };
    write_addr(sections, table, cursor, faults, mode, Shape::A16, position)
}

/// Shared encoder for `xeq`/`xne`/`xug` (and their `xsl`/`xul` mirrors via
/// `swap`): a plain two-register form (`mask0`) when neither operand names
/// a special register, or a fixed-form skip against `SP` (`mask1`)
/// otherwise.
fn encode_skip(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
    mask0: u16,
    mask1: u16,
    swap: bool,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_operand_count(instr, 2, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    let reg_special = matches!(instr.operands[1], Operand::Special(_));
    let adr_special = matches!(instr.operands[0], Operand::Special(_));

    if !reg_special && !adr_special {
        push_word(sections, cursor, faults, mask0)?;
        return encode_two_operands(sections, table, cursor, faults, position, &instr.operands, swap);
    }

    push_word(sections, cursor, faults, mask1)?;
    let off = sections.offset_words() - 1;

    let (reg, adr) = if !reg_special {
        if swap {
            sections.set_word(SectionId::Code, off, 0x0200);
        }
        (&instr.operands[0], &instr.operands[1])
    } else {
        (&instr.operands[1], &instr.operands[0])
    };

    if !matches!(reg, Operand::Special(s) if s.is_sp()) {
        faults.report_at(Severity::Fail, "Special register operand must be SP", cursor);
        return Err(());
    }

    let mode = match adr.as_mode() {
        Some(m) => m,
        None => {
            faults.report_at(Severity::Fail, "Invalid operand format in addressing mode", cursor);
            return Err(());
        }
    };
    write_addr(sections, table, cursor, faults, mode, Shape::A16, position)
}

fn encode_pp(
    sections: &mut SectionStore,
    cursor: &Cursor,
    faults: &mut Faults,
    instr: &Instruction,
    mask: u16,
) -> Result<(), ()> {
    require_no_params(instr, cursor, faults)?;
    require_no_carry(instr, cursor, faults)?;

    if instr.operands.is_empty() {
        faults.report_at(Severity::Fail, "Needs at least one register parameter", cursor);
        return Err(());
    }

    let mut reg_bits: u16 = 0;
    for operand in &instr.operands {
        let bit = match operand {
            Operand::Mode(Mode { adr, .. }) if (adr & 0x38) == 0x30 => match adr & 0x7 {
                0 => 0x20,
                1 => 0x10,
                3 => 0x04,
                4 => 0x02,
                5 => 0x01,
                6 => 0x08,
                _ => {
                    faults.report_at(
                        Severity::Fail,
                        "Only registers A, B, D, X0, X1, X2, XM and XB can be used",
                        cursor,
                    );
                    return Err(());
                }
            },
            Operand::Special(Special::Xm) => 0x40,
            Operand::Special(Special::Xb) => 0x80,
            _ => {
                faults.report_at(
                    Severity::Fail,
                    "Only registers A, B, D, X0, X1, X2, XM and XB can be used",
                    cursor,
                );
                return Err(());
            }
        };
        reg_bits |= bit;
    }

    if (reg_bits & 0xC0) != 0 {
        if reg_bits != 0xFF {
            faults.report_at(Severity::Fail, "XM and XB must be used in an all register operation", cursor);
            return Err(());
        }
        reg_bits = 0;
    }

    push_word(sections, cursor, faults, mask | reg_bits)
}

/// Encodes one already-decoded instruction, dispatching on its [`Kind`].
pub fn encode(
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    cursor: &Cursor,
    faults: &mut Faults,
    position: &Position,
    instr: &Instruction,
) -> Result<(), ()> {
    match instr.kind {
        Kind::Regular { mask, allow_carry } => {
            encode_regular(sections, table, cursor, faults, position, instr, mask, allow_carry)
        }
        Kind::RegularBit { mask } => encode_regular_bit(sections, table, cursor, faults, position, instr, mask),
        Kind::RegularSymmetric { mask } => {
            encode_regular_symmetric(sections, table, cursor, faults, position, instr, mask)
        }
        Kind::Nop => encode_nop(sections, cursor, faults, instr),
        Kind::Mov => encode_mov(sections, table, cursor, faults, position, instr),
        Kind::Jms => encode_jms(sections, table, cursor, faults, position, instr),
        Kind::Jmr => encode_jmp(sections, table, cursor, faults, position, instr, 0x8400, Shape::R16),
        Kind::Jma => encode_jmp(sections, table, cursor, faults, position, instr, 0x8500, Shape::A16),
        Kind::Jfr => encode_jfn(sections, table, cursor, faults, position, instr, 0x4400, Shape::R16),
        Kind::Jfa => encode_jfn(sections, table, cursor, faults, position, instr, 0x4500, Shape::A16),
        Kind::Jsv => encode_jsv(sections, table, cursor, faults, position, instr),
        Kind::Rfn => encode_rfn(sections, table, cursor, faults, position, instr),
        Kind::Xeq => encode_skip(sections, table, cursor, faults, position, instr, 0xB800, 0x8140, false),
        Kind::Xne => encode_skip(sections, table, cursor, faults, position, instr, 0xBA00, 0x8340, false),
        Kind::Xug => encode_skip(sections, table, cursor, faults, position, instr, 0xBC00, 0x8100, true),
        Kind::Jnz => encode_jnz(sections, table, cursor, faults, position, instr),
        Kind::Psh => encode_pp(sections, cursor, faults, instr, 0x80C0),
        Kind::Pop => encode_pp(sections, cursor, faults, instr, 0x82C0),
    }
}
