//! Instruction parsing and encoding for the code section: the final stage
//! of pass 1's per-line dispatch chain, tried after labels, directives and
//! `bindata` have all declined the line.

mod decode;
mod encode;
mod tables;

pub use decode::{Imm, Instruction, Kind, Mode, Operand, Special};

use crate::compst::Cursor;
use crate::fault::{Faults, Position};
use crate::section::SectionStore;
use crate::symtab::SymbolTable;

/// Outcome of attempting to parse the rest of the line as an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The line was blank; the caller has nothing left to try.
    NotHandled,
    /// Fully decoded and encoded.
    Handled,
}

/// Decodes and encodes one instruction line in the current section.
pub fn process(
    cursor: &mut Cursor,
    sections: &mut SectionStore,
    table: &mut SymbolTable,
    faults: &mut Faults,
) -> Result<Outcome, ()> {
    let instr = match decode::decode_instruction(cursor, sections, table, faults)? {
        Some(instr) => instr,
        None => return Ok(Outcome::NotHandled),
    };
    let position = Position::capture(cursor);
    encode::encode(sections, table, cursor, faults, &position, &instr)?;
    Ok(Outcome::Handled)
}
