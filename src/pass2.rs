//! Pass-2 driver: autofills header/descriptor defaults, computes final
//! section sizes and bases, plants the section-base symbols, and resolves
//! the whole symbol table.

use crate::fault::{Faults, Position, Severity};
use crate::section::{SectionId, SectionStore};
use crate::symtab::SymbolTable;

/// Packed two-ASCII-byte words of the fixed HEAD template
/// (`"RPA\n"`, then the `"\n<Field>: "` labels).
const HEAD_ADAT: [u16; 32] = [
    ((b'R' as u16) << 8) | (b'P' as u16),
    ((b'A' as u16) << 8) | (b'\n' as u16),
    ((b'\n' as u16) << 8) | (b'A' as u16),
    ((b'p' as u16) << 8) | (b'p' as u16),
    ((b'A' as u16) << 8) | (b'u' as u16),
    ((b't' as u16) << 8) | (b'h' as u16),
    ((b':' as u16) << 8) | (b' ' as u16),
    ((b'\n' as u16) << 8) | (b'A' as u16),
    ((b'p' as u16) << 8) | (b'p' as u16),
    ((b'N' as u16) << 8) | (b'a' as u16),
    ((b'm' as u16) << 8) | (b'e' as u16),
    ((b':' as u16) << 8) | (b' ' as u16),
    ((b'\n' as u16) << 8) | (b'V' as u16),
    ((b'e' as u16) << 8) | (b'r' as u16),
    ((b's' as u16) << 8) | (b'i' as u16),
    ((b'o' as u16) << 8) | (b'n' as u16),
    ((b':' as u16) << 8) | (b' ' as u16),
    ((b'\n' as u16) << 8) | (b'E' as u16),
    ((b'n' as u16) << 8) | (b'g' as u16),
    ((b'S' as u16) << 8) | (b'p' as u16),
    ((b'e' as u16) << 8) | (b'c' as u16),
    ((b':' as u16) << 8) | (b' ' as u16),
    ((b'\n' as u16) << 8) | (b'D' as u16),
    ((b'e' as u16) << 8) | (b's' as u16),
    ((b'c' as u16) << 8) | (b'O' as u16),
    ((b'f' as u16) << 8) | (b'f' as u16),
    ((b':' as u16) << 8) | (b' ' as u16),
    ((b'\n' as u16) << 8) | (b'L' as u16),
    ((b'i' as u16) << 8) | (b'c' as u16),
    ((b'e' as u16) << 8) | (b'n' as u16),
    ((b's' as u16) << 8) | (b'e' as u16),
    ((b':' as u16) << 8) | (b' ' as u16),
];

/// Word offsets the entries of [`HEAD_ADAT`] belong at.
const HEAD_AOFF: [usize; 32] = [
    0x00, 0x01, // RPA\n
    0x02, 0x03, 0x04, 0x05, 0x06, // \nAppAuth:
    0x0F, 0x10, 0x11, 0x12, 0x13, // \nAppName:
    0x25, 0x26, 0x27, 0x28, 0x29, // \nVersion:
    0x2F, 0x30, 0x31, 0x32, 0x33, // \nEngSpec:
    0x39, 0x3A, 0x3B, 0x3C, 0x3D, // \nDescOff:
    0x40, 0x41, 0x42, 0x43, 0x44, // \nLicense:
];

/// CPU RAM budget shared between DATA and ZERO.
const MAXRAM: usize = 0x10000 - 0x800 - 0x40;

fn hex_digit(num: usize, dig: u32) -> u16 {
    let n = (num >> (dig * 4)) & 0xF;
    if n < 10 {
        (n as u16) + u16::from(b'0')
    } else {
        (n as u16) + u16::from(b'A') - 10
    }
}

/// Runs pass 2: header/descriptor autofill, section size/base computation,
/// base-symbol planting, and final symbol resolution.
pub fn run(sections: &mut SectionStore, table: &mut SymbolTable, faults: &mut Faults) -> Result<(), ()> {
    sections.select(SectionId::Head);
    for (value, off) in HEAD_ADAT.iter().zip(HEAD_AOFF.iter()) {
        sections.force_set_word(SectionId::Head, *off, *value);
    }
    for off in 0..64 {
        sections.string_pad(SectionId::Head, off);
    }
    if sections.size(SectionId::Head) == 0x45 {
        sections.set_offset_words(0x45);
        if sections.push_word((u16::from(b'\n') << 8) | 0x00).is_err() {
            faults.report(Severity::Fail, "Unable to autofill header", Position::none());
            return Err(());
        }
    }

    sections.select(SectionId::Desc);
    let desc_size_before_fill = sections.size(SectionId::Desc);
    if desc_size_before_fill < 0x09 {
        sections.force_set_word(SectionId::Desc, 0x08, 0x0000); // separate 32 KiW stack
    }
    if desc_size_before_fill < 0x0B {
        sections.force_set_word(SectionId::Desc, 0x0A, 0x0000); // no input controllers
    }
    if desc_size_before_fill < 0x0C {
        sections.force_set_word(SectionId::Desc, 0x0B, 0xCC00); // minimal A/V, multi-streaming
    }

    let size_code = sections.size(SectionId::Code);
    let size_data = sections.size(SectionId::Data);
    let size_head = sections.size(SectionId::Head);
    let size_desc = sections.size(SectionId::Desc);
    let size_zero = sections.size(SectionId::Zero);
    let size_file = sections.size(SectionId::File);

    let base_code = 0usize;
    let base_data = 0x40usize;
    let base_head = 0usize;
    let base_desc = 0usize;
    let base_zero = 0x40 + size_data;
    let base_file = size_head + size_desc + size_code + size_data;

    for (id, base) in [
        (SectionId::Code, base_code),
        (SectionId::Data, base_data),
        (SectionId::Head, base_head),
        (SectionId::Desc, base_desc),
        (SectionId::Zero, base_zero),
        (SectionId::File, base_file),
    ] {
        sections.set_base(id, base);
        let def = table.add_value(base as u32, Position::none());
        table.bind(id.base_symbol(), def, &Position::none(), faults)?;
        log::debug!("pass2: section {} base=0x{:04X}", id, base);
    }

    if size_data + size_zero > MAXRAM {
        faults.report(
            Severity::Fail,
            format!("CPU RAM limit (0x{:04X} words) overran", MAXRAM),
            Position::none(),
        );
        return Err(());
    }
    if size_head + size_desc > 0x10000 {
        faults.report(
            Severity::Fail,
            format!("Application Header too large (0x{:04X} words)", size_head),
            Position::none(),
        );
        return Err(());
    }

    sections.select(SectionId::Head);
    sections.force_set_word(SectionId::Head, 0x3E, (hex_digit(size_head, 3) << 8) | hex_digit(size_head, 2));
    sections.force_set_word(SectionId::Head, 0x3F, (hex_digit(size_head, 1) << 8) | hex_digit(size_head, 0));

    sections.select(SectionId::Desc);
    let total = base_file + size_file;
    sections.force_set_word(SectionId::Desc, 0x00, (total >> 16) as u16);
    sections.force_set_word(SectionId::Desc, 0x01, (total & 0xFFFF) as u16);
    let code_off = size_head + size_desc;
    sections.force_set_word(SectionId::Desc, 0x02, (code_off >> 16) as u16);
    sections.force_set_word(SectionId::Desc, 0x03, (code_off & 0xFFFF) as u16);
    let data_off = size_head + size_desc + size_code;
    sections.force_set_word(SectionId::Desc, 0x04, (data_off >> 16) as u16);
    sections.force_set_word(SectionId::Desc, 0x05, (data_off & 0xFFFF) as u16);
    sections.force_set_word(SectionId::Desc, 0x06, (size_code & 0xFFFF) as u16);
    sections.force_set_word(SectionId::Desc, 0x07, (size_data & 0xFFFF) as u16);

    table.resolve_all(sections, faults)?;

    log::debug!(
        "pass2: sizes code={} data={} head={} desc={} zero={} file={}",
        size_code,
        size_data,
        size_head,
        size_desc,
        size_zero,
        size_file
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_template_is_space_padded_and_resolves() {
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        sections.push_word(0xC000).unwrap();

        run(&mut sections, &mut table, &mut faults).unwrap();
        assert!(!faults.failed());
        assert_eq!(sections.data(SectionId::Head)[0], ((b'R' as u16) << 8) | b'P' as u16);
        assert_eq!(sections.data(SectionId::Head)[1], ((b'A' as u16) << 8) | b'\n' as u16);
        // Untouched header bytes are space-padded.
        assert_eq!(sections.data(SectionId::Head)[0x08], 0x2020);
    }

    #[test]
    fn data_base_follows_the_fixed_0x40_offset() {
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Data);
        sections.push_word(0).unwrap();
        sections.push_word(0).unwrap();

        run(&mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(sections.base(SectionId::Data), 0x40);
        assert_eq!(sections.base(SectionId::Zero), 0x40 + 2);
    }

    #[test]
    fn descriptor_carries_code_and_data_word_counts() {
        let mut sections = SectionStore::new();
        let mut table = SymbolTable::new();
        let mut faults = Faults::new();
        sections.select(SectionId::Code);
        sections.push_word(0xC000).unwrap();
        sections.push_word(0xC000).unwrap();
        sections.select(SectionId::Data);
        sections.push_word(0).unwrap();

        run(&mut sections, &mut table, &mut faults).unwrap();
        assert_eq!(sections.data(SectionId::Desc)[0x06], 2);
        assert_eq!(sections.data(SectionId::Desc)[0x07], 1);
    }
}
