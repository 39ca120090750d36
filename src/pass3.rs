//! Pass-3 driver: concatenates sections into the final binary image.
//!
//! Emission order is `HEAD, DESC, CODE, DATA` (`ZERO` is RAM-only and is
//! never written; it has no backing data buffer to begin with). `FILE`-
//! section bindata blobs are recorded by pass 1 but not yet streamed here —
//! see [`run`].

use crate::fault::{Faults, Position, Severity};
use crate::section::{SectionId, SectionStore};

/// Concatenates the assembled sections into one byte buffer, each word
/// written big-endian.
///
/// Fails with a clear diagnostic if any `bindata` directive targeted the
/// `FILE` section: streaming those blobs into the final image is not
/// implemented yet, and silently dropping them would produce a binary that
/// looks complete but is missing data a `bindata "file"` directive asked
/// for.
pub fn run(sections: &SectionStore, faults: &mut Faults) -> Result<Vec<u8>, ()> {
    if !sections.blobs(SectionId::File).is_empty() {
        faults.report(
            Severity::Fail,
            "bindata directives in the FILE section are not yet supported",
            Position::none(),
        );
        return Err(());
    }

    let mut out = Vec::new();
    for id in [SectionId::Head, SectionId::Desc, SectionId::Code, SectionId::Data] {
        for &word in sections.data(id) {
            out.push((word >> 8) as u8);
            out.push((word & 0xFF) as u8);
        }
    }

    log::debug!("pass3: emitted {} bytes", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_head_desc_code_data_in_order() {
        let mut sections = SectionStore::new();
        sections.select(SectionId::Head);
        sections.push_word(0x5250).unwrap(); // "RP"
        sections.select(SectionId::Desc);
        sections.push_word(0x0001).unwrap();
        sections.select(SectionId::Code);
        sections.push_word(0xC000).unwrap();
        sections.select(SectionId::Data);
        sections.push_word(0x1234).unwrap();

        let mut faults = Faults::new();
        let bytes = run(&sections, &mut faults).unwrap();
        assert_eq!(bytes, vec![0x52, 0x50, 0x00, 0x01, 0xC0, 0x00, 0x12, 0x34]);
    }

    #[test]
    fn zero_section_contributes_nothing() {
        let mut sections = SectionStore::new();
        sections.select(SectionId::Zero);
        sections.push_word(0).unwrap();
        sections.push_word(0).unwrap();

        let mut faults = Faults::new();
        let bytes = run(&sections, &mut faults).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn pending_file_blob_fails_with_a_clear_diagnostic() {
        let mut sections = SectionStore::new();
        sections.select(SectionId::File);
        sections.push_blob("extra.bin".to_string());

        let mut faults = Faults::new();
        assert!(run(&sections, &mut faults).is_err());
        assert!(faults.failed());
    }
}
