//! The compile session: one instance of each subsystem, aggregated into a
//! single value owned by the driver and threaded through the three passes
//! by mutable reference, in place of the source's global `get-object`
//! singletons.

use crate::compst::Cursor;
use crate::error::Error;
use crate::fault::Faults;
use crate::pass1;
use crate::pass2;
use crate::pass3;
use crate::section::SectionStore;
use crate::symtab::SymbolTable;

/// Owns every subsystem needed for one compile session: the cursor, the
/// section store, the symbol table, and the fault log.
pub struct Compile {
    cursor: Cursor,
    sections: SectionStore,
    table: SymbolTable,
    faults: Faults,
}

impl Compile {
    pub fn new() -> Self {
        Compile {
            cursor: Cursor::new(),
            sections: SectionStore::new(),
            table: SymbolTable::new(),
            faults: Faults::new(),
        }
    }

    /// Runs pass 1 against `input_path`: reads the source tree and builds
    /// up the section store and symbol table.
    pub fn pass1(&mut self, input_path: &str) -> Result<(), Error> {
        log::debug!("compile: pass1 starting on {}", input_path);
        let _ = pass1::run(
            input_path,
            &mut self.cursor,
            &mut self.sections,
            &mut self.table,
            &mut self.faults,
        );
        if self.faults.failed() {
            return Err(Error::from_faults(&self.faults));
        }
        Ok(())
    }

    /// Runs pass 2: header/descriptor autofill, section sizing, and symbol
    /// resolution.
    pub fn pass2(&mut self) -> Result<(), Error> {
        log::debug!("compile: pass2 starting");
        if pass2::run(&mut self.sections, &mut self.table, &mut self.faults).is_err() {
            return Err(Error::from_faults(&self.faults));
        }
        Ok(())
    }

    /// Runs pass 3: concatenates the finished sections into a binary image.
    pub fn pass3(&mut self) -> Result<Vec<u8>, Error> {
        log::debug!("compile: pass3 starting");
        match pass3::run(&self.sections, &mut self.faults) {
            Ok(image) => {
                log::debug!("compile: complete, {} bytes", image.len());
                Ok(image)
            }
            Err(()) => Err(Error::from_faults(&self.faults)),
        }
    }

    /// Runs all three passes against `input_path`, returning the finished
    /// binary image on success.
    pub fn run(&mut self, input_path: &str) -> Result<Vec<u8>, Error> {
        self.pass1(input_path)?;
        self.pass2()?;
        self.pass3()
    }
}

impl Default for Compile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(dir: &tempfile::TempDir, src: &str) -> std::path::PathBuf {
        let path = dir.path().join("main.asm");
        std::fs::write(&path, src).unwrap();
        path
    }

    #[test]
    fn end_to_end_nop_program_produces_a_binary_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "section code\nnop\n");
        let mut compile = Compile::new();
        let image = compile.run(path.to_str().unwrap()).unwrap();
        // HEAD begins with the literal bytes "RP".
        assert_eq!(&image[0..2], b"RP");
    }

    #[test]
    fn undefined_symbol_reports_as_a_compile_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "section code\nmov a, undefined_symbol\n");
        let mut compile = Compile::new();
        let err = compile.run(path.to_str().unwrap()).unwrap_err();
        match err {
            Error::Compile { count, .. } => assert!(count >= 1),
            Error::Io(_) => panic!("expected a Compile error"),
        }
    }
}
