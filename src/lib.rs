//! A two-pass assembler for the RRPGE 16-bit word-addressed virtual
//! machine: turns plain-text assembly sources into a single application
//! binary carrying a fixed-layout header, an application descriptor,
//! executable code and initialized data.
//!
//! The [`assemble`] entry point drives a [`compile::Compile`] session
//! through all three internal passes and writes the resulting image to
//! disk. Everything below the top-level error boundary ([`error::Error`])
//! is reusable for embedders that only want the in-memory image.

pub mod bindata;
pub mod compile;
pub mod compst;
pub mod error;
pub mod fault;
pub mod incstk;
pub mod litpr;
pub mod opcode;
pub mod pass1;
pub mod pass2;
pub mod pass3;
pub mod ps1sup;
pub mod section;
pub mod strpr;
pub mod symtab;
pub mod valwr;

pub use compile::Compile;
pub use error::Error;

/// Assembles `input_path` and writes the resulting binary image to
/// `output_path`.
pub fn assemble(input_path: &str, output_path: &str) -> Result<(), Error> {
    let mut compile = Compile::new();
    let image = compile.run(input_path)?;
    std::fs::write(output_path, image)?;
    Ok(())
}

/// Like [`assemble`], but invokes `on_pass` after each of the three passes
/// completes successfully (used by the CLI to print pass-progress lines).
pub fn assemble_with_progress(
    input_path: &str,
    output_path: &str,
    mut on_pass: impl FnMut(u8),
) -> Result<(), Error> {
    let mut compile = Compile::new();
    compile.pass1(input_path)?;
    on_pass(1);
    compile.pass2()?;
    on_pass(2);
    let image = compile.pass3()?;
    on_pass(3);
    std::fs::write(output_path, image)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_writes_the_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("main.asm");
        std::fs::write(&input, "section code\nnop\n").unwrap();
        let output = dir.path().join("app.rpa");

        assemble(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[0..2], b"RP");
    }
}
