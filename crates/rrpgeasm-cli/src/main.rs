use anyhow::{Context, Result};
use clap::{command, Arg, ArgAction};

const DEFAULT_INPUT: &str = "main.asm";
const OUTPUT: &str = "app.rpa";

fn main() -> Result<()> {
    let matches = command!()
        .args(&[
            Arg::new("input")
                .required(false)
                .default_value(DEFAULT_INPUT)
                .help("The assembly source to compile"),
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose internal logging"),
        ])
        .get_matches();

    if matches.get_flag("verbose") {
        env_logger::builder()
            .format_level(false)
            .format_target(false)
            .filter_module("rrpgeasm_core", log::LevelFilter::Debug)
            .init();
    }

    let input = matches.get_one::<String>("input").unwrap();

    println!("RRPGE Assembler");

    rrpgeasm_core::assemble_with_progress(input, OUTPUT, |pass| {
        println!("Compilation pass{}", pass);
    })
    .with_context(|| format!("Failed to assemble '{}'", input))?;

    println!("Compilation complete");
    Ok(())
}
