use std::fs;
use std::process;

use tracing::info;

use chip8_core::assembler::assembler::Assembler;
use chip8_toolchain::cli::cli::{AssembleArgs, parse_or_exit};
use chip8_toolchain::logging::logging::init_tracing;

fn main() {
    init_tracing();
    let args: AssembleArgs = parse_or_exit();

    if let Err(err) = run(&args) {
        eprintln!("assemble: {err}");
        process::exit(1);
    }
}

fn run(args: &AssembleArgs) -> Result<(), String> {
    let source = fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read {}: {err}", args.input.display()))?;

    // bad lines are logged as warnings by the assembler and left out.
    let assembly = Assembler::new().assemble(&source);

    if args.listing {
        for entry in &assembly.listing {
            println!(
                "{:>4}  {:03X}  {:04X}  {}",
                entry.line_no, entry.addr, entry.opcode, entry.text
            );
        }
    }

    fs::write(&args.output, assembly.image.to_bytes())
        .map_err(|err| format!("failed to write {}: {err}", args.output.display()))?;

    info!(
        opcodes = assembly.image.opcodes().len(),
        skipped = assembly.diagnostics.len(),
        "wrote {}",
        args.output.display()
    );
    Ok(())
}
