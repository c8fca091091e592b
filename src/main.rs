use std::process;

use minifb::Scale;
use tracing::{debug, info};

use chip8_core::chip8_engine::chip8_engine::Interpreter;
use chip8_core::errors::errors::ExecError;
use chip8_toolchain::cli::cli::{RunArgs, parse_or_exit};
use chip8_toolchain::display::display::{DisplayWindow, scale_from_factor};
use chip8_toolchain::logging::logging::init_tracing;

// window events are pumped every this many instructions.
const PUMP_INTERVAL: u64 = 256;

fn main() {
    init_tracing();
    let args: RunArgs = parse_or_exit();

    if let Err(err) = run(&args) {
        eprintln!("run: {err}");
        process::exit(1);
    }
}

fn run(args: &RunArgs) -> Result<(), String> {
    let display = if args.headless() {
        DisplayWindow::headless()
    } else {
        let scale = scale_from_factor(args.scale).unwrap_or(Scale::X8);
        DisplayWindow::new(scale).map_err(|err| format!("failed to open window: {err}"))?
    };

    let mut interpreter = Interpreter::new(display, args.engine_config());
    interpreter
        .state
        .load_image_file(&args.input)
        .map_err(|err| format!("{}: {err}", args.input.display()))?;

    info!("running {}", args.input.display());
    let result = interpreter.run_with(args.max_cycles, |interp| {
        if interp.cycles() % PUMP_INTERVAL == 0 {
            interp.io.pump()
        } else {
            true
        }
    });

    let outcome = match result {
        Ok(summary) => {
            info!(cycles = summary.cycles, reason = ?summary.reason, "stopped");
            Ok(())
        }
        Err(ExecError::InputClosed { pc }) => {
            info!("input closed while waiting for a key at {pc:03X}");
            Ok(())
        }
        Err(err) => {
            debug!("machine state at failure:\n{}", interpreter.state.reg_state());
            Err(err.to_string())
        }
    };

    if args.dump_state {
        print!("{}", interpreter.state.reg_state());
    }
    outcome
}
