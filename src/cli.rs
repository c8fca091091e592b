pub mod cli {
    use std::path::PathBuf;
    use std::process;
    use std::time::Duration;

    use clap::error::ErrorKind;
    use clap::{ArgAction, Parser};

    use chip8_core::chip8_engine::chip8_engine::EngineConfig;

    use crate::display::display::{headless_from_env, scale_from_factor};

    #[derive(Parser, Debug)]
    #[command(
        name = "assemble",
        version,
        about = "Assemble CHIP-8 mnemonics into a flat binary image"
    )]
    pub struct AssembleArgs {
        /// Assembly source, one instruction per line.
        pub input: PathBuf,

        /// Binary image to write (0x200-byte zero header, then opcodes).
        pub output: PathBuf,

        #[arg(
            short = 'l',
            long = "listing",
            action = ArgAction::SetTrue,
            long_help = "Print every accepted line next to its address and opcode."
        )]
        pub listing: bool,
    }

    #[derive(Parser, Debug)]
    #[command(name = "run", version, about = "Run a CHIP-8 program image")]
    pub struct RunArgs {
        /// Program image; loaded verbatim at address 0.
        pub input: PathBuf,

        #[arg(long, value_name = "SEED", long_help = "Seed the rnd instruction for reproducible runs.")]
        pub seed: Option<u64>,

        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Run without a window. Also enabled by CHIP8_HEADLESS=1."
        )]
        pub headless: bool,

        #[arg(long, value_name = "N", long_help = "Stop after N instructions.")]
        pub max_cycles: Option<u64>,

        #[arg(
            long = "key-timeout-ms",
            value_name = "MS",
            default_value_t = 16,
            long_help = "How long skp/sknp wait for a key before giving up."
        )]
        pub key_timeout_ms: u64,

        #[arg(
            long,
            default_value_t = 8,
            value_parser = parse_scale,
            long_help = "Window scale factor."
        )]
        pub scale: u8,

        #[arg(
            long = "dump-state",
            action = ArgAction::SetTrue,
            long_help = "Print registers, stack and timers when the run ends."
        )]
        pub dump_state: bool,
    }

    fn parse_scale(text: &str) -> Result<u8, String> {
        let factor: u8 = text
            .parse()
            .map_err(|_| format!("'{text}' is not a number"))?;
        scale_from_factor(factor)
            .map(|_| factor)
            .ok_or_else(|| "scale must be one of 1, 2, 4, 8, 16, 32".to_string())
    }

    impl RunArgs {
        pub fn engine_config(&self) -> EngineConfig {
            EngineConfig {
                key_poll_timeout: Duration::from_millis(self.key_timeout_ms),
                seed: self.seed,
            }
        }

        pub fn headless(&self) -> bool {
            self.headless || headless_from_env()
        }
    }

    /// Parse arguments, exiting with status 1 on a usage error. Help and
    /// version output still exit 0.
    pub fn parse_or_exit<T: Parser>() -> T {
        match T::try_parse() {
            Ok(args) => args,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
                _ => {
                    let _ = err.print();
                    process::exit(1);
                }
            },
        }
    }
}
