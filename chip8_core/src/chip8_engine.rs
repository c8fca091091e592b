pub mod chip8_engine {
    use std::time::{Duration, Instant};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tracing::{debug, trace};

    use crate::clock::clock::TimerClock;
    use crate::decoder::decoder::{Command, decode};
    use crate::device::device::{DisplayDevice, Keypad, Peripherals};
    use crate::errors::errors::ExecError;
    use crate::instruction::instruction::InstructionShape;
    use crate::machine::machine::MachineState;

    /// The dispatch loop does not blindly add 2 to pc after every command.
    /// Each handler reports how the program counter moves on instead.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Flow {
        /// fall through to the next instruction (pc += 2)
        Next,
        /// skip one instruction (pc += 4)
        Skip,
        /// the handler already set pc to the next fetch address
        Jump,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct EngineConfig {
        /// Upper bound on how long `skp`/`sknp` wait for a key.
        pub key_poll_timeout: Duration,
        /// Seed for `rnd`. `None` seeds from the OS.
        pub seed: Option<u64>,
    }

    impl Default for EngineConfig {
        fn default() -> EngineConfig {
            EngineConfig {
                key_poll_timeout: Duration::from_millis(16),
                seed: None,
            }
        }
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum StopReason {
        CycleLimit,
        HostStopped,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct RunSummary {
        pub cycles: u64,
        pub reason: StopReason,
    }

    /// Execute one decoded command against the machine.
    ///
    /// Timers are left alone; they belong to whoever drives the clock.
    pub fn execute<P, R>(
        state: &mut MachineState,
        command: Command,
        io: &mut P,
        rng: &mut R,
        key_poll_timeout: Duration,
    ) -> Result<(), ExecError>
    where
        P: Peripherals,
        R: Rng,
    {
        use InstructionShape as S;

        let flow = match command.shape {
            S::Cls | S::Ret | S::Jmp | S::Call | S::Jmp0 => op_flow(state, command, io),
            S::SeByte | S::SneByte | S::SeReg | S::SneReg => op_compare(state, command),
            S::MovByte
            | S::AddByte
            | S::MovReg
            | S::Or
            | S::And
            | S::Xor
            | S::AddReg
            | S::Sub
            | S::Subn
            | S::Shr
            | S::Shl => op_alu(state, command),
            S::Rnd => {
                let random_value: u8 = rng.random();
                state.v[command.x as usize] = random_value & command.kk();
                Flow::Next
            }
            S::Drw => op_draw(state, command, io),
            S::Skp | S::Sknp => op_key_probe(state, command, io, key_poll_timeout),
            S::MovFromKey => {
                let pc = state.pc;
                let key = io
                    .block_until_pressed()
                    .ok_or(ExecError::InputClosed { pc })?;
                state.v[command.x as usize] = key & 0xF;
                Flow::Next
            }
            S::MovI
            | S::MovFromDelay
            | S::MovToDelay
            | S::MovToSound
            | S::AddI
            | S::MovFont
            | S::MovBcd
            | S::Save
            | S::Load => op_memory(state, command),
        };

        match flow {
            Flow::Next => state.set_pc(state.pc.wrapping_add(2)),
            Flow::Skip => state.set_pc(state.pc.wrapping_add(4)),
            Flow::Jump => {}
        }
        Ok(())
    }

    fn op_flow<D: DisplayDevice>(state: &mut MachineState, command: Command, display: &mut D) -> Flow {
        match command.shape {
            InstructionShape::Cls => {
                display.clear_screen();
                Flow::Next
            }
            // the stack holds the address of the call itself; falling through
            // lands on the instruction after it.
            InstructionShape::Ret => {
                let addr = state.pop();
                state.set_pc(addr);
                Flow::Next
            }
            InstructionShape::Jmp => {
                state.set_pc(command.n);
                Flow::Jump
            }
            InstructionShape::Call => {
                let here = state.pc;
                state.push(here);
                state.set_pc(command.n);
                Flow::Jump
            }
            InstructionShape::Jmp0 => {
                state.set_pc(state.v[0] as u16 + command.n);
                Flow::Jump
            }
            _ => Flow::Next,
        }
    }

    fn op_compare(state: &MachineState, command: Command) -> Flow {
        let vx = state.v[command.x as usize];
        let vy = state.v[command.y as usize];

        let skip = match command.shape {
            InstructionShape::SeByte => vx == command.kk(),
            InstructionShape::SneByte => vx != command.kk(),
            InstructionShape::SeReg => vx == vy,
            InstructionShape::SneReg => vx != vy,
            _ => false,
        };

        if skip { Flow::Skip } else { Flow::Next }
    }

    // operands are captured up front; VF is written after Vx so the flag
    // wins when x is 0xF.
    fn op_alu(state: &mut MachineState, command: Command) -> Flow {
        let x = command.x as usize;
        let vx = state.v[x];
        let vy = state.v[command.y as usize];

        let (result, flag) = match command.shape {
            InstructionShape::MovByte => (command.kk(), None),
            InstructionShape::AddByte => (vx.wrapping_add(command.kk()), None),
            InstructionShape::MovReg => (vy, None),
            InstructionShape::Or => (vx | vy, None),
            InstructionShape::And => (vx & vy, None),
            InstructionShape::Xor => (vx ^ vy, None),
            InstructionShape::AddReg => {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry as u8))
            }
            InstructionShape::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
            InstructionShape::Subn => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
            InstructionShape::Shr => (vx >> 1, Some(vx & 1)),
            InstructionShape::Shl => (vx << 1, Some((vx >> 7) & 1)),
            _ => return Flow::Next,
        };

        state.v[x] = result;
        if let Some(flag) = flag {
            state.v[0xF] = flag;
        }
        Flow::Next
    }

    fn op_draw<D: DisplayDevice>(state: &mut MachineState, command: Command, display: &mut D) -> Flow {
        let x = state.v[command.x as usize];
        let y = state.v[command.y as usize];
        let sprite = state.read_bytes(state.i, command.n as usize);

        let collision = display.draw_sprite(x, y, &sprite);
        state.v[0xF] = collision as u8;
        Flow::Next
    }

    fn op_key_probe<K: Keypad>(
        state: &MachineState,
        command: Command,
        keypad: &mut K,
        timeout: Duration,
    ) -> Flow {
        let wanted = state.v[command.x as usize];
        let pressed = keypad.poll(timeout) == Some(wanted);

        let skip = match command.shape {
            InstructionShape::Skp => pressed,
            _ => !pressed,
        };
        if skip { Flow::Skip } else { Flow::Next }
    }

    fn op_memory(state: &mut MachineState, command: Command) -> Flow {
        let x = command.x as usize;

        match command.shape {
            InstructionShape::MovI => state.i = command.n,
            InstructionShape::MovFromDelay => state.v[x] = state.delay_timer,
            InstructionShape::MovToDelay => state.delay_timer = state.v[x],
            InstructionShape::MovToSound => state.sound_timer = state.v[x],
            InstructionShape::AddI => state.i = state.i.wrapping_add(state.v[x] as u16),
            // font glyphs are 5 bytes each
            InstructionShape::MovFont => state.i = state.v[x] as u16 * 5,
            InstructionShape::MovBcd => {
                let val = state.v[x];
                let digits = [val / 100, (val % 100) / 10, val % 10];
                state.write_bytes(state.i, &digits);
            }
            // V0..=Vx inclusive; I is left unchanged.
            InstructionShape::Save => {
                let regs = state.v;
                state.write_bytes(state.i, &regs[..=x]);
            }
            InstructionShape::Load => {
                let data = state.read_bytes(state.i, x + 1);
                state.v[..=x].copy_from_slice(&data);
            }
            _ => {}
        }
        Flow::Next
    }

    /// Owns the machine and its peripherals and runs the fetch/decode/
    /// dispatch cycle.
    pub struct Interpreter<P: Peripherals> {
        pub state: MachineState,
        pub io: P,
        rng: StdRng,
        key_poll_timeout: Duration,
        cycles: u64,
    }

    impl<P: Peripherals> Interpreter<P> {
        pub fn new(io: P, config: EngineConfig) -> Interpreter<P> {
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            Interpreter {
                state: MachineState::new(),
                io,
                rng,
                key_poll_timeout: config.key_poll_timeout,
                cycles: 0,
            }
        }

        pub fn cycles(&self) -> u64 {
            self.cycles
        }

        /// Fetch, decode and dispatch a single instruction.
        pub fn step(&mut self) -> Result<(), ExecError> {
            let pc = self.state.pc;
            let opcode = self.state.read_u16(pc);
            let command = decode(opcode).ok_or(ExecError::UnrecognizedOpcode { pc, opcode })?;

            trace!("{pc:03X}: {opcode:04X} {command}");

            execute(
                &mut self.state,
                command,
                &mut self.io,
                &mut self.rng,
                self.key_poll_timeout,
            )?;
            self.cycles += 1;
            Ok(())
        }

        /// Step until `max_cycles` instructions have run or an error stops
        /// the machine. Timers are fed from a 60 Hz wall clock between steps.
        pub fn run(&mut self, max_cycles: Option<u64>) -> Result<RunSummary, ExecError> {
            self.run_with(max_cycles, |_| true)
        }

        /// Like [`Interpreter::run`], calling `between_steps` after every
        /// instruction. Returning false from the hook stops the run.
        pub fn run_with<F>(&mut self, max_cycles: Option<u64>, mut between_steps: F) -> Result<RunSummary, ExecError>
        where
            F: FnMut(&mut Interpreter<P>) -> bool,
        {
            let mut clock = TimerClock::new(Instant::now());
            let start = self.cycles;
            debug!(?max_cycles, "run loop starting at {:03X}", self.state.pc);

            let reason = loop {
                if let Some(limit) = max_cycles {
                    if self.cycles - start >= limit {
                        break StopReason::CycleLimit;
                    }
                }

                self.step()?;

                let ticks = clock.ticks_at(Instant::now());
                if ticks > 0 {
                    self.state.tick_timers(ticks);
                }

                if !between_steps(self) {
                    break StopReason::HostStopped;
                }
            };

            let summary = RunSummary {
                cycles: self.cycles - start,
                reason,
            };
            debug!(cycles = summary.cycles, reason = ?summary.reason, "run loop stopped");
            Ok(summary)
        }
    }
}
