pub mod machine {
    use std::fmt::Write;
    use std::fs;
    use std::path::Path;

    use tracing::debug;

    use crate::errors::errors::ImageError;

    pub const MEMORY_SIZE: usize = 0x1000;
    pub const REGISTER_COUNT: usize = 16;
    pub const STACK_DEPTH: usize = 16;
    pub const PROGRAM_START: u16 = 0x200;

    const ADDR_MASK: u16 = (MEMORY_SIZE - 1) as u16;

    /// Everything the dispatcher mutates. Owned by exactly one interpreter;
    /// there is no shared or global machine state.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct MachineState {
        pub memory: [u8; MEMORY_SIZE],
        /// V0..VF; VF doubles as the ALU flag.
        pub v: [u8; REGISTER_COUNT],
        pub i: u16,
        pub pc: u16,
        /// Ring of return slots. `sp` always wraps modulo the depth, so
        /// overflow and underflow are never detected.
        pub stack: [u16; STACK_DEPTH],
        pub sp: u8,
        pub delay_timer: u8,
        pub sound_timer: u8,
    }

    impl Default for MachineState {
        fn default() -> MachineState {
            MachineState {
                memory: [0; MEMORY_SIZE],
                v: [0; REGISTER_COUNT],
                i: 0,
                pc: PROGRAM_START,
                stack: [0; STACK_DEPTH],
                sp: 0,
                delay_timer: 0,
                sound_timer: 0,
            }
        }
    }

    impl MachineState {
        pub fn new() -> MachineState {
            MachineState::default()
        }

        /// Copy an image into memory starting at address 0.
        ///
        /// The image is loaded verbatim including its header gap, so a
        /// well-formed image places its first opcode at 0x200. An image that
        /// does not fit is rejected.
        pub fn load_image(&mut self, image: &[u8]) -> Result<(), ImageError> {
            if image.len() > MEMORY_SIZE {
                return Err(ImageError::TooLarge { len: image.len() });
            }
            self.memory[..image.len()].copy_from_slice(image);
            Ok(())
        }

        pub fn load_image_file(&mut self, path: &Path) -> Result<(), ImageError> {
            let bytes = fs::read(path).map_err(|source| ImageError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            self.load_image(&bytes)?;
            debug!(path = %path.display(), len = bytes.len(), "loaded program image");
            Ok(())
        }

        // every memory access wraps into the 4 KB space.
        pub fn read_u8(&self, addr: u16) -> u8 {
            self.memory[(addr & ADDR_MASK) as usize]
        }

        pub fn write_u8(&mut self, addr: u16, value: u8) {
            self.memory[(addr & ADDR_MASK) as usize] = value;
        }

        /// Read a big-endian word (opcodes are stored hi byte first).
        pub fn read_u16(&self, addr: u16) -> u16 {
            let hi = self.read_u8(addr) as u16;
            let lo = self.read_u8(addr.wrapping_add(1)) as u16;
            (hi << 8) | lo
        }

        pub fn read_bytes(&self, addr: u16, len: usize) -> Vec<u8> {
            (0..len)
                .map(|idx| self.read_u8(addr.wrapping_add(idx as u16)))
                .collect()
        }

        pub fn write_bytes(&mut self, addr: u16, data: &[u8]) {
            for (idx, byte) in data.iter().enumerate() {
                self.write_u8(addr.wrapping_add(idx as u16), *byte);
            }
        }

        pub fn set_pc(&mut self, addr: u16) {
            self.pc = addr & ADDR_MASK;
        }

        pub fn push(&mut self, addr: u16) {
            self.sp = self.sp.wrapping_add(1) % STACK_DEPTH as u8;
            self.stack[self.sp as usize] = addr;
        }

        pub fn pop(&mut self) -> u16 {
            let addr = self.stack[self.sp as usize % STACK_DEPTH];
            self.sp = self.sp.wrapping_sub(1) % STACK_DEPTH as u8;
            addr
        }

        /// Decrement DT/ST by a number of 60 Hz ticks supplied by the caller.
        /// The dispatcher never calls this itself.
        pub fn tick_timers(&mut self, ticks: u32) {
            let dec = ticks.min(u8::MAX as u32) as u8;
            self.delay_timer = self.delay_timer.saturating_sub(dec);
            self.sound_timer = self.sound_timer.saturating_sub(dec);
        }

        pub fn reg_state(&self) -> String {
            let mut out = String::new();
            let _ = writeln!(out, "PC - {:03X}", self.pc);
            let _ = writeln!(out, "I  - {:03X}", self.i);
            let _ = writeln!(out, "SP - {:X}", self.sp);
            let _ = writeln!(out, "DT - {:02X}", self.delay_timer);
            let _ = writeln!(out, "ST - {:02X}", self.sound_timer);

            let regs: Vec<String> = self.v.iter().map(|v| format!("{v:02X}")).collect();
            let _ = writeln!(out, "V  - {}", regs.join(" "));

            let stack: Vec<String> = self.stack.iter().map(|s| format!("{s:03X}")).collect();
            let _ = writeln!(out, "STACK - {}", stack.join(" "));
            out
        }
    }
}
