pub mod decoder {
    use std::fmt;

    use crate::instruction::instruction::{Family, InstructionShape};

    // keep opcode bit extraction consistent and centralized.
    macro_rules! extract_nnn {
        ($value:expr) => {
            ($value & 0x0FFF) as u16
        };
    }

    macro_rules! extract_x {
        ($value:expr) => {
            (($value >> 0x8) & 0xF) as u8
        };
    }

    macro_rules! extract_kk {
        ($value:expr) => {
            ($value & 0xFF) as u16
        };
    }

    macro_rules! extract_y {
        ($value:expr) => {
            (($value >> 0x4) & 0xF) as u8
        };
    }

    macro_rules! extract_z {
        ($value:expr) => {
            ($value & 0xF) as u8
        };
    }

    /// One decoded opcode. Fields a shape does not use are zero.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Command {
        pub shape: InstructionShape,
        pub x: u8,
        pub y: u8,
        pub n: u16,
    }

    impl Command {
        /// Build a command, masking each field to the width its shape uses
        /// and clearing the ones it does not.
        pub fn new(shape: InstructionShape, x: u8, y: u8, n: u16) -> Command {
            let (x, y, n) = match shape.family() {
                Family::NoOperands => (0, 0, 0),
                Family::NNN => (0, 0, extract_nnn!(n)),
                Family::XNN => (x & 0xF, 0, extract_kk!(n)),
                Family::X => (x & 0xF, 0, 0),
                Family::XY if shape == InstructionShape::Drw => (x & 0xF, y & 0xF, n & 0xF),
                Family::XY => (x & 0xF, y & 0xF, 0),
            };
            Command { shape, x, y, n }
        }

        pub fn encode(&self) -> u16 {
            self.shape.pack(self.x, self.y, self.n)
        }

        pub fn kk(&self) -> u8 {
            self.n as u8
        }
    }

    /// Classify a raw opcode. `None` is the unrecognized sentinel; the
    /// dispatcher must report it rather than treat it as a no-op.
    pub fn decode(opcode: u16) -> Option<Command> {
        use InstructionShape as S;

        let x = extract_x!(opcode);
        let y = extract_y!(opcode);
        let z = extract_z!(opcode);
        let nnn = extract_nnn!(opcode);
        let kk = extract_kk!(opcode);

        let shape = match (opcode >> 12, z) {
            (0x0, _) => match opcode {
                0x00E0 => S::Cls,
                0x00EE => S::Ret,
                _ => return None,
            },
            (0x1, _) => S::Jmp,
            (0x2, _) => S::Call,
            (0x3, _) => S::SeByte,
            (0x4, _) => S::SneByte,
            (0x5, 0x0) => S::SeReg,
            (0x6, _) => S::MovByte,
            (0x7, _) => S::AddByte,
            (0x8, 0x0) => S::MovReg,
            (0x8, 0x1) => S::Or,
            (0x8, 0x2) => S::And,
            (0x8, 0x3) => S::Xor,
            (0x8, 0x4) => S::AddReg,
            (0x8, 0x5) => S::Sub,
            (0x8, 0x6) => S::Shr,
            (0x8, 0x7) => S::Subn,
            (0x8, 0xE) => S::Shl,
            (0x9, 0x0) => S::SneReg,
            (0xA, _) => S::MovI,
            (0xB, _) => S::Jmp0,
            (0xC, _) => S::Rnd,
            (0xD, _) => S::Drw,
            (0xE, _) => match kk {
                0x9E => S::Skp,
                0xA1 => S::Sknp,
                _ => return None,
            },
            (0xF, _) => match kk {
                0x07 => S::MovFromDelay,
                0x0A => S::MovFromKey,
                0x15 => S::MovToDelay,
                0x18 => S::MovToSound,
                0x1E => S::AddI,
                0x29 => S::MovFont,
                0x33 => S::MovBcd,
                0x55 => S::Save,
                0x65 => S::Load,
                _ => return None,
            },
            _ => return None,
        };

        let n = match shape.family() {
            Family::NNN => nnn,
            Family::XNN => kk,
            _ => z as u16,
        };
        Some(Command::new(shape, x, y, n))
    }

    /// Renders the command in assembler source syntax.
    impl fmt::Display for Command {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            use InstructionShape as S;

            let name = self.shape.mnemonic();
            let (x, y, n) = (self.x, self.y, self.n);
            match self.shape {
                S::Cls | S::Ret => write!(f, "{name}"),
                S::Jmp | S::Call | S::Jmp0 => write!(f, "{name} {n}"),
                S::SeByte | S::SneByte | S::MovByte | S::AddByte | S::Rnd => {
                    write!(f, "{name} V{x:X} {n}")
                }
                S::SeReg | S::SneReg | S::MovReg | S::Or | S::And | S::Xor | S::AddReg | S::Sub | S::Subn => {
                    write!(f, "{name} V{x:X} V{y:X}")
                }
                S::Shr | S::Shl if y != 0 => write!(f, "{name} V{x:X} V{y:X}"),
                S::Shr | S::Shl => write!(f, "{name} V{x:X}"),
                S::MovI => write!(f, "{name} I {n}"),
                S::Drw => write!(f, "{name} V{x:X} V{y:X} {n}"),
                S::Skp | S::Sknp => write!(f, "{name} V{x:X}"),
                S::MovFromDelay => write!(f, "{name} V{x:X} DT"),
                S::MovFromKey => write!(f, "{name} V{x:X} K"),
                S::MovToDelay => write!(f, "{name} DT V{x:X}"),
                S::MovToSound => write!(f, "{name} ST V{x:X}"),
                S::AddI => write!(f, "{name} I V{x:X}"),
                S::MovFont => write!(f, "{name} F V{x:X}"),
                S::MovBcd => write!(f, "{name} B V{x:X}"),
                S::Save => write!(f, "{name} [I] V{x:X}"),
                S::Load => write!(f, "{name} V{x:X} [I]"),
            }
        }
    }
}
