pub mod instruction {
    /// Operand layout of an opcode, keyed by its top nibble.
    ///
    /// The names spell out which nibbles carry operands: `X`/`Y` are
    /// register indices, `N` is immediate data and `_` is fixed.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Family {
        /// 0x00E0, 0x00EE
        NoOperands,
        /// top nibble 5, 8, 9, D (D also carries a height in the low nibble)
        XY,
        /// top nibble 1, 2, A, B
        NNN,
        /// top nibble 3, 4, 6, 7, C
        XNN,
        /// top nibble E, F; the low byte picks the sub-operation
        X,
    }

    impl Family {
        pub fn of(opcode: u16) -> Family {
            match opcode >> 12 {
                0x0 => Family::NoOperands,
                0x5 | 0x8 | 0x9 | 0xD => Family::XY,
                0x1 | 0x2 | 0xA | 0xB => Family::NNN,
                0x3 | 0x4 | 0x6 | 0x7 | 0xC => Family::XNN,
                _ => Family::X,
            }
        }
    }

    /// The closed set of instruction shapes the machine understands.
    ///
    /// Each variant owns a 16-bit template; operand nibbles are zero in the
    /// template and filled in by [`InstructionShape::pack`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub enum InstructionShape {
        Cls,
        Ret,
        Jmp,
        Call,
        SeByte,
        SneByte,
        SeReg,
        MovByte,
        AddByte,
        MovReg,
        Or,
        And,
        Xor,
        AddReg,
        Sub,
        Shr,
        Subn,
        Shl,
        SneReg,
        MovI,
        Jmp0,
        Rnd,
        Drw,
        Skp,
        Sknp,
        MovFromDelay,
        MovFromKey,
        MovToDelay,
        MovToSound,
        AddI,
        MovFont,
        MovBcd,
        Save,
        Load,
    }

    impl InstructionShape {
        pub const ALL: [InstructionShape; 34] = [
            InstructionShape::Cls,
            InstructionShape::Ret,
            InstructionShape::Jmp,
            InstructionShape::Call,
            InstructionShape::SeByte,
            InstructionShape::SneByte,
            InstructionShape::SeReg,
            InstructionShape::MovByte,
            InstructionShape::AddByte,
            InstructionShape::MovReg,
            InstructionShape::Or,
            InstructionShape::And,
            InstructionShape::Xor,
            InstructionShape::AddReg,
            InstructionShape::Sub,
            InstructionShape::Shr,
            InstructionShape::Subn,
            InstructionShape::Shl,
            InstructionShape::SneReg,
            InstructionShape::MovI,
            InstructionShape::Jmp0,
            InstructionShape::Rnd,
            InstructionShape::Drw,
            InstructionShape::Skp,
            InstructionShape::Sknp,
            InstructionShape::MovFromDelay,
            InstructionShape::MovFromKey,
            InstructionShape::MovToDelay,
            InstructionShape::MovToSound,
            InstructionShape::AddI,
            InstructionShape::MovFont,
            InstructionShape::MovBcd,
            InstructionShape::Save,
            InstructionShape::Load,
        ];

        /// Fixed bits of the opcode with every operand nibble cleared.
        pub fn template(self) -> u16 {
            match self {
                InstructionShape::Cls => 0x00E0,
                InstructionShape::Ret => 0x00EE,
                InstructionShape::Jmp => 0x1000,
                InstructionShape::Call => 0x2000,
                InstructionShape::SeByte => 0x3000,
                InstructionShape::SneByte => 0x4000,
                InstructionShape::SeReg => 0x5000,
                InstructionShape::MovByte => 0x6000,
                InstructionShape::AddByte => 0x7000,
                InstructionShape::MovReg => 0x8000,
                InstructionShape::Or => 0x8001,
                InstructionShape::And => 0x8002,
                InstructionShape::Xor => 0x8003,
                InstructionShape::AddReg => 0x8004,
                InstructionShape::Sub => 0x8005,
                InstructionShape::Shr => 0x8006,
                InstructionShape::Subn => 0x8007,
                InstructionShape::Shl => 0x800E,
                InstructionShape::SneReg => 0x9000,
                InstructionShape::MovI => 0xA000,
                InstructionShape::Jmp0 => 0xB000,
                InstructionShape::Rnd => 0xC000,
                InstructionShape::Drw => 0xD000,
                InstructionShape::Skp => 0xE09E,
                InstructionShape::Sknp => 0xE0A1,
                InstructionShape::MovFromDelay => 0xF007,
                InstructionShape::MovFromKey => 0xF00A,
                InstructionShape::MovToDelay => 0xF015,
                InstructionShape::MovToSound => 0xF018,
                InstructionShape::AddI => 0xF01E,
                InstructionShape::MovFont => 0xF029,
                InstructionShape::MovBcd => 0xF033,
                InstructionShape::Save => 0xF055,
                InstructionShape::Load => 0xF065,
            }
        }

        pub fn family(self) -> Family {
            Family::of(self.template())
        }

        /// Source mnemonic this shape is written with.
        pub fn mnemonic(self) -> &'static str {
            match self {
                InstructionShape::Cls => "cls",
                InstructionShape::Ret => "ret",
                InstructionShape::Jmp => "jmp",
                InstructionShape::Call => "call",
                InstructionShape::SeByte | InstructionShape::SeReg => "se",
                InstructionShape::SneByte | InstructionShape::SneReg => "sne",
                InstructionShape::AddByte | InstructionShape::AddReg | InstructionShape::AddI => "add",
                InstructionShape::Or => "or",
                InstructionShape::And => "and",
                InstructionShape::Xor => "xor",
                InstructionShape::Sub => "sub",
                InstructionShape::Shr => "shr",
                InstructionShape::Subn => "subn",
                InstructionShape::Shl => "shl",
                InstructionShape::Jmp0 => "jmp0",
                InstructionShape::Rnd => "rnd",
                InstructionShape::Drw => "drw",
                InstructionShape::Skp => "skp",
                InstructionShape::Sknp => "sknp",
                InstructionShape::MovByte
                | InstructionShape::MovReg
                | InstructionShape::MovI
                | InstructionShape::MovFromDelay
                | InstructionShape::MovFromKey
                | InstructionShape::MovToDelay
                | InstructionShape::MovToSound
                | InstructionShape::MovFont
                | InstructionShape::MovBcd
                | InstructionShape::Save
                | InstructionShape::Load => "mov",
            }
        }

        /// Place operands into the template according to the shape's family.
        /// Every field is masked to its width first.
        pub fn pack(self, x: u8, y: u8, n: u16) -> u16 {
            let x = ((x & 0xF) as u16) << 8;
            let y = ((y & 0xF) as u16) << 4;
            let template = self.template();

            match self.family() {
                Family::NoOperands => template,
                Family::NNN => template | (n & 0x0FFF),
                Family::XNN => template | x | (n & 0x00FF),
                Family::X => template | x,
                Family::XY => {
                    if self == InstructionShape::Drw {
                        template | x | y | (n & 0x000F)
                    } else {
                        template | x | y
                    }
                }
            }
        }
    }
}
