pub mod encoder {
    use crate::errors::errors::AsmError;
    use crate::instruction::instruction::InstructionShape;
    use crate::token::token::{Mnemonic, Token};

    const ADDR_MASK: u16 = 0x0FFF;
    const BYTE_MASK: u16 = 0x00FF;
    const NIBBLE_MASK: u16 = 0x000F;

    /// Operands of one recognized mnemonic, with typed accessors that report
    /// a malformed line instead of reinterpreting a token of the wrong kind.
    struct Operands<'a> {
        mnemonic: &'static str,
        args: &'a [Token],
    }

    impl<'a> Operands<'a> {
        fn expect_count(&self, count: usize) -> Result<(), AsmError> {
            if self.args.len() != count {
                return Err(AsmError::malformed(
                    self.mnemonic,
                    format!("expected {count} operand(s), found {}", self.args.len()),
                ));
            }
            Ok(())
        }

        fn reg(&self, idx: usize) -> Result<u8, AsmError> {
            self.args[idx].register().ok_or_else(|| {
                AsmError::malformed(
                    self.mnemonic,
                    format!("operand {} must be a register, found '{}'", idx + 1, self.args[idx]),
                )
            })
        }

        fn num(&self, idx: usize, mask: u16) -> Result<u16, AsmError> {
            let value = self.args[idx].number().ok_or_else(|| {
                AsmError::malformed(
                    self.mnemonic,
                    format!("operand {} must be a number, found '{}'", idx + 1, self.args[idx]),
                )
            })?;
            // i32 -> u16 keeps the low bits, so negative literals wrap like the field would
            Ok((value as u16) & mask)
        }

        fn no_form(&self) -> AsmError {
            let found: Vec<String> = self.args.iter().map(|t| t.to_string()).collect();
            AsmError::malformed(
                self.mnemonic,
                format!("no form takes operands '{}'", found.join(" ")),
            )
        }
    }

    /// Encode one lexed source line.
    ///
    /// Returns `Ok(None)` when the line is not an instruction at all (empty,
    /// or not led by a mnemonic). Callers skip such lines with a warning.
    pub fn encode(tokens: &[Token]) -> Result<Option<u16>, AsmError> {
        let Some(Token::Mnemonic(mnemonic)) = tokens.first() else {
            return Ok(None);
        };

        let ops = Operands {
            mnemonic: mnemonic.name(),
            args: &tokens[1..],
        };

        if let Some(Token::Invalid(text)) = ops.args.iter().find(|t| matches!(t, Token::Invalid(_))) {
            return Err(AsmError::malformed(
                ops.mnemonic,
                AsmError::UnlexableToken(text.clone()).to_string(),
            ));
        }

        encode_operands(*mnemonic, &ops).map(Some)
    }

    fn encode_operands(mnemonic: Mnemonic, ops: &Operands<'_>) -> Result<u16, AsmError> {
        use InstructionShape as S;

        let opcode = match mnemonic {
            Mnemonic::Cls => {
                ops.expect_count(0)?;
                S::Cls.pack(0, 0, 0)
            }
            Mnemonic::Ret => {
                ops.expect_count(0)?;
                S::Ret.pack(0, 0, 0)
            }
            Mnemonic::Call => {
                ops.expect_count(1)?;
                S::Call.pack(0, 0, ops.num(0, ADDR_MASK)?)
            }
            Mnemonic::Jmp => {
                ops.expect_count(1)?;
                S::Jmp.pack(0, 0, ops.num(0, ADDR_MASK)?)
            }
            Mnemonic::Jmp0 => {
                ops.expect_count(1)?;
                S::Jmp0.pack(0, 0, ops.num(0, ADDR_MASK)?)
            }
            Mnemonic::Drw => {
                ops.expect_count(3)?;
                S::Drw.pack(ops.reg(0)?, ops.reg(1)?, ops.num(2, NIBBLE_MASK)?)
            }
            Mnemonic::Rnd => {
                ops.expect_count(2)?;
                S::Rnd.pack(ops.reg(0)?, 0, ops.num(1, BYTE_MASK)?)
            }
            Mnemonic::Skp => {
                ops.expect_count(1)?;
                S::Skp.pack(ops.reg(0)?, 0, 0)
            }
            Mnemonic::Sknp => {
                ops.expect_count(1)?;
                S::Sknp.pack(ops.reg(0)?, 0, 0)
            }
            Mnemonic::Se => encode_compare(ops, S::SeByte, S::SeReg)?,
            Mnemonic::Sne => encode_compare(ops, S::SneByte, S::SneReg)?,
            Mnemonic::Add => encode_add(ops)?,
            Mnemonic::Mov => encode_mov(ops)?,
            Mnemonic::Sub => encode_alu(ops, S::Sub)?,
            Mnemonic::Subn => encode_alu(ops, S::Subn)?,
            Mnemonic::And => encode_alu(ops, S::And)?,
            Mnemonic::Or => encode_alu(ops, S::Or)?,
            Mnemonic::Xor => encode_alu(ops, S::Xor)?,
            Mnemonic::Shr => encode_shift(ops, S::Shr)?,
            Mnemonic::Shl => encode_shift(ops, S::Shl)?,
        };

        Ok(opcode)
    }

    // se/sne pick the byte or register form from the second operand.
    fn encode_compare(
        ops: &Operands<'_>,
        byte_form: InstructionShape,
        reg_form: InstructionShape,
    ) -> Result<u16, AsmError> {
        ops.expect_count(2)?;
        let x = ops.reg(0)?;
        match &ops.args[1] {
            Token::Register(y) => Ok(reg_form.pack(x, *y, 0)),
            Token::Number(_) => Ok(byte_form.pack(x, 0, ops.num(1, BYTE_MASK)?)),
            _ => Err(ops.no_form()),
        }
    }

    fn encode_add(ops: &Operands<'_>) -> Result<u16, AsmError> {
        ops.expect_count(2)?;
        match (&ops.args[0], &ops.args[1]) {
            (Token::Register(x), Token::Register(y)) => Ok(InstructionShape::AddReg.pack(*x, *y, 0)),
            (Token::Register(x), Token::Number(_)) => {
                Ok(InstructionShape::AddByte.pack(*x, 0, ops.num(1, BYTE_MASK)?))
            }
            (Token::IndexRegister, Token::Register(x)) => Ok(InstructionShape::AddI.pack(*x, 0, 0)),
            _ => Err(ops.no_form()),
        }
    }

    fn encode_mov(ops: &Operands<'_>) -> Result<u16, AsmError> {
        use InstructionShape as S;

        ops.expect_count(2)?;
        let opcode = match (&ops.args[0], &ops.args[1]) {
            (Token::Register(x), Token::Number(_)) => S::MovByte.pack(*x, 0, ops.num(1, BYTE_MASK)?),
            (Token::Register(x), Token::Register(y)) => S::MovReg.pack(*x, *y, 0),
            (Token::Register(x), Token::DelayTimerRef) => S::MovFromDelay.pack(*x, 0, 0),
            (Token::Register(x), Token::KeyWait) => S::MovFromKey.pack(*x, 0, 0),
            (Token::Register(x), Token::IndirectIndex) => S::Load.pack(*x, 0, 0),
            (Token::IndexRegister, Token::Number(_)) => S::MovI.pack(0, 0, ops.num(1, ADDR_MASK)?),
            (Token::DelayTimerRef, Token::Register(x)) => S::MovToDelay.pack(*x, 0, 0),
            (Token::SoundTimerRef, Token::Register(x)) => S::MovToSound.pack(*x, 0, 0),
            (Token::FontRef, Token::Register(x)) => S::MovFont.pack(*x, 0, 0),
            (Token::BcdRef, Token::Register(x)) => S::MovBcd.pack(*x, 0, 0),
            (Token::IndirectIndex, Token::Register(x)) => S::Save.pack(*x, 0, 0),
            _ => return Err(ops.no_form()),
        };
        Ok(opcode)
    }

    fn encode_alu(ops: &Operands<'_>, shape: InstructionShape) -> Result<u16, AsmError> {
        ops.expect_count(2)?;
        Ok(shape.pack(ops.reg(0)?, ops.reg(1)?, 0))
    }

    // shr/shl take an optional second register; it is encoded but ignored at run time.
    fn encode_shift(ops: &Operands<'_>, shape: InstructionShape) -> Result<u16, AsmError> {
        match ops.args.len() {
            1 => Ok(shape.pack(ops.reg(0)?, 0, 0)),
            2 => Ok(shape.pack(ops.reg(0)?, ops.reg(1)?, 0)),
            _ => Err(AsmError::malformed(
                ops.mnemonic,
                format!("expected 1 or 2 operand(s), found {}", ops.args.len()),
            )),
        }
    }
}
