pub mod token {
    use std::fmt;

    use crate::errors::errors::AsmError;

    /// A source line holds a mnemonic and at most three operands.
    pub const MAX_TOKENS: usize = 4;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Mnemonic {
        Call,
        Cls,
        Drw,
        Jmp,
        Jmp0,
        Mov,
        Rnd,
        Ret,
        Se,
        Sne,
        Skp,
        Sknp,
        Add,
        Sub,
        Subn,
        And,
        Or,
        Xor,
        Shr,
        Shl,
    }

    impl Mnemonic {
        pub fn from_keyword(word: &str) -> Option<Mnemonic> {
            let mnemonic = match word {
                "call" => Mnemonic::Call,
                "cls" => Mnemonic::Cls,
                "drw" => Mnemonic::Drw,
                "jmp" => Mnemonic::Jmp,
                "jmp0" => Mnemonic::Jmp0,
                "mov" => Mnemonic::Mov,
                "rnd" => Mnemonic::Rnd,
                "ret" => Mnemonic::Ret,
                "se" => Mnemonic::Se,
                "sne" => Mnemonic::Sne,
                "skp" => Mnemonic::Skp,
                "sknp" => Mnemonic::Sknp,
                "add" => Mnemonic::Add,
                "sub" => Mnemonic::Sub,
                "subn" => Mnemonic::Subn,
                "and" => Mnemonic::And,
                "or" => Mnemonic::Or,
                "xor" => Mnemonic::Xor,
                "shr" => Mnemonic::Shr,
                "shl" => Mnemonic::Shl,
                _ => return None,
            };
            Some(mnemonic)
        }

        pub fn name(self) -> &'static str {
            match self {
                Mnemonic::Call => "call",
                Mnemonic::Cls => "cls",
                Mnemonic::Drw => "drw",
                Mnemonic::Jmp => "jmp",
                Mnemonic::Jmp0 => "jmp0",
                Mnemonic::Mov => "mov",
                Mnemonic::Rnd => "rnd",
                Mnemonic::Ret => "ret",
                Mnemonic::Se => "se",
                Mnemonic::Sne => "sne",
                Mnemonic::Skp => "skp",
                Mnemonic::Sknp => "sknp",
                Mnemonic::Add => "add",
                Mnemonic::Sub => "sub",
                Mnemonic::Subn => "subn",
                Mnemonic::And => "and",
                Mnemonic::Or => "or",
                Mnemonic::Xor => "xor",
                Mnemonic::Shr => "shr",
                Mnemonic::Shl => "shl",
            }
        }
    }

    /// One classified word of a source line.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Token {
        Mnemonic(Mnemonic),
        /// `V0`..`VF`, already masked to 4 bits.
        Register(u8),
        /// `I`
        IndexRegister,
        /// `[I]`
        IndirectIndex,
        /// `K`
        KeyWait,
        /// `DT`
        DelayTimerRef,
        /// `ST`
        SoundTimerRef,
        /// `F`
        FontRef,
        /// `B`
        BcdRef,
        Number(i32),
        /// Text that is neither a keyword, a register nor a decimal number.
        Invalid(String),
    }

    impl Token {
        pub fn register(&self) -> Option<u8> {
            match self {
                Token::Register(reg) => Some(*reg),
                _ => None,
            }
        }

        pub fn number(&self) -> Option<i32> {
            match self {
                Token::Number(value) => Some(*value),
                _ => None,
            }
        }
    }

    impl fmt::Display for Token {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Token::Mnemonic(m) => write!(f, "{}", m.name()),
                Token::Register(reg) => write!(f, "V{reg:X}"),
                Token::IndexRegister => write!(f, "I"),
                Token::IndirectIndex => write!(f, "[I]"),
                Token::KeyWait => write!(f, "K"),
                Token::DelayTimerRef => write!(f, "DT"),
                Token::SoundTimerRef => write!(f, "ST"),
                Token::FontRef => write!(f, "F"),
                Token::BcdRef => write!(f, "B"),
                Token::Number(value) => write!(f, "{value}"),
                Token::Invalid(text) => write!(f, "{text}"),
            }
        }
    }

    /// Classify a single whitespace-free word.
    ///
    /// Keywords are matched exactly (case-sensitive). Anything starting with
    /// `V` is a register whose remainder is read as hex; everything else is
    /// tried as a decimal literal.
    pub fn classify(word: &str) -> Token {
        if let Some(mnemonic) = Mnemonic::from_keyword(word) {
            return Token::Mnemonic(mnemonic);
        }

        match word {
            "I" => return Token::IndexRegister,
            "[I]" => return Token::IndirectIndex,
            "K" => return Token::KeyWait,
            "B" => return Token::BcdRef,
            "DT" => return Token::DelayTimerRef,
            "ST" => return Token::SoundTimerRef,
            "F" => return Token::FontRef,
            _ => {}
        }

        if let Some(digits) = word.strip_prefix('V') {
            // from_str_radix alone would also take a leading sign.
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Token::Invalid(word.to_string());
            }
            return match u32::from_str_radix(digits, 16) {
                Ok(value) => Token::Register((value & 0xF) as u8),
                Err(_) => Token::Invalid(word.to_string()),
            };
        }

        match word.parse::<i32>() {
            Ok(value) => Token::Number(value),
            Err(_) => Token::Invalid(word.to_string()),
        }
    }

    /// Split one source line on whitespace and classify each word.
    ///
    /// The token limit only applies to lines led by a mnemonic; anything
    /// else is left for the encoder to report as not an instruction.
    pub fn lex_line(line: &str) -> Result<Vec<Token>, AsmError> {
        let tokens: Vec<Token> = line.split_whitespace().map(classify).collect();
        let is_instruction = matches!(tokens.first(), Some(Token::Mnemonic(_)));
        if is_instruction && tokens.len() > MAX_TOKENS {
            return Err(AsmError::TooManyTokens(tokens.len()));
        }
        Ok(tokens)
    }
}
