pub mod errors {
    use std::io;
    use std::path::PathBuf;

    /// Per-line assembler failures. None of these abort an assembly pass;
    /// the driver records them against the line number and moves on.
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum AsmError {
        #[error("malformed operands for '{mnemonic}': {reason}")]
        MalformedOperands {
            mnemonic: &'static str,
            reason: String,
        },

        #[error("unlexable token '{0}'")]
        UnlexableToken(String),

        #[error("too many tokens on one line ({0}, at most 4)")]
        TooManyTokens(usize),
    }

    impl AsmError {
        pub(crate) fn malformed(mnemonic: &'static str, reason: impl Into<String>) -> AsmError {
            AsmError::MalformedOperands {
                mnemonic,
                reason: reason.into(),
            }
        }
    }

    /// Execution-time failures. Both stop the fetch loop.
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum ExecError {
        #[error("unrecognized opcode {opcode:#06X} at pc {pc:#05X}")]
        UnrecognizedOpcode { pc: u16, opcode: u16 },

        #[error("keypad closed while waiting for a key at pc {pc:#05X}")]
        InputClosed { pc: u16 },
    }

    /// Program image loading failures.
    #[derive(Debug, thiserror::Error)]
    pub enum ImageError {
        #[error("read failed: {source}")]
        Io {
            path: PathBuf,
            #[source]
            source: io::Error,
        },

        #[error("image is {len} bytes; memory holds at most 4096")]
        TooLarge { len: usize },
    }
}
