pub mod assembler {
    use std::fmt;

    use tracing::{debug, warn};

    use crate::encoder::encoder::encode;
    use crate::errors::errors::AsmError;
    use crate::token::token::lex_line;

    /// Programs conventionally start here; the image keeps a zeroed gap of
    /// this many bytes in front of the first opcode.
    pub const LOAD_ADDRESS: usize = 0x200;

    /// Opcodes in source order, serialized behind the load-address gap.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct AssembledImage {
        opcodes: Vec<u16>,
    }

    impl AssembledImage {
        pub fn opcodes(&self) -> &[u16] {
            &self.opcodes
        }

        /// Flat binary: `LOAD_ADDRESS` zero bytes, then big-endian opcodes.
        pub fn to_bytes(&self) -> Vec<u8> {
            let mut bytes = vec![0u8; LOAD_ADDRESS];
            bytes.reserve(self.opcodes.len() * 2);
            for op in &self.opcodes {
                bytes.extend_from_slice(&op.to_be_bytes());
            }
            bytes
        }
    }

    /// Why a source line produced no opcode.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum LineIssue {
        NotAnInstruction,
        Malformed(AsmError),
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct LineDiagnostic {
        /// 1-based line number in the source text.
        pub line_no: usize,
        pub issue: LineIssue,
    }

    impl fmt::Display for LineDiagnostic {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &self.issue {
                LineIssue::NotAnInstruction => write!(f, "line {}: not an instruction", self.line_no),
                LineIssue::Malformed(err) => write!(f, "line {}: {err}", self.line_no),
            }
        }
    }

    /// An accepted line and the address/opcode it was assembled to.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ListingEntry {
        pub line_no: usize,
        pub addr: u16,
        pub opcode: u16,
        pub text: String,
    }

    #[derive(Clone, Debug, Default)]
    pub struct Assembly {
        pub image: AssembledImage,
        pub listing: Vec<ListingEntry>,
        pub diagnostics: Vec<LineDiagnostic>,
    }

    /// Assemble a single line. `Ok(None)` means the line is not an instruction.
    pub fn assemble_line(line: &str) -> Result<Option<u16>, AsmError> {
        let tokens = lex_line(line)?;
        encode(&tokens)
    }

    /// Single-pass, line-at-a-time assembler. A bad line is recorded and
    /// skipped; it never aborts the rest of the pass.
    pub struct Assembler {
        assembly: Assembly,
    }

    impl Assembler {
        pub fn new() -> Self {
            Self {
                assembly: Assembly::default(),
            }
        }

        pub fn assemble(mut self, source: &str) -> Assembly {
            for (idx, raw_line) in source.lines().enumerate() {
                let line_no = idx + 1;
                if raw_line.is_empty() {
                    continue;
                }
                self.push_line(line_no, raw_line);
            }

            debug!(
                opcodes = self.assembly.image.opcodes.len(),
                skipped = self.assembly.diagnostics.len(),
                "assembly pass finished"
            );
            self.assembly
        }

        fn push_line(&mut self, line_no: usize, text: &str) {
            let issue = match assemble_line(text) {
                Ok(Some(opcode)) => {
                    let addr = (LOAD_ADDRESS + self.assembly.image.opcodes.len() * 2) as u16;
                    self.assembly.image.opcodes.push(opcode);
                    self.assembly.listing.push(ListingEntry {
                        line_no,
                        addr,
                        opcode,
                        text: text.trim().to_string(),
                    });
                    return;
                }
                Ok(None) => LineIssue::NotAnInstruction,
                Err(err) => LineIssue::Malformed(err),
            };

            let diagnostic = LineDiagnostic { line_no, issue };
            warn!("skipping {diagnostic}");
            self.assembly.diagnostics.push(diagnostic);
        }
    }

    impl Default for Assembler {
        fn default() -> Self {
            Self::new()
        }
    }
}
