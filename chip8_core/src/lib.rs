//! Assembler and bytecode interpreter for a small 16-bit CHIP-8 style
//! virtual machine.
//!
//! The two pipelines share [`instruction`] and nothing else:
//! source text goes [`token`] -> [`encoder`] -> [`assembler`], and program
//! images go [`decoder`] -> [`chip8_engine`] -> [`machine`] with
//! [`device`] peripherals.

pub mod assembler;
pub mod chip8_engine;
pub mod clock;
pub mod decoder;
pub mod device;
pub mod encoder;
pub mod errors;
pub mod instruction;
pub mod machine;
pub mod token;
