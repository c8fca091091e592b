//! Host side of the CHIP-8 toolchain: the window peripheral, logging
//! setup and command-line definitions shared by the `run` and `assemble`
//! binaries.

pub mod cli;
pub mod display;
pub mod logging;
